//! Messaging API Endpoints
//! Mission: Manager-to-user messaging with sentiment tagging and CRUD

use crate::auth::{middleware::extract_claims, models::UserRole, user_store::UserStore};
use crate::errors::StoreError;
use crate::messaging::{
    models::{
        InboxEntry, MyMessagesResponse, SendMessageRequest, SendMessageResponse,
        UpdateMessageRequest, UpdateMessageResponse,
    },
    store::MessageStore,
};
use crate::sentiment::SentimentClassifier;
use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};
use uuid::Uuid;

/// Shared messaging state
#[derive(Clone)]
pub struct MessagingState {
    pub user_store: Arc<UserStore>,
    pub message_store: Arc<MessageStore>,
    pub classifier: Arc<dyn SentimentClassifier>,
}

impl MessagingState {
    pub fn new(
        user_store: Arc<UserStore>,
        message_store: Arc<MessageStore>,
        classifier: Arc<dyn SentimentClassifier>,
    ) -> Self {
        Self {
            user_store,
            message_store,
            classifier,
        }
    }
}

/// Send a message - POST /users/send-email (manager only)
///
/// The recipient must be an existing "user" role account. The body is
/// classified before it is persisted.
pub async fn send_email(
    State(state): State<MessagingState>,
    Json(payload): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, MessagingApiError> {
    if payload.email.trim().is_empty() || payload.message.trim().is_empty() {
        return Err(MessagingApiError::MissingFields);
    }

    let recipient = state
        .user_store
        .find_by_email(&payload.email)?
        .filter(|u| u.role == UserRole::User)
        .ok_or(MessagingApiError::RecipientNotFound)?;

    let sentiment = state.classifier.classify(&payload.message);
    state
        .message_store
        .insert(&recipient.email, &payload.message, sentiment)?;

    info!(
        "📨 Message sent to {} (sentiment: {})",
        recipient.email,
        sentiment.as_str()
    );

    Ok(Json(SendMessageResponse {
        message: "Email message stored successfully".to_string(),
        sentiment,
    }))
}

/// Aggregate listing - GET /users/getAllEmailMessage (manager only)
///
/// One entry per "user" role account with every message addressed to them.
pub async fn get_all_email_messages(
    State(state): State<MessagingState>,
) -> Result<Json<Vec<InboxEntry>>, MessagingApiError> {
    let users = state.user_store.list_users()?;

    let mut result = Vec::new();
    for user in users.iter().filter(|u| u.role == UserRole::User) {
        let email_messages = state.message_store.list_for_recipient(&user.email)?;
        result.push(InboxEntry {
            email: user.email.clone(),
            email_messages,
            personal_messages: Vec::new(),
        });
    }

    Ok(Json(result))
}

/// Update a message - PUT /users/update-message/:id (manager only)
///
/// Body and recomputed sentiment are replaced in one statement; there is no
/// intermediate state where the label is stale relative to the body.
pub async fn update_message(
    State(state): State<MessagingState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMessageRequest>,
) -> Result<Json<UpdateMessageResponse>, MessagingApiError> {
    if payload.message.trim().is_empty() {
        return Err(MessagingApiError::MissingFields);
    }

    let sentiment = state.classifier.classify(&payload.message);
    state.message_store.update(&id, &payload.message, sentiment)?;

    Ok(Json(UpdateMessageResponse {
        message: "Message and sentiment updated successfully".to_string(),
        new_sentiment: sentiment,
    }))
}

/// Delete a message - DELETE /users/delete-message/:id (manager only)
pub async fn delete_message(
    State(state): State<MessagingState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, MessagingApiError> {
    state.message_store.delete(&id)?;
    Ok(Json(json!({ "message": "Message deleted successfully" })))
}

/// Self-service listing - GET /users/get-my-received-messages
///
/// Resolves the recipient from the caller's own verified claims; no way to
/// read another user's inbox.
pub async fn my_received_messages(
    State(state): State<MessagingState>,
    req: Request,
) -> Result<Json<MyMessagesResponse>, MessagingApiError> {
    let claims = extract_claims(&req).ok_or(MessagingApiError::Unauthorized)?;

    let user = state
        .user_store
        .find_by_email(&claims.email)?
        .ok_or(MessagingApiError::RecipientNotFound)?;

    let messages = state.message_store.list_for_recipient(&user.email)?;

    Ok(Json(MyMessagesResponse { messages }))
}

/// Messaging API errors
#[derive(Debug)]
pub enum MessagingApiError {
    MissingFields,
    RecipientNotFound,
    MessageNotFound,
    Unauthorized,
    InternalError,
}

impl From<StoreError> for MessagingApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => MessagingApiError::MessageNotFound,
            other => {
                error!("messaging store error: {other}");
                MessagingApiError::InternalError
            }
        }
    }
}

impl IntoResponse for MessagingApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            MessagingApiError::MissingFields => {
                (StatusCode::BAD_REQUEST, "Email and message fields are required")
            }
            MessagingApiError::RecipientNotFound => {
                (StatusCode::NOT_FOUND, "Email not found in users")
            }
            MessagingApiError::MessageNotFound => (StatusCode::NOT_FOUND, "Message not found"),
            MessagingApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            MessagingApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
