//! Authentication API Endpoints
//! Mission: Signup, login, logout, auth-check, and user listing

use crate::auth::{
    jwt::{JwtHandler, TokenError},
    models::{
        LoginAttempt, LoginRequest, LoginResponse, LoginStatus, SignupRequest, SignupResponse,
        UserResponse, UserRole,
    },
    user_store::UserStore,
};
use crate::errors::StoreError;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::middleware::TOKEN_COOKIE;

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt_handler: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(user_store: Arc<UserStore>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            user_store,
            jwt_handler,
        }
    }
}

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// Signup - POST /users/
///
/// Creates a "user" role account. A token is issued and recorded for audit
/// but NOT sent to the client; the caller must log in to get a session.
pub async fn signup(
    State(state): State<AuthState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AuthApiError> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
        || payload.confirm_password.is_empty()
    {
        return Err(AuthApiError::MissingFields);
    }

    if payload.password != payload.confirm_password {
        return Err(AuthApiError::PasswordMismatch);
    }

    let user = state
        .user_store
        .create_user(&payload.name, &payload.email, &payload.password, UserRole::User)?;

    // Issue and record a token for the audit trail without setting a cookie.
    let (token, _) = state
        .jwt_handler
        .generate_token(&user)
        .map_err(internal)?;
    state.user_store.store_token(&user.id, &user.email, &token)?;
    state.user_store.set_session_token(&user.id, &token)?;

    info!("✅ Signup: {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User registered successfully. Please log in to continue.".to_string(),
            id: user.id.to_string(),
        }),
    ))
}

/// Login - POST /users/login
///
/// Sets the session token as an HTTP-only cookie on success. Every attempt
/// appends exactly one audit-log row, success or failure.
pub async fn login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AuthApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::MissingCredentials);
    }

    let Some(user) = state.user_store.find_by_email(&payload.email)? else {
        state.user_store.record_login_attempt(&LoginAttempt {
            user_id: None,
            email: payload.email.clone(),
            status: LoginStatus::UnknownUser.as_str().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            ip: None,
            token: None,
        })?;
        return Err(AuthApiError::UserNotFound);
    };

    if !state
        .user_store
        .verify_password(&payload.email, &payload.password)?
    {
        warn!("❌ Failed login attempt: {}", payload.email);
        state.user_store.record_login_attempt(&LoginAttempt {
            user_id: Some(user.id.to_string()),
            email: user.email.clone(),
            status: LoginStatus::WrongPassword.as_str().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            ip: None,
            token: None,
        })?;
        return Err(AuthApiError::InvalidPassword);
    }

    let (token, _) = state
        .jwt_handler
        .generate_token(&user)
        .map_err(internal)?;

    state.user_store.record_login_attempt(&LoginAttempt {
        user_id: Some(user.id.to_string()),
        email: user.email.clone(),
        status: LoginStatus::Success.as_str().to_string(),
        timestamp: Utc::now().to_rfc3339(),
        ip: None,
        token: Some(token.clone()),
    })?;

    state.user_store.set_session_token(&user.id, &token)?;
    state.user_store.store_token(&user.id, &user.email, &token)?;

    info!("✅ Login successful: {} ({})", user.email, user.role.as_str());

    let jar = jar.add(session_cookie(token));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Login successful".to_string(),
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Logout - POST /users/logout
///
/// Clears the cookie, deletes the token-store row, and unsets the user's
/// token field. The signed token itself remains valid until its embedded
/// expiry; verification never consults the token store.
pub async fn logout(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<serde_json::Value>), AuthApiError> {
    let Some(cookie) = jar.get(TOKEN_COOKIE) else {
        return Err(AuthApiError::MissingCookie);
    };
    let token = cookie.value().to_string();

    let claims = state.jwt_handler.validate_token(&token)?;
    let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthApiError::InvalidToken)?;

    match state.user_store.clear_session_token(&user_id) {
        Ok(()) | Err(StoreError::NotFound) => {}
        Err(e) => return Err(e.into()),
    }
    state.user_store.delete_token(&token)?;

    info!("👋 Logout: {}", claims.email);

    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));

    Ok((jar, Json(json!({ "message": "Logged out successfully" }))))
}

/// Auth check - GET /users/auth-check
///
/// 200 with the caller's role when the session cookie validates, 401
/// otherwise.
pub async fn auth_check(
    State(state): State<AuthState>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>, AuthApiError> {
    let Some(cookie) = jar.get(TOKEN_COOKIE) else {
        return Err(AuthApiError::NotAuthenticated);
    };

    let claims = state.jwt_handler.validate_token(cookie.value())?;

    Ok(Json(json!({
        "message": "Authenticated",
        "role": claims.role.as_str(),
    })))
}

/// List all users - GET /users/ (manager only)
///
/// Responses are sanitized: no password hashes, no tokens.
pub async fn list_users(
    State(state): State<AuthState>,
) -> Result<Json<Vec<UserResponse>>, AuthApiError> {
    let users = state.user_store.list_users()?;
    let response: Vec<UserResponse> = users.iter().map(UserResponse::from_user).collect();
    Ok(Json(response))
}

fn internal(err: anyhow::Error) -> AuthApiError {
    error!("auth internal error: {err:#}");
    AuthApiError::InternalError
}

/// Auth API errors
#[derive(Debug)]
pub enum AuthApiError {
    MissingFields,
    PasswordMismatch,
    MissingCredentials,
    EmailExists,
    UserNotFound,
    InvalidPassword,
    MissingCookie,
    ExpiredToken,
    InvalidToken,
    NotAuthenticated,
    InternalError,
}

impl From<StoreError> for AuthApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AuthApiError::EmailExists,
            StoreError::NotFound => AuthApiError::UserNotFound,
            other => {
                error!("auth store error: {other}");
                AuthApiError::InternalError
            }
        }
    }
}

impl From<TokenError> for AuthApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthApiError::ExpiredToken,
            TokenError::Invalid(_) => AuthApiError::InvalidToken,
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing fields"),
            AuthApiError::PasswordMismatch => (StatusCode::BAD_REQUEST, "Passwords do not match"),
            AuthApiError::MissingCredentials => {
                (StatusCode::BAD_REQUEST, "Email and password are required")
            }
            AuthApiError::EmailExists => (StatusCode::CONFLICT, "Email already exists"),
            AuthApiError::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
            AuthApiError::InvalidPassword => (StatusCode::UNAUTHORIZED, "Invalid password"),
            AuthApiError::MissingCookie => (StatusCode::BAD_REQUEST, "No token found in cookies"),
            AuthApiError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthApiError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthApiError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated"),
            AuthApiError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
