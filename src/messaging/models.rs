//! Messaging Models

use crate::sentiment::Sentiment;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A stored message, keyed by recipient email and tagged with the sentiment
/// derived from its current body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    /// Recipient email.
    pub email: String,
    /// Body text.
    pub message: String,
    pub sentiment: Sentiment,
    pub timestamp: String,
}

/// Send request body (manager only)
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub email: String,
    pub message: String,
}

/// Send response
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub message: String,
    pub sentiment: Sentiment,
}

/// Update request body (manager only)
#[derive(Debug, Deserialize)]
pub struct UpdateMessageRequest {
    pub message: String,
}

/// Update response
#[derive(Debug, Serialize)]
pub struct UpdateMessageResponse {
    pub message: String,
    pub new_sentiment: Sentiment,
}

/// Per-recipient aggregation for the manager overview.
#[derive(Debug, Serialize)]
pub struct InboxEntry {
    pub email: String,
    pub email_messages: Vec<Message>,
    /// Reserved list in the aggregate shape; nothing writes personal
    /// messages through this service.
    pub personal_messages: Vec<Message>,
}

/// Self-service listing for the authenticated caller.
#[derive(Debug, Serialize)]
pub struct MyMessagesResponse {
    pub messages: Vec<Message>,
}
