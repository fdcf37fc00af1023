//! Authentication Models
//! Mission: Define user, session, and audit data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub role: UserRole,
    /// Most recently issued session token. Overwritten on login, cleared on
    /// logout. Single-token-per-user: a new login replaces the old value.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    pub created_at: String,
}

/// Access tiers. Manager unlocks the messaging-management endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "manager")]
    Manager,
}

impl UserRole {
    pub fn as_str(&self) -> &str {
        match self {
            UserRole::User => "user",
            UserRole::Manager => "manager",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "user" => Some(UserRole::User),
            "manager" => Some(UserRole::Manager),
            _ => None,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub email: String,
    pub role: UserRole,
    pub exp: usize, // expiration timestamp
}

/// Signup request body
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
}

/// Signup response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: String,
    pub id: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response. The session token travels in an HTTP-only cookie, not in
/// this body.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: UserResponse,
}

/// User response (sanitized - no hash, no token)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at.clone(),
        }
    }
}

/// Outcome of a login attempt, as recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    Success,
    UnknownUser,
    WrongPassword,
}

impl LoginStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LoginStatus::Success => "Login successful",
            LoginStatus::UnknownUser => "failed - user not found",
            LoginStatus::WrongPassword => "failed - wrong password",
        }
    }
}

/// Append-only audit record. One row per login attempt, success or failure.
#[derive(Debug, Clone, Serialize)]
pub struct LoginAttempt {
    pub user_id: Option<String>,
    pub email: String,
    pub status: String,
    pub timestamp: String,
    pub ip: Option<String>,
    pub token: Option<String>,
}
