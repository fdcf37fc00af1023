//! Authentication Middleware
//! Mission: Gate endpoints on a valid session cookie and the caller's role

use crate::auth::{
    jwt::{JwtHandler, TokenError},
    models::{Claims, UserRole},
};
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde_json::json;
use std::sync::Arc;

/// Name of the HTTP-only session cookie.
pub const TOKEN_COOKIE: &str = "token";

/// Pull the session cookie and verify it. Shared by both middlewares so the
/// verification logic lives in exactly one place.
fn authenticate(jwt_handler: &JwtHandler, jar: &CookieJar) -> Result<Claims, AuthError> {
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AuthError::MissingToken)?;

    let claims = jwt_handler.validate_token(&token)?;
    Ok(claims)
}

/// Middleware that requires a valid session for any role.
///
/// Verified claims are inserted into request extensions for handlers.
pub async fn auth_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authenticate(&jwt_handler, &jar)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Middleware that additionally requires the manager role.
///
/// Role comes from the claims embedded at issuance time; a role change after
/// issuance is not reflected until re-login.
pub async fn manager_middleware(
    State(jwt_handler): State<Arc<JwtHandler>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let claims = authenticate(&jwt_handler, &jar)?;

    if claims.role != UserRole::Manager {
        return Err(AuthError::Forbidden);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Extract claims from a request (use after auth middleware).
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

/// Guard failures
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    ExpiredToken,
    InvalidToken,
    Forbidden,
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::ExpiredToken,
            TokenError::Invalid(_) => AuthError::InvalidToken,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::ExpiredToken => (StatusCode::UNAUTHORIZED, "Token expired"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token"),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "Manager role required"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
