//! Router assembly.
//!
//! Route-level guards compose the auth middlewares around whole route
//! groups; no handler re-implements token verification.

use axum::{
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::auth::{
    api as auth_api, auth_middleware, jwt::JwtHandler, manager_middleware, AuthState,
};
use crate::messaging::{api as messaging_api, MessagingState};
use crate::middleware::request_logging;

/// Create the API router.
pub fn create_router(
    auth_state: AuthState,
    messaging_state: MessagingState,
    jwt_handler: Arc<JwtHandler>,
    cors_origin: HeaderValue,
) -> Router {
    // Public: signup, login, logout, auth-check, health
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/users/", post(auth_api::signup))
        .route("/users/login", post(auth_api::login))
        .route("/users/logout", post(auth_api::logout))
        .route("/users/auth-check", get(auth_api::auth_check))
        .with_state(auth_state.clone());

    // Manager only: user listing (sanitized)
    let manager_user_routes = Router::new()
        .route("/users/", get(auth_api::list_users))
        .route_layer(from_fn_with_state(
            jwt_handler.clone(),
            manager_middleware,
        ))
        .with_state(auth_state);

    // Manager only: messaging management
    let manager_message_routes = Router::new()
        .route("/users/send-email", post(messaging_api::send_email))
        .route(
            "/users/getAllEmailMessage",
            get(messaging_api::get_all_email_messages),
        )
        .route(
            "/users/update-message/:id",
            put(messaging_api::update_message),
        )
        .route(
            "/users/delete-message/:id",
            delete(messaging_api::delete_message),
        )
        .route_layer(from_fn_with_state(
            jwt_handler.clone(),
            manager_middleware,
        ))
        .with_state(messaging_state.clone());

    // Any authenticated role: own inbox
    let self_service_routes = Router::new()
        .route(
            "/users/get-my-received-messages",
            get(messaging_api::my_received_messages),
        )
        .route_layer(from_fn_with_state(jwt_handler, auth_middleware))
        .with_state(messaging_state);

    // Cookie-based sessions need credentials, which rules out wildcard CORS.
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    Router::new()
        .merge(public_routes)
        .merge(manager_user_routes)
        .merge(manager_message_routes)
        .merge(self_service_routes)
        .layer(from_fn(request_logging))
        .layer(cors)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "📬 Mailroom Operational"
}
