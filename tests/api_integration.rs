//! End-to-end tests driving the router: signup, login, cookie sessions,
//! role gating, messaging CRUD with sentiment recomputation.

use axum::body::Body;
use axum::http::{header, HeaderValue, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tower::ServiceExt;

use mailroom_backend::{
    api::create_router,
    auth::{AuthState, JwtHandler, UserStore},
    messaging::{MessageStore, MessagingState},
    sentiment::LexiconClassifier,
};

const MANAGER_EMAIL: &str = "manager@mailroom.local";
const MANAGER_PASSWORD: &str = "manager123";

struct TestApp {
    router: Router,
    user_store: Arc<UserStore>,
    _auth_db: NamedTempFile,
    _messages_db: NamedTempFile,
}

fn test_app() -> TestApp {
    let auth_db = NamedTempFile::new().unwrap();
    let messages_db = NamedTempFile::new().unwrap();

    let user_store = Arc::new(UserStore::new(auth_db.path().to_str().unwrap()).unwrap());
    let message_store = Arc::new(MessageStore::new(messages_db.path().to_str().unwrap()).unwrap());
    let jwt_handler = Arc::new(JwtHandler::new("integration-test-secret".to_string()));

    let auth_state = AuthState::new(user_store.clone(), jwt_handler.clone());
    let messaging_state = MessagingState::new(
        user_store.clone(),
        message_store,
        Arc::new(LexiconClassifier::new()),
    );

    let router = create_router(
        auth_state,
        messaging_state,
        jwt_handler,
        HeaderValue::from_static("http://localhost:3000"),
    );

    TestApp {
        router,
        user_store,
        _auth_db: auth_db,
        _messages_db: messages_db,
    }
}

async fn send(
    app: &TestApp,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(json_body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.to_string());

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, set_cookie, json)
}

async fn signup(app: &TestApp, name: &str, email: &str, password: &str) -> (StatusCode, Value) {
    let (status, _, body) = send(
        app,
        "POST",
        "/users/",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": password,
            "confirmPassword": password,
        })),
    )
    .await;
    (status, body)
}

async fn login(app: &TestApp, email: &str, password: &str) -> (StatusCode, Option<String>, Value) {
    send(
        app,
        "POST",
        "/users/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

async fn login_cookie(app: &TestApp, email: &str, password: &str) -> String {
    let (status, cookie, _) = login(app, email, password).await;
    assert_eq!(status, StatusCode::OK);
    cookie.expect("login should set the session cookie")
}

#[tokio::test]
async fn test_full_messaging_scenario() {
    let app = test_app();

    // Signup Alice
    let (status, body) = signup(&app, "Alice", "a@x.com", "pw1").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().is_some());

    // Login Alice - session cookie issued
    let alice_cookie = login_cookie(&app, "a@x.com", "pw1").await;
    assert!(alice_cookie.starts_with("token="));

    // Manager sends a negative message to Alice
    let manager_cookie = login_cookie(&app, MANAGER_EMAIL, MANAGER_PASSWORD).await;
    let (status, _, body) = send(
        &app,
        "POST",
        "/users/send-email",
        Some(&manager_cookie),
        Some(json!({ "email": "a@x.com", "message": "I hate this" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sentiment"], "negative");

    // Alice reads her own inbox
    let (status, _, body) = send(
        &app,
        "GET",
        "/users/get-my-received-messages",
        Some(&alice_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let messages = body["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0]["message"], "I hate this");
    assert_eq!(messages[0]["sentiment"], "negative");
}

#[tokio::test]
async fn test_signup_validation_and_conflict() {
    let app = test_app();

    // Missing field
    let (status, _, body) = send(
        &app,
        "POST",
        "/users/",
        None,
        Some(json!({
            "name": "",
            "email": "a@x.com",
            "password": "pw1",
            "confirmPassword": "pw1",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some());

    // Password mismatch
    let (status, _, _) = send(
        &app,
        "POST",
        "/users/",
        None,
        Some(json!({
            "name": "Alice",
            "email": "a@x.com",
            "password": "pw1",
            "confirmPassword": "pw2",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // First signup succeeds, duplicate email conflicts regardless of fields
    let (status, _) = signup(&app, "Alice", "a@x.com", "pw1").await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = signup(&app, "Someone Else", "a@x.com", "different").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Email already exists");
}

#[tokio::test]
async fn test_login_failures_are_audited() {
    let app = test_app();
    signup(&app, "Alice", "a@x.com", "pw1").await;

    // Unknown user
    let (status, cookie, _) = login(&app, "ghost@x.com", "whatever").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(cookie.is_none());

    // Wrong password
    let (status, cookie, _) = login(&app, "a@x.com", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());

    // Success
    let (status, cookie, _) = login(&app, "a@x.com", "pw1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_some());

    // Exactly one audit row per attempt
    let ghost = app.user_store.list_login_attempts("ghost@x.com").unwrap();
    assert_eq!(ghost.len(), 1);
    assert_eq!(ghost[0].status, "failed - user not found");

    let alice = app.user_store.list_login_attempts("a@x.com").unwrap();
    assert_eq!(alice.len(), 2);
    assert_eq!(alice[0].status, "failed - wrong password");
    assert_eq!(alice[1].status, "Login successful");
    assert!(alice[1].token.is_some());
}

#[tokio::test]
async fn test_manager_routes_are_role_gated() {
    let app = test_app();
    signup(&app, "Alice", "a@x.com", "pw1").await;
    let alice_cookie = login_cookie(&app, "a@x.com", "pw1").await;

    // No cookie at all
    let (status, _, _) = send(&app, "POST", "/users/send-email", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Authenticated but wrong role
    let (status, _, body) = send(
        &app,
        "GET",
        "/users/getAllEmailMessage",
        Some(&alice_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Manager role required");

    // User listing is gated too
    let (status, _, _) = send(&app, "GET", "/users/", Some(&alice_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_listing_is_sanitized() {
    let app = test_app();
    signup(&app, "Alice", "a@x.com", "pw1").await;
    let manager_cookie = login_cookie(&app, MANAGER_EMAIL, MANAGER_PASSWORD).await;

    let (status, _, body) = send(&app, "GET", "/users/", Some(&manager_cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2); // default manager + alice
    for user in users {
        assert!(user.get("password_hash").is_none());
        assert!(user.get("password").is_none());
        assert!(user.get("token").is_none());
    }
}

#[tokio::test]
async fn test_send_email_validation() {
    let app = test_app();
    let manager_cookie = login_cookie(&app, MANAGER_EMAIL, MANAGER_PASSWORD).await;

    // Unknown recipient
    let (status, _, _) = send(
        &app,
        "POST",
        "/users/send-email",
        Some(&manager_cookie),
        Some(json!({ "email": "nobody@x.com", "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Managers cannot be recipients
    let (status, _, _) = send(
        &app,
        "POST",
        "/users/send-email",
        Some(&manager_cookie),
        Some(json!({ "email": MANAGER_EMAIL, "message": "hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Empty body
    signup(&app, "Alice", "a@x.com", "pw1").await;
    let (status, _, _) = send(
        &app,
        "POST",
        "/users/send-email",
        Some(&manager_cookie),
        Some(json!({ "email": "a@x.com", "message": "  " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_recomputes_sentiment() {
    let app = test_app();
    signup(&app, "Alice", "a@x.com", "pw1").await;
    let manager_cookie = login_cookie(&app, MANAGER_EMAIL, MANAGER_PASSWORD).await;

    let (status, _, _) = send(
        &app,
        "POST",
        "/users/send-email",
        Some(&manager_cookie),
        Some(json!({ "email": "a@x.com", "message": "ok" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Find the message id through the aggregate listing
    let (status, _, body) = send(
        &app,
        "GET",
        "/users/getAllEmailMessage",
        Some(&manager_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["email"], "a@x.com");
    assert!(entries[0]["personal_messages"].as_array().unwrap().is_empty());
    let id = entries[0]["email_messages"][0]["id"].as_str().unwrap().to_string();

    // Sentiment follows the new body on every update
    for (new_body, expected) in [
        ("terrible", "negative"),
        ("wonderful", "positive"),
        ("ok", "neutral"),
    ] {
        let (status, _, body) = send(
            &app,
            "PUT",
            &format!("/users/update-message/{id}"),
            Some(&manager_cookie),
            Some(json!({ "message": new_body })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["new_sentiment"], expected);
    }

    // Unknown id
    let (status, _, _) = send(
        &app,
        "PUT",
        &format!("/users/update-message/{}", uuid::Uuid::new_v4()),
        Some(&manager_cookie),
        Some(json!({ "message": "anything" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Delete, then delete again
    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/users/delete-message/{id}"),
        Some(&manager_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(
        &app,
        "DELETE",
        &format!("/users/delete-message/{id}"),
        Some(&manager_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_auth_check() {
    let app = test_app();
    signup(&app, "Alice", "a@x.com", "pw1").await;

    // No cookie
    let (status, _, _) = send(&app, "GET", "/users/auth-check", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Garbage cookie
    let (status, _, _) =
        send(&app, "GET", "/users/auth-check", Some("token=garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid cookie reports the role
    let cookie = login_cookie(&app, "a@x.com", "pw1").await;
    let (status, _, body) = send(&app, "GET", "/users/auth-check", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_logout_deletes_token_store_row_but_token_stays_valid() {
    let app = test_app();
    signup(&app, "Alice", "a@x.com", "pw1").await;
    let cookie = login_cookie(&app, "a@x.com", "pw1").await;
    let raw_token = cookie.strip_prefix("token=").unwrap().to_string();

    assert!(app.user_store.token_exists(&raw_token).unwrap());

    // Logout without a cookie is a 400
    let (status, _, _) = send(&app, "POST", "/users/logout", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, body) = send(&app, "POST", "/users/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    // Token store row is gone and the user's token field is cleared
    assert!(!app.user_store.token_exists(&raw_token).unwrap());
    let alice = app.user_store.find_by_email("a@x.com").unwrap().unwrap();
    assert!(alice.token.is_none());

    // The signed token itself stays valid until its embedded expiry:
    // verification never consults the token store.
    let (status, _, _) = send(&app, "GET", "/users/auth-check", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_check_is_public() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
