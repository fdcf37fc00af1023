//! Mailroom - messaging/authentication backend
//! Mission: Token-based sessions, role-gated messaging, sentiment tagging

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use dotenv::dotenv;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mailroom_backend::{
    api::create_router,
    auth::{AuthState, JwtHandler, UserStore},
    config::Config,
    messaging::{MessageStore, MessagingState},
    sentiment::LexiconClassifier,
};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("📬 Mailroom Backend Starting");

    let config = Config::from_env();

    let user_store = Arc::new(UserStore::new(&config.auth_db_path)?);
    let message_store = Arc::new(MessageStore::new(&config.messages_db_path)?);
    let jwt_handler = Arc::new(JwtHandler::new(config.jwt_secret.clone()));

    info!("🔐 Authentication initialized at: {}", config.auth_db_path);
    info!("📨 Message store initialized at: {}", config.messages_db_path);

    let auth_state = AuthState::new(user_store.clone(), jwt_handler.clone());
    let messaging_state = MessagingState::new(
        user_store,
        message_store,
        Arc::new(LexiconClassifier::new()),
    );

    let cors_origin: HeaderValue = config
        .cors_origin
        .parse()
        .with_context(|| format!("Invalid CORS origin: {}", config.cors_origin))?;

    let app = create_router(auth_state, messaging_state, jwt_handler, cors_origin);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailroom_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate-root .env (common when running with
    // --manifest-path from elsewhere)
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));

    let candidates = [manifest_dir.join(".env"), manifest_dir.join("../.env")];

    for p in candidates {
        if p.exists() {
            let _ = dotenv::from_path(&p);
        }
    }
}
