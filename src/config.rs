//! Process configuration.
//!
//! Every environment lookup happens here, once, at startup. The rest of the
//! code receives explicit values — the signing secret goes into the
//! `JwtHandler` constructor, the database paths into the stores.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jwt_secret: String,
    pub auth_db_path: String,
    pub messages_db_path: String,
    pub cors_origin: String,
}

impl Config {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        // Support both names to avoid misconfiguration.
        let jwt_secret = env::var("JWT_SECRET")
            .or_else(|_| env::var("SECRET_KEY"))
            .unwrap_or_else(|_| {
                "dev-secret-change-in-production-minimum-32-characters".to_string()
            });

        let auth_db_path =
            resolve_data_path(env::var("AUTH_DB_PATH").ok(), "mailroom_auth.db");
        let messages_db_path =
            resolve_data_path(env::var("MESSAGES_DB_PATH").ok(), "mailroom_messages.db");

        let cors_origin =
            env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Self {
            bind_addr,
            jwt_secret,
            auth_db_path,
            messages_db_path,
            cors_origin,
        }
    }
}

fn resolve_data_path(env_value: Option<String>, default_filename: &str) -> String {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let Some(raw) = env_value.filter(|v| !v.trim().is_empty()) else {
        return base.join(default_filename).to_string_lossy().to_string();
    };

    let p = PathBuf::from(raw);
    if p.is_absolute() {
        return p.to_string_lossy().to_string();
    }

    // Treat relative paths as relative to the crate, not the caller's cwd.
    base.join(p).to_string_lossy().to_string()
}
