//! User Storage
//! Mission: Persist accounts, issued tokens, and the login audit trail

use crate::auth::models::{LoginAttempt, User, UserRole};
use crate::errors::StoreError;
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode};
use tracing::{info, warn};
use uuid::Uuid;

/// Credential store, token store, and login audit log with SQLite backend.
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        // Users table
        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                token TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Issued tokens, mirrored for audit. Rows are deleted on logout;
        // verification never reads this table.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tokens (
                user_id TEXT NOT NULL,
                email TEXT NOT NULL,
                token TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        // Append-only login audit log. No update or delete path exists.
        conn.execute(
            "CREATE TABLE IF NOT EXISTS login_logs (
                user_id TEXT,
                email TEXT NOT NULL,
                status TEXT NOT NULL,
                timestamp TEXT NOT NULL,
                ip TEXT,
                token TEXT
            )",
            [],
        )?;

        self.create_default_manager(&conn)?;

        Ok(())
    }

    /// Seed a manager account for initial setup. Signup only ever creates
    /// "user" accounts, so without this there would be no way to reach the
    /// messaging-management endpoints.
    fn create_default_manager(&self, conn: &Connection) -> Result<(), StoreError> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'manager'",
            [],
            |row| row.get(0),
        )?;

        if count == 0 {
            let password_hash = hash("manager123", DEFAULT_COST)?;

            let manager = User {
                id: Uuid::new_v4(),
                name: "Manager".to_string(),
                email: "manager@mailroom.local".to_string(),
                password_hash,
                role: UserRole::Manager,
                token: None,
                created_at: Utc::now().to_rfc3339(),
            };

            conn.execute(
                "INSERT INTO users (id, name, email, password_hash, role, token, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    manager.id.to_string(),
                    manager.name,
                    manager.email,
                    manager.password_hash,
                    manager.role.as_str(),
                    manager.token,
                    manager.created_at,
                ],
            )?;

            info!(
                "🔐 Default manager created (email: {}, password: manager123)",
                manager.email
            );
            warn!("⚠️  CHANGE DEFAULT PASSWORD IN PRODUCTION!");
        }

        Ok(())
    }

    /// Create a new user. Password is bcrypt-hashed before it is persisted;
    /// the plaintext never touches the database.
    pub fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let password_hash = hash(password, DEFAULT_COST)?;

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            token: None,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, role, token, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.role.as_str(),
                user.token,
                user.created_at,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(f, _) if f.code == ErrorCode::ConstraintViolation => {
                StoreError::DuplicateEmail
            }
            other => StoreError::Database(other),
        })?;

        info!("✅ Created user: {} ({})", user.email, user.role.as_str());

        Ok(user)
    }

    /// Get user by email
    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, email, password_hash, role, token, created_at
             FROM users WHERE email = ?1",
        )?;

        let user_result = stmt.query_row(params![email], map_user_row);

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all users
    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, email, password_hash, role, token, created_at FROM users",
        )?;

        let users = stmt
            .query_map([], map_user_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Verify email and password by re-hashing, never by decrypting.
    pub fn verify_password(&self, email: &str, password: &str) -> Result<bool, StoreError> {
        match self.find_by_email(email)? {
            Some(user) => Ok(verify(password, &user.password_hash)?),
            None => Ok(false),
        }
    }

    /// Overwrite the user's last-issued token. A new login replaces the old
    /// value rather than appending.
    pub fn set_session_token(&self, user_id: &Uuid, token: &str) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let updated = conn.execute(
            "UPDATE users SET token = ?1 WHERE id = ?2",
            params![token, user_id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Clear the user's token field on logout.
    pub fn clear_session_token(&self, user_id: &Uuid) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let updated = conn.execute(
            "UPDATE users SET token = NULL WHERE id = ?1",
            params![user_id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Record an issued token for audit.
    pub fn store_token(&self, user_id: &Uuid, email: &str, token: &str) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO tokens (user_id, email, token, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                user_id.to_string(),
                email,
                token,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// Delete the token store rows for a token (logout). The signed token
    /// itself stays valid until its embedded expiry.
    pub fn delete_token(&self, token: &str) -> Result<usize, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let deleted = conn.execute("DELETE FROM tokens WHERE token = ?1", params![token])?;
        Ok(deleted)
    }

    /// Whether a token is still present in the token store.
    pub fn token_exists(&self, token: &str) -> Result<bool, StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tokens WHERE token = ?1",
            params![token],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Append a login attempt to the audit log.
    pub fn record_login_attempt(&self, attempt: &LoginAttempt) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO login_logs (user_id, email, status, timestamp, ip, token)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                attempt.user_id,
                attempt.email,
                attempt.status,
                attempt.timestamp,
                attempt.ip,
                attempt.token,
            ],
        )?;
        Ok(())
    }

    /// Audit log entries for an email, oldest first.
    pub fn list_login_attempts(&self, email: &str) -> Result<Vec<LoginAttempt>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT user_id, email, status, timestamp, ip, token
             FROM login_logs WHERE email = ?1 ORDER BY rowid ASC",
        )?;

        let attempts = stmt
            .query_map(params![email], |row| {
                Ok(LoginAttempt {
                    user_id: row.get(0)?,
                    email: row.get(1)?,
                    status: row.get(2)?,
                    timestamp: row.get(3)?,
                    ip: row.get(4)?,
                    token: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(attempts)
    }
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let role_str: String = row.get(4)?;
    Ok(User {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        role: UserRole::from_str(&role_str).unwrap_or(UserRole::User),
        token: row.get(5)?,
        created_at: row.get(6)?,
    })
}
