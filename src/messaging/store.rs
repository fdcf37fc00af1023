//! Message Storage
//! Mission: Persist sentiment-tagged messages keyed by recipient email

use crate::errors::StoreError;
use crate::messaging::models::Message;
use crate::sentiment::Sentiment;
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// Message store with SQLite backend.
pub struct MessageStore {
    db_path: String,
}

impl MessageStore {
    /// Create a new message store and initialize the schema.
    pub fn new(db_path: &str) -> Result<Self, StoreError> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                message TEXT NOT NULL,
                sentiment TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Persist a new message with its sentiment label.
    pub fn insert(
        &self,
        email: &str,
        message: &str,
        sentiment: Sentiment,
    ) -> Result<Message, StoreError> {
        let msg = Message {
            id: Uuid::new_v4(),
            email: email.to_string(),
            message: message.to_string(),
            sentiment,
            timestamp: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO messages (id, email, message, sentiment, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                msg.id.to_string(),
                msg.email,
                msg.message,
                msg.sentiment.as_str(),
                msg.timestamp,
            ],
        )?;

        info!("📨 Stored message for {} ({})", msg.email, msg.sentiment.as_str());

        Ok(msg)
    }

    /// All messages addressed to a recipient, oldest first.
    pub fn list_for_recipient(&self, email: &str) -> Result<Vec<Message>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, email, message, sentiment, timestamp
             FROM messages WHERE email = ?1 ORDER BY rowid ASC",
        )?;

        let messages = stmt
            .query_map(params![email], map_message_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(messages)
    }

    /// Fetch a single message by id.
    pub fn get(&self, id: &Uuid) -> Result<Option<Message>, StoreError> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, email, message, sentiment, timestamp
             FROM messages WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], map_message_row) {
            Ok(msg) => Ok(Some(msg)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Replace body and sentiment in a single UPDATE, so the stored label is
    /// never stale relative to the body.
    pub fn update(
        &self,
        id: &Uuid,
        message: &str,
        sentiment: Sentiment,
    ) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let updated = conn.execute(
            "UPDATE messages SET message = ?1, sentiment = ?2 WHERE id = ?3",
            params![message, sentiment.as_str(), id.to_string()],
        )?;

        if updated == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    /// Delete a message by id.
    pub fn delete(&self, id: &Uuid) -> Result<(), StoreError> {
        let conn = Connection::open(&self.db_path)?;
        let deleted = conn.execute(
            "DELETE FROM messages WHERE id = ?1",
            params![id.to_string()],
        )?;

        if deleted == 0 {
            return Err(StoreError::NotFound);
        }

        info!("🗑️  Deleted message: {}", id);
        Ok(())
    }
}

fn map_message_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Message> {
    let id_str: String = row.get(0)?;
    let sentiment_str: String = row.get(3)?;
    Ok(Message {
        id: Uuid::parse_str(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })?,
        email: row.get(1)?,
        message: row.get(2)?,
        sentiment: Sentiment::from_str(&sentiment_str).unwrap_or(Sentiment::Neutral),
        timestamp: row.get(4)?,
    })
}
