//! Store-level error taxonomy.
//!
//! Typed failures at the persistence seam. The API layers translate these
//! into HTTP status codes; see the per-module error enums there.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// UNIQUE constraint on users.email.
    #[error("email already registered")]
    DuplicateEmail,

    /// Lookup or mutation matched no row.
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}
