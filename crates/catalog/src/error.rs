//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The database could not be opened, or a connection/transaction could
    /// not be acquired from it.
    #[display("catalog connection failure")]
    Connection,
    #[display("catalog migration error")]
    Migration,
    /// A single row could not be written.
    #[display("catalog write failure: {_0}")]
    Insert(#[error(not(source))] String),
    /// A batch transaction could not be committed; none of its rows persist.
    #[display("catalog commit failure")]
    Commit,
    /// A read query failed.
    #[display("catalog query failure")]
    Query,
    /// Serialization/deserialization error.
    #[display("invalid catalog data: {_0}")]
    InvalidData(#[error(not(source))] &'static str),
    #[display("invalid category: {_0}")]
    InvalidCategory(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection)
    }
}

/// SQLite primary result codes worth retrying: `SQLITE_BUSY` (5) and
/// `SQLITE_LOCKED` (6), including their extended variants.
pub(crate) fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db
            .code()
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xFF, 5 | 6)),
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => true,
        _ => false,
    }
}
