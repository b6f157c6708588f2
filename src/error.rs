//! CLI Error Types
//!
//! Everything in here is a pre-flight failure: it stops the run before any
//! archive is touched.

use derive_more::{Display, Error};
use std::path::PathBuf;

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    #[display("folder not found: {}", _0.display())]
    FolderNotFound(#[error(not(source))] PathBuf),
    #[display("file not found: {}", _0.display())]
    ArchiveNotFound(#[error(not(source))] PathBuf),
    #[display("invalid category: {_0} (valid categories: pre-wedding, brides-dinner, morning-wedding, grooms-dinner)")]
    InvalidCategory(#[error(not(source))] String),
    #[display("no answer from the terminal (pass every argument and --yes for unattended runs)")]
    Prompt,
    #[display("could not open storage")]
    Storage,
    #[display("could not read the archive inbox")]
    Inbox,
    #[display("catalog unavailable")]
    Catalog,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Catalog)
    }
}
