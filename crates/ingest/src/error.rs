//! Ingest Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An ingest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for ingest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies an ingest failure by how much of the run it takes down.
///
/// ### Entry-fatal
/// - [`ErrorKind::EntryTooLarge`]
/// - [`ErrorKind::Extraction`]
/// - [`ErrorKind::Storage`]
/// - [`ErrorKind::CatalogWrite`]
/// - [`ErrorKind::CatalogCommit`] (every entry of the batch)
///
/// ### Archive-fatal
/// - [`ErrorKind::ArchiveUnreadable`]
/// - [`ErrorKind::NoImagesFound`]
/// - [`ErrorKind::Connection`]
///
/// ### Run-fatal (before any archive is touched)
/// - [`ErrorKind::Discovery`]
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not list archives in the inbox")]
    Discovery,
    #[display("archive unreadable")]
    ArchiveUnreadable,
    #[display("no image files found in archive (supported formats: JPG, PNG, GIF, WebP)")]
    NoImagesFound,
    #[display("{_0}")]
    EntryTooLarge(#[error(not(source))] String),
    #[display("{_0}")]
    Extraction(#[error(not(source))] String),
    #[display("failed to save photo: {_0}")]
    Storage(#[error(not(source))] String),
    #[display("catalog write failure")]
    CatalogWrite,
    #[display("catalog commit failed, photo not recorded")]
    CatalogCommit,
    #[display("catalog connection failure")]
    Connection,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection)
    }
}
