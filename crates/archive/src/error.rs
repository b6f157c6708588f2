//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// The first two are fatal for the whole archive; the rest only for the
/// entry being extracted.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The container is corrupt or is not a ZIP archive at all.
    #[display("archive unreadable")]
    Unreadable,
    /// The archive opened fine but contains no supported image entries.
    #[display("no image files found in archive (supported formats: JPG, PNG, GIF, WebP)")]
    NoImagesFound,
    /// The decompressed entry is bigger than the per-image ceiling.
    #[display("file too large: {:.2}MB (max {}MB per image)", *size as f64 / MIB, limit / (MIB as u64))]
    TooLarge { size: u64, limit: u64 },
    /// Reading or decompressing a single entry failed.
    #[display("failed to read file from archive: {_0}")]
    Extraction(#[error(not(source))] String),
}

const MIB: f64 = 1024.0 * 1024.0;

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        let too_large = ErrorKind::TooLarge { size: 150 * 1024 * 1024 + 512 * 1024, limit: 100 * 1024 * 1024 };
        assert_eq!(too_large.to_string(), "file too large: 150.50MB (max 100MB per image)");
        assert_eq!(ErrorKind::Extraction("bad crc".to_string()).to_string(), "failed to read file from archive: bad crc");
    }
}
