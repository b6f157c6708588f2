//! File metadata returned by storage backends.

use std::path::{Path, PathBuf};
use time::OffsetDateTime;

/// File metadata returned by storage backends.
///
/// Used for listing the archive inbox (name and size of every candidate
/// archive) and for checking what ended up in the photo sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Relative path from storage root
    pub path: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modified timestamp
    pub modified: OffsetDateTime,
}
impl FileInfo {
    pub fn new(path: impl Into<PathBuf>, size: u64, modified: impl Into<OffsetDateTime>) -> Self {
        Self {
            path: path.into(),
            size,
            modified: modified.into(),
        }
    }

    /// Final path component as a lossy string, used for display and sorting.
    pub fn file_name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// Case-insensitive check of the file name suffix (`".zip"`, `".ZIP"`, ...).
    pub fn has_suffix(&self, suffix: &str) -> bool {
        has_suffix(&self.path, suffix)
    }
}

pub(crate) fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase().ends_with(&suffix.to_lowercase()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_suffix_is_case_insensitive() {
        let now = OffsetDateTime::now_utc();
        assert!(FileInfo::new("ceremony.zip", 1, now).has_suffix(".zip"));
        assert!(FileInfo::new("CEREMONY.ZIP", 1, now).has_suffix(".zip"));
        assert!(!FileInfo::new("ceremony.zip.part", 1, now).has_suffix(".zip"));
        assert!(!FileInfo::new("zip", 1, now).has_suffix(".zip"));
    }

    #[test]
    fn test_file_name() {
        let info = FileInfo::new("inbox/day-one.zip", 10, OffsetDateTime::now_utc());
        assert_eq!(info.file_name(), "day-one.zip");
    }
}
