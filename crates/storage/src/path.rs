//! Path validation and security utilities.
//!
//! Every path handed to a backend is relative to that backend's root. Entry
//! names coming out of an archive are never used as storage paths directly,
//! but generated names still go through the same check.

use std::path::{Component, Path, PathBuf};

use crate::error::{ErrorKind, Result};

/// Validates a storage path for security and correctness.
/// Ensures that paths don't escape the storage root (no `..` traversal).
///
/// > **Note:** This does **not** normalize backslashes, non-UTF8 bytes, or
/// >           platform-specific weirdness. Null bytes are explicitly rejected.
///
/// # Returns
/// Returns the normalized path if valid, or [`InvalidPath`](crate::error::ErrorKind::InvalidPath)
/// if invalid.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shoebox_storage::validate_path;
/// // Valid paths
/// assert!(validate_path("photo-1700000000000-0-42.jpg").is_ok());
/// assert!(validate_path("2024/reception.zip").is_ok());
/// assert!(validate_path("a/../ceremony.zip").is_ok()); // (never leaves the root)
/// // Invalid paths
/// assert!(validate_path("../etc/passwd").is_err());
/// assert!(validate_path("a/../../b").is_err());
/// assert!(validate_path("a\0b").is_err());
/// // Paths get resolved
/// assert_eq!(
///     validate_path("wrong/.././/photo.jpg/").unwrap(),
///     Path::new("photo.jpg")
/// );
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let mut components = Vec::new();
    for component in path.as_ref().components() {
        match component {
            Component::Normal(s) => {
                // Null bytes pass through Path::components() on Unix but cause
                // truncation in C-based syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.as_ref().to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("photo-1-0-1.jpg", "photo-1-0-1.jpg")]
    #[case("inbox/ceremony.zip", "inbox/ceremony.zip")]
    #[case("a//b//c.png", "a/b/c.png")]
    #[case("a/./b/./c.png", "a/b/c.png")]
    #[case("a/b/..", "a")]
    #[case("archives///", "archives")]
    fn test_valid_paths(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(validate(Path::new(input)).unwrap(), Path::new(expected));
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("a/../../b")]
    #[case("..")]
    #[case("a\0b")]
    #[case("")]
    #[case(".")]
    #[case("./.")]
    #[case("//")]
    fn test_invalid_paths(#[case] input: &str) {
        assert!(validate(Path::new(input)).is_err());
    }
}
