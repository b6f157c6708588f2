//! Storage backend trait and implementations.
//!
//! This module defines the `StorageBackend` trait, which provides a unified
//! interface for the storage operations the pipeline needs: listing an inbox,
//! opening an archive for random access, writing extracted photos and
//! deleting archives that have been fully ingested.

mod local;
#[cfg(feature = "mock")]
mod mock;

pub use self::local::LocalBackend;
#[cfg(feature = "mock")]
pub use self::mock::MockBackend;
use crate::error::Result;
use crate::file::FileInfo;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::io::{Read, Seek};
use std::path::Path;
use std::pin::Pin;

type FileInfoStream<'a> = Pin<Box<dyn Stream<Item = Result<FileInfo>> + Send + 'a>>;

/// A synchronous reader that can also seek.
///
/// ZIP archives keep their central directory at the end of the file, so a
/// plain [`Read`] is not enough to open one.
pub trait SeekRead: Read + Seek + Send {}
impl<T: Read + Seek + Send> SeekRead for T {}

pub type BoxSeekRead = Box<dyn SeekRead + 'static>;

/// Unified interface for storage backends.
///
/// # Path Handling
/// All paths are relative to the storage root and must be validated using
/// [`validate_path`](crate::validate_path) before use. Implementations should
/// enforce this validation.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use shoebox_storage::{backend::StorageBackend, error::Result};
///
/// async fn inbox_size(backend: &dyn StorageBackend) -> Result<u64> {
///     let mut total = 0;
///     for file in backend.list(None).await? {
///         total += backend.stat(&file.path).await?.size;
///     }
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Name of the configured backend, used for logging only.
    fn name(&self) -> &str;

    /// List the files directly inside `dir` (or the storage root).
    ///
    /// Default implementation collects [`list_stream()`](Self::list_stream)
    /// into a [`Vec`].
    async fn list(&self, dir: Option<&Path>) -> Result<Vec<FileInfo>> {
        self.list_stream(dir).try_collect().await
    }

    /// Stream metadata of the files directly inside `dir` (or the storage
    /// root). The listing is **not** recursive: subdirectories are skipped,
    /// as are their contents.
    ///
    /// Asking for a directory that does not exist yields an empty stream.
    fn list_stream<'a>(&'a self, dir: Option<&'a Path>) -> FileInfoStream<'a>;

    /// Read file contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Open a file for synchronous, seekable reads.
    ///
    /// The async setup (opening the file) happens before returning; the
    /// returned reader is `'static` and blocking.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::io::{Read, Seek, SeekFrom};
    /// use std::path::Path;
    /// # use shoebox_storage::{backend::StorageBackend, error::Result};
    /// # async fn example(backend: &dyn StorageBackend) -> Result<()> {
    /// let mut reader = backend.reader(Path::new("ceremony.zip")).await?;
    /// // ZIP end-of-central-directory record lives in the last 22+ bytes.
    /// reader.seek(SeekFrom::End(-22)).unwrap();
    /// let mut eocd = [0u8; 4];
    /// reader.read_exact(&mut eocd).unwrap();
    /// # Ok(())
    /// # }
    /// ```
    async fn reader(&self, path: &Path) -> Result<BoxSeekRead>;

    /// Write file contents.
    ///
    /// Creates a new file or overwrites an existing file with the provided
    /// data. Implementations should create parent directories as needed.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Delete a file.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn delete(&self, path: &Path) -> Result<()>;

    /// Get file metadata without reading contents.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the file
    /// does not exist.
    async fn stat(&self, path: &Path) -> Result<FileInfo>;
}
