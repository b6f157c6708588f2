//! Local filesystem storage backend.
//!
//! Files are stored in a configured directory and accessed using
//! `tokio::fs` for async I/O.

use crate::backend::{BoxSeekRead, FileInfoStream};
use crate::error::ErrorKind;
use crate::{FileInfo, StorageBackend, error::Result, path::validate as validate_path};
use async_stream::stream;
use async_trait::async_trait;
use exn::ResultExt;
use std::fs::{Metadata, create_dir_all as sync_create_dir};
use std::path::{Path, PathBuf};
use tokio::fs::{self, DirEntry};

/// Local filesystem storage backend.
///
/// Stores files in a directory on the local filesystem. All paths are relative
/// to the configured root directory.
///
/// # Examples
///
/// ```no_run
/// use shoebox_storage::backend::LocalBackend;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let photos = LocalBackend::new("photos", "/srv/wedding/uploads/photos")?;
/// let inbox = LocalBackend::existing("inbox", "/srv/wedding/uploads/zip")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalBackend {
    name: String,
    root: PathBuf,
}
impl LocalBackend {
    /// Create a new local filesystem backend, creating the root directory if
    /// it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute or exists but is not a
    /// directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::check_root(root.as_ref())?;
        if !root.exists() {
            // Use non-async here; it only happens once at startup and it's not
            // worth the hassle of making the constructor async.
            sync_create_dir(&root).map_err(|e| Self::map_io_error(e, &root))?;
        }
        Ok(Self { name: name.into(), root })
    }

    /// Open a backend on a directory that must already exist. Used for the
    /// archive inbox, where a missing folder is an operator mistake rather
    /// than something to paper over.
    pub fn existing(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = Self::check_root(root.as_ref())?;
        if !root.exists() {
            exn::bail!(ErrorKind::NotFound(root));
        }
        Ok(Self { name: name.into(), root })
    }

    fn check_root(root: &Path) -> Result<PathBuf> {
        let root = root.to_path_buf();
        if !root.is_absolute() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        if root.exists() && !root.is_dir() {
            exn::bail!(ErrorKind::InvalidPath(root));
        }
        Ok(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the absolute path for a relative storage path.
    fn absolute_path(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let validated = validate_path(path.as_ref())?;
        Ok(self.root.join(validated))
    }

    /// Convert an absolute path back to a relative storage path.
    fn relative_path(&self, absolute: impl AsRef<Path>) -> Result<PathBuf> {
        let absolute = absolute.as_ref();
        let relative = absolute.strip_prefix(&self.root).or_raise(|| {
            ErrorKind::BackendError(format!("path `{:?}` is not within root `{:?}`", absolute, self.root))
        })?;
        Ok(validate_path(relative)?)
    }

    fn metadata(path: &Path, metadata: Metadata) -> Result<FileInfo> {
        let modified = metadata.modified().map_err(ErrorKind::Io)?;
        Ok(FileInfo::new(path, metadata.len(), modified))
    }

    fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
            _ => ErrorKind::Io(e),
        }
    }

    /// Keeps `?` usable inside the listing stream: directories and anything
    /// that isn't a regular file come back as `None`.
    async fn process_entry(&self, entry: DirEntry) -> Result<Option<FileInfo>> {
        let path = entry.path();
        let metadata = entry.metadata().await.map_err(|e| Self::map_io_error(e, &path))?;
        if !metadata.is_file() {
            return Ok(None);
        }
        let relative = self.relative_path(&path)?;
        Ok(Some(Self::metadata(&relative, metadata)?))
    }
}

#[async_trait]
impl StorageBackend for LocalBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, dir: Option<&'a Path>) -> FileInfoStream<'a> {
        let directory = match dir.map(|d| self.absolute_path(d)).transpose() {
            Ok(d) => d.unwrap_or_else(|| self.root.clone()),
            Err(e) => return Box::pin(futures::stream::once(async { Result::Err(e) })),
        };

        Box::pin(stream! {
            let mut entries = match fs::read_dir(&directory).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
                Err(err) => {
                    yield Err(exn::Exn::from(Self::map_io_error(err, &directory)));
                    return;
                }
            };
            loop {
                let entry = match entries.next_entry().await {
                    Ok(Some(entry)) => entry,
                    Ok(None) => break,
                    Err(e) => { yield Err(exn::Exn::from(Self::map_io_error(e, &directory))); continue; },
                };
                match self.process_entry(entry).await {
                    Ok(Some(file)) => yield Ok(file),
                    Ok(None) => {},
                    Err(e) => yield Err(e),
                }
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let abs_path = self.absolute_path(path)?;
        Ok(fs::read(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn reader(&self, path: &Path) -> Result<BoxSeekRead> {
        let abs_path = self.absolute_path(path)?;
        let file = fs::File::open(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        Ok(Box::new(file.into_std().await))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        if let Some(parent) = abs_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| Self::map_io_error(e, path))?;
        }
        Ok(fs::write(&abs_path, data).await.map_err(|e| Self::map_io_error(e, path))?)
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let abs_path = self.absolute_path(path)?;
        fs::remove_file(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        tracing::debug!(backend = %self.name, path = %path.display(), "Deleted file");
        Ok(())
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let abs_path = self.absolute_path(path)?;
        let metadata = fs::metadata(&abs_path).await.map_err(|e| Self::map_io_error(e, path))?;
        Self::metadata(path, metadata)
    }
}
