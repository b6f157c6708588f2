//! In-memory storage backend for testing.

use super::{BoxSeekRead, FileInfoStream};
use crate::error::{ErrorKind, Result};
use crate::file::FileInfo;
use crate::path::validate as validate_path;
use async_stream::stream;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::StorageBackend;

/// In-memory storage backend for testing.
///
/// Files are stored in a map behind a [`RwLock`], so all trait methods can
/// operate on `&self` without external synchronisation. Failures can be
/// injected by write number ([`failing_writes`](Self::failing_writes)), so
/// tests can break the n-th photo of a batch without knowing its generated
/// name, and for every delete ([`failing_deletes`](Self::failing_deletes)).
///
/// # Examples
///
/// ```
/// use shoebox_storage::backend::{MockBackend, StorageBackend};
/// use std::path::Path;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = MockBackend::with_files([("ceremony.zip", b"PK...")]).failing_writes([2]);
/// backend.write(Path::new("photo-1-0-1.jpg"), b"jpeg").await?;
/// assert!(backend.write(Path::new("photo-1-1-1.jpg"), b"jpeg").await.is_err());
/// assert_eq!(backend.paths().await.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct MockBackend {
    name: String,
    storage: RwLock<BTreeMap<PathBuf, (OffsetDateTime, Vec<u8>)>>,
    writes: AtomicUsize,
    /// 1-based numbers of the writes that fail.
    failing_writes: HashSet<usize>,
    failing_deletes: bool,
}

impl MockBackend {
    /// Create a mock backend pre-populated with files.
    ///
    /// Panics if any path fails validation (e.g. path traversal). If test
    /// setup is wrong, then test should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl Into<PathBuf>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = BTreeMap::new();
        let now = OffsetDateTime::now_utc();
        for (path, data) in files {
            let path = path.into();
            let Ok(validated) = validate_path(&path) else {
                // The panic here is DELIBERATE. MockBackend is intended to be
                // used in tests; panics are expected. There is no error result.
                panic!("MockBackend::with_files: invalid path {}", path.display());
            };
            map.insert(validated, (now, data.into()));
        }
        Self {
            name: "mock".to_string(),
            storage: RwLock::new(map),
            writes: AtomicUsize::new(0),
            failing_writes: HashSet::new(),
            failing_deletes: false,
        }
    }

    /// Change the name of the mock backend.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make the given writes fail with an I/O error, counting every write
    /// attempt from 1.
    pub fn failing_writes(mut self, numbers: impl IntoIterator<Item = usize>) -> Self {
        self.failing_writes.extend(numbers);
        self
    }

    /// Make every delete fail with a permission error.
    pub fn failing_deletes(mut self) -> Self {
        self.failing_deletes = true;
        self
    }

    /// Snapshot of every stored path, sorted.
    pub async fn paths(&self) -> Vec<PathBuf> {
        self.storage.read().await.keys().cloned().collect()
    }

    fn not_found(path: PathBuf) -> exn::Exn<ErrorKind> {
        exn::Exn::from(ErrorKind::NotFound(path))
    }
}
impl Default for MockBackend {
    fn default() -> Self {
        let files: [(&str, &str); 0] = [];
        Self::with_files(files)
    }
}

#[async_trait]
impl StorageBackend for MockBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn list_stream<'a>(&'a self, dir: Option<&'a Path>) -> FileInfoStream<'a> {
        let directory = match dir.map(validate_path).transpose() {
            Ok(d) => d.unwrap_or_default(),
            Err(e) => return Box::pin(futures::stream::once(async { Err(e) })),
        };

        Box::pin(stream! {
            // Snapshot matching entries under the read lock, then drop it
            // before yielding to avoid holding the lock across yield points.
            let entries: Vec<FileInfo> = {
                let guard = self.storage.read().await;
                guard
                    .iter()
                    .filter(|(path, _)| path.parent() == Some(directory.as_path()))
                    .map(|(path, (inserted, data))| FileInfo::new(path.clone(), data.len() as u64, *inserted))
                    .collect()
            };
            for info in entries {
                yield Ok(info);
            }
        })
    }

    async fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let path = validate_path(path)?;
        let (_inserted, data) = self.storage.read().await.get(&path).cloned().ok_or_else(|| Self::not_found(path))?;
        Ok(data)
    }

    async fn reader(&self, path: &Path) -> Result<BoxSeekRead> {
        let data = self.read(path).await?;
        Ok(Box::new(Cursor::new(data)))
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        let path = validate_path(path)?;
        let number = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing_writes.contains(&number) {
            exn::bail!(ErrorKind::Io(std::io::Error::other("simulated write failure")));
        }
        self.storage.write().await.insert(path, (OffsetDateTime::now_utc(), data.to_vec()));
        Ok(())
    }

    async fn delete(&self, path: &Path) -> Result<()> {
        let path = validate_path(path)?;
        if self.failing_deletes {
            exn::bail!(ErrorKind::PermissionDenied(path));
        }
        self.storage.write().await.remove(&path).map(|_| ()).ok_or_else(|| Self::not_found(path))
    }

    async fn stat(&self, path: &Path) -> Result<FileInfo> {
        let path = validate_path(path)?;
        let guard = self.storage.read().await;
        let (inserted, data) = guard.get(&path).ok_or_else(|| Self::not_found(path.clone()))?;
        Ok(FileInfo::new(path.clone(), data.len() as u64, *inserted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[tokio::test]
    async fn test_write_and_read() {
        let backend = MockBackend::default();
        backend.write(Path::new("photo.jpg"), b"hello").await.unwrap();
        assert_eq!(backend.read(Path::new("photo.jpg")).await.unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_reader() {
        let backend = MockBackend::with_files([("a.zip", Vec::from(*b"PK\x05\x06"))]);
        let mut reader = backend.reader(Path::new("a.zip")).await.unwrap();
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, b"PK\x05\x06");
    }

    #[tokio::test]
    async fn test_failing_writes() {
        let backend = MockBackend::default().failing_writes([2]);
        backend.write(Path::new("first.jpg"), b"data").await.unwrap();
        let err = backend.write(Path::new("second.jpg"), b"data").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Io(_)));
        backend.write(Path::new("third.jpg"), b"data").await.unwrap();
        assert_eq!(backend.paths().await, vec![PathBuf::from("first.jpg"), PathBuf::from("third.jpg")]);
    }

    #[tokio::test]
    async fn test_failing_deletes() {
        let backend = MockBackend::with_files([("done.zip", Vec::from(*b"data"))]).failing_deletes();
        let err = backend.delete(Path::new("done.zip")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::PermissionDenied(_)));
        assert_eq!(backend.paths().await, vec![PathBuf::from("done.zip")]);
    }

    #[tokio::test]
    async fn test_delete() {
        let backend = MockBackend::with_files([("done.zip", Vec::from(*b"data"))]);
        backend.delete(Path::new("done.zip")).await.unwrap();
        assert!(backend.paths().await.is_empty());
        let err = backend.delete(Path::new("done.zip")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_is_not_recursive() {
        let backend = MockBackend::with_files([
            ("a.zip", Vec::from(*b"a")),
            ("b.zip", Vec::from(*b"b")),
            ("nested/c.zip", Vec::from(*b"c")),
        ]);
        let root = backend.list(None).await.unwrap();
        assert_eq!(root.len(), 2);
        let nested = backend.list(Some(Path::new("nested"))).await.unwrap();
        assert_eq!(nested.len(), 1);
        assert_eq!(nested[0].path, PathBuf::from("nested/c.zip"));
    }

    #[tokio::test]
    async fn test_stat() {
        let backend = MockBackend::with_files([("day.zip", Vec::from(*b"12345"))]);
        let info = backend.stat(Path::new("day.zip")).await.unwrap();
        assert_eq!(info.size, 5);
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let backend = MockBackend::default();
        assert!(backend.read(Path::new("../etc/passwd")).await.is_err());
        assert!(backend.write(Path::new("../escape"), b"bad").await.is_err());
    }

    #[test]
    #[should_panic(expected = "invalid path")]
    fn test_with_files_panics_on_bad_path() {
        MockBackend::with_files([("../escape", Vec::from(*b"bad"))]);
    }
}
