use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use shoebox_archive::error::ErrorKind as ArchiveErrorKind;
use shoebox_archive::{ArchiveReader, Entry};
use shoebox_storage::BackendHandle;
use shoebox_storage::backend::BoxSeekRead;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// An archive waiting in the inbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Relative to the inbox root.
    pub path: PathBuf,
    pub size: u64,
}

impl Archive {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self { path: path.into(), size }
    }

    pub fn name(&self) -> String {
        self.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    }

    pub fn size_mb(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

/// List the archives sitting directly in the inbox (no recursion), sorted by
/// name. `suffix` is matched case-insensitively.
#[instrument(skip(inbox), fields(inbox = inbox.name()))]
pub async fn discover(inbox: &BackendHandle, suffix: &str) -> Result<Vec<Archive>> {
    let files = inbox.list(None).await.or_raise(|| ErrorKind::Discovery)?;
    let mut archives: Vec<_> =
        files.into_iter().filter(|file| file.has_suffix(suffix)).map(|file| Archive::new(file.path, file.size)).collect();
    archives.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(archives = archives.len(), "Discovered archives");
    Ok(archives)
}

/// Count the image entries of an archive without extracting anything.
pub async fn inspect(inbox: &BackendHandle, archive: &Archive) -> Result<usize> {
    let (_, entries) = open(inbox, &archive.path).await?;
    Ok(entries.len())
}

/// Open an archive and list its image entries.
#[instrument(level = "debug", skip(inbox), fields(archive = %path.display()))]
pub(crate) async fn open(inbox: &BackendHandle, path: &Path) -> Result<(ArchiveReader<BoxSeekRead>, Vec<Entry>)> {
    let source = inbox.reader(path).await.or_raise(|| ErrorKind::ArchiveUnreadable)?;
    let mut reader = ArchiveReader::open(source).or_raise(|| ErrorKind::ArchiveUnreadable)?;
    match reader.image_entries() {
        Ok(entries) => Ok((reader, entries)),
        Err(err) if *err == ArchiveErrorKind::NoImagesFound => Err(err).or_raise(|| ErrorKind::NoImagesFound),
        Err(err) => Err(err).or_raise(|| ErrorKind::ArchiveUnreadable),
    }
}
