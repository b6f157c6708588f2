//! Archive ingestion pipeline.
//!
//! For every archive in the inbox: list its image entries, extract them in
//! fixed-size batches, store each photo under a generated name, record it in
//! the catalog, and finally delete the archive if enough of it went through.
//!
//! Everything runs sequentially: one archive, one batch, one entry at a time.
//! The entry point is [`ingest`], which streams [`IngestEvent`]s as it works.

mod batch;
mod discover;
mod entry;
pub mod error;
mod event;
mod naming;
mod report;
mod run;

pub use crate::discover::{Archive, discover, inspect};
pub use crate::entry::ProcessedPhoto;
pub use crate::event::IngestEvent;
pub use crate::naming::NameGenerator;
pub use crate::report::{
    ArchiveFailure, ArchiveReport, ArchiveResult, ArchiveStatus, BatchResult, EntryFailure, ErrorList, RunSummary,
};
pub use crate::run::ingest;

use shoebox_catalog::{Category, Repository};
use shoebox_storage::BackendHandle;
use std::time::Duration;

/// Everything a run needs, passed down explicitly.
pub struct Context {
    /// Where archives are read from (and deleted from).
    pub inbox: BackendHandle,
    /// Where extracted photos are written.
    pub photos: BackendHandle,
    pub catalog: Repository,
    pub category: Category,
    /// Recorded as `photographer_email` on every row.
    pub uploader: String,
    pub options: Options,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub batch_size: usize,
    pub max_entry_bytes: u64,
    /// Pause inserted between two batches of the same archive.
    pub batch_pause: Duration,
    /// Prefix of the public reference, without a trailing slash.
    pub public_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_entry_bytes: shoebox_archive::MAX_ENTRY_BYTES,
            batch_pause: Duration::from_millis(100),
            public_prefix: "/uploads/photos".to_string(),
        }
    }
}

/// What to do with an archive once it has been processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposal {
    /// Delete it when its result is within tolerance, retain it otherwise.
    Retention,
    /// Never delete.
    Keep,
}
