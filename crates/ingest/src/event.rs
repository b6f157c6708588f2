use crate::report::{ArchiveReport, BatchResult, EntryFailure, RunSummary};
use crate::Archive;
use std::time::Duration;

/// Progress events emitted by [`ingest`](crate::ingest).
///
/// Events follow a strict ordering:
/// 1. [`Started`](Self::Started): exactly once.
/// 2. Per archive, in discovery order:
///    - [`ArchiveStarted`](Self::ArchiveStarted): once.
///    - [`ArchiveOpened`](Self::ArchiveOpened): once, unless the archive
///      can't be read.
///    - Per batch: [`Paused`](Self::Paused) (never before the first batch),
///      [`BatchStarted`](Self::BatchStarted), zero or more
///      [`EntryFailed`](Self::EntryFailed), then
///      [`BatchFinished`](Self::BatchFinished).
///    - [`ArchiveFinished`](Self::ArchiveFinished): once, always.
/// 3. [`Complete`](Self::Complete): exactly once, signalling the stream is
///    finished.
#[derive(Debug, Clone)]
pub enum IngestEvent {
    Started { archives: usize },
    ArchiveStarted { position: usize, of: usize, archive: Archive },
    ArchiveOpened { images: usize, batches: usize },
    /// `number` counts from 1.
    BatchStarted { number: usize, of: usize, entries: usize },
    EntryFailed(EntryFailure),
    /// Emitted after the batch transaction was committed (or failed to).
    BatchFinished(BatchResult),
    /// The pipeline waited this long between two batches.
    Paused(Duration),
    ArchiveFinished(ArchiveReport),
    Complete(RunSummary),
}
