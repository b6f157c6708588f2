//! Outcome accounting, from one batch up to the whole run.
//!
//! `successful + failed == total` holds at every level.

use crate::Archive;
use std::fmt;
use std::time::Duration;

/// One entry that didn't make it, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    /// Entry name inside the archive.
    pub entry: String,
    pub reason: String,
}

impl EntryFailure {
    pub fn new(entry: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self { entry: entry.into(), reason: reason.to_string() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<EntryFailure>,
    /// Successful entries whose catalog rows are still waiting on the commit.
    uncommitted: Vec<String>,
}

impl BatchResult {
    pub(crate) fn record_success(&mut self, entry: impl Into<String>) {
        self.total += 1;
        self.successful += 1;
        self.uncommitted.push(entry.into());
    }

    pub(crate) fn record_failure(&mut self, failure: EntryFailure) {
        self.total += 1;
        self.failed += 1;
        self.errors.push(failure);
    }

    pub(crate) fn committed(&mut self) {
        self.uncommitted.clear();
    }

    /// The batch transaction didn't commit: every entry that had succeeded so
    /// far is turned into a failure, even though its file is already stored.
    pub(crate) fn commit_failed(&mut self, reason: impl fmt::Display) {
        let reason = reason.to_string();
        for entry in self.uncommitted.drain(..) {
            self.successful -= 1;
            self.failed += 1;
            self.errors.push(EntryFailure { entry, reason: reason.clone() });
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArchiveResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub errors: Vec<EntryFailure>,
}

impl ArchiveResult {
    pub(crate) fn absorb(&mut self, batch: &BatchResult) {
        self.total += batch.total;
        self.successful += batch.successful;
        self.failed += batch.failed;
        self.errors.extend(batch.errors.iter().cloned());
    }

    /// Whether the source archive may be deleted: nothing failed, or at least
    /// one entry succeeded and fewer than 10% failed.
    pub fn within_tolerance(&self) -> bool {
        // Integer form of `failed < 0.1 * total`.
        self.failed == 0 || (self.successful > 0 && self.failed * 10 < self.total)
    }

    /// Entry failures, capped for display.
    pub fn error_list(&self, limit: usize) -> ErrorList<'_> {
        ErrorList { errors: &self.errors, limit }
    }
}

/// Renders at most `limit` entry failures, one per line, followed by a count
/// of the ones left out.
pub struct ErrorList<'a> {
    errors: &'a [EntryFailure],
    limit: usize,
}

impl ErrorList<'_> {
    pub fn hidden(&self) -> usize {
        self.errors.len().saturating_sub(self.limit)
    }
}

impl fmt::Display for ErrorList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for failure in self.errors.iter().take(self.limit) {
            writeln!(f, "   - {}: {}", failure.entry, failure.reason)?;
        }
        if self.hidden() > 0 {
            writeln!(f, "   ... and {} more errors", self.hidden())?;
        }
        Ok(())
    }
}

/// What happened to the source archive once processing stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveStatus {
    /// Within tolerance and removed from the inbox.
    Deleted,
    /// Left alone because deletion wasn't requested.
    Kept,
    /// Retained: too many entries failed.
    TooManyFailures,
    /// Retained: every batch ran and the result was within tolerance, but
    /// the archive could not be removed.
    DeleteFailed,
    /// Retained: processing stopped on an archive-level error.
    Failed(String),
}

impl fmt::Display for ArchiveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deleted => f.write_str("deleted"),
            Self::Kept => f.write_str("kept"),
            Self::TooManyFailures => f.write_str("too_many_failures"),
            Self::DeleteFailed => f.write_str("could not delete archive"),
            Self::Failed(reason) => f.write_str(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub archive: Archive,
    pub result: ArchiveResult,
    pub status: ArchiveStatus,
    pub elapsed: Duration,
}

impl ArchiveReport {
    pub fn is_success(&self) -> bool {
        match self.status {
            ArchiveStatus::Deleted => true,
            ArchiveStatus::Kept => self.result.failed == 0,
            ArchiveStatus::TooManyFailures | ArchiveStatus::DeleteFailed | ArchiveStatus::Failed(_) => false,
        }
    }

    /// Successfully stored photos per second.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 { self.result.successful as f64 / secs } else { 0.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFailure {
    pub archive: String,
    pub reason: String,
}

/// Run-level totals. Archive counters count archives; image counters only add
/// up archives whose batches all ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub total_images: usize,
    pub total_successful_images: usize,
    pub total_failed_images: usize,
    pub errors: Vec<ArchiveFailure>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub(crate) fn record(&mut self, report: &ArchiveReport) {
        self.total += 1;
        if !matches!(report.status, ArchiveStatus::Failed(_)) {
            self.total_images += report.result.total;
            self.total_successful_images += report.result.successful;
            self.total_failed_images += report.result.failed;
        }
        if report.is_success() {
            self.successful += 1;
            return;
        }
        self.failed += 1;
        let counts = format!("{} of {} images failed", report.result.failed, report.result.total);
        let reason = match &report.status {
            ArchiveStatus::TooManyFailures => format!("{} ({counts})", report.status),
            ArchiveStatus::Kept => counts,
            status => status.to_string(),
        };
        self.errors.push(ArchiveFailure { archive: report.archive.name(), reason });
    }

    /// `true` when every archive went through cleanly, including the case of
    /// there being nothing to do.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn result(total: usize, failed: usize) -> ArchiveResult {
        ArchiveResult { total, successful: total - failed, failed, errors: Vec::new() }
    }

    fn report(status: ArchiveStatus, total: usize, failed: usize) -> ArchiveReport {
        ArchiveReport {
            archive: Archive::new("day-one.zip", 1024),
            result: result(total, failed),
            status,
            elapsed: Duration::from_secs(2),
        }
    }

    #[rstest]
    #[case(10, 0, true)]
    #[case(0, 0, true)]
    #[case(100, 9, true)]
    #[case(100, 10, false)]
    #[case(11, 1, true)]
    #[case(10, 1, false)]
    #[case(1, 1, false)]
    #[case(5, 5, false)]
    #[case(1000, 99, true)]
    fn test_retention_policy(#[case] total: usize, #[case] failed: usize, #[case] delete: bool) {
        assert_eq!(result(total, failed).within_tolerance(), delete);
    }

    #[test]
    fn test_batch_accounting() {
        let mut batch = BatchResult::default();
        batch.record_success("a.jpg");
        batch.record_failure(EntryFailure::new("b.jpg", "file too large"));
        batch.record_success("c.jpg");
        batch.committed();
        assert_eq!((batch.total, batch.successful, batch.failed), (3, 2, 1));
        // Nothing left to reclassify after a successful commit.
        batch.commit_failed("late failure");
        assert_eq!(batch.failed, 1);
    }

    #[test]
    fn test_commit_failure_reclassifies_successes() {
        let mut batch = BatchResult::default();
        batch.record_success("a.jpg");
        batch.record_failure(EntryFailure::new("b.jpg", "file too large"));
        batch.record_success("c.jpg");
        batch.commit_failed("catalog commit failed");
        assert_eq!((batch.total, batch.successful, batch.failed), (3, 0, 3));
        let entries: Vec<_> = batch.errors.iter().map(|e| e.entry.as_str()).collect();
        assert_eq!(entries, vec!["b.jpg", "a.jpg", "c.jpg"]);
        assert_eq!(batch.errors[2].reason, "catalog commit failed");
    }

    #[test]
    fn test_archive_absorbs_batches() {
        let mut archive = ArchiveResult::default();
        for entries in [["a", "b"], ["c", "d"]] {
            let mut batch = BatchResult::default();
            batch.record_success(entries[0]);
            batch.record_failure(EntryFailure::new(entries[1], "broken"));
            archive.absorb(&batch);
        }
        assert_eq!((archive.total, archive.successful, archive.failed), (4, 2, 2));
        assert_eq!(archive.errors.len(), 2);
    }

    #[test]
    fn test_error_list_is_bounded() {
        let mut archive = ArchiveResult::default();
        let mut batch = BatchResult::default();
        for i in 0..13 {
            batch.record_failure(EntryFailure::new(format!("{i}.jpg"), "broken"));
        }
        archive.absorb(&batch);
        let list = archive.error_list(10);
        assert_eq!(list.hidden(), 3);
        let rendered = list.to_string();
        assert_eq!(rendered.lines().count(), 11);
        assert!(rendered.starts_with("   - 0.jpg: broken\n"));
        assert!(rendered.ends_with("   ... and 3 more errors\n"));
        assert_eq!(archive.error_list(20).to_string().lines().count(), 13);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = RunSummary::default();
        summary.record(&report(ArchiveStatus::Deleted, 10, 0));
        summary.record(&report(ArchiveStatus::TooManyFailures, 10, 5));
        summary.record(&report(ArchiveStatus::Failed("archive unreadable".to_string()), 0, 0));
        assert_eq!((summary.total, summary.successful, summary.failed), (3, 1, 2));
        assert_eq!(summary.total_images, 20);
        assert_eq!(summary.total_successful_images + summary.total_failed_images, summary.total_images);
        assert_eq!(summary.errors[0].reason, "too_many_failures (5 of 10 images failed)");
        assert_eq!(summary.errors[1].reason, "archive unreadable");
        assert_eq!(summary.errors[1].archive, "day-one.zip");
        assert!(!summary.is_success());
    }

    #[test]
    fn test_aborted_archive_adds_no_images() {
        let mut summary = RunSummary::default();
        summary.record(&report(ArchiveStatus::Failed("catalog connection failure".to_string()), 200, 0));
        assert_eq!((summary.total, summary.failed), (1, 1));
        assert_eq!(summary.total_images, 0);
        assert_eq!(summary.total_successful_images, 0);
        assert_eq!(summary.errors[0].reason, "catalog connection failure");

        // An archive that ran to the end but stayed in the inbox still counts.
        summary.record(&report(ArchiveStatus::DeleteFailed, 30, 1));
        assert_eq!((summary.total_images, summary.total_successful_images, summary.total_failed_images), (30, 29, 1));
        assert_eq!(summary.errors[1].reason, "could not delete archive");
        assert!(!summary.is_success());
    }

    #[test]
    fn test_kept_archive_succeeds_only_without_failures() {
        assert!(report(ArchiveStatus::Kept, 3, 0).is_success());
        assert!(!report(ArchiveStatus::Kept, 3, 1).is_success());
        assert!(RunSummary::default().is_success());
    }

    #[test]
    fn test_rate() {
        assert_eq!(report(ArchiveStatus::Deleted, 10, 0).rate(), 5.0);
    }
}
