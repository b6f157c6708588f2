//! Human-readable rendering of the pipeline's progress. Everything here goes
//! to stdout; logs go to stderr.

use shoebox_ingest::{Archive, ArchiveReport, ArchiveStatus, IngestEvent, RunSummary};
use std::fmt;

const RULE: &str = "==================================================";

/// The archives about to be processed, one per line, with their sizes.
pub struct Listing<'a>(pub &'a [Archive]);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Found {} ZIP file(s):", self.0.len())?;
        for (i, archive) in self.0.iter().enumerate() {
            writeln!(f, "  {}. {} ({:.1} MB)", i + 1, archive.name(), archive.size_mb())?;
        }
        let total: f64 = self.0.iter().map(Archive::size_mb).sum();
        write!(f, "Total size: {total:.1} MB")
    }
}

/// Per-archive report, with entry failures capped at `limit`.
pub struct Report<'a> {
    pub report: &'a ArchiveReport,
    pub limit: usize,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ArchiveReport { result, status, elapsed, .. } = self.report;
        writeln!(f, "   Total: {} | Successful: {} | Failed: {}", result.total, result.successful, result.failed)?;
        writeln!(f, "   Elapsed: {:.1}s | Rate: {:.1} photos/s", elapsed.as_secs_f64(), self.report.rate())?;
        if !result.errors.is_empty() {
            writeln!(f, "   Errors:")?;
            write!(f, "{}", result.error_list(self.limit))?;
        }
        match status {
            ArchiveStatus::Deleted => write!(f, "   Archive deleted"),
            ArchiveStatus::Kept => write!(f, "   Archive kept"),
            ArchiveStatus::TooManyFailures => write!(f, "   Archive retained: too many failures"),
            ArchiveStatus::DeleteFailed | ArchiveStatus::Failed(_) => write!(f, "   Archive retained: {status}"),
        }
    }
}

pub struct Summary<'a>(pub &'a RunSummary);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let summary = self.0;
        writeln!(f, "{RULE}")?;
        writeln!(f, "SUMMARY")?;
        writeln!(f, "{RULE}")?;
        writeln!(f, "Total ZIP Files: {}", summary.total)?;
        writeln!(f, "Successfully Processed: {}", summary.successful)?;
        writeln!(f, "Failed: {}", summary.failed)?;
        writeln!(f, "Total Images: {}", summary.total_images)?;
        writeln!(f, "Successful Images: {}", summary.total_successful_images)?;
        writeln!(f, "Failed Images: {}", summary.total_failed_images)?;
        write!(f, "Time Elapsed: {:.2} minutes", summary.elapsed.as_secs_f64() / 60.0)?;
        if !summary.errors.is_empty() {
            write!(f, "\n\nFailed ZIP files:")?;
            for (i, failure) in summary.errors.iter().enumerate() {
                write!(f, "\n  {}. {}: {}", i + 1, failure.archive, failure.reason)?;
            }
        }
        Ok(())
    }
}

/// Turns pipeline events into console lines.
pub struct Printer {
    pub error_limit: usize,
}

impl Printer {
    /// `None` for events that only show up in the logs.
    pub fn render(&self, event: &IngestEvent) -> Option<String> {
        match event {
            IngestEvent::ArchiveStarted { position, of, archive } => {
                Some(format!("\n[{position}/{of}] Processing {} ({:.1} MB)", archive.name(), archive.size_mb()))
            },
            IngestEvent::ArchiveOpened { images, batches } => {
                Some(format!("   Found {images} images in {batches} batch(es)"))
            },
            IngestEvent::BatchStarted { number, of, entries } => {
                Some(format!("   Batch {number}/{of}: {entries} images"))
            },
            IngestEvent::BatchFinished(batch) => {
                Some(format!("   Batch done: {} successful, {} failed", batch.successful, batch.failed))
            },
            IngestEvent::ArchiveFinished(report) => Some(Report { report, limit: self.error_limit }.to_string()),
            IngestEvent::Complete(summary) => Some(format!("\n{}", Summary(summary))),
            IngestEvent::Started { .. } | IngestEvent::EntryFailed(_) | IngestEvent::Paused(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shoebox_ingest::{ArchiveFailure, ArchiveResult, EntryFailure};
    use std::time::Duration;

    fn report(status: ArchiveStatus, failures: usize) -> ArchiveReport {
        let errors: Vec<_> = (0..failures).map(|i| EntryFailure::new(format!("img-{i}.jpg"), "broken")).collect();
        ArchiveReport {
            archive: Archive::new("day-one.zip", 3 * 1024 * 1024),
            result: ArchiveResult { total: 20 + failures, successful: 20, failed: failures, errors },
            status,
            elapsed: Duration::from_secs(4),
        }
    }

    #[test]
    fn test_listing() {
        let archives = [Archive::new("a.zip", 1024 * 1024), Archive::new("b.zip", 512 * 1024)];
        let text = Listing(&archives).to_string();
        assert_eq!(text, "Found 2 ZIP file(s):\n  1. a.zip (1.0 MB)\n  2. b.zip (0.5 MB)\nTotal size: 1.5 MB");
    }

    #[test]
    fn test_report_caps_errors() {
        let report = report(ArchiveStatus::TooManyFailures, 12);
        let text = Report { report: &report, limit: 10 }.to_string();
        assert!(text.starts_with("   Total: 32 | Successful: 20 | Failed: 12\n"));
        assert!(text.contains("Rate: 5.0 photos/s"));
        assert!(text.contains("   - img-9.jpg: broken\n"));
        assert!(!text.contains("img-10.jpg"));
        assert!(text.contains("   ... and 2 more errors\n"));
        assert!(text.ends_with("Archive retained: too many failures"));
    }

    #[test]
    fn test_report_without_errors() {
        let report = report(ArchiveStatus::Deleted, 0);
        let text = Report { report: &report, limit: 10 }.to_string();
        assert!(!text.contains("Errors:"));
        assert!(text.ends_with("Archive deleted"));
    }

    #[test]
    fn test_summary() {
        let summary = RunSummary {
            total: 3,
            successful: 2,
            failed: 1,
            total_images: 9,
            total_successful_images: 9,
            total_failed_images: 0,
            errors: vec![ArchiveFailure { archive: "2.zip".to_string(), reason: "archive unreadable".to_string() }],
            elapsed: Duration::from_secs(90),
        };
        let text = Summary(&summary).to_string();
        assert!(text.contains("Total ZIP Files: 3\n"));
        assert!(text.contains("Successfully Processed: 2\n"));
        assert!(text.contains("Time Elapsed: 1.50 minutes"));
        assert!(text.ends_with("Failed ZIP files:\n  1. 2.zip: archive unreadable"));
    }

    #[test]
    fn test_summary_without_failures() {
        let text = Summary(&RunSummary::default()).to_string();
        assert!(text.ends_with("Time Elapsed: 0.00 minutes"));
    }

    #[test]
    fn test_printer_skips_log_only_events() {
        let printer = Printer { error_limit: 10 };
        assert!(printer.render(&IngestEvent::Started { archives: 2 }).is_none());
        assert!(printer.render(&IngestEvent::Paused(Duration::from_millis(100))).is_none());
        let line = printer.render(&IngestEvent::BatchStarted { number: 2, of: 3, entries: 100 });
        assert_eq!(line.as_deref(), Some("   Batch 2/3: 100 images"));
    }
}
