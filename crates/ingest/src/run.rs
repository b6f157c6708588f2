use crate::batch::{batch_count, process_batches};
use crate::discover::{Archive, open};
use crate::error::ErrorKind;
use crate::report::{ArchiveReport, ArchiveResult, ArchiveStatus, RunSummary};
use crate::{Context, Disposal, IngestEvent, NameGenerator};
use async_stream::stream;
use futures::Stream;
use std::time::Instant;

/// Streams [`IngestEvent`]s while ingesting `archives`, in the given order.
///
/// Nothing in here is fatal to the run: an archive that can't be processed is
/// retained, reported in its [`ArchiveFinished`](IngestEvent::ArchiveFinished)
/// event and counted as failed, and the next archive is attempted. The final
/// [`Complete`](IngestEvent::Complete) event carries the run summary.
///
/// With [`Disposal::Retention`], an archive is deleted from the inbox once all
/// of its batches are done and its result is within tolerance.
pub fn ingest<'a>(ctx: &'a Context, archives: Vec<Archive>, disposal: Disposal) -> impl Stream<Item = IngestEvent> + 'a {
    stream!({
        let started = Instant::now();
        let mut names = NameGenerator::new();
        let mut summary = RunSummary::default();
        let of = archives.len();
        tracing::info!(archives = of, category = %ctx.category, uploader = %ctx.uploader, "Starting ingestion");
        yield IngestEvent::Started { archives: of };

        for (index, archive) in archives.into_iter().enumerate() {
            let archive_started = Instant::now();
            tracing::info!(archive = %archive.name(), position = index + 1, of, "Processing archive");
            yield IngestEvent::ArchiveStarted { position: index + 1, of, archive: archive.clone() };

            let mut result = ArchiveResult::default();
            // The reader is scoped to this block so that the archive is closed
            // before it gets deleted.
            let failure: Option<ErrorKind> = 'archive: {
                let (mut reader, entries) = match open(&ctx.inbox, &archive.path).await {
                    Ok(opened) => opened,
                    Err(err) => {
                        tracing::warn!(
                            archive = %archive.name(),
                            retryable = err.is_retryable(),
                            error = ?err,
                            "Could not open archive"
                        );
                        break 'archive Some((*err).clone());
                    },
                };
                yield IngestEvent::ArchiveOpened {
                    images: entries.len(),
                    batches: batch_count(entries.len(), ctx.options.batch_size),
                };
                for await event in process_batches(ctx, &mut reader, &entries, &mut names) {
                    match event {
                        Ok(event) => {
                            if let IngestEvent::BatchFinished(batch) = &event {
                                result.absorb(batch);
                            }
                            yield event;
                        },
                        Err(err) => {
                            tracing::error!(
                                archive = %archive.name(),
                                retryable = err.is_retryable(),
                                error = ?err,
                                "Archive aborted"
                            );
                            break 'archive Some((*err).clone());
                        },
                    }
                }
                None
            };

            let status = match failure {
                Some(kind) => ArchiveStatus::Failed(kind.to_string()),
                None => dispose(ctx, &archive, &result, disposal).await,
            };
            let report = ArchiveReport { archive, result, status, elapsed: archive_started.elapsed() };
            tracing::info!(
                archive = %report.archive.name(),
                total = report.result.total,
                successful = report.result.successful,
                failed = report.result.failed,
                status = %report.status,
                "Archive finished"
            );
            summary.record(&report);
            yield IngestEvent::ArchiveFinished(report);
        }

        summary.elapsed = started.elapsed();
        tracing::info!(
            successful = summary.successful,
            failed = summary.failed,
            images = summary.total_successful_images,
            "Ingestion complete"
        );
        yield IngestEvent::Complete(summary);
    })
}

/// Apply the disposal policy to an archive whose batches all ran.
async fn dispose(ctx: &Context, archive: &Archive, result: &ArchiveResult, disposal: Disposal) -> ArchiveStatus {
    match disposal {
        Disposal::Keep => ArchiveStatus::Kept,
        Disposal::Retention if !result.within_tolerance() => {
            tracing::warn!(archive = %archive.name(), failed = result.failed, total = result.total, "Too many failures, keeping archive");
            ArchiveStatus::TooManyFailures
        },
        Disposal::Retention => match ctx.inbox.delete(&archive.path).await {
            Ok(()) => ArchiveStatus::Deleted,
            Err(err) => {
                tracing::error!(
                    archive = %archive.name(),
                    retryable = err.is_retryable(),
                    error = ?err,
                    "Could not delete archive"
                );
                ArchiveStatus::DeleteFailed
            },
        },
    }
}
