use crate::entry::{ProcessedPhoto, process_entry};
use crate::error::{ErrorKind, Result};
use crate::report::{BatchResult, EntryFailure};
use crate::{Context, IngestEvent, NameGenerator};
use async_stream::stream;
use exn::ResultExt;
use futures::Stream;
use shoebox_archive::{ArchiveReader, Entry};
use shoebox_catalog::CatalogBatch;
use std::io::{Read, Seek};

/// Number of batches `entries` entries split into.
pub(crate) fn batch_count(entries: usize, batch_size: usize) -> usize {
    entries.div_ceil(batch_size.max(1))
}

/// Drives every entry of one archive through extraction, storage and the
/// catalog, one batch at a time.
///
/// Entry failures are recorded and processing carries on. The only `Err` item
/// is a batch transaction that couldn't be opened, which ends the stream.
pub(crate) fn process_batches<'a, R: Read + Seek>(
    ctx: &'a Context,
    reader: &'a mut ArchiveReader<R>,
    entries: &'a [Entry],
    names: &'a mut NameGenerator,
) -> impl Stream<Item = Result<IngestEvent>> + 'a {
    let batch_size = ctx.options.batch_size.max(1);
    let pause = ctx.options.batch_pause;
    stream!({
        let of = batch_count(entries.len(), batch_size);
        for (index, batch) in entries.chunks(batch_size).enumerate() {
            if index > 0 {
                if !pause.is_zero() {
                    tokio::time::sleep(pause).await;
                }
                yield Ok(IngestEvent::Paused(pause));
            }
            yield Ok(IngestEvent::BatchStarted { number: index + 1, of, entries: batch.len() });

            let mut tx = match ctx.catalog.begin_batch().await {
                Ok(tx) => tx,
                Err(err) => {
                    tracing::error!(batch = index + 1, retryable = err.is_retryable(), error = ?err, "Could not open batch");
                    yield Err::<IngestEvent, _>(err).or_raise(|| ErrorKind::Connection);
                    return;
                },
            };
            let mut result = BatchResult::default();
            for entry in batch {
                match ingest_entry(ctx, reader, entry, names, &mut tx).await {
                    Ok(_) => result.record_success(&entry.name),
                    Err(err) => {
                        let kind: &ErrorKind = &err;
                        tracing::warn!(entry = %entry.name, retryable = kind.is_retryable(), error = %kind, "Entry failed");
                        let failure = EntryFailure::new(&entry.name, kind);
                        result.record_failure(failure.clone());
                        yield Ok(IngestEvent::EntryFailed(failure));
                    },
                }
            }
            match tx.commit().await {
                Ok(counts) => {
                    tracing::debug!(inserted = counts.inserted, skipped = counts.skipped, "Batch committed");
                    result.committed();
                },
                Err(err) => {
                    tracing::error!(batch = index + 1, retryable = err.is_retryable(), error = ?err, "Catalog commit failed");
                    result.commit_failed(ErrorKind::CatalogCommit);
                },
            }
            tracing::info!(
                batch = index + 1,
                of,
                successful = result.successful,
                failed = result.failed,
                "Batch finished"
            );
            yield Ok(IngestEvent::BatchFinished(result));
        }
    })
}

/// Entry Processor followed by the Catalog Writer.
async fn ingest_entry<R: Read + Seek>(
    ctx: &Context,
    reader: &mut ArchiveReader<R>,
    entry: &Entry,
    names: &mut NameGenerator,
    tx: &mut CatalogBatch,
) -> Result<ProcessedPhoto> {
    let photo = process_entry(ctx, reader, entry, names).await?;
    tx.insert(&photo.public_ref, photo.category, &photo.uploader).await.or_raise(|| ErrorKind::CatalogWrite)?;
    Ok(photo)
}
