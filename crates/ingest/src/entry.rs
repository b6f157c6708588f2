use crate::error::{ErrorKind, Result};
use crate::{Context, NameGenerator};
use exn::ResultExt;
use shoebox_archive::error::ErrorKind as ArchiveErrorKind;
use shoebox_archive::{ArchiveReader, Entry};
use shoebox_catalog::Category;
use std::io::{Read, Seek};
use std::path::Path;
use tracing::instrument;

/// A photo that has been extracted and written to the photo storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedPhoto {
    /// Also the path relative to the photo storage root.
    pub file_name: String,
    /// What the catalog records as `image_url`.
    pub public_ref: String,
    pub category: Category,
    pub uploader: String,
}

/// Extract one entry, give it a fresh name and write it to the photo storage.
///
/// The size ceiling is enforced on the extracted bytes. Nothing is written
/// for an entry that fails; a file that was written stays, whatever happens
/// to its catalog row later.
#[instrument(level = "debug", skip_all, fields(entry = %entry.name))]
pub(crate) async fn process_entry<R: Read + Seek>(
    ctx: &Context,
    reader: &mut ArchiveReader<R>,
    entry: &Entry,
    names: &mut NameGenerator,
) -> Result<ProcessedPhoto> {
    let data = match reader.extract(entry, ctx.options.max_entry_bytes) {
        Ok(data) => data,
        Err(err) => {
            tracing::debug!(retryable = err.is_retryable(), error = ?err, "Extraction failed");
            let kind = match &*err {
                too_large @ ArchiveErrorKind::TooLarge { .. } => ErrorKind::EntryTooLarge(too_large.to_string()),
                other => ErrorKind::Extraction(other.to_string()),
            };
            return Err(err).or_raise(|| kind);
        },
    };
    let file_name = names.generate(&entry.name, &entry.extension());
    if let Err(err) = ctx.photos.write(Path::new(&file_name), &data).await {
        tracing::debug!(backend = ctx.photos.name(), retryable = err.is_retryable(), "Photo write failed");
        let kind = ErrorKind::Storage((*err).to_string());
        return Err(err).or_raise(|| kind);
    }
    tracing::debug!(file = %file_name, bytes = data.len(), "Stored photo");
    Ok(ProcessedPhoto {
        public_ref: format!("{}/{}", ctx.options.public_prefix, file_name),
        file_name,
        category: ctx.category,
        uploader: ctx.uploader.clone(),
    })
}
