use crate::error::{ErrorKind, Result};
use crate::output::{Listing, Printer};
use crate::prompt;
use exn::ResultExt;
use futures::StreamExt;
use shoebox_catalog::{Category, Database, Repository};
use shoebox_config::Config;
use shoebox_ingest::{Archive, Context, Disposal, IngestEvent, Options, RunSummary, discover, ingest, inspect};
use shoebox_storage::BackendHandle;
use shoebox_storage::backend::LocalBackend;
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::process::ExitCode;
use std::sync::Arc;

/// Values every run needs once pre-flight checks have passed.
struct Run {
    inbox: BackendHandle,
    category: Category,
    uploader: String,
}

/// Process every archive in a folder, deleting the ones that went through.
pub async fn ingest_folder(
    config: &Config,
    folder: Option<PathBuf>,
    category: Option<String>,
    uploader: Option<String>,
    yes: bool,
) -> Result<ExitCode> {
    let folder = match folder {
        Some(folder) => folder,
        None if yes => config.inbox.folder.clone(),
        None => prompt::folder(&config.inbox.folder)?,
    };
    let folder = absolute(&folder)?;
    if !folder.is_dir() {
        exn::bail!(ErrorKind::FolderNotFound(folder));
    }
    let category = resolve_category(category)?;
    let uploader = uploader.unwrap_or_else(|| config.ingest.default_uploader.clone());

    let inbox: BackendHandle =
        Arc::new(LocalBackend::existing("inbox", &folder).or_raise(|| ErrorKind::FolderNotFound(folder.clone()))?);
    let archives = discover(&inbox, &config.inbox.suffix).await.or_raise(|| ErrorKind::Inbox)?;
    if archives.is_empty() {
        println!("No ZIP files found in {}", folder.display());
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", Listing(&archives));
    println!("Category: {} ({})", category.display_name(), category.slug());
    println!("Uploader: {uploader}");
    println!("Archives are deleted from {} once ingested.", folder.display());
    if !yes && !prompt::confirm("Continue?")? {
        println!("Cancelled");
        return Ok(ExitCode::SUCCESS);
    }

    let summary = execute(config, Run { inbox, category, uploader }, archives, Disposal::Retention).await?;
    Ok(exit_code(&summary))
}

/// Process a single archive and leave it where it is.
pub async fn upload(
    config: &Config,
    zip: PathBuf,
    category: Option<String>,
    uploader: Option<String>,
    yes: bool,
) -> Result<ExitCode> {
    let zip = absolute(&zip)?;
    if !zip.is_file() {
        exn::bail!(ErrorKind::ArchiveNotFound(zip));
    }
    let (Some(parent), Some(name)) = (zip.parent(), zip.file_name()) else {
        exn::bail!(ErrorKind::ArchiveNotFound(zip.clone()));
    };
    let category = resolve_category(category)?;
    let uploader = uploader.unwrap_or_else(|| config.ingest.default_uploader.clone());

    let inbox: BackendHandle =
        Arc::new(LocalBackend::existing("inbox", parent).or_raise(|| ErrorKind::ArchiveNotFound(zip.clone()))?);
    let size = inbox.stat(Path::new(name)).await.or_raise(|| ErrorKind::ArchiveNotFound(zip.clone()))?.size;
    let archive = Archive::new(name, size);

    if !yes {
        // An archive that can't be inspected still goes through the pipeline,
        // which reports it the same way as in a folder run.
        match inspect(&inbox, &archive).await {
            Ok(images) => println!("{} ({:.1} MB): {images} images", archive.name(), archive.size_mb()),
            Err(err) => println!("{} ({:.1} MB): {}", archive.name(), archive.size_mb(), &*err),
        }
        println!("Category: {} ({})", category.display_name(), category.slug());
        println!("Uploader: {uploader}");
        if !prompt::confirm("Continue?")? {
            println!("Cancelled");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let summary = execute(config, Run { inbox, category, uploader }, vec![archive], Disposal::Keep).await?;
    Ok(exit_code(&summary))
}

pub fn categories() -> ExitCode {
    for category in Category::ALL {
        println!("{}  {:<16} {}", category.shorthand(), category.slug(), category.display_name());
    }
    ExitCode::SUCCESS
}

/// Open the catalog and the photo store, then drive the pipeline to the end,
/// printing as it goes.
async fn execute(config: &Config, run: Run, archives: Vec<Archive>, disposal: Disposal) -> Result<RunSummary> {
    let db = Database::connect(&config.catalog.database).await.or_raise(|| ErrorKind::Catalog)?;
    let photos_root = absolute(&config.photos.root)?;
    let photos: BackendHandle = Arc::new(LocalBackend::new("photos", &photos_root).or_raise(|| ErrorKind::Storage)?);
    tracing::debug!(
        database = %config.catalog.database.display(),
        photos = %photos_root.display(),
        "Catalog and photo storage ready"
    );
    let ctx = Context {
        inbox: run.inbox,
        photos,
        catalog: Repository::from(&db).with_insert_retries(config.catalog.insert_retries),
        category: run.category,
        uploader: run.uploader,
        options: Options {
            batch_size: config.ingest.batch_size,
            max_entry_bytes: config.ingest.max_entry_bytes,
            batch_pause: config.ingest.batch_pause(),
            public_prefix: config.photos.public_prefix.clone(),
        },
    };

    let printer = Printer { error_limit: config.ingest.error_display_limit };
    let mut summary = RunSummary::default();
    let mut events = pin!(ingest(&ctx, archives, disposal));
    while let Some(event) = events.next().await {
        if let Some(line) = printer.render(&event) {
            println!("{line}");
        }
        if let IngestEvent::Complete(complete) = event {
            summary = complete;
        }
    }
    db.close().await;
    Ok(summary)
}

fn resolve_category(category: Option<String>) -> Result<Category> {
    match category {
        Some(raw) => raw.parse::<Category>().or_raise(|| ErrorKind::InvalidCategory(raw.clone())),
        None => prompt::category(),
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).or_raise(|| ErrorKind::FolderNotFound(path.to_path_buf()))
}

fn exit_code(summary: &RunSummary) -> ExitCode {
    if summary.is_success() { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3", Category::MorningWedding)]
    #[case("grooms-dinner", Category::GroomsDinner)]
    #[case(" Pre-Wedding ", Category::PreWedding)]
    fn test_resolve_category(#[case] raw: &str, #[case] expected: Category) {
        assert_eq!(resolve_category(Some(raw.to_string())).unwrap(), expected);
    }

    #[test]
    fn test_resolve_category_rejects_unknown() {
        let err = resolve_category(Some("reception".to_string())).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidCategory(raw) if raw == "reception"));
    }

    #[test]
    fn test_exit_code() {
        assert_eq!(exit_code(&RunSummary::default()), ExitCode::SUCCESS);
        let failed = RunSummary { total: 1, failed: 1, ..RunSummary::default() };
        assert_eq!(exit_code(&failed), ExitCode::FAILURE);
    }

    #[tokio::test]
    async fn test_ingest_missing_folder_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = ingest_folder(&Config::default(), Some(missing.clone()), Some("1".to_string()), None, true)
            .await
            .unwrap_err();
        assert!(matches!(&*err, ErrorKind::FolderNotFound(path) if *path == missing));
    }

    #[tokio::test]
    async fn test_ingest_empty_folder_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.catalog.database = dir.path().join("catalog.sqlite");
        config.photos.root = dir.path().join("photos");
        let code = ingest_folder(&config, Some(dir.path().to_path_buf()), Some("2".to_string()), None, true)
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(!config.catalog.database.exists());
        assert!(!config.photos.root.exists());
    }

    #[tokio::test]
    async fn test_upload_missing_archive_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.zip");
        let err = upload(&Config::default(), missing, Some("1".to_string()), None, true).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ArchiveNotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_keeps_archive() {
        use std::io::Write;
        use zip::write::{SimpleFileOptions, ZipWriter};

        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("upload.zip");
        let mut writer = ZipWriter::new(std::fs::File::create(&zip_path).unwrap());
        for name in ["a.jpg", "b.png", "notes.txt"] {
            writer.start_file(name, SimpleFileOptions::default()).unwrap();
            writer.write_all(name.as_bytes()).unwrap();
        }
        writer.finish().unwrap();

        let mut config = Config::default();
        config.catalog.database = dir.path().join("catalog.sqlite");
        config.photos.root = dir.path().join("photos");
        config.ingest.batch_pause_ms = 0;
        let code = upload(&config, zip_path.clone(), Some("4".to_string()), Some("ana@example.com".to_string()), true)
            .await
            .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);
        assert!(zip_path.exists());
        assert_eq!(std::fs::read_dir(&config.photos.root).unwrap().count(), 2);

        let db = Database::connect(&config.catalog.database).await.unwrap();
        let rows = Repository::from(&db).list_by_category(Category::GroomsDinner).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.photographer_email == "ana@example.com"));
        db.close().await;
    }
}
