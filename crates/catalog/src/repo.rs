//! Repository for the photo catalog.
//!
//! Writes only ever happen through a [`CatalogBatch`]; the read queries exist
//! for reporting and for tests.

use crate::Database;
use crate::error::{ErrorKind, Result, is_transient};
use crate::models::{Category, PhotoRecord, PhotoRow};
use exn::ResultExt;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::time::Duration;
use tracing::instrument;

/// Default number of extra attempts for an insert that hit a busy/locked
/// database.
pub const DEFAULT_INSERT_RETRIES: u32 = 2;

const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Outcome of a single insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    /// A new row was written with the given id.
    Inserted(i64),
    /// A row with the same `image_url` already exists; nothing was written.
    Duplicate,
}

/// Row counts of a committed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCommit {
    pub inserted: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone)]
pub struct Repository {
    pool: SqlitePool,
    insert_retries: u32,
}
impl From<&Database> for Repository {
    fn from(db: &Database) -> Self {
        Self::new(db.pool().clone())
    }
}
impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, insert_retries: DEFAULT_INSERT_RETRIES }
    }

    /// How many times a transient insert failure is retried before the entry
    /// is given up on.
    pub fn with_insert_retries(mut self, retries: u32) -> Self {
        self.insert_retries = retries;
        self
    }

    // =========================================================================
    // Insert
    // =========================================================================

    /// Open the scoped transaction for one batch of entries.
    ///
    /// The catalog holds a single connection, so no other query can run on
    /// this repository until the batch is committed or dropped.
    pub async fn begin_batch(&self) -> Result<CatalogBatch> {
        let tx = self.pool.begin().await.or_raise(|| ErrorKind::Connection)?;
        Ok(CatalogBatch { tx, retries: self.insert_retries, inserted: 0, skipped: 0 })
    }

    // =========================================================================
    // Get/Fetch
    // =========================================================================

    pub async fn count(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(include_str!("../queries/count_photos.sql"))
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Query)?;
        u64::try_from(count).or_raise(|| ErrorKind::InvalidData("row count"))
    }

    pub async fn get_by_image_url(&self, image_url: impl AsRef<str>) -> Result<Option<PhotoRecord>> {
        let row: Option<PhotoRow> = sqlx::query_as(include_str!("../queries/get_by_image_url.sql"))
            .bind(image_url.as_ref())
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Query)?;
        row.map(PhotoRecord::try_from).transpose()
    }

    /// All photos filed under a category, oldest first.
    pub async fn list_by_category(&self, category: Category) -> Result<Vec<PhotoRecord>> {
        let rows: Vec<PhotoRow> = sqlx::query_as(include_str!("../queries/list_by_category.sql"))
            .bind(category.slug())
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Query)?;
        rows.into_iter().map(PhotoRecord::try_from).collect()
    }
}

/// A catalog transaction scoped to one batch of entries.
///
/// Rolled back when dropped without calling [`commit`](Self::commit).
pub struct CatalogBatch {
    tx: Transaction<'static, Sqlite>,
    retries: u32,
    inserted: usize,
    skipped: usize,
}

impl CatalogBatch {
    /// Record one photo.
    ///
    /// Busy/locked failures are retried up to the configured number of times;
    /// any other failure, or running out of attempts, fails this insert only.
    #[instrument(level = "debug", skip(self, uploader), fields(category = %category))]
    pub async fn insert(&mut self, image_url: &str, category: Category, uploader: &str) -> Result<Insert> {
        let mut attempt = 0;
        loop {
            let result = sqlx::query(include_str!("../queries/insert_photo.sql"))
                .bind(image_url)
                .bind(category.slug())
                .bind(uploader)
                .execute(&mut *self.tx)
                .await;
            match result {
                Ok(done) if done.rows_affected() == 0 => {
                    tracing::debug!("Duplicate image URL, skipping");
                    self.skipped += 1;
                    return Ok(Insert::Duplicate);
                },
                Ok(done) => {
                    self.inserted += 1;
                    return Ok(Insert::Inserted(done.last_insert_rowid()));
                },
                Err(err) if attempt < self.retries && is_transient(&err) => {
                    attempt += 1;
                    tracing::warn!(attempt, error = %err, "Catalog busy, retrying insert");
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                },
                Err(err) => return Err(err).or_raise(|| ErrorKind::Insert(image_url.to_string())),
            }
        }
    }

    /// Commit every insert made in this batch.
    pub async fn commit(self) -> Result<BatchCommit> {
        let counts = BatchCommit { inserted: self.inserted, skipped: self.skipped };
        self.tx.commit().await.or_raise(|| ErrorKind::Commit)?;
        tracing::debug!(inserted = counts.inserted, skipped = counts.skipped, "Committed catalog batch");
        Ok(counts)
    }
}
