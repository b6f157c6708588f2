//! SQLite photo catalog.
//!
//! Every ingested photo gets exactly one row in `photographer_photo`. The
//! catalog is strictly additive from the point of view of the ingestion
//! pipeline: rows are inserted, never updated or deleted.
//!
//! Inserts happen inside a [`CatalogBatch`], a scoped transaction that is
//! committed once per batch of archive entries. Dropping a batch without
//! committing rolls it back.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::models::{Category, PhotoRecord};
pub use crate::repo::{BatchCommit, CatalogBatch, DEFAULT_INSERT_RETRIES, Insert, Repository};
