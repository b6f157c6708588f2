//! Storage backends.
//!
//! Two roles in the pipeline go through the same [`StorageBackend`] trait:
//! the photo sink (extracted images are written into it) and the archive
//! inbox (archives are listed, opened and eventually deleted from it).

pub mod backend;
pub mod error;
pub mod file;
mod path;

pub use crate::backend::StorageBackend;
pub use crate::file::FileInfo;
pub use crate::path::validate as validate_path;
use std::sync::Arc;

pub type BackendHandle = Arc<dyn StorageBackend + Send + Sync>;
