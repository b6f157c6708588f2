//! Layered configuration.
//!
//! Sources, lowest precedence first:
//!
//! 1. built-in defaults,
//! 2. a config file (TOML, YAML or JSON, picked by extension),
//! 3. environment variables prefixed `SHOEBOX_`, nested with `__`
//!    (`SHOEBOX_INGEST__BATCH_SIZE=50`).
//!
//! Command-line flags are applied on top by the binary.

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "SHOEBOX_";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub inbox: InboxConfig,
    pub photos: PhotosConfig,
    pub catalog: CatalogConfig,
    pub ingest: IngestConfig,
}

/// Where archives are picked up from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InboxConfig {
    pub folder: PathBuf,
    /// Matched case-insensitively against file names.
    pub suffix: String,
}

/// Where extracted photos are written, and how they are referred to publicly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    pub root: PathBuf,
    /// Prepended to the generated file name to form the catalog `image_url`.
    pub public_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    pub database: PathBuf,
    /// Extra attempts for an insert that hit a busy or locked database.
    pub insert_retries: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    pub batch_size: usize,
    /// Ceiling on the decompressed size of a single image.
    pub max_entry_bytes: u64,
    /// Pause between two batches of the same archive, in milliseconds.
    pub batch_pause_ms: u64,
    /// How many per-entry errors are printed before collapsing the rest.
    pub error_display_limit: usize,
    pub default_uploader: String,
}

impl Default for InboxConfig {
    fn default() -> Self {
        Self { folder: PathBuf::from("uploads/zip"), suffix: ".zip".to_string() }
    }
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self { root: PathBuf::from("uploads/photos"), public_prefix: "/uploads/photos".to_string() }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self { database: PathBuf::from("uploads/catalog.sqlite"), insert_retries: 2 }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_entry_bytes: 100 * 1024 * 1024,
            batch_pause_ms: 100,
            error_display_limit: 10,
            default_uploader: "photographer@example.com".to_string(),
        }
    }
}

impl IngestConfig {
    pub fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}

impl Config {
    /// Default config file location (`config.toml` in the platform config
    /// directory), if the platform has one.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "shoebox").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load and validate the configuration.
    ///
    /// An explicitly given `file` must exist. Without one, the
    /// [default location](Self::default_path) is used when present.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|path| path.is_file()),
        };
        let config: Self = Self::figment(file.as_deref())?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(file = ?file, "Loaded configuration");
        Ok(config)
    }

    /// Build the layered provider without extracting it.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            let extension = path.extension().and_then(|ext| ext.to_str()).map(str::to_ascii_lowercase);
            figment = match extension.as_deref() {
                Some("toml") => figment.merge(Toml::file_exact(path)),
                Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path)),
                Some("json") => figment.merge(Json::file_exact(path)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| exn::Exn::from(ErrorKind::Invalid(reason.to_string()));
        if self.ingest.batch_size == 0 {
            return Err(invalid("ingest.batch_size must be at least 1"));
        }
        if self.ingest.max_entry_bytes == 0 {
            return Err(invalid("ingest.max_entry_bytes must be at least 1"));
        }
        if self.ingest.default_uploader.trim().is_empty() {
            return Err(invalid("ingest.default_uploader must not be empty"));
        }
        if !self.inbox.suffix.starts_with('.') || self.inbox.suffix.len() < 2 {
            return Err(invalid("inbox.suffix must look like \".zip\""));
        }
        if !self.photos.public_prefix.starts_with('/') || self.photos.public_prefix.ends_with('/') {
            return Err(invalid("photos.public_prefix must start with '/' and not end with one"));
        }
        for (name, path) in [
            ("inbox.folder", &self.inbox.folder),
            ("photos.root", &self.photos.root),
            ("catalog.database", &self.catalog.database),
        ] {
            if path.as_os_str().is_empty() {
                return Err(invalid(&format!("{name} must not be empty")));
            }
        }
        if self.catalog.database == self.photos.root || self.inbox.folder == self.photos.root {
            return Err(invalid("inbox.folder, photos.root and catalog.database must be distinct"));
        }
        Ok(())
    }
}
