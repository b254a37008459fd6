//! # Run Configuration
//!
//! Configuration for one replacement run.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a
//! [`ResyncConfig`] that holds everything the engine needs: the remote
//! endpoint and credential, the local root to scan, the checkpoint location,
//! and the knobs for batching and media classification. It enforces
//! fail-fast validation so a misconfigured run aborts before any remote
//! mutation.
//!
//! There is no ambient global state: the config is built once at startup
//! (usually via [`ResyncConfig::from_env`], which honors `.env` files with
//! real environment variables taking priority) and passed explicitly to
//! every component that needs it.
//!
//! ## Usage
//!
//! ```no_run
//! use core_runtime::config::ResyncConfig;
//!
//! let config = ResyncConfig::builder()
//!     .base_url("https://photos.example.com")
//!     .api_key("key")
//!     .root("/data/takeout")
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use std::collections::HashSet;
use std::path::PathBuf;

/// Default bulk duplicate-check batch size
const DEFAULT_API_CHUNK: usize = 600;

/// Checkpoint filename placed under the scan root when not overridden
const DEFAULT_CHECKPOINT_NAME: &str = ".immich_resync.checkpoint";

fn default_photo_exts() -> HashSet<String> {
    ["heic", "jpg", "jpeg", "png", "dng", "raf", "cr2", "arw"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_video_exts() -> HashSet<String> {
    ["mov", "mp4", "m4v"].iter().map(|s| s.to_string()).collect()
}

/// Configuration for a replacement run
#[derive(Debug, Clone)]
pub struct ResyncConfig {
    /// Remote store base URL, without a trailing `/api`
    pub base_url: String,

    /// API credential sent as `x-api-key`
    pub api_key: String,

    /// Root of the local media tree to reconcile
    pub root: PathBuf,

    /// When set, all mutating calls are replaced by logged simulations and
    /// the checkpoint is never advanced
    pub dry_run: bool,

    /// Location of the checkpoint file
    pub checkpoint_file: PathBuf,

    /// How many assets to submit per bulk duplicate-check request
    pub api_chunk: usize,

    /// Lowercased photo extensions (without the dot)
    pub photo_exts: HashSet<String>,

    /// Lowercased video extensions (without the dot)
    pub video_exts: HashSet<String>,

    /// Program name of the external upload command
    pub ingest_program: String,
}

impl ResyncConfig {
    /// Creates a new builder for constructing a `ResyncConfig`.
    pub fn builder() -> ResyncConfigBuilder {
        ResyncConfigBuilder::default()
    }

    /// Build the configuration from the process environment.
    ///
    /// Recognized variables: `IMMICH_URL`, `IMMICH_API_KEY`, `ROOT`,
    /// `DRY_RUN` (`1` enables), `CHECKPOINT_FILE`. Call
    /// [`load_dotenv`](crate::config::load_dotenv) first if `.env` layering
    /// is wanted; environment variables always win over `.env` entries.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder()
            .base_url(std::env::var("IMMICH_URL").unwrap_or_default())
            .api_key(std::env::var("IMMICH_API_KEY").unwrap_or_default())
            .root(std::env::var("ROOT").unwrap_or_default())
            .dry_run(std::env::var("DRY_RUN").as_deref() == Ok("1"));

        if let Ok(path) = std::env::var("CHECKPOINT_FILE") {
            if !path.is_empty() {
                builder = builder.checkpoint_file(path);
            }
        }

        builder.build()
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http") {
            return Err(Error::Config(
                "Remote base URL must start with http(s); set IMMICH_URL and IMMICH_API_KEY"
                    .to_string(),
            ));
        }

        if self.api_key.is_empty() {
            return Err(Error::Config("API key cannot be empty".to_string()));
        }

        if self.root.as_os_str().is_empty() {
            return Err(Error::Config("Local root directory cannot be empty".to_string()));
        }

        if self.api_chunk == 0 {
            return Err(Error::Config(
                "Duplicate-check batch size must be greater than 0".to_string(),
            ));
        }

        if self.photo_exts.is_empty() && self.video_exts.is_empty() {
            return Err(Error::Config(
                "At least one photo or video extension must be configured".to_string(),
            ));
        }

        Ok(())
    }
}

/// Load `.env` files the way the tool expects: nearest file wins, real
/// environment variables always take priority over file entries.
pub fn load_dotenv() {
    // dotenvy never overrides variables that are already set.
    let _ = dotenvy::dotenv();
}

/// Builder for constructing [`ResyncConfig`] instances.
#[derive(Default)]
pub struct ResyncConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    root: Option<PathBuf>,
    dry_run: bool,
    checkpoint_file: Option<PathBuf>,
    api_chunk: Option<usize>,
    photo_exts: Option<HashSet<String>>,
    video_exts: Option<HashSet<String>>,
    ingest_program: Option<String>,
}

impl ResyncConfigBuilder {
    /// Sets the remote base URL (without trailing `/api`). A trailing slash
    /// is stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url: String = url.into();
        self.base_url = Some(url.trim_end_matches('/').to_string());
        self
    }

    /// Sets the API credential.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the local root directory to scan.
    pub fn root<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Enables or disables dry-run mode.
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Sets the checkpoint file path.
    ///
    /// Default: `.immich_resync.checkpoint` under the scan root.
    pub fn checkpoint_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.checkpoint_file = Some(path.into());
        self
    }

    /// Sets the bulk duplicate-check batch size.
    ///
    /// Default: 600.
    pub fn api_chunk(mut self, size: usize) -> Self {
        self.api_chunk = Some(size);
        self
    }

    /// Replaces the photo extension set (lowercase, without dots).
    pub fn photo_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.photo_exts = Some(exts.into_iter().map(Into::into).collect());
        self
    }

    /// Replaces the video extension set (lowercase, without dots).
    pub fn video_exts<I, S>(mut self, exts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.video_exts = Some(exts.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the external upload program.
    ///
    /// Default: `immich`.
    pub fn ingest_program(mut self, program: impl Into<String>) -> Self {
        self.ingest_program = Some(program.into());
        self
    }

    /// Builds the final `ResyncConfig` instance.
    pub fn build(self) -> Result<ResyncConfig> {
        let root = self.root.unwrap_or_default();

        let checkpoint_file = self
            .checkpoint_file
            .unwrap_or_else(|| root.join(DEFAULT_CHECKPOINT_NAME));

        let config = ResyncConfig {
            base_url: self.base_url.unwrap_or_default(),
            api_key: self.api_key.unwrap_or_default(),
            root,
            dry_run: self.dry_run,
            checkpoint_file,
            api_chunk: self.api_chunk.unwrap_or(DEFAULT_API_CHUNK),
            photo_exts: self.photo_exts.unwrap_or_else(default_photo_exts),
            video_exts: self.video_exts.unwrap_or_else(default_video_exts),
            ingest_program: self
                .ingest_program
                .unwrap_or_else(|| "immich".to_string()),
        };

        config.validate()?;

        Ok(config)
    }
}
