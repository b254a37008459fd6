//! External Ingestion Mechanism
//!
//! The engine never talks to the upload endpoint itself; re-ingestion is
//! delegated to an opaque external command whose only contract is its exit
//! code. New remote assets are observed indirectly afterwards via name
//! search, never via the command's output.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::Result;

/// Opaque upload command runner
#[async_trait]
pub trait IngestRunner: Send + Sync {
    /// Upload the given files in order; returns the command's exit code
    /// (0 = success). A dry run must be forwarded to the command so it can
    /// simulate without mutating the store.
    async fn upload(&self, paths: &[PathBuf], dry_run: bool) -> Result<i32>;
}
