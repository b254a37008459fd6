//! Checkpoint Store
//!
//! Persists the index of the next group to process so an interrupted run
//! resumes instead of reprocessing. The file holds a plain integer; absent,
//! empty or non-numeric content means "start from zero". Writes are
//! best-effort — losing a checkpoint only costs redundant reprocessing on
//! the next run, never correctness.

use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// File-backed checkpoint mark
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the resume index; never fails
    pub fn load(&self) -> usize {
        match fs::read_to_string(&self.path) {
            Ok(content) => content.trim().parse().unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Persist the next group index; a failed write is swallowed
    pub fn store(&self, next_index: usize) {
        if let Err(e) = fs::write(&self.path, next_index.to_string()) {
            warn!(path = %self.path.display(), "Failed to write checkpoint: {}", e);
        }
    }
}
