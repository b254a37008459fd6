//! Ingest Runner Implementation over the Immich CLI
//!
//! Spawns `<program> upload [--dry-run] <paths...>` and reports nothing but
//! the exit code. The child inherits stdout/stderr so the CLI's own progress
//! output streams to the user unmodified.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    ingest::IngestRunner,
};
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

/// Ingest runner that shells out to the `immich` CLI
pub struct CliIngestRunner {
    program: String,
}

impl CliIngestRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for CliIngestRunner {
    fn default() -> Self {
        Self::new("immich")
    }
}

#[async_trait]
impl IngestRunner for CliIngestRunner {
    async fn upload(&self, paths: &[PathBuf], dry_run: bool) -> Result<i32> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("upload");
        if dry_run {
            cmd.arg("--dry-run");
        }
        for path in paths {
            cmd.arg(path);
        }

        debug!(program = %self.program, files = paths.len(), dry_run, "Spawning upload command");

        let status = cmd.status().await.map_err(|e| {
            BridgeError::OperationFailed(format!(
                "Failed to spawn upload command '{}': {}",
                self.program, e
            ))
        })?;

        // A signal-terminated child has no exit code; report it as failure.
        Ok(status.code().unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_exit_code_zero_on_success() {
        let runner = CliIngestRunner::new("true");
        // "true" ignores its arguments and exits 0
        let code = runner
            .upload(&[PathBuf::from("/tmp/does-not-matter.jpg")], false)
            .await
            .unwrap();
        assert_eq!(code, 0);
    }

    #[tokio::test]
    async fn test_nonzero_exit_code_surfaces() {
        let runner = CliIngestRunner::new("false");
        let code = runner.upload(&[], false).await.unwrap();
        assert_ne!(code, 0);
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let runner = CliIngestRunner::new("definitely-not-a-real-binary-xyz");
        let result = runner.upload(&[], false).await;
        assert!(result.is_err());
    }
}
