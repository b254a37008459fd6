use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The initial reachability check failed; nothing was mutated
    #[error("Remote store unreachable: {0}")]
    ServerUnreachable(String),

    /// A local file could not be read while digesting
    #[error("Failed to digest {path}: {source}")]
    Digest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
