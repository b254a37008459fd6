//! Content digesting
//!
//! Computes the fingerprint the remote store keys its duplicate index on:
//! SHA-1 of the file bytes, encoded as standard base64. Algorithm and
//! encoding are a hard external contract — a mismatch silently breaks
//! duplicate detection instead of erroring.
//!
//! Files are streamed in fixed-size chunks so memory use stays bounded no
//! matter how large a video file is. Digests are recomputed at every
//! reference during a run: the file's remote-side identity must reflect its
//! current on-disk bytes, so results are never cached across phases.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::SyncError;

/// Read size per chunk
const CHUNK_SIZE: usize = 1024 * 1024;

/// SHA-1 of a file in base64 (what the remote store uses for duplicate checks)
pub fn sha1_base64(path: &Path) -> Result<String, SyncError> {
    let map_err = |source: std::io::Error| SyncError::Digest {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(map_err)?;
    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buf).map_err(map_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(STANDARD.encode(hasher.finalize()))
}
