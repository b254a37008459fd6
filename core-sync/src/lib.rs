//! # Replacement Reconciliation Engine
//!
//! Reconciles a local media tree against a remote media store, replacing
//! previously-ingested assets with re-processed versions while preserving
//! the user-visible state (favorite flag, album membership, edited/original
//! stacking) the store does not tie to content identity.
//!
//! ## Components
//!
//! - **Group Indexer** (`indexer`): classifies local files into logical
//!   asset groups (original/edited × photo/video) in deterministic walk order
//! - **Digest Service** (`digest`): streamed SHA-1/base64 content
//!   fingerprints matching the store's duplicate index
//! - **Metadata Snapshot** (`snapshot`): favorite/album capture before
//!   deletion, plus the run-wide album index type
//! - **Checkpoint Store** (`checkpoint`): persisted resume mark
//! - **Bounded retry** (`retry`): the sleep-and-repoll primitive behind
//!   verify-clear and settle
//! - **Replace Coordinator** (`coordinator`): the per-group state machine
//!   (resolve → snapshot → delete → verify → ingest → settle → relink →
//!   restore → checkpoint)

pub mod checkpoint;
pub mod coordinator;
pub mod digest;
pub mod error;
pub mod indexer;
pub mod retry;
pub mod snapshot;

pub use checkpoint::CheckpointStore;
pub use coordinator::{ReplaceCoordinator, RunSummary, SyncTuning};
pub use error::{Result, SyncError};
pub use indexer::LocalAssetGroup;
pub use retry::{poll_until, RetryPolicy};
pub use snapshot::{AlbumIndex, SnapshotState};
