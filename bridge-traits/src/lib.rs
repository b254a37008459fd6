//! # Host Bridge Traits
//!
//! Capability traits that isolate the replacement engine from its
//! collaborators.
//!
//! ## Overview
//!
//! This crate defines the contract between the sync engine and everything it
//! cannot own: the HTTP transport, the remote media store's API surface, and
//! the external upload command. Each trait is a seam where a desktop
//! implementation (see `bridge-desktop`) or a test mock can be injected.
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP with explicit timeouts, no implicit retry
//! - [`MediaStore`](store::MediaStore) - The remote store capability contract
//! - [`IngestRunner`](ingest::IngestRunner) - Opaque upload command, exit-code-only
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type.
//! Implementations convert transport-specific errors into `BridgeError`
//! before they cross the boundary; the engine above only ever observes
//! `Result` values, never raw transport exceptions.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` bounds. The engine itself is
//! strictly sequential, but the seams stay object-safe behind `Arc<dyn _>`.

pub mod error;
pub mod http;
pub mod ingest;
pub mod store;

pub use error::BridgeError;

// Re-export commonly used types
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use ingest::IngestRunner;
pub use store::{
    AlbumDetail, AlbumSummary, CheckAction, DuplicateCheck, MediaStore, RemoteAssetSummary,
};
