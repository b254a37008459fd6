//! # Desktop Bridge Implementations
//!
//! Desktop-ready implementations of the `bridge-traits` seams:
//!
//! - [`ReqwestHttpClient`] - HTTP transport over reqwest (single attempt,
//!   explicit timeouts)
//! - [`CliIngestRunner`] - upload delegation to the `immich` CLI

pub mod http;
pub mod ingest;

pub use http::ReqwestHttpClient;
pub use ingest::CliIngestRunner;
