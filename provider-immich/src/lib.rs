//! # Immich Provider
//!
//! `MediaStore` implementation for the Immich server API.
//!
//! The connector is a thin, explicit wrapper: one method per endpoint the
//! engine needs, explicit timeouts, no implicit retry, and failures reported
//! as `CallFailed { endpoint, cause }` instead of raw transport errors. The
//! only policy it owns is bulk duplicate-check chunking, where each chunk is
//! an independent unit of work.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{ImmichConnector, DEFAULT_CHECK_CHUNK};
pub use error::ImmichError;
