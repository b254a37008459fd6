//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the replacement engine:
//! - Run configuration (environment + `.env` layering, builder, validation)
//! - Logging and tracing setup
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other crates depend on. It
//! deliberately holds no sync logic: configuration is built here once and
//! injected into the engine, never read from ambient globals.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{load_dotenv, ResyncConfig, ResyncConfigBuilder};
pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat, LoggingConfig};
