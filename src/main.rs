//! Process bootstrap: configuration loading, logging setup, dependency
//! wiring, and exit-code policy.
//!
//! Exit codes: 0 when the run started (ping succeeded), regardless of
//! per-group failures — those are reported in the log summary; 1 when the
//! remote store was unreachable; 2 on configuration errors.

use std::process::ExitCode;
use std::sync::Arc;

use bridge_desktop::{CliIngestRunner, ReqwestHttpClient};
use bridge_traits::http::HttpClient;
use core_runtime::{init_logging, load_dotenv, LoggingConfig, ResyncConfig};
use core_sync::ReplaceCoordinator;
use provider_immich::ImmichConnector;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    load_dotenv();

    if let Err(e) = init_logging(LoggingConfig::default()) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(2);
    }

    let config = match ResyncConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(2);
        }
    };

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let store = Arc::new(
        ImmichConnector::new(http, config.base_url.clone(), config.api_key.clone())
            .with_chunk_size(config.api_chunk),
    );
    let ingest = Arc::new(CliIngestRunner::new(config.ingest_program.clone()));

    let coordinator = ReplaceCoordinator::new(config, store, ingest);
    match coordinator.run().await {
        Ok(_summary) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
