//! medqc - interactive shell for the medical imaging QC service.
//!
//! Logs in against the QC backend, submits scans for hemorrhage detection
//! and shows issue summaries. The shell holds one session for its lifetime;
//! quitting ends it.

mod format;
mod shell;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use medqc_core::{ApiClient, Config, MemoryStorage, Router, SessionStore};

use shell::Shell;

/// Log file name prefix inside the cache directory
const LOG_FILE_PREFIX: &str = "medqc.log";

/// Initialize the tracing subscriber for logging.
/// Stderr gets `RUST_LOG` (default `warn`); a daily log file gets the same
/// filter when the cache directory is available.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match config.cache_dir() {
        Ok(dir) => {
            let appender = tracing_appender::rolling::daily(dir.join("logs"), LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        Err(_) => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_filter(filter()))
        .with(file_layer)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: ignoring config file: {:#}", e);
        Config::default()
    });
    let _log_guard = init_tracing(&config);
    info!("medqc starting");

    let pipeline_config = config.pipeline_config()?;
    info!(base_url = %pipeline_config.base_url, "Using backend");

    // Phase one: session and request pipeline, no navigator yet
    let session = SessionStore::new(Arc::new(MemoryStorage::new()));
    let api = ApiClient::new(pipeline_config, session.clone())
        .context("Failed to build HTTP client")?;

    // Phase two: router, handed back to the pipeline
    let router = Arc::new(Router::new(session));
    api.set_navigator(router.clone());

    let mut shell = Shell::new(api, router, config);
    shell.run().await?;

    info!("medqc shutting down");
    Ok(())
}
