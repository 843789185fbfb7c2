//! Transbasket translation gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   TRANSBASKET                    │
//!                      │                                                  │
//!   POST /translate    │  ┌────────┐   ┌───────────┐   ┌────────────┐     │
//!   ───────────────────┼─▶│  http  │──▶│ validator │──▶│ dispatcher │     │
//!                      │  │ server │   └───────────┘   └─────┬──────┘     │
//!                      │  └────────┘                         │            │
//!                      │       ▲                    ┌────────┴────────┐   │
//!                      │       │                    ▼                 ▼   │
//!   response           │       │              ┌──────────┐    ┌────────┐  │
//!   ◀──────────────────┼───────┘              │  cache   │    │ openai │──┼──▶ Backend
//!                      │                      │ (JSONL)  │    │ client │  │
//!                      │                      └──────────┘    └────────┘  │
//!                      │                                                  │
//!                      │  config · observability · resilience · lifecycle │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use transbasket::config::loader::{config_dir, finalize, read_config};
use transbasket::config::schema::LogFormat;
use transbasket::lifecycle::signals::spawn_signal_handler;
use transbasket::observability::{logging, metrics};
use transbasket::Gateway;

#[derive(Parser)]
#[command(name = "transbasket", version, about = "Translation gateway for OpenAI-compatible backends")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "TRANSBASKET_CONFIG", default_value = "transbasket.toml")]
    config: PathBuf,

    /// Override the listener bind address (e.g. 127.0.0.1:8889).
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the prompt prefix file.
    #[arg(short, long)]
    prompt: Option<PathBuf>,

    /// Override the log output format.
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = read_config(&args.config)?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }
    if let Some(prompt) = args.prompt {
        config.backend.prompt_prefix_file = Some(std::env::current_dir()?.join(prompt).display().to_string());
    }
    if let Some(format) = args.log_format {
        config.observability.log_format = format;
    }

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "transbasket starting");

    let config = finalize(config, &config_dir(&args.config))?;
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_in_flight = config.listener.max_in_flight,
        model = %config.backend.model,
        deadline_secs = config.backend.deadline_secs,
        cache_enabled = config.cache.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let gateway = Gateway::from_config(config)?;
    let listener = gateway.bind().await?;
    spawn_signal_handler(gateway.shutdown().clone(), gateway.cache().cloned());

    gateway.serve(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
