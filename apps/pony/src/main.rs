//! Pony Binary
//!
//! Starts the terminal dashboard.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p pony
//! ```
//!
//! # Environment Variables
//!
//! ## Required (unless `PONY_BROKER=mock`)
//! - `ALPACA_KEY`: Alpaca API key
//! - `ALPACA_SECRET`: Alpaca API secret
//!
//! ## Optional
//! - `PONY_ENV`: PAPER | LIVE (default: PAPER)
//! - `PONY_BROKER`: alpaca | mock (default: alpaca)
//! - `ALPACA_BASE_URL`: trading API host replacing the environment default
//! - `PONY_STORE_PATH`: JSON snapshot served instead of broker listings
//! - `PONY_HTTP_TIMEOUT_SECS`: per-request timeout (default: 30)
//! - `PONY_HTTP_MAX_RETRIES`: attempts per request (default: 3)
//! - `PONY_CHANNEL_CAPACITY`: message channel capacity (default: 256)
//! - `PONY_LOG_FILE`: log file path (default: pony.log)
//! - `PONY_METRICS_PORT`: Prometheus port, 0 disables (default: 0)
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `RUST_LOG`: Log filter (default: pony=info)

use std::sync::Arc;

use anyhow::Context;
use pony::application::{BrokerPort, CommandContext, CommandExecutor, StorePort};
use pony::infrastructure::alpaca::{AlpacaBrokerAdapter, AlpacaConfig};
use pony::infrastructure::config::{AppConfig, BrokerKind, load_dotenv};
use pony::infrastructure::metrics::{RecorderCommandMetrics, init_metrics};
use pony::infrastructure::mock::MockBroker;
use pony::infrastructure::store::JsonFileStore;
use pony::infrastructure::telemetry::{self, TelemetryConfig};
use pony::infrastructure::terminal::TerminalShell;
use pony::tui::AppState;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Already installed is fine.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let dotenv_path = load_dotenv();
    let config = AppConfig::from_env().context("invalid configuration")?;

    let _telemetry_guard = telemetry::init_with_config(&TelemetryConfig::from_env(
        config.log_file.clone(),
    ))
    .context("failed to initialise logging")?;

    info!("Starting Pony");
    if let Some(path) = dotenv_path {
        info!(path = %path.display(), "Loaded .env");
    }
    log_config(&config);

    if config.metrics_enabled() {
        if let Err(e) = init_metrics(config.metrics_port) {
            warn!(error = %e, port = config.metrics_port, "Prometheus exporter disabled");
        }
    }

    let broker = build_broker(&config)?;
    let store: Option<Arc<dyn StorePort>> = match &config.store_path {
        Some(path) => Some(Arc::new(
            JsonFileStore::open(path)
                .await
                .context("failed to open store snapshot")?,
        )),
        None => None,
    };

    let (sender, receiver) = mpsc::channel(config.channel_capacity);
    let cancel = CancellationToken::new();
    let executor = CommandExecutor::new(CommandContext::new(
        broker,
        store,
        sender,
        cancel.clone(),
    ))
    .with_metrics(Arc::new(RecorderCommandMetrics));

    let mut shell = TerminalShell::enter().context("failed to set up terminal")?;
    let result = shell.run(AppState::new(), &executor, receiver).await;
    cancel.cancel();
    shell.restore().context("failed to restore terminal")?;

    let state = result.context("session failed")?;
    info!(
        accounts = state.accounts.len(),
        orders = state.orders.len(),
        "Pony stopped"
    );
    Ok(())
}

fn build_broker(config: &AppConfig) -> anyhow::Result<Arc<dyn BrokerPort>> {
    match config.broker {
        BrokerKind::Mock => Ok(Arc::new(MockBroker::demo())),
        BrokerKind::Alpaca => {
            let alpaca_config =
                AlpacaConfig::from_app_config(config).context("missing Alpaca credentials")?;
            let adapter =
                AlpacaBrokerAdapter::new(&alpaca_config).context("failed to build Alpaca client")?;
            Ok(Arc::new(adapter))
        }
    }
}

fn log_config(config: &AppConfig) {
    info!(
        environment = config.environment.as_str(),
        broker = config.broker.as_str(),
        base_url = ?config.base_url,
        store = ?config.store_path,
        channel_capacity = config.channel_capacity,
        metrics_port = config.metrics_port,
        "Configuration loaded"
    );
    if config.environment.is_live() && config.broker == BrokerKind::Alpaca {
        warn!("LIVE environment - orders placed here execute real trades");
    }
}
