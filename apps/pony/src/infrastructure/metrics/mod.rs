//! Prometheus Metrics Module
//!
//! # Metrics Categories
//!
//! - **Messages**: messages folded into the state, by kind
//! - **Stream**: broker events applied or dropped by reconciliation
//! - **Commands**: dispatches and failures, by kind
//! - **Latency**: time spent in one update + render cycle
//!
//! Recording without an installed recorder is a no-op, so the exporter is
//! optional and tests never install one.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use tracing::info;

use crate::application::ports::CommandMetrics;

// =============================================================================
// Exporter
// =============================================================================

static EXPORTER_ADDR: OnceLock<SocketAddr> = OnceLock::new();

/// Install the Prometheus recorder with an HTTP listener on `port`.
///
/// Must be called from within a tokio runtime. Calling it twice returns the
/// address of the first listener.
pub fn init_metrics(port: u16) -> Result<SocketAddr, BuildError> {
    if let Some(addr) = EXPORTER_ADDR.get() {
        return Ok(*addr);
    }

    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    register_metrics();
    info!(%addr, "Prometheus exporter listening");

    Ok(*EXPORTER_ADDR.get_or_init(|| addr))
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "pony_messages_processed_total",
        "Messages folded into the application state"
    );
    describe_counter!(
        "pony_stream_events_total",
        "Broker stream events by outcome (applied or dropped)"
    );
    describe_counter!(
        "pony_commands_dispatched_total",
        "Commands dispatched by the executor"
    );
    describe_counter!(
        "pony_commands_failed_total",
        "Commands that completed with an error"
    );
    describe_histogram!(
        "pony_cycle_seconds",
        "Time to fold one input and redraw the terminal"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome of reconciling one stream event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Replaced a cached record.
    Applied,
    /// No cached record matched.
    Dropped,
}

impl StreamOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::Dropped => "dropped",
        }
    }
}

impl From<bool> for StreamOutcome {
    fn from(applied: bool) -> Self {
        if applied { Self::Applied } else { Self::Dropped }
    }
}

/// Record one message folded into the state.
pub fn record_message(kind: &'static str) {
    counter!("pony_messages_processed_total", "kind" => kind).increment(1);
}

/// Record the reconciliation outcome of one stream event.
pub fn record_stream_event(kind: &'static str, applied: bool) {
    counter!(
        "pony_stream_events_total",
        "kind" => kind,
        "outcome" => StreamOutcome::from(applied).as_str()
    )
    .increment(1);
}

/// Record a command dispatch.
pub fn record_command_dispatched(kind: &'static str) {
    counter!("pony_commands_dispatched_total", "kind" => kind).increment(1);
}

/// Record a command that completed with an error message.
pub fn record_command_failed(kind: &'static str) {
    counter!("pony_commands_failed_total", "kind" => kind).increment(1);
}

/// Command metrics backed by the global recorder.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecorderCommandMetrics;

impl CommandMetrics for RecorderCommandMetrics {
    fn command_dispatched(&self, kind: &'static str) {
        record_command_dispatched(kind);
    }

    fn command_failed(&self, kind: &'static str) {
        record_command_failed(kind);
    }
}

/// Record the duration of one update + render cycle.
pub fn record_cycle_duration(duration: Duration) {
    histogram!("pony_cycle_seconds").record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_outcome_as_str() {
        assert_eq!(StreamOutcome::from(true).as_str(), "applied");
        assert_eq!(StreamOutcome::from(false).as_str(), "dropped");
    }

    #[test]
    fn recording_without_recorder_is_noop() {
        record_message("key");
        record_stream_event("trade_update", false);
        record_command_dispatched("load_accounts");
        record_command_failed("load_accounts");
        record_cycle_duration(Duration::from_millis(3));
        RecorderCommandMetrics.command_dispatched("quit");
        RecorderCommandMetrics.command_failed("place_order");
    }
}
