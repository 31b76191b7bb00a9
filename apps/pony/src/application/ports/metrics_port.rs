//! Command metrics port.
//!
//! The executor reports command lifecycle counts through this trait; the
//! infrastructure layer decides where they go.

use std::fmt::Debug;

/// Sink for command lifecycle counters.
pub trait CommandMetrics: Send + Sync + Debug {
    /// A command was handed to the executor.
    fn command_dispatched(&self, kind: &'static str);

    /// A command completed with an error message.
    fn command_failed(&self, kind: &'static str);
}

/// Discards every count.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetrics;

impl CommandMetrics for NoMetrics {
    fn command_dispatched(&self, _kind: &'static str) {}

    fn command_failed(&self, _kind: &'static str) {}
}
