//! Command executor: spawns each command on the runtime and feeds its
//! completion message back into the channel.

use std::sync::Arc;

use tracing::{Instrument, debug, info_span};

use super::command::{Command, CommandContext};
use crate::application::ports::{CommandMetrics, NoMetrics};
use crate::tui::Message;

/// Runs commands on the tokio runtime.
#[derive(Debug, Clone)]
pub struct CommandExecutor {
    ctx: CommandContext,
    metrics: Arc<dyn CommandMetrics>,
}

impl CommandExecutor {
    /// Create an executor that records no metrics.
    #[must_use]
    pub fn new(ctx: CommandContext) -> Self {
        Self {
            ctx,
            metrics: Arc::new(NoMetrics),
        }
    }

    /// Report dispatches and failures to `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn CommandMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// True once `Quit` was dispatched.
    #[must_use]
    pub fn is_shutting_down(&self) -> bool {
        self.ctx.cancel_token().is_cancelled()
    }

    /// Resolves once `Quit` was dispatched.
    pub async fn shutdown_requested(&self) {
        self.ctx.cancel_token().cancelled().await;
    }

    /// Dispatch a batch.
    pub fn dispatch_all(&self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.dispatch(command);
        }
    }

    /// Dispatch one command.
    ///
    /// `Quit` cancels the session token, which stops the event
    /// subscription. Every other command runs in its own task.
    pub fn dispatch(&self, command: Command) {
        let kind = command.kind();
        self.metrics.command_dispatched(kind);

        if command == Command::Quit {
            debug!("Quit requested, cancelling session");
            self.ctx.cancel_token().cancel();
            return;
        }

        let ctx = self.ctx.clone();
        let metrics = Arc::clone(&self.metrics);
        tokio::spawn(
            async move {
                let Some(message) = command.run(&ctx).await else {
                    return;
                };
                if matches!(message, Message::Error(_)) {
                    metrics.command_failed(kind);
                }
                if ctx.sender().send(message).await.is_err() {
                    debug!(kind, "Runtime gone, dropping command result");
                }
            }
            .instrument(info_span!("command", kind)),
        );
    }
}
