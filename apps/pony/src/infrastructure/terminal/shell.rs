//! Terminal shell: owns the terminal and runs the session loop.

use std::io::{self, Stdout};
use std::time::Instant;

use crossterm::event::{Event as TermEvent, EventStream};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::{Stream, StreamExt};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::mapper::map_event;
use super::renderer::render;
use crate::application::commands::{Command, CommandExecutor};
use crate::infrastructure::metrics;
use crate::tui::{AppState, Message, init, update};

/// Terminal shell error.
#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    /// Terminal I/O failed.
    #[error("terminal I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Owns the real terminal: raw mode and the alternate screen.
///
/// The terminal is restored by [`TerminalShell::restore`] or on drop,
/// whichever comes first.
pub struct TerminalShell {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    restored: bool,
}

impl std::fmt::Debug for TerminalShell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalShell")
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}

impl TerminalShell {
    /// Switch the terminal into raw mode on the alternate screen.
    pub fn enter() -> Result<Self, ShellError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self {
            terminal,
            restored: false,
        })
    }

    /// Run the session until quit, returning the final state.
    pub async fn run(
        &mut self,
        state: AppState,
        executor: &CommandExecutor,
        messages: mpsc::Receiver<Message>,
    ) -> Result<AppState, ShellError> {
        let events = EventStream::new();
        run_session(&mut self.terminal, events, messages, executor, state).await
    }

    /// Leave the alternate screen and raw mode.
    pub fn restore(&mut self) -> Result<(), ShellError> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for TerminalShell {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

/// The session loop, independent of the concrete terminal.
///
/// Seeds the viewport size and runs the startup batch. Then it folds every
/// terminal event and command result through [`update`], dispatches the
/// resulting commands and redraws. Ends when a `Quit` command is produced,
/// when the input stream ends, or when the message channel closes.
pub async fn run_session<B, E>(
    terminal: &mut Terminal<B>,
    mut events: E,
    mut messages: mpsc::Receiver<Message>,
    executor: &CommandExecutor,
    state: AppState,
) -> Result<AppState, ShellError>
where
    B: Backend,
    E: Stream<Item = io::Result<TermEvent>> + Unpin,
{
    // crossterm reports no size until the first resize.
    let size = terminal.size()?;
    let (state, _) = update(
        state,
        Message::Resize {
            width: size.width,
            height: size.height,
        },
    );
    let (mut state, commands) = init(state);
    executor.dispatch_all(commands);
    terminal.draw(|f| render(f, &state))?;
    info!("Session started");

    loop {
        let message = tokio::select! {
            () = executor.shutdown_requested() => {
                debug!("Shutdown requested outside the loop");
                break;
            }
            event = events.next() => match event {
                Some(Ok(event)) => match map_event(&event) {
                    Some(message) => message,
                    None => continue,
                },
                Some(Err(e)) => return Err(e.into()),
                None => {
                    info!("Terminal input ended");
                    break;
                }
            },
            message = messages.recv() => match message {
                Some(message) => message,
                None => {
                    info!("Message channel closed");
                    break;
                }
            },
        };

        let started = Instant::now();
        metrics::record_message(message.kind());
        if let Message::Stream(event) = &message {
            metrics::record_stream_event(event.kind(), state.knows(event));
        }
        let (next, commands) = update(state, message);
        state = next;
        let quit = commands.contains(&Command::Quit);
        executor.dispatch_all(commands);
        terminal.draw(|f| render(f, &state))?;
        metrics::record_cycle_duration(started.elapsed());

        if quit {
            info!("Session ended by user");
            break;
        }
    }

    Ok(state)
}
