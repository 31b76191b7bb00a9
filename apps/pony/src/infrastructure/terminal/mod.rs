//! Terminal Shell
//!
//! - `mapper`: crossterm events to core messages
//! - `renderer`: application state to ratatui widgets
//! - `shell`: terminal ownership and the session loop

mod mapper;
mod renderer;
mod shell;

pub use mapper::{map_event, map_key};
pub use renderer::render;
pub use shell::{ShellError, TerminalShell, run_session};
