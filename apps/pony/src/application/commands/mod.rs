//! Command Layer
//!
//! Commands wrap port calls and complete with exactly one message. They
//! never touch application state.

mod command;
mod executor;

pub use command::{Command, CommandContext};
pub use executor::CommandExecutor;
