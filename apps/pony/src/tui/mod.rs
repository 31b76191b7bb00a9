//! TUI core: messages, state, views, order entry and the update function.
//!
//! Everything here is synchronous and free of I/O. The terminal shell in
//! [`crate::infrastructure::terminal`] feeds messages in and draws the
//! resulting state.

mod message;
mod order_entry;
mod state;
mod update;

#[cfg(test)]
pub(crate) mod test_support;

pub use message::{AppError, Key, Message};
pub use order_entry::{FormField, OrderEntry};
pub use state::{AppState, View};
pub use update::{init, update};
