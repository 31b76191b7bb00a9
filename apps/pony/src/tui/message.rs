//! Messages folded into the application state, and the errors they carry.

use thiserror::Error;

use crate::application::ports::{BrokerError, StoreError};
use crate::domain::{Account, BrokerEvent, DomainError, Order, Position};

/// Logical key, already decoded from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Printable character.
    Char(char),
    /// Enter / Return.
    Enter,
    /// Escape.
    Esc,
    /// Tab.
    Tab,
    /// Shift+Tab.
    BackTab,
    /// Arrow up.
    Up,
    /// Arrow down.
    Down,
    /// Arrow left.
    Left,
    /// Arrow right.
    Right,
    /// Backspace.
    Backspace,
    /// Ctrl+C.
    CtrlC,
}

impl Key {
    /// True for the keys that end the session.
    #[must_use]
    pub const fn is_quit(&self) -> bool {
        matches!(self, Self::Char('q') | Self::CtrlC)
    }
}

/// Error surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    /// A broker call failed.
    #[error(transparent)]
    Broker(#[from] BrokerError),

    /// A store query failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The order form was invalid.
    #[error("invalid order: {0}")]
    Validation(#[from] DomainError),

    /// The event subscription ended; live updates have stopped.
    #[error("live updates stopped: {0}")]
    StreamTerminated(String),
}

impl AppError {
    /// Persistent errors stay visible for the rest of the session.
    #[must_use]
    pub const fn is_persistent(&self) -> bool {
        matches!(self, Self::StreamTerminated(_))
    }
}

/// Everything the update function reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Terminal resized.
    Resize {
        /// Columns.
        width: u16,
        /// Rows.
        height: u16,
    },
    /// Keystroke.
    Key(Key),
    /// Account listing completed.
    AccountsLoaded(Vec<Account>),
    /// Order listing completed.
    OrdersLoaded(Vec<Order>),
    /// Position listing completed.
    PositionsLoaded(Vec<Position>),
    /// Event pushed by the broker stream.
    Stream(BrokerEvent),
    /// Order submission succeeded.
    OrderPlaced(Order),
    /// A command failed.
    Error(AppError),
}

impl Message {
    /// Static label for logging and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Resize { .. } => "resize",
            Self::Key(_) => "key",
            Self::AccountsLoaded(_) => "accounts_loaded",
            Self::OrdersLoaded(_) => "orders_loaded",
            Self::PositionsLoaded(_) => "positions_loaded",
            Self::Stream(_) => "stream",
            Self::OrderPlaced(_) => "order_placed",
            Self::Error(_) => "error",
        }
    }
}
