//! Application state: the single aggregate the update function owns.

use super::message::AppError;
use super::order_entry::OrderEntry;
use crate::domain::{Account, AccountId, BrokerEvent, Order, Position};

/// Named views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    /// Account summary.
    #[default]
    Dashboard,
    /// Orders table.
    Orders,
    /// Positions table.
    Positions,
    /// Order entry form.
    PlaceOrder,
}

impl View {
    /// Title shown above the view.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Dashboard => "Pony Trading Terminal",
            Self::Orders => "Orders",
            Self::Positions => "Positions",
            Self::PlaceOrder => "Place Order",
        }
    }
}

/// Application state.
///
/// Collections keep arrival order; reconciliation replaces records in place.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    /// Current view.
    pub view: View,
    /// Terminal width in columns.
    pub width: u16,
    /// Terminal height in rows.
    pub height: u16,
    /// Known accounts.
    pub accounts: Vec<Account>,
    /// Orders of the selected account.
    pub orders: Vec<Order>,
    /// Positions of the selected account.
    pub positions: Vec<Position>,
    /// Selected account, if any.
    pub selected_account: Option<AccountId>,
    /// Last error, cleared by the next successful transition.
    pub error: Option<AppError>,
    /// Stream termination, kept for the rest of the session.
    pub stream_error: Option<AppError>,
    /// A load or placement is in flight.
    pub loading: bool,
    /// Order entry form.
    pub order_entry: OrderEntry,
}

impl AppState {
    /// Empty state in the default view.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The selected account record, if it is still in the collection.
    #[must_use]
    pub fn selected(&self) -> Option<&Account> {
        let id = self.selected_account.as_ref()?;
        self.accounts.iter().find(|account| &account.id == id)
    }

    /// True when `event` refers to a cached record and would be applied.
    #[must_use]
    pub fn knows(&self, event: &BrokerEvent) -> bool {
        match event {
            BrokerEvent::TradeUpdate(order) => self
                .orders
                .iter()
                .any(|cached| cached.broker_order_id == order.broker_order_id),
            BrokerEvent::AccountUpdate(account) => self
                .accounts
                .iter()
                .any(|cached| cached.broker_account_id == account.broker_account_id),
        }
    }

    /// Error that should replace the current view, if any.
    #[must_use]
    pub fn transient_error(&self) -> Option<&AppError> {
        self.error.as_ref().filter(|err| !err.is_persistent())
    }
}
