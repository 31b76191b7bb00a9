//! The update function.
//!
//! `update` folds one message into the state and returns the commands to
//! run next. It never blocks and never performs I/O: the runtime owns the
//! channel, the executor owns the broker, and this module only decides.

use tracing::{debug, warn};

use super::message::{AppError, Key, Message};
use super::order_entry::OrderEntry;
use super::state::{AppState, View};
use crate::application::commands::Command;
use crate::domain::{AccountId, BrokerEvent, DomainError, Order};

/// Startup transition: the initial state plus the startup command batch.
#[must_use]
pub fn init(mut state: AppState) -> (AppState, Vec<Command>) {
    state.loading = true;
    (state, Command::initial())
}

/// Fold one message into the state.
#[must_use]
pub fn update(mut state: AppState, msg: Message) -> (AppState, Vec<Command>) {
    let commands = match msg {
        Message::Resize { width, height } => {
            state.width = width;
            state.height = height;
            Vec::new()
        }
        Message::Key(key) => handle_key(&mut state, key),
        Message::AccountsLoaded(accounts) => {
            debug!(count = accounts.len(), "Accounts loaded");
            settle(&mut state);
            state.selected_account = accounts.first().map(|account| account.id.clone());
            state.accounts = accounts;
            match state.selected_account.clone() {
                Some(account_id) => {
                    state.loading = true;
                    vec![Command::LoadOrders(account_id)]
                }
                None => Vec::new(),
            }
        }
        Message::OrdersLoaded(orders) => {
            debug!(count = orders.len(), "Orders loaded");
            settle(&mut state);
            state.orders = orders;
            Vec::new()
        }
        Message::PositionsLoaded(positions) => {
            debug!(count = positions.len(), "Positions loaded");
            settle(&mut state);
            state.positions = positions;
            Vec::new()
        }
        Message::Stream(event) => {
            apply_event(&mut state, event);
            Vec::new()
        }
        Message::OrderPlaced(order) => {
            debug!(broker_order_id = %order.broker_order_id, symbol = %order.symbol, "Order placed");
            settle(&mut state);
            match find_order(&mut state.orders, &order) {
                Some(slot) => replace_order(slot, order),
                None => state.orders.push(order),
            }
            Vec::new()
        }
        Message::Error(err) => {
            record_error(&mut state, err);
            Vec::new()
        }
    };

    (state, commands)
}

/// A command completed successfully.
fn settle(state: &mut AppState) {
    state.loading = false;
    state.error = None;
}

fn record_error(state: &mut AppState, err: AppError) {
    if err.is_persistent() {
        warn!(error = %err, "Event subscription terminated");
        state.stream_error = Some(err.clone());
    } else {
        debug!(error = %err, "Command failed");
    }
    state.loading = false;
    state.error = Some(err);
}

// ============================================================================
// Keys and views
// ============================================================================

fn handle_key(state: &mut AppState, key: Key) -> Vec<Command> {
    if key.is_quit() {
        return vec![Command::Quit];
    }

    match key {
        Key::Char('1') => {
            navigate(state, View::Dashboard);
            Vec::new()
        }
        Key::Char('2') => {
            navigate(state, View::Orders);
            load_for_selected(state, Command::LoadOrders)
        }
        Key::Char('3') => {
            navigate(state, View::Positions);
            load_for_selected(state, Command::LoadPositions)
        }
        Key::Char('n') if state.view == View::Orders => {
            navigate(state, View::PlaceOrder);
            state.order_entry = OrderEntry::default();
            Vec::new()
        }
        Key::Esc if state.view == View::PlaceOrder => {
            navigate(state, View::Orders);
            Vec::new()
        }
        Key::Enter if state.view == View::PlaceOrder => submit_order(state),
        _ if state.view == View::PlaceOrder => {
            state.error = None;
            state.order_entry.handle_key(key);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn navigate(state: &mut AppState, view: View) {
    state.view = view;
    state.error = None;
}

fn load_for_selected(
    state: &mut AppState,
    command: fn(AccountId) -> Command,
) -> Vec<Command> {
    match state.selected_account.clone() {
        Some(account_id) => {
            state.loading = true;
            vec![command(account_id)]
        }
        None => Vec::new(),
    }
}

fn submit_order(state: &mut AppState) -> Vec<Command> {
    let request = state
        .selected_account
        .clone()
        .ok_or(DomainError::NoAccountSelected)
        .and_then(|account_id| state.order_entry.to_request(account_id));

    match request {
        Ok(request) => {
            debug!(
                client_order_id = %request.client_order_id,
                symbol = %request.symbol,
                side = %request.side,
                order_type = %request.order_type,
                "Submitting order"
            );
            state.loading = true;
            navigate(state, View::Orders);
            vec![Command::PlaceOrder(request)]
        }
        Err(err) => {
            state.error = Some(AppError::Validation(err));
            Vec::new()
        }
    }
}

// ============================================================================
// Reconciliation
// ============================================================================

fn apply_event(state: &mut AppState, event: BrokerEvent) {
    let applied = match event {
        BrokerEvent::TradeUpdate(order) => match find_order(&mut state.orders, &order) {
            Some(slot) => {
                replace_order(slot, order);
                true
            }
            None => {
                debug!(broker_order_id = %order.broker_order_id, "Dropping trade update for unknown order");
                false
            }
        },
        BrokerEvent::AccountUpdate(account) => match state
            .accounts
            .iter_mut()
            .find(|cached| cached.broker_account_id == account.broker_account_id)
        {
            Some(slot) => {
                *slot = account;
                true
            }
            None => {
                debug!(broker_account_id = %account.broker_account_id, "Dropping account update for unknown account");
                false
            }
        },
    };

    if applied {
        state.error = None;
    }
}

fn find_order<'a>(orders: &'a mut [Order], incoming: &Order) -> Option<&'a mut Order> {
    orders
        .iter_mut()
        .find(|order| order.broker_order_id == incoming.broker_order_id)
}

/// Overwrite a cached order with a snapshot, logging suspicious transitions.
fn replace_order(slot: &mut Order, incoming: Order) {
    if slot.status.is_terminal() && !incoming.status.is_terminal() {
        warn!(
            broker_order_id = %incoming.broker_order_id,
            cached = %slot.status,
            incoming = %incoming.status,
            "Snapshot moves a terminal order back to an active status"
        );
    }
    if incoming.updated_at < slot.updated_at {
        warn!(
            broker_order_id = %incoming.broker_order_id,
            cached = %slot.updated_at,
            incoming = %incoming.updated_at,
            "Snapshot is older than the cached order"
        );
    }
    if incoming.is_overfilled() {
        warn!(
            broker_order_id = %incoming.broker_order_id,
            quantity = %incoming.quantity,
            filled_quantity = %incoming.filled_quantity,
            "Snapshot reports more filled than requested"
        );
    }

    *slot = incoming;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::BrokerError;
    use crate::domain::{OrderStatus, OrderType};
    use crate::tui::order_entry::FormField;
    use crate::tui::test_support::{account, order};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn state_with_account() -> AppState {
        AppState {
            accounts: vec![account("A1", "PA1")],
            selected_account: Some(AccountId::new("A1")),
            ..AppState::new()
        }
    }

    fn press(state: AppState, key: Key) -> (AppState, Vec<Command>) {
        update(state, Message::Key(key))
    }

    #[test]
    fn init_emits_startup_batch_and_sets_loading() {
        let (state, commands) = init(AppState::new());
        assert!(state.loading);
        assert_eq!(commands, Command::initial());
    }

    #[test]
    fn resize_only_records_dimensions() {
        let before = AppState {
            error: Some(AppError::Broker(BrokerError::RateLimited)),
            ..AppState::new()
        };
        let (state, commands) = update(
            before.clone(),
            Message::Resize {
                width: 120,
                height: 40,
            },
        );
        assert!(commands.is_empty());
        assert_eq!(state.width, 120);
        assert_eq!(state.height, 40);
        assert_eq!(state.error, before.error);
    }

    #[test]
    fn accounts_loaded_empty_leaves_no_selection() {
        let (state, commands) = update(AppState::new(), Message::AccountsLoaded(vec![]));
        assert_eq!(state.selected_account, None);
        assert_eq!(state.view, View::Dashboard);
        assert!(commands.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn accounts_loaded_selects_first_and_loads_its_orders() {
        let accounts = vec![account("A1", "PA1"), account("A2", "PA2")];
        let (state, commands) = update(AppState::new(), Message::AccountsLoaded(accounts));
        assert_eq!(state.selected_account, Some(AccountId::new("A1")));
        assert_eq!(commands, vec![Command::LoadOrders(AccountId::new("A1"))]);
        assert_eq!(state.accounts.len(), 2);
        assert!(state.loading);
    }

    #[test]
    fn orders_loaded_replaces_wholesale() {
        let before = AppState {
            orders: vec![order("O1", OrderStatus::New, dec!(0))],
            loading: true,
            ..AppState::new()
        };
        let (state, _) = update(
            before,
            Message::OrdersLoaded(vec![
                order("O2", OrderStatus::New, dec!(0)),
                order("O3", OrderStatus::Filled, dec!(10)),
            ]),
        );
        let ids: Vec<_> = state
            .orders
            .iter()
            .map(|o| o.broker_order_id.as_str())
            .collect();
        assert_eq!(ids, ["O2", "O3"]);
        assert!(!state.loading);
    }

    #[test]
    fn trade_update_replaces_order_in_place() {
        let before = AppState {
            orders: vec![
                order("O0", OrderStatus::New, dec!(0)),
                order("O1", OrderStatus::New, dec!(0)),
                order("O2", OrderStatus::New, dec!(0)),
            ],
            ..AppState::new()
        };
        let filled = order("O1", OrderStatus::Filled, dec!(10));
        let (state, commands) = update(
            before,
            Message::Stream(BrokerEvent::TradeUpdate(filled.clone())),
        );
        assert!(commands.is_empty());
        assert_eq!(state.orders.len(), 3);
        assert_eq!(state.orders[1], filled);
        assert_eq!(state.orders[1].filled_quantity, dec!(10));
    }

    #[test]
    fn trade_update_for_unknown_order_is_dropped() {
        let before = AppState {
            orders: vec![order("O1", OrderStatus::New, dec!(0))],
            ..AppState::new()
        };
        let (state, _) = update(
            before.clone(),
            Message::Stream(BrokerEvent::TradeUpdate(order("O9", OrderStatus::New, dec!(0)))),
        );
        assert_eq!(state, before);
    }

    #[test]
    fn overfilled_snapshot_is_applied_as_is() {
        let before = AppState {
            orders: vec![order("O1", OrderStatus::Filled, dec!(10))],
            ..AppState::new()
        };
        let mut bad = order("O1", OrderStatus::New, dec!(15));
        bad.updated_at = before.orders[0].updated_at - chrono::TimeDelta::seconds(5);
        let (state, _) = update(before, Message::Stream(BrokerEvent::TradeUpdate(bad.clone())));
        assert_eq!(state.orders, vec![bad]);
        assert!(state.orders[0].is_overfilled());
    }

    #[test]
    fn account_update_replaces_by_broker_account_id() {
        let before = state_with_account();
        let mut updated = account("A1", "PA1");
        updated.cash = dec!(42);
        let (state, _) = update(
            before,
            Message::Stream(BrokerEvent::AccountUpdate(updated.clone())),
        );
        assert_eq!(state.accounts, vec![updated]);

        let (unchanged, _) = update(
            state.clone(),
            Message::Stream(BrokerEvent::AccountUpdate(account("A9", "PA9"))),
        );
        assert_eq!(unchanged, state);
    }

    #[test]
    fn order_placed_appends_new_and_replaces_known() {
        let before = AppState {
            loading: true,
            orders: vec![order("O1", OrderStatus::New, dec!(0))],
            ..AppState::new()
        };
        let (state, _) = update(
            before,
            Message::OrderPlaced(order("O2", OrderStatus::New, dec!(0))),
        );
        assert_eq!(state.orders.len(), 2);
        assert!(!state.loading);

        let (state, _) = update(
            state,
            Message::OrderPlaced(order("O1", OrderStatus::PartiallyFilled, dec!(3))),
        );
        assert_eq!(state.orders.len(), 2);
        assert_eq!(state.orders[0].status, OrderStatus::PartiallyFilled);
    }

    #[test]
    fn stream_termination_is_recorded_without_changing_view() {
        let before = AppState {
            view: View::Positions,
            loading: true,
            ..state_with_account()
        };
        let err = AppError::StreamTerminated("connection reset".into());
        let (state, commands) = update(before, Message::Error(err.clone()));
        assert!(commands.is_empty());
        assert_eq!(state.error, Some(err.clone()));
        assert_eq!(state.stream_error, Some(err));
        assert!(!state.loading);
        assert_eq!(state.view, View::Positions);
        assert!(state.transient_error().is_none());
    }

    #[test]
    fn transient_error_is_cleared_by_next_load_but_stream_error_persists() {
        let (state, _) = update(
            AppState::new(),
            Message::Error(AppError::StreamTerminated("closed".into())),
        );
        let (state, _) = update(
            state,
            Message::Error(AppError::Broker(BrokerError::RateLimited)),
        );
        assert!(state.transient_error().is_some());

        let (state, _) = update(state, Message::PositionsLoaded(vec![]));
        assert!(state.error.is_none());
        assert!(state.stream_error.is_some());
    }

    #[test]
    fn failed_follow_up_load_keeps_loaded_accounts() {
        let (state, _) = update(
            AppState::new(),
            Message::AccountsLoaded(vec![account("A1", "PA1")]),
        );
        let (state, _) = update(
            state,
            Message::Error(AppError::Broker(BrokerError::Connection {
                message: "timeout".into(),
            })),
        );
        assert_eq!(state.accounts.len(), 1);
        assert_eq!(state.selected_account, Some(AccountId::new("A1")));
        assert!(!state.loading);
    }

    #[test_case(View::Dashboard ; "from dashboard")]
    #[test_case(View::Orders ; "from orders")]
    #[test_case(View::Positions ; "from positions")]
    #[test_case(View::PlaceOrder ; "from place order")]
    fn quit_keys_emit_quit(view: View) {
        let before = AppState { view, ..AppState::new() };
        for key in [Key::Char('q'), Key::CtrlC] {
            let (state, commands) = press(before.clone(), key);
            assert_eq!(commands, vec![Command::Quit]);
            assert_eq!(state, before);
        }
    }

    #[test_case(View::Dashboard ; "from dashboard")]
    #[test_case(View::Positions ; "from positions")]
    #[test_case(View::PlaceOrder ; "from place order")]
    fn key_two_opens_orders_and_loads(view: View) {
        let (state, commands) = press(AppState { view, ..state_with_account() }, Key::Char('2'));
        assert_eq!(state.view, View::Orders);
        assert_eq!(commands, vec![Command::LoadOrders(AccountId::new("A1"))]);
        assert!(state.loading);
    }

    #[test]
    fn key_three_opens_positions_and_loads() {
        let (state, commands) = press(state_with_account(), Key::Char('3'));
        assert_eq!(state.view, View::Positions);
        assert_eq!(commands, vec![Command::LoadPositions(AccountId::new("A1"))]);
    }

    #[test]
    fn navigation_without_selection_emits_nothing() {
        let (state, commands) = press(AppState::new(), Key::Char('2'));
        assert_eq!(state.view, View::Orders);
        assert!(commands.is_empty());
        assert!(!state.loading);

        let (state, commands) = press(state, Key::Char('1'));
        assert_eq!(state.view, View::Dashboard);
        assert!(commands.is_empty());
    }

    #[test]
    fn n_in_orders_opens_fresh_form() {
        let mut before = AppState {
            view: View::Orders,
            ..AppState::new()
        };
        before.order_entry.symbol = "OLD".into();
        before.order_entry.focus = FormField::StopPrice;

        let (state, commands) = press(before, Key::Char('n'));
        assert!(commands.is_empty());
        assert_eq!(state.view, View::PlaceOrder);
        assert_eq!(state.order_entry.focus.index(), 0);
        assert!(state.order_entry.symbol.is_empty());
        assert!(state.order_entry.quantity.is_empty());
        assert_eq!(state.order_entry.side.as_str(), "buy");
        assert_eq!(state.order_entry.order_type.as_str(), "market");
        assert_eq!(state.order_entry.time_in_force.as_str(), "day");
    }

    #[test]
    fn escape_leaves_place_order_only() {
        let (state, _) = press(
            AppState {
                view: View::PlaceOrder,
                ..AppState::new()
            },
            Key::Esc,
        );
        assert_eq!(state.view, View::Orders);

        let (state, _) = press(state, Key::Esc);
        assert_eq!(state.view, View::Orders);
    }

    #[test]
    fn form_keys_are_forwarded_in_place_order() {
        let state = AppState {
            view: View::PlaceOrder,
            ..state_with_account()
        };
        let (state, _) = press(state, Key::Char('m'));
        let (state, _) = press(state, Key::Char('s'));
        let (state, _) = press(state, Key::Tab);
        assert_eq!(state.order_entry.symbol, "MS");
        assert_eq!(state.order_entry.focus, FormField::Side);
    }

    #[test]
    fn enter_submits_valid_order_and_returns_to_orders() {
        let mut before = AppState {
            view: View::PlaceOrder,
            ..state_with_account()
        };
        before.order_entry.symbol = "AAPL".into();
        before.order_entry.quantity = "10".into();

        let (state, commands) = press(before, Key::Enter);
        assert_eq!(state.view, View::Orders);
        assert!(state.loading);
        assert_eq!(commands.len(), 1);
        let Command::PlaceOrder(request) = &commands[0] else {
            panic!("expected PlaceOrder, got {commands:?}");
        };
        assert_eq!(request.account_id, AccountId::new("A1"));
        assert_eq!(request.symbol.as_str(), "AAPL");
        assert_eq!(request.quantity, dec!(10));
        assert_eq!(request.order_type, OrderType::Market);
    }

    #[test]
    fn enter_with_invalid_form_stays_in_place_order() {
        let before = AppState {
            view: View::PlaceOrder,
            ..state_with_account()
        };
        let (state, commands) = press(before, Key::Enter);
        assert!(commands.is_empty());
        assert_eq!(state.view, View::PlaceOrder);
        assert!(matches!(state.error, Some(AppError::Validation(_))));
        assert!(!state.loading);
    }

    #[test]
    fn enter_without_account_is_a_validation_error() {
        let mut before = AppState {
            view: View::PlaceOrder,
            ..AppState::new()
        };
        before.order_entry.symbol = "AAPL".into();
        before.order_entry.quantity = "1".into();
        let (state, commands) = press(before, Key::Enter);
        assert!(commands.is_empty());
        assert_eq!(
            state.error,
            Some(AppError::Validation(DomainError::NoAccountSelected))
        );
    }

    // ------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------

    fn status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop_oneof![
            Just(OrderStatus::New),
            Just(OrderStatus::PartiallyFilled),
            Just(OrderStatus::Filled),
            Just(OrderStatus::Canceled),
            Just(OrderStatus::Rejected),
            Just(OrderStatus::Expired),
        ]
    }

    fn key_strategy() -> impl Strategy<Value = Key> {
        prop_oneof![
            any::<char>().prop_map(Key::Char),
            Just(Key::Enter),
            Just(Key::Esc),
            Just(Key::Tab),
            Just(Key::BackTab),
            Just(Key::Up),
            Just(Key::Down),
            Just(Key::Left),
            Just(Key::Right),
            Just(Key::Backspace),
            Just(Key::CtrlC),
        ]
    }

    fn view_strategy() -> impl Strategy<Value = View> {
        prop_oneof![
            Just(View::Dashboard),
            Just(View::Orders),
            Just(View::Positions),
            Just(View::PlaceOrder),
        ]
    }

    proptest! {
        #[test]
        fn unknown_broker_ids_are_never_inserted(
            known in 0usize..5,
            updates in prop::collection::vec((0usize..10, status_strategy(), 0u32..20), 0..30),
        ) {
            let orders: Vec<Order> = (0..known)
                .map(|i| order(&format!("O{i}"), OrderStatus::New, dec!(0)))
                .collect();
            let mut state = AppState { orders: orders.clone(), ..AppState::new() };

            for (i, status, filled) in updates {
                let incoming = order(&format!("O{i}"), status, filled.into());
                state = update(state, Message::Stream(BrokerEvent::TradeUpdate(incoming))).0;
            }

            let ids: Vec<_> = state.orders.iter().map(|o| o.broker_order_id.clone()).collect();
            let expected: Vec<_> = orders.iter().map(|o| o.broker_order_id.clone()).collect();
            prop_assert_eq!(ids, expected);
        }

        #[test]
        fn replacement_preserves_index(
            known in 1usize..8,
            pick in 0usize..8,
            status in status_strategy(),
            filled in 0u32..100,
        ) {
            let index = pick % known;
            let orders: Vec<Order> = (0..known)
                .map(|i| order(&format!("O{i}"), OrderStatus::New, dec!(0)))
                .collect();
            let incoming = order(&format!("O{index}"), status, filled.into());

            let state = AppState { orders, ..AppState::new() };
            let (state, _) = update(state, Message::Stream(BrokerEvent::TradeUpdate(incoming.clone())));

            prop_assert_eq!(state.orders.len(), known);
            prop_assert_eq!(&state.orders[index], &incoming);
        }

        #[test]
        fn unlisted_keys_keep_the_view(view in view_strategy(), key in key_strategy()) {
            let listed = key.is_quit()
                || matches!(key, Key::Char('1' | '2' | '3'))
                || (key == Key::Char('n') && view == View::Orders)
                || (key == Key::Esc && view == View::PlaceOrder)
                || (key == Key::Enter && view == View::PlaceOrder);
            prop_assume!(!listed);

            let before = AppState { view, ..state_with_account() };
            let (state, commands) = press(before.clone(), key);

            prop_assert_eq!(state.view, view);
            prop_assert!(commands.is_empty());
            if view != View::PlaceOrder {
                prop_assert_eq!(state, before);
            }
        }
    }
}
