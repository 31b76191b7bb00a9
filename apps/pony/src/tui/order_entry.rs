//! Order entry form: seven fields, one focus cursor, plain text buffers.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::message::Key;
use crate::domain::{
    AccountId, CreateOrderRequest, DomainError, OrderId, OrderSide, OrderType, Symbol,
    TimeInForce,
};

/// Form fields in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FormField {
    /// Ticker symbol (text).
    #[default]
    Symbol,
    /// Buy or sell (choice).
    Side,
    /// Quantity (text).
    Quantity,
    /// Order type (choice).
    OrderType,
    /// Limit price (text).
    LimitPrice,
    /// Stop price (text).
    StopPrice,
    /// Time-in-force (choice).
    TimeInForce,
}

impl FormField {
    /// Every field, in focus order.
    pub const ALL: [Self; 7] = [
        Self::Symbol,
        Self::Side,
        Self::Quantity,
        Self::OrderType,
        Self::LimitPrice,
        Self::StopPrice,
        Self::TimeInForce,
    ];

    /// Position in the focus cycle, `0..=6`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Field label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Symbol => "Symbol",
            Self::Side => "Side",
            Self::Quantity => "Quantity",
            Self::OrderType => "Type",
            Self::LimitPrice => "Limit Price",
            Self::StopPrice => "Stop Price",
            Self::TimeInForce => "Time in Force",
        }
    }

    /// Whether the field takes free text rather than a choice.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::Symbol | Self::Quantity | Self::LimitPrice | Self::StopPrice
        )
    }

    const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    const fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Unsubmitted order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OrderEntry {
    /// Symbol text.
    pub symbol: String,
    /// Side choice.
    pub side: OrderSide,
    /// Quantity text.
    pub quantity: String,
    /// Order type choice.
    pub order_type: OrderType,
    /// Limit price text.
    pub limit_price: String,
    /// Stop price text.
    pub stop_price: String,
    /// Time-in-force choice.
    pub time_in_force: TimeInForce,
    /// Focused field.
    pub focus: FormField,
}

impl OrderEntry {
    /// Apply one key. Enter is not handled here; submission belongs to the
    /// caller.
    pub fn handle_key(&mut self, key: Key) {
        match key {
            Key::Tab | Key::Down => self.focus = self.focus.next(),
            Key::BackTab | Key::Up => self.focus = self.focus.previous(),
            Key::Backspace => {
                if let Some(buffer) = self.focused_text_mut() {
                    buffer.pop();
                }
            }
            Key::Right | Key::Char(' ') => self.cycle(true),
            Key::Left => self.cycle(false),
            Key::Char(c) => self.insert(c),
            _ => {}
        }
    }

    /// Text currently held by a text field, or `None` for choice fields.
    #[must_use]
    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Symbol => Some(&self.symbol),
            FormField::Quantity => Some(&self.quantity),
            FormField::LimitPrice => Some(&self.limit_price),
            FormField::StopPrice => Some(&self.stop_price),
            FormField::Side | FormField::OrderType | FormField::TimeInForce => None,
        }
    }

    /// Build a validated request for `account_id`.
    ///
    /// Prices are only read for order types that use them.
    pub fn to_request(&self, account_id: AccountId) -> Result<CreateOrderRequest, DomainError> {
        let quantity = parse_decimal("quantity", &self.quantity)?
            .ok_or(DomainError::MissingField { field: "quantity" })?;

        let limit_price = if self.order_type.requires_limit_price() {
            parse_decimal("limit price", &self.limit_price)?
        } else {
            None
        };
        let stop_price = if self.order_type.requires_stop_price() {
            parse_decimal("stop price", &self.stop_price)?
        } else {
            None
        };

        let request = CreateOrderRequest {
            client_order_id: OrderId::generate(),
            account_id,
            symbol: Symbol::new(&self.symbol),
            side: self.side,
            order_type: self.order_type,
            quantity,
            limit_price,
            stop_price,
            time_in_force: self.time_in_force,
        };
        request.validate()?;
        Ok(request)
    }

    fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Symbol => Some(&mut self.symbol),
            FormField::Quantity => Some(&mut self.quantity),
            FormField::LimitPrice => Some(&mut self.limit_price),
            FormField::StopPrice => Some(&mut self.stop_price),
            FormField::Side | FormField::OrderType | FormField::TimeInForce => None,
        }
    }

    fn insert(&mut self, c: char) {
        match self.focus {
            FormField::Symbol if c.is_ascii_alphanumeric() || c == '.' => {
                self.symbol.push(c.to_ascii_uppercase());
            }
            FormField::Quantity | FormField::LimitPrice | FormField::StopPrice
                if c.is_ascii_digit() || c == '.' =>
            {
                if let Some(buffer) = self.focused_text_mut() {
                    buffer.push(c);
                }
            }
            _ => {}
        }
    }

    fn cycle(&mut self, forward: bool) {
        match self.focus {
            FormField::Side => {
                self.side = if forward { self.side.next() } else { self.side.previous() };
            }
            FormField::OrderType => {
                self.order_type = if forward {
                    self.order_type.next()
                } else {
                    self.order_type.previous()
                };
            }
            FormField::TimeInForce => {
                self.time_in_force = if forward {
                    self.time_in_force.next()
                } else {
                    self.time_in_force.previous()
                };
            }
            _ => {}
        }
    }
}

fn parse_decimal(field: &'static str, input: &str) -> Result<Option<Decimal>, DomainError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(trimmed)
        .map(Some)
        .map_err(|_| DomainError::InvalidNumber {
            field,
            input: trimmed.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    fn typed(entry: &mut OrderEntry, text: &str) {
        for c in text.chars() {
            entry.handle_key(Key::Char(c));
        }
    }

    #[test]
    fn defaults() {
        let entry = OrderEntry::default();
        assert_eq!(entry.focus.index(), 0);
        assert!(entry.symbol.is_empty());
        assert!(entry.quantity.is_empty());
        assert!(entry.limit_price.is_empty());
        assert!(entry.stop_price.is_empty());
        assert_eq!(entry.side.as_str(), "buy");
        assert_eq!(entry.order_type.as_str(), "market");
        assert_eq!(entry.time_in_force.as_str(), "day");
    }

    #[test_case(Key::Tab, 1 ; "tab advances")]
    #[test_case(Key::Down, 1 ; "down advances")]
    #[test_case(Key::BackTab, 6 ; "backtab wraps to last")]
    #[test_case(Key::Up, 6 ; "up wraps to last")]
    fn focus_moves_from_first_field(key: Key, expected: usize) {
        let mut entry = OrderEntry::default();
        entry.handle_key(key);
        assert_eq!(entry.focus.index(), expected);
    }

    #[test]
    fn focus_wraps_from_last_to_first() {
        let mut entry = OrderEntry {
            focus: FormField::TimeInForce,
            ..OrderEntry::default()
        };
        entry.handle_key(Key::Tab);
        assert_eq!(entry.focus, FormField::Symbol);
    }

    #[test]
    fn symbol_is_upper_cased_and_backspace_removes_last() {
        let mut entry = OrderEntry::default();
        typed(&mut entry, "aapl");
        assert_eq!(entry.symbol, "AAPL");

        entry.handle_key(Key::Backspace);
        assert_eq!(entry.symbol, "AAP");
    }

    #[test]
    fn numeric_fields_reject_letters() {
        let mut entry = OrderEntry {
            focus: FormField::Quantity,
            ..OrderEntry::default()
        };
        typed(&mut entry, "1x0.5");
        assert_eq!(entry.quantity, "10.5");
    }

    #[test]
    fn typing_on_choice_field_is_ignored() {
        let mut entry = OrderEntry {
            focus: FormField::Side,
            ..OrderEntry::default()
        };
        typed(&mut entry, "abc");
        entry.handle_key(Key::Backspace);
        assert_eq!(entry, OrderEntry { focus: FormField::Side, ..OrderEntry::default() });
    }

    #[test]
    fn choice_fields_cycle() {
        let mut entry = OrderEntry {
            focus: FormField::OrderType,
            ..OrderEntry::default()
        };
        entry.handle_key(Key::Right);
        assert_eq!(entry.order_type, OrderType::Limit);
        entry.handle_key(Key::Left);
        entry.handle_key(Key::Left);
        assert_eq!(entry.order_type, OrderType::StopLimit);

        entry.focus = FormField::Side;
        entry.handle_key(Key::Char(' '));
        assert_eq!(entry.side, OrderSide::Sell);

        entry.focus = FormField::TimeInForce;
        entry.handle_key(Key::Right);
        assert_eq!(entry.time_in_force, TimeInForce::Gtc);
    }

    #[test]
    fn to_request_builds_market_order() {
        let entry = OrderEntry {
            symbol: "MSFT".into(),
            quantity: "5".into(),
            limit_price: "123".into(),
            ..OrderEntry::default()
        };
        let request = entry.to_request(AccountId::new("A1")).unwrap();
        assert_eq!(request.symbol.as_str(), "MSFT");
        assert_eq!(request.quantity, dec!(5));
        assert_eq!(request.limit_price, None);
        assert_eq!(request.account_id, AccountId::new("A1"));
    }

    #[test]
    fn to_request_reads_prices_for_stop_limit() {
        let entry = OrderEntry {
            symbol: "MSFT".into(),
            quantity: "5".into(),
            order_type: OrderType::StopLimit,
            limit_price: "101.5".into(),
            stop_price: "100".into(),
            ..OrderEntry::default()
        };
        let request = entry.to_request(AccountId::new("A1")).unwrap();
        assert_eq!(request.limit_price, Some(dec!(101.5)));
        assert_eq!(request.stop_price, Some(dec!(100)));
    }

    #[test]
    fn to_request_errors() {
        let missing_qty = OrderEntry {
            symbol: "MSFT".into(),
            ..OrderEntry::default()
        };
        assert_eq!(
            missing_qty.to_request(AccountId::new("A1")),
            Err(DomainError::MissingField { field: "quantity" })
        );

        let bad_qty = OrderEntry {
            symbol: "MSFT".into(),
            quantity: "1..2".into(),
            ..OrderEntry::default()
        };
        assert!(matches!(
            bad_qty.to_request(AccountId::new("A1")),
            Err(DomainError::InvalidNumber { field: "quantity", .. })
        ));

        let no_symbol = OrderEntry {
            quantity: "1".into(),
            ..OrderEntry::default()
        };
        assert_eq!(
            no_symbol.to_request(AccountId::new("A1")),
            Err(DomainError::MissingField { field: "symbol" })
        );
    }
}
