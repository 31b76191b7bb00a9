//! Renderer: draws the application state with ratatui.
//!
//! Layout is `[banner | body | footer]`. The banner only takes space while a
//! persistent stream error is set; a transient error replaces the body.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};
use rust_decimal::Decimal;

use crate::domain::{Order, OrderSide, Position};
use crate::tui::{AppError, AppState, FormField, OrderEntry, View};

const NAVIGATION: &str = "[1] Dashboard  [2] Orders  [3] Positions  [q] Quit";

fn title_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

fn header_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

fn info_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

fn error_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

/// Render the whole screen.
pub fn render(f: &mut Frame, state: &AppState) {
    let banner_height = u16::from(state.stream_error.is_some());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    if let Some(err) = &state.stream_error {
        render_banner(f, err, chunks[0]);
    }

    match state.transient_error() {
        Some(err) => render_error(f, err, chunks[1]),
        None => match state.view {
            View::Dashboard => render_dashboard(f, state, chunks[1]),
            View::Orders => render_orders(f, &state.orders, chunks[1]),
            View::Positions => render_positions(f, &state.positions, chunks[1]),
            View::PlaceOrder => render_place_order(f, &state.order_entry, chunks[1]),
        },
    }

    render_footer(f, state, chunks[2]);
}

fn view_block(view: View) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(view.title(), title_style()))
}

fn render_banner(f: &mut Frame, err: &AppError, area: Rect) {
    let banner = Paragraph::new(Line::from(Span::styled(
        format!(" {err} "),
        Style::default().fg(Color::White).bg(Color::Red),
    )));
    f.render_widget(banner, area);
}

fn render_error(f: &mut Frame, err: &AppError, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(format!("Error: {err}"), error_style())),
        Line::from(""),
        Line::from(Span::styled(
            "Press a navigation key to continue",
            info_style(),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Error"))
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn render_dashboard(f: &mut Frame, state: &AppState, area: Rect) {
    let lines = match state.selected() {
        Some(account) => vec![
            Line::from(Span::styled("Account Summary", header_style())),
            Line::from(format!("ID: {}", account.broker_account_id)),
            Line::from(format!("Status: {}", account.status)),
            Line::from(format!("Cash: {}", money(account.cash))),
            Line::from(format!(
                "Portfolio Value: {}",
                money(account.portfolio_value)
            )),
            Line::from(format!("Buying Power: {}", money(account.buying_power))),
        ],
        None => vec![Line::from(Span::styled(
            "No account selected",
            info_style(),
        ))],
    };
    f.render_widget(
        Paragraph::new(lines).block(view_block(View::Dashboard)),
        area,
    );
}

fn render_orders(f: &mut Frame, orders: &[Order], area: Rect) {
    let block = view_block(View::Orders);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    if orders.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No orders found", info_style())),
            chunks[0],
        );
    } else {
        let header = Row::new(["Symbol", "Side", "Qty", "Type", "Status", "Filled"])
            .style(header_style());
        let rows = orders.iter().map(|order| {
            Row::new(vec![
                Cell::from(order.symbol.to_string()),
                Cell::from(Span::styled(
                    order.side.to_string(),
                    Style::default().fg(side_color(order)),
                )),
                Cell::from(format!("{:.2}", order.quantity)),
                Cell::from(order.order_type.to_string()),
                Cell::from(order.status.to_string()),
                Cell::from(format!(
                    "{:.2}/{:.2}",
                    order.filled_quantity, order.quantity
                )),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(15),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(12),
                Constraint::Length(18),
                Constraint::Min(15),
            ],
        )
        .header(header);
        f.render_widget(table, chunks[0]);
    }

    f.render_widget(
        Paragraph::new(Span::styled("Press 'n' to place new order", info_style())),
        chunks[1],
    );
}

const fn side_color(order: &Order) -> Color {
    match order.side {
        OrderSide::Buy => Color::Green,
        OrderSide::Sell => Color::Red,
    }
}

fn render_positions(f: &mut Frame, positions: &[Position], area: Rect) {
    let block = view_block(View::Positions);
    if positions.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No positions found", info_style())).block(block),
            area,
        );
        return;
    }

    let header = Row::new(["Symbol", "Qty", "Entry", "Current", "Value", "P/L"])
        .style(header_style());
    let rows = positions.iter().map(|pos| {
        let pl_color = if pos.unrealized_pl.is_sign_negative() {
            Color::Red
        } else {
            Color::Green
        };
        Row::new(vec![
            Cell::from(pos.symbol.to_string()),
            Cell::from(format!("{:.2}", pos.quantity)),
            Cell::from(money(pos.avg_entry_price)),
            Cell::from(money(pos.current_price)),
            Cell::from(money(pos.market_value)),
            Cell::from(Span::styled(
                format!(
                    "{} ({:.2}%)",
                    money(pos.unrealized_pl),
                    pos.unrealized_pl_pct * Decimal::ONE_HUNDRED
                ),
                Style::default().fg(pl_color),
            )),
        ])
    });
    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(10),
            Constraint::Length(13),
            Constraint::Length(13),
            Constraint::Length(13),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(block);
    f.render_widget(table, area);
}

fn render_place_order(f: &mut Frame, entry: &OrderEntry, area: Rect) {
    let mut lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| form_line(entry, field))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Tab/Shift+Tab move  Left/Right change  Press [Enter] to submit",
        info_style(),
    )));
    lines.push(Line::from(Span::styled("Press 'esc' to cancel", info_style())));

    f.render_widget(
        Paragraph::new(lines).block(view_block(View::PlaceOrder)),
        area,
    );
}

fn form_line(entry: &OrderEntry, field: FormField) -> Line<'static> {
    let focused = entry.focus == field;
    let unused = match field {
        FormField::LimitPrice => !entry.order_type.requires_limit_price(),
        FormField::StopPrice => !entry.order_type.requires_stop_price(),
        _ => false,
    };

    let value = match entry.text(field) {
        Some(text) if focused => format!("{text}_"),
        Some(text) => text.to_string(),
        None => {
            let choice = match field {
                FormField::Side => entry.side.to_string(),
                FormField::OrderType => entry.order_type.to_string(),
                _ => entry.time_in_force.to_string(),
            };
            format!("< {choice} >")
        }
    };

    let marker = if focused { "> " } else { "  " };
    let value_style = if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else if unused {
        info_style()
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(marker),
        Span::styled(format!("{:<14}", field.label()), header_style()),
        Span::styled(value, value_style),
    ])
}

fn render_footer(f: &mut Frame, state: &AppState, area: Rect) {
    let mut spans = Vec::new();
    if state.view != View::PlaceOrder {
        spans.push(Span::styled(NAVIGATION, info_style()));
    }
    if state.loading {
        spans.push(Span::raw("  "));
        spans.push(Span::styled("Loading...", Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn money(value: Decimal) -> String {
    if value.is_sign_negative() {
        format!("-${:.2}", value.abs())
    } else {
        format!("${value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountId, DomainError, OrderStatus, Symbol};
    use crate::tui::test_support::{account, order};
    use ratatui::{Terminal, backend::TestBackend};
    use rust_decimal_macros::dec;

    fn rendered(state: &AppState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 20)).unwrap();
        terminal.draw(|f| render(f, state)).unwrap();
        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|y| {
                (0..buffer.area.width)
                    .map(|x| buffer[(x, y)].symbol())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn money_formats_sign_and_cents() {
        assert_eq!(money(dec!(1234.5)), "$1234.50");
        assert_eq!(money(dec!(-12.3)), "-$12.30");
        assert_eq!(money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn dashboard_shows_selected_account() {
        let mut state = AppState::new();
        state.accounts = vec![account("A1", "PA123")];
        state.selected_account = Some(AccountId::new("A1"));

        let screen = rendered(&state);
        assert!(screen.contains("Pony Trading Terminal"));
        assert!(screen.contains("ID: PA123"));
        assert!(screen.contains("Cash: $10000.00"));
        assert!(screen.contains(NAVIGATION));
    }

    #[test]
    fn dashboard_without_account() {
        assert!(rendered(&AppState::new()).contains("No account selected"));
    }

    #[test]
    fn transient_error_replaces_view() {
        let mut state = AppState::new();
        state.view = View::Orders;
        state.error = Some(AppError::Validation(DomainError::MissingField {
            field: "symbol",
        }));

        let screen = rendered(&state);
        assert!(screen.contains("Error: invalid order: symbol is required"));
        assert!(!screen.contains("Press 'n' to place new order"));
    }

    #[test]
    fn stream_error_is_a_banner_over_the_view() {
        let mut state = AppState::new();
        state.view = View::Orders;
        state.orders = vec![order("o-1", OrderStatus::PartiallyFilled, dec!(4))];
        let err = AppError::StreamTerminated("connection reset".into());
        state.error = Some(err.clone());
        state.stream_error = Some(err);

        let screen = rendered(&state);
        assert!(screen.contains("live updates stopped: connection reset"));
        assert!(screen.contains("PARTIALLY_FILLED"));
        assert!(screen.contains("4.00/10.00"));
    }

    #[test]
    fn place_order_form_marks_focus_and_hides_navigation() {
        let mut state = AppState::new();
        state.view = View::PlaceOrder;
        state.order_entry.symbol = "AAPL".to_string();

        let screen = rendered(&state);
        assert!(screen.contains("> Symbol"));
        assert!(screen.contains("AAPL_"));
        assert!(screen.contains("< BUY >"));
        assert!(screen.contains("Press 'esc' to cancel"));
        assert!(!screen.contains(NAVIGATION));
    }

    #[test]
    fn positions_show_percent_and_loading() {
        let mut state = AppState::new();
        state.view = View::Positions;
        state.loading = true;
        state.positions = vec![Position {
            account_id: AccountId::new("A1"),
            symbol: Symbol::new("TSLA"),
            quantity: dec!(-3),
            avg_entry_price: dec!(241),
            current_price: dec!(245.10),
            market_value: dec!(-735.30),
            cost_basis: dec!(-723),
            unrealized_pl: dec!(-12.30),
            unrealized_pl_pct: dec!(-0.017),
        }];

        let screen = rendered(&state);
        assert!(screen.contains("TSLA"));
        assert!(screen.contains("-$12.30 (-1.70%)"));
        assert!(screen.contains("Loading..."));
    }
}
