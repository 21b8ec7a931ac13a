//! Dispenser view: today's counters, usage list and optional history.

use chrono::NaiveDate;
use dispenser_core::{UsageRecord, TIME_FORMAT};
use dispenser_ledger::UsageSummary;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::state::App;
use crate::theme::remaining_color;

pub const EMPTY_USAGE_MESSAGE: &str = "No paper dispensed yet today.";

/// Shown in place of the dispense prompt once today's allowance is used up.
pub const LIMIT_REACHED_MESSAGE: &str = "Daily limit reached. Dispensing is off until tomorrow.";

/// Prompt line under the counters.
pub fn dispense_prompt(summary: &UsageSummary, sheets: u32) -> String {
    if summary.can_dispense() {
        format!("Press d to dispense {sheets} sheets.")
    } else {
        LIMIT_REACHED_MESSAGE.to_string()
    }
}

/// Day shown to the user, `DD/MM/YYYY`.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// One line per dispense, or the empty-day message.
pub fn usage_lines(summary: &UsageSummary) -> Vec<String> {
    if summary.entries.is_empty() {
        return vec![EMPTY_USAGE_MESSAGE.to_string()];
    }
    summary
        .entries
        .iter()
        .map(|entry| {
            format!(
                "Use {}: {} sheets at {}",
                entry.ordinal,
                entry.sheets,
                entry.time.format(TIME_FORMAT)
            )
        })
        .collect()
}

/// One line per stored day, newest first.
pub fn history_lines(records: &[UsageRecord]) -> Vec<String> {
    records
        .iter()
        .rev()
        .map(|record| {
            let times: Vec<String> = record
                .events
                .iter()
                .map(|t| t.format(TIME_FORMAT).to_string())
                .collect();
            format!(
                "{}: {} use(s) {}",
                display_date(record.date),
                record.used(),
                times.join(", ")
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let Some(active) = app.session.active() else {
        return;
    };
    let summary = active.summary();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let status = vec![
        Line::from(format!("Welcome, {}.", summary.user)),
        Line::from(format!("Today: {}", display_date(summary.date))),
        Line::from(vec![
            Span::raw(format!("Used: {}   Remaining: ", summary.used)),
            Span::styled(
                summary.remaining.to_string(),
                Style::default().fg(remaining_color(summary.remaining, &app.theme)),
            ),
        ]),
        Line::from(Span::styled(
            dispense_prompt(&summary, active.sheets_per_dispense()),
            Style::default().fg(if summary.can_dispense() {
                app.theme.text_dim
            } else {
                app.theme.error
            }),
        )),
    ];
    f.render_widget(
        Paragraph::new(status)
            .style(Style::default().fg(app.theme.text))
            .block(Block::default().title("Status").borders(Borders::ALL)),
        rows[0],
    );

    let lists = match &app.history {
        Some(_) => Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]),
        None => Layout::default()
            .constraints([Constraint::Percentage(100)])
            .split(rows[1]),
    };

    let items: Vec<ListItem> = usage_lines(&summary).into_iter().map(ListItem::new).collect();
    f.render_widget(
        List::new(items)
            .style(Style::default().fg(app.theme.text))
            .block(Block::default().title("Today's usage").borders(Borders::ALL)),
        lists[0],
    );

    if let Some(history) = &app.history {
        let items: Vec<ListItem> = history_lines(history).into_iter().map(ListItem::new).collect();
        f.render_widget(
            List::new(items)
                .style(Style::default().fg(app.theme.text_dim))
                .block(Block::default().title("History").borders(Borders::ALL)),
            lists[1],
        );
    }
}
