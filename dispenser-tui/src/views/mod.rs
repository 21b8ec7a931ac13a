//! View rendering dispatch.

pub mod dispenser;
pub mod login;

use crate::state::{App, Screen};
use crate::theme::notification_color;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render_view(f: &mut Frame<'_>, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.size());

    render_header(f, app, layout[0]);

    match app.screen() {
        Screen::Login => login::render(f, app, layout[1]),
        Screen::Dispenser => dispenser::render(f, app, layout[1]),
    }

    render_footer(f, app, layout[2]);
}

fn render_header(f: &mut Frame<'_>, app: &App, area: Rect) {
    let title = match app.session.active() {
        Some(active) => format!("Paper Dispenser | {}", active.user()),
        None => "Paper Dispenser | Log in".to_string(),
    };
    let block = Block::default().borders(Borders::ALL).title(Span::styled(
        title,
        Style::default().fg(app.theme.primary),
    ));
    f.render_widget(block, area);
}

fn render_footer(f: &mut Frame<'_>, app: &App, area: Rect) {
    let can_dispense = app.session.active().is_some_and(|a| a.can_dispense());
    let help = match app.screen() {
        Screen::Login => "Tab switch field • Enter log in • Esc quit",
        Screen::Dispenser if can_dispense => {
            "d dispense • h history • r refresh • l log out • q quit"
        }
        Screen::Dispenser => "h history • r refresh • l log out • q quit",
    };
    let (text, style) = match &app.notification {
        Some(note) => (
            format!("{}: {}", note.level.label(), note.message),
            Style::default().fg(notification_color(note.level, &app.theme)),
        ),
        None => (help.to_string(), Style::default().fg(app.theme.text_dim)),
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(style);
    f.render_widget(footer, area);
}
