//! Login form.

use crate::state::{App, LoginField};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame<'_>, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(0),
        ])
        .split(area);

    let form = &app.login;
    let field = |title: &'static str, value: String, focused: bool| {
        let border = if focused {
            app.theme.border_focus
        } else {
            app.theme.border
        };
        Paragraph::new(value).style(Style::default().fg(app.theme.text)).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(border)),
        )
    };

    f.render_widget(
        field(
            "Username",
            form.username.clone(),
            form.focus == LoginField::Username,
        ),
        chunks[0],
    );
    f.render_widget(
        field(
            "Password",
            form.masked_password(),
            form.focus == LoginField::Password,
        ),
        chunks[1],
    );

    if let Some(error) = &form.error {
        f.render_widget(
            Paragraph::new(error.as_str()).style(Style::default().fg(app.theme.error)),
            chunks[2],
        );
    }
}
