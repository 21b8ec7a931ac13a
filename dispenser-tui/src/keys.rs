//! Keybinding definitions for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::Screen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    // Login form
    Input(char),
    Backspace,
    NextField,
    PrevField,
    Submit,
    // Dispenser view
    Dispense,
    Logout,
    Refresh,
    ToggleHistory,
    Dismiss,
}

pub fn map_key(event: KeyEvent, screen: Screen) -> Option<Action> {
    let KeyEvent {
        code,
        modifiers,
        kind,
        ..
    } = event;

    if kind == KeyEventKind::Release {
        return None;
    }

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') if screen == Screen::Dispenser => Some(Action::Refresh),
            _ => None,
        };
    }

    match screen {
        Screen::Login => match code {
            KeyCode::Esc => Some(Action::Quit),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Tab | KeyCode::Down => Some(Action::NextField),
            KeyCode::BackTab | KeyCode::Up => Some(Action::PrevField),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Input(c)),
            _ => None,
        },
        Screen::Dispenser => match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            KeyCode::Char('d') | KeyCode::Enter => Some(Action::Dispense),
            KeyCode::Char('l') => Some(Action::Logout),
            KeyCode::Char('r') => Some(Action::Refresh),
            KeyCode::Char('h') => Some(Action::ToggleHistory),
            KeyCode::Char('x') => Some(Action::Dismiss),
            _ => None,
        },
    }
}
