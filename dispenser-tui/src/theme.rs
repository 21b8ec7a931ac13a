//! Color themes and status color helpers.

use crate::notifications::NotificationLevel;
use ratatui::style::Color;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub primary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl Theme {
    /// Names accepted by [`Theme::by_name`].
    pub const NAMES: [&'static str; 2] = ["synthbrute", "classic"];

    pub fn synthbrute() -> Self {
        Self {
            name: "synthbrute",
            primary: Color::Rgb(0, 255, 255),
            success: Color::Rgb(0, 255, 0),
            warning: Color::Rgb(255, 255, 0),
            error: Color::Rgb(255, 0, 0),
            info: Color::Rgb(0, 255, 255),
            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(68, 68, 68),
            border_focus: Color::Rgb(0, 255, 255),
        }
    }

    /// Plain 16-color palette for terminals without true color.
    pub fn classic() -> Self {
        Self {
            name: "classic",
            primary: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            text: Color::Reset,
            text_dim: Color::DarkGray,
            border: Color::Gray,
            border_focus: Color::Blue,
        }
    }

    /// Case-insensitive lookup.
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "synthbrute" => Some(Self::synthbrute()),
            "classic" => Some(Self::classic()),
            _ => None,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::synthbrute()
    }
}

pub fn notification_color(level: NotificationLevel, theme: &Theme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Success => theme.success,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
    }
}

/// Color for the remaining-uses counter.
pub fn remaining_color(remaining: u32, theme: &Theme) -> Color {
    match remaining {
        0 => theme.error,
        1 => theme.warning,
        _ => theme.success,
    }
}
