//! Color palettes for the terminal UI

use crate::config::Theme;
use ratatui::style::Color;

/// Colors shared by every widget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    /// Body text and typed input
    pub text: Color,
    /// Untyped prompt characters, separators
    pub muted: Color,
    /// Borders, headings, informational rows
    pub accent: Color,
    /// Correct characters, good results
    pub correct: Color,
    /// Mistyped characters, errors
    pub incorrect: Color,
    /// Slow pairs, status messages
    pub warning: Color,
    /// Background of the tab and status bars
    pub bar: Color,
}

impl ThemeColors {
    pub fn from_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self::dark(),
            Theme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            text: Color::Rgb(220, 220, 228),
            muted: Color::Rgb(108, 112, 134),
            accent: Color::Rgb(137, 180, 250),
            correct: Color::Rgb(166, 227, 161),
            incorrect: Color::Rgb(243, 139, 168),
            warning: Color::Rgb(249, 226, 175),
            bar: Color::Rgb(49, 50, 68),
        }
    }

    pub fn light() -> Self {
        Self {
            text: Color::Rgb(40, 42, 54),
            muted: Color::Rgb(140, 143, 161),
            accent: Color::Rgb(30, 102, 245),
            correct: Color::Rgb(64, 160, 43),
            incorrect: Color::Rgb(210, 15, 57),
            warning: Color::Rgb(223, 142, 29),
            bar: Color::Rgb(204, 208, 218),
        }
    }
}
