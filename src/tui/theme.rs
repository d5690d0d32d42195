// SPDX-FileCopyrightText: 2026 FlowSketch contributors
// SPDX-License-Identifier: MIT

use std::{env, error::Error, fmt, str::FromStr};

use ratatui::style::{Color, Modifier, Style};

use crate::export::Palette;

/// Color scheme for the TUI and for exported images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Resolves the theme from `FLOWSKETCH_THEME`, defaulting to dark.
    pub fn from_env() -> Result<Self, ThemeError> {
        match env::var("FLOWSKETCH_THEME") {
            Ok(value) if value.trim().is_empty() => Ok(Self::default()),
            Ok(value) => value.parse(),
            Err(env::VarError::NotPresent) => Ok(Self::default()),
            Err(env::VarError::NotUnicode(_)) => Err(ThemeError::InvalidEnv {
                value: "<non-unicode>".to_owned(),
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Export colors for this theme.
    pub fn palette(self) -> Palette {
        match self {
            Self::Dark => Palette::dark(),
            Self::Light => Palette::light(),
        }
    }

    pub(crate) fn base_style(self) -> Style {
        match self {
            Self::Dark => Style::default(),
            Self::Light => Style::default()
                .fg(Color::Rgb(0x0f, 0x17, 0x2a))
                .bg(Color::Rgb(0xf8, 0xfa, 0xfc)),
        }
    }

    pub(crate) fn panel_border_style(self, focused: bool) -> Style {
        if focused {
            self.base_style().fg(Color::Yellow)
        } else {
            self.base_style()
        }
    }

    pub(crate) fn selection_style(self) -> Style {
        self.base_style()
            .add_modifier(Modifier::REVERSED | Modifier::BOLD)
    }

    pub(crate) fn dim_style(self) -> Style {
        self.base_style().fg(Color::DarkGray)
    }

    pub(crate) fn accent_style(self) -> Style {
        self.base_style().fg(Color::Cyan)
    }

    pub(crate) fn error_style(self) -> Style {
        self.base_style().fg(Color::Red)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = ThemeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            _ => Err(ThemeError::InvalidEnv {
                value: value.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeError {
    InvalidEnv { value: String },
}

impl fmt::Display for ThemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEnv { value } => {
                write!(f, "invalid theme {value:?} (expected dark or light)")
            }
        }
    }
}

impl Error for ThemeError {}

#[cfg(test)]
mod tests {
    use super::Theme;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("dark".parse::<Theme>(), Ok(Theme::Dark));
        assert_eq!("Light".parse::<Theme>(), Ok(Theme::Light));
        assert!(" solarized ".parse::<Theme>().is_err());
    }

    #[test]
    fn palette_backgrounds_follow_the_theme() {
        assert_eq!(Theme::Dark.palette().background.hex(), "#0f172a");
        assert_eq!(Theme::Light.palette().background.hex(), "#f8fafc");
    }
}
