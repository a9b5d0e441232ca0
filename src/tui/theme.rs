//! Catppuccin Mocha palette with the dashboard's semantic roles on top

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub mauve: Color,
    pub red: Color,
    pub peach: Color,
    pub yellow: Color,
    pub green: Color,
    pub blue: Color,
    pub lavender: Color,
    pub text: Color,
    pub subtext0: Color,
    pub overlay1: Color,
    pub overlay0: Color,
    pub surface0: Color,
    pub base: Color,
    pub mantle: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            mauve: Color::Rgb(0xcb, 0xa6, 0xf7),
            red: Color::Rgb(0xf3, 0x8b, 0xa8),
            peach: Color::Rgb(0xfa, 0xb3, 0x87),
            yellow: Color::Rgb(0xf9, 0xe2, 0xaf),
            green: Color::Rgb(0xa6, 0xe3, 0xa1),
            blue: Color::Rgb(0x89, 0xb4, 0xfa),
            lavender: Color::Rgb(0xb4, 0xbe, 0xfe),
            text: Color::Rgb(0xcd, 0xd6, 0xf4),
            subtext0: Color::Rgb(0xa6, 0xad, 0xc8),
            overlay1: Color::Rgb(0x7f, 0x84, 0x9c),
            overlay0: Color::Rgb(0x6c, 0x70, 0x86),
            surface0: Color::Rgb(0x31, 0x32, 0x44),
            base: Color::Rgb(0x1e, 0x1e, 0x2e),
            mantle: Color::Rgb(0x18, 0x18, 0x25),
        }
    }
}

impl Theme {
    /// Nav element carrying the "active" style
    pub fn active_nav(&self) -> Style {
        Style::default().fg(self.base).bg(self.mauve).add_modifier(Modifier::BOLD)
    }

    pub fn inactive_nav(&self) -> Style {
        Style::default().fg(self.subtext0)
    }

    pub fn heading(&self) -> Style {
        Style::default().fg(self.lavender).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.overlay1)
    }

    pub fn error(&self) -> Style {
        Style::default().fg(self.red).add_modifier(Modifier::BOLD)
    }

    pub fn notice(&self) -> Style {
        Style::default().fg(self.blue)
    }

    pub fn pending(&self) -> Style {
        Style::default().fg(self.yellow)
    }

    pub fn selected(&self) -> Style {
        Style::default().fg(self.peach).add_modifier(Modifier::BOLD)
    }
}
