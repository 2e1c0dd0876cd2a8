// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub text: Style,
    pub header: Style,
    pub active_tab: Style,
    pub selected_row: Style,
    pub filter: Style,
    pub status: Style,
    pub notification: Style,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            text: Style::default().fg(Color::White),
            header: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
            active_tab: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            selected_row: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            filter: Style::default().fg(Color::Yellow),
            status: Style::default().fg(Color::Yellow),
            notification: Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn light() -> Self {
        Self {
            text: Style::default().fg(Color::Black),
            header: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            active_tab: Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
            selected_row: Style::default().fg(Color::Black).bg(Color::Green),
            filter: Style::default().fg(Color::Black).bg(Color::Cyan),
            status: Style::default().fg(Color::Blue),
            notification: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        }
    }

    pub fn select(light: bool) -> Self {
        if light { Self::light() } else { Self::dark() }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
