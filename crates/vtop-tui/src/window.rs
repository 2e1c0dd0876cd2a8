// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::DashboardRuntime;
use crate::table::TableFrame;
use crate::theme::Theme;
use crate::view::{COLUMN_SPACING, Drawable, ExitView, ScrollEvent, TabView};
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::text::Line;
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::macros::format_description;
use vtop_app::{DashboardCommand, DashboardEvent, DashboardMode, DashboardState, TabKind};

const SORT_PANEL_WIDTH: u16 = 24;
const DEFAULT_HINTS: &str =
    "←/→ tab  ↑/↓ scroll  / filter  ctrl+space sort  ctrl+c clear  q quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Dispatch(DashboardCommand),
    Scroll(ScrollEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repaint {
    Partial,
    Full,
}

#[derive(Debug, Clone)]
struct Notification {
    text: String,
    expires_at: Instant,
}

/// Tab strip, filter line, body and status line, top to bottom.
pub fn screen_layout(area: Rect) -> [Rect; 4] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2], chunks[3]]
}

fn is_ctrl(key: KeyEvent, ch: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(ch)
}

fn is_ctrl_space(key: KeyEvent) -> bool {
    is_ctrl(key, ' ') || is_ctrl(key, '@')
}

pub fn action_for_key(mode: DashboardMode, key: KeyEvent) -> Option<Action> {
    use DashboardCommand as Cmd;

    if mode == DashboardMode::Exiting {
        return None;
    }
    if is_ctrl(key, 'q') {
        return Some(Action::Dispatch(Cmd::Quit));
    }
    if is_ctrl(key, 'c') {
        return Some(Action::Dispatch(Cmd::ClearCounters));
    }

    let command = match mode {
        DashboardMode::Default => {
            if is_ctrl_space(key) {
                return Some(Action::Dispatch(Cmd::OpenSort));
            }
            match key.code {
                KeyCode::Char('q') => Cmd::Quit,
                KeyCode::Char('/') => Cmd::OpenFilter,
                KeyCode::Left => Cmd::PrevTab,
                KeyCode::Right => Cmd::NextTab,
                KeyCode::Up => return Some(Action::Scroll(ScrollEvent::Up)),
                KeyCode::Down => return Some(Action::Scroll(ScrollEvent::Down)),
                KeyCode::PageUp => return Some(Action::Scroll(ScrollEvent::PageUp)),
                KeyCode::PageDown => return Some(Action::Scroll(ScrollEvent::PageDown)),
                _ => return None,
            }
        }
        DashboardMode::SortOverlay => {
            if is_ctrl_space(key) {
                return Some(Action::Dispatch(Cmd::OpenSort));
            }
            match key.code {
                KeyCode::Char('q') => Cmd::Quit,
                KeyCode::Esc => Cmd::Cancel,
                KeyCode::Enter => Cmd::Confirm,
                KeyCode::Up => Cmd::MoveSortCursor(-1),
                KeyCode::Down => Cmd::MoveSortCursor(1),
                KeyCode::PageUp => Cmd::SortCursorFirst,
                KeyCode::PageDown => Cmd::SortCursorLast,
                _ => return None,
            }
        }
        DashboardMode::FilterOverlay => match key.code {
            KeyCode::Esc
            | KeyCode::Up
            | KeyCode::Down
            | KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab => Cmd::Cancel,
            KeyCode::Enter => Cmd::Confirm,
            KeyCode::Backspace => Cmd::DeleteChar,
            KeyCode::Char(ch)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                Cmd::InputChar(ch)
            }
            _ => return None,
        },
        DashboardMode::Exiting => return None,
    };
    Some(Action::Dispatch(command))
}

/// Owns the views, the keyboard state machine and everything drawn around
/// the active table.
pub struct DashboardWindow {
    state: DashboardState,
    views: Vec<Arc<dyn TabView>>,
    exit_view: Arc<dyn TabView>,
    version: String,
    theme: Theme,
    notification: Option<Notification>,
    notification_ttl: Duration,
    repaint: Repaint,
}

impl DashboardWindow {
    /// `views` are indexed by `TabKind::index`.
    pub fn new(
        views: Vec<Arc<dyn TabView>>,
        version: impl Into<String>,
        theme: Theme,
        notification_ttl: Duration,
    ) -> Self {
        Self {
            state: DashboardState::default(),
            views,
            exit_view: Arc::new(ExitView),
            version: version.into(),
            theme,
            notification: None,
            notification_ttl,
            repaint: Repaint::Full,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn notification(&self) -> Option<&str> {
        self.notification
            .as_ref()
            .map(|notification| notification.text.as_str())
    }

    pub fn needs_full_repaint(&self) -> bool {
        self.repaint == Repaint::Full
    }

    fn active_view(&self) -> &Arc<dyn TabView> {
        if self.state.mode == DashboardMode::Exiting {
            return &self.exit_view;
        }
        self.views
            .get(self.state.active_tab.index())
            .unwrap_or(&self.exit_view)
    }

    /// Returns true once the window wants to exit.
    pub fn handle_key<R: DashboardRuntime>(&mut self, key: KeyEvent, runtime: &mut R) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let Some(action) = action_for_key(self.state.mode, key) else {
            return false;
        };

        match action {
            Action::Scroll(event) => {
                self.active_view().on_scroll_event(event);
                false
            }
            Action::Dispatch(command) => {
                let events = self.state.dispatch(command);
                self.apply_events(events, runtime)
            }
        }
    }

    fn apply_events<R: DashboardRuntime>(
        &mut self,
        events: Vec<DashboardEvent>,
        runtime: &mut R,
    ) -> bool {
        let mut exiting = false;
        for event in events {
            match event {
                DashboardEvent::ModeChanged(mode) => {
                    tracing::debug!(mode = ?mode, "mode changed");
                    self.repaint = Repaint::Full;
                }
                DashboardEvent::FilterChanged(text) => self.active_view().filter(&text),
                DashboardEvent::TabChanged(tab) => {
                    runtime.tab_switched(tab);
                    // The filter was cleared after the tab index moved, so
                    // the tab being left still holds the old text.
                    for view in &self.views {
                        view.filter(&self.state.filter_text);
                    }
                    self.repaint = Repaint::Full;
                }
                DashboardEvent::SortSelected { tab, column } => runtime.sort_selected(tab, column),
                DashboardEvent::ClearRequested(tab) => {
                    if tab.is_clearable() {
                        self.notify(format!("clearing tab: {}", tab.label()), Instant::now());
                        runtime.clear_requested(tab);
                    }
                }
                DashboardEvent::Exiting => exiting = true,
            }
        }
        exiting
    }

    pub fn notify(&mut self, text: impl Into<String>, now: Instant) {
        self.notification = Some(Notification {
            text: text.into(),
            expires_at: now + self.notification_ttl,
        });
    }

    /// Drops an expired notification.
    pub fn tick(&mut self, now: Instant) {
        if self
            .notification
            .as_ref()
            .is_some_and(|notification| now >= notification.expires_at)
        {
            self.notification = None;
        }
    }

    /// The earlier of the next render and the notification expiry.
    pub fn next_deadline(&self, next_render: Instant) -> Instant {
        self.notification
            .as_ref()
            .map_or(next_render, |notification| {
                notification.expires_at.min(next_render)
            })
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        let body = screen_layout(Rect::new(0, 0, width, height))[2];
        for view in self.views.iter().chain(std::iter::once(&self.exit_view)) {
            view.resize(body.width, body.height);
        }
        self.repaint = Repaint::Full;
    }

    pub fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        if self.repaint == Repaint::Full {
            terminal.clear().context("clear terminal")?;
        }
        terminal
            .draw(|frame| self.render(frame))
            .context("draw frame")?;
        self.repaint = Repaint::Partial;
        Ok(())
    }

    pub fn render(&self, frame: &mut ratatui::Frame<'_>) {
        let [tabs_area, filter_area, body_area, status_area] = screen_layout(frame.area());

        let tabs = Tabs::new(TabKind::ALL.iter().map(|tab| tab.label()))
            .block(
                Block::default()
                    .title("vtop")
                    .title_top(Line::from(self.version.as_str()).right_aligned())
                    .borders(Borders::ALL),
            )
            .style(self.theme.text)
            .highlight_style(self.theme.active_tab)
            .select(self.state.active_tab.index());
        frame.render_widget(tabs, tabs_area);

        if self.state.mode == DashboardMode::FilterOverlay || !self.state.filter_text.is_empty() {
            let filter = Paragraph::new(format!("Exit:<Escape> filter: {}", self.state.filter_text))
                .style(self.theme.filter);
            frame.render_widget(filter, filter_area);
        }

        for drawable in self.active_view().widgets() {
            self.render_drawable(frame, body_area, drawable);
        }

        if self.state.mode == DashboardMode::SortOverlay {
            self.render_sort_panel(frame, body_area);
        }

        self.render_status(frame, status_area);
    }

    fn render_drawable(&self, frame: &mut ratatui::Frame<'_>, area: Rect, drawable: Drawable) {
        match drawable {
            Drawable::Table {
                header,
                widths,
                frame: rows,
            } => self.render_table(frame, area, header, &widths, rows),
            Drawable::Text { text, centered } => {
                let mut paragraph = Paragraph::new(text).style(self.theme.text);
                let mut target = area;
                if centered {
                    paragraph = paragraph.alignment(Alignment::Center);
                    target = Rect {
                        y: area.y + area.height / 2,
                        height: area.height.min(1),
                        ..area
                    };
                }
                frame.render_widget(paragraph, target);
            }
        }
    }

    fn render_table(
        &self,
        frame: &mut ratatui::Frame<'_>,
        area: Rect,
        header: Vec<String>,
        widths: &[u16],
        table: TableFrame,
    ) {
        let header = Row::new(header.into_iter().map(Cell::from)).style(self.theme.header);
        let cursor = table.cursor;
        let rows = table.rows.into_iter().enumerate().map(|(index, row)| {
            let row = Row::new(row.into_iter().map(Cell::from));
            if cursor == Some(index) {
                row.style(self.theme.selected_row)
            } else {
                row
            }
        });
        let constraints = widths.iter().map(|width| Constraint::Length(*width));

        let table = Table::new(rows, constraints)
            .header(header)
            .column_spacing(COLUMN_SPACING)
            .style(self.theme.text);
        frame.render_widget(table, area);
    }

    fn render_sort_panel(&self, frame: &mut ratatui::Frame<'_>, body: Rect) {
        let items = self.active_view().items_list();
        let (list_items, selected) = if items.is_empty() {
            (vec![ListItem::new("not sortable")], None)
        } else {
            let selected = self.state.sort_cursor.min(items.len() - 1);
            (items.into_iter().map(ListItem::new).collect(), Some(selected))
        };

        let height = (list_items.len() as u16).saturating_add(2).min(body.height);
        let area = Rect {
            width: SORT_PANEL_WIDTH.min(body.width),
            height,
            ..body
        };
        let list = List::new(list_items)
            .block(Block::default().title("Sort by").borders(Borders::ALL))
            .style(self.theme.text)
            .highlight_style(self.theme.selected_row);
        let mut state = ListState::default().with_selected(selected);

        frame.render_widget(Clear, area);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn render_status(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        if let Some(notification) = &self.notification {
            let status = Paragraph::new(notification.text.as_str()).style(self.theme.notification);
            frame.render_widget(status, area);
            return;
        }

        let updated = self
            .active_view()
            .last_update()
            .and_then(|at| at.format(format_description!("[hour]:[minute]:[second]")).ok())
            .map(|at| format!("  updated {at}"))
            .unwrap_or_default();
        let status =
            Paragraph::new(format!("{DEFAULT_HINTS}{updated}")).style(self.theme.status);
        frame.render_widget(status, area);
    }
}
