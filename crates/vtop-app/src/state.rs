// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::TabKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardMode {
    Default,
    SortOverlay,
    FilterOverlay,
    Exiting,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub mode: DashboardMode,
    pub active_tab: TabKind,
    pub filter_text: String,
    pub sort_cursor: usize,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            mode: DashboardMode::Default,
            active_tab: TabKind::Interfaces,
            filter_text: String::new(),
            sort_cursor: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardCommand {
    OpenSort,
    OpenFilter,
    Cancel,
    Confirm,
    InputChar(char),
    DeleteChar,
    MoveSortCursor(isize),
    SortCursorFirst,
    SortCursorLast,
    NextTab,
    PrevTab,
    ClearCounters,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardEvent {
    ModeChanged(DashboardMode),
    FilterChanged(String),
    TabChanged(TabKind),
    SortSelected { tab: TabKind, column: usize },
    ClearRequested(TabKind),
    Exiting,
}

impl DashboardState {
    pub fn dispatch(&mut self, command: DashboardCommand) -> Vec<DashboardEvent> {
        if self.mode == DashboardMode::Exiting {
            return Vec::new();
        }

        match command {
            DashboardCommand::Quit => {
                self.mode = DashboardMode::Exiting;
                vec![
                    DashboardEvent::ModeChanged(self.mode),
                    DashboardEvent::Exiting,
                ]
            }
            DashboardCommand::ClearCounters => {
                vec![DashboardEvent::ClearRequested(self.active_tab)]
            }
            command => match self.mode {
                DashboardMode::Default => self.dispatch_default(command),
                DashboardMode::SortOverlay => self.dispatch_sort(command),
                DashboardMode::FilterOverlay => self.dispatch_filter(command),
                DashboardMode::Exiting => Vec::new(),
            },
        }
    }

    fn dispatch_default(&mut self, command: DashboardCommand) -> Vec<DashboardEvent> {
        match command {
            DashboardCommand::OpenSort => {
                self.sort_cursor = 0;
                self.set_mode(DashboardMode::SortOverlay)
            }
            DashboardCommand::OpenFilter => self.set_mode(DashboardMode::FilterOverlay),
            DashboardCommand::NextTab => self.step_tab(1),
            DashboardCommand::PrevTab => self.step_tab(-1),
            _ => Vec::new(),
        }
    }

    fn dispatch_sort(&mut self, command: DashboardCommand) -> Vec<DashboardEvent> {
        let items = self.active_tab.sort_columns().len();
        match command {
            DashboardCommand::OpenSort | DashboardCommand::Cancel => {
                self.set_mode(DashboardMode::Default)
            }
            DashboardCommand::Confirm => {
                let mut events = Vec::new();
                if self.sort_cursor < items {
                    events.push(DashboardEvent::SortSelected {
                        tab: self.active_tab,
                        column: self.sort_cursor,
                    });
                }
                events.extend(self.set_mode(DashboardMode::Default));
                events
            }
            DashboardCommand::MoveSortCursor(delta) => {
                let last = items.saturating_sub(1) as isize;
                self.sort_cursor = (self.sort_cursor as isize + delta).clamp(0, last) as usize;
                Vec::new()
            }
            DashboardCommand::SortCursorFirst => {
                self.sort_cursor = 0;
                Vec::new()
            }
            DashboardCommand::SortCursorLast => {
                self.sort_cursor = items.saturating_sub(1);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn dispatch_filter(&mut self, command: DashboardCommand) -> Vec<DashboardEvent> {
        match command {
            DashboardCommand::Cancel => {
                let mut events = self.clear_filter();
                events.extend(self.set_mode(DashboardMode::Default));
                events
            }
            DashboardCommand::Confirm => self.set_mode(DashboardMode::Default),
            DashboardCommand::InputChar(ch) => {
                self.filter_text.push(ch);
                vec![DashboardEvent::FilterChanged(self.filter_text.clone())]
            }
            DashboardCommand::DeleteChar => {
                if self.filter_text.pop().is_none() {
                    return Vec::new();
                }
                vec![DashboardEvent::FilterChanged(self.filter_text.clone())]
            }
            _ => Vec::new(),
        }
    }

    fn set_mode(&mut self, mode: DashboardMode) -> Vec<DashboardEvent> {
        self.mode = mode;
        vec![DashboardEvent::ModeChanged(mode)]
    }

    fn clear_filter(&mut self) -> Vec<DashboardEvent> {
        if self.filter_text.is_empty() {
            return Vec::new();
        }
        self.filter_text.clear();
        vec![DashboardEvent::FilterChanged(String::new())]
    }

    /// Tabs stop at both ends of the strip instead of wrapping.
    fn step_tab(&mut self, delta: isize) -> Vec<DashboardEvent> {
        let next = self.active_tab.index() as isize + delta;
        let Some(tab) = usize::try_from(next).ok().and_then(TabKind::from_index) else {
            return Vec::new();
        };

        let mut events = self.clear_filter();
        self.active_tab = tab;
        events.push(DashboardEvent::TabChanged(tab));
        events
    }
}
