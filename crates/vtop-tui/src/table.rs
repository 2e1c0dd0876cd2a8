// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::{Mutex, MutexGuard};

pub type TableRow = Vec<String>;
pub type TableRows = Vec<TableRow>;

/// Scroll position over the filtered rows.
///
/// After every mutation `cursor < visible` (or both are zero),
/// `offset + visible <= filtered rows`, and `visible` only falls short of the
/// row capacity when the filtered rows do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    pub offset: usize,
    pub visible: usize,
    pub cursor: usize,
    pub previous_cursor: usize,
}

/// The rows a renderer needs for one frame, copied out under the table lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableFrame {
    pub rows: TableRows,
    pub cursor: Option<usize>,
}

#[derive(Debug, Default)]
struct TableState {
    rows: TableRows,
    filtered: TableRows,
    filter_text: String,
    filter_column: Option<usize>,
    rows_per_entry: usize,
    header_rows: usize,
    columns: usize,
    height: usize,
    viewport: Viewport,
}

/// Virtualized table over multi-row entries.
///
/// One lock covers the row buffer, the filter and the viewport, so the poller
/// swapping rows, the renderer copying a frame and the input path moving the
/// cursor never observe each other half-done.
#[derive(Debug)]
pub struct VirtualTable {
    state: Mutex<TableState>,
}

impl VirtualTable {
    /// `columns` is the placeholder width used before any rows arrive.
    pub fn new(header_rows: usize, columns: usize) -> Self {
        let mut state = TableState {
            rows_per_entry: 1,
            header_rows,
            columns,
            ..TableState::default()
        };
        state.refilter();
        Self {
            state: Mutex::new(state),
        }
    }

    /// One-time configuration. `None` disables filtering.
    pub fn set_filter(&self, column: Option<usize>, rows_per_entry: usize) {
        let mut state = self.lock();
        state.filter_column = column;
        state.rows_per_entry = rows_per_entry.max(1);
        state.refilter();
        state.restore_viewport();
    }

    pub fn apply_filter_text(&self, text: &str) {
        let mut state = self.lock();
        state.filter_text = text.to_owned();
        state.refilter();
        state.reset_viewport();
    }

    pub fn filter_text(&self) -> String {
        self.lock().filter_text.clone()
    }

    pub fn resize(&self, _width: u16, height: u16) {
        let mut state = self.lock();
        state.height = usize::from(height);
        state.restore_viewport();
    }

    pub fn scroll_up(&self) {
        self.lock().step_up();
    }

    pub fn scroll_down(&self) {
        self.lock().step_down();
    }

    pub fn page_up(&self) {
        let mut state = self.lock();
        for _ in 0..state.viewport.visible.saturating_sub(1) {
            state.step_up();
        }
    }

    pub fn page_down(&self) {
        let mut state = self.lock();
        for _ in 0..state.viewport.visible.saturating_sub(1) {
            state.step_down();
        }
    }

    pub fn replace_rows(&self, rows: TableRows) {
        let mut state = self.lock();
        state.rows = rows;
        state.refilter();
        state.restore_viewport();
    }

    pub fn viewport(&self) -> Viewport {
        self.lock().viewport
    }

    pub fn filtered_len(&self) -> usize {
        self.lock().filtered.len()
    }

    pub fn frame(&self) -> TableFrame {
        let state = self.lock();
        let viewport = state.viewport;
        let end = viewport.offset + viewport.visible;
        let rows = state.filtered[viewport.offset..end].to_vec();
        TableFrame {
            cursor: (!rows.is_empty()).then_some(viewport.cursor),
            rows,
        }
    }

    fn lock(&self) -> MutexGuard<'_, TableState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl TableState {
    fn capacity(&self) -> usize {
        self.height.saturating_sub(self.header_rows)
    }

    fn filter_active(&self) -> bool {
        self.filter_column.is_some() && !self.filter_text.is_empty()
    }

    /// Matches only the first physical row of each entry and keeps whole
    /// entries; a trailing partial entry is dropped.
    fn refilter(&mut self) {
        let per_entry = self.rows_per_entry;
        let whole = self.rows.len() - self.rows.len() % per_entry;
        let entries = self.rows[..whole].chunks(per_entry);

        self.filtered = match (self.filter_active(), self.filter_column) {
            (true, Some(column)) => entries
                .filter(|entry| {
                    entry[0]
                        .get(column)
                        .is_some_and(|cell| cell.contains(self.filter_text.as_str()))
                })
                .flatten()
                .cloned()
                .collect(),
            _ => self.rows[..whole].to_vec(),
        };

        if let Some(first) = self.filtered.first() {
            self.columns = first.len();
        } else if self.columns > 0 {
            self.filtered = vec![vec![String::new(); self.columns]; per_entry];
        }
    }

    fn reset_viewport(&mut self) {
        self.viewport.offset = 0;
        self.viewport.previous_cursor = self.viewport.cursor;
        self.viewport.cursor = 0;
        self.restore_viewport();
    }

    fn restore_viewport(&mut self) {
        let len = self.filtered.len();
        let capacity = self.capacity();
        let viewport = &mut self.viewport;

        // a shrunken row set never leaves empty slots below the last row
        if viewport.offset + capacity > len {
            viewport.offset = len.saturating_sub(capacity);
        }
        viewport.visible = capacity.min(len - viewport.offset);

        if viewport.visible == 0 {
            viewport.cursor = 0;
        } else if viewport.cursor >= viewport.visible {
            viewport.previous_cursor = viewport.cursor;
            viewport.cursor = viewport.visible - 1;
        }
    }

    fn step_up(&mut self) {
        let viewport = &mut self.viewport;
        if viewport.cursor > 0 {
            viewport.previous_cursor = viewport.cursor;
            viewport.cursor -= 1;
        } else if viewport.offset > 0 {
            viewport.offset -= 1;
            self.restore_viewport();
        }
    }

    fn step_down(&mut self) {
        let len = self.filtered.len();
        let viewport = &mut self.viewport;
        if viewport.cursor + 1 < viewport.visible {
            viewport.previous_cursor = viewport.cursor;
            viewport.cursor += 1;
        } else if viewport.offset + viewport.visible < len {
            viewport.offset += 1;
            self.restore_viewport();
        }
    }
}
