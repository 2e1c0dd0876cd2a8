// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::format::{INTERFACE_ROWS_PER_ENTRY, MEMORY_ROWS_PER_ENTRY};
use crate::table::{TableFrame, TableRows, VirtualTable};
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;
use vtop_app::TabKind;

pub const HEADER_ROWS: usize = 1;
pub const COLUMN_SPACING: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollEvent {
    Up,
    Down,
    PageUp,
    PageDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnWidth {
    Fixed(u16),
    Flex,
}

/// What a view wants drawn in the body area for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drawable {
    Table {
        header: Vec<String>,
        widths: Vec<u16>,
        frame: TableFrame,
    },
    Text {
        text: String,
        centered: bool,
    },
}

/// A tab's content. Implementations are shared between the input thread,
/// the renderer and the poller, so every method takes `&self`.
pub trait TabView: Send + Sync {
    fn filter(&self, text: &str);
    fn on_scroll_event(&self, event: ScrollEvent);
    fn update(&self, rows: TableRows);
    fn resize(&self, width: u16, height: u16);
    fn widgets(&self) -> Vec<Drawable>;
    fn items_list(&self) -> Vec<String>;

    fn last_update(&self) -> Option<OffsetDateTime> {
        None
    }
}

/// Fixed columns keep their width; flex columns split what is left evenly.
pub fn column_widths(total: u16, columns: &[ColumnWidth]) -> Vec<u16> {
    let fixed: u16 = columns
        .iter()
        .map(|column| match column {
            ColumnWidth::Fixed(width) => *width,
            ColumnWidth::Flex => 0,
        })
        .fold(0, u16::saturating_add);
    let flex_count = columns
        .iter()
        .filter(|column| matches!(column, ColumnWidth::Flex))
        .count() as u16;
    let spacing = COLUMN_SPACING.saturating_mul(columns.len().saturating_sub(1) as u16);
    let leftover = total.saturating_sub(fixed).saturating_sub(spacing);
    let share = leftover.checked_div(flex_count).unwrap_or(0);

    columns
        .iter()
        .map(|column| match column {
            ColumnWidth::Fixed(width) => *width,
            ColumnWidth::Flex => share,
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct TableLayout {
    pub header: &'static [&'static str],
    pub widths: Vec<ColumnWidth>,
    pub rows_per_entry: usize,
    pub filter_column: Option<usize>,
}

impl TableLayout {
    pub fn for_tab(tab: TabKind) -> Self {
        match tab {
            TabKind::Interfaces => Self {
                header: &[
                    "Name",
                    "Idx",
                    "State",
                    "MTU(L3/IP4/IP6/MPLS)",
                    "RxCounters",
                    "RxCount",
                    "TxCounters",
                    "TxCount",
                    "Drops",
                    "Punts",
                    "IP4",
                    "IP6",
                ],
                widths: [24, 5, 5, 20, 10, 16, 11, 16, 11, 11, 11]
                    .into_iter()
                    .map(ColumnWidth::Fixed)
                    .chain([ColumnWidth::Flex])
                    .collect(),
                rows_per_entry: INTERFACE_ROWS_PER_ENTRY,
                filter_column: Some(0),
            },
            TabKind::Nodes => Self {
                header: &[
                    "Name",
                    "State",
                    "Calls",
                    "Vectors",
                    "Suspends",
                    "Clocks",
                    "Vectors/Calls",
                ],
                widths: std::iter::once(ColumnWidth::Fixed(50))
                    .chain([ColumnWidth::Flex; 5])
                    .chain([ColumnWidth::Fixed(22)])
                    .collect(),
                rows_per_entry: 1,
                filter_column: Some(0),
            },
            TabKind::Errors => Self {
                header: &["Counter", "Node", "Reason"],
                widths: vec![ColumnWidth::Flex; 3],
                rows_per_entry: 1,
                filter_column: Some(1),
            },
            TabKind::Memory => Self {
                header: &["Thread/ID/Name", "Current memory usage per Thread"],
                widths: vec![ColumnWidth::Fixed(30), ColumnWidth::Flex],
                rows_per_entry: MEMORY_ROWS_PER_ENTRY,
                filter_column: Some(0),
            },
            TabKind::Threads => Self {
                header: &["ID", "Name", "Type", "PID", "CPUID", "Core", "CPUSocket"],
                widths: vec![ColumnWidth::Flex; 7],
                rows_per_entry: 1,
                filter_column: None,
            },
        }
    }
}

/// One category's table.
#[derive(Debug)]
pub struct TableView {
    tab: TabKind,
    layout: TableLayout,
    table: VirtualTable,
    widths: Mutex<Vec<u16>>,
    updated_at: Mutex<Option<OffsetDateTime>>,
}

impl TableView {
    pub fn new(tab: TabKind) -> Self {
        let layout = TableLayout::for_tab(tab);
        let table = VirtualTable::new(HEADER_ROWS, layout.header.len());
        table.set_filter(layout.filter_column, layout.rows_per_entry);
        Self {
            tab,
            table,
            widths: Mutex::new(vec![0; layout.widths.len()]),
            updated_at: Mutex::new(None),
            layout,
        }
    }

    pub fn tab(&self) -> TabKind {
        self.tab
    }

    pub fn table(&self) -> &VirtualTable {
        &self.table
    }
}

impl TabView for TableView {
    fn filter(&self, text: &str) {
        if self.table.filter_text() != text {
            self.table.apply_filter_text(text);
        }
    }

    fn on_scroll_event(&self, event: ScrollEvent) {
        match event {
            ScrollEvent::Up => self.table.scroll_up(),
            ScrollEvent::Down => self.table.scroll_down(),
            ScrollEvent::PageUp => self.table.page_up(),
            ScrollEvent::PageDown => self.table.page_down(),
        }
    }

    fn update(&self, rows: TableRows) {
        self.table.replace_rows(rows);
        *lock(&self.updated_at) = Some(OffsetDateTime::now_utc());
    }

    fn resize(&self, width: u16, height: u16) {
        *lock(&self.widths) = column_widths(width, &self.layout.widths);
        self.table.resize(width, height);
    }

    fn widgets(&self) -> Vec<Drawable> {
        vec![Drawable::Table {
            header: self
                .layout
                .header
                .iter()
                .map(|label| (*label).to_owned())
                .collect(),
            widths: lock(&self.widths).clone(),
            frame: self.table.frame(),
        }]
    }

    fn items_list(&self) -> Vec<String> {
        self.tab
            .sort_columns()
            .iter()
            .map(|item| (*item).to_owned())
            .collect()
    }

    fn last_update(&self) -> Option<OffsetDateTime> {
        *lock(&self.updated_at)
    }
}

/// Shown in place of the active tab while background work drains.
#[derive(Debug, Default)]
pub struct ExitView;

impl TabView for ExitView {
    fn filter(&self, _text: &str) {}

    fn on_scroll_event(&self, _event: ScrollEvent) {}

    fn update(&self, _rows: TableRows) {}

    fn resize(&self, _width: u16, _height: u16) {}

    fn widgets(&self) -> Vec<Drawable> {
        vec![Drawable::Text {
            text: "Closing..".to_owned(),
            centered: true,
        }]
    }

    fn items_list(&self) -> Vec<String> {
        Vec::new()
    }
}

/// One view per tab, in tab order.
pub fn tab_views() -> Vec<Arc<dyn TabView>> {
    TabKind::ALL
        .iter()
        .map(|tab| Arc::new(TableView::new(*tab)) as Arc<dyn TabView>)
        .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ColumnWidth, Drawable, ExitView, ScrollEvent, TabView, TableLayout, TableView,
        column_widths, tab_views,
    };
    use vtop_app::TabKind;
    use vtop_testkit::entry_rows;

    fn table_rows(view: &TableView) -> Vec<Vec<String>> {
        match view.widgets().remove(0) {
            Drawable::Table { frame, .. } => frame.rows,
            Drawable::Text { text, .. } => panic!("expected table, got text {text:?}"),
        }
    }

    #[test]
    fn flex_columns_share_leftover_width() {
        let widths = column_widths(
            40,
            &[ColumnWidth::Fixed(10), ColumnWidth::Flex, ColumnWidth::Flex],
        );
        // 40 - 10 fixed - 2 spacing = 28, split in two.
        assert_eq!(widths, vec![10, 14, 14]);
    }

    #[test]
    fn narrow_terminal_starves_flex_columns() {
        let widths = column_widths(8, &[ColumnWidth::Fixed(10), ColumnWidth::Flex]);
        assert_eq!(widths, vec![10, 0]);
    }

    #[test]
    fn layouts_match_header_width() {
        for tab in TabKind::ALL {
            let layout = TableLayout::for_tab(tab);
            assert_eq!(layout.header.len(), layout.widths.len(), "{tab}");
        }
    }

    #[test]
    fn views_are_built_in_tab_order() {
        let views = tab_views();
        assert_eq!(views.len(), TabKind::ALL.len());
        assert_eq!(views[1].items_list().len(), 7);
        assert!(views[3].items_list().is_empty());
    }

    #[test]
    fn update_and_scroll_reach_the_table() {
        let view = TableView::new(TabKind::Nodes);
        view.resize(120, 4);
        view.update(entry_rows("node", 5, 1, 7));

        assert_eq!(table_rows(&view).len(), 3);
        view.on_scroll_event(ScrollEvent::PageDown);
        assert_eq!(view.table().viewport().cursor, 2);
        view.on_scroll_event(ScrollEvent::Down);
        assert_eq!(view.table().viewport().offset, 1);
        assert!(view.last_update().is_some());
    }

    #[test]
    fn filter_matches_the_configured_column() {
        let view = TableView::new(TabKind::Errors);
        view.resize(80, 10);
        view.update(vec![
            vec!["1".to_owned(), "ip4-input".to_owned(), "ttl".to_owned()],
            vec!["2".to_owned(), "ip6-input".to_owned(), "ttl".to_owned()],
        ]);

        view.filter("ip6");
        let rows = table_rows(&view);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "2");
    }

    #[test]
    fn same_filter_text_keeps_the_cursor() {
        let view = TableView::new(TabKind::Nodes);
        view.resize(120, 10);
        view.update(entry_rows("node", 5, 1, 7));
        view.filter("node");
        view.on_scroll_event(ScrollEvent::Down);

        view.filter("node");
        assert_eq!(view.table().viewport().cursor, 1);
    }

    #[test]
    fn resize_recomputes_column_widths() {
        let view = TableView::new(TabKind::Memory);
        view.resize(61, 10);
        let Drawable::Table { widths, header, .. } = view.widgets().remove(0) else {
            panic!("expected table");
        };
        assert_eq!(widths, vec![30, 30]);
        assert_eq!(header[0], "Thread/ID/Name");
    }

    #[test]
    fn exit_view_is_inert() {
        let view = ExitView;
        view.update(vec![vec!["x".to_owned()]]);
        view.on_scroll_event(ScrollEvent::Down);
        assert_eq!(
            view.widgets(),
            vec![Drawable::Text {
                text: "Closing..".to_owned(),
                centered: true,
            }]
        );
        assert!(view.items_list().is_empty());
        assert!(view.last_update().is_none());
    }
}
