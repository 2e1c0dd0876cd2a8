// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod format;
mod poll;
mod table;
mod theme;
mod view;
mod window;

pub use format::{INTERFACE_ROWS_PER_ENTRY, MEMORY_ROWS_PER_ENTRY, RateCache};
pub use poll::PollOrchestrator;
pub use table::{TableFrame, TableRow, TableRows, Viewport, VirtualTable};
pub use theme::Theme;
pub use view::{
    ColumnWidth, Drawable, ExitView, HEADER_ROWS, ScrollEvent, TabView, TableLayout, TableView,
    column_widths, tab_views,
};
pub use window::{Action, DashboardWindow, action_for_key, screen_layout};

use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::Terminal;
use ratatui::backend::{Backend, CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use vtop_app::TabKind;

/// Side effects the window hands off to the background side.
pub trait DashboardRuntime {
    fn tab_switched(&mut self, tab: TabKind);
    fn sort_selected(&mut self, tab: TabKind, column: usize);
    fn clear_requested(&mut self, tab: TabKind);
    /// Blocks until background work has drained.
    fn shutdown(&mut self);
}

pub fn run_dashboard<R: DashboardRuntime>(
    window: &mut DashboardWindow,
    runtime: &mut R,
    render_interval: Duration,
) -> Result<()> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let result = event_loop(&mut terminal, window, runtime, render_interval);
    runtime.shutdown();

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result
}

fn event_loop<B: Backend, R: DashboardRuntime>(
    terminal: &mut Terminal<B>,
    window: &mut DashboardWindow,
    runtime: &mut R,
    render_interval: Duration,
) -> Result<()> {
    let size = terminal.size().context("read terminal size")?;
    window.resize(size.width, size.height);

    let mut next_render = Instant::now();
    loop {
        let now = Instant::now();
        window.tick(now);
        if now >= next_render {
            window.draw(terminal)?;
            next_render = now + render_interval;
        }

        let wait = window
            .next_deadline(next_render)
            .saturating_duration_since(Instant::now());
        if !event::poll(wait).context("poll event")? {
            continue;
        }
        match event::read().context("read event")? {
            Event::Key(key) => {
                if window.handle_key(key, runtime) {
                    // Closing view stays up while the runtime drains.
                    window.draw(terminal)?;
                    return Ok(());
                }
            }
            Event::Resize(width, height) => window.resize(width, height),
            _ => {}
        }
    }
}
