// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::DashboardRuntime;
use crate::format::RateCache;
use crate::view::TabView;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use vtop_app::{DataSource, SortSpec, SortSpecs, TabKind};

/// The data source and the rate baselines derived from it. Only one fetch
/// or clear runs against the source at a time.
struct Session<S> {
    source: S,
    rates: RateCache,
}

struct Shared<S> {
    session: Mutex<Session<S>>,
    active_tab: Mutex<TabKind>,
    sorts: Mutex<SortSpecs>,
    views: Vec<Arc<dyn TabView>>,
}

/// Background poller feeding the active tab's view.
///
/// Lock order is session, then sorts, then the view's table lock. The input
/// and render paths never take the session lock.
pub struct PollOrchestrator<S: DataSource + 'static> {
    shared: Arc<Shared<S>>,
    interval: Duration,
    cancel: Mutex<Option<Sender<()>>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: DataSource + 'static> PollOrchestrator<S> {
    /// `views` are indexed by `TabKind::index`. `source` must already be
    /// connected.
    pub fn new(source: S, views: Vec<Arc<dyn TabView>>, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                session: Mutex::new(Session {
                    source,
                    rates: RateCache::default(),
                }),
                active_tab: Mutex::new(TabKind::Interfaces),
                sorts: Mutex::new(SortSpecs::default()),
                views,
            }),
            interval,
            cancel: Mutex::new(None),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Spawns the poll thread. The first cycle runs immediately.
    pub fn start(&self) {
        let mut cancel = lock(&self.cancel);
        if cancel.is_some() {
            return;
        }

        let (tx, rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        let handle = thread::spawn(move || {
            tracing::debug!(interval_ms = interval.as_millis() as u64, "poller started");
            loop {
                shared.poll_once();
                match rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            tracing::debug!("poller stopped");
        });

        *cancel = Some(tx);
        lock(&self.tasks).push(handle);
    }

    /// Runs one fetch, sort, format and update cycle on the calling thread.
    pub fn poll_once(&self) {
        self.shared.poll_once();
    }

    pub fn active_tab(&self) -> TabKind {
        *lock(&self.shared.active_tab)
    }

    pub fn set_active_tab(&self, tab: TabKind) {
        *lock(&self.shared.active_tab) = tab;
    }

    pub fn sort_spec(&self, tab: TabKind) -> SortSpec {
        lock(&self.shared.sorts).get(tab)
    }

    /// Selects `column` and flips the direction on every call; an
    /// out-of-range column leaves the spec as it was. The new spec is used
    /// from the next poll cycle on.
    pub fn select_sort(&self, tab: TabKind, column: usize) -> SortSpec {
        let spec = lock(&self.shared.sorts).select(tab, column);
        tracing::debug!(
            tab = tab.as_str(),
            column = ?spec.column,
            ascending = spec.ascending,
            "sort selected"
        );
        spec
    }

    /// Clears the tab's counters on a separate thread, serialized with the
    /// poll cycle.
    pub fn request_clear(&self, tab: TabKind) {
        let shared = Arc::clone(&self.shared);
        let handle = thread::spawn(move || {
            let mut session = lock(&shared.session);
            match session.source.clear_counters(tab) {
                Ok(()) => {
                    session.rates.invalidate(tab);
                    tracing::info!(tab = tab.as_str(), "counters cleared");
                }
                Err(error) => {
                    tracing::error!(tab = tab.as_str(), error = %error, "clear counters failed");
                }
            }
        });

        let mut tasks = lock(&self.tasks);
        let (finished, running): (Vec<_>, Vec<_>) =
            tasks.drain(..).partition(|task| task.is_finished());
        *tasks = running;
        tasks.push(handle);
        drop(tasks);
        join_all(finished);
    }

    /// Stops the poller, waits for every in-flight clear and disconnects
    /// the source.
    pub fn stop(&self) {
        drop(lock(&self.cancel).take());
        let tasks = std::mem::take(&mut *lock(&self.tasks));
        join_all(tasks);
        lock(&self.shared.session).source.disconnect();
        tracing::info!("poller shut down");
    }

    pub fn pending_tasks(&self) -> usize {
        lock(&self.tasks).len()
    }
}

impl<S: DataSource + 'static> Shared<S> {
    fn poll_once(&self) {
        let tab = *lock(&self.active_tab);
        let Some(view) = self.views.get(tab.index()) else {
            tracing::warn!(tab = tab.as_str(), "no view for tab");
            return;
        };

        let mut session = lock(&self.session);
        let mut snapshot = match session.source.fetch_snapshot(tab) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(tab = tab.as_str(), error = %error, "poll cycle skipped");
                return;
            }
        };

        let spec = lock(&self.sorts).get(tab);
        snapshot.sort(spec);
        let rows = session.rates.format(&snapshot, Instant::now());
        view.update(rows);
    }
}

impl<S: DataSource + 'static> DashboardRuntime for PollOrchestrator<S> {
    fn tab_switched(&mut self, tab: TabKind) {
        self.set_active_tab(tab);
    }

    fn sort_selected(&mut self, tab: TabKind, column: usize) {
        self.select_sort(tab, column);
    }

    fn clear_requested(&mut self, tab: TabKind) {
        self.request_clear(tab);
    }

    fn shutdown(&mut self) {
        self.stop();
    }
}

impl<S: DataSource + 'static> Drop for PollOrchestrator<S> {
    fn drop(&mut self) {
        drop(lock(&self.cancel).take());
        join_all(std::mem::take(&mut *lock(&self.tasks)));
    }
}

fn join_all(tasks: Vec<JoinHandle<()>>) {
    for task in tasks {
        if task.join().is_err() {
            tracing::error!("background task panicked");
        }
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::PollOrchestrator;
    use crate::view::{Drawable, TabView, tab_views};
    use std::sync::Arc;
    use std::time::Duration;
    use vtop_app::{Snapshot, TabKind};
    use vtop_testkit::{ScriptedSource, SourceCall, sample_node};

    fn first_column(view: &Arc<dyn TabView>) -> Vec<String> {
        match view.widgets().remove(0) {
            Drawable::Table { frame, .. } => frame.rows.into_iter().map(|row| row[0].clone()).collect(),
            Drawable::Text { .. } => Vec::new(),
        }
    }

    #[test]
    fn poll_fetches_only_the_active_tab() {
        let (source, handle) = ScriptedSource::new();
        let views = tab_views();
        for view in &views {
            view.resize(120, 20);
        }
        let poller = PollOrchestrator::new(source, views.clone(), Duration::from_secs(60));

        poller.set_active_tab(TabKind::Nodes);
        handle.set_snapshot(Snapshot::Nodes(vec![sample_node("ip4-lookup", 3)]));
        poller.poll_once();

        assert_eq!(handle.calls(), vec![SourceCall::Fetch(TabKind::Nodes)]);
        assert_eq!(first_column(&views[TabKind::Nodes.index()]), vec!["ip4-lookup"]);
    }

    #[test]
    fn drop_without_start_joins_nothing() {
        let (source, handle) = ScriptedSource::new();
        let poller = PollOrchestrator::new(source, tab_views(), Duration::from_secs(60));
        assert_eq!(poller.pending_tasks(), 0);
        drop(poller);
        assert!(handle.calls().is_empty());
    }
}
