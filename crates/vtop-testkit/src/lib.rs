// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};
use vtop_app::{
    Counter, DataSource, ErrorCounter, Interface, MemoryUsage, Mtu, Node, Snapshot, SourceError,
    TabKind, ThreadInfo,
};

pub const SCRIPTED_VERSION: &str = "scripted 1.0";

pub fn sample_interface(name: &str, index: u32, rx_packets: u64, rx_bytes: u64) -> Interface {
    Interface {
        name: name.to_owned(),
        index,
        state: "up".to_owned(),
        mtu: Mtu {
            l3: 9000,
            ip4: 0,
            ip6: 0,
            mpls: 0,
        },
        rx: Counter {
            packets: rx_packets,
            bytes: rx_bytes,
        },
        tx: Counter {
            packets: rx_packets / 2,
            bytes: rx_bytes / 2,
        },
        ..Interface::default()
    }
}

pub fn sample_node(name: &str, calls: u64) -> Node {
    Node {
        index: 0,
        name: name.to_owned(),
        state: "active".to_owned(),
        calls,
        vectors: calls * 4,
        suspends: 0,
        clocks: 120.0,
        vectors_per_call: 4.0,
    }
}

pub fn sample_error(count: u64, node: &str, reason: &str) -> ErrorCounter {
    ErrorCounter {
        count,
        node: node.to_owned(),
        reason: reason.to_owned(),
    }
}

pub fn sample_memory(thread_id: u32, thread_name: &str) -> MemoryUsage {
    MemoryUsage {
        thread_id,
        thread_name: thread_name.to_owned(),
        total: 1 << 30,
        used: 1 << 26,
        free: (1 << 30) - (1 << 26),
        reclaimed: 0,
        overhead: 1 << 20,
        trimmable: 1 << 24,
    }
}

pub fn sample_thread(id: u32, name: &str) -> ThreadInfo {
    ThreadInfo {
        id,
        name: name.to_owned(),
        kind: if id == 0 { String::new() } else { "workers".to_owned() },
        pid: 4000 + id,
        cpu_id: id,
        core: id,
        cpu_socket: 0,
    }
}

/// Builds `entries` logical entries of `rows_per_entry` physical rows. The
/// first row of entry `i` carries `"{prefix}{i}"` in every column.
pub fn entry_rows(
    prefix: &str,
    entries: usize,
    rows_per_entry: usize,
    columns: usize,
) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(entries * rows_per_entry);
    for entry in 0..entries {
        rows.push(vec![format!("{prefix}{entry}"); columns]);
        for detail in 1..rows_per_entry {
            rows.push(vec![format!("detail {entry}.{detail}"); columns]);
        }
    }
    rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Connect(String),
    Disconnect,
    Fetch(TabKind),
    Clear(TabKind),
}

#[derive(Debug, Default)]
struct Script {
    snapshots: HashMap<TabKind, Snapshot>,
    failing: HashSet<TabKind>,
    calls: Vec<SourceCall>,
}

#[derive(Debug, Default)]
struct Gate {
    held: Mutex<bool>,
    released: Condvar,
}

/// Test-side controls for a `ScriptedSource` that has been moved into a
/// poller.
#[derive(Debug, Clone, Default)]
pub struct ScriptHandle {
    script: Arc<Mutex<Script>>,
    gate: Arc<Gate>,
}

impl ScriptHandle {
    pub fn set_snapshot(&self, snapshot: Snapshot) {
        lock(&self.script).snapshots.insert(snapshot.tab(), snapshot);
    }

    pub fn fail_fetches(&self, tab: TabKind, fail: bool) {
        let mut script = lock(&self.script);
        if fail {
            script.failing.insert(tab);
        } else {
            script.failing.remove(&tab);
        }
    }

    pub fn calls(&self) -> Vec<SourceCall> {
        lock(&self.script).calls.clone()
    }

    pub fn count(&self, call: &SourceCall) -> usize {
        lock(&self.script)
            .calls
            .iter()
            .filter(|recorded| *recorded == call)
            .count()
    }

    /// Blocks every subsequent `clear_counters` until `release_clears`.
    pub fn hold_clears(&self) {
        *lock(&self.gate.held) = true;
    }

    pub fn release_clears(&self) {
        *lock(&self.gate.held) = false;
        self.gate.released.notify_all();
    }

    pub fn wait_for(&self, call: &SourceCall, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.count(call) > 0 {
                return true;
            }
            thread::sleep(Duration::from_millis(2));
        }
        self.count(call) > 0
    }
}

/// Deterministic `DataSource` that replays configured snapshots and records
/// every call.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    handle: ScriptHandle,
    connected: bool,
}

impl ScriptedSource {
    pub fn new() -> (Self, ScriptHandle) {
        let source = Self::default();
        let handle = source.handle.clone();
        (source, handle)
    }

    fn record(&self, call: SourceCall) {
        lock(&self.handle.script).calls.push(call);
    }
}

impl DataSource for ScriptedSource {
    fn connect(&mut self, target: &str) -> Result<(), SourceError> {
        self.record(SourceCall::Connect(target.to_owned()));
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) {
        self.record(SourceCall::Disconnect);
        self.connected = false;
    }

    fn version(&self) -> String {
        SCRIPTED_VERSION.to_owned()
    }

    fn fetch_snapshot(&mut self, tab: TabKind) -> Result<Snapshot, SourceError> {
        self.record(SourceCall::Fetch(tab));
        let script = lock(&self.handle.script);
        if script.failing.contains(&tab) {
            return Err(SourceError::fetch(tab, "scripted failure"));
        }
        Ok(script
            .snapshots
            .get(&tab)
            .cloned()
            .unwrap_or_else(|| Snapshot::empty(tab)))
    }

    fn clear_counters(&mut self, tab: TabKind) -> Result<(), SourceError> {
        self.record(SourceCall::Clear(tab));
        let mut held = lock(&self.handle.gate.held);
        while *held {
            held = match self.handle.gate.released.wait(held) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        if !tab.is_clearable() {
            return Err(SourceError::clear(tab, "category has no counters"));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ScriptedSource, SourceCall, entry_rows, sample_node};
    use anyhow::Result;
    use std::thread;
    use std::time::Duration;
    use vtop_app::{DataSource, Snapshot, TabKind};

    #[test]
    fn entry_rows_keeps_entries_whole() {
        let rows = entry_rows("if", 3, 4, 2);
        assert_eq!(rows.len(), 12);
        assert_eq!(rows[4], vec!["if1".to_owned(), "if1".to_owned()]);
        assert_eq!(rows[5][0], "detail 1.1");
    }

    #[test]
    fn scripted_source_replays_and_records() -> Result<()> {
        let (mut source, handle) = ScriptedSource::new();
        handle.set_snapshot(Snapshot::Nodes(vec![sample_node("ip4-input", 3)]));

        source.connect("scripted")?;
        let snapshot = source.fetch_snapshot(TabKind::Nodes)?;
        assert_eq!(snapshot.len(), 1);
        assert!(source.fetch_snapshot(TabKind::Errors)?.is_empty());

        handle.fail_fetches(TabKind::Nodes, true);
        source
            .fetch_snapshot(TabKind::Nodes)
            .expect_err("scripted failure expected");

        assert_eq!(
            handle.calls(),
            vec![
                SourceCall::Connect("scripted".to_owned()),
                SourceCall::Fetch(TabKind::Nodes),
                SourceCall::Fetch(TabKind::Errors),
                SourceCall::Fetch(TabKind::Nodes),
            ]
        );
        Ok(())
    }

    #[test]
    fn held_clear_waits_for_release() -> Result<()> {
        let (mut source, handle) = ScriptedSource::new();
        handle.hold_clears();

        let worker = thread::spawn(move || source.clear_counters(TabKind::Errors));
        assert!(handle.wait_for(&SourceCall::Clear(TabKind::Errors), Duration::from_secs(1)));
        assert!(!worker.is_finished());

        handle.release_clears();
        worker.join().expect("clear thread should join")?;
        Ok(())
    }
}
