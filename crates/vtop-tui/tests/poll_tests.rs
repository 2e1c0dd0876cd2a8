// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use vtop_app::{Snapshot, TabKind};
use vtop_testkit::{ScriptHandle, ScriptedSource, SourceCall, sample_interface, sample_node};
use vtop_tui::{Drawable, PollOrchestrator, TabView, tab_views};

const WAIT: Duration = Duration::from_secs(2);

fn rows(view: &Arc<dyn TabView>) -> Vec<Vec<String>> {
    match view.widgets().remove(0) {
        Drawable::Table { frame, .. } => frame.rows,
        Drawable::Text { text, .. } => panic!("expected table, got {text:?}"),
    }
}

fn first_column(view: &Arc<dyn TabView>) -> Vec<String> {
    rows(view).into_iter().map(|row| row[0].clone()).collect()
}

fn orchestrator(
    interval: Duration,
) -> (
    PollOrchestrator<ScriptedSource>,
    ScriptHandle,
    Vec<Arc<dyn TabView>>,
) {
    let (source, handle) = ScriptedSource::new();
    let views = tab_views();
    for view in &views {
        view.resize(200, 40);
    }
    let poller = PollOrchestrator::new(source, views.clone(), interval);
    (poller, handle, views)
}

#[test]
fn sort_selection_toggles_through_the_poll_path() {
    let (poller, handle, views) = orchestrator(Duration::from_secs(60));
    poller.set_active_tab(TabKind::Nodes);
    handle.set_snapshot(Snapshot::Nodes(vec![
        sample_node("ip4-lookup", 20),
        sample_node("ethernet-input", 5),
        sample_node("ip4-rewrite", 10),
    ]));
    let nodes = &views[TabKind::Nodes.index()];

    poller.poll_once();
    assert_eq!(
        first_column(nodes),
        vec!["ip4-lookup", "ethernet-input", "ip4-rewrite"]
    );

    let spec = poller.select_sort(TabKind::Nodes, 2);
    assert!(spec.ascending);
    // The selection only affects the next cycle.
    assert_eq!(first_column(nodes)[0], "ip4-lookup");
    poller.poll_once();
    assert_eq!(
        first_column(nodes),
        vec!["ethernet-input", "ip4-rewrite", "ip4-lookup"]
    );

    let spec = poller.select_sort(TabKind::Nodes, 2);
    assert!(!spec.ascending);
    poller.poll_once();
    assert_eq!(
        first_column(nodes),
        vec!["ip4-lookup", "ip4-rewrite", "ethernet-input"]
    );
    assert_eq!(poller.sort_spec(TabKind::Errors).column, None);

    // a different column still flips the direction
    let spec = poller.select_sort(TabKind::Nodes, 0);
    assert_eq!(spec.column, Some(0));
    assert!(spec.ascending);
    assert_eq!(poller.select_sort(TabKind::Nodes, 99), spec);
}

#[test]
fn inactive_tabs_are_never_fetched() {
    let (poller, handle, _views) = orchestrator(Duration::from_secs(60));
    poller.poll_once();
    poller.set_active_tab(TabKind::Errors);
    poller.poll_once();
    poller.poll_once();

    assert_eq!(
        handle.calls(),
        vec![
            SourceCall::Fetch(TabKind::Interfaces),
            SourceCall::Fetch(TabKind::Errors),
            SourceCall::Fetch(TabKind::Errors),
        ]
    );
}

#[test]
fn failed_fetch_keeps_previous_rows() {
    let (poller, handle, views) = orchestrator(Duration::from_secs(60));
    poller.set_active_tab(TabKind::Nodes);
    handle.set_snapshot(Snapshot::Nodes(vec![sample_node("ip4-lookup", 1)]));
    poller.poll_once();

    handle.fail_fetches(TabKind::Nodes, true);
    handle.set_snapshot(Snapshot::Nodes(vec![sample_node("ip6-lookup", 1)]));
    poller.poll_once();

    assert_eq!(first_column(&views[TabKind::Nodes.index()]), vec!["ip4-lookup"]);
    assert_eq!(handle.count(&SourceCall::Fetch(TabKind::Nodes)), 2);
}

#[test]
fn clear_resets_rate_columns() {
    let (poller, handle, views) = orchestrator(Duration::from_secs(60));
    let interfaces = &views[TabKind::Interfaces.index()];

    handle.set_snapshot(Snapshot::Interfaces(vec![sample_interface("tap0", 1, 100, 1000)]));
    poller.poll_once();
    thread::sleep(Duration::from_millis(10));
    handle.set_snapshot(Snapshot::Interfaces(vec![sample_interface("tap0", 1, 200, 2000)]));
    poller.poll_once();
    assert_ne!(rows(interfaces)[1][5], "0");

    poller.request_clear(TabKind::Interfaces);
    assert!(handle.wait_for(&SourceCall::Clear(TabKind::Interfaces), WAIT));

    // The clear holds the source until it has reset the baseline, so this
    // cycle observes the reset.
    thread::sleep(Duration::from_millis(10));
    handle.set_snapshot(Snapshot::Interfaces(vec![sample_interface("tap0", 1, 300, 3000)]));
    poller.poll_once();
    let after = rows(interfaces);
    assert_eq!(after[1][5], "0");
    assert_eq!(after[3][5], "0");
    assert_eq!(after[0][5], "300");

    poller.stop();
}

#[test]
fn held_clear_does_not_block_other_views() {
    let (poller, handle, views) = orchestrator(Duration::from_secs(60));
    handle.hold_clears();
    poller.request_clear(TabKind::Errors);
    assert!(handle.wait_for(&SourceCall::Clear(TabKind::Errors), WAIT));

    let started = Instant::now();
    let _ = views[TabKind::Nodes.index()].widgets();
    let _ = views[TabKind::Errors.index()].widgets();
    poller.set_active_tab(TabKind::Nodes);
    poller.select_sort(TabKind::Nodes, 0);
    assert!(started.elapsed() < WAIT);
    assert_eq!(poller.pending_tasks(), 1);

    handle.release_clears();
    poller.stop();
    assert_eq!(poller.pending_tasks(), 0);
}

#[test]
fn first_cycle_runs_on_start_and_stop_disconnects() {
    let (poller, handle, _views) = orchestrator(Duration::from_secs(60));
    poller.start();
    poller.start();
    assert!(handle.wait_for(&SourceCall::Fetch(TabKind::Interfaces), WAIT));

    poller.stop();
    let calls = handle.calls();
    assert_eq!(handle.count(&SourceCall::Fetch(TabKind::Interfaces)), 1);
    assert_eq!(calls.last(), Some(&SourceCall::Disconnect));
}

#[test]
fn poller_keeps_cycling_until_stopped() {
    let (poller, handle, _views) = orchestrator(Duration::from_millis(5));
    poller.start();

    let deadline = Instant::now() + WAIT;
    while handle.count(&SourceCall::Fetch(TabKind::Interfaces)) < 3 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(2));
    }
    poller.stop();
    let fetched = handle.count(&SourceCall::Fetch(TabKind::Interfaces));
    assert!(fetched >= 3, "only {fetched} cycles ran");

    thread::sleep(Duration::from_millis(20));
    assert_eq!(handle.count(&SourceCall::Fetch(TabKind::Interfaces)), fetched);
}

#[test]
fn stop_waits_for_in_flight_clears() {
    let (poller, handle, _views) = orchestrator(Duration::from_secs(60));
    handle.hold_clears();
    poller.request_clear(TabKind::Nodes);
    assert!(handle.wait_for(&SourceCall::Clear(TabKind::Nodes), WAIT));

    let releaser = {
        let handle = handle.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            handle.release_clears();
        })
    };
    poller.stop();
    releaser.join().expect("releaser should join");

    let calls = handle.calls();
    assert_eq!(
        calls,
        vec![SourceCall::Clear(TabKind::Nodes), SourceCall::Disconnect]
    );
}
