// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::table::{TableRow, TableRows};
use std::collections::HashMap;
use std::time::Instant;
use vtop_app::{
    Counter, ErrorCounter, Interface, MemoryUsage, Node, Snapshot, TabKind, ThreadInfo,
};

pub const INTERFACE_ROWS_PER_ENTRY: usize = 11;
pub const MEMORY_ROWS_PER_ENTRY: usize = 7;

const INTERFACE_COLUMNS: usize = 12;

#[derive(Debug, Clone, Copy)]
struct Baseline {
    rx: Counter,
    tx: Counter,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Rates {
    rx_packets: u64,
    rx_bytes: u64,
    tx_packets: u64,
    tx_bytes: u64,
}

/// Previous interface sample, keyed by name, used to derive per-second
/// columns.
#[derive(Debug, Default)]
pub struct RateCache {
    interfaces: HashMap<String, Baseline>,
    sampled_at: Option<Instant>,
}

impl RateCache {
    pub fn invalidate(&mut self, tab: TabKind) {
        if tab == TabKind::Interfaces {
            self.interfaces.clear();
            self.sampled_at = None;
        }
    }

    pub fn format(&mut self, snapshot: &Snapshot, now: Instant) -> TableRows {
        match snapshot {
            Snapshot::Interfaces(interfaces) => self.format_interfaces(interfaces, now),
            Snapshot::Nodes(nodes) => format_nodes(nodes),
            Snapshot::Errors(errors) => format_errors(errors),
            Snapshot::Memory(usage) => format_memory(usage),
            Snapshot::Threads(threads) => format_threads(threads),
        }
    }

    fn format_interfaces(&mut self, interfaces: &[Interface], now: Instant) -> TableRows {
        let elapsed = self
            .sampled_at
            .map(|previous| now.saturating_duration_since(previous).as_secs_f64())
            .unwrap_or(0.0);

        let mut rows = Vec::with_capacity(interfaces.len() * INTERFACE_ROWS_PER_ENTRY);
        for iface in interfaces {
            let rates = self
                .interfaces
                .get(&iface.name)
                .map(|baseline| rates_since(baseline, iface, elapsed))
                .unwrap_or_default();
            rows.extend(interface_rows(iface, rates));
        }

        self.interfaces = interfaces
            .iter()
            .map(|iface| {
                (
                    iface.name.clone(),
                    Baseline {
                        rx: iface.rx,
                        tx: iface.tx,
                    },
                )
            })
            .collect();
        self.sampled_at = Some(now);
        rows
    }
}

/// Counter regressions (a clear on the remote side) read as zero.
fn per_second(current: u64, previous: u64, elapsed: f64) -> u64 {
    if elapsed <= 0.0 {
        return 0;
    }
    (current.saturating_sub(previous) as f64 / elapsed).round() as u64
}

fn rates_since(baseline: &Baseline, iface: &Interface, elapsed: f64) -> Rates {
    Rates {
        rx_packets: per_second(iface.rx.packets, baseline.rx.packets, elapsed),
        rx_bytes: per_second(iface.rx.bytes, baseline.rx.bytes, elapsed),
        tx_packets: per_second(iface.tx.packets, baseline.tx.packets, elapsed),
        tx_bytes: per_second(iface.tx.bytes, baseline.tx.bytes, elapsed),
    }
}

fn packets_and_bytes(counter: Counter) -> String {
    format!("{}/{}", counter.packets, counter.bytes)
}

fn detail_row(rx_label: &str, rx_value: String, tx_label: &str, tx_value: String) -> TableRow {
    let mut row = vec![String::new(); INTERFACE_COLUMNS];
    row[4] = rx_label.to_owned();
    row[5] = rx_value;
    row[6] = tx_label.to_owned();
    row[7] = tx_value;
    row
}

fn interface_rows(iface: &Interface, rates: Rates) -> TableRows {
    let mtu = iface.mtu;
    let mut rows = vec![
        vec![
            iface.name.clone(),
            iface.index.to_string(),
            iface.state.clone(),
            format!("{}/{}/{}/{}", mtu.l3, mtu.ip4, mtu.ip6, mtu.mpls),
            "Packets".to_owned(),
            iface.rx.packets.to_string(),
            "Packets".to_owned(),
            iface.tx.packets.to_string(),
            iface.drops.to_string(),
            iface.punts.to_string(),
            iface.ip4.to_string(),
            iface.ip6.to_string(),
        ],
        detail_row(
            "Packets/s",
            rates.rx_packets.to_string(),
            "Packets/s",
            rates.tx_packets.to_string(),
        ),
        detail_row(
            "Bytes",
            iface.rx.bytes.to_string(),
            "Bytes",
            iface.tx.bytes.to_string(),
        ),
        detail_row(
            "Bytes/s",
            rates.rx_bytes.to_string(),
            "Bytes/s",
            rates.tx_bytes.to_string(),
        ),
        detail_row(
            "Errors",
            iface.rx_errors.to_string(),
            "Errors",
            iface.tx_errors.to_string(),
        ),
        detail_row(
            "Unicast",
            packets_and_bytes(iface.rx_unicast),
            "UnicastMiss",
            packets_and_bytes(iface.tx_unicast_miss),
        ),
        detail_row(
            "Multicast",
            packets_and_bytes(iface.rx_multicast),
            "Multicast",
            packets_and_bytes(iface.tx_multicast),
        ),
        detail_row(
            "Broadcast",
            packets_and_bytes(iface.rx_broadcast),
            "Broadcast",
            packets_and_bytes(iface.tx_broadcast),
        ),
        detail_row("NoBuf", iface.rx_no_buf.to_string(), "", String::new()),
        detail_row("Miss", iface.rx_miss.to_string(), "", String::new()),
        vec![String::new(); INTERFACE_COLUMNS],
    ];

    // Addresses fill the name column below the name, newest first, prefix
    // length stripped.
    for (row, address) in rows[1..].iter_mut().zip(iface.ip_addresses.iter().rev()) {
        row[0] = address
            .split_once('/')
            .map_or(address.as_str(), |(host, _)| host)
            .to_owned();
    }
    rows
}

fn format_nodes(nodes: &[Node]) -> TableRows {
    nodes
        .iter()
        .map(|node| {
            vec![
                node.name.clone(),
                node.state.clone(),
                node.calls.to_string(),
                node.vectors.to_string(),
                node.suspends.to_string(),
                format!("{:.0}", node.clocks),
                format!("{:.2}", node.vectors_per_call),
            ]
        })
        .collect()
}

fn format_errors(errors: &[ErrorCounter]) -> TableRows {
    errors
        .iter()
        .map(|error| {
            vec![
                error.count.to_string(),
                error.node.clone(),
                error.reason.clone(),
            ]
        })
        .collect()
}

fn format_memory(usage: &[MemoryUsage]) -> TableRows {
    let mut rows = Vec::with_capacity(usage.len() * MEMORY_ROWS_PER_ENTRY);
    for entry in usage {
        let detail = |label: &str, bytes: u64| vec![String::new(), format!("{label}: {}", human_bytes(bytes))];
        rows.push(vec![
            format!("Thread {} {}", entry.thread_id, entry.thread_name),
            format!("total: {}", human_bytes(entry.total)),
        ]);
        rows.push(detail("used", entry.used));
        rows.push(detail("free", entry.free));
        rows.push(detail("reclaimed", entry.reclaimed));
        rows.push(detail("overhead", entry.overhead));
        rows.push(detail("trimmable", entry.trimmable));
        rows.push(vec![String::new(); 2]);
    }
    rows
}

fn format_threads(threads: &[ThreadInfo]) -> TableRows {
    threads
        .iter()
        .map(|thread| {
            vec![
                thread.id.to_string(),
                thread.name.clone(),
                thread.kind.clone(),
                thread.pid.to_string(),
                thread.cpu_id.to_string(),
                thread.core.to_string(),
                thread.cpu_socket.to_string(),
            ]
        })
        .collect()
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}")
    } else {
        format!("{value:.2}{}", UNITS[unit])
    }
}
