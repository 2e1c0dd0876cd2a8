// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    Interfaces,
    Nodes,
    Errors,
    Memory,
    Threads,
}

impl TabKind {
    pub const ALL: [Self; 5] = [
        Self::Interfaces,
        Self::Nodes,
        Self::Errors,
        Self::Memory,
        Self::Threads,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Interfaces => "Interfaces",
            Self::Nodes => "Nodes",
            Self::Errors => "Errors",
            Self::Memory => "Memory",
            Self::Threads => "Threads",
        }
    }

    /// Path segment used by remote agents and log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interfaces => "interfaces",
            Self::Nodes => "nodes",
            Self::Errors => "errors",
            Self::Memory => "memory",
            Self::Threads => "threads",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "interfaces" => Some(Self::Interfaces),
            "nodes" => Some(Self::Nodes),
            "errors" => Some(Self::Errors),
            "memory" => Some(Self::Memory),
            "threads" => Some(Self::Threads),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::Interfaces => 0,
            Self::Nodes => 1,
            Self::Errors => 2,
            Self::Memory => 3,
            Self::Threads => 4,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Only counter-backed categories can be reset on the data source.
    pub const fn is_clearable(self) -> bool {
        matches!(self, Self::Interfaces | Self::Nodes | Self::Errors)
    }

    /// Items offered by the sort overlay; an item's position is the column
    /// index stored in a `SortSpec`.
    pub const fn sort_columns(self) -> &'static [&'static str] {
        match self {
            Self::Interfaces => &INTERFACE_SORT_COLUMNS,
            Self::Nodes => &NODE_SORT_COLUMNS,
            Self::Errors => &ERROR_SORT_COLUMNS,
            Self::Memory | Self::Threads => &[],
        }
    }
}

impl fmt::Display for TabKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const INTERFACE_SORT_COLUMNS: [&str; 29] = [
    "Name",
    "Index",
    "State",
    "MTU-L3",
    "MTU-IP4",
    "MTU-IP6",
    "MTU-MPLS",
    "RxPackets",
    "RxBytes",
    "RxErrors",
    "RxUnicast-packets",
    "RxUnicast-bytes",
    "RxMulticast-packets",
    "RxMulticast-bytes",
    "RxBroadcast-packets",
    "RxBroadcast-bytes",
    "TxPackets",
    "TxBytes",
    "TxErrors",
    "TxUnicastMiss-packets",
    "TxUnicastMiss-bytes",
    "TxMulticast-packets",
    "TxMulticast-bytes",
    "TxBroadcast-packets",
    "TxBroadcast-bytes",
    "Drops",
    "Punts",
    "IP4",
    "IP6",
];

pub const NODE_SORT_COLUMNS: [&str; 7] = [
    "Name",
    "State",
    "Calls",
    "Vectors",
    "Suspends",
    "Clocks",
    "Vectors/Calls",
];

pub const ERROR_SORT_COLUMNS: [&str; 3] = ["Counter", "Node", "Reason"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub packets: u64,
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mtu {
    pub l3: u32,
    pub ip4: u32,
    pub ip6: u32,
    pub mpls: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Interface {
    pub name: String,
    pub index: u32,
    pub state: String,
    pub mtu: Mtu,
    pub rx: Counter,
    pub tx: Counter,
    pub rx_errors: u64,
    pub tx_errors: u64,
    pub rx_unicast: Counter,
    pub rx_multicast: Counter,
    pub rx_broadcast: Counter,
    pub tx_unicast_miss: Counter,
    pub tx_multicast: Counter,
    pub tx_broadcast: Counter,
    pub drops: u64,
    pub punts: u64,
    pub ip4: u64,
    pub ip6: u64,
    pub rx_no_buf: u64,
    pub rx_miss: u64,
    pub ip_addresses: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Node {
    pub index: u32,
    pub name: String,
    pub state: String,
    pub calls: u64,
    pub vectors: u64,
    pub suspends: u64,
    pub clocks: f64,
    pub vectors_per_call: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorCounter {
    pub count: u64,
    pub node: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryUsage {
    pub thread_id: u32,
    pub thread_name: String,
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub reclaimed: u64,
    pub overhead: u64,
    pub trimmable: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadInfo {
    pub id: u32,
    pub name: String,
    pub kind: String,
    pub pid: u32,
    pub cpu_id: u32,
    pub core: u32,
    pub cpu_socket: u32,
}

/// One full sample of a category, fetched in a single poll cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Interfaces(Vec<Interface>),
    Nodes(Vec<Node>),
    Errors(Vec<ErrorCounter>),
    Memory(Vec<MemoryUsage>),
    Threads(Vec<ThreadInfo>),
}

impl Snapshot {
    pub const fn tab(&self) -> TabKind {
        match self {
            Self::Interfaces(_) => TabKind::Interfaces,
            Self::Nodes(_) => TabKind::Nodes,
            Self::Errors(_) => TabKind::Errors,
            Self::Memory(_) => TabKind::Memory,
            Self::Threads(_) => TabKind::Threads,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Interfaces(records) => records.len(),
            Self::Nodes(records) => records.len(),
            Self::Errors(records) => records.len(),
            Self::Memory(records) => records.len(),
            Self::Threads(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn empty(tab: TabKind) -> Self {
        match tab {
            TabKind::Interfaces => Self::Interfaces(Vec::new()),
            TabKind::Nodes => Self::Nodes(Vec::new()),
            TabKind::Errors => Self::Errors(Vec::new()),
            TabKind::Memory => Self::Memory(Vec::new()),
            TabKind::Threads => Self::Threads(Vec::new()),
        }
    }
}
