// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use vtop_app::{
    Counter, DataSource, ErrorCounter, Interface, MemoryUsage, Mtu, Node, Snapshot, SourceError,
    TabKind, ThreadInfo,
};

const SIMULATOR_VERSION: &str = "vtop simulator 0.1.0";

const INTERFACES: [(&str, &str, &[&str]); 5] = [
    ("local0", "down", &[]),
    ("GigabitEthernet0/8/0", "up", &["10.10.0.1/24", "fd00:10::1/64"]),
    ("GigabitEthernet0/9/0", "up", &["10.20.0.1/24"]),
    ("loop0", "up", &["192.168.77.1/32"]),
    ("tap0", "up", &["172.16.0.2/30"]),
];

const NODES: [&str; 12] = [
    "dpdk-input",
    "ethernet-input",
    "ip4-input",
    "ip4-lookup",
    "ip4-rewrite",
    "ip4-arp",
    "ip6-input",
    "ip6-lookup",
    "interface-output",
    "error-drop",
    "unix-epoll-input",
    "api-rx-from-ring",
];

const ERRORS: [(&str, &str); 8] = [
    ("ip4-input", "ip4 ttl <= 1"),
    ("ip4-input", "ip4 source lookup miss"),
    ("ip4-arp", "ARP requests sent"),
    ("ip4-arp", "ARP requests throttled"),
    ("ethernet-input", "l3 mac mismatch"),
    ("ip6-input", "ip6 hop limit exceeded"),
    ("dpdk-input", "rx no buffer"),
    ("error-drop", "interface is down"),
];

const THREADS: [(&str, &str); 3] = [
    ("vpp_main", ""),
    ("vpp_wk_0", "workers"),
    ("vpp_wk_1", "workers"),
];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn below(&mut self, n: u64) -> u64 {
        if n <= 1 {
            return 0;
        }
        self.next_u64() % n
    }
}

/// In-process fake node for `--demo` runs. Counters only move forward on
/// fetch, so successive snapshots produce believable rates.
#[derive(Debug, Clone)]
pub struct SimulatedSource {
    rng: DeterministicRng,
    connected: bool,
    interfaces: Vec<Interface>,
    nodes: Vec<Node>,
    errors: Vec<ErrorCounter>,
    memory: Vec<MemoryUsage>,
    threads: Vec<ThreadInfo>,
}

impl SimulatedSource {
    pub fn new(seed: u64) -> Self {
        let interfaces = INTERFACES
            .iter()
            .enumerate()
            .map(|(index, (name, state, addresses))| Interface {
                name: (*name).to_owned(),
                index: index as u32,
                state: (*state).to_owned(),
                mtu: Mtu {
                    l3: 9000,
                    ip4: 0,
                    ip6: 0,
                    mpls: 0,
                },
                ip_addresses: addresses.iter().map(|addr| (*addr).to_owned()).collect(),
                ..Interface::default()
            })
            .collect();

        let nodes = NODES
            .iter()
            .enumerate()
            .map(|(index, name)| Node {
                index: index as u32,
                name: (*name).to_owned(),
                state: if name.ends_with("-input") {
                    "polling".to_owned()
                } else {
                    "active".to_owned()
                },
                ..Node::default()
            })
            .collect();

        let errors = ERRORS
            .iter()
            .map(|(node, reason)| ErrorCounter {
                count: 0,
                node: (*node).to_owned(),
                reason: (*reason).to_owned(),
            })
            .collect();

        let threads = THREADS
            .iter()
            .enumerate()
            .map(|(id, (name, kind))| ThreadInfo {
                id: id as u32,
                name: (*name).to_owned(),
                kind: (*kind).to_owned(),
                pid: 7100 + id as u32,
                cpu_id: id as u32,
                core: id as u32,
                cpu_socket: 0,
            })
            .collect();

        let memory = THREADS
            .iter()
            .enumerate()
            .map(|(id, (name, _))| MemoryUsage {
                thread_id: id as u32,
                thread_name: (*name).to_owned(),
                total: 1 << 30,
                ..MemoryUsage::default()
            })
            .collect();

        Self {
            rng: DeterministicRng::new(if seed == 0 { 1 } else { seed }),
            connected: false,
            interfaces,
            nodes,
            errors,
            memory,
            threads,
        }
    }

    fn advance(&mut self, tab: TabKind) {
        match tab {
            TabKind::Interfaces => self.advance_interfaces(),
            TabKind::Nodes => self.advance_nodes(),
            TabKind::Errors => {
                for error in &mut self.errors {
                    if self.rng.below(4) == 0 {
                        error.count += self.rng.below(25);
                    }
                }
            }
            TabKind::Memory => {
                for usage in &mut self.memory {
                    let used = (1 << 24) + self.rng.below(1 << 26);
                    usage.used = used;
                    usage.free = usage.total - used;
                    usage.overhead = usage.total / 64;
                    usage.reclaimed = self.rng.below(1 << 20);
                    usage.trimmable = usage.free / 2;
                }
            }
            TabKind::Threads => {}
        }
    }

    fn advance_interfaces(&mut self) {
        for iface in &mut self.interfaces {
            if iface.state != "up" {
                continue;
            }
            let rx = self.rng.below(20_000);
            let tx = self.rng.below(20_000);
            let frame = 64 + self.rng.below(1_400);
            bump(&mut iface.rx, rx, rx * frame);
            bump(&mut iface.tx, tx, tx * frame);
            bump(&mut iface.rx_unicast, rx - rx / 10, (rx - rx / 10) * frame);
            bump(&mut iface.rx_multicast, rx / 20, rx / 20 * frame);
            bump(&mut iface.rx_broadcast, rx / 20, rx / 20 * frame);
            bump(&mut iface.tx_unicast_miss, tx / 50, tx / 50 * frame);
            bump(&mut iface.tx_multicast, tx / 25, tx / 25 * frame);
            bump(&mut iface.tx_broadcast, tx / 25, tx / 25 * frame);
            iface.ip4 += rx - rx / 5;
            iface.ip6 += rx / 5;
            iface.drops += self.rng.below(3);
            iface.punts += self.rng.below(2);
            if self.rng.below(16) == 0 {
                iface.rx_errors += 1;
                iface.rx_no_buf += 1;
            }
            if self.rng.below(32) == 0 {
                iface.tx_errors += 1;
                iface.rx_miss += 1;
            }
        }
    }

    fn advance_nodes(&mut self) {
        for node in &mut self.nodes {
            let calls = self.rng.below(50_000);
            let vectors = calls * (1 + self.rng.below(32));
            node.calls += calls;
            node.vectors += vectors;
            node.suspends += self.rng.below(2);
            node.clocks = 50.0 + self.rng.below(2_000) as f64;
            node.vectors_per_call = if node.calls == 0 {
                0.0
            } else {
                node.vectors as f64 / node.calls as f64
            };
        }
    }

    fn snapshot(&self, tab: TabKind) -> Snapshot {
        match tab {
            TabKind::Interfaces => Snapshot::Interfaces(self.interfaces.clone()),
            TabKind::Nodes => Snapshot::Nodes(self.nodes.clone()),
            TabKind::Errors => Snapshot::Errors(self.errors.clone()),
            TabKind::Memory => Snapshot::Memory(self.memory.clone()),
            TabKind::Threads => Snapshot::Threads(self.threads.clone()),
        }
    }
}

fn bump(counter: &mut Counter, packets: u64, bytes: u64) {
    counter.packets += packets;
    counter.bytes += bytes;
}

impl DataSource for SimulatedSource {
    fn connect(&mut self, _target: &str) -> Result<(), SourceError> {
        self.connected = true;
        tracing::debug!("simulated data source connected");
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }

    fn version(&self) -> String {
        if self.connected {
            SIMULATOR_VERSION.to_owned()
        } else {
            String::new()
        }
    }

    fn fetch_snapshot(&mut self, tab: TabKind) -> Result<Snapshot, SourceError> {
        if !self.connected {
            return Err(SourceError::NotConnected);
        }
        self.advance(tab);
        Ok(self.snapshot(tab))
    }

    fn clear_counters(&mut self, tab: TabKind) -> Result<(), SourceError> {
        if !self.connected {
            return Err(SourceError::NotConnected);
        }
        match tab {
            TabKind::Interfaces => {
                for iface in &mut self.interfaces {
                    *iface = Interface {
                        name: std::mem::take(&mut iface.name),
                        index: iface.index,
                        state: std::mem::take(&mut iface.state),
                        mtu: iface.mtu,
                        ip_addresses: std::mem::take(&mut iface.ip_addresses),
                        ..Interface::default()
                    };
                }
            }
            TabKind::Nodes => {
                for node in &mut self.nodes {
                    node.calls = 0;
                    node.vectors = 0;
                    node.suspends = 0;
                    node.clocks = 0.0;
                    node.vectors_per_call = 0.0;
                }
            }
            TabKind::Errors => {
                for error in &mut self.errors {
                    error.count = 0;
                }
            }
            TabKind::Memory | TabKind::Threads => {
                return Err(SourceError::clear(tab, "category has no counters"));
            }
        }
        Ok(())
    }
}
