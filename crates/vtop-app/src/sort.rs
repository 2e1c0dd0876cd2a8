// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ErrorCounter, Interface, MemoryUsage, Node, Snapshot, TabKind, ThreadInfo};
use std::cmp::Ordering;

/// Column and direction applied to the next snapshot of a tab.
///
/// The default starts descending so the first confirmed selection sorts
/// ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Option<usize>,
    pub ascending: bool,
}

impl SortSpec {
    /// Selecting a column always flips the direction, even when the same
    /// column is picked again.
    pub const fn toggled(self, column: usize) -> Self {
        Self {
            column: Some(column),
            ascending: !self.ascending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    Text(&'a str),
    Unsigned(u64),
    Float(f64),
}

impl SortKey<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(left), Self::Text(right)) => left.cmp(right),
            (Self::Unsigned(left), Self::Unsigned(right)) => left.cmp(right),
            (Self::Float(left), Self::Float(right)) => left.total_cmp(right),
            _ => Ordering::Equal,
        }
    }
}

pub trait Sortable {
    fn sort_key(&self, column: usize) -> Option<SortKey<'_>>;
}

/// Stable sort; records without a key for the column keep their order.
pub fn sort_records<T: Sortable>(records: &mut [T], spec: SortSpec) {
    let Some(column) = spec.column else {
        return;
    };

    records.sort_by(|left, right| {
        let ordering = match (left.sort_key(column), right.sort_key(column)) {
            (Some(left), Some(right)) => left.compare(&right),
            _ => Ordering::Equal,
        };
        if spec.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

impl Snapshot {
    pub fn sort(&mut self, spec: SortSpec) {
        match self {
            Self::Interfaces(records) => sort_records(records, spec),
            Self::Nodes(records) => sort_records(records, spec),
            Self::Errors(records) => sort_records(records, spec),
            Self::Memory(records) => sort_records(records, spec),
            Self::Threads(records) => sort_records(records, spec),
        }
    }
}

impl Sortable for Interface {
    fn sort_key(&self, column: usize) -> Option<SortKey<'_>> {
        let key = match column {
            0 => SortKey::Text(&self.name),
            1 => SortKey::Unsigned(u64::from(self.index)),
            2 => SortKey::Text(&self.state),
            3 => SortKey::Unsigned(u64::from(self.mtu.l3)),
            4 => SortKey::Unsigned(u64::from(self.mtu.ip4)),
            5 => SortKey::Unsigned(u64::from(self.mtu.ip6)),
            6 => SortKey::Unsigned(u64::from(self.mtu.mpls)),
            7 => SortKey::Unsigned(self.rx.packets),
            8 => SortKey::Unsigned(self.rx.bytes),
            9 => SortKey::Unsigned(self.rx_errors),
            10 => SortKey::Unsigned(self.rx_unicast.packets),
            11 => SortKey::Unsigned(self.rx_unicast.bytes),
            12 => SortKey::Unsigned(self.rx_multicast.packets),
            13 => SortKey::Unsigned(self.rx_multicast.bytes),
            14 => SortKey::Unsigned(self.rx_broadcast.packets),
            15 => SortKey::Unsigned(self.rx_broadcast.bytes),
            16 => SortKey::Unsigned(self.tx.packets),
            17 => SortKey::Unsigned(self.tx.bytes),
            18 => SortKey::Unsigned(self.tx_errors),
            19 => SortKey::Unsigned(self.tx_unicast_miss.packets),
            20 => SortKey::Unsigned(self.tx_unicast_miss.bytes),
            21 => SortKey::Unsigned(self.tx_multicast.packets),
            22 => SortKey::Unsigned(self.tx_multicast.bytes),
            23 => SortKey::Unsigned(self.tx_broadcast.packets),
            24 => SortKey::Unsigned(self.tx_broadcast.bytes),
            25 => SortKey::Unsigned(self.drops),
            26 => SortKey::Unsigned(self.punts),
            27 => SortKey::Unsigned(self.ip4),
            28 => SortKey::Unsigned(self.ip6),
            _ => return None,
        };
        Some(key)
    }
}

impl Sortable for Node {
    fn sort_key(&self, column: usize) -> Option<SortKey<'_>> {
        let key = match column {
            0 => SortKey::Text(&self.name),
            1 => SortKey::Text(&self.state),
            2 => SortKey::Unsigned(self.calls),
            3 => SortKey::Unsigned(self.vectors),
            4 => SortKey::Unsigned(self.suspends),
            5 => SortKey::Float(self.clocks),
            6 => SortKey::Float(self.vectors_per_call),
            _ => return None,
        };
        Some(key)
    }
}

impl Sortable for ErrorCounter {
    fn sort_key(&self, column: usize) -> Option<SortKey<'_>> {
        let key = match column {
            0 => SortKey::Unsigned(self.count),
            1 => SortKey::Text(&self.node),
            2 => SortKey::Text(&self.reason),
            _ => return None,
        };
        Some(key)
    }
}

impl Sortable for MemoryUsage {
    fn sort_key(&self, _column: usize) -> Option<SortKey<'_>> {
        None
    }
}

impl Sortable for ThreadInfo {
    fn sort_key(&self, _column: usize) -> Option<SortKey<'_>> {
        None
    }
}

/// Per-tab sort state, indexed by `TabKind::index`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSpecs([SortSpec; TabKind::ALL.len()]);

impl SortSpecs {
    pub fn get(&self, tab: TabKind) -> SortSpec {
        self.0[tab.index()]
    }

    /// Commits an overlay selection. Tabs without sortable columns, and
    /// columns outside the tab's list, leave the spec untouched.
    pub fn select(&mut self, tab: TabKind, column: usize) -> SortSpec {
        if column < tab.sort_columns().len() {
            self.0[tab.index()] = self.0[tab.index()].toggled(column);
        }
        self.0[tab.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::{SortSpec, SortSpecs, sort_records};
    use crate::{ErrorCounter, Node, Snapshot, TabKind};

    fn node(name: &str, calls: u64, vectors_per_call: f64) -> Node {
        Node {
            name: name.to_owned(),
            calls,
            vectors_per_call,
            ..Node::default()
        }
    }

    fn names(nodes: &[Node]) -> Vec<&str> {
        nodes.iter().map(|node| node.name.as_str()).collect()
    }

    #[test]
    fn first_selection_sorts_ascending_and_repeat_flips() {
        let spec = SortSpec::default();
        assert!(!spec.ascending);

        let first = spec.toggled(2);
        assert_eq!(
            first,
            SortSpec {
                column: Some(2),
                ascending: true,
            }
        );

        let second = first.toggled(2);
        assert!(!second.ascending);
        assert_eq!(second.column, Some(2));
    }

    #[test]
    fn switching_columns_still_flips_direction() {
        let spec = SortSpec::default().toggled(0).toggled(3);
        assert_eq!(
            spec,
            SortSpec {
                column: Some(3),
                ascending: false,
            }
        );
    }

    #[test]
    fn unsorted_spec_keeps_source_order() {
        let mut nodes = vec![node("b", 1, 0.0), node("a", 2, 0.0)];
        sort_records(&mut nodes, SortSpec::default());
        assert_eq!(names(&nodes), vec!["b", "a"]);
    }

    #[test]
    fn numeric_columns_sort_by_value_not_text() {
        let mut nodes = vec![node("x", 100, 0.0), node("y", 9, 0.0), node("z", 20, 0.0)];
        sort_records(&mut nodes, SortSpec::default().toggled(2));
        assert_eq!(names(&nodes), vec!["y", "z", "x"]);

        sort_records(
            &mut nodes,
            SortSpec {
                column: Some(2),
                ascending: false,
            },
        );
        assert_eq!(names(&nodes), vec!["x", "z", "y"]);
    }

    #[test]
    fn float_columns_sort_with_total_order() {
        let mut nodes = vec![node("a", 0, 2.5), node("b", 0, 0.25), node("c", 0, 1.0)];
        sort_records(&mut nodes, SortSpec::default().toggled(6));
        assert_eq!(names(&nodes), vec!["b", "c", "a"]);
    }

    #[test]
    fn snapshot_sort_dispatches_by_category() {
        let mut snapshot = Snapshot::Errors(vec![
            ErrorCounter {
                count: 5,
                node: "ip4-input".to_owned(),
                reason: "ttl expired".to_owned(),
            },
            ErrorCounter {
                count: 1,
                node: "arp-reply".to_owned(),
                reason: "bad source".to_owned(),
            },
        ]);
        snapshot.sort(SortSpec::default().toggled(1));

        let Snapshot::Errors(errors) = snapshot else {
            panic!("expected errors snapshot");
        };
        assert_eq!(errors[0].node, "arp-reply");
    }

    #[test]
    fn selecting_on_tab_without_columns_is_a_no_op() {
        let mut specs = SortSpecs::default();
        let spec = specs.select(TabKind::Memory, 0);
        assert_eq!(spec, SortSpec::default());

        let spec = specs.select(TabKind::Errors, 7);
        assert_eq!(spec, SortSpec::default());
    }

    #[test]
    fn specs_are_tracked_per_tab() {
        let mut specs = SortSpecs::default();
        specs.select(TabKind::Nodes, 2);
        assert_eq!(specs.get(TabKind::Nodes).column, Some(2));
        assert_eq!(specs.get(TabKind::Interfaces), SortSpec::default());
    }
}
