// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{Snapshot, SourceError, TabKind};

/// Remote metrics provider. Calls are serialized by the poller, so
/// implementations only need to be movable across threads.
pub trait DataSource: Send {
    fn connect(&mut self, target: &str) -> Result<(), SourceError>;

    fn disconnect(&mut self);

    fn version(&self) -> String;

    fn fetch_snapshot(&mut self, tab: TabKind) -> Result<Snapshot, SourceError>;

    /// Resets the counters of a clearable category; repeating it is harmless.
    fn clear_counters(&mut self, tab: TabKind) -> Result<(), SourceError>;
}

impl<T: DataSource + ?Sized> DataSource for Box<T> {
    fn connect(&mut self, target: &str) -> Result<(), SourceError> {
        (**self).connect(target)
    }

    fn disconnect(&mut self) {
        (**self).disconnect();
    }

    fn version(&self) -> String {
        (**self).version()
    }

    fn fetch_snapshot(&mut self, tab: TabKind) -> Result<Snapshot, SourceError> {
        (**self).fetch_snapshot(tab)
    }

    fn clear_counters(&mut self, tab: TabKind) -> Result<(), SourceError> {
        (**self).clear_counters(tab)
    }
}
