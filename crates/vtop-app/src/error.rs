// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::TabKind;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Fatal before the terminal is entered.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cannot connect to {target}: {reason}")]
    Connect { target: String, reason: String },

    /// Logged by the poller; the cycle is skipped and the last rows stay.
    #[error("fetch {tab} snapshot: {reason}")]
    TransientFetch { tab: TabKind, reason: String },

    #[error("clear {tab} counters: {reason}")]
    Clear { tab: TabKind, reason: String },

    #[error("data source is not connected")]
    NotConnected,
}

impl SourceError {
    pub fn fetch(tab: TabKind, reason: impl ToString) -> Self {
        Self::TransientFetch {
            tab,
            reason: reason.to_string(),
        }
    }

    pub fn clear(tab: TabKind, reason: impl ToString) -> Self {
        Self::Clear {
            tab,
            reason: reason.to_string(),
        }
    }

    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Connect { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::SourceError;
    use crate::TabKind;

    #[test]
    fn messages_name_the_category() {
        let error = SourceError::fetch(TabKind::Nodes, "timed out");
        assert_eq!(error.to_string(), "fetch Nodes snapshot: timed out");

        let error = SourceError::clear(TabKind::Errors, "rejected");
        assert_eq!(error.to_string(), "clear Errors counters: rejected");
    }

    #[test]
    fn only_startup_errors_are_fatal() {
        assert!(SourceError::Configuration("bad target".to_owned()).is_fatal());
        assert!(
            SourceError::Connect {
                target: "demo".to_owned(),
                reason: "refused".to_owned(),
            }
            .is_fatal()
        );
        assert!(!SourceError::fetch(TabKind::Memory, "eof").is_fatal());
        assert!(!SourceError::NotConnected.is_fatal());
    }
}
