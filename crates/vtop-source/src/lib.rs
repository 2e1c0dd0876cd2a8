// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod remote;
mod simulator;

pub use remote::RemoteSource;
pub use simulator::SimulatedSource;

use std::time::Duration;
use vtop_app::{DataSource, SourceError};

pub const DEMO_TARGET: &str = "demo";
pub const DEMO_SEED: u64 = 42;

/// Picks the adapter for `target`: `demo` runs the built-in simulator and an
/// `http://` or `https://` URL talks to a stats agent.
pub fn open(target: &str, timeout: Duration) -> Result<Box<dyn DataSource>, SourceError> {
    let target = target.trim();
    if target == DEMO_TARGET {
        return Ok(Box::new(SimulatedSource::new(DEMO_SEED)));
    }

    if target.starts_with("http://") || target.starts_with("https://") {
        return Ok(Box::new(RemoteSource::new(target, timeout)?));
    }

    Err(SourceError::Configuration(format!(
        "no data source adapter for target {target:?}; use `{DEMO_TARGET}` or an http(s):// agent URL"
    )))
}

#[cfg(test)]
mod tests {
    use super::open;
    use std::time::Duration;
    use vtop_app::SourceError;

    #[test]
    fn demo_target_opens_simulator() {
        let source = open(" demo ", Duration::from_secs(1)).expect("demo should open");
        assert!(source.version().is_empty());
    }

    #[test]
    fn unknown_target_is_a_configuration_error() {
        let error = open("/run/stats.sock", Duration::from_secs(1))
            .err()
            .expect("socket path has no adapter");
        assert!(matches!(error, SourceError::Configuration(_)));
        assert!(error.to_string().contains("http(s)://"));
    }

    #[test]
    fn malformed_url_is_a_configuration_error() {
        let error = open("http://", Duration::from_secs(1))
            .err()
            .expect("empty host should fail");
        assert!(error.is_fatal());
    }
}
