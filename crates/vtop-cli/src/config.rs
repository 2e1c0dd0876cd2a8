// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "vtop";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TARGET: &str = "http://127.0.0.1:9191";
const DEFAULT_SOURCE_TIMEOUT: &str = "2s";
const DEFAULT_POLL_INTERVAL: &str = "1s";
const DEFAULT_RENDER_INTERVAL: &str = "16ms";
const DEFAULT_NOTIFICATION: &str = "1s";
const DEFAULT_LOG_LEVEL: &str = "info";
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub poll: Poll,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            source: Source::default(),
            poll: Poll::default(),
            ui: Ui::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub target: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            target: Some(DEFAULT_TARGET.to_owned()),
            timeout: Some(DEFAULT_SOURCE_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Poll {
    pub interval: Option<String>,
}

impl Default for Poll {
    fn default() -> Self {
        Self {
            interval: Some(DEFAULT_POLL_INTERVAL.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub render_interval: Option<String>,
    pub notification: Option<String>,
    pub light_theme: Option<bool>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            render_interval: Some(DEFAULT_RENDER_INTERVAL.to_owned()),
            notification: Some(DEFAULT_NOTIFICATION.to_owned()),
            light_theme: Some(false),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Default for Log {
    fn default() -> Self {
        Self {
            path: None,
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("VTOP_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set VTOP_CONFIG_PATH to the config file")
        })?;
        Ok(config_root.join(APP_NAME).join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and put values under [source], [poll], [ui], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.target().trim().is_empty() {
            bail!("source.target in {} must not be empty", path.display());
        }

        let durations = [
            ("source.timeout", self.source.timeout.as_deref()),
            ("poll.interval", self.poll.interval.as_deref()),
            ("ui.render_interval", self.ui.render_interval.as_deref()),
            ("ui.notification", self.ui.notification.as_deref()),
        ];
        for (key, value) in durations {
            let Some(value) = value else {
                continue;
            };
            let parsed = parse_duration(value)
                .with_context(|| format!("{key} in {}", path.display()))?;
            if parsed.is_zero() {
                bail!(
                    "{} in {} must be positive, got {}",
                    key,
                    path.display(),
                    value
                );
            }
        }

        if !LOG_LEVELS.iter().any(|level| *level == self.log_level()) {
            bail!(
                "log.level in {} must be one of {}, got {:?}",
                path.display(),
                LOG_LEVELS.join(", "),
                self.log_level()
            );
        }

        Ok(())
    }

    pub fn target(&self) -> &str {
        self.source.target.as_deref().unwrap_or(DEFAULT_TARGET)
    }

    pub fn source_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.source
                .timeout
                .as_deref()
                .unwrap_or(DEFAULT_SOURCE_TIMEOUT),
        )
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        parse_duration(self.poll.interval.as_deref().unwrap_or(DEFAULT_POLL_INTERVAL))
    }

    pub fn render_interval(&self) -> Result<Duration> {
        parse_duration(
            self.ui
                .render_interval
                .as_deref()
                .unwrap_or(DEFAULT_RENDER_INTERVAL),
        )
    }

    pub fn notification_duration(&self) -> Result<Duration> {
        parse_duration(self.ui.notification.as_deref().unwrap_or(DEFAULT_NOTIFICATION))
    }

    pub fn light_theme(&self) -> bool {
        self.ui.light_theme.unwrap_or(false)
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        match &self.log.path {
            Some(path) => Ok(PathBuf::from(path)),
            None => default_log_path(),
        }
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# vtop config\n# Place this file at: {}\n\nversion = 1\n\n[source]\n# \"demo\" runs against the built-in simulator\ntarget = \"{}\"\ntimeout = \"{}\"\n\n[poll]\ninterval = \"{}\"\n\n[ui]\nrender_interval = \"{}\"\nnotification = \"{}\"\nlight_theme = false\n\n[log]\n# Optional. Default is platform data dir (for example ~/.local/share/vtop/vtop.log)\n# path = \"/absolute/path/to/vtop.log\"\nlevel = \"{}\"\n",
            path.display(),
            DEFAULT_TARGET,
            DEFAULT_SOURCE_TIMEOUT,
            DEFAULT_POLL_INTERVAL,
            DEFAULT_RENDER_INTERVAL,
            DEFAULT_NOTIFICATION,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn default_log_path() -> Result<PathBuf> {
    if let Some(path) = env::var_os("VTOP_LOG_PATH") {
        return Ok(PathBuf::from(path));
    }

    let data_root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set [log].path or VTOP_LOG_PATH")
    })?;
    Ok(data_root.join(APP_NAME).join(format!("{APP_NAME}.log")))
}

pub fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 1s)")
}
