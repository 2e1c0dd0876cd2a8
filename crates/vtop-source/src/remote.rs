// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;
use vtop_app::{DataSource, Snapshot, SourceError, TabKind};

/// Client for a stats agent that serves JSON snapshots over HTTP.
///
/// Routes, relative to the base URL:
/// - `GET version` returns `{"version": "..."}`
/// - `GET stats/<category>` returns a JSON array of records
/// - `POST stats/<category>/clear` resets that category's counters
#[derive(Debug, Clone)]
pub struct RemoteSource {
    base_url: String,
    http: HttpClient,
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
}

impl RemoteSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.trim().trim_end_matches('/').to_owned();
        let parsed = Url::parse(&base_url).map_err(|error| {
            SourceError::Configuration(format!("invalid agent URL {base_url:?}: {error}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SourceError::Configuration(format!(
                "agent URL {base_url:?} must use http or https"
            )));
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| SourceError::Configuration(format!("build HTTP client: {error}")))?;

        Ok(Self {
            base_url,
            http,
            version: None,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        response
            .json()
            .with_context(|| format!("decode response from {path}"))
    }

    fn post(&self, path: &str) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/{path}", self.base_url))
            .send()
            .map_err(|error| connection_error(&self.base_url, error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }
        Ok(())
    }

    fn fetch(&self, tab: TabKind) -> Result<Snapshot> {
        let path = format!("stats/{}", tab.as_str());
        let snapshot = match tab {
            TabKind::Interfaces => Snapshot::Interfaces(self.get_json(&path)?),
            TabKind::Nodes => Snapshot::Nodes(self.get_json(&path)?),
            TabKind::Errors => Snapshot::Errors(self.get_json(&path)?),
            TabKind::Memory => Snapshot::Memory(self.get_json(&path)?),
            TabKind::Threads => Snapshot::Threads(self.get_json(&path)?),
        };
        Ok(snapshot)
    }
}

impl DataSource for RemoteSource {
    fn connect(&mut self, target: &str) -> Result<(), SourceError> {
        let response: VersionResponse =
            self.get_json("version").map_err(|error| SourceError::Connect {
                target: target.to_owned(),
                reason: format!("{error:#}"),
            })?;
        tracing::info!(
            agent = %self.base_url,
            version = %response.version,
            "connected to stats agent"
        );
        self.version = Some(response.version);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.version.take().is_some() {
            tracing::debug!(agent = %self.base_url, "disconnected from stats agent");
        }
    }

    fn version(&self) -> String {
        self.version.clone().unwrap_or_default()
    }

    fn fetch_snapshot(&mut self, tab: TabKind) -> Result<Snapshot, SourceError> {
        if self.version.is_none() {
            return Err(SourceError::NotConnected);
        }
        self.fetch(tab)
            .map_err(|error| SourceError::fetch(tab, format!("{error:#}")))
    }

    fn clear_counters(&mut self, tab: TabKind) -> Result<(), SourceError> {
        if self.version.is_none() {
            return Err(SourceError::NotConnected);
        }
        if !tab.is_clearable() {
            return Err(SourceError::clear(tab, "category has no counters"));
        }
        self.post(&format!("stats/{}/clear", tab.as_str()))
            .map_err(|error| SourceError::clear(tab, format!("{error:#}")))
    }
}

fn connection_error(base_url: &str, error: reqwest::Error) -> anyhow::Error {
    anyhow!(
        "cannot reach stats agent at {} -- check that it is running and the URL is right ({})",
        base_url,
        error
    )
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(error) = parsed.error
        && !error.is_empty()
    {
        return anyhow!("agent error ({}): {}", status.as_u16(), error);
    }

    if body.len() < 100 && !body.contains('{') && !body.is_empty() {
        return anyhow!("agent error ({}): {}", status.as_u16(), body);
    }

    anyhow!("agent returned {}", status.as_u16())
}
