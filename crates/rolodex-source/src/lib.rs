// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use rolodex_app::Record;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";

/// Read-only client for the remote users list.
#[derive(Debug, Clone)]
pub struct Client {
    endpoint: Url,
    http: HttpClient,
}

impl Client {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = parse_endpoint(endpoint)?;
        if timeout.is_zero() {
            bail!("source timeout must be positive");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self { endpoint, http })
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Issues one GET and decodes the body as a list of user records.
    pub fn fetch_records(&self) -> Result<Vec<Record>> {
        debug!(endpoint = %self.endpoint, "fetching users");
        let response = self
            .http
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .map_err(|error| connection_error(self.endpoint.as_str(), error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(clean_error_response(status, &body));
        }

        let body = response
            .text()
            .with_context(|| format!("read response body from {}", self.endpoint))?;
        let records = decode_records(&body)
            .with_context(|| format!("decode user list from {}", self.endpoint))?;
        info!(count = records.len(), endpoint = %self.endpoint, "users fetched");
        Ok(records)
    }
}

pub fn parse_endpoint(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("source endpoint must not be empty");
    }
    let url = Url::parse(trimmed).with_context(|| {
        format!("source endpoint {trimmed:?} is not a valid URL -- use a full http(s) URL")
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => bail!("source endpoint scheme {scheme:?} is unsupported; use http or https"),
    }
}

pub fn decode_records(body: &str) -> Result<Vec<Record>> {
    let records: Vec<Record> =
        serde_json::from_str(body).context("expected a JSON array of user objects")?;
    Ok(records)
}

fn connection_error(endpoint: &str, error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("timed out waiting for {endpoint} -- raise [source].timeout or retry later");
    }
    anyhow!("cannot reach {endpoint} -- check the network or [source].endpoint ({error})")
}

fn clean_error_response(status: StatusCode, body: &str) -> anyhow::Error {
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body)
        && let Some(message) = parsed.error.or(parsed.message)
        && !message.is_empty()
    {
        return anyhow!("server error ({}): {}", status.as_u16(), message);
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return anyhow!("server error ({}): {}", status.as_u16(), trimmed);
    }

    anyhow!("server returned {}", status.as_u16())
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    message: Option<String>,
}
