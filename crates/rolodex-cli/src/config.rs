// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rolodex_app::{Column, ColumnVisibility, FilterFields};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const APP_NAME: &str = "rolodex";
const CONFIG_VERSION: i64 = 1;
const DEFAULT_TIMEOUT: &str = "10s";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub source: Source,
    #[serde(default)]
    pub table: Table,
    #[serde(default)]
    pub columns: Columns,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            source: Source::default(),
            table: Table::default(),
            columns: Columns::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    pub endpoint: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            endpoint: Some(rolodex_source::DEFAULT_ENDPOINT.to_owned()),
            timeout: Some(DEFAULT_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Table {
    pub filter_fields: Option<String>,
}

/// Per-column overrides; unset keys keep the built-in visibility.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Columns {
    pub id: Option<bool>,
    pub name: Option<bool>,
    pub username: Option<bool>,
    pub email: Option<bool>,
    pub phone: Option<bool>,
    pub website: Option<bool>,
    pub company: Option<bool>,
    pub actions: Option<bool>,
}

impl Columns {
    fn get(&self, column: Column) -> Option<bool> {
        match column {
            Column::Id => self.id,
            Column::Name => self.name,
            Column::Username => self.username,
            Column::Email => self.email,
            Column::Phone => self.phone,
            Column::Website => self.website,
            Column::Company => self.company,
            Column::Actions => self.actions,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub path: Option<String>,
    pub level: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("ROLODEX_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set ROLODEX_CONFIG_PATH to the config file")
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
                    "config file {} has no version. Add `version = 1` at the top and keep values under [source], [table], [columns], and [log]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Regenerate with `rolodex --print-example-config`",
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
        if let Some(endpoint) = &self.source.endpoint {
            rolodex_source::parse_endpoint(endpoint)
                .with_context(|| format!("source.endpoint in {}", path.display()))?;
        }

        if let Some(timeout) = &self.source.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed.is_zero() {
                bail!(
                    "source.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(fields) = &self.table.filter_fields
            && FilterFields::parse(fields).is_none()
        {
            bail!(
                "table.filter_fields in {} must be \"named\" or \"all\", got {:?}",
                path.display(),
                fields
            );
        }

        if let Some(level) = &self.log.level {
            crate::logging::parse_level(level)
                .with_context(|| format!("log.level in {}", path.display()))?;
        }

        Ok(())
    }

    pub fn endpoint(&self) -> &str {
        self.source
            .endpoint
            .as_deref()
            .unwrap_or(rolodex_source::DEFAULT_ENDPOINT)
            .trim()
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.source.timeout.as_deref().unwrap_or(DEFAULT_TIMEOUT))
    }

    pub fn filter_fields(&self) -> FilterFields {
        self.table
            .filter_fields
            .as_deref()
            .and_then(FilterFields::parse)
            .unwrap_or_default()
    }

    pub fn column_visibility(&self) -> ColumnVisibility {
        let mut visibility = ColumnVisibility::default();
        for column in Column::ALL {
            if let Some(visible) = self.columns.get(column) {
                visibility.set(column, visible);
            }
        }
        visibility
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let data_root = dirs::data_local_dir().ok_or_else(|| {
            anyhow!("cannot resolve local data directory; set [log].path in the config file")
        })?;
        Ok(data_root.join(APP_NAME).join("rolodex.log"))
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# rolodex config\n# Place this file at: {}\n\nversion = 1\n\n[source]\nendpoint = \"{}\"\ntimeout = \"{}\"\n\n[table]\n# \"named\" matches name, username, email, phone, website, company; \"all\" also matches id\nfilter_fields = \"named\"\n\n[columns]\nid = true\nname = true\nusername = false\nemail = true\nphone = false\nwebsite = false\ncompany = true\nactions = true\n\n[log]\n# Optional. Default is the platform data dir (for example ~/.local/share/rolodex/rolodex.log)\n# path = \"/absolute/path/to/rolodex.log\"\nlevel = \"{}\"\n",
            path.display(),
            rolodex_source::DEFAULT_ENDPOINT,
            DEFAULT_TIMEOUT,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid timeout duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("timeout {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 10s)")
}
