// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! File-backed tracing. The TUI owns stdout and stderr, so every run mode
//! writes its log lines to `[log].path` instead.

use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_ENV: &str = "ROLODEX_LOG";

/// Installs the global subscriber. `ROLODEX_LOG` wins over `RUST_LOG`, and
/// `default_level` applies when neither is set.
pub fn init(path: &Path, default_level: &str) -> Result<()> {
    let filter = resolve_filter(default_level)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| {
            format!(
                "open log file {} -- set [log].path to a writable location",
                path.display()
            )
        })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

fn resolve_filter(default_level: &str) -> Result<EnvFilter> {
    let directives = env::var(LOG_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .or_else(|| env::var("RUST_LOG").ok())
        .filter(|value| !value.trim().is_empty());

    match directives {
        Some(directives) => EnvFilter::try_new(&directives)
            .with_context(|| format!("invalid log filter {directives:?} in {LOG_ENV}/RUST_LOG")),
        None => parse_level(default_level),
    }
}

pub fn parse_level(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level.trim()).with_context(|| {
        format!("invalid log level {level:?}; use error, warn, info, debug or trace")
    })
}

#[cfg(test)]
mod tests {
    use super::{LOG_ENV, init, parse_level, resolve_filter};
    use anyhow::Result;
    use std::sync::{Mutex, OnceLock};

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn set_log_env(rolodex: Option<&str>, rust: Option<&str>) {
        // SAFETY: test-only process-local env mutation, serialized by env_lock.
        unsafe {
            match rolodex {
                Some(value) => std::env::set_var(LOG_ENV, value),
                None => std::env::remove_var(LOG_ENV),
            }
            match rust {
                Some(value) => std::env::set_var("RUST_LOG", value),
                None => std::env::remove_var("RUST_LOG"),
            }
        }
    }

    fn resolved(rolodex: Option<&str>, rust: Option<&str>, level: &str) -> Result<String> {
        set_log_env(rolodex, rust);
        let filter = resolve_filter(level);
        set_log_env(None, None);
        Ok(filter?.to_string())
    }

    #[test]
    fn parse_level_accepts_levels_and_directives() {
        for level in ["error", "warn", "info", "debug", "trace", "rolodex_app=debug"] {
            assert!(parse_level(level).is_ok(), "{level} should parse");
        }
    }

    #[test]
    fn parse_level_rejects_garbage() {
        let error = parse_level("rolodex=loud").expect_err("garbage should fail");
        assert!(error.to_string().contains("invalid log level"));
    }

    #[test]
    fn rolodex_log_wins_over_rust_log_and_config_level() -> Result<()> {
        let _guard = env_lock();
        assert_eq!(resolved(Some("trace"), Some("warn"), "info")?, "trace");
        Ok(())
    }

    #[test]
    fn rust_log_wins_over_config_level() -> Result<()> {
        let _guard = env_lock();
        assert_eq!(resolved(None, Some("warn"), "info")?, "warn");
        Ok(())
    }

    #[test]
    fn config_level_applies_when_env_is_unset() -> Result<()> {
        let _guard = env_lock();
        assert_eq!(resolved(None, None, "debug")?, "debug");
        Ok(())
    }

    #[test]
    fn blank_rolodex_log_falls_through() -> Result<()> {
        let _guard = env_lock();
        assert_eq!(resolved(Some("  "), Some("error"), "info")?, "error");
        assert_eq!(resolved(Some(""), Some(" "), "info")?, "info");
        Ok(())
    }

    #[test]
    fn invalid_env_filter_is_reported() {
        let _guard = env_lock();
        let error = resolved(Some("rolodex=loud"), None, "info").expect_err("bad filter");
        assert!(error.to_string().contains(LOG_ENV));
    }

    #[test]
    fn init_creates_log_directory_and_writes_events() -> Result<()> {
        let _guard = env_lock();
        set_log_env(None, None);
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("state").join("rolodex").join("rolodex.log");

        init(&path, "info")?;
        tracing::info!("log file smoke line");

        assert!(path.is_file());
        let written = std::fs::read_to_string(&path)?;
        assert!(written.contains("log file smoke line"), "got {written:?}");
        assert!(
            !written.contains('\u{1b}'),
            "log file should not carry ANSI codes"
        );
        Ok(())
    }
}
