// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "LEXIS_LOG";

/// `LEXIS_LOG` wins over the configured level when it is set and parses.
pub fn env_filter(configured_level: &str) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    EnvFilter::try_new(configured_level)
        .map_err(|error| anyhow!("invalid log filter {configured_level:?}: {error}"))
}

/// Sends all tracing output to `path`; the terminal belongs to the UI.
pub fn init(path: &Path, configured_level: &str) -> Result<()> {
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
                "open log file {}; set [log].path to a writable location",
                path.display()
            )
        })?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(configured_level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| anyhow!("install log subscriber: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{LOG_ENV, env_filter};
    use anyhow::Result;

    #[test]
    fn configured_level_is_used_without_env_override() -> Result<()> {
        if std::env::var_os(LOG_ENV).is_some() {
            return Ok(());
        }
        let filter = env_filter("lexis=debug")?;
        assert!(filter.to_string().contains("lexis"));
        Ok(())
    }

    #[test]
    fn invalid_configured_level_is_rejected() {
        if std::env::var_os(LOG_ENV).is_some() {
            return;
        }
        let error = env_filter("lexis=loud").expect_err("unknown level should fail");
        assert!(error.to_string().contains("invalid log filter"));
    }
}
