// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use lexis_api::{DEFAULT_CORPUS_URL, DEFAULT_DEFINITIONS_URL, DEFAULT_TIMEOUT};
use lexis_app::DEFAULT_THROTTLE_INTERVAL;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub const APP_NAME: &str = "lexis";

const CONFIG_VERSION: i64 = 1;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub sources: Sources,
    #[serde(default)]
    pub network: Network,
    #[serde(default)]
    pub lookup: Lookup,
    #[serde(default)]
    pub log: Log,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            sources: Sources::default(),
            network: Network::default(),
            lookup: Lookup::default(),
            log: Log::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sources {
    pub corpus_url: Option<String>,
    pub definitions_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Network {
    pub timeout: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Lookup {
    pub throttle: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Log {
    pub level: Option<String>,
    pub path: Option<String>,
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("LEXIS_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set LEXIS_CONFIG_PATH to the config file")
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
                    "config file {} has no version; add `version = 1` at the top",
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
        lexis_api::parse_http_url("sources.corpus_url", self.corpus_url())
            .with_context(|| format!("invalid [sources] in {}", path.display()))?;
        lexis_api::parse_http_url("sources.definitions_url", self.definitions_url())
            .with_context(|| format!("invalid [sources] in {}", path.display()))?;

        let timeout = self
            .timeout()
            .with_context(|| format!("invalid network.timeout in {}", path.display()))?;
        if timeout.is_zero() {
            bail!(
                "network.timeout in {} must be positive, got {}",
                path.display(),
                self.network.timeout.as_deref().unwrap_or_default()
            );
        }

        self.throttle()
            .with_context(|| format!("invalid lookup.throttle in {}", path.display()))?;

        EnvFilter::try_new(self.log_level()).map_err(|error| {
            anyhow!(
                "log.level in {} is not a valid filter ({error}); try \"info\" or \"lexis=debug\"",
                path.display()
            )
        })?;

        if let Some(log_path) = &self.log.path
            && log_path.trim().is_empty()
        {
            bail!("log.path in {} must not be empty", path.display());
        }

        Ok(())
    }

    pub fn corpus_url(&self) -> &str {
        self.sources
            .corpus_url
            .as_deref()
            .unwrap_or(DEFAULT_CORPUS_URL)
    }

    pub fn definitions_url(&self) -> &str {
        self.sources
            .definitions_url
            .as_deref()
            .unwrap_or(DEFAULT_DEFINITIONS_URL)
    }

    pub fn timeout(&self) -> Result<Duration> {
        match &self.network.timeout {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_TIMEOUT),
        }
    }

    pub fn throttle(&self) -> Result<Duration> {
        match &self.lookup.throttle {
            Some(raw) => parse_duration(raw),
            None => Ok(DEFAULT_THROTTLE_INTERVAL),
        }
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.log.path {
            return Ok(PathBuf::from(path));
        }
        let state_root = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .ok_or_else(|| anyhow!("cannot resolve state directory; set [log].path in config"))?;
        Ok(state_root.join(APP_NAME).join("lexis.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# lexis config\n# Place this file at: {}\n\nversion = 1\n\n[sources]\ncorpus_url = \"{}\"\ndefinitions_url = \"{}\"\n\n[network]\ntimeout = \"{}s\"\n\n[lookup]\n# Pause between lookups when resolving every suggestion. \"0ms\" disables it.\nthrottle = \"{}ms\"\n\n[log]\n# Overridden by LEXIS_LOG when set.\nlevel = \"{}\"\n# Optional. Default is the platform state dir (for example ~/.local/state/lexis/lexis.log)\n# path = \"/absolute/path/to/lexis.log\"\n",
            path.display(),
            DEFAULT_CORPUS_URL,
            DEFAULT_DEFINITIONS_URL,
            DEFAULT_TIMEOUT.as_secs(),
            DEFAULT_THROTTLE_INTERVAL.as_millis(),
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    let raw = raw.trim();
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
        return Ok(Duration::from_secs(mins.saturating_mul(60)));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 100ms or 10s)")
}
