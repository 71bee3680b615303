// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use leasescope_ssh::DEFAULT_SSH_PORT;
use leasescope_vendor::{APP_NAME, DEFAULT_LOOKUP_BASE_URL, DEFAULT_TTL_DAYS, RetryPolicy};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_ROUTER_TIMEOUT: &str = "10s";
const DEFAULT_LOOKUP_TIMEOUT: &str = "5s";
const DEFAULT_INITIAL_BACKOFF: &str = "2s";
const DEFAULT_MAX_BACKOFF: &str = "60s";
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub router: Router,
    #[serde(default)]
    pub lookup: Lookup,
    #[serde(default)]
    pub cache: Cache,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            router: Router::default(),
            lookup: Lookup::default(),
            cache: Cache::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Router {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            host: None,
            port: Some(DEFAULT_SSH_PORT),
            username: None,
            timeout: Some(DEFAULT_ROUTER_TIMEOUT.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Lookup {
    pub base_url: Option<String>,
    pub timeout: Option<String>,
    pub max_attempts: Option<u32>,
    pub initial_backoff: Option<String>,
    pub max_backoff: Option<String>,
}

impl Default for Lookup {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_LOOKUP_BASE_URL.to_owned()),
            timeout: Some(DEFAULT_LOOKUP_TIMEOUT.to_owned()),
            max_attempts: Some(DEFAULT_MAX_ATTEMPTS),
            initial_backoff: Some(DEFAULT_INITIAL_BACKOFF.to_owned()),
            max_backoff: Some(DEFAULT_MAX_BACKOFF.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cache {
    pub path: Option<String>,
    pub ttl_days: Option<i64>,
}

impl Default for Cache {
    fn default() -> Self {
        Self {
            path: None,
            ttl_days: Some(DEFAULT_TTL_DAYS),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("LEASESCOPE_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!(
                "cannot resolve config directory; set LEASESCOPE_CONFIG_PATH to the config file"
            )
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
                    "config file {} is not versioned. Add `version = 1` and keep values under [router], [lookup], and [cache]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1. Run `leasescope --print-example-config` for the current schema",
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
        for (key, raw) in [
            ("router.timeout", &self.router.timeout),
            ("lookup.timeout", &self.lookup.timeout),
            ("lookup.initial_backoff", &self.lookup.initial_backoff),
            ("lookup.max_backoff", &self.lookup.max_backoff),
        ] {
            if let Some(raw) = raw {
                let parsed = parse_duration(raw)?;
                if parsed <= Duration::ZERO {
                    bail!(
                        "{key} in {} must be positive, got {raw}",
                        path.display()
                    );
                }
            }
        }

        if let Some(port) = self.router.port
            && port == 0
        {
            bail!("router.port in {} must be positive", path.display());
        }

        if let Some(attempts) = self.lookup.max_attempts
            && attempts == 0
        {
            bail!(
                "lookup.max_attempts in {} must be at least 1",
                path.display()
            );
        }

        let policy = self.retry_policy()?;
        if policy.initial_backoff > policy.max_backoff {
            bail!(
                "lookup.initial_backoff in {} must not exceed lookup.max_backoff",
                path.display()
            );
        }

        if let Some(ttl_days) = self.cache.ttl_days
            && ttl_days <= 0
        {
            bail!(
                "cache.ttl_days in {} must be positive, got {}",
                path.display(),
                ttl_days
            );
        }

        let base_url = self.lookup_base_url();
        if base_url.is_empty() {
            bail!("lookup.base_url in {} must not be empty", path.display());
        }
        Url::parse(base_url).with_context(|| {
            format!(
                "lookup.base_url in {} is not a valid URL: {base_url:?}",
                path.display()
            )
        })?;

        Ok(())
    }

    pub fn router_host(&self) -> Option<&str> {
        self.router.host.as_deref().filter(|host| !host.is_empty())
    }

    pub fn router_port(&self) -> u16 {
        self.router.port.unwrap_or(DEFAULT_SSH_PORT)
    }

    pub fn router_username(&self) -> Option<&str> {
        self.router
            .username
            .as_deref()
            .filter(|username| !username.is_empty())
    }

    pub fn router_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.router
                .timeout
                .as_deref()
                .unwrap_or(DEFAULT_ROUTER_TIMEOUT),
        )
    }

    pub fn lookup_base_url(&self) -> &str {
        self.lookup
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_LOOKUP_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn lookup_timeout(&self) -> Result<Duration> {
        parse_duration(
            self.lookup
                .timeout
                .as_deref()
                .unwrap_or(DEFAULT_LOOKUP_TIMEOUT),
        )
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        Ok(RetryPolicy {
            max_attempts: self.lookup.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS),
            initial_backoff: parse_duration(
                self.lookup
                    .initial_backoff
                    .as_deref()
                    .unwrap_or(DEFAULT_INITIAL_BACKOFF),
            )?,
            max_backoff: parse_duration(
                self.lookup
                    .max_backoff
                    .as_deref()
                    .unwrap_or(DEFAULT_MAX_BACKOFF),
            )?,
        })
    }

    /// `[cache].path`, then `LEASESCOPE_CACHE_PATH`, then the platform cache
    /// directory.
    pub fn cache_path(&self) -> Result<PathBuf> {
        if let Some(path) = self.cache.path.as_deref().filter(|path| !path.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = env::var_os("LEASESCOPE_CACHE_PATH") {
            return Ok(PathBuf::from(path));
        }
        leasescope_vendor::default_cache_path()
    }

    pub fn cache_ttl_days(&self) -> i64 {
        self.cache.ttl_days.unwrap_or(DEFAULT_TTL_DAYS)
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# leasescope config\n# Place this file at: {}\n\nversion = 1\n\n[router]\n# Optional. Used as the default at the Router IP prompt\n# host = \"192.168.88.1\"\nport = {}\n# username = \"admin\"\ntimeout = \"{}\"\n\n[lookup]\nbase_url = \"{}\"\ntimeout = \"{}\"\nmax_attempts = {}\ninitial_backoff = \"{}\"\nmax_backoff = \"{}\"\n\n[cache]\n# Optional. Default is the platform cache dir (for example ~/.cache/leasescope/vendor_cache.json)\n# path = \"/absolute/path/vendor_cache.json\"\nttl_days = {}\n",
            path.display(),
            DEFAULT_SSH_PORT,
            DEFAULT_ROUTER_TIMEOUT,
            DEFAULT_LOOKUP_BASE_URL,
            DEFAULT_LOOKUP_TIMEOUT,
            DEFAULT_MAX_ATTEMPTS,
            DEFAULT_INITIAL_BACKOFF,
            DEFAULT_MAX_BACKOFF,
            DEFAULT_TTL_DAYS,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
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
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("invalid duration {raw:?}; value is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 500ms or 5s)")
}
