// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Oui;
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use time::{Duration, OffsetDateTime};

pub const APP_NAME: &str = "leasescope";
pub const CACHE_FILE_NAME: &str = "vendor_cache.json";
pub const DEFAULT_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub vendor: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: OffsetDateTime, ttl: Duration) -> bool {
        now - self.timestamp < ttl
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorCache {
    #[serde(default)]
    pub vendors: BTreeMap<String, CacheEntry>,
}

impl VendorCache {
    pub fn get(&self, oui: &Oui) -> Option<&CacheEntry> {
        self.vendors.get(oui.as_str())
    }

    /// Stale entries are treated as absent.
    pub fn fresh_vendor(&self, oui: &Oui, now: OffsetDateTime, ttl: Duration) -> Option<&str> {
        self.get(oui)
            .filter(|entry| entry.is_fresh(now, ttl))
            .map(|entry| entry.vendor.as_str())
    }

    pub fn insert(&mut self, oui: &Oui, vendor: impl Into<String>, timestamp: OffsetDateTime) {
        self.vendors.insert(
            oui.as_str().to_owned(),
            CacheEntry {
                vendor: vendor.into(),
                timestamp,
            },
        );
    }

    pub fn prune(&mut self, now: OffsetDateTime, ttl: Duration) -> usize {
        let before = self.vendors.len();
        self.vendors.retain(|_, entry| entry.is_fresh(now, ttl));
        before - self.vendors.len()
    }

    pub fn len(&self) -> usize {
        self.vendors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vendors.is_empty()
    }
}

/// Durable home of the vendor cache. `load` never fails: anything unreadable
/// is a cold start.
pub trait CacheStore {
    fn load(&self) -> VendorCache;
    fn save(&self, cache: &VendorCache) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCacheStore {
    path: PathBuf,
}

impl FileCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<VendorCache> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read cache file {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("parse cache file {}", self.path.display()))
    }
}

impl CacheStore for FileCacheStore {
    fn load(&self) -> VendorCache {
        match self.read() {
            Ok(cache) => cache,
            Err(error) => {
                if self.path.exists() {
                    tracing::debug!("starting with empty vendor cache: {error:#}");
                }
                VendorCache::default()
            }
        }
    }

    /// Each save writes a uniquely named sibling file and renames it over the
    /// target, so readers see either the old or the new cache.
    fn save(&self, cache: &VendorCache) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)
            .with_context(|| format!("create cache directory {}", dir.display()))?;

        let payload = serde_json::to_vec_pretty(cache).context("serialize vendor cache")?;
        let mut staged = NamedTempFile::new_in(dir)
            .with_context(|| format!("create temp cache file in {}", dir.display()))?;
        staged
            .write_all(&payload)
            .with_context(|| format!("write temp cache file {}", staged.path().display()))?;
        staged
            .persist(&self.path)
            .with_context(|| format!("replace cache file {}", self.path.display()))?;
        Ok(())
    }
}

/// In-process store used by `--demo` and tests.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    cache: RefCell<VendorCache>,
    saves: Cell<usize>,
}

impl MemoryCacheStore {
    pub fn new(cache: VendorCache) -> Self {
        Self {
            cache: RefCell::new(cache),
            saves: Cell::new(0),
        }
    }

    pub fn snapshot(&self) -> VendorCache {
        self.cache.borrow().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl CacheStore for MemoryCacheStore {
    fn load(&self) -> VendorCache {
        self.cache.borrow().clone()
    }

    fn save(&self, cache: &VendorCache) -> Result<()> {
        *self.cache.borrow_mut() = cache.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

pub fn default_cache_path() -> Result<PathBuf> {
    let cache_root = dirs::cache_dir().ok_or_else(|| {
        anyhow!("cannot resolve cache directory; set [cache].path or LEASESCOPE_CACHE_PATH")
    })?;
    Ok(cache_root.join(APP_NAME).join(CACHE_FILE_NAME))
}

pub fn ttl_from_days(days: i64) -> Duration {
    Duration::days(days)
}
