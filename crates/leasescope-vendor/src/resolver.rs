// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{CacheStore, DEFAULT_TTL_DAYS, LookupOutcome, Oui, VendorLookup, ttl_from_days};
use leasescope_app::Lease;
use std::fmt;
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;

pub const UNKNOWN_VENDOR: &str = "Unknown";
pub const RATE_LIMITED_VENDOR: &str = "Rate Limited";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorName {
    Known(String),
    Unknown,
    RateLimited,
}

impl VendorName {
    /// Blank text and the literal sentinel both collapse to `Unknown` so they
    /// can never be cached.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() || text == UNKNOWN_VENDOR {
            Self::Unknown
        } else {
            Self::Known(text)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(name) => name,
            Self::Unknown => UNKNOWN_VENDOR,
            Self::RateLimited => RATE_LIMITED_VENDOR,
        }
    }

    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Known(_))
    }
}

impl fmt::Display for VendorName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Waits taken between attempts when every attempt is rate limited. One
    /// fewer than the number of attempts.
    pub fn backoff_schedule(&self) -> Vec<Duration> {
        let mut waits = Vec::new();
        let mut backoff = self.initial_backoff.min(self.max_backoff);
        for _ in 1..self.max_attempts.max(1) {
            waits.push(backoff);
            backoff = backoff.saturating_mul(2).min(self.max_backoff);
        }
        waits
    }
}

type SleepFn = Box<dyn Fn(Duration)>;

/// Resolves MAC addresses to vendor names through the cache, falling back to
/// the lookup service. The cache is reloaded on every call.
pub struct Resolver<S, L> {
    store: S,
    lookup: L,
    policy: RetryPolicy,
    ttl: time::Duration,
    sleep: SleepFn,
}

impl<S: CacheStore, L: VendorLookup> Resolver<S, L> {
    pub fn new(store: S, lookup: L) -> Self {
        Self {
            store,
            lookup,
            policy: RetryPolicy::default(),
            ttl: ttl_from_days(DEFAULT_TTL_DAYS),
            sleep: Box::new(thread::sleep),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_ttl(mut self, ttl: time::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sleep(mut self, sleep: impl Fn(Duration) + 'static) -> Self {
        self.sleep = Box::new(sleep);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn resolve(&self, mac: &str) -> VendorName {
        self.resolve_at(mac, OffsetDateTime::now_utc())
    }

    pub fn resolve_at(&self, mac: &str, now: OffsetDateTime) -> VendorName {
        let Some(oui) = Oui::from_mac(mac) else {
            tracing::debug!("cannot derive OUI from {mac:?}");
            return VendorName::Unknown;
        };

        let mut cache = self.store.load();
        if let Some(vendor) = cache.fresh_vendor(&oui, now, self.ttl) {
            tracing::debug!("vendor cache hit for {oui}");
            return VendorName::Known(vendor.to_owned());
        }

        let vendor = self.query_with_retry(&oui);
        if vendor.is_cacheable() {
            cache.insert(&oui, vendor.as_str(), now);
            if let Err(error) = self.store.save(&cache) {
                tracing::warn!("failed to save vendor cache: {error:#}");
            }
        }
        vendor
    }

    fn query_with_retry(&self, oui: &Oui) -> VendorName {
        let mut waits = self.policy.backoff_schedule().into_iter();
        let attempts = waits.len() + 1;

        for attempt in 1..=attempts {
            tracing::info!("looking up vendor for {oui} (attempt {attempt}/{attempts})");
            match self.lookup.query(oui) {
                Ok(LookupOutcome::Found(text)) => return VendorName::from_text(text),
                Ok(LookupOutcome::Failed(status)) => {
                    tracing::info!("vendor lookup for {oui} returned status {status}");
                    return VendorName::Unknown;
                }
                Ok(LookupOutcome::RateLimited) => {
                    let Some(backoff) = waits.next() else {
                        break;
                    };
                    tracing::warn!("rate limit reached, waiting {backoff:?} before retry");
                    (self.sleep)(backoff);
                }
                Err(error) => {
                    tracing::info!("vendor lookup for {oui} failed: {error:#}");
                    return VendorName::Unknown;
                }
            }
        }

        VendorName::RateLimited
    }
}

/// Fills in `vendor` for every lease, one lookup at a time.
pub fn enrich_leases<S: CacheStore, L: VendorLookup>(
    resolver: &Resolver<S, L>,
    leases: Vec<Lease>,
) -> Vec<Lease> {
    let total = leases.len();
    leases
        .into_iter()
        .enumerate()
        .map(|(index, lease)| {
            tracing::debug!("resolving vendor {}/{total} for {}", index + 1, lease.mac_address);
            let vendor = resolver.resolve(&lease.mac_address);
            lease.with_vendor(vendor.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{RetryPolicy, VendorName};
    use std::time::Duration;

    #[test]
    fn default_schedule_doubles_from_two_seconds() {
        assert_eq!(
            RetryPolicy::default().backoff_schedule(),
            vec![Duration::from_secs(2), Duration::from_secs(4)]
        );
    }

    #[test]
    fn schedule_is_capped_and_non_decreasing() {
        let policy = RetryPolicy {
            max_attempts: 8,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(60),
        };
        let waits = policy.backoff_schedule();
        assert_eq!(waits.len(), 7);
        assert_eq!(waits.last(), Some(&Duration::from_secs(60)));
        assert!(waits.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn single_attempt_never_waits() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        assert!(policy.backoff_schedule().is_empty());
    }

    #[test]
    fn vendor_name_sentinels() {
        assert_eq!(VendorName::from_text(""), VendorName::Unknown);
        assert_eq!(VendorName::from_text("Unknown"), VendorName::Unknown);
        assert_eq!(
            VendorName::from_text("Acme Corp"),
            VendorName::Known("Acme Corp".to_owned())
        );
        assert_eq!(VendorName::RateLimited.to_string(), "Rate Limited");
        assert!(!VendorName::RateLimited.is_cacheable());
        assert!(!VendorName::Unknown.is_cacheable());
        assert!(VendorName::Known("x".to_owned()).is_cacheable());
    }
}
