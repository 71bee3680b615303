// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use leasescope_app::{CommandRunner, LEASE_PRINT_COMMAND, LeaseTable, fetch_leases};
use leasescope_testkit::LeaseFaker;
use leasescope_vendor::{
    CacheStore, LookupOutcome, Oui, Resolver, VendorLookup, enrich_leases, ttl_from_days,
};
use time::OffsetDateTime;

/// A connected router plus the resolver used to label its leases.
pub struct LeaseSession<R, S, L> {
    runner: R,
    resolver: Resolver<S, L>,
}

impl<R: CommandRunner, S: CacheStore, L: VendorLookup> LeaseSession<R, S, L> {
    pub fn new(runner: R, resolver: Resolver<S, L>) -> Self {
        Self { runner, resolver }
    }

    /// Fetches the current leases, resolves their vendors and returns the
    /// table in its initial sort.
    pub fn load_table(&mut self) -> Result<LeaseTable> {
        let leases = fetch_leases(&mut self.runner).context("fetch DHCP leases from router")?;
        tracing::info!("router reported {} leases", leases.len());
        let leases = enrich_leases(&self.resolver, leases);
        Ok(LeaseTable::new(leases))
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn resolver(&self) -> &Resolver<S, L> {
        &self.resolver
    }
}

/// Stand-in router for `--demo`: answers the lease print command with the
/// same generated leases every time.
#[derive(Debug, Clone, Copy)]
pub struct DemoRouter {
    seed: u64,
    lease_count: usize,
}

impl DemoRouter {
    pub fn new(seed: u64, lease_count: usize) -> Self {
        Self { seed, lease_count }
    }
}

impl CommandRunner for DemoRouter {
    fn run(&mut self, command: &str) -> Result<String> {
        if command != LEASE_PRINT_COMMAND {
            bail!("demo router cannot run `{command}`");
        }
        Ok(LeaseFaker::new(self.seed).terse_output(self.lease_count))
    }
}

/// Offline lookup backed by the testkit vendor table, for `--demo`.
#[derive(Debug, Default)]
pub struct DemoLookup;

impl VendorLookup for DemoLookup {
    fn query(&self, oui: &Oui) -> Result<LookupOutcome> {
        Ok(match leasescope_testkit::demo_vendor(oui.as_str()) {
            Some(company) => LookupOutcome::Found(company.to_owned()),
            None => LookupOutcome::Failed(404),
        })
    }
}

/// Drops entries older than `ttl_days` and saves only when something was
/// removed. Returns the number of entries dropped.
pub fn prune_vendor_cache<S: CacheStore>(
    store: &S,
    ttl_days: i64,
    now: OffsetDateTime,
) -> Result<usize> {
    let mut cache = store.load();
    let removed = cache.prune(now, ttl_from_days(ttl_days));
    if removed > 0 {
        store.save(&cache).context("save pruned vendor cache")?;
    }
    Ok(removed)
}
