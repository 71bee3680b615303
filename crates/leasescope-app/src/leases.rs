// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::Lease;
use anyhow::{Context, Result};

pub const LEASE_PRINT_COMMAND: &str = "/ip dhcp-server lease print terse";

/// Narrow capability the lease viewer needs from a router connection: run
/// one command and hand back its combined output.
pub trait CommandRunner {
    fn run(&mut self, command: &str) -> Result<String>;
}

pub fn fetch_leases<R: CommandRunner + ?Sized>(runner: &mut R) -> Result<Vec<Lease>> {
    let output = runner
        .run(LEASE_PRINT_COMMAND)
        .with_context(|| format!("run `{LEASE_PRINT_COMMAND}`"))?;
    Ok(parse_leases(&output))
}

/// Parses `print terse` output. Lines without both an address and a MAC are
/// dropped rather than reported.
pub fn parse_leases(output: &str) -> Vec<Lease> {
    output.lines().filter_map(parse_lease_line).collect()
}

fn parse_lease_line(line: &str) -> Option<Lease> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut lease = Lease::default();
    for token in line.split_whitespace() {
        if let Some(value) = token.strip_prefix("address=") {
            lease.address = value.to_owned();
        } else if let Some(value) = token.strip_prefix("mac-address=") {
            lease.mac_address = value.to_owned();
        } else if let Some(value) = token.strip_prefix("host-name=") {
            lease.hostname = value.to_owned();
        }
    }

    if lease.address.is_empty() || lease.mac_address.is_empty() {
        return None;
    }
    Some(lease)
}
