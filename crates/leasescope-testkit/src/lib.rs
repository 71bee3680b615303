// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use leasescope_app::{CommandRunner, Lease};
use std::collections::VecDeque;
use std::path::PathBuf;

/// OUIs the demo lookup knows about, paired with their registered company.
const DEMO_VENDORS: [(&str, &str); 8] = [
    ("001A2B", "Ayecom Technology Co., Ltd."),
    ("3C22FB", "Apple, Inc."),
    ("B827EB", "Raspberry Pi Foundation"),
    ("DCA632", "Raspberry Pi Trading Ltd"),
    ("F4F5D8", "Google, Inc."),
    ("48A98A", "Routerboard.com"),
    ("5CCF7F", "Espressif Inc."),
    ("001788", "Philips Lighting BV"),
];

/// OUIs the demo lookup does not know, so the table shows `Unknown` too.
const UNLISTED_OUIS: [&str; 2] = ["0A1B2C", "7E0000"];

const HOSTNAMES: [&str; 16] = [
    "laptop",
    "desktop",
    "phone",
    "tablet",
    "printer",
    "nas",
    "tv",
    "thermostat",
    "doorbell",
    "camera-front",
    "camera-back",
    "speaker",
    "console",
    "watch",
    "pi-hole",
    "hue-bridge",
];

pub const SAMPLE_TERSE_OUTPUT: &str = "\
Flags: X - disabled, R - radius, D - dynamic, B - blocked
 0 D address=192.168.88.10 mac-address=3C:22:FB:11:22:33 client-id=1:3c:22:fb:11:22:33 address-lists=\"\" server=defconf dhcp-option=\"\" status=bound expires-after=9m12s last-seen=48s active-address=192.168.88.10 active-mac-address=3C:22:FB:11:22:33 active-client-id=1:3c:22:fb:11:22:33 active-server=defconf host-name=laptop
 1 D address=192.168.88.23 mac-address=B8:27:EB:AA:BB:CC server=defconf status=bound host-name=pi-hole
 2 D address=192.168.88.7 mac-address=0A:1B:2C:00:00:01 server=defconf status=waiting

 3   address=192.168.88.2 mac-address=48:A9:8A:01:02:03 server=defconf status=bound comment=switch
 4 X address=192.168.88.50 server=defconf status=offered
";

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

/// Produces reproducible home-network leases for tests and `--demo`.
#[derive(Debug, Clone)]
pub struct LeaseFaker {
    rng: DeterministicRng,
    next_host: u8,
}

impl LeaseFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            next_host: 10,
        }
    }

    /// Addresses increase from `192.168.88.10`, so every lease is distinct.
    pub fn lease(&mut self) -> Lease {
        let address = format!("192.168.88.{}", self.next_host);
        self.next_host = self.next_host.saturating_add(1).min(254);

        let oui = if self.rng.int_n(5) == 0 {
            UNLISTED_OUIS[self.rng.int_n(UNLISTED_OUIS.len())]
        } else {
            DEMO_VENDORS[self.rng.int_n(DEMO_VENDORS.len())].0
        };
        let mac = self.mac_with_oui(oui);

        let hostname = if self.rng.int_n(6) == 0 {
            String::new()
        } else {
            HOSTNAMES[self.rng.int_n(HOSTNAMES.len())].to_owned()
        };
        Lease::new(address, mac, hostname)
    }

    pub fn leases(&mut self, count: usize) -> Vec<Lease> {
        (0..count).map(|_| self.lease()).collect()
    }

    /// Renders leases the way `/ip dhcp-server lease print terse` does.
    pub fn terse_output(&mut self, count: usize) -> String {
        let mut output = String::from("Flags: X - disabled, R - radius, D - dynamic, B - blocked\n");
        for (index, lease) in self.leases(count).iter().enumerate() {
            let flag = if self.rng.bool() { "D" } else { " " };
            output.push_str(&format!(
                "{index:>2} {flag} address={} mac-address={} server=defconf status=bound",
                lease.address, lease.mac_address
            ));
            if !lease.hostname.is_empty() {
                output.push_str(&format!(" host-name={}", lease.hostname));
            }
            output.push('\n');
        }
        output
    }

    fn mac_with_oui(&mut self, oui: &str) -> String {
        let mut octets = oui
            .as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).into_owned())
            .collect::<Vec<_>>();
        for _ in 0..3 {
            octets.push(format!("{:02X}", self.rng.int_n(256)));
        }
        octets.join(":")
    }
}

/// Company registered for `oui` in the demo vendor table.
pub fn demo_vendor(oui: &str) -> Option<&'static str> {
    DEMO_VENDORS
        .iter()
        .find(|(prefix, _)| *prefix == oui)
        .map(|(_, company)| *company)
}

/// [`CommandRunner`] that replays canned responses in order and records the
/// commands it was asked to run.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: VecDeque<Result<String, String>>,
    commands: Vec<String>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, output: impl Into<String>) -> Self {
        self.responses.push_back(Ok(output.into()));
        self
    }

    pub fn fail(mut self, message: impl Into<String>) -> Self {
        self.responses.push_back(Err(message.into()));
        self
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&mut self, command: &str) -> Result<String> {
        self.commands.push(command.to_owned());
        match self.responses.pop_front() {
            Some(Ok(output)) => Ok(output),
            Some(Err(message)) => Err(anyhow!(message)),
            None => Err(anyhow!("no scripted response for `{command}`")),
        }
    }
}

pub fn temp_cache_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let cache_path = dir.path().join("vendor_cache.json");
    Ok((dir, cache_path))
}
