// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

const OUI_LEN: usize = 6;

/// Vendor prefix of a MAC address: six uppercase hex digits, no separators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oui(String);

impl Oui {
    /// Accepts `AA:BB:CC:..`, `aa-bb-cc-..`, `aabb.cc..` and bare hex. Returns
    /// `None` when fewer than six hex digits precede the first non-hex
    /// character.
    pub fn from_mac(mac: &str) -> Option<Self> {
        let mut key = String::with_capacity(OUI_LEN);
        for ch in mac.chars() {
            if is_separator(ch) {
                continue;
            }
            if !ch.is_ascii_hexdigit() {
                return None;
            }
            key.push(ch.to_ascii_uppercase());
            if key.len() == OUI_LEN {
                return Some(Self(key));
            }
        }
        None
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Oui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_separator(ch: char) -> bool {
    matches!(ch, ':' | '-' | '.') || ch.is_whitespace()
}
