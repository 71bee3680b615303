// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// One DHCP lease as reported by the router. `vendor` stays empty until the
/// resolver fills it in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub address: String,
    pub mac_address: String,
    pub hostname: String,
    pub vendor: String,
}

impl Lease {
    pub fn new(
        address: impl Into<String>,
        mac_address: impl Into<String>,
        hostname: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            mac_address: mac_address.into(),
            hostname: hostname.into(),
            vendor: String::new(),
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeaseColumn {
    Address,
    Mac,
    Hostname,
    Vendor,
}

impl LeaseColumn {
    pub const ALL: [Self; 4] = [Self::Address, Self::Mac, Self::Hostname, Self::Vendor];

    pub const fn index(self) -> usize {
        match self {
            Self::Address => 0,
            Self::Mac => 1,
            Self::Hostname => 2,
            Self::Vendor => 3,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Address => "IP",
            Self::Mac => "MAC",
            Self::Hostname => "Hostname",
            Self::Vendor => "Vendor",
        }
    }

    pub const fn width(self) -> u16 {
        match self {
            Self::Address => 15,
            Self::Mac => 17,
            Self::Hostname => 20,
            Self::Vendor => 30,
        }
    }

    pub fn next(self) -> Self {
        self.rotate(1)
    }

    pub fn prev(self) -> Self {
        self.rotate(-1)
    }

    fn rotate(self, delta: isize) -> Self {
        let len = Self::ALL.len() as isize;
        let next = (self.index() as isize + delta).rem_euclid(len) as usize;
        Self::ALL[next]
    }
}

/// Display row derived from a [`Lease`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseRow {
    pub address: String,
    pub mac_address: String,
    pub hostname: String,
    pub vendor: String,
}

impl LeaseRow {
    pub fn value(&self, column: LeaseColumn) -> &str {
        match column {
            LeaseColumn::Address => &self.address,
            LeaseColumn::Mac => &self.mac_address,
            LeaseColumn::Hostname => &self.hostname,
            LeaseColumn::Vendor => &self.vendor,
        }
    }

    pub fn cells(&self) -> [&str; 4] {
        LeaseColumn::ALL.map(|column| self.value(column))
    }
}

impl From<Lease> for LeaseRow {
    fn from(lease: Lease) -> Self {
        Self {
            address: lease.address,
            mac_address: lease.mac_address,
            hostname: lease.hostname,
            vendor: lease.vendor,
        }
    }
}

impl From<&Lease> for LeaseRow {
    fn from(lease: &Lease) -> Self {
        Self::from(lease.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: LeaseColumn,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            column: LeaseColumn::Address,
            direction: SortDirection::Asc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Lease, LeaseColumn, LeaseRow, SortDirection};

    #[test]
    fn column_rotation_wraps_both_ways() {
        assert_eq!(LeaseColumn::Vendor.next(), LeaseColumn::Address);
        assert_eq!(LeaseColumn::Address.prev(), LeaseColumn::Vendor);
        assert_eq!(LeaseColumn::Mac.next(), LeaseColumn::Hostname);
    }

    #[test]
    fn column_index_matches_position_in_all() {
        for (position, column) in LeaseColumn::ALL.into_iter().enumerate() {
            assert_eq!(column.index(), position);
        }
    }

    #[test]
    fn row_value_maps_named_fields() {
        let row = LeaseRow::from(
            Lease::new("10.0.0.5", "AA:BB:CC:11:22:33", "laptop").with_vendor("Acme Corp"),
        );
        assert_eq!(row.value(LeaseColumn::Address), "10.0.0.5");
        assert_eq!(row.value(LeaseColumn::Mac), "AA:BB:CC:11:22:33");
        assert_eq!(row.value(LeaseColumn::Hostname), "laptop");
        assert_eq!(row.value(LeaseColumn::Vendor), "Acme Corp");
        assert_eq!(
            row.cells(),
            ["10.0.0.5", "AA:BB:CC:11:22:33", "laptop", "Acme Corp"]
        );
    }

    #[test]
    fn direction_toggle_and_glyph() {
        assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
        assert_eq!(SortDirection::Desc.toggled(), SortDirection::Asc);
        assert_eq!(SortDirection::Asc.glyph(), "↑");
        assert_eq!(SortDirection::Desc.glyph(), "↓");
    }
}
