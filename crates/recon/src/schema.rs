//! Table layouts of the merged JDF tables.
//!
//! This is data, not algorithm: which tables a batch must carry, how wide
//! each table is in the current (1.11) layout, and which default fields
//! older schema versions lack. The normalizer applies the version rules;
//! the entity merges address fields through the index modules below.

use std::fmt;

/// Oldest schema version (`1.X`) a batch may declare.
pub const MIN_VERSION: u8 = 8;
/// Newest schema version, the layout every row is normalized to.
pub const MAX_VERSION: u8 = 11;
/// Version string written to the output version table.
pub const OUTPUT_VERSION: &str = "1.11";

/// Where a default field is inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Before the field currently at this index.
    At(usize),
    /// After the last field.
    End,
}

/// One default field to splice into an older row.
#[derive(Debug, Clone, Copy)]
pub struct Insert {
    pub position: Position,
    pub value: &'static str,
}

const fn at(idx: usize, value: &'static str) -> Insert {
    Insert {
        position: Position::At(idx),
        value,
    }
}

const fn end(value: &'static str) -> Insert {
    Insert {
        position: Position::End,
        value,
    }
}

/// Inserts applied to rows whose batch version is below `threshold`.
/// Inserts run in declaration order, each on the already-widened row.
#[derive(Debug, Clone, Copy)]
pub struct VersionRule {
    pub threshold: u8,
    pub inserts: &'static [Insert],
}

#[derive(Debug)]
pub struct TableSpec {
    /// File stem inside a batch sub-archive (`<name>.txt`).
    pub name: &'static str,
    /// Absence is a batch-level failure for this entity type.
    pub mandatory: bool,
    /// Field count of the current layout.
    pub width: usize,
    pub rules: &'static [VersionRule],
}

impl fmt::Display for TableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub static VERSION: TableSpec = TableSpec {
    name: "VerzeJDF",
    mandatory: true,
    width: 6,
    rules: &[],
};

pub static FIXED_CODES: TableSpec = TableSpec {
    name: "Pevnykod",
    mandatory: true,
    width: 3,
    rules: &[],
};

pub static CARRIERS: TableSpec = TableSpec {
    name: "Dopravci",
    mandatory: true,
    width: 13,
    rules: &[VersionRule {
        threshold: 10,
        inserts: &[end("1")],
    }],
};

pub static STOPS: TableSpec = TableSpec {
    name: "Zastavky",
    mandatory: true,
    width: 12,
    rules: &[],
};

pub static LINES: TableSpec = TableSpec {
    name: "Linky",
    mandatory: true,
    width: 17,
    rules: &[
        VersionRule {
            threshold: 10,
            inserts: &[at(4, "A"), at(5, "0"), at(6, "0"), at(7, "0"), end("1"), end("1")],
        },
        VersionRule {
            threshold: 11,
            inserts: &[at(8, "0")],
        },
    ],
};

pub static LINE_STOPS: TableSpec = TableSpec {
    name: "Zaslinky",
    mandatory: true,
    width: 9,
    rules: &[VersionRule {
        threshold: 10,
        inserts: &[at(1, "1")],
    }],
};

/// Tables read from every batch, in merge order.
pub static MERGED_TABLES: [&TableSpec; 5] = [&FIXED_CODES, &CARRIERS, &STOPS, &LINES, &LINE_STOPS];

/// Schema version from a version-table value such as `"1.10"`.
pub fn parse_version(value: &str) -> Option<u8> {
    let (major, minor) = value.trim().split_once('.')?;
    if major != "1" {
        return None;
    }
    let minor: u8 = minor.parse().ok()?;
    (MIN_VERSION..=MAX_VERSION).contains(&minor).then_some(minor)
}

// ---------------------------------------------------------------------------
// Field indices (current layout)
// ---------------------------------------------------------------------------

pub mod fixed_code {
    pub const NUMBER: usize = 0;
    pub const SYMBOL: usize = 1;
}

pub mod carrier {
    pub const TAX_ID: usize = 0;
    pub const NAME: usize = 2;
    pub const LEGAL_FORM: usize = 3;
    pub const ADDRESS: usize = 5;
    pub const DISAMBIGUATOR: usize = 12;
}

pub mod stop {
    pub const ID: usize = 0;
    pub const TOWN: usize = 1;
    pub const TOWN_PART: usize = 2;
    pub const PLACE: usize = 3;
    pub const DISTRICT: usize = 4;
    pub const COUNTRY: usize = 5;
    pub const FIXED_CODES: std::ops::RangeInclusive<usize> = 6..=11;
}

pub mod line {
    pub const NUMBER: usize = 0;
    pub const CARRIER_TAX_ID: usize = 2;
    pub const VALID_FROM: usize = 13;
    pub const VALID_TO: usize = 14;
    pub const CARRIER_DISAMBIGUATOR: usize = 15;
    pub const DISAMBIGUATOR: usize = 16;
}

pub mod line_stop {
    pub const LINE_NUMBER: usize = 0;
    pub const LINE_DISAMBIGUATOR: usize = 1;
    pub const TARIFF_NUMBER: usize = 2;
    pub const STOP_ID: usize = 4;
    pub const FIXED_CODES: std::ops::RangeInclusive<usize> = 6..=8;
}
