//! Bitset newtypes stored as 64-bit integers.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

// ── Product Output ──────────────────────────────────────────────────────────

/// What kind of output a product is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductOutputFlags(u64);

impl ProductOutputFlags {
    pub const PRODUCT_ASSET: Self = Self(1);
    pub const INTERMEDIATE_ASSET: Self = Self(1 << 1);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }
}

impl BitOr for ProductOutputFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ── Product Dependency ──────────────────────────────────────────────────────

/// Opaque dependency flags. The database stores and returns them untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyFlags(u64);

impl DependencyFlags {
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn test(self, bit: u32) -> bool {
        bit < 64 && self.0 & (1 << bit) != 0
    }

    pub fn set(&mut self, bit: u32, on: bool) {
        if bit >= 64 {
            return;
        }
        if on {
            self.0 |= 1 << bit;
        } else {
            self.0 &= !(1 << bit);
        }
    }
}

// ── Source Dependency ───────────────────────────────────────────────────────

/// Kind of a source file dependency.
///
/// Stored rows carry a single kind; queries pass a mask and match any row
/// sharing a bit with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceDependencyType(u64);

impl SourceDependencyType {
    pub const SOURCE_TO_SOURCE: Self = Self(1);
    pub const JOB_TO_JOB: Self = Self(1 << 1);
    pub const SOURCE_OR_JOB: Self = Self(1 | 1 << 1);
    /// The depends-on value is a SQL LIKE pattern rather than a literal.
    pub const SOURCE_LIKE_MATCH: Self = Self(1 << 2);
    pub const ANY: Self = Self(u32::MAX as u64);

    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for SourceDependencyType {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
