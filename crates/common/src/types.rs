use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier of a stored basket.
///
/// Assigned by the persistence layer when a basket is first added; a basket
/// that has never been stored has no id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketId(i64);

impl BasketId {
    /// Creates a basket ID from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for BasketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BasketId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for BasketId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Identifier of a line within a single basket.
///
/// Unique only inside the owning basket. Its `Display` form is the plain
/// number, which is what quantity updates are keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BasketItemId(u32);

impl BasketItemId {
    /// Creates an item ID from a raw value.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns the following ID, or `None` once the range is used up.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl std::fmt::Display for BasketItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for BasketItemId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}
