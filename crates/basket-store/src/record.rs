use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::BasketId;

/// Version number of a stored basket, used for optimistic concurrency control.
///
/// A basket is stored at version 1 and every successful update increments it.
/// Version 0 marks a basket that has never been stored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(i64);

impl Version {
    /// Creates a new version from a raw value.
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Returns the initial version (0) for an unsaved basket.
    pub fn initial() -> Self {
        Self(0)
    }

    /// Returns the version (1) a basket is first stored at.
    pub fn first() -> Self {
        Self(1)
    }

    /// Returns the next version.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the raw version value.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Version {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A basket as held by the store.
///
/// The store indexes records by ID and buyer and checks versions; the basket
/// contents are opaque JSON owned by the domain layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketRecord {
    /// Store-assigned identifier.
    pub basket_id: BasketId,

    /// The buyer owning this basket.
    pub buyer_id: String,

    /// Version of the record.
    pub version: Version,

    /// When the record was last written.
    pub updated_at: DateTime<Utc>,

    /// The serialized basket.
    pub state: serde_json::Value,
}

impl BasketRecord {
    /// Creates a new record at the first version.
    pub fn new(basket_id: BasketId, buyer_id: impl Into<String>, state: serde_json::Value) -> Self {
        Self {
            basket_id,
            buyer_id: buyer_id.into(),
            version: Version::first(),
            updated_at: Utc::now(),
            state,
        }
    }

    /// Deserializes the record state into a concrete type.
    pub fn into_state<T: for<'de> Deserialize<'de>>(self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.state)
    }
}
