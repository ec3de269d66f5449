use thiserror::Error;

use crate::{BasketId, Version};

/// Errors that can occur when interacting with the basket store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The stored basket changed since it was read.
    #[error(
        "Concurrency conflict for basket {basket_id}: expected version {expected}, found {actual}"
    )]
    ConcurrencyConflict {
        basket_id: BasketId,
        expected: Version,
        actual: Version,
    },

    /// No basket is stored under this ID.
    #[error("Basket not found: {0}")]
    BasketNotFound(BasketId),

    /// The buyer already owns a stored basket.
    #[error("Buyer already has a basket: {0}")]
    DuplicateBuyer(String),

    /// The backing store could not complete the operation.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for basket store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
