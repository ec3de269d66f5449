//! Domain error types.

use basket_store::StoreError;
use common::BasketId;
use thiserror::Error;

use crate::basket::BasketError;

/// Errors that can occur during domain operations.
#[derive(Debug, Error)]
pub enum DomainError {
    /// An error occurred in the basket store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An error occurred in the basket aggregate.
    #[error("Basket error: {0}")]
    Basket(#[from] BasketError),

    /// Basket not found.
    #[error("Basket not found: {0}")]
    BasketNotFound(BasketId),

    /// The basket has not been stored yet, so it cannot be updated or deleted.
    #[error("Basket for buyer {buyer_id} has not been stored")]
    NotStored { buyer_id: String },

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DomainError {
    /// Returns true if the error means the requested basket or line does not
    /// exist, which callers should report as a normal "not found" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::BasketNotFound(_)
                | DomainError::Store(StoreError::BasketNotFound(_))
                | DomainError::Basket(BasketError::ItemNotFound { .. })
        )
    }

    /// Returns true if the write lost a race with another writer.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DomainError::Store(StoreError::ConcurrencyConflict { .. })
        )
    }
}
