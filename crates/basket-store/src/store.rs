use async_trait::async_trait;

use crate::{BasketId, BasketRecord, Result, Version};

/// Core trait for basket store implementations.
///
/// A store holds at most one basket per buyer. Writes to an existing record
/// carry the version that was read, and fail with `ConcurrencyConflict` when
/// the record has moved on. All implementations must be thread-safe.
#[async_trait]
pub trait BasketStore: Send + Sync {
    /// Finds the basket owned by a buyer.
    async fn find_by_buyer(&self, buyer_id: &str) -> Result<Option<BasketRecord>>;

    /// Finds a basket by its ID.
    async fn find_by_id(&self, basket_id: BasketId) -> Result<Option<BasketRecord>>;

    /// Stores a new basket for a buyer and assigns its ID.
    ///
    /// Fails with `DuplicateBuyer` if the buyer already has a basket.
    async fn insert(&self, buyer_id: &str, state: serde_json::Value) -> Result<BasketRecord>;

    /// Replaces the contents of a stored basket.
    ///
    /// Returns the new version.
    async fn update(
        &self,
        basket_id: BasketId,
        expected_version: Version,
        state: serde_json::Value,
    ) -> Result<Version>;

    /// Removes a stored basket.
    async fn delete(&self, basket_id: BasketId, expected_version: Version) -> Result<()>;
}
