use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{BasketId, BasketRecord, BasketStore, Result, StoreError, Version};

#[derive(Debug, Default)]
struct InMemoryState {
    baskets: HashMap<BasketId, BasketRecord>,
    last_id: i64,
    delete_calls: usize,
    fail_on_delete: bool,
}

/// In-memory basket store.
///
/// Clones share the same underlying map. IDs are assigned sequentially from 1.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBasketStore {
    state: Arc<RwLock<InMemoryState>>,
}

impl InMemoryBasketStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored baskets.
    pub async fn basket_count(&self) -> usize {
        self.state.read().await.baskets.len()
    }

    /// Returns how many times `delete` has been called, successful or not.
    pub async fn delete_calls(&self) -> usize {
        self.state.read().await.delete_calls
    }

    /// Makes subsequent `delete` calls fail with `Unavailable`.
    pub async fn set_fail_on_delete(&self, fail: bool) {
        self.state.write().await.fail_on_delete = fail;
    }
}

fn check_version(record: &BasketRecord, expected: Version) -> Result<()> {
    if record.version != expected {
        return Err(StoreError::ConcurrencyConflict {
            basket_id: record.basket_id,
            expected,
            actual: record.version,
        });
    }
    Ok(())
}

#[async_trait]
impl BasketStore for InMemoryBasketStore {
    async fn find_by_buyer(&self, buyer_id: &str) -> Result<Option<BasketRecord>> {
        let state = self.state.read().await;
        Ok(state
            .baskets
            .values()
            .find(|r| r.buyer_id == buyer_id)
            .cloned())
    }

    async fn find_by_id(&self, basket_id: BasketId) -> Result<Option<BasketRecord>> {
        let state = self.state.read().await;
        Ok(state.baskets.get(&basket_id).cloned())
    }

    async fn insert(&self, buyer_id: &str, basket: serde_json::Value) -> Result<BasketRecord> {
        let mut state = self.state.write().await;

        if state.baskets.values().any(|r| r.buyer_id == buyer_id) {
            return Err(StoreError::DuplicateBuyer(buyer_id.to_string()));
        }

        state.last_id += 1;
        let record = BasketRecord::new(BasketId::new(state.last_id), buyer_id, basket);
        state.baskets.insert(record.basket_id, record.clone());

        tracing::debug!(basket_id = %record.basket_id, buyer_id, "basket inserted");
        Ok(record)
    }

    async fn update(
        &self,
        basket_id: BasketId,
        expected_version: Version,
        basket: serde_json::Value,
    ) -> Result<Version> {
        let mut state = self.state.write().await;

        let record = state
            .baskets
            .get_mut(&basket_id)
            .ok_or(StoreError::BasketNotFound(basket_id))?;
        check_version(record, expected_version)?;

        record.version = record.version.next();
        record.updated_at = Utc::now();
        record.state = basket;

        Ok(record.version)
    }

    async fn delete(&self, basket_id: BasketId, expected_version: Version) -> Result<()> {
        let mut state = self.state.write().await;
        state.delete_calls += 1;

        if state.fail_on_delete {
            return Err(StoreError::Unavailable(format!(
                "delete of basket {basket_id} rejected"
            )));
        }

        let record = state
            .baskets
            .get(&basket_id)
            .ok_or(StoreError::BasketNotFound(basket_id))?;
        check_version(record, expected_version)?;

        state.baskets.remove(&basket_id);
        tracing::debug!(%basket_id, "basket deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> serde_json::Value {
        serde_json::json!({"items": []})
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids() {
        let store = InMemoryBasketStore::new();

        let first = store.insert("alice", state()).await.unwrap();
        let second = store.insert("bob", state()).await.unwrap();

        assert_eq!(first.basket_id, BasketId::new(1));
        assert_eq!(second.basket_id, BasketId::new(2));
        assert_eq!(first.version, Version::first());
        assert_eq!(store.basket_count().await, 2);
    }

    #[tokio::test]
    async fn insert_rejects_second_basket_for_buyer() {
        let store = InMemoryBasketStore::new();
        store.insert("alice", state()).await.unwrap();

        let result = store.insert("alice", state()).await;
        assert!(matches!(result, Err(StoreError::DuplicateBuyer(buyer)) if buyer == "alice"));
    }

    #[tokio::test]
    async fn find_by_buyer_and_id() {
        let store = InMemoryBasketStore::new();
        let record = store.insert("alice", state()).await.unwrap();

        let by_buyer = store.find_by_buyer("alice").await.unwrap().unwrap();
        assert_eq!(by_buyer.basket_id, record.basket_id);

        let by_id = store.find_by_id(record.basket_id).await.unwrap().unwrap();
        assert_eq!(by_id.buyer_id, "alice");

        assert!(store.find_by_buyer("bob").await.unwrap().is_none());
        assert!(store.find_by_id(BasketId::new(99)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_increments_version() {
        let store = InMemoryBasketStore::new();
        let record = store.insert("alice", state()).await.unwrap();

        let version = store
            .update(
                record.basket_id,
                Version::first(),
                serde_json::json!({"items": [1]}),
            )
            .await
            .unwrap();

        assert_eq!(version, Version::new(2));
        let stored = store.find_by_id(record.basket_id).await.unwrap().unwrap();
        assert_eq!(stored.state, serde_json::json!({"items": [1]}));
    }

    #[tokio::test]
    async fn concurrency_conflict_on_stale_version() {
        let store = InMemoryBasketStore::new();
        let record = store.insert("alice", state()).await.unwrap();

        store
            .update(record.basket_id, Version::first(), state())
            .await
            .unwrap();
        let result = store
            .update(record.basket_id, Version::first(), state())
            .await;

        assert!(matches!(
            result,
            Err(StoreError::ConcurrencyConflict { expected, actual, .. })
                if expected == Version::first() && actual == Version::new(2)
        ));
    }

    #[tokio::test]
    async fn update_missing_basket_fails() {
        let store = InMemoryBasketStore::new();
        let result = store
            .update(BasketId::new(7), Version::first(), state())
            .await;
        assert!(matches!(result, Err(StoreError::BasketNotFound(_))));
    }

    #[tokio::test]
    async fn delete_removes_basket() {
        let store = InMemoryBasketStore::new();
        let record = store.insert("alice", state()).await.unwrap();

        store
            .delete(record.basket_id, Version::first())
            .await
            .unwrap();

        assert!(store.find_by_id(record.basket_id).await.unwrap().is_none());
        assert_eq!(store.delete_calls().await, 1);
    }

    #[tokio::test]
    async fn delete_can_be_made_to_fail() {
        let store = InMemoryBasketStore::new();
        let record = store.insert("alice", state()).await.unwrap();
        store.set_fail_on_delete(true).await;

        let result = store.delete(record.basket_id, Version::first()).await;

        assert!(matches!(result, Err(StoreError::Unavailable(_))));
        assert!(store.find_by_id(record.basket_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = InMemoryBasketStore::new();
        let clone = store.clone();
        let record = store.insert("alice", state()).await.unwrap();

        let seen = clone.find_by_id(record.basket_id).await.unwrap().unwrap();
        assert_eq!(seen.version, Version::first());

        clone
            .delete(record.basket_id, Version::first())
            .await
            .unwrap();
        assert_eq!(store.basket_count().await, 0);
        assert_eq!(store.delete_calls().await, 1);
    }
}
