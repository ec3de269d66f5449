//! Persistence port for baskets.

use async_trait::async_trait;
use basket_store::{BasketRecord, BasketStore};
use common::BasketId;

use crate::basket::{Basket, BuyerId};
use crate::error::DomainError;

/// Loads and saves whole baskets.
///
/// Each call is an atomic single-basket operation. Lookups return `None`
/// when nothing matches; `update` and `delete` expect a basket that was
/// previously returned by `add` or a lookup.
#[async_trait]
pub trait BasketRepository: Send + Sync {
    /// Finds the basket owned by a buyer, with its items.
    async fn find_by_buyer(&self, buyer_id: &BuyerId) -> Result<Option<Basket>, DomainError>;

    /// Finds a basket by ID, with its items.
    async fn find_by_id(&self, basket_id: BasketId) -> Result<Option<Basket>, DomainError>;

    /// Stores a new basket and returns it with its assigned ID.
    async fn add(&self, basket: Basket) -> Result<Basket, DomainError>;

    /// Writes the basket back, replacing the stored copy.
    async fn update(&self, basket: &mut Basket) -> Result<(), DomainError>;

    /// Removes the basket.
    async fn delete(&self, basket: &Basket) -> Result<(), DomainError>;
}

/// Repository that keeps baskets as JSON records in a [`BasketStore`].
#[derive(Debug, Clone)]
pub struct StoreBasketRepository<S: BasketStore> {
    store: S,
}

impl<S: BasketStore> StoreBasketRepository<S> {
    /// Creates a repository over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn restore(record: BasketRecord) -> Result<Basket, DomainError> {
        let basket_id = record.basket_id;
        let version = record.version;
        let mut basket: Basket = record.into_state()?;
        basket.set_stored(basket_id, version);
        Ok(basket)
    }

    fn stored_id(basket: &Basket) -> Result<BasketId, DomainError> {
        basket.id().ok_or_else(|| DomainError::NotStored {
            buyer_id: basket.buyer_id().to_string(),
        })
    }
}

#[async_trait]
impl<S: BasketStore> BasketRepository for StoreBasketRepository<S> {
    async fn find_by_buyer(&self, buyer_id: &BuyerId) -> Result<Option<Basket>, DomainError> {
        self.store
            .find_by_buyer(buyer_id.as_str())
            .await?
            .map(Self::restore)
            .transpose()
    }

    async fn find_by_id(&self, basket_id: BasketId) -> Result<Option<Basket>, DomainError> {
        self.store
            .find_by_id(basket_id)
            .await?
            .map(Self::restore)
            .transpose()
    }

    async fn add(&self, mut basket: Basket) -> Result<Basket, DomainError> {
        let state = serde_json::to_value(&basket)?;
        let record = self
            .store
            .insert(basket.buyer_id().as_str(), state)
            .await?;
        basket.set_stored(record.basket_id, record.version);
        Ok(basket)
    }

    async fn update(&self, basket: &mut Basket) -> Result<(), DomainError> {
        let basket_id = Self::stored_id(basket)?;
        let state = serde_json::to_value(&*basket)?;
        let version = self
            .store
            .update(basket_id, basket.version(), state)
            .await?;
        basket.set_version(version);
        Ok(())
    }

    async fn delete(&self, basket: &Basket) -> Result<(), DomainError> {
        let basket_id = Self::stored_id(basket)?;
        self.store.delete(basket_id, basket.version()).await?;
        Ok(())
    }
}
