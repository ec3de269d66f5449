//! Basket service coordinating the aggregate with persistence.

use std::collections::HashMap;

use common::{BasketId, BasketItemId};

use crate::error::DomainError;
use crate::repository::BasketRepository;
use crate::result::ServiceResult;

use super::{Basket, BuyerId, CatalogItemId, Money};

/// Service for the basket lifecycle.
///
/// Each operation loads the basket it needs, mutates it through the
/// aggregate and writes it back whole. The service keeps no state between
/// calls; concurrent writers to one basket are arbitrated by the
/// repository's version check.
pub struct BasketService<R: BasketRepository> {
    repository: R,
}

impl<R: BasketRepository> BasketService<R> {
    /// Creates a new basket service over the given repository.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Adds units of a catalog item to the buyer's basket.
    ///
    /// The basket is created if the buyer has none yet.
    #[tracing::instrument(skip(self), fields(buyer_id = %buyer_id))]
    pub async fn add_item_to_basket(
        &self,
        buyer_id: &BuyerId,
        catalog_item_id: CatalogItemId,
        price: Money,
        quantity: u32,
    ) -> Result<Basket, DomainError> {
        let mut basket = self.basket_or_new(buyer_id).await?;

        basket.add_item(catalog_item_id, price, quantity)?;
        self.repository.update(&mut basket).await?;

        metrics::counter!("basket_items_added_total").increment(1);
        Ok(basket)
    }

    /// Deletes a basket.
    ///
    /// Fails with `BasketNotFound` without touching the store if the basket
    /// does not exist.
    #[tracing::instrument(skip(self))]
    pub async fn delete_basket(&self, basket_id: BasketId) -> Result<(), DomainError> {
        let basket = self
            .repository
            .find_by_id(basket_id)
            .await?
            .ok_or(DomainError::BasketNotFound(basket_id))?;

        self.repository.delete(&basket).await?;

        metrics::counter!("basket_deletions_total").increment(1);
        Ok(())
    }

    /// Overwrites the quantities of the listed lines.
    ///
    /// Keys are item IDs in their string form. Keys that match no line are
    /// ignored. Lines set to 0 are removed before the basket is saved.
    #[tracing::instrument(skip(self, quantities), fields(updates = quantities.len()))]
    pub async fn set_quantities(
        &self,
        basket_id: BasketId,
        quantities: &HashMap<String, u32>,
    ) -> Result<ServiceResult<Basket>, DomainError> {
        let Some(mut basket) = self.repository.find_by_id(basket_id).await? else {
            tracing::debug!(%basket_id, "basket not found");
            return Ok(ServiceResult::NotFound);
        };

        let updates: Vec<(BasketItemId, u32)> = basket
            .items()
            .iter()
            .filter_map(|item| {
                quantities
                    .get(&item.id.to_string())
                    .map(|&quantity| (item.id, quantity))
            })
            .collect();

        for (item_id, quantity) in updates {
            tracing::info!(%item_id, quantity, "updating basket item quantity");
            basket.set_item_quantity(item_id, quantity)?;
            metrics::counter!("basket_quantity_updates_total").increment(1);
        }
        basket.remove_empty_items();

        self.repository.update(&mut basket).await?;
        Ok(ServiceResult::Success(basket))
    }

    /// Moves an anonymous basket's lines into the buyer's basket.
    ///
    /// Lines merge by catalog item, keeping the destination's price. The
    /// destination is saved before the anonymous basket is deleted, so a
    /// failed delete leaves a stale anonymous basket but never loses a line.
    /// Does nothing if the anonymous basket is missing or has no lines.
    #[tracing::instrument(skip(self), fields(anonymous_id = %anonymous_id, buyer_id = %buyer_id))]
    pub async fn transfer_basket(
        &self,
        anonymous_id: &BuyerId,
        buyer_id: &BuyerId,
    ) -> Result<(), DomainError> {
        if anonymous_id == buyer_id {
            tracing::debug!("source and destination buyer are the same");
            return Ok(());
        }

        let Some(anonymous) = self.repository.find_by_buyer(anonymous_id).await? else {
            tracing::debug!("no anonymous basket to transfer");
            return Ok(());
        };
        if anonymous.is_empty() {
            tracing::debug!("anonymous basket is empty, nothing to transfer");
            return Ok(());
        }

        let mut basket = self.basket_or_new(buyer_id).await?;
        for item in anonymous.items() {
            basket.add_item(item.catalog_item_id, item.unit_price, item.quantity)?;
        }
        self.repository.update(&mut basket).await?;

        if let Err(err) = self.repository.delete(&anonymous).await {
            tracing::warn!(error = %err, "transferred basket could not be deleted");
            return Err(err);
        }

        metrics::counter!("basket_transfers_total").increment(1);
        tracing::info!(lines = anonymous.item_count(), "basket transferred");
        Ok(())
    }

    /// Loads the buyer's basket.
    ///
    /// Returns None if the buyer has no basket.
    #[tracing::instrument(skip(self), fields(buyer_id = %buyer_id))]
    pub async fn basket_for_buyer(&self, buyer_id: &BuyerId) -> Result<Option<Basket>, DomainError> {
        self.repository.find_by_buyer(buyer_id).await
    }

    /// Loads a basket by ID.
    ///
    /// Returns None if the basket doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn basket(&self, basket_id: BasketId) -> Result<Option<Basket>, DomainError> {
        self.repository.find_by_id(basket_id).await
    }

    async fn basket_or_new(&self, buyer_id: &BuyerId) -> Result<Basket, DomainError> {
        if let Some(basket) = self.repository.find_by_buyer(buyer_id).await? {
            return Ok(basket);
        }

        let basket = self.repository.add(Basket::new(buyer_id.clone())?).await?;
        tracing::debug!(basket_id = ?basket.id(), "created basket");
        Ok(basket)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::StoreBasketRepository;
    use basket_store::InMemoryBasketStore;

    fn service() -> BasketService<StoreBasketRepository<InMemoryBasketStore>> {
        BasketService::new(StoreBasketRepository::new(InMemoryBasketStore::new()))
    }

    fn quantities(entries: &[(&str, u32)]) -> HashMap<String, u32> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[tokio::test]
    async fn test_add_item_creates_basket() {
        let service = service();
        let buyer = BuyerId::new("alice");

        let basket = service
            .add_item_to_basket(&buyer, CatalogItemId::new(1), Money::from_cents(500), 1)
            .await
            .unwrap();

        assert!(basket.id().is_some());
        assert_eq!(basket.item_count(), 1);
        assert_eq!(service.repository().store().basket_count().await, 1);
    }

    #[tokio::test]
    async fn test_add_item_reuses_existing_basket() {
        let service = service();
        let buyer = BuyerId::new("alice");

        let first = service
            .add_item_to_basket(&buyer, CatalogItemId::new(1), Money::from_cents(500), 1)
            .await
            .unwrap();
        let second = service
            .add_item_to_basket(&buyer, CatalogItemId::new(2), Money::from_cents(300), 2)
            .await
            .unwrap();

        assert_eq!(first.id(), second.id());
        assert_eq!(second.item_count(), 2);
        assert_eq!(service.repository().store().basket_count().await, 1);
    }

    #[tokio::test]
    async fn test_set_quantities_overwrites_and_prunes() {
        let service = service();
        let buyer = BuyerId::new("alice");
        service
            .add_item_to_basket(&buyer, CatalogItemId::new(1), Money::from_cents(500), 1)
            .await
            .unwrap();
        let basket = service
            .add_item_to_basket(&buyer, CatalogItemId::new(2), Money::from_cents(300), 4)
            .await
            .unwrap();
        let basket_id = basket.id().unwrap();
        let first = basket.items()[0].id.to_string();
        let second = basket.items()[1].id.to_string();

        let result = service
            .set_quantities(basket_id, &quantities(&[(first.as_str(), 5), (second.as_str(), 0)]))
            .await
            .unwrap();

        let basket = result.into_option().unwrap();
        assert_eq!(basket.item_count(), 1);
        assert_eq!(basket.items()[0].quantity, 5);
    }

    #[tokio::test]
    async fn test_set_quantities_missing_basket() {
        let service = service();
        let result = service
            .set_quantities(BasketId::new(42), &quantities(&[("1", 3)]))
            .await
            .unwrap();
        assert!(result.is_not_found());
    }

    #[tokio::test]
    async fn test_delete_basket() {
        let service = service();
        let basket = service
            .add_item_to_basket(
                &BuyerId::new("alice"),
                CatalogItemId::new(1),
                Money::from_cents(500),
                1,
            )
            .await
            .unwrap();

        service.delete_basket(basket.id().unwrap()).await.unwrap();

        assert_eq!(service.repository().store().basket_count().await, 0);
    }

    #[tokio::test]
    async fn test_transfer_to_same_buyer_is_noop() {
        let service = service();
        let buyer = BuyerId::new("alice");
        service
            .add_item_to_basket(&buyer, CatalogItemId::new(1), Money::from_cents(500), 2)
            .await
            .unwrap();

        service.transfer_basket(&buyer, &buyer).await.unwrap();

        let basket = service.basket_for_buyer(&buyer).await.unwrap().unwrap();
        assert_eq!(basket.items()[0].quantity, 2);
    }
}
