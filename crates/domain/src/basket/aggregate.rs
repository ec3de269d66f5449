//! Basket aggregate implementation.

use basket_store::Version;
use common::{BasketId, BasketItemId};
use serde::{Deserialize, Serialize};

use super::{BasketError, BasketItem, BuyerId, CatalogItemId, Money};

/// Basket aggregate root.
///
/// A buyer's in-progress selection of catalog items. Lines are kept in the
/// order they were first added and are unique by catalog item. All mutation
/// rules live here; the basket never touches persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Basket {
    /// Identifier assigned by the store; `None` until first stored.
    /// Lives on the store record, not in the persisted state.
    #[serde(skip)]
    id: Option<BasketId>,

    /// Version for optimistic concurrency. Lives on the store record.
    #[serde(skip)]
    version: Version,

    /// Owner of the basket.
    buyer_id: BuyerId,

    /// Lines in insertion order.
    items: Vec<BasketItem>,

    /// Highest item ID handed out so far. IDs of removed lines are not reused.
    #[serde(default)]
    last_item_id: u32,
}

impl Basket {
    /// Creates an empty basket for a buyer.
    pub fn new(buyer_id: impl Into<BuyerId>) -> Result<Self, BasketError> {
        let buyer_id = buyer_id.into();
        if buyer_id.is_blank() {
            return Err(BasketError::BuyerIdRequired);
        }

        Ok(Self {
            id: None,
            version: Version::initial(),
            buyer_id,
            items: Vec::new(),
            last_item_id: 0,
        })
    }

    /// Records the identity and version the store assigned.
    ///
    /// Called by repositories after reading or inserting a basket.
    pub fn set_stored(&mut self, id: BasketId, version: Version) {
        self.id = Some(id);
        self.version = version;
    }

    /// Sets the basket version.
    ///
    /// Called by repositories after a successful update.
    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }
}

// Query methods
impl Basket {
    /// Returns the store-assigned ID, if the basket has been stored.
    pub fn id(&self) -> Option<BasketId> {
        self.id
    }

    /// Returns the version last read from or written to the store.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the buyer owning this basket.
    pub fn buyer_id(&self) -> &BuyerId {
        &self.buyer_id
    }

    /// Returns the lines in insertion order.
    pub fn items(&self) -> &[BasketItem] {
        &self.items
    }

    /// Returns a line by its ID.
    pub fn item(&self, item_id: BasketItemId) -> Option<&BasketItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    /// Returns the line for a catalog item.
    pub fn item_for_catalog_item(&self, catalog_item_id: CatalogItemId) -> Option<&BasketItem> {
        self.items
            .iter()
            .find(|item| item.catalog_item_id == catalog_item_id)
    }

    /// Returns the number of lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Returns the total number of units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Returns true if the basket has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// Command methods
impl Basket {
    /// Adds units of a catalog item.
    ///
    /// If a line for the catalog item already exists its quantity grows and
    /// its original unit price is kept. Otherwise a new line is appended.
    pub fn add_item(
        &mut self,
        catalog_item_id: CatalogItemId,
        unit_price: Money,
        quantity: u32,
    ) -> Result<(), BasketError> {
        if quantity == 0 {
            return Err(BasketError::InvalidQuantity { quantity });
        }

        if unit_price.is_negative() {
            return Err(BasketError::InvalidPrice { price: unit_price });
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|item| item.catalog_item_id == catalog_item_id)
        {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(BasketError::QuantityOverflow {
                    item_id: existing.id,
                })?;
            return Ok(());
        }

        let id = self.next_item_id()?;
        self.items
            .push(BasketItem::new(id, catalog_item_id, unit_price, quantity));
        Ok(())
    }

    /// Adds a single unit of a catalog item.
    pub fn add_one(
        &mut self,
        catalog_item_id: CatalogItemId,
        unit_price: Money,
    ) -> Result<(), BasketError> {
        self.add_item(catalog_item_id, unit_price, 1)
    }

    /// Sets the quantity of a line exactly.
    ///
    /// A quantity of 0 is accepted; the line stays until
    /// [`remove_empty_items`](Self::remove_empty_items) runs.
    pub fn set_item_quantity(
        &mut self,
        item_id: BasketItemId,
        quantity: u32,
    ) -> Result<(), BasketError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == item_id)
            .ok_or(BasketError::ItemNotFound { item_id })?;

        item.quantity = quantity;
        Ok(())
    }

    /// Drops every line whose quantity is 0.
    pub fn remove_empty_items(&mut self) {
        self.items.retain(|item| item.quantity > 0);
    }

    fn next_item_id(&mut self) -> Result<BasketItemId, BasketError> {
        let used = self.items.iter().map(|item| item.id.as_u32()).max();
        let last = BasketItemId::new(self.last_item_id.max(used.unwrap_or(0)));
        let id = last.next().ok_or(BasketError::ItemIdsExhausted)?;
        self.last_item_id = id.as_u32();
        Ok(id)
    }
}
