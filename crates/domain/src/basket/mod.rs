//! Basket aggregate and related types.

mod aggregate;
mod service;
mod value_objects;

pub use aggregate::Basket;
pub use service::BasketService;
pub use value_objects::{BasketItem, BuyerId, CatalogItemId, Money, ParseMoneyError};

use common::BasketItemId;
use thiserror::Error;

/// Errors that can occur during basket operations.
#[derive(Debug, Error)]
pub enum BasketError {
    /// Buyer ID is required.
    #[error("Buyer ID is required")]
    BuyerIdRequired,

    /// Item not found in basket.
    #[error("Item not found: {item_id}")]
    ItemNotFound { item_id: BasketItemId },

    /// Invalid quantity.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Adding to a line would overflow its quantity.
    #[error("Quantity overflow for item {item_id}")]
    QuantityOverflow { item_id: BasketItemId },

    /// No item IDs are left to hand out.
    #[error("Basket has run out of item IDs")]
    ItemIdsExhausted,

    /// Invalid price.
    #[error("Invalid price: {price} (must not be negative)")]
    InvalidPrice { price: Money },
}
