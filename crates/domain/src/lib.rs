//! Domain layer for shopping baskets.
//!
//! This crate provides:
//! - The `Basket` aggregate, which owns every line-item rule
//! - `BasketService`, which runs the basket lifecycle against a repository
//! - The `BasketRepository` port and a store-backed implementation

pub mod basket;
pub mod error;
pub mod repository;
pub mod result;

pub use basket::{
    Basket, BasketError, BasketItem, BasketService, BuyerId, CatalogItemId, Money,
    ParseMoneyError,
};
pub use error::DomainError;
pub use repository::{BasketRepository, StoreBasketRepository};
pub use result::ServiceResult;
