//! Versioned basket persistence: the store contract and an in-memory store.

pub mod error;
pub mod memory;
pub mod record;
pub mod store;

pub use common::BasketId;
pub use error::{Result, StoreError};
pub use memory::InMemoryBasketStore;
pub use record::{BasketRecord, Version};
pub use store::BasketStore;
