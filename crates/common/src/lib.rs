//! Identifier types shared across the basket crates.

pub mod types;

pub use types::{BasketId, BasketItemId};
