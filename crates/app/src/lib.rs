//! Line-command driver for the basket service.
//!
//! Wires the in-memory store, repository and service together and turns
//! text commands into JSON results.

pub mod commands;
pub mod config;
pub mod telemetry;

pub use commands::{Command, CommandError};
pub use config::{Config, LogFormat};

use basket_store::InMemoryBasketStore;
use domain::{BasketRepository, BasketService, StoreBasketRepository};
use serde_json::{Value, json};

/// Basket service backed by the in-memory store.
pub type InMemoryBasketService = BasketService<StoreBasketRepository<InMemoryBasketStore>>;

/// Creates a service over a fresh in-memory store.
pub fn create_service() -> InMemoryBasketService {
    BasketService::new(StoreBasketRepository::new(InMemoryBasketStore::new()))
}

/// Parses and runs one input line.
///
/// Returns `None` for blank lines and `#` comments. Parse and service
/// failures are logged and rendered as `{"error": message}`.
pub async fn run_line<R: BasketRepository>(
    service: &BasketService<R>,
    line: &str,
) -> Option<Value> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let command: Command = match line.parse() {
        Ok(command) => command,
        Err(err) => {
            tracing::warn!(error = %err, line, "rejected command");
            return Some(json!({ "error": err.to_string() }));
        }
    };

    match command.execute(service).await {
        Ok(output) => Some(output),
        Err(err) => {
            tracing::error!(error = %err, line, "command failed");
            Some(json!({ "error": err.to_string() }))
        }
    }
}
