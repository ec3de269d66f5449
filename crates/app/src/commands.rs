//! Line commands understood by the `basket` driver.

use std::collections::HashMap;
use std::str::FromStr;

use common::BasketId;
use domain::{
    Basket, BasketRepository, BasketService, BuyerId, CatalogItemId, DomainError, Money,
    ServiceResult,
};
use serde_json::{Value, json};
use thiserror::Error;

/// Errors raised while parsing a command line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Usage: {0}")]
    Usage(&'static str),

    #[error("Invalid {what}: {value:?}")]
    InvalidArgument { what: &'static str, value: String },
}

const ADD_USAGE: &str = "add <buyer> <catalog-id> <price> [quantity]";
const SET_USAGE: &str = "set <basket-id> <item-id>=<quantity> ...";
const TRANSFER_USAGE: &str = "transfer <anonymous-id> <buyer>";
const DELETE_USAGE: &str = "delete <basket-id>";
const SHOW_USAGE: &str = "show <buyer>";
const ANON_USAGE: &str = "anon";

/// A parsed driver command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add {
        buyer_id: BuyerId,
        catalog_item_id: CatalogItemId,
        price: Money,
        quantity: u32,
    },
    Set {
        basket_id: BasketId,
        quantities: HashMap<String, u32>,
    },
    Transfer {
        anonymous_id: BuyerId,
        buyer_id: BuyerId,
    },
    Delete {
        basket_id: BasketId,
    },
    Show {
        buyer_id: BuyerId,
    },
    /// Mints a fresh anonymous buyer ID.
    Anon,
}

/// Renders a basket together with its store identity.
fn render_basket(basket: &Basket) -> Value {
    json!({
        "id": basket.id(),
        "version": basket.version(),
        "buyer_id": basket.buyer_id(),
        "items": basket.items(),
    })
}

fn invalid(what: &'static str, value: &str) -> CommandError {
    CommandError::InvalidArgument {
        what,
        value: value.to_string(),
    }
}

fn parse_basket_id(value: &str) -> Result<BasketId, CommandError> {
    value.parse().map_err(|_| invalid("basket id", value))
}

fn parse_quantity(value: &str) -> Result<u32, CommandError> {
    value.parse().map_err(|_| invalid("quantity", value))
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let args: Vec<&str> = words.collect();

        match name {
            "add" => {
                let [buyer, catalog, price, rest @ ..] = args.as_slice() else {
                    return Err(CommandError::Usage(ADD_USAGE));
                };
                let quantity = match rest {
                    [] => 1,
                    [quantity] => parse_quantity(quantity)?,
                    _ => return Err(CommandError::Usage(ADD_USAGE)),
                };
                let catalog_item_id = catalog
                    .parse::<i64>()
                    .map_err(|_| invalid("catalog id", catalog))?;
                let price = price.parse::<Money>().map_err(|_| invalid("price", price))?;

                Ok(Command::Add {
                    buyer_id: BuyerId::new(*buyer),
                    catalog_item_id: CatalogItemId::new(catalog_item_id),
                    price,
                    quantity,
                })
            }
            "set" => {
                let [basket_id, pairs @ ..] = args.as_slice() else {
                    return Err(CommandError::Usage(SET_USAGE));
                };
                let basket_id = parse_basket_id(basket_id)?;
                let quantities = pairs
                    .iter()
                    .map(|pair| {
                        let (key, quantity) =
                            pair.split_once('=').ok_or_else(|| invalid("pair", pair))?;
                        Ok((key.to_string(), parse_quantity(quantity)?))
                    })
                    .collect::<Result<HashMap<_, _>, CommandError>>()?;

                Ok(Command::Set {
                    basket_id,
                    quantities,
                })
            }
            "transfer" => match args.as_slice() {
                [anonymous, buyer] => Ok(Command::Transfer {
                    anonymous_id: BuyerId::new(*anonymous),
                    buyer_id: BuyerId::new(*buyer),
                }),
                _ => Err(CommandError::Usage(TRANSFER_USAGE)),
            },
            "delete" => match args.as_slice() {
                [basket_id] => Ok(Command::Delete {
                    basket_id: parse_basket_id(basket_id)?,
                }),
                _ => Err(CommandError::Usage(DELETE_USAGE)),
            },
            "show" => match args.as_slice() {
                [buyer] => Ok(Command::Show {
                    buyer_id: BuyerId::new(*buyer),
                }),
                _ => Err(CommandError::Usage(SHOW_USAGE)),
            },
            "anon" => match args.as_slice() {
                [] => Ok(Command::Anon),
                _ => Err(CommandError::Usage(ANON_USAGE)),
            },
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

impl Command {
    /// Runs the command against the service and renders the outcome as JSON.
    ///
    /// Missing baskets are reported as `{"not_found": id}` rather than as
    /// errors.
    pub async fn execute<R: BasketRepository>(
        self,
        service: &BasketService<R>,
    ) -> Result<Value, DomainError> {
        match self {
            Command::Add {
                buyer_id,
                catalog_item_id,
                price,
                quantity,
            } => {
                let basket = service
                    .add_item_to_basket(&buyer_id, catalog_item_id, price, quantity)
                    .await?;
                Ok(json!({ "basket": render_basket(&basket) }))
            }
            Command::Set {
                basket_id,
                quantities,
            } => match service.set_quantities(basket_id, &quantities).await? {
                ServiceResult::Success(basket) => {
                    Ok(json!({ "basket": render_basket(&basket) }))
                }
                ServiceResult::NotFound => Ok(json!({ "not_found": basket_id })),
            },
            Command::Transfer {
                anonymous_id,
                buyer_id,
            } => {
                service.transfer_basket(&anonymous_id, &buyer_id).await?;
                Ok(json!({ "transferred": { "from": anonymous_id, "to": buyer_id } }))
            }
            Command::Delete { basket_id } => match service.delete_basket(basket_id).await {
                Ok(()) => Ok(json!({ "deleted": basket_id })),
                Err(DomainError::BasketNotFound(id)) => Ok(json!({ "not_found": id })),
                Err(err) => Err(err),
            },
            Command::Show { buyer_id } => {
                let basket = service.basket_for_buyer(&buyer_id).await?;
                Ok(json!({ "basket": basket.as_ref().map(render_basket) }))
            }
            Command::Anon => Ok(json!({ "buyer_id": BuyerId::anonymous() })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_add_defaults_quantity() {
        let command: Command = "add alice 7 12.50".parse().unwrap();
        assert_eq!(
            command,
            Command::Add {
                buyer_id: BuyerId::new("alice"),
                catalog_item_id: CatalogItemId::new(7),
                price: Money::from_cents(1250),
                quantity: 1,
            }
        );
    }

    #[test]
    fn test_parse_add_with_quantity() {
        let command: Command = "add alice 7 $3 4".parse().unwrap();
        assert!(matches!(command, Command::Add { quantity: 4, .. }));
    }

    #[test]
    fn test_parse_add_rejects_bad_price() {
        let err = "add alice 7 abc".parse::<Command>().unwrap_err();
        assert_eq!(err, invalid("price", "abc"));
    }

    #[test]
    fn test_parse_add_missing_arguments() {
        let err = "add alice".parse::<Command>().unwrap_err();
        assert_eq!(err, CommandError::Usage(ADD_USAGE));
    }

    #[test]
    fn test_parse_set_keeps_raw_keys() {
        let command: Command = "set 3 1=2 01=5".parse().unwrap();
        let Command::Set {
            basket_id,
            quantities,
        } = command
        else {
            panic!("expected set command");
        };

        assert_eq!(basket_id, BasketId::new(3));
        assert_eq!(quantities.get("1"), Some(&2));
        assert_eq!(quantities.get("01"), Some(&5));
    }

    #[test]
    fn test_parse_set_rejects_negative_quantity() {
        let err = "set 3 1=-2".parse::<Command>().unwrap_err();
        assert_eq!(err, invalid("quantity", "-2"));
    }

    #[test]
    fn test_parse_set_rejects_missing_separator() {
        let err = "set 3 12".parse::<Command>().unwrap_err();
        assert_eq!(err, invalid("pair", "12"));
    }

    #[test]
    fn test_parse_other_commands() {
        assert_eq!(
            "transfer anon-1 alice".parse::<Command>().unwrap(),
            Command::Transfer {
                anonymous_id: BuyerId::new("anon-1"),
                buyer_id: BuyerId::new("alice"),
            }
        );
        assert_eq!(
            "delete 9".parse::<Command>().unwrap(),
            Command::Delete {
                basket_id: BasketId::new(9)
            }
        );
        assert_eq!(
            "show bob".parse::<Command>().unwrap(),
            Command::Show {
                buyer_id: BuyerId::new("bob")
            }
        );
        assert_eq!("anon".parse::<Command>().unwrap(), Command::Anon);
    }

    #[test]
    fn test_parse_unknown_and_empty() {
        assert_eq!(
            "checkout 1".parse::<Command>().unwrap_err(),
            CommandError::Unknown("checkout".to_string())
        );
        assert_eq!("   ".parse::<Command>().unwrap_err(), CommandError::Empty);
    }
}
