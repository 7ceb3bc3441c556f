//! One slot's trade configuration.

use serde::{Deserialize, Serialize};

/// What a shop trades at a given slot: one item against one currency item.
///
/// `buy_price` is what a customer pays per unit; `sell_price` is what the shop pays
/// per unit when a customer sells to it. A price of zero disables that direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Listing {
    slot: u32,
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub currency_item_id: Option<String>,
    #[serde(default)]
    pub buy_price: u32,
    #[serde(default)]
    pub sell_price: u32,
}

impl Listing {
    pub fn new(slot: u32) -> Self {
        Self {
            slot,
            item_id: None,
            currency_item_id: None,
            buy_price: 0,
            sell_price: 0,
        }
    }

    pub fn configured(
        slot: u32,
        item_id: impl Into<String>,
        currency_item_id: impl Into<String>,
        buy_price: u32,
        sell_price: u32,
    ) -> Self {
        Self {
            slot,
            item_id: Some(item_id.into()),
            currency_item_id: Some(currency_item_id.into()),
            buy_price,
            sell_price,
        }
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn has_item(&self) -> bool {
        self.item_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    pub fn has_currency(&self) -> bool {
        self.currency_item_id
            .as_deref()
            .is_some_and(|id| !id.is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.has_item() && self.has_currency() && (self.buy_price > 0 || self.sell_price > 0)
    }

    /// Customers may buy from the shop.
    pub fn can_buy_from(&self) -> bool {
        self.buy_price > 0 && self.has_currency()
    }

    /// Customers may sell to the shop.
    pub fn can_sell_to(&self) -> bool {
        self.sell_price > 0 && self.has_currency()
    }
}
