//! Customer-facing trade surface.

use log::info;

use crate::barter::interaction::Actor;
use crate::barter::item::{display_name, ItemCatalog};
use crate::barter::transaction::{self, TransactionResult};
use crate::barter::types::BlockPos;
use crate::barter::world::BlockWorld;
use crate::logutil::escape_log;

/// Quantity multiplier while shift is held.
pub const SHIFT_MULTIPLIER: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeAction {
    Buy(i64),
    Sell(i64),
}

impl TradeAction {
    /// Parse `buy:<qty>` / `sell:<qty>`. A missing or unreadable quantity means 1.
    pub fn parse(token: &str, shift_held: bool) -> Option<Self> {
        let (name, quantity) = match token.find(':') {
            Some(idx) if idx > 0 => (
                &token[..idx],
                token[idx + 1..].trim().parse::<i64>().unwrap_or(1),
            ),
            _ => (token, 1),
        };
        let quantity = if shift_held {
            quantity.saturating_mul(SHIFT_MULTIPLIER)
        } else {
            quantity
        };
        match name {
            "buy" => Some(TradeAction::Buy(quantity)),
            "sell" => Some(TradeAction::Sell(quantity)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeView {
    pub title: String,
    pub item_name: String,
    pub stock_label: String,
    pub buy_label: String,
    pub sell_label: String,
    pub message: String,
    /// Whether the buy button sends an action.
    pub buy_enabled: bool,
    pub sell_enabled: bool,
}

#[derive(Debug, Clone)]
pub struct TradeSession {
    pos: BlockPos,
    last_message: String,
}

impl TradeSession {
    pub fn open(pos: BlockPos) -> Self {
        Self {
            pos,
            last_message: String::new(),
        }
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    pub fn message(&self) -> &str {
        &self.last_message
    }

    /// Run one trade action. Returns the trade result when a trade was attempted.
    pub fn handle(
        &mut self,
        world: &mut dyn BlockWorld,
        catalog: &dyn ItemCatalog,
        actor: &mut Actor,
        token: &str,
        shift_held: bool,
    ) -> Option<TransactionResult> {
        let action = TradeAction::parse(token, shift_held)?;
        let Some(shop) = world.shop_mut(self.pos) else {
            self.last_message = "Shop no longer exists!".to_string();
            return None;
        };
        let Some(listing) = shop.primary_listing().cloned() else {
            self.last_message = "Shop not configured!".to_string();
            return None;
        };
        let result = match action {
            TradeAction::Buy(qty) => transaction::buy(shop, &listing, &mut actor.inventory, qty, catalog),
            TradeAction::Sell(qty) => transaction::sell(shop, &listing, &mut actor.inventory, qty, catalog),
        };
        if result.is_success() {
            info!(
                "{} at shop {}: {}",
                escape_log(&actor.name),
                self.pos,
                result.message()
            );
        }
        self.last_message = result.message().to_string();
        Some(result)
    }

    pub fn render(&self, world: &dyn BlockWorld) -> TradeView {
        let Some(shop) = world.shop(self.pos) else {
            return TradeView {
                title: "Shop Not Found".to_string(),
                item_name: String::new(),
                stock_label: String::new(),
                buy_label: String::new(),
                sell_label: String::new(),
                message: self.last_message.clone(),
                buy_enabled: false,
                sell_enabled: false,
            };
        };
        let title = format!("{}'s Shop", shop.owner_name());
        let listing = match shop.primary_listing() {
            Some(l) if l.has_item() && (l.buy_price > 0 || l.sell_price > 0) => l,
            _ => {
                return TradeView {
                    title,
                    item_name: "Not Configured".to_string(),
                    stock_label: "This shop has not been set up yet.".to_string(),
                    buy_label: "Not for sale".to_string(),
                    sell_label: "Not buying".to_string(),
                    message: self.last_message.clone(),
                    buy_enabled: false,
                    sell_enabled: false,
                }
            }
        };
        let item_id = listing.item_id.as_deref().unwrap_or_default();
        let item_name = display_name(item_id);
        let currency_name = listing
            .currency_item_id
            .as_deref()
            .map_or_else(|| "None".to_string(), display_name);
        let stock = shop.stock(listing);
        TradeView {
            title,
            stock_label: format!("Item: {} | Stock: {}", item_name, stock),
            item_name,
            buy_label: if listing.buy_price > 0 {
                format!("{} {}", listing.buy_price, currency_name)
            } else {
                "Not for sale".to_string()
            },
            sell_label: if listing.sell_price > 0 {
                format!("{} {}", listing.sell_price, currency_name)
            } else {
                "Not buying".to_string()
            },
            message: self.last_message.clone(),
            buy_enabled: listing.buy_price > 0,
            sell_enabled: listing.can_sell_to(),
        }
    }
}
