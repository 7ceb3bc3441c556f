//! Owner/admin configuration surface for a shop.
//!
//! The session keeps the edited currency and prices locally; nothing reaches the shop
//! until `save`. Removal takes two consecutive `remove` clicks.

use log::{info, warn};

use crate::barter::display::create_or_update_display;
use crate::barter::entities::EntityStore;
use crate::barter::interaction::Actor;
use crate::barter::lifecycle::{remove_shop, MSG_SHOP_REMOVED};
use crate::barter::types::BlockPos;
use crate::barter::world::BlockWorld;
use crate::config::Config;
use crate::logutil::escape_log;

/// Number of currency buttons on the surface.
pub const CURRENCY_BUTTONS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigAction {
    SelectCurrency(usize),
    CurrencyFromHand,
    BuyPlus,
    BuyMinus,
    SellPlus,
    SellMinus,
    Save,
    Remove,
    Close,
}

impl ConfigAction {
    /// Parse a client action token. Unknown or malformed tokens yield `None`.
    pub fn parse(token: &str) -> Option<Self> {
        if let Some(index) = token.strip_prefix("currency:") {
            return index.trim().parse().ok().map(ConfigAction::SelectCurrency);
        }
        Some(match token {
            "currencyFromHand" => ConfigAction::CurrencyFromHand,
            "buyPlus" => ConfigAction::BuyPlus,
            "buyMinus" => ConfigAction::BuyMinus,
            "sellPlus" => ConfigAction::SellPlus,
            "sellMinus" => ConfigAction::SellMinus,
            "save" => ConfigAction::Save,
            "remove" => ConfigAction::Remove,
            "close" => ConfigAction::Close,
            _ => return None,
        })
    }
}

/// What the caller should do after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOutcome {
    /// Re-render the surface.
    Updated,
    /// Close the surface and send these chat lines to the player.
    Closed { messages: Vec<String> },
    Ignored,
}

/// Everything the config surface shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigView {
    pub title: String,
    pub item_label: String,
    pub currency_buttons: Vec<String>,
    pub hand_label: String,
    pub buy_price: u32,
    pub sell_price: u32,
    pub message: String,
    pub remove_label: String,
}

/// World access needed while a config session handles an action.
pub struct ConfigEnv<'a> {
    pub world: &'a mut dyn BlockWorld,
    pub entities: &'a mut dyn EntityStore,
    pub config: &'a Config,
}

#[derive(Debug, Clone)]
pub struct ConfigSession {
    pos: BlockPos,
    selected_currency: String,
    buy_price: u32,
    sell_price: u32,
    last_message: String,
    confirm_remove: bool,
}

impl ConfigSession {
    /// Open a session, seeded from the shop's product listing.
    pub fn open(world: &dyn BlockWorld, pos: BlockPos, config: &Config) -> Self {
        let listing = world.shop(pos).and_then(|s| s.primary_listing());
        let selected_currency = listing
            .and_then(|l| l.currency_item_id.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| config.shop.default_currency.clone());
        Self {
            pos,
            selected_currency,
            buy_price: listing.map_or(0, |l| l.buy_price),
            sell_price: listing.map_or(0, |l| l.sell_price),
            last_message: String::new(),
            confirm_remove: false,
        }
    }

    pub fn pos(&self) -> BlockPos {
        self.pos
    }

    pub fn selected_currency(&self) -> &str {
        &self.selected_currency
    }

    pub fn prices(&self) -> (u32, u32) {
        (self.buy_price, self.sell_price)
    }

    pub fn message(&self) -> &str {
        &self.last_message
    }

    pub fn is_confirming_remove(&self) -> bool {
        self.confirm_remove
    }

    /// Handle a raw action token from the client.
    pub fn handle(&mut self, env: ConfigEnv<'_>, actor: &Actor, token: &str) -> ConfigOutcome {
        match ConfigAction::parse(token) {
            Some(action) => self.apply(env, actor, action),
            None => {
                self.confirm_remove = false;
                ConfigOutcome::Ignored
            }
        }
    }

    pub fn apply(&mut self, env: ConfigEnv<'_>, actor: &Actor, action: ConfigAction) -> ConfigOutcome {
        let config: &Config = env.config;
        let shop_cfg = &config.shop;
        let step = shop_cfg.price_step();
        if action != ConfigAction::Remove {
            self.confirm_remove = false;
        }
        match action {
            ConfigAction::SelectCurrency(index) => {
                if let Some(option) = shop_cfg.currency_options().get(index) {
                    self.selected_currency = option.item_id.clone();
                    self.last_message = format!("Currency: {}", option.display_name);
                }
                ConfigOutcome::Updated
            }
            ConfigAction::CurrencyFromHand => {
                match actor.held_item() {
                    Some(held) => {
                        self.selected_currency = held.item_id.clone();
                        self.last_message = format!(
                            "Currency: {}",
                            shop_cfg.currency_display_name(&self.selected_currency)
                        );
                    }
                    None => self.last_message = "Hold an item to use as currency!".to_string(),
                }
                ConfigOutcome::Updated
            }
            ConfigAction::BuyPlus => {
                self.buy_price = self.buy_price.saturating_add(step);
                ConfigOutcome::Updated
            }
            ConfigAction::BuyMinus => {
                self.buy_price = self.buy_price.saturating_sub(step);
                ConfigOutcome::Updated
            }
            ConfigAction::SellPlus => {
                self.sell_price = self.sell_price.saturating_add(step);
                ConfigOutcome::Updated
            }
            ConfigAction::SellMinus => {
                self.sell_price = self.sell_price.saturating_sub(step);
                ConfigOutcome::Updated
            }
            ConfigAction::Save => self.save(env, actor),
            ConfigAction::Remove => self.remove(env, actor),
            ConfigAction::Close => ConfigOutcome::Closed {
                messages: Vec::new(),
            },
        }
    }

    fn save(&mut self, env: ConfigEnv<'_>, actor: &Actor) -> ConfigOutcome {
        let ConfigEnv {
            world,
            entities,
            config,
        } = env;
        let Some(shop) = world.shop_mut(self.pos) else {
            self.last_message = "Shop no longer exists!".to_string();
            return ConfigOutcome::Updated;
        };
        let detected = shop.container().first_item_id().map(str::to_string);
        let listing = shop.get_or_create_listing(0);
        let item_id = match listing.item_id.clone().filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => match detected {
                Some(id) => {
                    listing.item_id = Some(id.clone());
                    id
                }
                None => {
                    self.last_message = "Add items to chest first!".to_string();
                    return ConfigOutcome::Updated;
                }
            },
        };
        if self.buy_price == 0 && self.sell_price == 0 {
            self.last_message = "Set at least one price!".to_string();
            return ConfigOutcome::Updated;
        }
        listing.currency_item_id = Some(self.selected_currency.clone());
        listing.buy_price = self.buy_price;
        listing.sell_price = self.sell_price;
        shop.mark_dirty();
        create_or_update_display(shop, self.pos, entities, &config.display);

        info!(
            "{} configured shop at {}: {} for {} (buy {}, sell {})",
            escape_log(&actor.name),
            self.pos,
            item_id,
            self.selected_currency,
            self.buy_price,
            self.sell_price
        );
        let item_name = config.shop.currency_display_name(&item_id);
        let currency_name = config.shop.currency_display_name(&self.selected_currency);
        let mut messages = vec![
            "Shop is now open for business!".to_string(),
            format!("Selling: {}", item_name),
        ];
        if self.buy_price > 0 {
            messages.push(format!("Buy price: {} {}", self.buy_price, currency_name));
        }
        if self.sell_price > 0 {
            messages.push(format!("Sell price: {} {}", self.sell_price, currency_name));
        }
        ConfigOutcome::Closed { messages }
    }

    fn remove(&mut self, env: ConfigEnv<'_>, actor: &Actor) -> ConfigOutcome {
        if !self.confirm_remove {
            self.confirm_remove = true;
            self.last_message = "Click again to confirm!".to_string();
            return ConfigOutcome::Updated;
        }
        self.confirm_remove = false;
        match remove_shop(env.world, env.entities, self.pos) {
            Ok(()) => {
                info!("{} removed shop at {}", escape_log(&actor.name), self.pos);
                ConfigOutcome::Closed {
                    messages: vec![MSG_SHOP_REMOVED.to_string()],
                }
            }
            Err(e) => {
                warn!("Shop removal at {} failed: {}", self.pos, e);
                ConfigOutcome::Closed {
                    messages: Vec::new(),
                }
            }
        }
    }

    pub fn render(&self, world: &dyn BlockWorld, actor: &Actor, config: &Config) -> ConfigView {
        let shop_cfg = &config.shop;
        let Some(shop) = world.shop(self.pos) else {
            return ConfigView {
                title: "Shop Not Found".to_string(),
                item_label: "Error: Shop no longer exists".to_string(),
                currency_buttons: Vec::new(),
                hand_label: String::new(),
                buy_price: self.buy_price,
                sell_price: self.sell_price,
                message: self.last_message.clone(),
                remove_label: String::new(),
            };
        };
        let item_label = match shop.primary_listing().and_then(|l| l.item_id.as_deref()) {
            Some(id) if !id.is_empty() => format!("Selling: {}", shop_cfg.currency_display_name(id)),
            _ => "Item: Not configured (add items to chest)".to_string(),
        };
        let currency_buttons = shop_cfg
            .currency_options()
            .into_iter()
            .take(CURRENCY_BUTTONS)
            .map(|c| {
                if c.item_id == self.selected_currency {
                    format!("> {} <", c.display_name)
                } else {
                    c.display_name
                }
            })
            .collect();
        let hand_label = match actor.held_item() {
            Some(held) => {
                let name = shop_cfg.currency_display_name(&held.item_id);
                if held.item_id == self.selected_currency {
                    format!("> {} <", name)
                } else {
                    format!("Use: {}", name)
                }
            }
            None => "Hold item to use as currency".to_string(),
        };
        ConfigView {
            title: "Configure Your Shop".to_string(),
            item_label,
            currency_buttons,
            hand_label,
            buy_price: self.buy_price,
            sell_price: self.sell_price,
            message: self.last_message.clone(),
            remove_label: if self.confirm_remove {
                "CONFIRM DELETE".to_string()
            } else {
                "Remove Shop".to_string()
            },
        }
    }
}
