//! Buy/sell protocol between a shop and a customer's inventory.
//!
//! Every precondition is checked before anything moves. Once mutation starts, a failed
//! step restores both inventories from snapshots taken before the first move, except
//! for the final currency deposit on a buy which is pre-validated and only logged if it
//! ever fails.

use log::{debug, error, warn};
use std::fmt;
use thiserror::Error;

use crate::barter::container::{transfer, ItemContainer};
use crate::barter::item::{strip_namespace, ItemCatalog};
use crate::barter::listing::Listing;
use crate::barter::shop::ShopState;

/// Why a trade was refused or abandoned. All of these are shown to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum TransactionFailure {
    #[error("insufficient funds")]
    InsufficientFunds,
    #[error("insufficient stock")]
    InsufficientStock,
    #[error("insufficient space")]
    InsufficientSpace,
    #[error("inventory full")]
    InventoryFull,
    #[error("shop not configured")]
    ShopNotConfigured,
    #[error("shop doesn't buy")]
    ShopDoesntBuy,
    #[error("shop doesn't sell")]
    ShopDoesntSell,
    #[error("invalid quantity")]
    InvalidQuantity,
    #[error("transaction error")]
    TransactionError,
}

/// Outcome of one trade attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionResult {
    Success {
        quantity: u64,
        total_price: u64,
        message: String,
    },
    Failed {
        reason: TransactionFailure,
        message: String,
    },
}

impl TransactionResult {
    fn fail(reason: TransactionFailure, message: impl Into<String>) -> Self {
        Self::Failed {
            reason,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn reason(&self) -> Option<TransactionFailure> {
        match self {
            Self::Success { .. } => None,
            Self::Failed { reason, .. } => Some(*reason),
        }
    }

    pub fn quantity(&self) -> u64 {
        match self {
            Self::Success { quantity, .. } => *quantity,
            Self::Failed { .. } => 0,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failed { message, .. } => message,
        }
    }
}

impl fmt::Display for TransactionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success { message, .. } => write!(f, "success: {}", message),
            Self::Failed { reason, message } => write!(f, "{}: {}", reason, message),
        }
    }
}

/// Ids and amounts of a trade that passed the listing checks.
struct Terms<'a> {
    item_id: &'a str,
    currency_id: &'a str,
    quantity: u64,
    total: u64,
}

fn validate_terms(listing: &Listing, quantity: i64, unit_price: u32) -> Result<Terms<'_>, TransactionResult> {
    if quantity <= 0 {
        return Err(TransactionResult::fail(
            TransactionFailure::InvalidQuantity,
            "Invalid quantity.",
        ));
    }
    let item_id = match listing.item_id.as_deref() {
        Some(id) if !id.is_empty() => id,
        _ => {
            return Err(TransactionResult::fail(
                TransactionFailure::ShopNotConfigured,
                "This listing hasn't been configured with an item.",
            ))
        }
    };
    let currency_id = listing.currency_item_id.as_deref().unwrap_or_default();
    let quantity = quantity as u64;
    Ok(Terms {
        item_id,
        currency_id,
        quantity,
        total: u64::from(unit_price).saturating_mul(quantity),
    })
}

/// Customer buys `quantity` units of the listed item from the shop.
pub fn buy(
    shop: &mut ShopState,
    listing: &Listing,
    buyer: &mut ItemContainer,
    quantity: i64,
    catalog: &dyn ItemCatalog,
) -> TransactionResult {
    if !listing.can_buy_from() {
        return TransactionResult::fail(TransactionFailure::ShopDoesntSell, "This item is not for sale.");
    }
    let terms = match validate_terms(listing, quantity, listing.buy_price) {
        Ok(terms) => terms,
        Err(result) => return result,
    };
    let Terms {
        item_id,
        currency_id,
        quantity,
        total,
    } = terms;

    let stock = shop.container().count(item_id);
    if stock == 0 {
        return TransactionResult::fail(TransactionFailure::InsufficientStock, "This item is out of stock.");
    }
    if stock < quantity {
        return TransactionResult::fail(
            TransactionFailure::InsufficientStock,
            format!("Not enough stock. Available: {}", stock),
        );
    }
    let funds = buyer.count(currency_id);
    if funds < total {
        return TransactionResult::fail(
            TransactionFailure::InsufficientFunds,
            format!(
                "You need {} {} but only have {}.",
                total,
                strip_namespace(currency_id),
                funds
            ),
        );
    }
    let room = buyer.available_space(item_id, catalog);
    if room < quantity {
        return TransactionResult::fail(
            TransactionFailure::InventoryFull,
            format!("Not enough inventory space. You can only fit {} more.", room),
        );
    }
    if shop.container().available_space(currency_id, catalog) < total {
        return TransactionResult::fail(
            TransactionFailure::InsufficientSpace,
            "Shop doesn't have space for the payment.",
        );
    }

    let buyer_before = buyer.clone();
    if !buyer.remove_items(currency_id, total) {
        return TransactionResult::fail(TransactionFailure::TransactionError, "Failed to process payment.");
    }
    if !transfer(shop.container_mut(), buyer, item_id, quantity, catalog) {
        *buyer = buyer_before;
        warn!(
            "Buy of {}x {} from {} rolled back: items did not fit after payment",
            quantity,
            item_id,
            shop.display_name()
        );
        return TransactionResult::fail(
            TransactionFailure::TransactionError,
            "Failed to retrieve items from shop.",
        );
    }
    if !shop.container_mut().add_items(currency_id, total, catalog) {
        error!(
            "Shop {} could not store {}x {} after a completed sale; payment lost",
            shop.display_name(),
            total,
            currency_id
        );
    }
    shop.add_earnings(total);
    shop.mark_dirty();
    debug!("{} sold {}x {} for {}x {}", shop.display_name(), quantity, item_id, total, currency_id);
    TransactionResult::Success {
        quantity,
        total_price: total,
        message: format!(
            "Bought {}x {} for {}x {}",
            quantity,
            strip_namespace(item_id),
            total,
            strip_namespace(currency_id)
        ),
    }
}

/// Customer sells `quantity` units of the listed item to the shop.
pub fn sell(
    shop: &mut ShopState,
    listing: &Listing,
    seller: &mut ItemContainer,
    quantity: i64,
    catalog: &dyn ItemCatalog,
) -> TransactionResult {
    if !listing.can_sell_to() {
        return TransactionResult::fail(
            TransactionFailure::ShopDoesntBuy,
            "This shop doesn't buy this item.",
        );
    }
    let terms = match validate_terms(listing, quantity, listing.sell_price) {
        Ok(terms) => terms,
        Err(result) => return result,
    };
    let Terms {
        item_id,
        currency_id,
        quantity,
        total,
    } = terms;

    let held = seller.count(item_id);
    if held < quantity {
        return TransactionResult::fail(
            TransactionFailure::InsufficientStock,
            format!(
                "You don't have enough {}. You have {}.",
                strip_namespace(item_id),
                held
            ),
        );
    }
    if shop.container().count(currency_id) < total {
        return TransactionResult::fail(
            TransactionFailure::InsufficientFunds,
            format!("Shop doesn't have enough {} to pay you.", strip_namespace(currency_id)),
        );
    }
    if shop.container().available_space(item_id, catalog) < quantity {
        return TransactionResult::fail(
            TransactionFailure::InsufficientSpace,
            "Shop doesn't have space for more items.",
        );
    }
    if seller.available_space(currency_id, catalog) < total {
        return TransactionResult::fail(
            TransactionFailure::InventoryFull,
            "You don't have space for the payment.",
        );
    }

    let seller_before = seller.clone();
    let shop_before = shop.container().clone();
    if !transfer(seller, shop.container_mut(), item_id, quantity, catalog) {
        return TransactionResult::fail(TransactionFailure::TransactionError, "Failed to take your items.");
    }
    if !transfer(shop.container_mut(), seller, currency_id, total, catalog) {
        *seller = seller_before;
        *shop.container_mut() = shop_before;
        warn!(
            "Sell of {}x {} to {} rolled back: payment did not fit",
            quantity,
            item_id,
            shop.display_name()
        );
        return TransactionResult::fail(
            TransactionFailure::TransactionError,
            "Failed to get payment from shop.",
        );
    }
    shop.mark_dirty();
    debug!("{} bought {}x {} for {}x {}", shop.display_name(), quantity, item_id, total, currency_id);
    TransactionResult::Success {
        quantity,
        total_price: total,
        message: format!(
            "Sold {}x {} for {}x {}",
            quantity,
            strip_namespace(item_id),
            total,
            strip_namespace(currency_id)
        ),
    }
}
