//! Shop block state: the owner, listings, earnings ledger and the chest's own container.
//!
//! A shop is always built whole around an existing container (see [`ShopState::new`])
//! and only ever handed back as a plain container through [`ShopState::into_container`].

use chrono::Utc;
use serde::{Deserialize, Serialize, Serializer};

use crate::barter::container::ItemContainer;
use crate::barter::item::ItemCatalog;
use crate::barter::listing::Listing;
use crate::barter::types::{EntityId, ItemStack, PlayerId};

fn always_true() -> bool {
    true
}

fn write_true<S: Serializer>(_: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_bool(true)
}

/// Persisted state of a shop block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopState {
    #[serde(rename = "Custom", default = "always_true", serialize_with = "write_true")]
    custom: bool,
    #[serde(rename = "ItemContainer")]
    container: ItemContainer,
    #[serde(rename = "OwnerUUID")]
    owner_id: PlayerId,
    #[serde(rename = "OwnerName", default)]
    owner_name: Option<String>,
    #[serde(rename = "ShopName", default, skip_serializing_if = "Option::is_none")]
    shop_name: Option<String>,
    #[serde(rename = "Listings", default)]
    listings: Vec<Listing>,
    #[serde(
        rename = "DisplayEntityUUID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    display_entity: Option<EntityId>,
    #[serde(rename = "CreatedAt", default)]
    created_at: i64,
    #[serde(rename = "TotalEarnings", default)]
    total_earnings: i64,
    #[serde(skip)]
    dirty: bool,
}

impl ShopState {
    /// Build a fully configured shop around `container`. Nothing is initialised later,
    /// so the transplanted contents cannot be overwritten by a default step.
    pub fn new(owner_id: PlayerId, owner_name: impl Into<String>, container: ItemContainer) -> Self {
        Self {
            custom: true,
            container,
            owner_id,
            owner_name: Some(owner_name.into()),
            shop_name: None,
            listings: Vec::new(),
            display_entity: None,
            created_at: Utc::now().timestamp_millis(),
            total_earnings: 0,
            dirty: true,
        }
    }

    /// Tear the shop down to its container. The caller decides where the items go.
    pub fn into_container(self) -> ItemContainer {
        self.container
    }

    pub fn owner_id(&self) -> PlayerId {
        self.owner_id
    }

    pub fn owner_name(&self) -> &str {
        self.owner_name.as_deref().unwrap_or("Unknown")
    }

    pub fn shop_name(&self) -> Option<&str> {
        self.shop_name.as_deref()
    }

    pub fn set_shop_name(&mut self, name: Option<String>) {
        self.shop_name = name.filter(|n| !n.trim().is_empty());
        self.mark_dirty();
    }

    /// The shop's own name, or `"<owner>'s Shop"`.
    pub fn display_name(&self) -> String {
        match self.shop_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}'s Shop", self.owner_name()),
        }
    }

    pub fn created_at(&self) -> i64 {
        self.created_at
    }

    pub fn total_earnings(&self) -> i64 {
        self.total_earnings
    }

    pub fn add_earnings(&mut self, amount: u64) {
        let amount = i64::try_from(amount).unwrap_or(i64::MAX);
        self.total_earnings = self.total_earnings.saturating_add(amount);
        self.mark_dirty();
    }

    pub fn display_entity(&self) -> Option<EntityId> {
        self.display_entity
    }

    pub fn set_display_entity(&mut self, entity: Option<EntityId>) {
        self.display_entity = entity;
        self.mark_dirty();
    }

    pub fn is_owner(&self, player: PlayerId) -> bool {
        self.owner_id == player
    }

    pub fn can_modify(&self, player: PlayerId, is_admin: bool) -> bool {
        self.is_owner(player) || is_admin
    }

    /// Shops are never destroyed by breaking; removal goes through the config surface.
    pub fn can_destroy(&self) -> bool {
        false
    }

    pub fn container(&self) -> &ItemContainer {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut ItemContainer {
        &mut self.container
    }

    pub fn item_at_slot(&self, slot: usize) -> Option<&ItemStack> {
        self.container.get(slot)
    }

    pub fn listings(&self) -> &[Listing] {
        &self.listings
    }

    /// The product listing. Only slot 0 is used today.
    pub fn primary_listing(&self) -> Option<&Listing> {
        self.listing(0)
    }

    pub fn listing(&self, slot: u32) -> Option<&Listing> {
        self.listings.iter().find(|l| l.slot() == slot)
    }

    pub fn get_or_create_listing(&mut self, slot: u32) -> &mut Listing {
        match self.listings.iter().position(|l| l.slot() == slot) {
            Some(idx) => &mut self.listings[idx],
            None => {
                self.listings.push(Listing::new(slot));
                self.dirty = true;
                let last = self.listings.len() - 1;
                &mut self.listings[last]
            }
        }
    }

    pub fn remove_listing(&mut self, slot: u32) -> Option<Listing> {
        let idx = self.listings.iter().position(|l| l.slot() == slot)?;
        self.mark_dirty();
        Some(self.listings.remove(idx))
    }

    /// At least one listing is ready to trade.
    pub fn is_ready(&self) -> bool {
        self.listings.iter().any(Listing::is_configured)
    }

    /// Units of the listing's item currently in the chest.
    pub fn stock(&self, listing: &Listing) -> u64 {
        listing
            .item_id
            .as_deref()
            .map_or(0, |id| self.container.count(id))
    }

    /// Units of the listing's item the chest could still take.
    pub fn space_for(&self, listing: &Listing, catalog: &dyn ItemCatalog) -> u64 {
        listing
            .item_id
            .as_deref()
            .map_or(0, |id| self.container.available_space(id, catalog))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}
