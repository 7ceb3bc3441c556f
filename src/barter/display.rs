//! Floating display item above a shop showing what it trades.

use log::debug;

use crate::barter::entities::{EntityStore, FloatingItem};
use crate::barter::shop::ShopState;
use crate::barter::types::{BlockPos, EntityId};
use crate::config::DisplayConfig;

/// Item a shop should advertise: first configured listing, then listing 0, then
/// whatever sits in the chest's first slot.
pub fn display_item(shop: &ShopState) -> Option<String> {
    if let Some(id) = shop
        .listings()
        .iter()
        .find(|l| l.is_configured())
        .and_then(|l| l.item_id.clone())
    {
        return Some(id);
    }
    if let Some(listing) = shop.primary_listing().filter(|l| l.has_item()) {
        return listing.item_id.clone();
    }
    shop.item_at_slot(0).map(|s| s.item_id.clone())
}

/// Replace the shop's display entity with a fresh one for its current item.
pub fn create_or_update_display(
    shop: &mut ShopState,
    pos: BlockPos,
    entities: &mut dyn EntityStore,
    config: &DisplayConfig,
) -> Option<EntityId> {
    remove_display(shop, entities);
    let Some(item_id) = display_item(shop) else {
        debug!("No item to display for shop at {}", pos);
        return None;
    };
    let id = entities.spawn(FloatingItem {
        item_id: item_id.clone(),
        position: pos.above_center(config.height_offset),
        intangible: true,
        pickup_allowed: false,
        lifetime_secs: config.lifetime_secs,
    });
    shop.set_display_entity(Some(id));
    debug!("Created display {} for shop at {} with item {}", id, pos, item_id);
    Some(id)
}

/// Despawn the shop's display entity. The reference is cleared even when the
/// entity no longer exists.
pub fn remove_display(shop: &mut ShopState, entities: &mut dyn EntityStore) {
    let Some(id) = shop.display_entity() else {
        return;
    };
    if entities.despawn(id) {
        debug!("Removed display entity {}", id);
    } else {
        debug!("Display entity {} was already gone", id);
    }
    shop.set_display_entity(None);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barter::container::ItemContainer;
    use crate::barter::entities::MemoryEntities;
    use crate::barter::types::{ItemStack, Vec3};
    use uuid::Uuid;

    fn stocked_shop() -> ShopState {
        let mut container = ItemContainer::new(2);
        container.set(0, Some(ItemStack::new("Oak_Log", 5)));
        ShopState::new(Uuid::new_v4(), "Bo", container)
    }

    #[test]
    fn falls_back_to_first_chest_item() {
        let shop = stocked_shop();
        assert_eq!(display_item(&shop).as_deref(), Some("Oak_Log"));
    }

    #[test]
    fn prefers_configured_listing() {
        let mut shop = stocked_shop();
        let listing = shop.get_or_create_listing(0);
        listing.item_id = Some("Iron_Bar".into());
        assert_eq!(display_item(&shop).as_deref(), Some("Iron_Bar"));
    }

    #[test]
    fn update_replaces_previous_entity() {
        let mut shop = stocked_shop();
        let mut entities = MemoryEntities::new();
        let cfg = DisplayConfig::default();
        let pos = BlockPos::new(1, 10, 1);

        let first = create_or_update_display(&mut shop, pos, &mut entities, &cfg);
        let second = create_or_update_display(&mut shop, pos, &mut entities, &cfg);
        assert_ne!(first, second);
        assert_eq!(entities.len(), 1);
        let spawned = second.and_then(|id| entities.get(id)).cloned();
        let spawned = spawned.expect("display entity");
        assert_eq!(spawned.position, Vec3::new(1.5, 11.5, 1.5));
        assert!(!spawned.pickup_allowed);
        assert_eq!(spawned.lifetime_secs, 86_400);
    }

    #[test]
    fn remove_clears_dangling_reference() {
        let mut shop = stocked_shop();
        let mut entities = MemoryEntities::new();
        shop.set_display_entity(Some(Uuid::new_v4()));
        remove_display(&mut shop, &mut entities);
        assert!(shop.display_entity().is_none());
    }

    #[test]
    fn empty_shop_shows_nothing() {
        let mut shop = ShopState::new(Uuid::new_v4(), "Bo", ItemContainer::new(1));
        let mut entities = MemoryEntities::new();
        let shown = create_or_update_display(&mut shop, BlockPos::new(0, 0, 0), &mut entities, &DisplayConfig::default());
        assert!(shown.is_none());
        assert!(entities.is_empty());
    }
}
