//! Turning a chest into a shop with a license, and turning it back.
//!
//! In both directions the container moves as a value: the items the chest held are
//! the items the shop holds, and vice versa. Nothing goes through the block
//! destruction path, so nothing is dropped or duplicated.

use log::{info, warn};
use thiserror::Error;

use crate::barter::claims::ClaimChecker;
use crate::barter::display::remove_display;
use crate::barter::entities::EntityStore;
use crate::barter::errors::BarterError;
use crate::barter::interaction::Actor;
use crate::barter::item::ids_match;
use crate::barter::shop::ShopState;
use crate::barter::types::BlockPos;
use crate::barter::world::{BlockState, BlockWorld, ContainerState};
use crate::config::LicenseConfig;
use crate::logutil::{escape_log, player_tag};

pub const MSG_SHOP_CREATED: &str = "Barter shop created successfully! Right-click to manage.";
pub const MSG_SHOP_REMOVED: &str = "Shop removed! Items preserved in chest.";

/// Why a license use did not create a shop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LicenseRejection {
    #[error("You need to hold a {0} to create a shop!")]
    NotHoldingLicense(String),
    #[error("You must be looking at a chest!")]
    NoTarget,
    #[error("This is already a shop!")]
    AlreadyAShop,
    #[error("This block is not a container!")]
    NotAContainer,
    #[error("Cannot create a shop from a double chest! Use a single chest.")]
    DoubleChest,
    #[error("You cannot create a shop here - this land is claimed by another party!")]
    ClaimDenied { owner: Option<String> },
}

impl LicenseRejection {
    /// Lines to send to the player.
    pub fn messages(&self) -> Vec<String> {
        let mut lines = vec![self.to_string()];
        if let LicenseRejection::ClaimDenied { owner: Some(owner) } = self {
            lines.push(format!("This area is claimed by: {}", owner));
        }
        lines
    }
}

/// Two horizontally adjacent chests merge into a double chest.
fn is_double_chest(world: &dyn BlockWorld, pos: BlockPos) -> bool {
    pos.horizontal_neighbors().iter().any(|n| {
        world
            .block_id(*n)
            .is_some_and(|id| id.to_ascii_lowercase().contains("chest"))
    })
}

/// Use the held license on the block at `pos`.
pub fn create_shop(
    world: &mut dyn BlockWorld,
    claims: &dyn ClaimChecker,
    license: &LicenseConfig,
    actor: &mut Actor,
    pos: BlockPos,
) -> Result<(), LicenseRejection> {
    if !actor
        .held_item()
        .is_some_and(|held| ids_match(&held.item_id, &license.item_id))
    {
        return Err(LicenseRejection::NotHoldingLicense(license.display_name.clone()));
    }
    if world.block_id(pos).is_none() {
        return Err(LicenseRejection::NoTarget);
    }
    match world.state(pos) {
        Some(BlockState::Shop(_)) => return Err(LicenseRejection::AlreadyAShop),
        Some(BlockState::Container(_)) => {}
        None => return Err(LicenseRejection::NotAContainer),
    }
    if is_double_chest(world, pos) {
        return Err(LicenseRejection::DoubleChest);
    }
    let dimension = world.name().to_string();
    if !claims.can_create_shop(actor.id, &dimension, pos.x, pos.z) {
        return Err(LicenseRejection::ClaimDenied {
            owner: claims.claim_owner_name(&dimension, pos.x, pos.z),
        });
    }

    let container = match world.take_state(pos) {
        Some(BlockState::Container(state)) => state.container,
        Some(other) => {
            let _ = world.replace_state(pos, other);
            return Err(LicenseRejection::NotAContainer);
        }
        None => return Err(LicenseRejection::NotAContainer),
    };
    let shop = ShopState::new(actor.id, actor.name.clone(), container);
    if let Err(BlockState::Shop(shop)) = world.replace_state(pos, BlockState::Shop(Box::new(shop))) {
        warn!("Block at {} vanished while creating a shop", pos);
        let _ = world.replace_state(
            pos,
            BlockState::Container(ContainerState::new(shop.into_container())),
        );
        return Err(LicenseRejection::NoTarget);
    }

    consume_held(actor);
    info!(
        "Barter shop created at {} in {} by {}",
        pos,
        dimension,
        player_tag(&actor.name, actor.id)
    );
    Ok(())
}

fn consume_held(actor: &mut Actor) {
    let slot = actor.held_slot;
    let remaining = actor.held_item().map_or(0, |held| held.quantity.saturating_sub(1));
    let next = actor
        .held_item()
        .filter(|_| remaining > 0)
        .map(|held| held.with_quantity(remaining));
    actor.inventory.set(slot, next);
}

/// Decommission the shop at `pos`: despawn its display and put its container back
/// into a plain container block state at the same position.
pub fn remove_shop(
    world: &mut dyn BlockWorld,
    entities: &mut dyn EntityStore,
    pos: BlockPos,
) -> Result<(), BarterError> {
    let mut shop = match world.take_state(pos) {
        Some(BlockState::Shop(shop)) => shop,
        Some(other) => {
            let _ = world.replace_state(pos, other);
            return Err(BarterError::NotAShop {
                world: world.name().to_string(),
                pos,
            });
        }
        None => {
            return Err(BarterError::NotAShop {
                world: world.name().to_string(),
                pos,
            })
        }
    };
    remove_display(&mut shop, entities);
    let owner = shop.owner_name().to_string();
    let container = ShopState::into_container(*shop);
    let items = container.total_items();
    if world
        .replace_state(pos, BlockState::Container(ContainerState::new(container)))
        .is_err()
    {
        return Err(BarterError::NotFound(format!("block at {}", pos)));
    }
    info!(
        "Shop of {} at {} in {} removed; {} items kept in chest",
        escape_log(&owner),
        pos,
        world.name(),
        items
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::barter::claims::NoClaims;
    use crate::barter::container::ItemContainer;
    use crate::barter::types::ItemStack;
    use crate::barter::world::MemoryWorld;
    use uuid::Uuid;

    fn licensed_actor(licenses: u32) -> Actor {
        let mut inv = ItemContainer::new(3);
        inv.set(0, Some(ItemStack::new("Barter_License", licenses)));
        Actor::new(Uuid::new_v4(), "Kit", inv)
    }

    #[test]
    fn consumes_one_license() {
        let mut world = MemoryWorld::new("overworld");
        let pos = BlockPos::new(0, 64, 0);
        world.place_container(pos, "Furniture_Chest_Small", ItemContainer::new(4));
        let mut actor = licensed_actor(2);
        create_shop(&mut world, &NoClaims, &LicenseConfig::default(), &mut actor, pos).unwrap();
        assert_eq!(actor.held_item().map(|s| s.quantity), Some(1));
        assert!(world.is_shop(pos));
    }

    #[test]
    fn last_license_empties_the_hand() {
        let mut world = MemoryWorld::new("overworld");
        let pos = BlockPos::new(0, 64, 0);
        world.place_container(pos, "Furniture_Chest_Small", ItemContainer::new(4));
        let mut actor = licensed_actor(1);
        create_shop(&mut world, &NoClaims, &LicenseConfig::default(), &mut actor, pos).unwrap();
        assert!(actor.held_item().is_none());
    }

    #[test]
    fn requires_the_license_in_hand() {
        let mut world = MemoryWorld::new("overworld");
        let pos = BlockPos::new(0, 64, 0);
        world.place_container(pos, "Furniture_Chest_Small", ItemContainer::new(4));
        let mut actor = Actor::new(Uuid::new_v4(), "Kit", ItemContainer::new(1));
        let err = create_shop(&mut world, &NoClaims, &LicenseConfig::default(), &mut actor, pos);
        assert!(matches!(err, Err(LicenseRejection::NotHoldingLicense(_))));
        assert!(!world.is_shop(pos));
    }

    #[test]
    fn claim_denial_names_the_owner() {
        let rejection = LicenseRejection::ClaimDenied {
            owner: Some("Riverfolk".into()),
        };
        assert_eq!(
            rejection.messages(),
            vec![
                "You cannot create a shop here - this land is claimed by another party!".to_string(),
                "This area is claimed by: Riverfolk".to_string(),
            ]
        );
    }
}
