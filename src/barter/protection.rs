//! Seals a shop's footprint: no breaking the shop itself, no breaking or placing
//! any block in the 3x3x3 cube around it.

use log::debug;

use crate::barter::types::BlockPos;
use crate::barter::world::BlockWorld;

pub const MSG_SHOP_UNBREAKABLE: &str = "Shop chests cannot be broken! Use the shop menu to remove.";
pub const MSG_BREAK_NEAR_SHOP: &str = "Cannot break blocks near a shop chest!";
pub const MSG_PLACE_NEAR_SHOP: &str = "Cannot place blocks near a shop chest!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionVerdict {
    Allowed,
    Denied { message: &'static str },
}

impl ProtectionVerdict {
    pub fn is_denied(&self) -> bool {
        matches!(self, ProtectionVerdict::Denied { .. })
    }
}

/// A pending block break or placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockChangeEvent {
    pub pos: BlockPos,
    cancelled: bool,
}

impl BlockChangeEvent {
    pub fn new(pos: BlockPos) -> Self {
        Self {
            pos,
            cancelled: false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

pub fn is_near_shop(world: &dyn BlockWorld, pos: BlockPos) -> bool {
    pos.neighbors().any(|n| world.is_shop(n))
}

pub fn check_break(world: &dyn BlockWorld, pos: BlockPos) -> ProtectionVerdict {
    if world.is_shop(pos) {
        return ProtectionVerdict::Denied {
            message: MSG_SHOP_UNBREAKABLE,
        };
    }
    if is_near_shop(world, pos) {
        return ProtectionVerdict::Denied {
            message: MSG_BREAK_NEAR_SHOP,
        };
    }
    ProtectionVerdict::Allowed
}

/// Placing onto the shop's own cell would replace it, so that counts as "near" too.
pub fn check_place(world: &dyn BlockWorld, pos: BlockPos) -> ProtectionVerdict {
    if world.is_shop(pos) || is_near_shop(world, pos) {
        return ProtectionVerdict::Denied {
            message: MSG_PLACE_NEAR_SHOP,
        };
    }
    ProtectionVerdict::Allowed
}

fn apply(event: &mut BlockChangeEvent, verdict: ProtectionVerdict, what: &str) -> Option<&'static str> {
    match verdict {
        ProtectionVerdict::Allowed => None,
        ProtectionVerdict::Denied { message } => {
            debug!("Denied {} at {}: {}", what, event.pos, message);
            event.set_cancelled(true);
            Some(message)
        }
    }
}

/// Cancel a break event that would touch a shop. Already-cancelled events are left
/// alone. Returns the message to show the player.
pub fn guard_break(world: &dyn BlockWorld, event: &mut BlockChangeEvent) -> Option<&'static str> {
    if event.is_cancelled() {
        return None;
    }
    let verdict = check_break(world, event.pos);
    apply(event, verdict, "break")
}

/// Cancel a place event next to a shop. Already-cancelled events are left alone.
pub fn guard_place(world: &dyn BlockWorld, event: &mut BlockChangeEvent) -> Option<&'static str> {
    if event.is_cancelled() {
        return None;
    }
    let verdict = check_place(world, event.pos);
    apply(event, verdict, "place")
}
