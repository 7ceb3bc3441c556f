//! Block-use dispatch and the shop access state machine.
//!
//! When a player uses a shop block, the shop handler decides between three outcomes:
//! release the event so the native chest UI opens, open the config surface, or open
//! the trade surface. It runs before every other handler and also sees events that
//! were already cancelled, so a claims plugin cannot lock customers out of a shop.

use log::{debug, info};
use std::collections::BTreeSet;

use crate::barter::admin::AdminModeRegistry;
use crate::barter::container::ItemContainer;
use crate::barter::shop::ShopState;
use crate::barter::types::{BlockPos, ItemStack, PlayerId, Vec3};
use crate::barter::world::BlockWorld;
use crate::logutil::escape_log;

/// A connected player as seen by the shop logic.
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: PlayerId,
    pub name: String,
    pub permissions: BTreeSet<String>,
    pub crouching: bool,
    pub position: Vec3,
    pub inventory: ItemContainer,
    /// Inventory slot of the item in hand.
    pub held_slot: usize,
}

impl Actor {
    pub fn new(id: PlayerId, name: impl Into<String>, inventory: ItemContainer) -> Self {
        Self {
            id,
            name: name.into(),
            permissions: BTreeSet::new(),
            crouching: false,
            position: Vec3::default(),
            inventory,
            held_slot: 0,
        }
    }

    pub fn with_permission(mut self, permission: &str) -> Self {
        self.permissions.insert(permission.to_string());
        self
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    pub fn held_item(&self) -> Option<&ItemStack> {
        self.inventory.get(self.held_slot)
    }
}

/// A player using (right-clicking) a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UseBlockEvent {
    pub pos: BlockPos,
    cancelled: bool,
}

impl UseBlockEvent {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Config,
    Trade,
}

/// Request to open an interactive surface for the shop at `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceRequest {
    pub kind: SurfaceKind,
    pub pos: BlockPos,
}

/// Result of resolving a shop interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Leave the event alone; the native chest inventory opens.
    Release,
    Open(SurfaceKind),
}

/// Whether `actor` may manage `shop`: the owner, or an admin with admin mode on.
pub fn can_manage(
    shop: &ShopState,
    actor: &Actor,
    admin: &AdminModeRegistry,
    admin_permission: &str,
) -> bool {
    shop.is_owner(actor.id) || (actor.has_permission(admin_permission) && admin.is_enabled(actor.id))
}

pub fn resolve(
    shop: &ShopState,
    actor: &Actor,
    admin: &AdminModeRegistry,
    admin_permission: &str,
) -> Resolution {
    let manager = can_manage(shop, actor, admin, admin_permission);
    match (manager, actor.crouching) {
        (true, true) => Resolution::Release,
        (true, false) => Resolution::Open(SurfaceKind::Config),
        (false, _) => Resolution::Open(SurfaceKind::Trade),
    }
}

/// Shared read-only state handed to every use-block handler.
pub struct InteractionEnv<'a> {
    pub world: &'a dyn BlockWorld,
    pub admin: &'a AdminModeRegistry,
    pub admin_permission: &'a str,
}

pub trait UseBlockHandler: Send {
    /// Lower values run first.
    fn priority(&self) -> i32;

    /// Handlers that return false never see an event once it is cancelled.
    fn receives_cancelled(&self) -> bool {
        false
    }

    fn handle(
        &self,
        env: &InteractionEnv<'_>,
        actor: &Actor,
        event: &mut UseBlockEvent,
    ) -> Option<SurfaceRequest>;
}

/// Runs registered handlers in priority order.
#[derive(Default)]
pub struct InteractionDispatcher {
    handlers: Vec<Box<dyn UseBlockHandler>>,
}

impl InteractionDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatcher with the shop handler already registered.
    pub fn with_shop_handler() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(Box::new(ShopInteractHandler));
        dispatcher
    }

    pub fn register(&mut self, handler: Box<dyn UseBlockHandler>) {
        self.handlers.push(handler);
        self.handlers.sort_by_key(|h| h.priority());
    }

    /// Feed `event` through every handler. The first surface request wins.
    pub fn dispatch(
        &self,
        env: &InteractionEnv<'_>,
        actor: &Actor,
        event: &mut UseBlockEvent,
    ) -> Option<SurfaceRequest> {
        let mut request = None;
        for handler in &self.handlers {
            if event.is_cancelled() && !handler.receives_cancelled() {
                continue;
            }
            if let Some(found) = handler.handle(env, actor, event) {
                request.get_or_insert(found);
            }
        }
        request
    }
}

/// The shop handler: earliest priority, sees cancelled events, reverses cancellation
/// for shop blocks and then applies [`resolve`].
pub struct ShopInteractHandler;

impl UseBlockHandler for ShopInteractHandler {
    fn priority(&self) -> i32 {
        i32::MIN
    }

    fn receives_cancelled(&self) -> bool {
        true
    }

    fn handle(
        &self,
        env: &InteractionEnv<'_>,
        actor: &Actor,
        event: &mut UseBlockEvent,
    ) -> Option<SurfaceRequest> {
        let shop = env.world.shop(event.pos)?;
        if event.is_cancelled() {
            info!(
                "Use of shop at {} by {} was cancelled by another handler - allowing",
                event.pos,
                escape_log(&actor.name)
            );
            event.set_cancelled(false);
        }
        match resolve(shop, actor, env.admin, env.admin_permission) {
            Resolution::Release => {
                debug!("Manager {} crouching - native chest access", escape_log(&actor.name));
                None
            }
            Resolution::Open(kind) => {
                event.set_cancelled(true);
                debug!(
                    "Opening {:?} surface at {} for {}",
                    kind,
                    event.pos,
                    escape_log(&actor.name)
                );
                Some(SurfaceRequest {
                    kind,
                    pos: event.pos,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    const PERM: &str = "barterchest.admin";

    fn shop_owned_by(owner: PlayerId) -> ShopState {
        ShopState::new(owner, "Owner", ItemContainer::new(1))
    }

    #[test]
    fn owner_opens_config_and_crouching_owner_releases() {
        let owner = Actor::new(Uuid::new_v4(), "Owner", ItemContainer::new(1));
        let shop = shop_owned_by(owner.id);
        let admin = AdminModeRegistry::new();
        assert_eq!(
            resolve(&shop, &owner, &admin, PERM),
            Resolution::Open(SurfaceKind::Config)
        );
        let mut crouching = owner.clone();
        crouching.crouching = true;
        assert_eq!(resolve(&shop, &crouching, &admin, PERM), Resolution::Release);
    }

    #[test]
    fn customers_always_trade_even_when_crouching() {
        let shop = shop_owned_by(Uuid::new_v4());
        let mut customer = Actor::new(Uuid::new_v4(), "Cust", ItemContainer::new(1));
        customer.crouching = true;
        let admin = AdminModeRegistry::new();
        assert_eq!(
            resolve(&shop, &customer, &admin, PERM),
            Resolution::Open(SurfaceKind::Trade)
        );
    }

    #[test]
    fn admin_needs_both_permission_and_mode() {
        let shop = shop_owned_by(Uuid::new_v4());
        let admin_actor = Actor::new(Uuid::new_v4(), "Mod", ItemContainer::new(1)).with_permission(PERM);
        let mut registry = AdminModeRegistry::new();
        assert_eq!(
            resolve(&shop, &admin_actor, &registry, PERM),
            Resolution::Open(SurfaceKind::Trade)
        );
        registry.enable(admin_actor.id);
        assert_eq!(
            resolve(&shop, &admin_actor, &registry, PERM),
            Resolution::Open(SurfaceKind::Config)
        );

        let no_perm = Actor::new(Uuid::new_v4(), "Pleb", ItemContainer::new(1));
        registry.enable(no_perm.id);
        assert_eq!(
            resolve(&shop, &no_perm, &registry, PERM),
            Resolution::Open(SurfaceKind::Trade)
        );
    }
}
