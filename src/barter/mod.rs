//! Player-run barter shops.
//! A container block becomes a shop when a player uses a license on it. Owners configure
//! one listing (item, currency, buy and sell prices) and everyone else trades against the
//! container's stock. Shop blocks and their neighbours are protected from breaking and
//! placement.

pub mod admin;
pub mod claims;
pub mod commands;
pub mod config_surface;
pub mod container;
pub mod display;
pub mod entities;
pub mod errors;
pub mod interaction;
pub mod item;
pub mod lifecycle;
pub mod listing;
pub mod protection;
pub mod runtime;
pub mod shop;
pub mod storage;
pub mod trade_surface;
pub mod transaction;
pub mod types;
pub mod world;

pub use admin::AdminModeRegistry;
pub use claims::{ChunkClaims, ClaimChecker, NoClaims};
pub use commands::{BarterCommand, CommandSender};
pub use config_surface::{ConfigAction, ConfigOutcome, ConfigSession, ConfigView};
pub use container::{transfer, ItemContainer};
pub use entities::{EntityStore, FloatingItem, MemoryEntities};
pub use errors::BarterError;
pub use interaction::{
    Actor, InteractionDispatcher, Resolution, ShopInteractHandler, SurfaceKind, SurfaceRequest,
    UseBlockEvent, UseBlockHandler,
};
pub use item::{ItemCatalog, StaticCatalog};
pub use lifecycle::{create_shop, remove_shop, LicenseRejection};
pub use listing::Listing;
pub use protection::{check_break, check_place, ProtectionVerdict};
pub use runtime::{shared_admin, spawn_world, OpenSurface, WorldContext, WorldHandle};
pub use shop::ShopState;
pub use storage::{BarterStore, BarterStoreBuilder, SaveStats};
pub use trade_surface::{TradeAction, TradeSession, TradeView};
pub use transaction::{TransactionFailure, TransactionResult};
pub use types::{BlockPos, EntityId, ItemStack, PlayerId, Vec3};
pub use world::{BlockState, BlockWorld, BreakOutcome, ContainerState, MemoryWorld};
