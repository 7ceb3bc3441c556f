//! # Barterchest - player-run barter shops
//!
//! Barterchest turns ordinary container blocks into shops. A player uses a license item
//! on a chest; from then on the owner configures what the chest sells and for which
//! currency item, and other players buy from or sell to it through a trade surface.
//!
//! ## Features
//!
//! - **Barter trading**: item-for-item trades with exact stock, funds and space checks, and rollback when a transfer falls short.
//! - **Owner and admin config**: currency selection, price steps, save and two-step removal.
//! - **Protection**: shop blocks cannot be broken, and nothing may be broken or placed next to one.
//! - **Claims**: shop creation consults a land-claim checker when one is installed.
//! - **Persistence**: shop records live in a sled store keyed by world and block position.
//! - **Per-world executors**: every world's shop state is mutated on a single tokio task.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use barterchest::barter::{claims::NoClaims, shared_admin, spawn_world, MemoryEntities, MemoryWorld, WorldContext};
//! use barterchest::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(Config::load("config.toml").await?);
//!     let ctx = WorldContext::new(
//!         Box::new(MemoryWorld::new("default")),
//!         Box::new(MemoryEntities::new()),
//!         config,
//!         Arc::new(NoClaims),
//!         shared_admin(),
//!     );
//!     let world = spawn_world(ctx);
//!     let shops = world.run(|ctx| ctx.world.shop_positions().len()).await?;
//!     println!("{} shops", shops);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`barter`] - shops, trading, interaction, protection, persistence and the world executor
//! - [`config`] - configuration loading
//! - [`logutil`] - log line escaping for player-supplied text

pub mod barter;
pub mod config;
pub mod logutil;
