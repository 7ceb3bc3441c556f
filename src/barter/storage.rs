//! Sled-backed shop records and the trade audit log.
//!
//! Shops live in the `barter_shops` tree under `shops:{world}:{x}:{y}:{z}` as JSON;
//! audit lines live in `barter_logs` keyed by timestamp.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};

use chrono::Utc;
use log::{debug, info, warn};
use sled::IVec;

use crate::barter::errors::BarterError;
use crate::barter::shop::ShopState;
use crate::barter::types::BlockPos;
use crate::barter::world::{BlockState, BlockWorld};

const TREE_SHOPS: &str = "barter_shops";
const TREE_LOGS: &str = "barter_logs";
const SHOP_PREFIX: &str = "shops:";

fn next_timestamp_nanos() -> i64 {
    let now = Utc::now();
    now.timestamp_nanos_opt()
        .unwrap_or_else(|| now.timestamp_micros() * 1000)
}

/// Helper builder so tests can easily create throwaway stores with custom paths.
pub struct BarterStoreBuilder {
    path: PathBuf,
}

impl BarterStoreBuilder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn open(self) -> Result<BarterStore, BarterError> {
        BarterStore::open(self.path)
    }
}

/// Counters reported by [`BarterStore::save_world`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveStats {
    pub written: usize,
    pub unchanged: usize,
    pub removed: usize,
}

/// Sled-backed persistence for shop records, keyed by world and block position.
///
/// Values are the JSON form of [`ShopState`], so the stored field names match the
/// persisted record layout (`OwnerUUID`, `Listings`, ...).
pub struct BarterStore {
    db: sled::Db,
    shops: sled::Tree,
    logs: sled::Tree,
}

impl BarterStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, BarterError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let shops = db.open_tree(TREE_SHOPS)?;
        let logs = db.open_tree(TREE_LOGS)?;
        Ok(Self {
            db,
            shops,
            logs,
        })
    }

    fn shop_key(world: &str, pos: BlockPos) -> Vec<u8> {
        format!("{}{}:{}:{}:{}", SHOP_PREFIX, world, pos.x, pos.y, pos.z).into_bytes()
    }

    fn world_prefix(world: &str) -> Vec<u8> {
        format!("{}{}:", SHOP_PREFIX, world).into_bytes()
    }

    /// Split `shops:<world>:<x>:<y>:<z>` from the right so world names may contain `:`.
    fn parse_key(key: &[u8]) -> Option<(String, BlockPos)> {
        let text = std::str::from_utf8(key).ok()?;
        let rest = text.strip_prefix(SHOP_PREFIX)?;
        let mut parts = rest.rsplitn(4, ':');
        let z = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        let x = parts.next()?.parse().ok()?;
        let world = parts.next()?;
        Some((world.to_string(), BlockPos::new(x, y, z)))
    }

    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, BarterError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn deserialize<T: serde::de::DeserializeOwned>(bytes: IVec) -> Result<T, BarterError> {
        Ok(serde_json::from_slice::<T>(&bytes)?)
    }

    /// Insert or update the record for the shop at `pos`.
    pub fn put_shop(&self, world: &str, pos: BlockPos, shop: &ShopState) -> Result<(), BarterError> {
        let key = Self::shop_key(world, pos);
        let bytes = Self::serialize(shop)?;
        self.shops.insert(key, bytes)?;
        self.shops.flush()?;
        Ok(())
    }

    pub fn get_shop(&self, world: &str, pos: BlockPos) -> Result<ShopState, BarterError> {
        let key = Self::shop_key(world, pos);
        let Some(bytes) = self.shops.get(&key)? else {
            return Err(BarterError::NotFound(format!("shop {} {}", world, pos)));
        };
        Self::deserialize(bytes)
    }

    /// All shop records stored for one world, in key order.
    pub fn list_shops(&self, world: &str) -> Result<Vec<(BlockPos, ShopState)>, BarterError> {
        let mut shops = Vec::new();
        for entry in self.shops.scan_prefix(Self::world_prefix(world)) {
            let (key, value) = entry?;
            let Some((key_world, pos)) = Self::parse_key(&key) else {
                warn!("skipping malformed shop key {}", String::from_utf8_lossy(&key));
                continue;
            };
            // A world named "a" also prefixes keys of a world named "a:b".
            if key_world != world {
                continue;
            }
            shops.push((pos, Self::deserialize(value)?));
        }
        Ok(shops)
    }

    pub fn list_worlds(&self) -> Result<Vec<String>, BarterError> {
        let mut worlds = BTreeSet::new();
        for entry in self.shops.scan_prefix(SHOP_PREFIX.as_bytes()) {
            let (key, _) = entry?;
            if let Some((world, _)) = Self::parse_key(&key) {
                worlds.insert(world);
            }
        }
        Ok(worlds.into_iter().collect())
    }

    /// Returns whether a record was present.
    pub fn delete_shop(&self, world: &str, pos: BlockPos) -> Result<bool, BarterError> {
        let removed = self.shops.remove(Self::shop_key(world, pos))?;
        self.shops.flush()?;
        Ok(removed.is_some())
    }

    pub fn append_log(&self, message: &str) -> Result<(), BarterError> {
        // Sequence suffix keeps entries distinct when the clock does not advance.
        let seq = self.db.generate_id()?;
        let key = format!("logs:{}:{:020}", next_timestamp_nanos(), seq).into_bytes();
        self.logs.insert(key, message.as_bytes())?;
        self.logs.flush()?;
        Ok(())
    }

    /// Log lines in insertion order.
    pub fn recent_logs(&self, limit: usize) -> Result<Vec<String>, BarterError> {
        let mut lines = Vec::new();
        for entry in self.logs.scan_prefix(b"logs:").rev().take(limit) {
            let (_, value) = entry?;
            lines.push(String::from_utf8_lossy(&value).into_owned());
        }
        lines.reverse();
        Ok(lines)
    }

    /// Persist every dirty shop in `world`, clear its dirty flag, and drop records whose
    /// block no longer holds a shop.
    pub fn save_world(&self, world: &mut dyn BlockWorld) -> Result<SaveStats, BarterError> {
        let name = world.name().to_string();
        let mut stats = SaveStats::default();
        let positions = world.shop_positions();
        let live: HashSet<BlockPos> = positions.iter().copied().collect();

        for pos in positions {
            let Some(shop) = world.shop_mut(pos) else {
                continue;
            };
            if !shop.is_dirty() {
                stats.unchanged += 1;
                continue;
            }
            self.put_shop(&name, pos, shop)?;
            shop.clear_dirty();
            stats.written += 1;
        }

        for (pos, _) in self.list_shops(&name)? {
            if !live.contains(&pos) && self.delete_shop(&name, pos)? {
                stats.removed += 1;
            }
        }

        debug!(
            "saved world {}: {} written, {} unchanged, {} removed",
            name, stats.written, stats.unchanged, stats.removed
        );
        Ok(stats)
    }

    /// Reattach stored shop state to the blocks of `world`. Records whose block is gone are
    /// skipped and left in the store. Returns the number of shops restored.
    pub fn load_world(&self, world: &mut dyn BlockWorld) -> Result<usize, BarterError> {
        let name = world.name().to_string();
        let mut restored = 0usize;
        for (pos, shop) in self.list_shops(&name)? {
            match world.replace_state(pos, BlockState::Shop(Box::new(shop))) {
                Ok(_) => restored += 1,
                Err(_) => warn!("no block at {} {} for stored shop; skipping", name, pos),
            }
        }
        info!("restored {} shops in world {}", restored, name);
        Ok(restored)
    }
}
