//! Shared value types: block coordinates, entity positions and item stacks.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Stable player identity.
pub type PlayerId = Uuid;

/// Identity of a spawned world entity (floating display items).
pub type EntityId = Uuid;

/// Integer block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Coordinates wrap at the `i32` bounds.
    pub const fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            z: self.z.wrapping_add(dz),
        }
    }

    /// The 26 cells of the Chebyshev-distance-1 cube around this position.
    pub fn neighbors(self) -> impl Iterator<Item = BlockPos> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).flat_map(move |dy| {
                (-1..=1).filter_map(move |dz| {
                    if dx == 0 && dy == 0 && dz == 0 {
                        None
                    } else {
                        Some(self.offset(dx, dy, dz))
                    }
                })
            })
        })
    }

    /// The four horizontal face neighbours (east, west, south, north).
    pub fn horizontal_neighbors(self) -> [BlockPos; 4] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }

    /// Centre of the block face above, lifted by `height`.
    pub fn above_center(self, height: f64) -> Vec3 {
        Vec3 {
            x: f64::from(self.x) + 0.5,
            y: f64::from(self.y) + height,
            z: f64::from(self.z) + 0.5,
        }
    }
}

impl fmt::Display for BlockPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Continuous world position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn distance(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }
}

/// A stack of identical items occupying one container slot.
///
/// Everything except `quantity` is an attribute that must survive splitting and moving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ItemStack {
    #[serde(rename = "Id")]
    pub item_id: String,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<u32>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl ItemStack {
    pub fn new(item_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            quantity,
            durability: None,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_durability(mut self, durability: u32) -> Self {
        self.durability = Some(durability);
        self
    }

    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Same stack with a different quantity; all other attributes are kept.
    pub fn with_quantity(&self, quantity: u32) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    /// Two stacks can merge only when everything but the quantity is identical,
    /// including the exact item id.
    pub fn is_stackable_with(&self, other: &ItemStack) -> bool {
        self.item_id == other.item_id
            && self.durability == other.durability
            && self.metadata == other.metadata
    }

    pub fn has_attributes(&self) -> bool {
        self.durability.is_some() || !self.metadata.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_cover_the_cube_without_center() {
        let origin = BlockPos::new(10, 64, -3);
        let cells: Vec<_> = origin.neighbors().collect();
        assert_eq!(cells.len(), 26);
        assert!(!cells.contains(&origin));
        assert!(cells.contains(&BlockPos::new(11, 65, -2)));
        assert!(cells.contains(&BlockPos::new(9, 63, -4)));
        assert!(!cells.contains(&BlockPos::new(12, 64, -3)));
    }

    #[test]
    fn neighbors_at_coordinate_bounds_do_not_overflow() {
        let corner = BlockPos::new(i32::MAX, 0, i32::MIN);
        let cells: Vec<_> = corner.neighbors().collect();
        assert_eq!(cells.len(), 26);
        assert!(cells.contains(&BlockPos::new(i32::MIN, 0, i32::MAX)));
    }

    #[test]
    fn with_quantity_preserves_attributes() {
        let sword = ItemStack::new("Weapon_Sword_Iron", 1)
            .with_durability(37)
            .with_meta("Enchant", "Sharpness");
        let copy = sword.with_quantity(5);
        assert_eq!(copy.quantity, 5);
        assert_eq!(copy.durability, Some(37));
        assert!(copy.is_stackable_with(&sword));
        assert!(!copy.is_stackable_with(&ItemStack::new("Weapon_Sword_Iron", 1)));
    }

    #[test]
    fn above_center_offsets_to_block_middle() {
        let p = BlockPos::new(4, 70, -2).above_center(1.5);
        assert_eq!(p, Vec3::new(4.5, 71.5, -1.5));
    }
}
