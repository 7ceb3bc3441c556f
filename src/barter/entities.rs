//! Floating display entities: the item hovering above each shop.

use std::collections::HashMap;
use uuid::Uuid;

use crate::barter::types::{EntityId, Vec3};

/// What to spawn for a shop display.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingItem {
    pub item_id: String,
    pub position: Vec3,
    pub intangible: bool,
    pub pickup_allowed: bool,
    pub lifetime_secs: u64,
}

/// Entity runtime capability used to spawn and clean up display items.
pub trait EntityStore: Send {
    fn spawn(&mut self, item: FloatingItem) -> EntityId;

    /// Returns false if the entity was already gone.
    fn despawn(&mut self, id: EntityId) -> bool;

    fn exists(&self, id: EntityId) -> bool;

    /// Closest entity that cannot be picked up, within `radius` of `from`.
    fn nearest_non_pickupable(&self, from: Vec3, radius: f64) -> Option<(EntityId, f64)>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryEntities {
    entities: HashMap<EntityId, FloatingItem>,
}

impl MemoryEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: EntityId) -> Option<&FloatingItem> {
        self.entities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntityStore for MemoryEntities {
    fn spawn(&mut self, item: FloatingItem) -> EntityId {
        let id = Uuid::new_v4();
        self.entities.insert(id, item);
        id
    }

    fn despawn(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id).is_some()
    }

    fn exists(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    fn nearest_non_pickupable(&self, from: Vec3, radius: f64) -> Option<(EntityId, f64)> {
        self.entities
            .iter()
            .filter(|(_, e)| !e.pickup_allowed)
            .map(|(id, e)| (*id, e.position.distance(&from)))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floating(at: Vec3, pickup_allowed: bool) -> FloatingItem {
        FloatingItem {
            item_id: "Iron_Bar".into(),
            position: at,
            intangible: true,
            pickup_allowed,
            lifetime_secs: 60,
        }
    }

    #[test]
    fn nearest_ignores_pickupable_and_far_entities() {
        let mut store = MemoryEntities::new();
        store.spawn(floating(Vec3::new(0.5, 0.0, 0.0), true));
        let near = store.spawn(floating(Vec3::new(2.0, 0.0, 0.0), false));
        store.spawn(floating(Vec3::new(2.5, 0.0, 0.0), false));
        store.spawn(floating(Vec3::new(9.0, 0.0, 0.0), false));

        let found = store.nearest_non_pickupable(Vec3::default(), 3.0);
        assert_eq!(found.map(|(id, _)| id), Some(near));
        assert!(store.nearest_non_pickupable(Vec3::new(50.0, 0.0, 0.0), 3.0).is_none());
    }
}
