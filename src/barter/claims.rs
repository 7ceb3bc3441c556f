//! Land-claim permission check consulted before a chest may become a shop.
//!
//! The claims collaborator is picked once at startup. When none is installed every
//! location is allowed.

use log::info;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

use crate::barter::types::PlayerId;

/// Horizontal size of a claimable chunk, in blocks.
pub const CHUNK_SIZE: i32 = 32;

pub trait ClaimChecker: Send + Sync {
    /// Human-readable name of the backing claims system, for logs.
    fn name(&self) -> &str;

    fn can_create_shop(&self, player: PlayerId, dimension: &str, x: i32, z: i32) -> bool;

    /// Name of whoever claimed the chunk containing `(x, z)`, if anyone.
    fn claim_owner_name(&self, _dimension: &str, _x: i32, _z: i32) -> Option<String> {
        None
    }
}

/// Used when no claims system is installed: everything is allowed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoClaims;

impl ClaimChecker for NoClaims {
    fn name(&self) -> &str {
        "none"
    }

    fn can_create_shop(&self, _player: PlayerId, _dimension: &str, _x: i32, _z: i32) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
struct Party {
    name: String,
    members: HashSet<PlayerId>,
}

/// Chunk-granular party claims held in memory.
///
/// Unclaimed chunks are open to everyone; claimed chunks only to members of the
/// owning party.
#[derive(Debug, Default, Clone)]
pub struct ChunkClaims {
    parties: HashMap<Uuid, Party>,
    chunks: HashMap<(String, i32, i32), Uuid>,
}

fn chunk_of(x: i32, z: i32) -> (i32, i32) {
    (x.div_euclid(CHUNK_SIZE), z.div_euclid(CHUNK_SIZE))
}

impl ChunkClaims {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_party(&mut self, name: &str, members: &[PlayerId]) -> Uuid {
        let id = Uuid::new_v4();
        self.parties.insert(
            id,
            Party {
                name: name.to_string(),
                members: members.iter().copied().collect(),
            },
        );
        id
    }

    /// Claim the chunk containing block `(x, z)` for `party`.
    pub fn claim(&mut self, party: Uuid, dimension: &str, x: i32, z: i32) {
        let (cx, cz) = chunk_of(x, z);
        self.chunks.insert((dimension.to_string(), cx, cz), party);
    }

    fn owner(&self, dimension: &str, x: i32, z: i32) -> Option<&Party> {
        let (cx, cz) = chunk_of(x, z);
        self.chunks
            .get(&(dimension.to_string(), cx, cz))
            .and_then(|id| self.parties.get(id))
    }
}

impl ClaimChecker for ChunkClaims {
    fn name(&self) -> &str {
        "chunk-claims"
    }

    fn can_create_shop(&self, player: PlayerId, dimension: &str, x: i32, z: i32) -> bool {
        match self.owner(dimension, x, z) {
            Some(party) => party.members.contains(&player),
            None => true,
        }
    }

    fn claim_owner_name(&self, dimension: &str, x: i32, z: i32) -> Option<String> {
        self.owner(dimension, x, z).map(|p| p.name.clone())
    }
}

/// Pick the claims collaborator for this process.
pub fn resolve(installed: Option<Arc<dyn ClaimChecker>>) -> Arc<dyn ClaimChecker> {
    match installed {
        Some(checker) => {
            info!(
                "Claims integration '{}' enabled - shop creation will respect claims",
                checker.name()
            );
            checker
        }
        None => {
            info!("No claims integration installed - claim protection disabled for shops");
            Arc::new(NoClaims)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unclaimed_chunks_are_open() {
        let claims = ChunkClaims::new();
        assert!(claims.can_create_shop(Uuid::new_v4(), "overworld", 10, 10));
        assert!(claims.claim_owner_name("overworld", 10, 10).is_none());
    }

    #[test]
    fn claimed_chunks_admit_members_only() {
        let member = Uuid::new_v4();
        let mut claims = ChunkClaims::new();
        let party = claims.create_party("Riverfolk", &[member]);
        claims.claim(party, "overworld", 5, 5);

        assert!(claims.can_create_shop(member, "overworld", 31, 0));
        assert!(!claims.can_create_shop(Uuid::new_v4(), "overworld", 0, 31));
        assert!(claims.can_create_shop(Uuid::new_v4(), "overworld", 32, 0));
        assert!(claims.can_create_shop(Uuid::new_v4(), "nether", 5, 5));
        assert_eq!(
            claims.claim_owner_name("overworld", 1, 1).as_deref(),
            Some("Riverfolk")
        );
    }

    #[test]
    fn negative_coordinates_use_floor_chunks() {
        let mut claims = ChunkClaims::new();
        let party = claims.create_party("Cave", &[]);
        claims.claim(party, "overworld", -1, -1);
        assert!(!claims.can_create_shop(Uuid::new_v4(), "overworld", -32, -32));
        assert!(claims.can_create_shop(Uuid::new_v4(), "overworld", 0, 0));
    }

    #[test]
    fn resolve_defaults_to_allow_all() {
        let checker = resolve(None);
        assert_eq!(checker.name(), "none");
        assert!(checker.can_create_shop(Uuid::new_v4(), "overworld", 0, 0));
    }
}
