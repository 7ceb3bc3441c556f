//! Structural error type shared by storage, the world executor and permission gates.

use thiserror::Error;

use crate::barter::types::BlockPos;

/// Structural failures raised outside the trade taxonomy: storage, lookups, world plumbing.
#[derive(Debug, Error)]
pub enum BarterError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around JSON serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// The block at the given position does not hold shop state.
    #[error("no shop at {world} {pos}")]
    NotAShop { world: String, pos: BlockPos },

    /// The world executor has shut down and no longer accepts jobs.
    #[error("world closed: {0}")]
    WorldClosed(String),

    /// An actor lacks the permission an operation requires.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
}
