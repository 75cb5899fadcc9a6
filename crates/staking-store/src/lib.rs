// staking-store/src/lib.rs

//! RocksDB-backed durable store for the staking engine
//!
//! Implements the engine's `SigningStore`, `ValidatorRegistry` and
//! `PowerIndex` abstractions over column families with bincode-encoded
//! values. Keys are laid out so RocksDB's byte order is the canonical
//! order: validator records key on the operator address (ascending scan =
//! canonical iteration) and the power index stores the complemented power
//! (forward scan = descending power).
//!
//! Atomicity across a block remains the responsibility of the embedding
//! transactional scope; this crate supplies the durable map.

pub mod db;

pub use db::{ColumnFamily, DatabaseConfig, StakingDb};

use staking::StakingError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in the durable store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Corruption: {0}")]
    Corruption(String),
}

impl From<StoreError> for StakingError {
    fn from(err: StoreError) -> Self {
        StakingError::Store(err.to_string())
    }
}
