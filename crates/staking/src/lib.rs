// staking/src/lib.rs

//! Validator-set and liveness engine for externally computed voting power
//!
//! This crate implements the two components on the block-execution critical
//! path of the consensus engine:
//! - `SigningWindowTracker`: per-validator sliding-window liveness accounting
//!   over a circular missed-block bitmap
//! - `ValidatorReconciler`: converges the durable validator set toward the
//!   power assignment produced by an external computation each epoch
//!
//! Both operate against store abstractions (`SigningStore`,
//! `ValidatorRegistry`, `PowerIndex`); atomicity across a block is the
//! responsibility of the embedding transactional scope.

pub mod hooks;
pub mod ledger;
pub mod liveness;
pub mod params;
pub mod power_index;
pub mod reconcile;
pub mod store;

pub use hooks::{NoOpHooks, StakingHooks};
pub use ledger::{NoOpStakeLedger, StakeLedger};
pub use liveness::SigningWindowTracker;
pub use params::Params;
pub use reconcile::{power_updates, ReconcileMode, ValidatorReconciler};
pub use store::{MemStakingStore, PowerIndex, SigningStore, ValidatorRegistry};

use staking_types::TypesError;

/// Result type for staking operations
pub type StakingResult<T> = Result<T, StakingError>;

/// Errors that can occur during staking operations
#[derive(Debug, thiserror::Error)]
pub enum StakingError {
    #[error("Store error: {0}")]
    Store(String),

    #[error("Validator not found: {0}")]
    ValidatorNotFound(String),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Duplicate compute result key: {0}")]
    DuplicateComputeKey(String),

    #[error("Zero-power compute result for unknown validator: {0}")]
    ZeroPowerEntrant(String),

    #[error("Delegation error: {0}")]
    Delegation(String),

    #[error("Data model error: {0}")]
    Types(#[from] TypesError),
}
