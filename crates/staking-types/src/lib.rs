// staking-types/src/lib.rs

//! Data model for the externally-computed-power staking core
//!
//! This crate provides:
//! - Validator identity types (consensus keys, operator/consensus addresses)
//! - The validator record and its bonding lifecycle
//! - Per-validator signing info for liveness tracking
//! - Delegations and per-epoch compute results

pub mod compute;
pub mod delegation;
pub mod keys;
pub mod signing;
pub mod types;
pub mod validator;

pub use compute::ComputeResult;
pub use delegation::Delegation;
pub use keys::{ConsensusAddress, ConsensusKey, OperatorAddress};
pub use signing::SigningInfo;
pub use types::{BlockHeight, BlockIdFlag, LivenessEvent, Power, PowerUpdate};
pub use validator::{BondStatus, Commission, Description, Validator};

/// Result type for data-model operations
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors that can occur when constructing or parsing data-model types
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    #[error("Invalid address")]
    InvalidAddress,

    #[error("Invalid consensus key")]
    InvalidKey,

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}
