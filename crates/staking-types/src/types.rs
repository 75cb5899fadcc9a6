// staking-types/src/types.rs

use crate::keys::{ConsensusAddress, ConsensusKey};
use serde::{Deserialize, Serialize};

/// Block number/height
pub type BlockHeight = u64;

/// Reconciliation epoch number
pub type Epoch = u64;

/// Validator voting power
pub type Power = u64;

/// Signing evidence for one validator in one block, as reported by the
/// consensus engine after the block's votes are known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockIdFlag {
    /// The validator's vote was included in the commit
    Commit,
    /// The validator's vote was absent
    Absent,
    /// The validator voted nil / evidence is unknown
    Nil,
}

/// One entry of the validator-set delta delivered to the consensus engine.
///
/// Zero-power validators are never emitted; absence from the update list at
/// power 0 is what removes them from the active set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpdate {
    pub consensus_key: ConsensusKey,
    pub power: Power,
}

/// Liveness observability event, emitted on every missed block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LivenessEvent {
    pub cons_addr: ConsensusAddress,
    pub missed_blocks: u64,
    pub height: BlockHeight,
}
