// staking-types/src/compute.rs

use crate::keys::ConsensusKey;
use crate::types::Power;
use serde::{Deserialize, Serialize};

/// One externally computed power assignment for the current epoch.
///
/// Ephemeral: consumed per reconciliation call, never persisted as such.
/// The submitted operator identity becomes the moniker of a newly created
/// validator; the validator's addresses are derived from the consensus key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputeResult {
    pub power: Power,
    pub consensus_key: ConsensusKey,
    pub operator: String,
}

impl ComputeResult {
    pub fn new(power: Power, consensus_key: ConsensusKey, operator: impl Into<String>) -> Self {
        Self {
            power,
            consensus_key,
            operator: operator.into(),
        }
    }
}
