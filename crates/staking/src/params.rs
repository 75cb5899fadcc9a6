// staking/src/params.rs

use crate::{StakingError, StakingResult};
use serde::{Deserialize, Serialize};

/// Configuration for the staking core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    /// Length of the sliding liveness window in blocks (bitmap length, >= 1)
    pub signed_blocks_window: u64,
    /// Fraction of the window a validator must sign, in basis points.
    /// Consumed by the external punishment evaluator; not enforced here.
    pub min_signed_per_window_bps: u32,
    /// Stake denomination used when constructing new validators
    pub bond_denom: String,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            signed_blocks_window: 100,
            min_signed_per_window_bps: 5000, // 50%
            bond_denom: "stake".to_string(),
        }
    }
}

impl Params {
    pub fn validate(&self) -> StakingResult<()> {
        if self.signed_blocks_window == 0 {
            return Err(StakingError::InvalidParams(
                "signed_blocks_window must be at least 1".into(),
            ));
        }
        if self.min_signed_per_window_bps > 10000 {
            return Err(StakingError::InvalidParams(
                "min_signed_per_window_bps must not exceed 10000".into(),
            ));
        }
        if self.bond_denom.is_empty() {
            return Err(StakingError::InvalidParams("bond_denom must be set".into()));
        }
        Ok(())
    }

    /// Minimum number of signed blocks per window implied by the threshold
    pub fn min_signed_per_window(&self) -> u64 {
        self.signed_blocks_window * self.min_signed_per_window_bps as u64 / 10000
    }
}
