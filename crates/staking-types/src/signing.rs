// staking-types/src/signing.rs

use crate::types::BlockHeight;
use serde::{Deserialize, Serialize};

/// Per-validator liveness accounting, keyed by consensus address.
///
/// Created lazily on the first liveness call for a validator. `index_offset`
/// advances by exactly 1 per call regardless of outcome; the effective
/// bitmap slot at time of use is `index_offset % signed_blocks_window`.
/// `missed_blocks_counter` always equals the number of set bits in the
/// validator's missed-block bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningInfo {
    /// Height at which liveness tracking started for this validator
    pub start_height: BlockHeight,
    /// Monotonic counter of liveness calls, addresses the bitmap window
    pub index_offset: u64,
    /// Number of blocks missed inside the current window
    pub missed_blocks_counter: u64,
    /// Height until which the validator is jailed (0 = not jailed)
    pub jailed_until: BlockHeight,
    /// Whether the validator has been permanently removed from consensus
    pub tombstoned: bool,
}

impl SigningInfo {
    /// Create signing info for a validator first seen at `start_height`
    pub fn new(start_height: BlockHeight) -> Self {
        Self {
            start_height,
            index_offset: 0,
            missed_blocks_counter: 0,
            jailed_until: 0,
            tombstoned: false,
        }
    }
}
