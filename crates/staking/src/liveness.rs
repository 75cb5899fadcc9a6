// staking/src/liveness.rs

use crate::hooks::StakingHooks;
use crate::params::Params;
use crate::store::SigningStore;
use crate::StakingResult;
use staking_types::{BlockHeight, BlockIdFlag, ConsensusAddress, LivenessEvent, Power, SigningInfo};
use std::sync::Arc;

/// Sliding-window liveness tracker.
///
/// Records, once per validator per block, whether the block was signed, and
/// maintains the penalty-eligible miss count incrementally over a circular
/// missed-block bitmap. Every call is O(1) regardless of window size or
/// height; the bitmap is only ever touched at slot
/// `index_offset % signed_blocks_window`.
pub struct SigningWindowTracker {
    window: u64,
    min_signed_per_window: u64,
    hooks: Option<Arc<dyn StakingHooks>>,
}

impl SigningWindowTracker {
    pub fn new(params: &Params) -> Self {
        Self {
            window: params.signed_blocks_window,
            min_signed_per_window: params.min_signed_per_window(),
            hooks: None,
        }
    }

    /// Attach an extension point receiving a liveness event per missed block
    pub fn with_hooks(mut self, hooks: Arc<dyn StakingHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Handle one validator's signing evidence for one block.
    ///
    /// Must be invoked at most once per validator per block height, after
    /// the block's votes are known. The reported power is informational.
    /// Store failures abort the call; the jailed skip is a normal early
    /// return, not an error.
    pub fn handle_block_signature<S: SigningStore>(
        &self,
        store: &mut S,
        cons_addr: &ConsensusAddress,
        _power: Power,
        flag: BlockIdFlag,
        height: BlockHeight,
    ) -> StakingResult<()> {
        // don't update missed blocks while the validator is jailed
        if store.is_jailed(cons_addr)? {
            return Ok(());
        }

        let mut info = match store.signing_info(cons_addr)? {
            Some(info) => info,
            None => SigningInfo::new(height),
        };

        // the window slot for this call; the offset advances regardless of outcome
        let index = info.index_offset % self.window;
        info.index_offset += 1;

        let previous = store.bitmap_bit(cons_addr, index)?;
        let missed = flag == BlockIdFlag::Absent;

        match (previous, missed) {
            (false, true) => {
                // slot flips from signed to missed
                store.set_bitmap_bit(cons_addr, index, true)?;
                info.missed_blocks_counter += 1;
            }
            (true, false) => {
                // slot flips from missed to signed
                store.set_bitmap_bit(cons_addr, index, false)?;
                info.missed_blocks_counter -= 1;
            }
            _ => {
                // slot unchanged, counter unchanged
            }
        }

        if missed {
            let event = LivenessEvent {
                cons_addr: *cons_addr,
                missed_blocks: info.missed_blocks_counter,
                height,
            };
            if let Some(hooks) = &self.hooks {
                hooks.on_validator_missed_block(&event);
            }
            tracing::debug!(
                "absent validator {} at height {}: {} missed, threshold {}",
                cons_addr.to_hex(),
                height,
                info.missed_blocks_counter,
                self.min_signed_per_window
            );
        }

        store.set_signing_info(cons_addr, &info)
    }
}
