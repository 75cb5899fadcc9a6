// staking/src/ledger.rs

use crate::StakingResult;
use staking_types::Delegation;

/// Capability interface for delegated-stake custody.
///
/// The reconciler routes every delegation through this seam so custody can
/// be swapped without touching reconciliation logic.
pub trait StakeLedger {
    fn delegate(&mut self, delegation: &Delegation, denom: &str) -> StakingResult<()>;
    fn undelegate(&mut self, delegation: &Delegation, denom: &str) -> StakingResult<()>;
}

/// Ledger that bypasses token custody entirely.
///
/// Voting power originates from an external computation rather than on-chain
/// transfers, so bonding a validator moves no tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpStakeLedger;

impl StakeLedger for NoOpStakeLedger {
    fn delegate(&mut self, _delegation: &Delegation, _denom: &str) -> StakingResult<()> {
        Ok(())
    }

    fn undelegate(&mut self, _delegation: &Delegation, _denom: &str) -> StakingResult<()> {
        Ok(())
    }
}
