// staking/src/hooks.rs

use staking_types::{Delegation, LivenessEvent, Validator};

/// Extension point for reacting to staking state transitions.
///
/// Supplied optionally at construction time; every method defaults to a
/// no-op, so implementors override only the transitions they care about.
pub trait StakingHooks: Send + Sync {
    fn after_validator_created(&self, _validator: &Validator) {}
    fn after_validator_bonded(&self, _validator: &Validator) {}
    fn after_delegation_modified(&self, _delegation: &Delegation) {}
    fn on_validator_missed_block(&self, _event: &LivenessEvent) {}
}

/// No-op hooks for embedders that need a concrete type
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpHooks;

impl StakingHooks for NoOpHooks {}
