// staking-types/src/delegation.rs

use crate::keys::OperatorAddress;
use serde::{Deserialize, Serialize};

/// A delegation of stake shares to a validator.
///
/// New validators bootstrapped from a compute result receive a
/// self-delegation whose shares equal their assigned power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub delegator: OperatorAddress,
    pub validator: OperatorAddress,
    pub shares: u64,
}

impl Delegation {
    pub fn new(delegator: OperatorAddress, validator: OperatorAddress, shares: u64) -> Self {
        Self {
            delegator,
            validator,
            shares,
        }
    }

    /// Whether the delegator is the validator's own operator
    pub fn is_self_delegation(&self) -> bool {
        self.delegator == self.validator
    }
}
