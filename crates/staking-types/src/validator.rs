// staking-types/src/validator.rs

use crate::keys::{ConsensusAddress, ConsensusKey, OperatorAddress};
use crate::types::Power;
use serde::{Deserialize, Serialize};

/// Validator bonding status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondStatus {
    /// Not participating in consensus
    Unbonded,
    /// In the process of becoming bonded
    Bonding,
    /// Power counts toward active consensus weight
    Bonded,
    /// In the unbonding period after leaving the active set
    Unbonding,
}

/// Commission parameters (basis points, 0-10000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commission {
    pub rate_bps: u16,
    pub max_rate_bps: u16,
    pub max_change_rate_bps: u16,
}

impl Commission {
    pub fn new(rate_bps: u16, max_rate_bps: u16, max_change_rate_bps: u16) -> Self {
        Self {
            rate_bps: rate_bps.min(10000),
            max_rate_bps: max_rate_bps.min(10000),
            max_change_rate_bps: max_change_rate_bps.min(10000),
        }
    }
}

/// Descriptive validator metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub moniker: String,
    pub details: String,
}

/// Complete validator record.
///
/// Owned by the validator registry; mutated only through reconciler
/// operations. A validator absent from a compute batch has its power forced
/// to 0 but the record is retained, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validator {
    /// Operator address (registry key)
    pub operator: OperatorAddress,
    /// Consensus public key
    pub consensus_key: ConsensusKey,
    /// Current voting power
    pub power: Power,
    /// Bonding status
    pub status: BondStatus,
    /// Whether the validator is currently jailed
    pub jailed: bool,
    /// Descriptive metadata
    pub description: Description,
    /// Commission parameters
    pub commission: Commission,
    /// Minimum self-delegation in base units
    pub min_self_delegation: u64,
    /// Stake denomination this validator is bonded in
    pub bond_denom: String,
}

impl Validator {
    /// Create a new unbonded validator
    pub fn new(
        operator: OperatorAddress,
        consensus_key: ConsensusKey,
        power: Power,
        description: Description,
        commission: Commission,
        min_self_delegation: u64,
        bond_denom: String,
    ) -> Self {
        Self {
            operator,
            consensus_key,
            power,
            status: BondStatus::Unbonded,
            jailed: false,
            description,
            commission,
            min_self_delegation,
            bond_denom,
        }
    }

    /// Check if the validator's power counts toward consensus weight
    pub fn is_bonded(&self) -> bool {
        matches!(self.status, BondStatus::Bonded)
    }

    /// Consensus address of this validator's key
    pub fn cons_address(&self) -> ConsensusAddress {
        self.consensus_key.address()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_validator(power: Power) -> Validator {
        let key = ConsensusKey::new([3u8; 32]);
        Validator::new(
            key.operator_address(),
            key,
            power,
            Description::default(),
            Commission::new(1000, 2000, 100),
            1,
            "stake".to_string(),
        )
    }

    #[test]
    fn test_new_validator_starts_unbonded() {
        let validator = test_validator(10);
        assert_eq!(validator.status, BondStatus::Unbonded);
        assert!(!validator.is_bonded());
        assert!(!validator.jailed);
    }

    #[test]
    fn test_commission_clamped() {
        let commission = Commission::new(20000, 20000, 20000);
        assert_eq!(commission.rate_bps, 10000);
        assert_eq!(commission.max_rate_bps, 10000);
        assert_eq!(commission.max_change_rate_bps, 10000);
    }

    #[test]
    fn test_cons_address_matches_key() {
        let validator = test_validator(10);
        assert_eq!(validator.cons_address(), validator.consensus_key.address());
    }
}
