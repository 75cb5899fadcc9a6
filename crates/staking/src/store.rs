// staking/src/store.rs

use crate::power_index::{parse_power_index_key, power_index_key};
use crate::StakingResult;
use staking_types::{
    ConsensusAddress, Delegation, OperatorAddress, Power, SigningInfo, Validator,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Store abstraction for per-validator liveness state.
///
/// The missed-block bitmap is persisted per (address, window slot), so the
/// store never depends on the configured window length; the tracker only
/// ever touches slot `index_offset % signed_blocks_window`.
pub trait SigningStore {
    fn signing_info(&self, addr: &ConsensusAddress) -> StakingResult<Option<SigningInfo>>;

    fn set_signing_info(
        &mut self,
        addr: &ConsensusAddress,
        info: &SigningInfo,
    ) -> StakingResult<()>;

    /// Read the missed-block bit at `index`; unset bits read as false
    fn bitmap_bit(&self, addr: &ConsensusAddress, index: u64) -> StakingResult<bool>;

    fn set_bitmap_bit(
        &mut self,
        addr: &ConsensusAddress,
        index: u64,
        missed: bool,
    ) -> StakingResult<()>;

    /// Whether the validator behind `addr` is currently jailed.
    /// Addresses with no registered validator read as not jailed.
    fn is_jailed(&self, addr: &ConsensusAddress) -> StakingResult<bool>;
}

/// Durable map from validator identity to validator record
pub trait ValidatorRegistry {
    fn validator(&self, operator: &OperatorAddress) -> StakingResult<Option<Validator>>;

    fn validator_by_cons_addr(
        &self,
        addr: &ConsensusAddress,
    ) -> StakingResult<Option<Validator>>;

    fn set_validator(&mut self, validator: &Validator) -> StakingResult<()>;

    /// All validators in ascending operator-address order.
    ///
    /// This is the canonical iteration order; independently executing
    /// replicas must observe the same sequence to converge bit-identically.
    fn validators_sorted(&self) -> StakingResult<Vec<Validator>>;

    fn set_delegation(&mut self, delegation: &Delegation) -> StakingResult<()>;

    fn delegation(
        &self,
        delegator: &OperatorAddress,
        validator: &OperatorAddress,
    ) -> StakingResult<Option<Delegation>>;
}

/// Ordered structure keyed by (power, operator).
///
/// The key embeds the power, so a power change is a delete of the stale
/// entry followed by an insert under the new power. Zero-power validators
/// are not carried in the index.
pub trait PowerIndex {
    fn insert_power_index(&mut self, power: Power, operator: &OperatorAddress)
        -> StakingResult<()>;

    /// Delete the entry for (power, operator); deleting an absent entry is a no-op
    fn delete_power_index(&mut self, power: Power, operator: &OperatorAddress)
        -> StakingResult<()>;

    /// Operator addresses in descending power order, ascending address tiebreak
    fn validators_by_power(&self) -> StakingResult<Vec<OperatorAddress>>;
}

/// In-memory reference store backing the engine's tests and embedders that
/// hold staking state inside a larger transactional scope.
#[derive(Debug, Default)]
pub struct MemStakingStore {
    validators: BTreeMap<OperatorAddress, Validator>,
    cons_index: HashMap<ConsensusAddress, OperatorAddress>,
    signing_infos: HashMap<ConsensusAddress, SigningInfo>,
    bitmap: HashMap<ConsensusAddress, BTreeSet<u64>>,
    power_index: BTreeSet<Vec<u8>>,
    delegations: BTreeMap<(OperatorAddress, OperatorAddress), Delegation>,
}

impl MemStakingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered validators (including soft-removed ones)
    pub fn validator_count(&self) -> usize {
        self.validators.len()
    }
}

impl SigningStore for MemStakingStore {
    fn signing_info(&self, addr: &ConsensusAddress) -> StakingResult<Option<SigningInfo>> {
        Ok(self.signing_infos.get(addr).cloned())
    }

    fn set_signing_info(
        &mut self,
        addr: &ConsensusAddress,
        info: &SigningInfo,
    ) -> StakingResult<()> {
        self.signing_infos.insert(*addr, info.clone());
        Ok(())
    }

    fn bitmap_bit(&self, addr: &ConsensusAddress, index: u64) -> StakingResult<bool> {
        Ok(self
            .bitmap
            .get(addr)
            .map_or(false, |slots| slots.contains(&index)))
    }

    fn set_bitmap_bit(
        &mut self,
        addr: &ConsensusAddress,
        index: u64,
        missed: bool,
    ) -> StakingResult<()> {
        let slots = self.bitmap.entry(*addr).or_default();
        if missed {
            slots.insert(index);
        } else {
            slots.remove(&index);
        }
        Ok(())
    }

    fn is_jailed(&self, addr: &ConsensusAddress) -> StakingResult<bool> {
        Ok(self
            .cons_index
            .get(addr)
            .and_then(|operator| self.validators.get(operator))
            .map_or(false, |validator| validator.jailed))
    }
}

impl ValidatorRegistry for MemStakingStore {
    fn validator(&self, operator: &OperatorAddress) -> StakingResult<Option<Validator>> {
        Ok(self.validators.get(operator).cloned())
    }

    fn validator_by_cons_addr(
        &self,
        addr: &ConsensusAddress,
    ) -> StakingResult<Option<Validator>> {
        Ok(self
            .cons_index
            .get(addr)
            .and_then(|operator| self.validators.get(operator))
            .cloned())
    }

    fn set_validator(&mut self, validator: &Validator) -> StakingResult<()> {
        self.cons_index
            .insert(validator.cons_address(), validator.operator);
        self.validators.insert(validator.operator, validator.clone());
        Ok(())
    }

    fn validators_sorted(&self) -> StakingResult<Vec<Validator>> {
        Ok(self.validators.values().cloned().collect())
    }

    fn set_delegation(&mut self, delegation: &Delegation) -> StakingResult<()> {
        self.delegations.insert(
            (delegation.delegator, delegation.validator),
            delegation.clone(),
        );
        Ok(())
    }

    fn delegation(
        &self,
        delegator: &OperatorAddress,
        validator: &OperatorAddress,
    ) -> StakingResult<Option<Delegation>> {
        Ok(self.delegations.get(&(*delegator, *validator)).cloned())
    }
}

impl PowerIndex for MemStakingStore {
    fn insert_power_index(
        &mut self,
        power: Power,
        operator: &OperatorAddress,
    ) -> StakingResult<()> {
        self.power_index.insert(power_index_key(power, operator));
        Ok(())
    }

    fn delete_power_index(
        &mut self,
        power: Power,
        operator: &OperatorAddress,
    ) -> StakingResult<()> {
        self.power_index.remove(&power_index_key(power, operator));
        Ok(())
    }

    fn validators_by_power(&self) -> StakingResult<Vec<OperatorAddress>> {
        self.power_index
            .iter()
            .map(|key| parse_power_index_key(key).map(|(_, operator)| operator))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staking_types::{BondStatus, Commission, ConsensusKey, Description};

    fn test_validator(fill: u8, power: Power) -> Validator {
        let key = ConsensusKey::new([fill; 32]);
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
    fn test_validators_sorted_by_operator_address() {
        let mut store = MemStakingStore::new();
        for fill in [9u8, 1, 5] {
            store.set_validator(&test_validator(fill, 10)).unwrap();
        }

        let validators = store.validators_sorted().unwrap();
        let operators: Vec<_> = validators.iter().map(|v| v.operator).collect();
        let mut sorted = operators.clone();
        sorted.sort();
        assert_eq!(operators.len(), 3);
        assert_eq!(operators, sorted);
    }

    #[test]
    fn test_lookup_by_consensus_address() {
        let mut store = MemStakingStore::new();
        let validator = test_validator(4, 12);
        store.set_validator(&validator).unwrap();

        let found = store
            .validator_by_cons_addr(&validator.cons_address())
            .unwrap()
            .unwrap();
        assert_eq!(found.operator, validator.operator);
    }

    #[test]
    fn test_jailed_lookup() {
        let mut store = MemStakingStore::new();
        let mut validator = test_validator(4, 12);
        validator.jailed = true;
        store.set_validator(&validator).unwrap();

        assert!(store.is_jailed(&validator.cons_address()).unwrap());
        // unknown addresses read as not jailed
        let unknown = ConsensusKey::new([0xaa; 32]).address();
        assert!(!store.is_jailed(&unknown).unwrap());
    }

    #[test]
    fn test_bitmap_bits() {
        let mut store = MemStakingStore::new();
        let addr = ConsensusKey::new([7; 32]).address();

        assert!(!store.bitmap_bit(&addr, 3).unwrap());
        store.set_bitmap_bit(&addr, 3, true).unwrap();
        assert!(store.bitmap_bit(&addr, 3).unwrap());
        store.set_bitmap_bit(&addr, 3, false).unwrap();
        assert!(!store.bitmap_bit(&addr, 3).unwrap());
    }

    #[test]
    fn test_power_index_ranking() {
        let mut store = MemStakingStore::new();
        let low = test_validator(1, 5);
        let high = test_validator(2, 50);
        store.insert_power_index(5, &low.operator).unwrap();
        store.insert_power_index(50, &high.operator).unwrap();

        let ranked = store.validators_by_power().unwrap();
        assert_eq!(ranked, vec![high.operator, low.operator]);

        store.delete_power_index(50, &high.operator).unwrap();
        assert_eq!(store.validators_by_power().unwrap(), vec![low.operator]);
    }

    #[test]
    fn test_delete_absent_power_index_is_noop() {
        let mut store = MemStakingStore::new();
        let validator = test_validator(1, 5);
        store.delete_power_index(0, &validator.operator).unwrap();
        assert!(store.validators_by_power().unwrap().is_empty());
    }

    #[test]
    fn test_delegation_roundtrip() {
        let mut store = MemStakingStore::new();
        let validator = test_validator(3, 9);
        let delegation = Delegation::new(validator.operator, validator.operator, 9);
        store.set_delegation(&delegation).unwrap();

        let found = store
            .delegation(&validator.operator, &validator.operator)
            .unwrap()
            .unwrap();
        assert_eq!(found.shares, 9);
        assert!(found.is_self_delegation());
    }

    #[test]
    fn test_set_validator_overwrites() {
        let mut store = MemStakingStore::new();
        let mut validator = test_validator(3, 9);
        store.set_validator(&validator).unwrap();

        validator.power = 0;
        validator.status = BondStatus::Unbonding;
        store.set_validator(&validator).unwrap();

        let found = store.validator(&validator.operator).unwrap().unwrap();
        assert_eq!(found.power, 0);
        assert_eq!(found.status, BondStatus::Unbonding);
        assert_eq!(store.validator_count(), 1);
    }
}
