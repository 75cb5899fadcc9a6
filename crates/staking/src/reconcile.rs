// staking/src/reconcile.rs

use crate::hooks::StakingHooks;
use crate::ledger::{NoOpStakeLedger, StakeLedger};
use crate::params::Params;
use crate::store::{PowerIndex, ValidatorRegistry};
use crate::{StakingError, StakingResult};
use staking_types::{
    BondStatus, Commission, ComputeResult, ConsensusKey, Delegation, Description, PowerUpdate,
    Validator,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Default commission rate for bootstrapped validators (10%)
pub const DEFAULT_COMMISSION_RATE_BPS: u16 = 1000;
/// Default maximum commission rate (20%)
pub const DEFAULT_COMMISSION_MAX_RATE_BPS: u16 = 2000;
/// Default maximum daily commission change (1%)
pub const DEFAULT_COMMISSION_MAX_CHANGE_BPS: u16 = 100;
/// Default minimum self-delegation in base units
pub const DEFAULT_MIN_SELF_DELEGATION: u64 = 1;

/// How the reconciler treats invalid records inside a batch.
///
/// Operational failures (store reads/writes, index maintenance) abort the
/// whole batch in either mode; the mode only governs validation anomalies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileMode {
    /// Log and skip invalid records (zero-power new entrants, duplicate keys)
    #[default]
    BestEffort,
    /// Abort the whole batch on the first invalid record
    Strict,
}

/// Converges the durable validator set toward an externally supplied power
/// assignment: update, soft-removal, creation, bonding and self-delegation.
///
/// Iteration is canonical in both passes (registered validators by ascending
/// operator address, new entrants by ascending consensus key), so
/// independently executing replicas converge to bit-identical state.
pub struct ValidatorReconciler {
    bond_denom: String,
    mode: ReconcileMode,
    hooks: Option<Arc<dyn StakingHooks>>,
    ledger: Box<dyn StakeLedger>,
}

impl ValidatorReconciler {
    pub fn new(params: &Params) -> Self {
        Self {
            bond_denom: params.bond_denom.clone(),
            mode: ReconcileMode::default(),
            hooks: None,
            ledger: Box::new(NoOpStakeLedger),
        }
    }

    pub fn with_mode(mut self, mode: ReconcileMode) -> Self {
        self.mode = mode;
        self
    }

    /// Attach an extension point receiving creation/bonding/delegation events
    pub fn with_hooks(mut self, hooks: Arc<dyn StakingHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Swap the stake-custody capability (defaults to the no-op ledger)
    pub fn with_ledger(mut self, ledger: Box<dyn StakeLedger>) -> Self {
        self.ledger = ledger;
        self
    }

    /// Apply one epoch's power assignment to the validator set.
    ///
    /// Registered validators matched by consensus key are moved to their
    /// desired power; validators absent from the batch are soft-removed
    /// (power forced to 0, record retained); remaining entries bootstrap new
    /// bonded validators with a self-delegation. Returns the full, current
    /// validator set in canonical order.
    pub fn reconcile<S: ValidatorRegistry + PowerIndex>(
        &mut self,
        store: &mut S,
        results: &[ComputeResult],
    ) -> StakingResult<Vec<Validator>> {
        // desired power by consensus key, last write wins
        let mut desired: BTreeMap<ConsensusKey, &ComputeResult> = BTreeMap::new();
        for result in results {
            if desired.contains_key(&result.consensus_key) {
                if self.mode == ReconcileMode::Strict {
                    return Err(StakingError::DuplicateComputeKey(
                        result.consensus_key.to_hex(),
                    ));
                }
                tracing::warn!(
                    "duplicate compute result for key {}, keeping the later entry",
                    result.consensus_key.to_hex()
                );
            }
            desired.insert(result.consensus_key, result);
        }

        // update or soft-remove every registered validator, canonical order
        for mut validator in store.validators_sorted()? {
            match desired.remove(&validator.consensus_key) {
                Some(result) => {
                    tracing::info!(
                        "updating validator {} to power {}",
                        validator.operator.to_hex(),
                        result.power
                    );
                    store.delete_power_index(validator.power, &validator.operator)?;
                    validator.power = result.power;
                    if validator.power > 0 {
                        store.insert_power_index(validator.power, &validator.operator)?;
                    }
                    store.set_validator(&validator)?;
                }
                None => {
                    tracing::info!(
                        "removing validator {} from the active set",
                        validator.operator.to_hex()
                    );
                    store.delete_power_index(validator.power, &validator.operator)?;
                    validator.power = 0;
                    store.set_validator(&validator)?;
                }
            }
        }

        // bootstrap the entries that matched no registered validator,
        // canonical (consensus-key) order
        for (consensus_key, result) in desired {
            if result.power == 0 {
                if self.mode == ReconcileMode::Strict {
                    return Err(StakingError::ZeroPowerEntrant(consensus_key.to_hex()));
                }
                tracing::warn!(
                    "skipping zero-power compute result for unknown validator {}",
                    consensus_key.to_hex()
                );
                continue;
            }
            self.create_validator(store, result)?;
        }

        store.validators_sorted()
    }

    /// Create, bond and self-delegate a new validator from one compute result
    fn create_validator<S: ValidatorRegistry + PowerIndex>(
        &mut self,
        store: &mut S,
        result: &ComputeResult,
    ) -> StakingResult<Validator> {
        let operator = result.consensus_key.operator_address();
        tracing::info!(
            "creating validator {} ({}) with power {}",
            operator.to_hex(),
            result.operator,
            result.power
        );

        let validator = Validator::new(
            operator,
            result.consensus_key,
            result.power,
            Description {
                moniker: result.operator.clone(),
                details: "Created from compute result".to_string(),
            },
            Commission::new(
                DEFAULT_COMMISSION_RATE_BPS,
                DEFAULT_COMMISSION_MAX_RATE_BPS,
                DEFAULT_COMMISSION_MAX_CHANGE_BPS,
            ),
            DEFAULT_MIN_SELF_DELEGATION,
            self.bond_denom.clone(),
        );
        store.set_validator(&validator)?;
        store.insert_power_index(validator.power, &operator)?;
        if let Some(hooks) = &self.hooks {
            hooks.after_validator_created(&validator);
        }

        let validator = self.bond_validator(store, validator)?;

        let delegation = Delegation::new(operator, operator, result.power);
        self.ledger.delegate(&delegation, &self.bond_denom)?;
        store.set_delegation(&delegation)?;
        if let Some(hooks) = &self.hooks {
            hooks.after_delegation_modified(&delegation);
        }

        Ok(validator)
    }

    /// Move a freshly created validator into the bonded set
    fn bond_validator<S: ValidatorRegistry>(
        &self,
        store: &mut S,
        mut validator: Validator,
    ) -> StakingResult<Validator> {
        validator.status = BondStatus::Bonded;
        store.set_validator(&validator)?;
        if let Some(hooks) = &self.hooks {
            hooks.after_validator_bonded(&validator);
        }
        Ok(validator)
    }
}

/// The validator-set delta for the consensus engine.
///
/// Zero-power validators are excluded; their absence at power 0 is what
/// removes them from the replicated active set.
pub fn power_updates(validators: &[Validator]) -> Vec<PowerUpdate> {
    validators
        .iter()
        .filter(|validator| validator.power > 0)
        .map(|validator| PowerUpdate {
            consensus_key: validator.consensus_key,
            power: validator.power,
        })
        .collect()
}
