// staking-store/src/db.rs

use crate::{StoreError, StoreResult};
use rocksdb::{IteratorMode, Options, WriteBatch, DB};
use serde::{de::DeserializeOwned, Serialize};
use staking::power_index::{parse_power_index_key, power_index_key};
use staking::{PowerIndex, SigningStore, StakingResult, ValidatorRegistry};
use staking_types::{
    ConsensusAddress, Delegation, OperatorAddress, Power, PowerUpdate, SigningInfo, Validator,
};
use std::sync::Arc;

/// Column families for different record types
#[derive(Debug, Clone, Copy)]
pub enum ColumnFamily {
    Validators,
    ConsAddrIndex,
    SigningInfo,
    MissedBitmap,
    PowerIndex,
    Delegations,
    Meta,
}

impl ColumnFamily {
    fn as_str(&self) -> &'static str {
        match self {
            ColumnFamily::Validators => "validators",
            ColumnFamily::ConsAddrIndex => "cons_addr_index",
            ColumnFamily::SigningInfo => "signing_info",
            ColumnFamily::MissedBitmap => "missed_bitmap",
            ColumnFamily::PowerIndex => "power_index",
            ColumnFamily::Delegations => "delegations",
            ColumnFamily::Meta => "meta",
        }
    }

    fn all() -> Vec<Self> {
        vec![
            Self::Validators,
            Self::ConsAddrIndex,
            Self::SigningInfo,
            Self::MissedBitmap,
            Self::PowerIndex,
            Self::Delegations,
            Self::Meta,
        ]
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
    pub create_if_missing: bool,
    pub max_open_files: i32,
    pub write_buffer_size: usize,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "./data".to_string(),
            create_if_missing: true,
            max_open_files: 1024,
            write_buffer_size: 64 * 1024 * 1024, // 64 MB
        }
    }
}

/// Durable staking store
pub struct StakingDb {
    db: Arc<DB>,
}

impl StakingDb {
    /// Open or create the database
    pub fn open(config: DatabaseConfig) -> StoreResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(config.create_if_missing);
        opts.create_missing_column_families(true);
        opts.set_max_open_files(config.max_open_files);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.increase_parallelism(num_cpus::get() as i32);

        let cfs: Vec<_> = ColumnFamily::all().iter().map(|cf| cf.as_str()).collect();

        let db = DB::open_cf(&opts, &config.path, &cfs)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;

        tracing::info!("Staking database opened at {}", config.path);

        Ok(Self { db: Arc::new(db) })
    }

    // ==================== META OPERATIONS ====================

    /// Total power of the validator set as of the last processed block
    pub fn last_total_power(&self) -> StoreResult<Power> {
        Ok(self
            .get::<Power>(ColumnFamily::Meta, b"last_total_power")?
            .unwrap_or(0))
    }

    pub fn set_last_total_power(&self, power: Power) -> StoreResult<()> {
        self.put(ColumnFamily::Meta, b"last_total_power", &power)
    }

    /// The validator-set delta persisted for the current block
    pub fn validator_updates(&self) -> StoreResult<Vec<PowerUpdate>> {
        Ok(self
            .get::<Vec<PowerUpdate>>(ColumnFamily::Meta, b"validator_updates")?
            .unwrap_or_default())
    }

    pub fn set_validator_updates(&self, updates: &[PowerUpdate]) -> StoreResult<()> {
        self.put(ColumnFamily::Meta, b"validator_updates", &updates.to_vec())
    }

    // ==================== UTILITY HELPERS ====================

    fn get<T: DeserializeOwned>(&self, cf: ColumnFamily, key: &[u8]) -> StoreResult<Option<T>> {
        match self
            .db
            .get_cf(self.cf(cf)?, key)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?
        {
            Some(bytes) => {
                let value = bincode::deserialize(&bytes)
                    .map_err(|e| StoreError::SerializationError(e.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, cf: ColumnFamily, key: &[u8], value: &T) -> StoreResult<()> {
        let bytes =
            bincode::serialize(value).map_err(|e| StoreError::SerializationError(e.to_string()))?;
        self.db
            .put_cf(self.cf(cf)?, key, bytes)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }

    fn delete(&self, cf: ColumnFamily, key: &[u8]) -> StoreResult<()> {
        self.db
            .delete_cf(self.cf(cf)?, key)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))
    }

    /// Get column family handle
    fn cf(&self, cf_type: ColumnFamily) -> StoreResult<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(cf_type.as_str())
            .ok_or_else(|| StoreError::DatabaseError(format!("{} CF not found", cf_type.as_str())))
    }

    /// Key for one missed-block bitmap slot: address followed by the slot index
    fn bitmap_key(addr: &ConsensusAddress, index: u64) -> Vec<u8> {
        let mut key = Vec::with_capacity(28);
        key.extend_from_slice(addr.as_bytes());
        key.extend_from_slice(&index.to_be_bytes());
        key
    }

    /// Key for a delegation: delegator followed by validator address
    fn delegation_key(delegator: &OperatorAddress, validator: &OperatorAddress) -> Vec<u8> {
        let mut key = Vec::with_capacity(40);
        key.extend_from_slice(delegator.as_bytes());
        key.extend_from_slice(validator.as_bytes());
        key
    }
}

impl SigningStore for StakingDb {
    fn signing_info(&self, addr: &ConsensusAddress) -> StakingResult<Option<SigningInfo>> {
        Ok(self.get(ColumnFamily::SigningInfo, addr.as_bytes())?)
    }

    fn set_signing_info(
        &mut self,
        addr: &ConsensusAddress,
        info: &SigningInfo,
    ) -> StakingResult<()> {
        Ok(self.put(ColumnFamily::SigningInfo, addr.as_bytes(), info)?)
    }

    fn bitmap_bit(&self, addr: &ConsensusAddress, index: u64) -> StakingResult<bool> {
        Ok(self
            .get::<bool>(ColumnFamily::MissedBitmap, &Self::bitmap_key(addr, index))?
            .unwrap_or(false))
    }

    fn set_bitmap_bit(
        &mut self,
        addr: &ConsensusAddress,
        index: u64,
        missed: bool,
    ) -> StakingResult<()> {
        let key = Self::bitmap_key(addr, index);
        if missed {
            Ok(self.put(ColumnFamily::MissedBitmap, &key, &true)?)
        } else {
            // absent slots read as false
            Ok(self.delete(ColumnFamily::MissedBitmap, &key)?)
        }
    }

    fn is_jailed(&self, addr: &ConsensusAddress) -> StakingResult<bool> {
        Ok(self
            .validator_by_cons_addr(addr)?
            .map_or(false, |validator| validator.jailed))
    }
}

impl ValidatorRegistry for StakingDb {
    fn validator(&self, operator: &OperatorAddress) -> StakingResult<Option<Validator>> {
        Ok(self.get(ColumnFamily::Validators, operator.as_bytes())?)
    }

    fn validator_by_cons_addr(
        &self,
        addr: &ConsensusAddress,
    ) -> StakingResult<Option<Validator>> {
        let operator: Option<OperatorAddress> =
            self.get(ColumnFamily::ConsAddrIndex, addr.as_bytes())?;
        match operator {
            Some(operator) => self.validator(&operator),
            None => Ok(None),
        }
    }

    fn set_validator(&mut self, validator: &Validator) -> StakingResult<()> {
        let validator_bytes = bincode::serialize(validator)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;
        let operator_bytes = bincode::serialize(&validator.operator)
            .map_err(|e| StoreError::SerializationError(e.to_string()))?;

        let cf_validators = self.cf(ColumnFamily::Validators)?;
        let cf_index = self.cf(ColumnFamily::ConsAddrIndex)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(cf_validators, validator.operator.as_bytes(), &validator_bytes);
        batch.put_cf(
            cf_index,
            validator.cons_address().as_bytes(),
            &operator_bytes,
        );

        self.db
            .write(batch)
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn validators_sorted(&self) -> StakingResult<Vec<Validator>> {
        let cf = self.cf(ColumnFamily::Validators)?;
        let mut validators = Vec::new();

        // operator-address keys: ascending byte order is the canonical order
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);
        for item in iter {
            let (_key, value) = item.map_err(|e| StoreError::DatabaseError(e.to_string()))?;
            let validator = bincode::deserialize(&value)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?;
            validators.push(validator);
        }

        Ok(validators)
    }

    fn set_delegation(&mut self, delegation: &Delegation) -> StakingResult<()> {
        let key = Self::delegation_key(&delegation.delegator, &delegation.validator);
        Ok(self.put(ColumnFamily::Delegations, &key, delegation)?)
    }

    fn delegation(
        &self,
        delegator: &OperatorAddress,
        validator: &OperatorAddress,
    ) -> StakingResult<Option<Delegation>> {
        let key = Self::delegation_key(delegator, validator);
        Ok(self.get(ColumnFamily::Delegations, &key)?)
    }
}

impl PowerIndex for StakingDb {
    fn insert_power_index(
        &mut self,
        power: Power,
        operator: &OperatorAddress,
    ) -> StakingResult<()> {
        let key = power_index_key(power, operator);
        // the key carries all the information; the value is empty
        self.db
            .put_cf(self.cf(ColumnFamily::PowerIndex)?, &key, b"")
            .map_err(|e| StoreError::DatabaseError(e.to_string()))?;
        Ok(())
    }

    fn delete_power_index(
        &mut self,
        power: Power,
        operator: &OperatorAddress,
    ) -> StakingResult<()> {
        Ok(self.delete(ColumnFamily::PowerIndex, &power_index_key(power, operator))?)
    }

    fn validators_by_power(&self) -> StakingResult<Vec<OperatorAddress>> {
        let cf = self.cf(ColumnFamily::PowerIndex)?;
        let mut operators = Vec::new();

        // complemented power prefix: forward scan yields descending power
        let iter = self.db.iterator_cf(cf, IteratorMode::Start);
        for item in iter {
            let (key, _value) = item.map_err(|e| StoreError::DatabaseError(e.to_string()))?;
            let (_power, operator) = parse_power_index_key(&key)?;
            operators.push(operator);
        }

        Ok(operators)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use staking::{power_updates, Params, SigningWindowTracker, ValidatorReconciler};
    use staking_types::{BlockIdFlag, Commission, ComputeResult, ConsensusKey, Description};
    use tempfile::TempDir;

    fn create_test_db() -> (StakingDb, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            path: temp_dir.path().to_str().unwrap().to_string(),
            ..Default::default()
        };
        let db = StakingDb::open(config).unwrap();
        (db, temp_dir)
    }

    fn key(fill: u8) -> ConsensusKey {
        ConsensusKey::new([fill; 32])
    }

    fn test_validator(fill: u8, power: Power) -> Validator {
        let key = key(fill);
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
    fn test_signing_info_roundtrip() {
        let (mut db, _temp) = create_test_db();
        let addr = key(1).address();

        assert!(db.signing_info(&addr).unwrap().is_none());

        let mut info = SigningInfo::new(10);
        info.index_offset = 4;
        info.missed_blocks_counter = 2;
        db.set_signing_info(&addr, &info).unwrap();

        assert_eq!(db.signing_info(&addr).unwrap().unwrap(), info);
    }

    #[test]
    fn test_bitmap_bits() {
        let (mut db, _temp) = create_test_db();
        let addr = key(2).address();

        assert!(!db.bitmap_bit(&addr, 0).unwrap());
        db.set_bitmap_bit(&addr, 0, true).unwrap();
        assert!(db.bitmap_bit(&addr, 0).unwrap());
        db.set_bitmap_bit(&addr, 0, false).unwrap();
        assert!(!db.bitmap_bit(&addr, 0).unwrap());

        // slots are independent per address
        db.set_bitmap_bit(&addr, 7, true).unwrap();
        assert!(!db.bitmap_bit(&key(3).address(), 7).unwrap());
    }

    #[test]
    fn test_validators_sorted_scan() {
        let (mut db, _temp) = create_test_db();
        for fill in [9u8, 1, 5] {
            db.set_validator(&test_validator(fill, 10)).unwrap();
        }

        let validators = db.validators_sorted().unwrap();
        let operators: Vec<_> = validators.iter().map(|v| v.operator).collect();
        let mut sorted = operators.clone();
        sorted.sort();
        assert_eq!(operators.len(), 3);
        assert_eq!(operators, sorted);
    }

    #[test]
    fn test_jailed_through_cons_index() {
        let (mut db, _temp) = create_test_db();
        let mut validator = test_validator(4, 12);
        validator.jailed = true;
        db.set_validator(&validator).unwrap();

        assert!(db.is_jailed(&validator.cons_address()).unwrap());
        assert!(!db.is_jailed(&key(9).address()).unwrap());
    }

    #[test]
    fn test_power_index_ordering() {
        let (mut db, _temp) = create_test_db();
        let low = test_validator(1, 3);
        let high = test_validator(2, 30);

        db.insert_power_index(3, &low.operator).unwrap();
        db.insert_power_index(30, &high.operator).unwrap();
        assert_eq!(
            db.validators_by_power().unwrap(),
            vec![high.operator, low.operator]
        );

        db.delete_power_index(30, &high.operator).unwrap();
        assert_eq!(db.validators_by_power().unwrap(), vec![low.operator]);
    }

    #[test]
    fn test_meta_operations() {
        let (db, _temp) = create_test_db();

        assert_eq!(db.last_total_power().unwrap(), 0);
        db.set_last_total_power(17).unwrap();
        assert_eq!(db.last_total_power().unwrap(), 17);

        assert!(db.validator_updates().unwrap().is_empty());
        let updates = vec![PowerUpdate {
            consensus_key: key(1),
            power: 17,
        }];
        db.set_validator_updates(&updates).unwrap();
        assert_eq!(db.validator_updates().unwrap(), updates);
    }

    #[test]
    fn test_reconcile_against_durable_store() {
        let (mut db, _temp) = create_test_db();
        let mut reconciler = ValidatorReconciler::new(&Params::default());

        let batch = vec![
            ComputeResult::new(10, key(1), "val-1"),
            ComputeResult::new(5, key(2), "val-2"),
        ];
        reconciler.reconcile(&mut db, &batch).unwrap();

        let batch = vec![
            ComputeResult::new(7, key(1), "val-1"),
            ComputeResult::new(3, key(3), "val-3"),
        ];
        let validators = reconciler.reconcile(&mut db, &batch).unwrap();

        assert_eq!(validators.len(), 3);
        let removed = db
            .validator(&key(2).operator_address())
            .unwrap()
            .unwrap();
        assert_eq!(removed.power, 0);

        let updates = power_updates(&validators);
        assert_eq!(updates.len(), 2);
        db.set_validator_updates(&updates).unwrap();
        assert_eq!(db.validator_updates().unwrap(), updates);
    }

    #[test]
    fn test_liveness_against_durable_store() {
        use BlockIdFlag::{Absent, Commit};

        let (mut db, _temp) = create_test_db();
        let tracker = SigningWindowTracker::new(&Params {
            signed_blocks_window: 4,
            ..Default::default()
        });
        let addr = key(1).address();

        for (height, flag) in [Commit, Absent, Absent, Commit].into_iter().enumerate() {
            tracker
                .handle_block_signature(&mut db, &addr, 10, flag, height as u64 + 1)
                .unwrap();
        }

        let info = db.signing_info(&addr).unwrap().unwrap();
        assert_eq!(info.index_offset, 4);
        assert_eq!(info.missed_blocks_counter, 2);
        assert!(db.bitmap_bit(&addr, 1).unwrap());
        assert!(db.bitmap_bit(&addr, 2).unwrap());
    }

    #[test]
    fn test_state_survives_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let config = DatabaseConfig {
            path: temp_dir.path().to_str().unwrap().to_string(),
            ..Default::default()
        };

        {
            let mut db = StakingDb::open(config.clone()).unwrap();
            db.set_validator(&test_validator(1, 10)).unwrap();
            db.set_last_total_power(10).unwrap();
        }

        let db = StakingDb::open(config).unwrap();
        let validator = db.validator(&key(1).operator_address()).unwrap().unwrap();
        assert_eq!(validator.power, 10);
        assert_eq!(db.last_total_power().unwrap(), 10);
    }
}
