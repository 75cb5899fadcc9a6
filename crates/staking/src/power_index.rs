// staking/src/power_index.rs

use crate::{StakingError, StakingResult};
use staking_types::keys::ADDRESS_SIZE;
use staking_types::{OperatorAddress, Power};

/// Length of a power index key: 8-byte power prefix + 20-byte operator address
pub const POWER_INDEX_KEY_LEN: usize = 8 + ADDRESS_SIZE;

/// Encode a power index key for (power, operator).
///
/// The power prefix is stored complemented, so ascending byte order over the
/// keys yields descending power with ascending operator address as the
/// tiebreak. The key embeds the power, so a power change is always a delete
/// of the stale key followed by an insert under the new one.
pub fn power_index_key(power: Power, operator: &OperatorAddress) -> Vec<u8> {
    let mut key = Vec::with_capacity(POWER_INDEX_KEY_LEN);
    key.extend_from_slice(&(!power).to_be_bytes());
    key.extend_from_slice(operator.as_bytes());
    key
}

/// Decode a power index key back into (power, operator)
pub fn parse_power_index_key(key: &[u8]) -> StakingResult<(Power, OperatorAddress)> {
    if key.len() != POWER_INDEX_KEY_LEN {
        return Err(StakingError::Store(format!(
            "invalid power index key length: {}",
            key.len()
        )));
    }
    let mut power_bytes = [0u8; 8];
    power_bytes.copy_from_slice(&key[..8]);
    let power = !Power::from_be_bytes(power_bytes);
    let operator = OperatorAddress::from_slice(&key[8..])?;
    Ok((power, operator))
}
