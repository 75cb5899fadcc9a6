// staking-types/src/keys.rs

use crate::{TypesError, TypesResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Address size in bytes
pub const ADDRESS_SIZE: usize = 20;

/// Consensus key size in bytes
pub const KEY_SIZE: usize = 32;

/// A validator's consensus public key.
///
/// Opaque identity bytes: this core never verifies signatures, it only keys
/// state by the consensus key and derives addresses from it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsensusKey([u8; KEY_SIZE]);

impl ConsensusKey {
    /// Create a consensus key from bytes
    pub fn new(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create a consensus key from a slice (returns error if wrong length)
    pub fn from_slice(slice: &[u8]) -> TypesResult<Self> {
        if slice.len() != KEY_SIZE {
            return Err(TypesError::InvalidKey);
        }
        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> TypesResult<Self> {
        let bytes = hex::decode(s).map_err(|e| TypesError::DeserializationError(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Derive the consensus address for this key
    pub fn address(&self) -> ConsensusAddress {
        ConsensusAddress(derive_address(&self.0))
    }

    /// Derive the operator address for this key.
    ///
    /// New validators bootstrapped from a compute result have no separately
    /// registered operator, so the operator address is derived from the
    /// consensus key the same way the consensus address is.
    pub fn operator_address(&self) -> OperatorAddress {
        OperatorAddress(derive_address(&self.0))
    }
}

impl fmt::Debug for ConsensusKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConsensusKey({}...)", hex::encode(&self.0[..8]))
    }
}

/// A validator's consensus address, derived from its consensus key
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConsensusAddress([u8; ADDRESS_SIZE]);

impl ConsensusAddress {
    /// Create an address from bytes
    pub fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create an address from a slice (returns error if wrong length)
    pub fn from_slice(slice: &[u8]) -> TypesResult<Self> {
        if slice.len() != ADDRESS_SIZE {
            return Err(TypesError::InvalidAddress);
        }
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> TypesResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypesError::DeserializationError(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; ADDRESS_SIZE])
    }
}

impl fmt::Debug for ConsensusAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConsensusAddress({})", self.to_hex())
    }
}

/// A validator's operator address.
///
/// Operator addresses key the validator registry; their ascending byte order
/// is the canonical iteration order for deterministic replication.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperatorAddress([u8; ADDRESS_SIZE]);

impl OperatorAddress {
    /// Create an address from bytes
    pub fn new(bytes: [u8; ADDRESS_SIZE]) -> Self {
        Self(bytes)
    }

    /// Create an address from a slice (returns error if wrong length)
    pub fn from_slice(slice: &[u8]) -> TypesResult<Self> {
        if slice.len() != ADDRESS_SIZE {
            return Err(TypesError::InvalidAddress);
        }
        let mut bytes = [0u8; ADDRESS_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_SIZE] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn from_hex(s: &str) -> TypesResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypesError::DeserializationError(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; ADDRESS_SIZE])
    }
}

impl fmt::Debug for OperatorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OperatorAddress({})", self.to_hex())
    }
}

/// Derive a 20-byte address from key bytes (last 20 bytes of SHA-256)
fn derive_address(key: &[u8; KEY_SIZE]) -> [u8; ADDRESS_SIZE] {
    let digest = Sha256::digest(key);
    let mut address = [0u8; ADDRESS_SIZE];
    address.copy_from_slice(&digest[12..32]);
    address
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key(fill: u8) -> ConsensusKey {
        ConsensusKey::new([fill; KEY_SIZE])
    }

    #[test]
    fn test_address_derivation_deterministic() {
        let key = test_key(7);
        assert_eq!(key.address(), key.address());
        assert_eq!(
            key.address().as_bytes(),
            key.operator_address().as_bytes()
        );
    }

    #[test]
    fn test_distinct_keys_distinct_addresses() {
        assert_ne!(test_key(1).address(), test_key(2).address());
    }

    #[test]
    fn test_hex_roundtrip() {
        let key = test_key(9);
        assert_eq!(ConsensusKey::from_hex(&key.to_hex()).unwrap(), key);

        let addr = key.operator_address();
        assert_eq!(OperatorAddress::from_hex(&addr.to_hex()).unwrap(), addr);
    }

    #[test]
    fn test_invalid_lengths_rejected() {
        assert!(ConsensusKey::from_slice(&[0u8; 31]).is_err());
        assert!(OperatorAddress::from_slice(&[0u8; 19]).is_err());
        assert!(ConsensusAddress::from_hex("0xdeadbeef").is_err());
    }

    #[test]
    fn test_operator_address_ordering_is_byte_order() {
        let low = OperatorAddress::new([0u8; ADDRESS_SIZE]);
        let high = OperatorAddress::new([0xff; ADDRESS_SIZE]);
        assert!(low < high);
    }
}
