use alloy::primitives::{Address, Bytes, FixedBytes, B256};

use crate::error::Error;

/// A convenience function which encodes a given EVM type into a sized, lowercase hex string.
pub trait ToLowerHex {
    /// Encodes `self` as `0x`-prefixed lowercase hex.
    fn to_lower_hex(&self) -> String;
}

impl ToLowerHex for Bytes {
    fn to_lower_hex(&self) -> String {
        format!("{self:#x}")
    }
}

impl ToLowerHex for FixedBytes<4> {
    fn to_lower_hex(&self) -> String {
        format!("{self:#x}")
    }
}

impl ToLowerHex for FixedBytes<32> {
    fn to_lower_hex(&self) -> String {
        format!("{self:#x}")
    }
}

impl ToLowerHex for Address {
    fn to_lower_hex(&self) -> String {
        format!("{self:#x}")
    }
}

/// Parses a transaction hash, which must be `0x` followed by exactly 64 hex digits.
///
/// ```
/// use txlens_common::utils::hex::parse_tx_hash;
///
/// assert!(parse_tx_hash(&format!("0x{}", "Ab".repeat(32))).is_ok());
/// assert!(parse_tx_hash("0x1234").is_err());
/// ```
pub fn parse_tx_hash(hash: &str) -> Result<B256, Error> {
    let digits = hash
        .strip_prefix("0x")
        .filter(|digits| digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or_else(|| Error::InvalidHash(hash.to_string()))?;

    digits.parse::<B256>().map_err(|_| Error::InvalidHash(hash.to_string()))
}
