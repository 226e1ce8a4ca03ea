//! Type-safe account and asset address.
//!
//! [`Address`] is a 20-byte identifier written as `0x` followed by 40 hex
//! digits. Both pool assets and counterparties (funders, borrowers) are
//! addressed this way.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::GatewayError;

/// Number of bytes in an address.
pub const ADDRESS_LEN: usize = 20;

/// 20-byte account or asset identifier.
///
/// Used as the dictionary key in [`super::PoolLedger`] and
/// [`crate::borrower::BorrowerRegistry`], as the event discriminator, and as
/// the WebSocket subscription target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The all-zero address.
    pub const ZERO: Self = Self([0u8; ADDRESS_LEN]);

    /// Creates an address from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Returns `true` for the all-zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// Parses an address that must identify an asset.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidAddress`] if the string is malformed
    /// and [`GatewayError::InvalidAsset`] for the zero address.
    pub fn parse_asset(s: &str) -> Result<Self, GatewayError> {
        let address: Self = s.parse()?;
        if address.is_zero() {
            return Err(GatewayError::InvalidAsset(address));
        }
        Ok(address)
    }
}

impl FromStr for Address {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| GatewayError::InvalidAddress(format!("{s}: missing 0x prefix")))?;

        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|e| GatewayError::InvalidAddress(format!("{s}: {e}")))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const TOKEN: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

    #[test]
    fn parse_and_display_round_trip() {
        let Ok(address) = TOKEN.parse::<Address>() else {
            panic!("valid address");
        };
        assert_eq!(address.to_string(), TOKEN);
    }

    #[test]
    fn display_is_lowercase_hex() {
        let Ok(address) = "0x5FBDB2315678AFECB367F032D93F642F64180AA3".parse::<Address>() else {
            panic!("valid address");
        };
        assert_eq!(address.to_string(), TOKEN);
    }

    #[test]
    fn rejects_missing_prefix() {
        let result = "5fbdb2315678afecb367f032d93f642f64180aa3".parse::<Address>();
        assert!(matches!(result, Err(GatewayError::InvalidAddress(_))));
    }

    #[test]
    fn rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!(format!("{TOKEN}00").parse::<Address>().is_err());
    }

    #[test]
    fn rejects_non_hex() {
        let result = "0xzzbdb2315678afecb367f032d93f642f64180aa3".parse::<Address>();
        assert!(result.is_err());
    }

    #[test]
    fn zero_address_is_not_an_asset() {
        let zero = format!("0x{}", "0".repeat(40));
        assert!(zero.parse::<Address>().is_ok());
        assert!(matches!(
            Address::parse_asset(&zero),
            Err(GatewayError::InvalidAsset(_))
        ));
    }

    #[test]
    fn serde_uses_string_form() {
        let address = Address::from_bytes([0xab; ADDRESS_LEN]);
        let json = serde_json::to_string(&address).unwrap_or_default();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));

        let Ok(back) = serde_json::from_str::<Address>(&json) else {
            panic!("deserialization failed");
        };
        assert_eq!(back, address);
    }

    #[test]
    fn serde_rejects_malformed() {
        let result = serde_json::from_str::<Address>("\"0xnope\"");
        assert!(result.is_err());
    }

    #[test]
    fn orders_by_bytes() {
        let low = Address::from_bytes([1u8; ADDRESS_LEN]);
        let high = Address::from_bytes([2u8; ADDRESS_LEN]);
        assert!(low < high);
    }
}
