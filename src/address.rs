//! Ronin address notation
//!
//! The Ronin ecosystem writes the same 20-byte address either as
//! `ronin:<hex>` (wallet UI) or `0x<hex>` (RPC, contracts). Both normalize to
//! one canonical lowercase `0x` form before comparison or use as a map key.

use crate::error::AddressError;
use alloy::primitives::Address;
use std::fmt;
use std::str::FromStr;

/// Prefix used by the Ronin wallet notation
pub const RONIN_PREFIX: &str = "ronin:";

/// A validated address accepted in either notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoninAddress(Address);

impl RoninAddress {
    /// Wrap an already parsed address
    pub const fn new(address: Address) -> Self {
        Self(address)
    }

    /// The underlying EVM address
    pub const fn address(&self) -> Address {
        self.0
    }

    /// Canonical lowercase `0x` form
    pub fn to_hex(&self) -> String {
        format!("{:?}", self.0).to_lowercase()
    }

    /// Lowercase `ronin:` form, as shown in the wallet
    pub fn to_ronin(&self) -> String {
        format!("{}{}", RONIN_PREFIX, &self.to_hex()[2..])
    }

    /// EIP-55 mixed-case form
    pub fn to_checksum(&self) -> String {
        self.0.to_checksum(None)
    }
}

impl FromStr for RoninAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let lowered = trimmed.to_ascii_lowercase();
        let hex = lowered
            .strip_prefix(RONIN_PREFIX)
            .or_else(|| lowered.strip_prefix("0x"))
            .ok_or_else(|| AddressError::Invalid(s.to_string()))?;

        if hex.len() != 40 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(AddressError::Invalid(s.to_string()));
        }

        let address = Address::from_str(hex).map_err(|_| AddressError::Invalid(s.to_string()))?;
        Ok(Self(address))
    }
}

impl fmt::Display for RoninAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ronin())
    }
}

impl From<Address> for RoninAddress {
    fn from(address: Address) -> Self {
        Self(address)
    }
}

impl From<RoninAddress> for Address {
    fn from(address: RoninAddress) -> Self {
        address.0
    }
}

/// Normalize either notation to the canonical lowercase `0x` form
pub fn normalize(address: &str) -> Result<String, AddressError> {
    address.parse::<RoninAddress>().map(|a| a.to_hex())
}
