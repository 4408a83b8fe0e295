//! Hardware device signer implementation
//!
//! The device only returns a `(v, r, s)` triple for the transaction fields it
//! is shown; this signer owns the encoding of the final legacy transaction.

use super::{SignedTransaction, TransactionSigner, UnsignedTransaction};
use crate::error::SigningError;
use alloy::primitives::{Address, Bytes};
use alloy_rlp::{Encodable, Header};
use std::fmt;
use std::future::Future;
use std::str::FromStr;

const HARDENED: u32 = 0x8000_0000;

/// BIP-32 derivation path such as `m/44'/60'/0'/0/0`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// Path components, hardened ones carrying the high bit
    pub fn components(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for DerivationPath {
    type Err = SigningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SigningError::InvalidPath(s.to_string());
        let rest = s
            .trim()
            .strip_prefix("m/")
            .or_else(|| s.trim().strip_prefix("M/"))
            .ok_or_else(invalid)?;

        let components = rest
            .split('/')
            .map(|part| {
                let (index, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                    Some(index) => (index, true),
                    None => (part, false),
                };
                let index: u32 = index.parse().map_err(|_| invalid())?;
                if index >= HARDENED {
                    return Err(invalid());
                }
                Ok(if hardened { index | HARDENED } else { index })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(components))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for component in &self.0 {
            if component & HARDENED != 0 {
                write!(f, "/{}'", component & !HARDENED)?;
            } else {
                write!(f, "/{}", component)?;
            }
        }
        Ok(())
    }
}

/// Signature triple returned by a device for a transaction
///
/// `v` already includes the EIP-155 chain id offset. `r` and `s` are
/// big-endian and may carry leading zero bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSignature {
    pub v: u64,
    pub r: Bytes,
    pub s: Bytes,
}

/// Capability exposed by a hardware signing device driver
pub trait SigningDevice: Send + Sync {
    /// Address derived at `path`
    fn get_address(
        &self,
        path: &DerivationPath,
    ) -> impl Future<Output = Result<Address, SigningError>> + Send;

    /// Ask the device to sign the individual transaction fields
    fn sign_transaction(
        &self,
        path: &DerivationPath,
        tx: &UnsignedTransaction,
    ) -> impl Future<Output = Result<DeviceSignature, SigningError>> + Send;

    /// Ask the device to sign a personal message
    fn sign_message(
        &self,
        path: &DerivationPath,
        message: &str,
    ) -> impl Future<Output = Result<Bytes, SigningError>> + Send;
}

/// Signer backed by a hardware device session
pub struct HardwareSigner<D: SigningDevice> {
    device: D,
    path: DerivationPath,
    address: Address,
}

impl<D: SigningDevice> HardwareSigner<D> {
    /// Open a signer at `path`, asking the device for the address
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let signer = HardwareSigner::connect(trezor, "m/44'/60'/0'/0/0").await?;
    /// ```
    pub async fn connect(device: D, path: &str) -> Result<Self, SigningError> {
        let path: DerivationPath = path.parse()?;
        let address = device.get_address(&path).await?;
        tracing::info!("Hardware signer at {} resolved to {}", path, address);

        Ok(Self {
            device,
            path,
            address,
        })
    }

    /// Create a signer for a known address without querying the device
    pub fn new(device: D, path: DerivationPath, address: Address) -> Self {
        Self {
            device,
            path,
            address,
        }
    }

    pub fn path(&self) -> &DerivationPath {
        &self.path
    }
}

impl<D: SigningDevice> TransactionSigner for HardwareSigner<D> {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_transaction(
        &self,
        tx: &UnsignedTransaction,
    ) -> Result<SignedTransaction, SigningError> {
        let signature = self.device.sign_transaction(&self.path, tx).await?;
        let raw = encode_signed_legacy(tx, &signature)?;
        Ok(SignedTransaction::from_raw(raw, tx.nonce))
    }

    async fn sign_message(&self, message: &str) -> Result<Bytes, SigningError> {
        let signature = self.device.sign_message(&self.path, message).await?;
        if signature.len() != 65 {
            return Err(SigningError::MalformedSignature(format!(
                "expected 65 signature bytes, got {}",
                signature.len()
            )));
        }
        Ok(signature)
    }
}

/// Strip leading zero bytes, giving the minimal big-endian form
pub(crate) fn strip_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

/// RLP encode `(nonce, gasPrice, gasLimit, to, value, data, v, r, s)`
///
/// `r` and `s` must be minimal: nodes reject integers with leading zeros as
/// malformed.
pub(crate) fn encode_signed_legacy(
    tx: &UnsignedTransaction,
    signature: &DeviceSignature,
) -> Result<Vec<u8>, SigningError> {
    let r = strip_leading_zeros(&signature.r);
    let s = strip_leading_zeros(&signature.s);

    for (name, value) in [("r", r), ("s", s)] {
        if value.is_empty() || value.len() > 32 {
            return Err(SigningError::MalformedSignature(format!(
                "{} has {} significant bytes",
                name,
                value.len()
            )));
        }
    }

    let payload_length = tx.nonce.length()
        + tx.gas_price.length()
        + tx.gas_limit.length()
        + tx.to.length()
        + tx.value.length()
        + tx.data.length()
        + signature.v.length()
        + r.length()
        + s.length();

    let mut out = Vec::with_capacity(payload_length + 3);
    Header {
        list: true,
        payload_length,
    }
    .encode(&mut out);
    tx.nonce.encode(&mut out);
    tx.gas_price.encode(&mut out);
    tx.gas_limit.encode(&mut out);
    tx.to.encode(&mut out);
    tx.value.encode(&mut out);
    tx.data.encode(&mut out);
    signature.v.encode(&mut out);
    r.encode(&mut out);
    s.encode(&mut out);

    Ok(out)
}
