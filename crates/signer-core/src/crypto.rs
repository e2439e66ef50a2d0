//! Ed25519 verification and Stellar hashing helpers.
//!
//! The Stellar app never hands out a transaction hash; it signs
//! `SHA-256(signature_base)` where the signature base is
//!
//! ```text
//! network_id (32 bytes) || envelope type (4 bytes) || transaction XDR
//! ```
//!
//! and `network_id` is the SHA-256 of the network passphrase. These helpers
//! let a host check a signature returned by the device before submitting it.
//!
//! # Example
//!
//! ```
//! use ledger_stellar_signer_core::crypto::{PUBLIC_NETWORK_PASSPHRASE, network_id};
//!
//! let id = network_id(PUBLIC_NETWORK_PASSPHRASE);
//! assert_eq!(
//!     hex::encode(id),
//!     "7ac33997544e3175d266bd022439b22cdb16508c01163f26e5cb2a3e1045a979"
//! );
//! ```

use ed25519_dalek::{Signature as DalekSignature, Verifier, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::address::PublicKey;
use crate::error::{Error, Result};
use crate::signature::Signature;

/// Passphrase of the Stellar public network.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Passphrase of the Stellar test network.
pub const TEST_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Returns the network id, the SHA-256 of the network passphrase.
#[must_use]
pub fn network_id(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

/// Returns the transaction hash the device signs for a signature base.
#[must_use]
pub fn transaction_hash(signature_base: &[u8]) -> [u8; 32] {
    Sha256::digest(signature_base).into()
}

/// Verifies an Ed25519 signature over `message`.
///
/// # Arguments
///
/// * `public_key` - The signer's account key
/// * `message` - The signed bytes (a 32-byte hash for both signing modes)
/// * `signature` - The signature returned by the device
///
/// # Errors
///
/// - [`Error::InvalidPublicKey`] if the key is not a valid curve point
/// - [`Error::InvalidSignature`] if the signature does not verify
pub fn verify(public_key: &PublicKey, message: &[u8], signature: &Signature) -> Result<()> {
    let key = VerifyingKey::from_bytes(public_key.as_bytes())
        .map_err(|e| Error::InvalidPublicKey(e.to_string()))?;
    let sig = DalekSignature::from_bytes(signature.as_bytes());

    key.verify(message, &sig)
        .map_err(|e| Error::InvalidSignature(e.to_string()))
}

/// Verifies a transaction signature against the signature base that was
/// sent to [`sign_transaction`](crate::ledger::StellarApp::sign_transaction).
///
/// # Errors
///
/// Same as [`verify`].
pub fn verify_transaction(
    public_key: &PublicKey,
    signature_base: &[u8],
    signature: &Signature,
) -> Result<()> {
    verify(public_key, &transaction_hash(signature_base), signature)
}

impl PublicKey {
    /// Verifies an Ed25519 signature made by this key, see [`verify`].
    ///
    /// # Errors
    ///
    /// Same as [`verify`].
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<()> {
        verify(self, message, signature)
    }
}
