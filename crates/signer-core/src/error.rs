//! Error types for the Ledger Stellar signer library.
//!
//! This module provides a single error type [`enum@Error`] covering every
//! failure mode of a request to the Stellar app on a Ledger device.
//!
//! # Error Categories
//!
//! - **Input validation**: raised before any byte leaves the host (account
//!   index out of range, wrong hash length, malformed hex)
//! - **Transport errors**: the link failed or the device answered with a
//!   status word that has no dedicated meaning
//! - **Device rejections**: the device answered with a known status word,
//!   see [`crate::ledger::status`] for the mapping table
//! - **Encoding errors**: StrKey, public key or signature bytes are invalid
//!
//! # Example
//!
//! ```
//! use ledger_stellar_signer_core::Error;
//!
//! let err = Error::UserRefusedOnDevice;
//! assert_eq!(err.status_word(), Some(0x6985));
//! ```

use core::convert::Infallible;
use core::result::Result as CoreResult;

use hex::FromHexError;
use thiserror::Error;

use crate::ledger::status;

/// The main error type for the Ledger Stellar signer library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    // =========================================================================
    // Input Validation Errors
    // =========================================================================
    /// The account index cannot be hardened (outside `0..=0x7FFF_FFFF`).
    #[error("invalid account index {0}: must be between 0 and 2147483647")]
    InvalidAccountIndex(i128),

    /// The hash handed to `sign_hash` is not 32 bytes long.
    #[error("hash must be 32 bytes, got {0}")]
    InvalidHashLength(usize),

    /// A single-frame command carries more data than a short APDU allows.
    #[error("APDU data of {0} bytes exceeds the 255 byte limit")]
    PayloadTooLarge(usize),

    /// Failed to parse hex data.
    #[error("hex decoding failed: {0}")]
    HexDecodeFailed(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The underlying transport failed to deliver a frame or its response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The device answered with a status word that has no dedicated variant.
    #[error("device returned status word {0:#06x}")]
    Status(u16),

    /// The response from the device was malformed or too short.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// A request finished without any response to read.
    #[error("response is empty")]
    EmptyResponse,

    // =========================================================================
    // Device Rejections
    // =========================================================================
    /// The user declined the request on the device.
    #[error("user refused the request on the device")]
    UserRefusedOnDevice,

    /// The transaction contains an operation type the firmware does not know.
    #[error("transaction contains an operation type unknown to the device")]
    UnknownOperationType,

    /// The transaction envelope type is not supported by the firmware.
    #[error("transaction envelope type is not supported by the device")]
    UnknownEnvelopeType,

    /// Hash signing is disabled in the Stellar app settings.
    #[error("hash signing mode is not enabled on the device")]
    HashSigningModeNotEnabled,

    /// The firmware could not parse the transaction bytes.
    #[error("device failed to parse the transaction")]
    ParseTransactionFailed,

    // =========================================================================
    // Encoding Errors
    // =========================================================================
    /// A StrKey string is malformed, has the wrong version byte or checksum.
    #[error("invalid StrKey: {0}")]
    InvalidStrKey(String),

    /// The public key bytes are invalid.
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    /// The signature bytes are invalid or do not verify.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl Error {
    /// Returns the device status word behind this error, if any.
    ///
    /// Device rejections report the status word they were mapped from, so
    /// callers can log the raw code next to the named cause.
    #[must_use]
    pub const fn status_word(&self) -> Option<u16> {
        match self {
            Self::Status(sw) => Some(*sw),
            Self::UserRefusedOnDevice => Some(status::SW_USER_REFUSED),
            Self::UnknownOperationType => Some(status::SW_UNKNOWN_OP),
            Self::UnknownEnvelopeType => Some(status::SW_UNKNOWN_ENVELOPE_TYPE),
            Self::HashSigningModeNotEnabled => Some(status::SW_HASH_SIGNING_MODE_NOT_ENABLED),
            Self::ParseTransactionFailed => Some(status::SW_TX_PARSING_FAIL),
            _ => None,
        }
    }

    /// Checks if the device refused the request, either through its user or
    /// through a firmware check.
    #[must_use]
    pub const fn is_device_rejection(&self) -> bool {
        matches!(
            self,
            Self::UserRefusedOnDevice
                | Self::UnknownOperationType
                | Self::UnknownEnvelopeType
                | Self::HashSigningModeNotEnabled
                | Self::ParseTransactionFailed
        )
    }
}

impl From<FromHexError> for Error {
    fn from(err: FromHexError) -> Self {
        Self::HexDecodeFailed(err.to_string())
    }
}

impl From<Infallible> for Error {
    fn from(err: Infallible) -> Self {
        match err {}
    }
}

/// A specialized [`Result`] type for Ledger Stellar signer operations.
pub type Result<T> = CoreResult<T, Error>;
