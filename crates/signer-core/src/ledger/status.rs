//! Status word classification.
//!
//! The Stellar app reports why it rejected a request through the status
//! word of the response. This module holds the single table that turns
//! those codes into named [`Error`] variants:
//!
//! | Status   | Error                                   |
//! |----------|-----------------------------------------|
//! | `0x6985` | [`Error::UserRefusedOnDevice`]          |
//! | `0x6C24` | [`Error::UnknownOperationType`]         |
//! | `0x6C25` | [`Error::UnknownEnvelopeType`]          |
//! | `0x6C66` | [`Error::HashSigningModeNotEnabled`]    |
//! | `0xB005` | [`Error::ParseTransactionFailed`]       |
//!
//! Every other status word, and every error that carries no status word,
//! passes through unchanged so no diagnostic information is lost.

use tracing::warn;

use crate::error::Error;

/// The user declined the request on the device.
pub const SW_USER_REFUSED: u16 = 0x6985;

/// The transaction contains an unknown operation type.
pub const SW_UNKNOWN_OP: u16 = 0x6C24;

/// The transaction envelope type is unsupported.
pub const SW_UNKNOWN_ENVELOPE_TYPE: u16 = 0x6C25;

/// Hash signing is disabled in the app settings.
pub const SW_HASH_SIGNING_MODE_NOT_ENABLED: u16 = 0x6C66;

/// The firmware failed to parse the transaction.
pub const SW_TX_PARSING_FAIL: u16 = 0xB005;

/// Returns the named error for a status word, if the Stellar app defines one.
#[must_use]
pub const fn classify(sw: u16) -> Option<Error> {
    match sw {
        SW_USER_REFUSED => Some(Error::UserRefusedOnDevice),
        SW_UNKNOWN_OP => Some(Error::UnknownOperationType),
        SW_UNKNOWN_ENVELOPE_TYPE => Some(Error::UnknownEnvelopeType),
        SW_HASH_SIGNING_MODE_NOT_ENABLED => Some(Error::HashSigningModeNotEnabled),
        SW_TX_PARSING_FAIL => Some(Error::ParseTransactionFailed),
        _ => None,
    }
}

/// Rewrites a dispatch failure into its named device error.
///
/// Only [`Error::Status`] with a code from the table is rewritten; anything
/// else is returned as is.
///
/// # Example
///
/// ```
/// use ledger_stellar_signer_core::Error;
/// use ledger_stellar_signer_core::ledger::status::map_error;
///
/// assert_eq!(map_error(Error::Status(0x6985)), Error::UserRefusedOnDevice);
/// assert_eq!(map_error(Error::Status(0x6E00)), Error::Status(0x6E00));
/// ```
#[must_use]
pub fn map_error(err: Error) -> Error {
    match err {
        Error::Status(sw) => classify(sw).map_or(Error::Status(sw), |mapped| {
            warn!(
                target: "ledger_stellar::apdu",
                status = format_args!("{sw:#06x}"),
                "device rejected request: {mapped}"
            );
            mapped
        }),
        other => other,
    }
}
