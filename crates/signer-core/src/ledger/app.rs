//! Typed operations of the Stellar app.
//!
//! [`StellarApp`] wraps a [`Transport`] and exposes the four requests the
//! app understands. Inputs are validated before any frame is built, so a
//! bad account index or hash never reaches the device.
//!
//! # Example
//!
//! ```ignore
//! use ledger_stellar_signer_core::ledger::StellarApp;
//!
//! let mut app = StellarApp::new(transport);
//!
//! let config = app.get_app_configuration()?;
//! println!("Stellar app {}", config.version);
//!
//! let key = app.get_public_key(0, true)?;
//! let signature = app.sign_hash(0, "0x4b480b455a7ee154c33651819e3ce2ceb6bcd9dda78887777c4d2718c5cd04cd")?;
//! key.raw_public_key.verify(&hash, &signature)?;
//! ```

use core::fmt;

use serde::{Deserialize, Serialize};

use super::Transport;
use super::apdu::ApduResponse;
use super::dispatch::{dispatch, dispatch_sequence};
use super::frame::{
    P1_FIRST, P2_CONFIRM, P2_LAST, P2_NO_CONFIRM, build_command, build_frames, build_single_frame,
    ins,
};
use crate::address::PublicKey;
use crate::error::{Error, Result};
use crate::path::{AccountIndex, DerivationPath};
use crate::signature::Signature;

/// Length of a hash accepted by `SIGN_HASH`.
pub const HASH_LEN: usize = 32;

/// Body length of a `GET_APP_CONFIGURATION` response.
const CONFIG_LEN: usize = 4;

/// The public key of an account, with its StrKey address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKeyInfo {
    /// The account address (`G...`).
    pub address: String,

    /// The raw Ed25519 public key.
    pub raw_public_key: PublicKey,
}

impl From<PublicKey> for PublicKeyInfo {
    fn from(raw_public_key: PublicKey) -> Self {
        Self {
            address: raw_public_key.to_strkey(),
            raw_public_key,
        }
    }
}

/// Version of the Stellar app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AppVersion {
    /// Major version.
    pub major: u8,
    /// Minor version.
    pub minor: u8,
    /// Patch version.
    pub patch: u8,
}

impl fmt::Display for AppVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Configuration reported by the Stellar app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfiguration {
    /// Whether the "hash signing" setting is enabled on the device.
    pub hash_signing_enabled: bool,

    /// Installed app version.
    pub version: AppVersion,
}

impl AppConfiguration {
    fn from_response(response: &ApduResponse) -> Result<Self> {
        let &[flag, major, minor, patch] = response.prefix(CONFIG_LEN)? else {
            return Err(Error::MalformedResponse(
                "configuration body is not 4 bytes".to_string(),
            ));
        };

        Ok(Self {
            hash_signing_enabled: flag == 1,
            version: AppVersion {
                major,
                minor,
                patch,
            },
        })
    }
}

/// A hash handed to [`StellarApp::sign_hash`]: raw bytes or hex text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashInput<'a> {
    /// Raw hash bytes.
    Bytes(&'a [u8]),
    /// Hex encoded hash, optionally prefixed with `0x`.
    Hex(&'a str),
}

impl HashInput<'_> {
    /// Decodes the input into exactly 32 bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::HexDecodeFailed`] if hex text is not valid hex
    /// - [`Error::InvalidHashLength`] unless the hash is 32 bytes long
    pub fn to_bytes(&self) -> Result<[u8; HASH_LEN]> {
        let decoded;
        let bytes = match *self {
            Self::Bytes(bytes) => bytes,
            Self::Hex(text) => {
                decoded = hex::decode(text.strip_prefix("0x").unwrap_or(text))?;
                decoded.as_slice()
            }
        };

        bytes
            .try_into()
            .map_err(|_| Error::InvalidHashLength(bytes.len()))
    }
}

impl<'a> From<&'a [u8]> for HashInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for HashInput<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a Vec<u8>> for HashInput<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for HashInput<'a> {
    fn from(text: &'a str) -> Self {
        Self::Hex(text)
    }
}

impl<'a> From<&'a String> for HashInput<'a> {
    fn from(text: &'a String) -> Self {
        Self::Hex(text)
    }
}

/// A session with the Stellar app on a Ledger device.
///
/// The session owns its transport and every operation takes `&mut self`,
/// so requests on one device are strictly serialized.
#[derive(Debug)]
pub struct StellarApp<T> {
    transport: T,
}

impl<T: Transport> StellarApp<T> {
    /// Creates a session over an open transport.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub const fn transport(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consumes the session and returns the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Retrieves the public key of `m/44'/148'/account_index'`.
    ///
    /// # Arguments
    ///
    /// * `account_index` - Account index, `0..=0x7FFF_FFFF`
    /// * `display` - Show the address on the device and wait for the user
    ///   to confirm it
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAccountIndex`] if the index is out of range
    /// - [`Error::UserRefusedOnDevice`] if the user rejects the address
    /// - [`Error::MalformedResponse`] if fewer than 32 bytes come back
    pub fn get_public_key<A>(&mut self, account_index: A, display: bool) -> Result<PublicKeyInfo>
    where
        A: TryInto<AccountIndex>,
        A::Error: Into<Error>,
    {
        let path = DerivationPath::from_account_index(account_index)?;
        let p2 = if display { P2_CONFIRM } else { P2_NO_CONFIRM };
        let apdu = build_single_frame(ins::GET_PUBLIC_KEY, p2, &path, &[])?;

        let response = dispatch(&mut self.transport, &apdu)?;
        let key = PublicKey::from_slice(response.prefix(PublicKey::BYTE_LEN)?)?;
        Ok(key.into())
    }

    /// Signs a transaction signature base.
    ///
    /// `transaction` is `network_id || envelope type || transaction XDR`.
    /// The device shows the decoded transaction and, once approved, signs
    /// its SHA-256.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAccountIndex`] if the index is out of range
    /// - [`Error::UserRefusedOnDevice`] if the user rejects the transaction
    /// - [`Error::ParseTransactionFailed`], [`Error::UnknownOperationType`]
    ///   or [`Error::UnknownEnvelopeType`] if the firmware cannot display it
    /// - [`Error::MalformedResponse`] if fewer than 64 bytes come back
    pub fn sign_transaction<A>(&mut self, account_index: A, transaction: &[u8]) -> Result<Signature>
    where
        A: TryInto<AccountIndex>,
        A::Error: Into<Error>,
    {
        let path = DerivationPath::from_account_index(account_index)?;
        let frames = build_frames(&path, transaction)?;

        let response = dispatch_sequence(&mut self.transport, &frames)?;
        Signature::from_slice(response.prefix(Signature::BYTE_LEN)?)
    }

    /// Signs a precomputed 32-byte hash.
    ///
    /// Only works when hash signing is enabled in the app settings. The
    /// device cannot show what the hash stands for, so this is a last resort
    /// for transactions the app cannot decode.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidAccountIndex`] if the index is out of range
    /// - [`Error::HexDecodeFailed`] if a hex hash is not valid hex
    /// - [`Error::InvalidHashLength`] unless the hash is 32 bytes
    /// - [`Error::HashSigningModeNotEnabled`] if the setting is off
    /// - [`Error::UserRefusedOnDevice`] if the user rejects the request
    pub fn sign_hash<'h, A, H>(&mut self, account_index: A, hash: H) -> Result<Signature>
    where
        A: TryInto<AccountIndex>,
        A::Error: Into<Error>,
        H: Into<HashInput<'h>>,
    {
        let hash = hash.into().to_bytes()?;
        let path = DerivationPath::from_account_index(account_index)?;
        let apdu = build_single_frame(ins::SIGN_HASH, P2_LAST, &path, &hash)?;

        let response = dispatch(&mut self.transport, &apdu)?;
        Signature::from_slice(response.prefix(Signature::BYTE_LEN)?)
    }

    /// Reads the app version and whether hash signing is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if fewer than 4 bytes come back,
    /// or the transport/device error.
    pub fn get_app_configuration(&mut self) -> Result<AppConfiguration> {
        let apdu = build_command(ins::GET_APP_CONFIGURATION, P1_FIRST, P2_LAST, Vec::new())?;

        let response = dispatch(&mut self.transport, &apdu)?;
        AppConfiguration::from_response(&response)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use hex_literal::hex;

    use super::*;
    use crate::ledger::Apdu;

    const KEY_0: [u8; 32] = hex!("e93388bbfd2fbd11806dd0bd59cea9079e7cc70ce7b1e154f114cdfe4e466ecd");

    #[derive(Default)]
    struct MockTransport {
        responses: VecDeque<ApduResponse>,
        sent: Vec<Vec<u8>>,
    }

    impl MockTransport {
        fn with(responses: impl IntoIterator<Item = ApduResponse>) -> Self {
            Self {
                responses: responses.into_iter().collect(),
                sent: Vec::new(),
            }
        }
    }

    impl Transport for MockTransport {
        fn exchange(&mut self, apdu: &Apdu) -> Result<ApduResponse> {
            self.sent.push(apdu.to_bytes());
            self.responses
                .pop_front()
                .ok_or_else(|| Error::Transport("no response".to_string()))
        }
    }

    fn ok(data: Vec<u8>) -> ApduResponse {
        ApduResponse::new(data, 0x9000)
    }

    #[test]
    fn app_configuration() {
        let mut app = StellarApp::new(MockTransport::with([ok(vec![0x01, 0x05, 0x00, 0x03])]));

        let config = app.get_app_configuration().unwrap();

        assert!(config.hash_signing_enabled);
        assert_eq!(config.version.to_string(), "5.0.3");
        assert_eq!(app.transport().sent, vec![hex!("e006000000").to_vec()]);
    }

    #[test]
    fn app_configuration_hash_signing_disabled() {
        let mut app = StellarApp::new(MockTransport::with([ok(vec![0x00, 0x05, 0x00, 0x03])]));
        assert!(!app.get_app_configuration().unwrap().hash_signing_enabled);
    }

    #[test]
    fn app_configuration_short_response() {
        let mut app = StellarApp::new(MockTransport::with([ok(vec![0x01, 0x05])]));
        assert!(matches!(
            app.get_app_configuration(),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn public_key_display_flag() {
        let mut app = StellarApp::new(MockTransport::with([ok(KEY_0.to_vec()), ok(KEY_0.to_vec())]));

        let silent = app.get_public_key(0_u32, false).unwrap();
        let shown = app.get_public_key(0_u32, true).unwrap();

        assert_eq!(silent, shown);
        assert_eq!(
            silent.address,
            "GDUTHCF37UX32EMANXIL2WOOVEDZ47GHBTT3DYKU6EKM37SOIZXM2FN7"
        );
        let sent = &app.transport().sent;
        assert_eq!(sent[0][3], P2_NO_CONFIRM);
        assert_eq!(sent[1][3], P2_CONFIRM);
    }

    #[test]
    fn public_key_short_response() {
        let mut app = StellarApp::new(MockTransport::with([ok(vec![0; 31])]));
        assert!(matches!(
            app.get_public_key(0_u32, false),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn invalid_account_index_sends_nothing() {
        let mut app = StellarApp::new(MockTransport::default());

        assert_eq!(
            app.get_public_key(-1_i32, false),
            Err(Error::InvalidAccountIndex(-1))
        );
        assert_eq!(
            app.sign_transaction(1_u64 << 32, &[0; 10]),
            Err(Error::InvalidAccountIndex(1 << 32))
        );
        assert_eq!(
            app.sign_hash(0x8000_0000_u32, &[0_u8; 32]),
            Err(Error::InvalidAccountIndex(0x8000_0000))
        );
        assert!(app.into_inner().sent.is_empty());
    }

    #[test]
    fn sign_hash_rejects_bad_input_before_sending() {
        let mut app = StellarApp::new(MockTransport::default());

        assert_eq!(app.sign_hash(0_u32, &[0_u8; 31]), Err(Error::InvalidHashLength(31)));
        assert_eq!(app.sign_hash(0_u32, "0xabcd"), Err(Error::InvalidHashLength(2)));
        assert!(matches!(
            app.sign_hash(0_u32, "zz"),
            Err(Error::HexDecodeFailed(_))
        ));
        assert!(app.transport().sent.is_empty());
    }

    #[test]
    fn sign_hash_disabled_on_device() {
        let mut app = StellarApp::new(MockTransport::with([ApduResponse::new(vec![], 0x6C66)]));
        assert_eq!(
            app.sign_hash(0_u32, &[0x11_u8; 32]),
            Err(Error::HashSigningModeNotEnabled)
        );
    }

    #[test]
    fn sign_transaction_user_refused() {
        let mut app = StellarApp::new(MockTransport::with([
            ok(vec![]),
            ApduResponse::new(vec![], 0x6985),
        ]));

        assert_eq!(
            app.sign_transaction(0_u32, &[0x44; 200]),
            Err(Error::UserRefusedOnDevice)
        );
        assert_eq!(app.transport().sent.len(), 2);
    }

    #[test]
    fn sign_transaction_short_signature() {
        let mut app = StellarApp::new(MockTransport::with([ok(vec![0; 10])]));
        assert!(matches!(
            app.sign_transaction(0_u32, &[0x44; 10]),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn hash_input_forms() {
        let raw = [0xAB; 32];
        let text = hex::encode(raw);
        let prefixed = format!("0x{text}");

        assert_eq!(HashInput::from(&raw).to_bytes().unwrap(), raw);
        assert_eq!(HashInput::from(text.as_str()).to_bytes().unwrap(), raw);
        assert_eq!(HashInput::from(&prefixed).to_bytes().unwrap(), raw);
        assert_eq!(HashInput::from(&raw.to_vec()).to_bytes().unwrap(), raw);
    }

    #[test]
    fn configuration_serde() {
        let config = AppConfiguration {
            hash_signing_enabled: true,
            version: AppVersion {
                major: 5,
                minor: 0,
                patch: 3,
            },
        };
        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json["hash_signing_enabled"], true);
        assert_eq!(json["version"]["major"], 5);
    }
}
