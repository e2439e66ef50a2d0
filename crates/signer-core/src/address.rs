//! Stellar StrKey address encoding.
//!
//! Stellar renders keys as StrKey strings. The encoding of a 32-byte key is:
//!
//! 1. Prefix the key with a version byte identifying its type
//!    (`6 << 3` for an account public key, rendered as a leading `G`)
//! 2. Compute the CRC16-XMODEM checksum of `version || key`
//! 3. Append the checksum in little-endian byte order
//! 4. Base32-encode the 35 bytes (RFC 4648 alphabet, no padding)
//!
//! # Example
//!
//! ```
//! use ledger_stellar_signer_core::PublicKey;
//!
//! let key = PublicKey::new([0u8; 32]);
//! assert_eq!(
//!     key.to_strkey(),
//!     "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF"
//! );
//! ```

use core::fmt;
use core::result::Result as CoreResult;
use core::str::FromStr;

use crc::{CRC_16_XMODEM, Crc};
use data_encoding::BASE32_NOPAD;
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{Error, Result};

/// CRC16-XMODEM, the StrKey checksum.
const XMODEM: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// StrKey version bytes.
///
/// The version byte is the key type shifted left by three bits so that the
/// first base32 character of the encoding spells the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VersionByte {
    /// Ed25519 account public key (`G...`).
    AccountId = 6 << 3,

    /// Ed25519 secret seed (`S...`).
    SecretSeed = 18 << 3,

    /// Pre-authorized transaction hash (`T...`).
    PreAuthTx = 19 << 3,

    /// SHA-256 hash signer (`X...`).
    Sha256Hash = 23 << 3,
}

impl VersionByte {
    /// Returns the raw version byte.
    #[must_use]
    pub const fn byte(self) -> u8 {
        self as u8
    }

    /// Returns the leading character of strings encoded with this version.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::AccountId => 'G',
            Self::SecretSeed => 'S',
            Self::PreAuthTx => 'T',
            Self::Sha256Hash => 'X',
        }
    }

    /// Creates a version byte from its raw value.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x30 => Some(Self::AccountId),
            0x90 => Some(Self::SecretSeed),
            0x98 => Some(Self::PreAuthTx),
            0xB8 => Some(Self::Sha256Hash),
            _ => None,
        }
    }
}

/// Computes the CRC16-XMODEM checksum of `data`.
///
/// # Example
///
/// ```
/// use ledger_stellar_signer_core::address::crc16_xmodem;
///
/// assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
/// ```
#[must_use]
pub fn crc16_xmodem(data: &[u8]) -> u16 {
    XMODEM.checksum(data)
}

/// Encodes `data` as a StrKey string with the given version byte.
///
/// # Returns
///
/// `base32(version || data || crc16_le(version || data))` without padding.
#[must_use]
pub fn encode_check(version: VersionByte, data: &[u8]) -> String {
    let mut payload = Vec::with_capacity(1 + data.len() + 2);
    payload.push(version.byte());
    payload.extend_from_slice(data);

    let checksum = crc16_xmodem(&payload);
    payload.extend_from_slice(&checksum.to_le_bytes());

    BASE32_NOPAD.encode(&payload)
}

/// Decodes a StrKey string and returns the data between the version byte
/// and the checksum.
///
/// # Errors
///
/// Returns [`Error::InvalidStrKey`] if the text is not valid base32, is too
/// short, carries a different version byte or fails the checksum.
pub fn decode_check(version: VersionByte, encoded: &str) -> Result<Vec<u8>> {
    let decoded = BASE32_NOPAD
        .decode(encoded.as_bytes())
        .map_err(|e| Error::InvalidStrKey(format!("base32 decoding failed: {e}")))?;

    if decoded.len() < 3 {
        return Err(Error::InvalidStrKey(format!(
            "expected at least 3 bytes, got {}",
            decoded.len()
        )));
    }

    if decoded[0] != version.byte() {
        return Err(Error::InvalidStrKey(format!(
            "expected version byte {:#04x}, got {:#04x}",
            version.byte(),
            decoded[0]
        )));
    }

    let (payload, checksum) = decoded.split_at(decoded.len() - 2);
    let expected = crc16_xmodem(payload);
    let actual = u16::from_le_bytes([checksum[0], checksum[1]]);
    if expected != actual {
        return Err(Error::InvalidStrKey(format!(
            "checksum mismatch: expected {expected:#06x}, got {actual:#06x}"
        )));
    }

    Ok(payload[1..].to_vec())
}

/// An Ed25519 account public key as returned by the Stellar app.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// The length of a raw public key in bytes.
    pub const BYTE_LEN: usize = 32;

    /// The length of an encoded account address.
    pub const STRKEY_LEN: usize = 56;

    /// Creates a public key from its raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; Self::BYTE_LEN]) -> Self {
        Self(bytes)
    }

    /// Creates a public key from a slice that must be exactly 32 bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPublicKey`] for any other length.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let bytes: [u8; Self::BYTE_LEN] = bytes.try_into().map_err(|_| {
            Error::InvalidPublicKey(format!(
                "expected {} bytes, got {}",
                Self::BYTE_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }

    /// Returns the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; Self::BYTE_LEN] {
        &self.0
    }

    /// Returns a copy of the raw key bytes.
    #[must_use]
    pub const fn to_bytes(&self) -> [u8; Self::BYTE_LEN] {
        self.0
    }

    /// Encodes the key as a Stellar account address (`G...`).
    #[must_use]
    pub fn to_strkey(&self) -> String {
        encode_check(VersionByte::AccountId, &self.0)
    }

    /// Parses a Stellar account address (`G...`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidStrKey`] if the address is malformed, has the
    /// wrong length or version byte, or fails the checksum.
    ///
    /// # Example
    ///
    /// ```
    /// use ledger_stellar_signer_core::PublicKey;
    ///
    /// let address = "GDUTHCF37UX32EMANXIL2WOOVEDZ47GHBTT3DYKU6EKM37SOIZXM2FN7";
    /// let key = PublicKey::from_strkey(address).unwrap();
    /// assert_eq!(key.to_strkey(), address);
    /// ```
    pub fn from_strkey(address: &str) -> Result<Self> {
        if address.len() != Self::STRKEY_LEN {
            return Err(Error::InvalidStrKey(format!(
                "expected {} characters, got {}",
                Self::STRKEY_LEN,
                address.len()
            )));
        }

        let data = decode_check(VersionByte::AccountId, address)?;
        Self::from_slice(&data).map_err(|e| Error::InvalidStrKey(e.to_string()))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PublicKey").field(&self.to_strkey()).finish()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_strkey())
    }
}

impl FromStr for PublicKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_strkey(s)
    }
}

impl From<[u8; 32]> for PublicKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> CoreResult<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_strkey())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> CoreResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_strkey(&s).map_err(de::Error::custom)
    }
}
