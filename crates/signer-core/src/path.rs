//! Stellar key derivation paths.
//!
//! The Stellar app derives every account key along a fixed three level,
//! fully hardened path (SEP-0005):
//!
//! | Level | Value        | Meaning                        |
//! |-------|--------------|--------------------------------|
//! | 1     | `44'`        | BIP-44 purpose                 |
//! | 2     | `148'`       | Stellar coin type              |
//! | 3     | `account'`   | Caller supplied account index  |
//!
//! On the wire a path is sent as a one byte component count followed by each
//! component as a big-endian `u32`.
//!
//! # Example
//!
//! ```
//! use ledger_stellar_signer_core::DerivationPath;
//!
//! let path = DerivationPath::from_account_index(0_u32).unwrap();
//! assert_eq!(path.components(), [0x8000_002C, 0x8000_0094, 0x8000_0000]);
//! assert_eq!(path.to_string(), "m/44'/148'/0'");
//! ```

use core::fmt;
use core::result::Result as CoreResult;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::error::{Error, Result};

/// Bit marking a hardened derivation index.
pub const HARDENED: u32 = 0x8000_0000;

/// BIP-44 purpose component.
const PURPOSE: u32 = 44;

/// SLIP-44 coin type registered for Stellar.
const COIN_TYPE: u32 = 148;

/// Number of path components, also the first byte of a serialized path.
const COMPONENT_COUNT: u8 = 3;

/// An account index within the Stellar derivation scheme.
///
/// The third path component is `0x8000_0000 + index` and must fit in a
/// 32-bit word, so valid indices span `0..=0x7FFF_FFFF`. Every fallible
/// conversion rejects anything else with [`Error::InvalidAccountIndex`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountIndex(u32);

impl AccountIndex {
    /// Largest index whose hardened form still fits in a `u32`.
    pub const MAX: u32 = HARDENED - 1;

    /// Creates an account index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAccountIndex`] if `index` exceeds [`Self::MAX`].
    pub const fn new(index: u32) -> Result<Self> {
        if index > Self::MAX {
            return Err(Error::InvalidAccountIndex(index as i128));
        }
        Ok(Self(index))
    }

    /// Returns the raw index.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns the index with the hardened bit set (`0x8000_0000 + index`).
    #[must_use]
    pub const fn hardened(self) -> u32 {
        HARDENED | self.0
    }
}

impl fmt::Display for AccountIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for AccountIndex {
    fn deserialize<D>(deserializer: D) -> CoreResult<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let index = u32::deserialize(deserializer)?;
        Self::new(index).map_err(de::Error::custom)
    }
}

impl From<u16> for AccountIndex {
    fn from(index: u16) -> Self {
        Self(u32::from(index))
    }
}

impl From<u8> for AccountIndex {
    fn from(index: u8) -> Self {
        Self(u32::from(index))
    }
}

macro_rules! try_from_int {
    ($($ty:ty),+) => {
        $(
            impl TryFrom<$ty> for AccountIndex {
                type Error = Error;

                fn try_from(index: $ty) -> Result<Self> {
                    u32::try_from(index)
                        .map_err(|_| Error::InvalidAccountIndex(i128::from(index)))
                        .and_then(Self::new)
                }
            }
        )+
    };
}

try_from_int!(u32, i8, i16, i32, i64, u64, i128);

impl TryFrom<usize> for AccountIndex {
    type Error = Error;

    fn try_from(index: usize) -> Result<Self> {
        u32::try_from(index)
            .map_err(|_| Error::InvalidAccountIndex(i128::try_from(index).unwrap_or(i128::MAX)))
            .and_then(Self::new)
    }
}

/// A Stellar derivation path `m/44'/148'/account'`.
///
/// The path always has exactly three hardened components; the only degree
/// of freedom is the account index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DerivationPath {
    account: AccountIndex,
}

impl DerivationPath {
    /// Number of components in a Stellar derivation path.
    pub const LEN: usize = COMPONENT_COUNT as usize;

    /// Length of the serialized path: count byte plus one word per component.
    pub const ENCODED_LEN: usize = 1 + 4 * Self::LEN;

    /// Creates the path for an already validated account index.
    #[must_use]
    pub const fn new(account: AccountIndex) -> Self {
        Self { account }
    }

    /// Builds the path for an account index of any integer type.
    ///
    /// # Arguments
    ///
    /// * `account_index` - The account index, `0..=0x7FFF_FFFF`
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAccountIndex`] if the index is negative or
    /// its hardened form does not fit in 32 bits.
    ///
    /// # Example
    ///
    /// ```
    /// use ledger_stellar_signer_core::{DerivationPath, Error};
    ///
    /// let path = DerivationPath::from_account_index(4096_u32).unwrap();
    /// assert_eq!(path.components()[2], 0x8000_1000);
    ///
    /// let err = DerivationPath::from_account_index(-1_i64).unwrap_err();
    /// assert!(matches!(err, Error::InvalidAccountIndex(-1)));
    /// ```
    pub fn from_account_index<A>(account_index: A) -> Result<Self>
    where
        A: TryInto<AccountIndex>,
        A::Error: Into<Error>,
    {
        let account = account_index.try_into().map_err(Into::into)?;
        Ok(Self::new(account))
    }

    /// Returns the account index of this path.
    #[must_use]
    pub const fn account(&self) -> AccountIndex {
        self.account
    }

    /// Returns the three hardened path components.
    #[must_use]
    pub const fn components(&self) -> [u32; Self::LEN] {
        [
            HARDENED | PURPOSE,
            HARDENED | COIN_TYPE,
            self.account.hardened(),
        ]
    }

    /// Serializes the path as sent to the device.
    ///
    /// # Returns
    ///
    /// `len (1 byte) || component (4 bytes, big-endian) * 3`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::ENCODED_LEN);
        self.write_to(&mut bytes);
        bytes
    }

    /// Appends the serialized path to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(COMPONENT_COUNT);
        for component in self.components() {
            buf.extend_from_slice(&component.to_be_bytes());
        }
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m/{PURPOSE}'/{COIN_TYPE}'/{}'", self.account)
    }
}

impl From<AccountIndex> for DerivationPath {
    fn from(account: AccountIndex) -> Self {
        Self::new(account)
    }
}
