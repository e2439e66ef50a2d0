//! APDU (Application Protocol Data Unit) command and response types.
//!
//! Ledger apps speak a short-form subset of ISO 7816-4.
//!
//! # APDU Command Structure
//!
//! ```text
//! | CLA | INS | P1 | P2 | Lc | Data |
//! |-----|-----|----|----|----|------|
//! | 1B  | 1B  | 1B | 1B | 1B | Var  |
//! ```
//!
//! - **CLA**: Class byte, `0xE0` for the Stellar app
//! - **INS**: Instruction byte
//! - **P1, P2**: Parameter bytes, used as continuation markers when a
//!   request spans several frames
//! - **Lc**: Length of command data; always present, `0x00` when there is
//!   no data
//! - **Data**: Command data, at most 255 bytes
//!
//! # APDU Response Structure
//!
//! ```text
//! | Data | SW1 | SW2 |
//! |------|-----|-----|
//! | Var  | 1B  | 1B  |
//! ```
//!
//! # Example
//!
//! ```
//! use ledger_stellar_signer_core::ledger::{Apdu, ApduResponse};
//!
//! let apdu = Apdu::new(0xE0, 0x06, 0x00, 0x00, vec![]).unwrap();
//! assert_eq!(apdu.to_bytes(), vec![0xE0, 0x06, 0x00, 0x00, 0x00]);
//!
//! let response = ApduResponse::from_bytes(vec![0x01, 0x04, 0x02, 0x03, 0x90, 0x00]).unwrap();
//! assert!(response.is_success());
//! ```

use crate::error::{Error, Result};

/// An APDU command, one frame on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Apdu {
    /// Class byte.
    cla: u8,

    /// Instruction byte.
    ins: u8,

    /// Parameter 1.
    p1: u8,

    /// Parameter 2.
    p2: u8,

    /// Command data.
    data: Vec<u8>,
}

impl Apdu {
    /// Maximum short APDU data length.
    pub const MAX_DATA: usize = 255;

    /// Creates a new APDU command.
    ///
    /// # Arguments
    ///
    /// * `cla` - Class byte
    /// * `ins` - Instruction byte
    /// * `p1` - Parameter 1
    /// * `p2` - Parameter 2
    /// * `data` - Command data
    ///
    /// # Errors
    ///
    /// Returns [`Error::PayloadTooLarge`] if `data` is longer than
    /// [`Self::MAX_DATA`].
    pub fn new(cla: u8, ins: u8, p1: u8, p2: u8, data: Vec<u8>) -> Result<Self> {
        if data.len() > Self::MAX_DATA {
            return Err(Error::PayloadTooLarge(data.len()));
        }

        Ok(Self {
            cla,
            ins,
            p1,
            p2,
            data,
        })
    }

    /// Returns the class byte.
    #[must_use]
    pub const fn cla(&self) -> u8 {
        self.cla
    }

    /// Returns the instruction byte.
    #[must_use]
    pub const fn ins(&self) -> u8 {
        self.ins
    }

    /// Returns parameter 1.
    #[must_use]
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Returns parameter 2.
    #[must_use]
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// Returns the command data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Serializes the APDU to bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use ledger_stellar_signer_core::ledger::Apdu;
    ///
    /// let apdu = Apdu::new(0xE0, 0x02, 0x00, 0x01, vec![0xAA, 0xBB]).unwrap();
    /// assert_eq!(apdu.to_bytes(), vec![0xE0, 0x02, 0x00, 0x01, 0x02, 0xAA, 0xBB]);
    /// ```
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(5 + self.data.len());

        bytes.push(self.cla);
        bytes.push(self.ins);
        bytes.push(self.p1);
        bytes.push(self.p2);
        // `new` caps data at 255 bytes
        #[expect(clippy::cast_possible_truncation, reason = "length checked in new")]
        bytes.push(self.data.len() as u8);
        bytes.extend_from_slice(&self.data);

        bytes
    }
}

/// An APDU response from the device.
///
/// Contains the response data and the status word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApduResponse {
    /// Response data.
    data: Vec<u8>,

    /// Status word.
    sw: u16,
}

impl ApduResponse {
    /// Success status word (0x9000).
    pub const SW_SUCCESS: u16 = 0x9000;

    /// Creates a response from its data and status word.
    #[must_use]
    pub const fn new(data: Vec<u8>, sw: u16) -> Self {
        Self { data, sw }
    }

    /// Parses a raw response (`data || SW1 || SW2`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if the response is shorter than
    /// the two status bytes.
    ///
    /// # Example
    ///
    /// ```
    /// use ledger_stellar_signer_core::ledger::ApduResponse;
    ///
    /// let response = ApduResponse::from_bytes(vec![0x01, 0x02, 0x90, 0x00]).unwrap();
    /// assert_eq!(response.data(), &[0x01, 0x02]);
    /// assert_eq!(response.status_word(), 0x9000);
    /// ```
    pub fn from_bytes(mut bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() < 2 {
            return Err(Error::MalformedResponse(format!(
                "APDU response must be at least 2 bytes, got {}",
                bytes.len()
            )));
        }

        let len = bytes.len();
        let sw = u16::from_be_bytes([bytes[len - 2], bytes[len - 1]]);
        bytes.truncate(len - 2);

        Ok(Self { data: bytes, sw })
    }

    /// Returns the response data.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the response and returns the data.
    #[must_use]
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the status word.
    #[must_use]
    pub const fn status_word(&self) -> u16 {
        self.sw
    }

    /// Checks if the response indicates success (`SW = 0x9000`).
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.sw == Self::SW_SUCCESS
    }

    /// Checks the response status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] carrying the raw status word when it is not
    /// `0x9000`. Mapping to named device errors happens in
    /// [`status::map_error`](super::status::map_error).
    pub const fn check(&self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::Status(self.sw))
        }
    }

    /// Returns the first `len` data bytes, the part of the body a command
    /// actually defines.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if fewer than `len` bytes came back.
    pub fn prefix(&self, len: usize) -> Result<&[u8]> {
        self.data.get(..len).ok_or_else(|| {
            Error::MalformedResponse(format!(
                "expected at least {len} bytes, got {}",
                self.data.len()
            ))
        })
    }
}
