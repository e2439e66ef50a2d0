//! Ledger Stellar app communication module.
//!
//! This module speaks the APDU protocol of the Stellar app running on a
//! Ledger hardware wallet. It supports:
//!
//! - Reading the app configuration
//! - Retrieving the account public key, optionally confirmed on screen
//! - Signing transaction signature bases, split across several frames
//! - Signing precomputed 32-byte hashes
//!
//! # Architecture
//!
//! - [`apdu`]: APDU command/response types and encoding
//! - [`frame`]: request framing and the chunking rule for long payloads
//! - [`dispatch`]: sequential delivery of frames over a [`Transport`]
//! - [`status`]: status word to error mapping
//! - [`app`]: the typed [`StellarApp`] operations
//!
//! # Transport Abstraction
//!
//! The [`Transport`] trait abstracts over the channel that carries APDUs
//! (USB HID, a speculos emulator, a recorded session in tests). Discovering
//! and opening a device is the caller's job; this crate only needs a
//! connected transport.
//!
//! # Example
//!
//! ```ignore
//! use ledger_stellar_signer_core::ledger::StellarApp;
//!
//! let transport = /* an open connection to the device */;
//! let mut app = StellarApp::new(transport);
//!
//! let config = app.get_app_configuration()?;
//! let key = app.get_public_key(0, false)?;
//! let signature = app.sign_transaction(0, &signature_base)?;
//! ```

pub mod apdu;
pub mod app;
pub mod dispatch;
pub mod frame;
pub mod status;

pub use apdu::{Apdu, ApduResponse};
pub use app::{AppConfiguration, AppVersion, HashInput, PublicKeyInfo, StellarApp};

use crate::error::Result;

/// A transport layer for communicating with a Ledger device.
///
/// An implementation sends one APDU and blocks until the device answers.
/// It reports channel failures as [`Error::Transport`](crate::Error::Transport)
/// and returns every device answer, successful or not, as an
/// [`ApduResponse`]; status words are interpreted by the caller.
pub trait Transport {
    /// Sends an APDU command and receives a response.
    ///
    /// # Errors
    ///
    /// Returns an error if communication fails.
    fn exchange(&mut self, apdu: &Apdu) -> Result<ApduResponse>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn exchange(&mut self, apdu: &Apdu) -> Result<ApduResponse> {
        (**self).exchange(apdu)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn exchange(&mut self, apdu: &Apdu) -> Result<ApduResponse> {
        (**self).exchange(apdu)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::error::Error;

    /// A mock transport for testing.
    struct MockTransport {
        responses: VecDeque<ApduResponse>,
        sent: Vec<Vec<u8>>,
    }

    impl MockTransport {
        fn new(responses: Vec<ApduResponse>) -> Self {
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

    fn ping<T: Transport>(mut transport: T) -> Result<ApduResponse> {
        let apdu = Apdu::new(0xE0, 0x06, 0x00, 0x00, vec![])?;
        transport.exchange(&apdu)
    }

    #[test]
    fn mock_transport() {
        let mut transport = MockTransport::new(vec![ApduResponse::new(vec![], 0x9000)]);

        let result = ping(&mut transport);

        assert!(result.unwrap().is_success());
        assert_eq!(transport.sent, vec![vec![0xE0, 0x06, 0x00, 0x00, 0x00]]);
    }

    #[test]
    fn boxed_transport() {
        let transport: Box<dyn Transport> = Box::new(MockTransport::new(vec![]));
        assert_eq!(
            ping(transport),
            Err(Error::Transport("no response".to_string()))
        );
    }
}
