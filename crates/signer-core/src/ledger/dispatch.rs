//! Sequential frame delivery.
//!
//! A request spanning several frames must reach the device in order, and
//! the device acknowledges each frame before it accepts the next. Frames
//! are therefore sent one at a time, each call blocking until its response
//! is in. The first transport failure or non-success status word aborts
//! the request; the remaining frames are never sent.

use tracing::{debug, trace};

use crate::error::{Error, Result};

use super::Transport;
use super::apdu::{Apdu, ApduResponse};
use super::status::map_error;

const TARGET: &str = "ledger_stellar::apdu";

/// Sends one frame and returns its successful response.
///
/// # Errors
///
/// Returns the transport error, or the mapped device error when the status
/// word is not `0x9000`.
pub fn dispatch<T>(transport: &mut T, apdu: &Apdu) -> Result<ApduResponse>
where
    T: Transport + ?Sized,
{
    exchange_checked(transport, apdu).map_err(map_error)
}

/// Sends `frames` in order and returns the response to the last one.
///
/// Intermediate responses only acknowledge receipt and are dropped.
///
/// # Errors
///
/// - [`Error::EmptyResponse`] if `frames` is empty
/// - the first transport or device error, see [`dispatch`]
pub fn dispatch_sequence<T>(transport: &mut T, frames: &[Apdu]) -> Result<ApduResponse>
where
    T: Transport + ?Sized,
{
    let mut last = None;
    for (index, apdu) in frames.iter().enumerate() {
        trace!(target: TARGET, frame = index + 1, of = frames.len(), "sending frame");
        last = Some(dispatch(transport, apdu)?);
    }
    last.ok_or(Error::EmptyResponse)
}

fn exchange_checked<T>(transport: &mut T, apdu: &Apdu) -> Result<ApduResponse>
where
    T: Transport + ?Sized,
{
    debug!(
        target: TARGET,
        ins = format_args!("{:#04x}", apdu.ins()),
        p1 = format_args!("{:#04x}", apdu.p1()),
        p2 = format_args!("{:#04x}", apdu.p2()),
        len = apdu.data().len(),
        "=> apdu"
    );
    trace!(target: TARGET, "=> {}", hex::encode(apdu.to_bytes()));

    let response = transport.exchange(apdu)?;

    debug!(
        target: TARGET,
        sw = format_args!("{:#06x}", response.status_word()),
        len = response.data().len(),
        "<= response"
    );
    trace!(target: TARGET, "<= {}", hex::encode(response.data()));

    response.check()?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    struct ScriptedTransport {
        responses: VecDeque<Result<ApduResponse>>,
        sent: Vec<Apdu>,
    }

    impl ScriptedTransport {
        fn new(responses: Vec<Result<ApduResponse>>) -> Self {
            Self {
                responses: responses.into(),
                sent: Vec::new(),
            }
        }
    }

    impl Transport for ScriptedTransport {
        fn exchange(&mut self, apdu: &Apdu) -> Result<ApduResponse> {
            self.sent.push(apdu.clone());
            self.responses
                .pop_front()
                .unwrap_or_else(|| Err(Error::Transport("script exhausted".to_string())))
        }
    }

    fn frame(p1: u8) -> Apdu {
        Apdu::new(0xE0, 0x04, p1, 0x00, vec![p1]).unwrap()
    }

    fn ok(data: &[u8]) -> Result<ApduResponse> {
        Ok(ApduResponse::new(data.to_vec(), 0x9000))
    }

    #[test]
    fn returns_last_response() {
        let mut transport = ScriptedTransport::new(vec![ok(&[]), ok(&[]), ok(&[0xAA])]);

        let response =
            dispatch_sequence(&mut transport, &[frame(0), frame(1), frame(2)]).unwrap();

        assert_eq!(response.data(), &[0xAA]);
        assert_eq!(transport.sent, vec![frame(0), frame(1), frame(2)]);
    }

    #[test]
    fn rejection_aborts_sequence() {
        let mut transport = ScriptedTransport::new(vec![
            ok(&[]),
            Ok(ApduResponse::new(vec![], 0xB005)),
            ok(&[0xAA]),
        ]);

        let err = dispatch_sequence(&mut transport, &[frame(0), frame(1), frame(2)]).unwrap_err();

        assert_eq!(err, Error::ParseTransactionFailed);
        assert_eq!(transport.sent.len(), 2);
    }

    #[test]
    fn transport_failure_aborts_sequence() {
        let mut transport = ScriptedTransport::new(vec![Err(Error::Transport(
            "disconnected".to_string(),
        ))]);

        let err = dispatch_sequence(&mut transport, &[frame(0), frame(1)]).unwrap_err();

        assert_eq!(err, Error::Transport("disconnected".to_string()));
        assert_eq!(transport.sent.len(), 1);
    }

    #[test]
    fn unknown_status_is_kept() {
        let mut transport =
            ScriptedTransport::new(vec![Ok(ApduResponse::new(vec![], 0x6D00))]);
        assert_eq!(
            dispatch(&mut transport, &frame(0)),
            Err(Error::Status(0x6D00))
        );
    }

    #[test]
    fn empty_sequence() {
        let mut transport = ScriptedTransport::new(vec![]);
        assert_eq!(
            dispatch_sequence(&mut transport, &[]),
            Err(Error::EmptyResponse)
        );
        assert!(transport.sent.is_empty());
    }

    #[test]
    fn logs_frames() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let mut transport = ScriptedTransport::new(vec![Ok(ApduResponse::new(vec![], 0x6985))]);
        assert_eq!(
            dispatch(&mut transport, &frame(0)),
            Err(Error::UserRefusedOnDevice)
        );
    }
}
