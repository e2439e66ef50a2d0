//! Request framing for the Stellar app.
//!
//! Every request is a short APDU with class byte [`CLA`]. Requests that fit
//! in one frame (public key, hash signing, configuration) are built with
//! [`build_single_frame`] or [`build_command`]. Transaction signature bases
//! are usually longer than one frame and are split by [`build_frames`]:
//!
//! ```text
//! frame 0:  P1=0x00  path (13 bytes) || payload[0..137]
//! frame n:  P1=0x80  payload[..150]
//! last:     P2=0x00, every other frame P2=0x80
//! ```

use crate::error::Result;
use crate::path::DerivationPath;

use super::apdu::Apdu;

/// Class byte of every Stellar app command.
pub const CLA: u8 = 0xE0;

/// Maximum number of data bytes in one chunked signing frame.
pub const CHUNK_SIZE: usize = 150;

/// Stellar app instruction codes.
pub mod ins {
    /// `GET_PUBLIC_KEY` instruction.
    pub const GET_PUBLIC_KEY: u8 = 0x02;

    /// `SIGN_TRANSACTION` instruction.
    pub const SIGN_TRANSACTION: u8 = 0x04;

    /// `GET_APP_CONFIGURATION` instruction.
    pub const GET_APP_CONFIGURATION: u8 = 0x06;

    /// `SIGN_HASH` instruction.
    pub const SIGN_HASH: u8 = 0x08;
}

/// P1 of the first frame of a request.
pub const P1_FIRST: u8 = 0x00;

/// P1 of every continuation frame.
pub const P1_MORE: u8 = 0x80;

/// P2 of the last frame of a request.
pub const P2_LAST: u8 = 0x00;

/// P2 of every frame that is followed by another one.
pub const P2_MORE: u8 = 0x80;

/// `GET_PUBLIC_KEY` P2: return the key without user interaction.
pub const P2_NO_CONFIRM: u8 = 0x00;

/// `GET_PUBLIC_KEY` P2: show the address and wait for confirmation.
pub const P2_CONFIRM: u8 = 0x01;

/// Payload bytes that fit in the first chunked frame next to the path.
const FIRST_CHUNK_CAPACITY: usize = CHUNK_SIZE - DerivationPath::ENCODED_LEN;

/// Builds a data-carrying command with explicit parameters.
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`](crate::Error::PayloadTooLarge) if
/// `data` exceeds the short APDU limit.
pub fn build_command(ins: u8, p1: u8, p2: u8, data: Vec<u8>) -> Result<Apdu> {
    Apdu::new(CLA, ins, p1, p2, data)
}

/// Builds a single frame carrying `path || payload`.
///
/// # Arguments
///
/// * `ins` - Instruction code, see [`ins`]
/// * `p2` - Instruction specific parameter
/// * `path` - Derivation path, serialized first
/// * `payload` - Bytes appended after the path
///
/// # Errors
///
/// Returns [`Error::PayloadTooLarge`](crate::Error::PayloadTooLarge) if the
/// path and payload together exceed 255 bytes.
///
/// # Example
///
/// ```
/// use ledger_stellar_signer_core::DerivationPath;
/// use ledger_stellar_signer_core::ledger::frame::{build_single_frame, ins, P2_CONFIRM};
///
/// let path = DerivationPath::from_account_index(0_u32).unwrap();
/// let apdu = build_single_frame(ins::GET_PUBLIC_KEY, P2_CONFIRM, &path, &[]).unwrap();
/// assert_eq!(
///     hex::encode(apdu.to_bytes()),
///     "e00200010d038000002c8000009480000000"
/// );
/// ```
pub fn build_single_frame(
    ins: u8,
    p2: u8,
    path: &DerivationPath,
    payload: &[u8],
) -> Result<Apdu> {
    let mut data = Vec::with_capacity(DerivationPath::ENCODED_LEN + payload.len());
    path.write_to(&mut data);
    data.extend_from_slice(payload);
    build_command(ins, P1_FIRST, p2, data)
}

/// Splits a transaction signature base into `SIGN_TRANSACTION` frames.
///
/// The first frame carries the serialized path and up to 137 payload bytes,
/// every following frame up to 150. No trailing empty frame is produced
/// when the payload ends exactly on a frame boundary. An empty payload
/// yields a single frame holding only the path.
///
/// # Errors
///
/// Never fails for well-formed paths; the `Result` carries the frame size
/// check of [`Apdu::new`].
pub fn build_frames(path: &DerivationPath, payload: &[u8]) -> Result<Vec<Apdu>> {
    let remaining_after_first = payload.len().saturating_sub(FIRST_CHUNK_CAPACITY);
    let mut frames = Vec::with_capacity(1 + remaining_after_first.div_ceil(CHUNK_SIZE));
    let mut offset = 0;

    loop {
        let first = frames.is_empty();
        let capacity = if first { FIRST_CHUNK_CAPACITY } else { CHUNK_SIZE };
        let end = payload.len().min(offset + capacity);
        let last = end == payload.len();

        let mut data = Vec::with_capacity(CHUNK_SIZE);
        if first {
            path.write_to(&mut data);
        }
        data.extend_from_slice(&payload[offset..end]);

        let p1 = if first { P1_FIRST } else { P1_MORE };
        let p2 = if last { P2_LAST } else { P2_MORE };
        frames.push(build_command(ins::SIGN_TRANSACTION, p1, p2, data)?);

        offset = end;
        if last {
            return Ok(frames);
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn path(index: u32) -> DerivationPath {
        DerivationPath::from_account_index(index).unwrap()
    }

    fn sizes(frames: &[Apdu]) -> Vec<usize> {
        frames.iter().map(|f| f.data().len()).collect()
    }

    fn markers(frames: &[Apdu]) -> Vec<(u8, u8)> {
        frames.iter().map(|f| (f.p1(), f.p2())).collect()
    }

    #[test]
    fn first_chunk_capacity() {
        assert_eq!(FIRST_CHUNK_CAPACITY, 137);
    }

    #[test]
    fn small_payload_single_frame() {
        let frames = build_frames(&path(0), &[0xAB; 100]).unwrap();

        assert_eq!(sizes(&frames), vec![113]);
        assert_eq!(markers(&frames), vec![(P1_FIRST, P2_LAST)]);
        assert_eq!(&frames[0].data()[..13], path(0).to_bytes().as_slice());
        assert_eq!(frames[0].ins(), ins::SIGN_TRANSACTION);
        assert_eq!(frames[0].cla(), CLA);
    }

    #[test]
    fn payload_just_over_first_capacity() {
        let payload: Vec<u8> = (0..145_u8).collect();
        let frames = build_frames(&path(0), &payload).unwrap();

        assert_eq!(sizes(&frames), vec![150, 8]);
        assert_eq!(markers(&frames), vec![(0x00, 0x80), (0x80, 0x00)]);
        assert_eq!(frames[1].data(), &payload[137..]);
    }

    #[test]
    fn payload_exactly_first_capacity() {
        let frames = build_frames(&path(0), &[0x11; 137]).unwrap();
        assert_eq!(sizes(&frames), vec![150]);
        assert_eq!(markers(&frames), vec![(P1_FIRST, P2_LAST)]);
    }

    #[test]
    fn payload_ends_on_frame_boundary() {
        let frames = build_frames(&path(7), &[0x22; 137 + 150]).unwrap();
        assert_eq!(sizes(&frames), vec![150, 150]);
        assert_eq!(markers(&frames), vec![(0x00, 0x80), (0x80, 0x00)]);
    }

    #[test]
    fn three_frame_transaction() {
        let frames = build_frames(&path(0), &[0x33; 396]).unwrap();
        assert_eq!(sizes(&frames), vec![150, 150, 109]);
        assert_eq!(
            markers(&frames),
            vec![(0x00, 0x80), (0x80, 0x80), (0x80, 0x00)]
        );
    }

    #[test]
    fn empty_payload_sends_path_only() {
        let frames = build_frames(&path(3), &[]).unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data(), path(3).to_bytes().as_slice());
        assert_eq!(markers(&frames), vec![(P1_FIRST, P2_LAST)]);
    }

    #[test]
    fn single_frame_sign_hash() {
        let hash = [0x5A; 32];
        let apdu = build_single_frame(ins::SIGN_HASH, 0x00, &path(0), &hash).unwrap();

        let mut expected = hex::decode("e00800002d038000002c8000009480000000").unwrap();
        expected.extend_from_slice(&hash);
        assert_eq!(apdu.to_bytes(), expected);
    }

    #[test]
    fn single_frame_too_large() {
        let err = build_single_frame(ins::SIGN_HASH, 0x00, &path(0), &[0; 243]).unwrap_err();
        assert_eq!(err, crate::Error::PayloadTooLarge(256));
        assert!(build_single_frame(ins::SIGN_HASH, 0x00, &path(0), &[0; 242]).is_ok());
    }

    proptest! {
        #[test]
        fn chunking_preserves_payload(
            index in 0_u32..=0x7FFF_FFFF,
            payload in proptest::collection::vec(any::<u8>(), 0..1200),
        ) {
            let path = path(index);
            let frames = build_frames(&path, &payload).unwrap();

            let total: usize = frames.iter().map(|f| f.data().len()).sum();
            prop_assert_eq!(total, DerivationPath::ENCODED_LEN + payload.len());

            prop_assert!(frames.iter().all(|f| f.data().len() <= CHUNK_SIZE));
            prop_assert!(frames.iter().all(|f| f.ins() == ins::SIGN_TRANSACTION));

            let mut joined = Vec::with_capacity(total);
            for frame in &frames {
                joined.extend_from_slice(frame.data());
            }
            let path_bytes = path.to_bytes();
            prop_assert_eq!(&joined[..DerivationPath::ENCODED_LEN], path_bytes.as_slice());
            prop_assert_eq!(&joined[DerivationPath::ENCODED_LEN..], payload.as_slice());

            let last = frames.len() - 1;
            for (i, frame) in frames.iter().enumerate() {
                prop_assert_eq!(frame.p1(), if i == 0 { P1_FIRST } else { P1_MORE });
                prop_assert_eq!(frame.p2(), if i == last { P2_LAST } else { P2_MORE });
                if i != last {
                    prop_assert_eq!(frame.data().len(), CHUNK_SIZE);
                }
            }
        }
    }
}
