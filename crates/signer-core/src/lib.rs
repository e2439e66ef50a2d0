//! Ledger Stellar Signer Core Library
//!
//! This crate talks to the Stellar app on a Ledger hardware wallet: it
//! retrieves account public keys, signs transactions and hashes, and reads
//! the app configuration. Private keys never leave the device.
//!
//! # Overview
//!
//! Keys live at the SEP-0005 derivation path `m/44'/148'/account'`. The host
//! serializes that path, frames each request as one or more APDUs, sends
//! them in order over a caller supplied [`ledger::Transport`] and decodes
//! the device's answer into typed results.
//!
//! This library provides:
//!
//! - **Derivation Paths**: validated account indices and the wire form of the path
//! - **Framing**: APDU encoding and the chunking rule for long transactions
//! - **Device API**: typed [`StellarApp`] operations with named device errors
//! - **StrKey**: `G...` address encoding and decoding with CRC16 checksums
//! - **Verification**: Ed25519 checks of device signatures
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Derivation   │   StrKey     │  Signature   │  Verification │
//! │     Path      │  Addresses   │    Types     │   (Ed25519)   │
//! ├─────────────────────────────────────────────────────────────┤
//! │                    Stellar App Layer                        │
//! │  ┌─────────┐  ┌─────────┐  ┌──────────┐  ┌────────────────┐ │
//! │  │  Frame  │  │  APDU   │  │ Dispatch │  │  Status Word   │ │
//! │  │ Encoder │  │ Encode  │  │          │  │    Mapping     │ │
//! │  └─────────┘  └─────────┘  └──────────┘  └────────────────┘ │
//! ├─────────────────────────────────────────────────────────────┤
//! │          Transport Layer (USB HID / emulator / replay)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ## Addresses
//!
//! ```rust
//! use ledger_stellar_signer_core::PublicKey;
//!
//! let address = "GDUTHCF37UX32EMANXIL2WOOVEDZ47GHBTT3DYKU6EKM37SOIZXM2FN7";
//! let key: PublicKey = address.parse().unwrap();
//! assert_eq!(key.to_strkey(), address);
//! ```
//!
//! ## Derivation Paths
//!
//! ```rust
//! use ledger_stellar_signer_core::DerivationPath;
//!
//! let path = DerivationPath::from_account_index(4096_u32).unwrap();
//! assert_eq!(path.to_string(), "m/44'/148'/4096'");
//! assert_eq!(hex::encode(path.to_bytes()), "038000002c8000009480001000");
//! ```
//!
//! # Device Integration
//!
//! Implement [`ledger::Transport`] for the channel to your device, then drive
//! the app through [`StellarApp`]:
//!
//! ```ignore
//! use ledger_stellar_signer_core::{StellarApp, crypto};
//!
//! let mut app = StellarApp::new(transport);
//!
//! let key = app.get_public_key(0, false)?;
//! println!("Address: {}", key.address);
//!
//! let signature = app.sign_transaction(0, &signature_base)?;
//! crypto::verify_transaction(&key.raw_public_key, &signature_base, &signature)?;
//! ```
//!
//! # Logging
//!
//! Frames and responses are logged with [`tracing`] under the
//! `ledger_stellar::apdu` target: `debug` for headers and status words,
//! `trace` for full hex dumps, `warn` for device rejections. The library
//! never installs a subscriber.
//!
//! # Security Considerations
//!
//! - Private keys never leave the Ledger device
//! - Transaction signing shows the decoded transaction on the device screen
//! - Hash signing is blind and must be enabled in the app settings first

// Modules
pub mod address;
pub mod crypto;
pub mod error;
pub mod ledger;
pub mod path;
pub mod signature;

// Re-exports for convenience
pub use address::PublicKey;
pub use error::{Error, Result};
pub use ledger::{AppConfiguration, AppVersion, PublicKeyInfo, StellarApp, Transport};
pub use path::{AccountIndex, DerivationPath};
pub use signature::Signature;
