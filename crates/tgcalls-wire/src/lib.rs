//! Data model and error taxonomy shared by every tgcalls crate.
//!
//! `tgcalls-wire` has no I/O and no framing logic of its own; it is the
//! vocabulary the rest of the workspace (`tgcalls-crypto`, `tgcalls-codec`,
//! `tgcalls-transport`, `tgcalls-negotiate`, `tgcalls-session`) is built
//! from.

mod codec_types;
mod config;
mod error;
mod key;
mod message;
mod seq;

pub use codec_types::*;
pub use config::*;
pub use error::*;
pub use key::*;
pub use message::*;
pub use seq::*;
