//! `EncryptedConnection`: per-direction framing, keying, replay rejection
//! and partial reliability (§4.1).

mod connection;
mod replay;

pub use connection::{DecryptedPacket, EncryptedConnection, EncryptedPacket};
pub use replay::ReplayWindow;
