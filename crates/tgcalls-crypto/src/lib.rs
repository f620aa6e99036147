//! KDF2 message-key derivation and AES-256-CTR bulk cipher (§4.1, §6.2).
//!
//! Pure functions over byte slices and [`tgcalls_wire::EncryptionKey`]; no
//! framing, no state. `tgcalls-transport` is the only intended caller.

mod cipher;
mod kdf;
mod seal;

pub use cipher::apply_keystream;
pub use kdf::{compute_msg_key, derive_aes_key_iv, AES_IV_LEN, AES_KEY_LEN, MSG_KEY_LEN};
pub use seal::{open, seal};
