// src/cipher.rs

use aes::Aes256;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr128BE;

use crate::kdf::{AES_IV_LEN, AES_KEY_LEN};

type Aes256Ctr = Ctr128BE<Aes256>;

/// Encrypts or decrypts `buf` in place with AES-256 in CTR mode (§4.1 bulk
/// cipher). CTR is its own inverse, so one function serves both send and
/// receive paths.
pub fn apply_keystream(key: &[u8; AES_KEY_LEN], iv: &[u8; AES_IV_LEN], buf: &mut [u8]) {
    let mut cipher = Aes256Ctr::new(key.into(), iv.into());
    cipher.apply_keystream(buf);
}
