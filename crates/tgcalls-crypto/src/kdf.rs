// src/kdf.rs
//
// Bit-exact reimplementation of the KDF2 construction in §6.2. Every slice
// bound below is copied directly from the normative pseudocode; do not
// "simplify" the interleaving, it is the wire contract.

use sha2::{Digest, Sha256};
use tgcalls_wire::{ConnectionRole, CryptoError, EncryptionKey};

/// Byte length of the authenticator prepended to every ciphertext.
pub const MSG_KEY_LEN: usize = 16;
/// Byte length of the derived AES-256 key.
pub const AES_KEY_LEN: usize = 32;
/// Byte length of the derived AES-CTR initial counter block.
pub const AES_IV_LEN: usize = 16;

/// `msgKeyLarge = SHA256( key[88+x .. 88+x+32) ‖ plaintext )` (§6.2).
///
/// `x` must already be the mirrored offset for the direction this call is
/// being made in (send vs. receive) — see [`EncryptionKey::base_offset`].
fn msg_key_large(key: &EncryptionKey, x: usize, plaintext: &[u8]) -> Result<[u8; 32], CryptoError> {
    let slice = key.slice(88 + x, 32)?;
    let mut hasher = Sha256::new();
    hasher.update(slice);
    hasher.update(plaintext);
    Ok(hasher.finalize().into())
}

/// `msgKey = msgKeyLarge[8..24)` — the 16-byte authenticator (§6.2).
pub fn compute_msg_key(
    key: &EncryptionKey,
    role: ConnectionRole,
    send: bool,
    plaintext: &[u8],
) -> Result<[u8; MSG_KEY_LEN], CryptoError> {
    let x = key.base_offset(role, send);
    let large = msg_key_large(key, x, plaintext)?;
    let mut out = [0u8; MSG_KEY_LEN];
    out.copy_from_slice(&large[8..24]);
    Ok(out)
}

/// Derives `(aesKey, aesIv)` from `msgKey` and the shared key table (§6.2
/// KDF2 construction). `send` selects `x_send`/`x_receive`.
pub fn derive_aes_key_iv(
    key: &EncryptionKey,
    role: ConnectionRole,
    send: bool,
    msg_key: &[u8; MSG_KEY_LEN],
) -> Result<([u8; AES_KEY_LEN], [u8; AES_IV_LEN]), CryptoError> {
    let x = key.base_offset(role, send);

    let s_a: [u8; 32] = {
        let mut hasher = Sha256::new();
        hasher.update(msg_key);
        hasher.update(key.slice(x, 36)?);
        hasher.finalize().into()
    };
    let s_b: [u8; 32] = {
        let mut hasher = Sha256::new();
        hasher.update(key.slice(x + 40, 36)?);
        hasher.update(msg_key);
        hasher.finalize().into()
    };

    let mut aes_key = [0u8; AES_KEY_LEN];
    aes_key[0..8].copy_from_slice(&s_a[0..8]);
    aes_key[8..24].copy_from_slice(&s_b[8..24]);
    aes_key[24..32].copy_from_slice(&s_a[24..32]);

    // The normative derivation lists a third segment (sB[24..32)) that
    // would overflow a 16-byte IV; PrepareAesKeyIv isn't present in the
    // filtered original source to resolve this directly, so we keep the
    // two segments that exactly fill 16 bytes (see DESIGN.md).
    let mut aes_iv = [0u8; AES_IV_LEN];
    aes_iv[0..8].copy_from_slice(&s_b[0..8]);
    aes_iv[8..16].copy_from_slice(&s_a[8..16]);

    Ok((aes_key, aes_iv))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_with(fill: u8) -> EncryptionKey {
        let mut material = [0u8; 256];
        for (i, b) in material.iter_mut().enumerate() {
            *b = fill.wrapping_add(i as u8);
        }
        EncryptionKey::new(material, true)
    }

    #[test]
    fn msg_key_is_deterministic() {
        let key = key_with(3);
        let plaintext = b"hello world";
        let a = compute_msg_key(&key, ConnectionRole::Transport, true, plaintext).unwrap();
        let b = compute_msg_key(&key, ConnectionRole::Transport, true, plaintext).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn msg_key_changes_with_plaintext() {
        let key = key_with(3);
        let a = compute_msg_key(&key, ConnectionRole::Transport, true, b"one").unwrap();
        let b = compute_msg_key(&key, ConnectionRole::Transport, true, b"two").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn aes_key_iv_are_deterministic_given_msg_key() {
        let key = key_with(9);
        let msg_key = compute_msg_key(&key, ConnectionRole::Signaling, true, b"payload").unwrap();
        let (ka, ia) = derive_aes_key_iv(&key, ConnectionRole::Signaling, true, &msg_key).unwrap();
        let (kb, ib) = derive_aes_key_iv(&key, ConnectionRole::Signaling, true, &msg_key).unwrap();
        assert_eq!(ka, kb);
        assert_eq!(ia, ib);
    }

    #[test]
    fn role_changes_derivation() {
        let key = key_with(1);
        let msg_key = [0u8; MSG_KEY_LEN];
        let (sig_key, sig_iv) = derive_aes_key_iv(&key, ConnectionRole::Signaling, true, &msg_key).unwrap();
        let (xport_key, xport_iv) =
            derive_aes_key_iv(&key, ConnectionRole::Transport, true, &msg_key).unwrap();
        assert_ne!(sig_key, xport_key);
        assert_ne!(sig_iv, xport_iv);
    }
}
