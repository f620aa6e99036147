// src/seal.rs
//
// Ties `kdf` and `cipher` together into the two operations
// `EncryptedConnection` actually needs: seal a plaintext frame into a
// packet, and open a packet back into a plaintext frame (§4.1).

use tgcalls_wire::{ConnectionRole, CryptoError, EncryptionKey};

use crate::cipher::apply_keystream;
use crate::kdf::{compute_msg_key, derive_aes_key_iv, MSG_KEY_LEN};

/// `msgKey ‖ AES-CTR(plaintext)` — the full packet payload (§4.1 wire
/// layout). Consumes `plaintext` as scratch space to encrypt in place.
pub fn seal(
    key: &EncryptionKey,
    role: ConnectionRole,
    mut plaintext: Vec<u8>,
) -> Result<Vec<u8>, CryptoError> {
    let msg_key = compute_msg_key(key, role, true, &plaintext)?;
    let (aes_key, aes_iv) = derive_aes_key_iv(key, role, true, &msg_key)?;
    apply_keystream(&aes_key, &aes_iv, &mut plaintext);

    let mut out = Vec::with_capacity(MSG_KEY_LEN + plaintext.len());
    out.extend_from_slice(&msg_key);
    out.extend_from_slice(&plaintext);
    Ok(out)
}

/// Splits `packet` into `msgKey` and ciphertext, decrypts the ciphertext,
/// and verifies the recomputed `msgKey` matches bit-for-bit. Returns the
/// plaintext on success. Does not check packet size bounds — that's the
/// transport layer's job (§4.1 step 1).
pub fn open(
    key: &EncryptionKey,
    role: ConnectionRole,
    packet: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let (msg_key_bytes, ciphertext) = packet.split_at(MSG_KEY_LEN);
    let mut msg_key = [0u8; MSG_KEY_LEN];
    msg_key.copy_from_slice(msg_key_bytes);

    let (aes_key, aes_iv) = derive_aes_key_iv(key, role, false, &msg_key)?;
    let mut plaintext = ciphertext.to_vec();
    apply_keystream(&aes_key, &aes_iv, &mut plaintext);

    let expected = compute_msg_key(key, role, false, &plaintext)?;
    if expected != msg_key {
        return Err(CryptoError::AuthMismatch);
    }

    Ok(plaintext)
}
