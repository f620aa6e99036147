// src/key.rs

use crate::error::CryptoError;

/// Number of bytes of shared secret material an `EncryptionKey` carries.
pub const KEY_LEN: usize = 256;

/// Offset added when the connection's role is `Signaling` rather than
/// `Transport`, so one shared secret safely drives two independent
/// channels (§3 `ConnectionRole`, §6.2).
const SIGNALING_ROLE_OFFSET: usize = 128;

/// Which of the two channels (signaling vs. bulk transport) an
/// `EncryptedConnection` carries. Changes the key-derivation offset by
/// 128 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionRole {
    Signaling,
    Transport,
}

impl ConnectionRole {
    fn offset(self) -> usize {
        match self {
            ConnectionRole::Signaling => SIGNALING_ROLE_OFFSET,
            ConnectionRole::Transport => 0,
        }
    }
}

/// 256 bytes of shared secret material plus the `isOutgoing` flag that
/// selects which half of the key table a direction uses (§3).
///
/// Both peers derive the same 256 bytes externally (e.g. from a
/// Diffie-Hellman exchange); this type never performs that exchange, it
/// only holds the result. Cheap to clone: the two `EncryptedConnection`s
/// for a call each get their own copy (§5 shared-resource policy).
#[derive(Clone)]
pub struct EncryptionKey {
    material: [u8; KEY_LEN],
    is_outgoing: bool,
}

impl EncryptionKey {
    pub fn new(material: [u8; KEY_LEN], is_outgoing: bool) -> Self {
        Self { material, is_outgoing }
    }

    pub fn is_outgoing(&self) -> bool {
        self.is_outgoing
    }

    /// The base offset `x` used throughout §6.2's derivation, for the given
    /// role and direction (`send` selects the send-side formula, otherwise
    /// the mirrored receive-side formula).
    pub fn base_offset(&self, role: ConnectionRole, send: bool) -> usize {
        let outgoing = if send { self.is_outgoing } else { !self.is_outgoing };
        let direction = if outgoing { 0 } else { 8 };
        direction + role.offset()
    }

    /// Borrow a slice of the key material, checking bounds explicitly so
    /// callers get [`CryptoError::KeySliceOutOfBounds`] instead of a panic
    /// on a malformed derivation offset.
    pub fn slice(&self, start: usize, len: usize) -> Result<&[u8], CryptoError> {
        self.material
            .get(start..start + len)
            .ok_or(CryptoError::KeySliceOutOfBounds)
    }
}

impl std::fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionKey")
            .field("is_outgoing", &self.is_outgoing)
            .field("material", &"<256 bytes>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_offset_shifts_by_128() {
        assert_eq!(ConnectionRole::Signaling.offset(), 128);
        assert_eq!(ConnectionRole::Transport.offset(), 0);
    }

    #[test]
    fn base_offset_mirrors_between_peers() {
        let a = EncryptionKey::new([0u8; KEY_LEN], true);
        let b = EncryptionKey::new([0u8; KEY_LEN], false);

        // A sending to B must use the offset B uses when receiving from A.
        let a_send = a.base_offset(ConnectionRole::Transport, true);
        let b_recv = b.base_offset(ConnectionRole::Transport, false);
        assert_eq!(a_send, b_recv);

        let b_send = b.base_offset(ConnectionRole::Signaling, true);
        let a_recv = a.base_offset(ConnectionRole::Signaling, false);
        assert_eq!(b_send, a_recv);
    }

    #[test]
    fn slice_out_of_bounds_is_reported() {
        let k = EncryptionKey::new([0u8; KEY_LEN], true);
        assert!(k.slice(250, 32).is_err());
        assert!(k.slice(0, 32).is_ok());
    }
}
