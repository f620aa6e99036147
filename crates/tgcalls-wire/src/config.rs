// src/config.rs

/// Tunable limits for an `EncryptedConnection` (§6.5).
///
/// These are compile-time constants in the original, but are exposed as an
/// overridable struct so tests can exercise `PacketTooLarge`/replay-window
/// edge cases without constructing megabyte buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallConfig {
    /// Max serialized frame size before the 16-byte msgKey prefix.
    pub packet_limit: usize,
    /// Max accepted incoming packet size, msgKey prefix included.
    pub max_incoming_packet_size: usize,
    /// Min accepted incoming packet size, msgKey prefix included.
    pub min_incoming_packet_size: usize,
    /// Max entries retained in the incoming replay window.
    pub replay_window_size: u32,
    /// Sanity bound on the outgoing unacked queue length.
    pub not_acked_messages_limit: usize,
}

impl Default for CallConfig {
    fn default() -> Self {
        Self {
            packet_limit: 1400,
            max_incoming_packet_size: 131072,
            min_incoming_packet_size: 21,
            replay_window_size: 64,
            not_acked_messages_limit: 1 << 20,
        }
    }
}
