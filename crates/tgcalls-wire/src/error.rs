// src/error.rs

use std::fmt;

/// Authentication/key-derivation failures (§7 `CryptoError`).
///
/// These never name the specific reason to the application (anti-oracle
/// policy); the variants exist so the transport layer can log a diagnostic
/// and the two failure modes can be tested independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptoError {
    /// Recomputed `msgKey` didn't match the one carried on the wire.
    AuthMismatch,
    /// A key-derivation slice fell outside the 256-byte key table.
    KeySliceOutOfBounds,
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CryptoError::AuthMismatch => write!(f, "message authenticator mismatch"),
            CryptoError::KeySliceOutOfBounds => write!(f, "key derivation slice out of bounds"),
        }
    }
}

impl std::error::Error for CryptoError {}

/// Packet/frame structure failures (§7 `FramingError`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramingError {
    /// Packet shorter than `MinIncomingPacketSize`.
    TooShort,
    /// Packet longer than `MaxIncomingPacketSize`.
    TooLong,
    /// A seq was expected but fewer than 4 bytes remained.
    BadTrailing,
    /// The single-message bit was set but more than one element was present,
    /// or trailing bytes remained after the one element.
    SingleMessageViolation,
    /// A body tag byte didn't match any known Message variant or control tag.
    UnknownTag(u8),
    /// A variant body was truncated or otherwise malformed.
    MalformedBody,
}

impl fmt::Display for FramingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FramingError::TooShort => write!(f, "packet shorter than the minimum frame size"),
            FramingError::TooLong => write!(f, "packet longer than the maximum incoming size"),
            FramingError::BadTrailing => write!(f, "truncated trailing seq between frame elements"),
            FramingError::SingleMessageViolation => {
                write!(f, "single-message packet bit set but packet carries extra data")
            }
            FramingError::UnknownTag(tag) => write!(f, "unknown frame element tag: 0x{tag:02x}"),
            FramingError::MalformedBody => write!(f, "truncated or malformed message body"),
        }
    }
}

impl std::error::Error for FramingError {}

/// Duplicate/stale counter rejection (§7 `ReplayError`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayError {
    /// The counter is already present in the replay window.
    AlreadySeen,
    /// The counter is older than `largest - ReplayWindowSize`.
    TooOld,
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplayError::AlreadySeen => write!(f, "counter already present in replay window"),
            ReplayError::TooOld => write!(f, "counter older than the replay window horizon"),
        }
    }
}

impl std::error::Error for ReplayError {}

/// Send-side capacity/wraparound failures (§7 `ResourceExhausted`).
///
/// Unlike the receive-side errors above, these propagate to `CallManager`
/// (counter exhaustion is fatal; the others fail a single send).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceExhausted {
    /// The 30-bit counter has reached `MaxCounter`; the connection cannot
    /// send another message and must be torn down.
    CounterExhausted,
    /// `unackedQueue` is already at `NotAckedMessagesLimit`.
    TooManyUnacked,
    /// The serialized frame would exceed `PacketLimit`.
    PacketTooLarge,
}

impl fmt::Display for ResourceExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceExhausted::CounterExhausted => write!(f, "send counter exhausted"),
            ResourceExhausted::TooManyUnacked => write!(f, "too many unacknowledged messages"),
            ResourceExhausted::PacketTooLarge => write!(f, "serialized packet exceeds the packet limit"),
        }
    }
}

impl std::error::Error for ResourceExhausted {}

/// Error bubbled up from the external `Transport` collaborator.
///
/// Never originated inside this crate family; carried as an opaque string
/// so we don't force a concrete transport error type on callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "transport error: {}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// Failure of `EncryptedConnection::prepare_for_sending`.
///
/// Every variant here is surfaced to the caller (never silently dropped);
/// `ResourceExhausted::CounterExhausted` additionally propagates to
/// `CallManager`, which transitions the call to a terminal failed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendError {
    Resource(ResourceExhausted),
}

impl fmt::Display for SendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendError::Resource(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SendError {}

impl From<ResourceExhausted> for SendError {
    fn from(e: ResourceExhausted) -> Self {
        SendError::Resource(e)
    }
}

/// Failure of `EncryptedConnection::handle_incoming_packet`.
///
/// Per §7 these are all local: the caller logs the reason (at `debug!` for
/// [`CryptoError`], `warn!` for the rest) and drops the packet. The
/// connection's state is never corrupted by a rejected packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecvError {
    Framing(FramingError),
    Crypto(CryptoError),
    Replay(ReplayError),
}

impl fmt::Display for RecvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecvError::Framing(e) => write!(f, "{e}"),
            RecvError::Crypto(e) => write!(f, "{e}"),
            RecvError::Replay(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RecvError {}

impl From<FramingError> for RecvError {
    fn from(e: FramingError) -> Self {
        RecvError::Framing(e)
    }
}

impl From<CryptoError> for RecvError {
    fn from(e: CryptoError) -> Self {
        RecvError::Crypto(e)
    }
}

impl From<ReplayError> for RecvError {
    fn from(e: ReplayError) -> Self {
        RecvError::Replay(e)
    }
}
