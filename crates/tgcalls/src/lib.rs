//! Encrypted 1:1 call transport, signaling, and codec negotiation core.
//!
//! This crate is the public facade over the workspace: [`Call`] wires a
//! [`tgcalls_session::CallManager`] onto its own dedicated executor thread
//! (§5) and exposes the §6.4 application surface. Everything else
//! re-exported here is the vocabulary that surface is built from.

mod call;

pub use call::Call;

pub use tgcalls_codec::{decode_frame, encode_ack, encode_empty, encode_message, FrameElement};
pub use tgcalls_crypto::{open, seal};
pub use tgcalls_negotiate::{
    assign_payload_types, build_video_formats_message, compute_common_formats, rank_encoders,
};
pub use tgcalls_session::{
    CallManager, CallManagerConfig, CallObserver, CallState, Executor, MediaBridge,
    ThreadBoundObject, Transport, VideoEvent, VideoState, VideoTransition,
};
pub use tgcalls_transport::{DecryptedPacket, EncryptedConnection, EncryptedPacket, ReplayWindow};
pub use tgcalls_wire::{
    CallConfig, Codec, CommonCodecs, CommonFormats, ConnectionRole, CryptoError, EncryptionKey,
    FramingError, Message, RecvError, ReplayError, ResourceExhausted, RtcpFeedback, SendError,
    Seq, TransportError, VideoFormat,
};
