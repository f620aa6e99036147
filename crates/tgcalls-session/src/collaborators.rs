// src/collaborators.rs
//
// Host-supplied collaborators and the callback sink the core invokes
// (§6.4 "Application surface"). Everything here is an opaque interface:
// ICE gathering, the media engine, and platform capture/render are
// external collaborators this crate never implements (§1 "Out of scope").

use tgcalls_wire::Message;

use crate::state::{CallState, VideoState};

/// The opaque byte-transport collaborator (§6.4 `Transport`). `CallManager`
/// only ever calls this for the transport-role connection; signaling bytes
/// go through [`CallObserver::signaling_data_emitted`] instead, since the
/// application is responsible for shuttling those out of band.
pub trait Transport: Send {
    fn send(&mut self, bytes: &[u8]);
    /// Forwards a decoded ICE candidate list to the network layer. Named
    /// "network collaborator" in §4.4's routing table; folded into
    /// `Transport` here since ICE gathering is the same external
    /// collaborator (§1 Non-goals).
    fn add_remote_candidates(&mut self, candidates: &[String]);
}

/// The opaque media-engine collaborator (§6.4 `MediaBridge`). Codec
/// implementation, jitter buffering, and rendering are Non-goals (§1); this
/// trait only carries the envelopes and control messages the core must
/// still route somewhere.
pub trait MediaBridge: Send {
    fn set_connected(&mut self, connected: bool);
    fn receive_packet(&mut self, bytes: &[u8]);
    fn set_send_video(&mut self, capturing: bool);
    fn set_incoming_video_output(&mut self, enabled: bool);
    fn set_mute_outgoing_audio(&mut self, muted: bool);
    /// `VideoFormats`-driven negotiation notifications, and any other
    /// message variant the media engine itself must see (§6.4).
    fn receive_message(&mut self, message: &Message);
}

/// Callbacks the core invokes on the application (§6.4 "Callbacks the core
/// invokes").
pub trait CallObserver: Send {
    fn state_updated(&mut self, state: CallState, video_state: VideoState);
    /// Outer sink for encrypted signaling packets; the application
    /// transports these out-of-band.
    fn signaling_data_emitted(&mut self, bytes: Vec<u8>);
    fn remote_video_is_active_updated(&mut self, active: bool);
}
