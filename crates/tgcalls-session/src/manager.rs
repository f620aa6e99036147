// src/manager.rs

use tgcalls_negotiate::{assign_payload_types, build_video_formats_message, compute_common_formats};
use tgcalls_transport::EncryptedConnection;
use tgcalls_wire::{CallConfig, ConnectionRole, EncryptionKey, Message, VideoFormat};

use crate::collaborators::{CallObserver, MediaBridge, Transport};
use crate::state::{CallState, VideoEvent, VideoState};

/// Everything `CallManager::new` needs that isn't a collaborator: the
/// shared secret, the locally supported formats, and tunables (§4.4, §6.2).
pub struct CallManagerConfig {
    pub key_material: [u8; 256],
    pub is_outgoing: bool,
    pub local_encoders: Vec<VideoFormat>,
    pub local_decoders: Vec<VideoFormat>,
    pub connection: CallConfig,
}

/// Owns the two [`EncryptedConnection`]s (signaling and transport role) for
/// one call, the call/video state machines, and the routing between them
/// and the host's collaborators (§4.4).
///
/// Deliberately free of any executor/thread-pinning: every method here runs
/// to completion synchronously and is directly unit-testable. The
/// facade crate wraps an instance of this in a [`crate::ThreadBoundObject`]
/// to get the single-threaded-actor model described in §5.
pub struct CallManager {
    signaling: EncryptedConnection,
    transport: EncryptedConnection,

    call_state: CallState,
    video_state: VideoState,
    did_connect_once: bool,

    local_encoders: Vec<VideoFormat>,
    local_decoders: Vec<VideoFormat>,

    muted_microphone: bool,

    transport_collab: Box<dyn Transport>,
    media_bridge: Box<dyn MediaBridge>,
    observer: Box<dyn CallObserver>,
}

impl CallManager {
    pub fn new(
        config: CallManagerConfig,
        transport_collab: Box<dyn Transport>,
        media_bridge: Box<dyn MediaBridge>,
        observer: Box<dyn CallObserver>,
    ) -> Self {
        let signaling_key = EncryptionKey::new(config.key_material, config.is_outgoing);
        let transport_key = EncryptionKey::new(config.key_material, config.is_outgoing);
        Self {
            signaling: EncryptedConnection::new(
                signaling_key,
                ConnectionRole::Signaling,
                config.connection,
            ),
            transport: EncryptedConnection::new(
                transport_key,
                ConnectionRole::Transport,
                config.connection,
            ),
            call_state: CallState::Connecting,
            video_state: VideoState::Possible,
            did_connect_once: false,
            local_encoders: config.local_encoders,
            local_decoders: config.local_decoders,
            muted_microphone: false,
            transport_collab,
            media_bridge,
            observer,
        }
    }

    pub fn call_state(&self) -> CallState {
        self.call_state
    }

    pub fn video_state(&self) -> VideoState {
        self.video_state
    }

    /// Announces the call's initial state. Mirrors `start()` in §4.4's
    /// operation table; construction alone performs no observer callbacks.
    pub fn start(&mut self) {
        self.observer.state_updated(self.call_state, self.video_state);
        self.media_bridge.set_connected(false);
        self.media_bridge.set_mute_outgoing_audio(self.muted_microphone);
    }

    /// Feeds bytes received out-of-band (e.g. over a signaling websocket)
    /// into the signaling `EncryptedConnection` and routes whatever comes
    /// out (§4.4 `receiveSignalingData`).
    pub fn receive_signaling_data(&mut self, bytes: &[u8]) {
        if let Some(decrypted) = self.signaling.handle_incoming_packet(bytes) {
            for message in decrypted.main.into_iter().chain(decrypted.additional) {
                self.route_incoming(message);
            }
        }
    }

    /// Feeds bytes delivered by the `Transport` collaborator into the
    /// transport-role `EncryptedConnection` (§4.4 routing table).
    pub fn receive_transport_data(&mut self, bytes: &[u8]) {
        if let Some(decrypted) = self.transport.handle_incoming_packet(bytes) {
            for message in decrypted.main.into_iter().chain(decrypted.additional) {
                self.route_incoming(message);
            }
        }
    }

    /// `Transport::readyStateChanged` (§4.4 connection state machine).
    pub fn on_transport_ready_state_changed(&mut self, ready: bool) {
        let next = if ready {
            let (next, first_established) = self.call_state.on_transport_ready();
            if first_established {
                self.did_connect_once = true;
                self.reapply_deferred_video_request();
            }
            next
        } else {
            self.call_state.on_transport_lost()
        };
        self.set_call_state(next);
        self.media_bridge.set_connected(ready);
    }

    pub fn set_mute_microphone(&mut self, muted: bool) {
        self.muted_microphone = muted;
        self.media_bridge.set_mute_outgoing_audio(muted);
    }

    /// `requestVideo()` / `setSendVideo(true)` (§4.4 video sub-state
    /// machine, local edge).
    pub fn request_video(&mut self) {
        self.apply_video_event(VideoEvent::LocalRequestVideo);
        self.media_bridge.set_send_video(true);
    }

    pub fn set_incoming_video_output(&mut self, enabled: bool) {
        self.media_bridge.set_incoming_video_output(enabled);
    }

    /// Sends our locally supported formats to the peer (§4.4: "emitting a
    /// `VideoFormats` advertisement is required once at start of
    /// media-session and once per capability change").
    pub fn advertise_video_formats(&mut self) {
        let message = build_video_formats_message(&self.local_encoders, &self.local_decoders);
        self.send_signaling(message);
    }

    /// Forwards a locally discovered ICE candidate batch to the peer over
    /// signaling (§4.4 "Signaling vs. transport routing").
    pub fn send_candidates(&mut self, candidates: Vec<String>) {
        self.send_signaling(Message::CandidatesList(candidates));
    }

    pub fn send_audio_data(&mut self, bytes: Vec<u8>) {
        self.send_transport(Message::AudioData(bytes));
    }

    pub fn send_video_data(&mut self, bytes: Vec<u8>) {
        self.send_transport(Message::VideoData(bytes));
    }

    pub fn send_unstructured_data(&mut self, bytes: Vec<u8>) {
        self.send_transport(Message::UnstructuredData(bytes));
    }

    /// Cleanly ends the call: terminal state, single callback, no further
    /// collaborator calls after this returns (§4.4 `stop()`).
    pub fn stop(&mut self) {
        if self.call_state.is_terminal() {
            return;
        }
        self.media_bridge.set_connected(false);
        self.set_call_state(CallState::Stopped);
    }

    fn set_call_state(&mut self, next: CallState) {
        if next != self.call_state {
            self.call_state = next;
            self.observer.state_updated(self.call_state, self.video_state);
        }
    }

    fn set_video_state(&mut self, next: VideoState) {
        if next != self.video_state {
            self.video_state = next;
            self.observer.state_updated(self.call_state, self.video_state);
        }
    }

    fn apply_video_event(&mut self, event: VideoEvent) {
        let transition = self.video_state.apply(event, self.did_connect_once);
        self.set_video_state(transition.next);
        if transition.emit_request_video {
            self.send_signaling(Message::RequestVideo);
        }
    }

    /// Re-applies a `RemoteRequestVideo` that arrived before the call ever
    /// reached `Established` (§4.4, `VideoTransition::deferred_on_connect`).
    fn reapply_deferred_video_request(&mut self) {
        if self.video_state == VideoState::OutgoingRequested {
            self.apply_video_event(VideoEvent::RemoteRequestVideo);
        }
    }

    /// Dispatches one decoded `Message` per §4.4's routing table, regardless
    /// of which `EncryptedConnection` it arrived on.
    fn route_incoming(&mut self, message: Message) {
        match message {
            Message::CandidatesList(candidates) => {
                self.transport_collab.add_remote_candidates(&candidates);
            }
            Message::VideoFormats { formats, encoders_count } => {
                let common = compute_common_formats(
                    &self.local_encoders,
                    &self.local_decoders,
                    &formats,
                    encoders_count,
                );
                let codecs = assign_payload_types(&common);
                self.media_bridge.receive_message(&Message::VideoFormats {
                    formats: codecs.codecs.into_iter().map(|c| c.format).collect(),
                    encoders_count: common.formats.len(),
                });
            }
            Message::RequestVideo => {
                self.apply_video_event(VideoEvent::RemoteRequestVideo);
            }
            Message::RemoteVideoIsActive(active) => {
                self.observer.remote_video_is_active_updated(active);
            }
            Message::AudioData(bytes) | Message::VideoData(bytes) => {
                self.media_bridge.receive_packet(&bytes);
            }
            Message::UnstructuredData(bytes) => {
                self.media_bridge.receive_packet(&bytes);
            }
        }
    }

    fn send_signaling(&mut self, message: Message) {
        match self.signaling.prepare_for_sending(&message) {
            Ok(packet) => self.observer.signaling_data_emitted(packet.bytes),
            Err(e) => self.fail(e),
        }
    }

    fn send_transport(&mut self, message: Message) {
        match self.transport.prepare_for_sending(&message) {
            Ok(packet) => self.transport_collab.send(&packet.bytes),
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: tgcalls_wire::SendError) {
        tracing::warn!(error = %error, "call manager send failed, transitioning to Failed");
        self.set_call_state(CallState::Failed);
    }
}
