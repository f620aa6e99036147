// src/state.rs

/// Call-scoped connection lifecycle (§3 `CallState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Connecting,
    Established,
    Reconnecting,
    /// Terminal: reached only via a send-side `ResourceExhausted` failure
    /// (§7 propagation policy). Absorbing — `CallManager` never leaves it.
    Failed,
    /// Terminal: reached only via an intentional `CallManager::stop()`.
    /// Distinguished from `Failed` so observers can tell a clean hangup
    /// from a protocol-level failure.
    Stopped,
}

impl CallState {
    /// `Transport::readyStateChanged(true)` (§4.4 "Connection state
    /// machine"). Returns the new state and whether this is the *first*
    /// time the call reached `Established`.
    pub fn on_transport_ready(self) -> (CallState, bool) {
        match self {
            CallState::Connecting => (CallState::Established, true),
            CallState::Reconnecting => (CallState::Established, false),
            CallState::Established => (CallState::Established, false),
            CallState::Failed => (CallState::Failed, false),
            CallState::Stopped => (CallState::Stopped, false),
        }
    }

    pub fn on_transport_lost(self) -> CallState {
        match self {
            CallState::Established => CallState::Reconnecting,
            other => other,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, CallState::Failed | CallState::Stopped)
    }

    pub fn on_resource_exhausted(self) -> CallState {
        CallState::Failed
    }
}

/// Outgoing-video request sub-state, tracked independently per peer (§3
/// `VideoState`, §4.4 "Video request sub-state machine").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoState {
    Possible,
    IncomingRequested,
    OutgoingRequested,
    Active,
    Inactive,
}

/// The two edges that drive the video sub-state machine (§4.4 diagram).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoEvent {
    /// The application called `requestVideo()` / `setSendVideo(true)`.
    LocalRequestVideo,
    /// A `RequestVideo` message arrived from the peer.
    RemoteRequestVideo,
}

/// Outcome of applying a [`VideoEvent`] to a [`VideoState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoTransition {
    pub next: VideoState,
    /// A `RequestVideo` message must be emitted to the peer.
    pub emit_request_video: bool,
    /// `OutgoingRequested` received a remote request before the
    /// connection ever reached `Established`; promotion to `Active` is
    /// deferred until the first transport-ready transition (§4.4,
    /// Manager.cpp grounding in SPEC_FULL.md §C). The caller must remember
    /// to re-apply [`VideoEvent::RemoteRequestVideo`] once that happens.
    pub deferred_on_connect: bool,
}

impl VideoState {
    /// Applies `event`. `did_connect_once` must be true once the call's
    /// `CallState` has reached `Established` at least once.
    pub fn apply(self, event: VideoEvent, did_connect_once: bool) -> VideoTransition {
        use VideoEvent::*;
        use VideoState::*;

        match (self, event) {
            (Possible, LocalRequestVideo) | (Inactive, LocalRequestVideo) => VideoTransition {
                next: OutgoingRequested,
                emit_request_video: true,
                deferred_on_connect: false,
            },
            (Possible, RemoteRequestVideo) => VideoTransition {
                next: IncomingRequested,
                emit_request_video: false,
                deferred_on_connect: false,
            },
            (OutgoingRequested, RemoteRequestVideo) => {
                if did_connect_once {
                    VideoTransition { next: Active, emit_request_video: false, deferred_on_connect: false }
                } else {
                    VideoTransition {
                        next: OutgoingRequested,
                        emit_request_video: false,
                        deferred_on_connect: true,
                    }
                }
            }
            (IncomingRequested, LocalRequestVideo) => VideoTransition {
                next: Active,
                emit_request_video: true,
                deferred_on_connect: false,
            },
            (Active, _) => VideoTransition { next: Active, emit_request_video: false, deferred_on_connect: false },
            (other, _) => VideoTransition { next: other, emit_request_video: false, deferred_on_connect: false },
        }
    }
}
