// src/call.rs

use std::sync::Arc;

use tgcalls_session::{
    CallManager, CallManagerConfig, CallObserver, Executor, MediaBridge, ThreadBoundObject,
    Transport,
};

/// The single public entry point (§5 "Scheduling model"): wraps a
/// [`CallManager`] in a [`ThreadBoundObject`] pinned to one dedicated
/// "media" executor thread, matching "the transport collaborator may call
/// back into `CallManager` only by posting to the media executor."
///
/// Every method here posts a task and returns immediately; observer
/// callbacks supplied at construction fire on the media executor thread,
/// not on the caller's thread.
pub struct Call {
    executor: Arc<Executor>,
    manager: ThreadBoundObject<CallManager>,
}

impl Call {
    pub fn new(
        config: CallManagerConfig,
        transport: Box<dyn Transport>,
        media_bridge: Box<dyn MediaBridge>,
        observer: Box<dyn CallObserver>,
    ) -> Self {
        let executor = Arc::new(Executor::spawn("tgcalls-media"));
        let manager = ThreadBoundObject::new(executor.clone(), move || {
            CallManager::new(config, transport, media_bridge, observer)
        });
        Self { executor, manager }
    }

    pub fn start(&self) {
        self.manager.perform(|mgr| mgr.start());
    }

    pub fn receive_signaling_data(&self, bytes: Vec<u8>) {
        self.manager.perform(move |mgr| mgr.receive_signaling_data(&bytes));
    }

    pub fn receive_transport_data(&self, bytes: Vec<u8>) {
        self.manager.perform(move |mgr| mgr.receive_transport_data(&bytes));
    }

    pub fn on_transport_ready_state_changed(&self, ready: bool) {
        self.manager.perform(move |mgr| mgr.on_transport_ready_state_changed(ready));
    }

    pub fn set_mute_microphone(&self, muted: bool) {
        self.manager.perform(move |mgr| mgr.set_mute_microphone(muted));
    }

    pub fn request_video(&self) {
        self.manager.perform(|mgr| mgr.request_video());
    }

    pub fn set_incoming_video_output(&self, enabled: bool) {
        self.manager.perform(move |mgr| mgr.set_incoming_video_output(enabled));
    }

    pub fn advertise_video_formats(&self) {
        self.manager.perform(|mgr| mgr.advertise_video_formats());
    }

    pub fn send_candidates(&self, candidates: Vec<String>) {
        self.manager.perform(move |mgr| mgr.send_candidates(candidates));
    }

    pub fn send_audio_data(&self, bytes: Vec<u8>) {
        self.manager.perform(move |mgr| mgr.send_audio_data(bytes));
    }

    pub fn send_video_data(&self, bytes: Vec<u8>) {
        self.manager.perform(move |mgr| mgr.send_video_data(bytes));
    }

    pub fn send_unstructured_data(&self, bytes: Vec<u8>) {
        self.manager.perform(move |mgr| mgr.send_unstructured_data(bytes));
    }

    /// Posts a teardown task to the media executor (§5 "Cancellation &
    /// timeouts"). Any task already queued ahead of this one still runs
    /// against a live `CallManager`; anything posted after observes the
    /// torn-down manager only once `stop()` itself has run.
    pub fn stop(&self) {
        self.manager.perform(|mgr| mgr.stop());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use tgcalls_wire::{CallConfig, Message, VideoFormat};

    struct NoopTransport;
    impl Transport for NoopTransport {
        fn send(&mut self, _bytes: &[u8]) {}
        fn add_remote_candidates(&mut self, _candidates: &[String]) {}
    }

    struct NoopMediaBridge;
    impl MediaBridge for NoopMediaBridge {
        fn set_connected(&mut self, _connected: bool) {}
        fn receive_packet(&mut self, _bytes: &[u8]) {}
        fn set_send_video(&mut self, _capturing: bool) {}
        fn set_incoming_video_output(&mut self, _enabled: bool) {}
        fn set_mute_outgoing_audio(&mut self, _muted: bool) {}
        fn receive_message(&mut self, _message: &Message) {}
    }

    struct RecordingObserver(Arc<Mutex<Vec<String>>>);
    impl CallObserver for RecordingObserver {
        fn state_updated(
            &mut self,
            state: tgcalls_session::CallState,
            video_state: tgcalls_session::VideoState,
        ) {
            self.0.lock().push(format!("{state:?}/{video_state:?}"));
        }
        fn signaling_data_emitted(&mut self, _bytes: Vec<u8>) {}
        fn remote_video_is_active_updated(&mut self, _active: bool) {}
    }

    fn config() -> CallManagerConfig {
        CallManagerConfig {
            key_material: [3u8; 256],
            is_outgoing: true,
            local_encoders: vec![VideoFormat::new("VP8")],
            local_decoders: vec![VideoFormat::new("H264")],
            connection: CallConfig::default(),
        }
    }

    #[test]
    fn start_runs_on_the_media_executor_and_reaches_the_observer() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let call = Call::new(
            config(),
            Box::new(NoopTransport),
            Box::new(NoopMediaBridge),
            Box::new(RecordingObserver(events.clone())),
        );

        call.start();
        call.stop();

        // `Call` exposes no blocking join; dropping it runs `Executor`'s
        // `Drop` last (after the `ThreadBoundObject` teardown task is
        // posted), which closes the channel and joins the thread.
        drop(call);
        assert!(events.lock().iter().any(|e| e.contains("Connecting")));
        assert!(events.lock().iter().any(|e| e.contains("Stopped")));
    }
}
