// src/connection.rs

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use tgcalls_wire::{
    CallConfig, ConnectionRole, EncryptionKey, FramingError, Message, RecvError, ResourceExhausted,
    SendError, Seq, MAX_COUNTER,
};
use tgcalls_codec::{decode_frame, encode_ack, encode_message, FrameElement};

use crate::replay::ReplayWindow;

/// Authenticator prefix length added by `tgcalls_crypto::seal` (§4.1.3
/// space-policy rationale).
const MSG_KEY_PREFIX_LEN: usize = tgcalls_crypto::MSG_KEY_LEN;

/// An outgoing `requiresAck` frame kept until the peer acknowledges its
/// exact seq (§3 `OutgoingUnackedEntry`).
#[derive(Debug, Clone)]
struct UnackedEntry {
    /// The serialized `[seq][body]` frame, ready to be resent verbatim.
    frame: Vec<u8>,
    seq: Seq,
}

/// A successfully encrypted packet ready to be handed to the `Transport`
/// collaborator.
#[derive(Debug, Clone)]
pub struct EncryptedPacket {
    pub bytes: Vec<u8>,
    pub counter: u32,
}

/// The application-visible result of decrypting an incoming packet (§4.1
/// step 9). `Ack`/`Empty` control elements never appear here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecryptedPacket {
    pub main: Option<Message>,
    pub additional: Vec<Message>,
}

fn enough_space(buffered: usize, amount: usize, packet_limit: usize) -> bool {
    amount < packet_limit && MSG_KEY_PREFIX_LEN + buffered + amount <= packet_limit
}

/// Per-direction framing, keying, replay-rejection and partial-reliability
/// state machine (§4.1). Pinned to a single thread: no internal locking.
pub struct EncryptedConnection {
    key: EncryptionKey,
    role: ConnectionRole,
    config: CallConfig,

    counter: u32,
    unacked: VecDeque<UnackedEntry>,
    pending_acks: VecDeque<Seq>,
    replay_window: ReplayWindow,
}

impl EncryptedConnection {
    pub fn new(key: EncryptionKey, role: ConnectionRole, config: CallConfig) -> Self {
        Self {
            key,
            role,
            config,
            counter: 0,
            unacked: VecDeque::new(),
            pending_acks: VecDeque::new(),
            replay_window: ReplayWindow::new(),
        }
    }

    pub fn role(&self) -> ConnectionRole {
        self.role
    }

    /// Number of entries currently awaiting an ack (exposed for tests and
    /// for `CallManager`'s backpressure diagnostics).
    pub fn unacked_len(&self) -> usize {
        self.unacked.len()
    }

    /// Frames a `Message` into an encrypted, authenticated packet, piggy-
    /// backing pending acks and opportunistically resending the unacked
    /// queue (§4.1 sending contract).
    pub fn prepare_for_sending(&mut self, message: &Message) -> Result<EncryptedPacket, SendError> {
        let requires_ack = message.requires_ack();
        let single_message_packet =
            self.unacked.is_empty() && self.pending_acks.is_empty() && !requires_ack;

        if requires_ack && self.unacked.len() >= self.config.not_acked_messages_limit {
            return Err(ResourceExhausted::TooManyUnacked.into());
        }
        if self.counter >= MAX_COUNTER {
            return Err(ResourceExhausted::CounterExhausted.into());
        }

        let counter = self.counter + 1;
        let seq = Seq::pack(counter, single_message_packet, requires_ack);

        let mut frame = BytesMut::new();
        encode_message(&mut frame, seq, message, single_message_packet);

        if MSG_KEY_PREFIX_LEN + frame.len() > self.config.packet_limit {
            return Err(ResourceExhausted::PacketTooLarge.into());
        }

        // The counter is committed only on a fully successful frame, which
        // keeps monotonicity trivially true; §9's open question notes the
        // source may increment-then-abort instead; S5 requires tests to
        // tolerate either, so this choice is conforming either way.
        self.counter = counter;

        if requires_ack {
            self.unacked.push_back(UnackedEntry { frame: frame.to_vec(), seq });
        }

        let mut plaintext = frame;

        while let Some(&acked_seq) = self.pending_acks.front() {
            if !enough_space(plaintext.len(), 5, self.config.packet_limit) {
                break;
            }
            encode_ack(&mut plaintext, acked_seq);
            self.pending_acks.pop_front();
        }

        let unacked_total: usize = self.unacked.iter().map(|e| e.frame.len()).sum();
        if unacked_total > 0 && enough_space(plaintext.len(), unacked_total, self.config.packet_limit) {
            for entry in &self.unacked {
                plaintext.extend_from_slice(&entry.frame);
            }
        }

        let sealed = tgcalls_crypto::seal(&self.key, self.role, plaintext.to_vec())
            .expect("key derivation offsets are always in-bounds for a 256-byte key");

        Ok(EncryptedPacket { bytes: sealed, counter })
    }

    /// Decrypts and parses an incoming packet. Never propagates an error to
    /// the caller: every rejection is logged and reported as `None` (§7
    /// propagation policy, §4.1 failure semantics).
    pub fn handle_incoming_packet(&mut self, bytes: &[u8]) -> Option<DecryptedPacket> {
        match self.try_handle_incoming_packet(bytes) {
            Ok(packet) => Some(packet),
            Err(RecvError::Crypto(e)) => {
                tracing::debug!(error = %e, role = ?self.role, "rejected incoming packet");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, role = ?self.role, "rejected incoming packet");
                None
            }
        }
    }

    fn try_handle_incoming_packet(&mut self, bytes: &[u8]) -> Result<DecryptedPacket, RecvError> {
        if bytes.len() < self.config.min_incoming_packet_size {
            return Err(FramingError::TooShort.into());
        }
        if bytes.len() > self.config.max_incoming_packet_size {
            return Err(FramingError::TooLong.into());
        }

        let plaintext = tgcalls_crypto::open(&self.key, self.role, bytes)?;

        if plaintext.len() < 4 {
            return Err(FramingError::BadTrailing.into());
        }
        let mut peek = [0u8; 4];
        peek.copy_from_slice(&plaintext[0..4]);
        let single_message_packet = Seq::from_be_bytes(peek).single_message_packet();

        let mut buf = Bytes::from(plaintext);
        let mut main = None;
        let mut additional = Vec::new();
        let mut element_count = 0usize;

        while !buf.is_empty() {
            let (seq, element) = decode_frame(&mut buf, single_message_packet)?;

            if single_message_packet && element_count >= 1 {
                return Err(FramingError::SingleMessageViolation.into());
            }
            element_count += 1;

            match element {
                FrameElement::Ack => {
                    self.ack_my_message(seq);
                }
                FrameElement::Empty => {
                    // Empty fillers occupy a real position in the sender's
                    // stream and participate in replay/ack bookkeeping,
                    // but never surface to the application.
                    match self.replay_window.register(seq.counter(), self.config.replay_window_size) {
                        Ok(()) => {
                            if seq.requires_ack() {
                                self.pending_acks.push_back(seq);
                            }
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "dropping replayed empty frame");
                        }
                    }
                }
                FrameElement::Data(message) => {
                    match self.replay_window.register(seq.counter(), self.config.replay_window_size) {
                        Ok(()) => {
                            if seq.requires_ack() {
                                self.pending_acks.push_back(seq);
                            }
                            if main.is_none() {
                                main = Some(message);
                            } else {
                                additional.push(message);
                            }
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "dropping replayed frame");
                        }
                    }
                }
            }
        }

        // A single-message packet whose one element was a replay leaves
        // `main` empty here; that's a legitimate outcome (§4.1 step 9
        // still returns normally), not a framing violation.
        Ok(DecryptedPacket { main, additional })
    }

    /// Removes the first unacked entry whose stored seq is bit-for-bit
    /// equal to `acked_seq` (§4.1.2). Duplicate/unknown acks are no-ops.
    fn ack_my_message(&mut self, acked_seq: Seq) {
        if let Some(pos) = self.unacked.iter().position(|e| e.seq == acked_seq) {
            self.unacked.remove(pos);
        }
    }
}
