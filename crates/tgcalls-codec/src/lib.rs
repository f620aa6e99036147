//! Wire framing for [`Message`] variants and the in-band control elements
//! (§4.2, §6.1, §6.3).
//!
//! `MessageCodec` owns one frame at a time: `[seq:4B][body]`. The
//! surrounding packet assembly (msgKey prefix, multiple frames, crypto) is
//! `tgcalls-transport`'s job.

use bytes::{Buf, BufMut, BytesMut};

use tgcalls_wire::{
    FramingError, Message, Seq, VideoFormat, TAG_ACK, TAG_AUDIO_DATA, TAG_CANDIDATES_LIST,
    TAG_EMPTY, TAG_REMOTE_VIDEO_IS_ACTIVE, TAG_REQUEST_VIDEO, TAG_UNSTRUCTURED_DATA,
    TAG_VIDEO_DATA, TAG_VIDEO_FORMATS,
};

/// One decoded in-packet element: either an application `Message`, or one
/// of the two control tags that never reach the application (§4.1 step 9).
#[derive(Debug, Clone, PartialEq)]
pub enum FrameElement {
    Data(Message),
    Ack,
    Empty,
}

/// Appends `[seq:4B][tag:1B][body]` for an `Ack` control element.
pub fn encode_ack(buf: &mut BytesMut, seq: Seq) {
    buf.put_slice(&seq.to_be_bytes());
    buf.put_u8(TAG_ACK);
}

/// Appends `[seq:4B][tag:1B]` for an `Empty` filler element.
pub fn encode_empty(buf: &mut BytesMut, seq: Seq) {
    buf.put_slice(&seq.to_be_bytes());
    buf.put_u8(TAG_EMPTY);
}

/// Appends `[seq:4B][body]` for a `Message`.
///
/// The tag byte is always emitted, even in single-message mode. This keeps
/// `decode_frame` parameterized only on the length-implicit behavior of the
/// data variants, rather than needing an additional implicit-tag special
/// case.
pub fn encode_message(buf: &mut BytesMut, seq: Seq, message: &Message, single_message_packet: bool) {
    buf.put_slice(&seq.to_be_bytes());
    buf.put_u8(message.tag());
    encode_body(buf, message, single_message_packet);
}

fn encode_body(buf: &mut BytesMut, message: &Message, single_message_packet: bool) {
    match message {
        Message::CandidatesList(candidates) => {
            buf.put_u8(candidates.len() as u8);
            for candidate in candidates {
                let bytes = candidate.as_bytes();
                buf.put_u32(bytes.len() as u32);
                buf.put_slice(bytes);
            }
        }
        Message::VideoFormats { formats, encoders_count } => {
            buf.put_u32(*encoders_count as u32);
            buf.put_u32(formats.len() as u32);
            for format in formats {
                encode_video_format(buf, format);
            }
        }
        Message::RequestVideo => {}
        Message::RemoteVideoIsActive(active) => buf.put_u8(*active as u8),
        Message::AudioData(bytes) | Message::VideoData(bytes) | Message::UnstructuredData(bytes) => {
            if !single_message_packet {
                buf.put_u32(bytes.len() as u32);
            }
            buf.put_slice(bytes);
        }
    }
}

fn encode_video_format(buf: &mut BytesMut, format: &VideoFormat) {
    let name = format.name.as_bytes();
    buf.put_u32(name.len() as u32);
    buf.put_slice(name);
    buf.put_u8(format.parameters.len() as u8);
    for (k, v) in &format.parameters {
        let k = k.as_bytes();
        let v = v.as_bytes();
        buf.put_u32(k.len() as u32);
        buf.put_slice(k);
        buf.put_u32(v.len() as u32);
        buf.put_slice(v);
    }
}

/// Reads one `[seq][element]` frame from the front of `buf`, advancing it
/// past the element it consumed. `single_message_packet` controls whether
/// `AudioData`/`VideoData`/`UnstructuredData` bodies are length-implicit
/// (consume the rest of `buf`) or length-prefixed (§4.2 parsing note).
pub fn decode_frame(
    buf: &mut bytes::Bytes,
    single_message_packet: bool,
) -> Result<(Seq, FrameElement), FramingError> {
    if buf.len() < 4 {
        return Err(FramingError::BadTrailing);
    }
    let mut seq_bytes = [0u8; 4];
    buf.copy_to_slice(&mut seq_bytes);
    let seq = Seq::from_be_bytes(seq_bytes);

    if buf.is_empty() {
        return Err(FramingError::MalformedBody);
    }
    let tag = buf.get_u8();

    let element = match tag {
        TAG_ACK => FrameElement::Ack,
        TAG_EMPTY => FrameElement::Empty,
        TAG_CANDIDATES_LIST => FrameElement::Data(decode_candidates_list(buf)?),
        TAG_VIDEO_FORMATS => FrameElement::Data(decode_video_formats(buf)?),
        TAG_REQUEST_VIDEO => FrameElement::Data(Message::RequestVideo),
        TAG_REMOTE_VIDEO_IS_ACTIVE => FrameElement::Data(decode_remote_video_is_active(buf)?),
        TAG_AUDIO_DATA => FrameElement::Data(Message::AudioData(decode_raw_bytes(
            buf,
            single_message_packet,
        )?)),
        TAG_VIDEO_DATA => FrameElement::Data(Message::VideoData(decode_raw_bytes(
            buf,
            single_message_packet,
        )?)),
        TAG_UNSTRUCTURED_DATA => FrameElement::Data(Message::UnstructuredData(decode_raw_bytes(
            buf,
            single_message_packet,
        )?)),
        other => return Err(FramingError::UnknownTag(other)),
    };

    Ok((seq, element))
}

fn need(buf: &bytes::Bytes, n: usize) -> Result<(), FramingError> {
    if buf.len() < n {
        Err(FramingError::MalformedBody)
    } else {
        Ok(())
    }
}

fn decode_candidates_list(buf: &mut bytes::Bytes) -> Result<Message, FramingError> {
    need(buf, 1)?;
    let count = buf.get_u8();
    let mut candidates = Vec::with_capacity(count as usize);
    for _ in 0..count {
        need(buf, 4)?;
        let len = buf.get_u32() as usize;
        need(buf, len)?;
        let bytes = buf.split_to(len);
        let s = String::from_utf8(bytes.to_vec()).map_err(|_| FramingError::MalformedBody)?;
        candidates.push(s);
    }
    Ok(Message::CandidatesList(candidates))
}

fn decode_video_formats(buf: &mut bytes::Bytes) -> Result<Message, FramingError> {
    need(buf, 8)?;
    let encoders_count = buf.get_u32() as usize;
    let count = buf.get_u32() as usize;
    let mut formats = Vec::with_capacity(count);
    for _ in 0..count {
        formats.push(decode_video_format(buf)?);
    }
    Ok(Message::VideoFormats { formats, encoders_count })
}

fn decode_video_format(buf: &mut bytes::Bytes) -> Result<VideoFormat, FramingError> {
    need(buf, 4)?;
    let name_len = buf.get_u32() as usize;
    need(buf, name_len)?;
    let name = String::from_utf8(buf.split_to(name_len).to_vec()).map_err(|_| FramingError::MalformedBody)?;

    need(buf, 1)?;
    let param_count = buf.get_u8();
    let mut parameters = Vec::with_capacity(param_count as usize);
    for _ in 0..param_count {
        need(buf, 4)?;
        let k_len = buf.get_u32() as usize;
        need(buf, k_len)?;
        let k = String::from_utf8(buf.split_to(k_len).to_vec()).map_err(|_| FramingError::MalformedBody)?;

        need(buf, 4)?;
        let v_len = buf.get_u32() as usize;
        need(buf, v_len)?;
        let v = String::from_utf8(buf.split_to(v_len).to_vec()).map_err(|_| FramingError::MalformedBody)?;

        parameters.push((k, v));
    }
    Ok(VideoFormat { name, parameters })
}

fn decode_remote_video_is_active(buf: &mut bytes::Bytes) -> Result<Message, FramingError> {
    need(buf, 1)?;
    Ok(Message::RemoteVideoIsActive(buf.get_u8() != 0))
}

fn decode_raw_bytes(buf: &mut bytes::Bytes, single_message_packet: bool) -> Result<Vec<u8>, FramingError> {
    if single_message_packet {
        let rest = buf.split_to(buf.len());
        Ok(rest.to_vec())
    } else {
        need(buf, 4)?;
        let len = buf.get_u32() as usize;
        need(buf, len)?;
        Ok(buf.split_to(len).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn roundtrip(message: Message, single: bool) -> Message {
        let seq = Seq::pack(1, single, message.requires_ack());
        let mut buf = BytesMut::new();
        encode_message(&mut buf, seq, &message, single);
        let mut bytes = Bytes::from(buf.freeze());
        let (decoded_seq, element) = decode_frame(&mut bytes, single).unwrap();
        assert_eq!(decoded_seq, seq);
        if single {
            assert!(bytes.is_empty(), "single-message packet must leave no trailing bytes");
        }
        match element {
            FrameElement::Data(m) => m,
            other => panic!("expected data element, got {other:?}"),
        }
    }

    #[test]
    fn candidates_list_roundtrips_both_modes() {
        let m = Message::CandidatesList(vec!["a=1".into(), "a=2".into()]);
        assert_eq!(roundtrip(m.clone(), true), m);
        assert_eq!(roundtrip(m.clone(), false), m);
    }

    #[test]
    fn video_formats_roundtrips() {
        let m = Message::VideoFormats {
            formats: vec![
                VideoFormat::new("VP9").with_parameter("profile-id", "0"),
                VideoFormat::new("H264"),
            ],
            encoders_count: 1,
        };
        assert_eq!(roundtrip(m.clone(), true), m);
        assert_eq!(roundtrip(m.clone(), false), m);
    }

    #[test]
    fn request_video_roundtrips() {
        assert_eq!(roundtrip(Message::RequestVideo, true), Message::RequestVideo);
        assert_eq!(roundtrip(Message::RequestVideo, false), Message::RequestVideo);
    }

    #[test]
    fn remote_video_is_active_roundtrips() {
        let m = Message::RemoteVideoIsActive(true);
        assert_eq!(roundtrip(m.clone(), true), m);
        assert_eq!(roundtrip(m, false), Message::RemoteVideoIsActive(true));
    }

    #[test]
    fn audio_data_roundtrips_both_modes() {
        let m = Message::AudioData(vec![1, 2, 3, 4, 5]);
        assert_eq!(roundtrip(m.clone(), true), m);
        assert_eq!(roundtrip(m.clone(), false), m);
    }

    #[test]
    fn multi_message_mode_leaves_next_seq_reachable() {
        let first = Message::AudioData(vec![9, 9, 9]);
        let second = Message::RequestVideo;

        let mut buf = BytesMut::new();
        let seq1 = Seq::pack(1, false, false);
        let seq2 = Seq::pack(2, false, true);
        encode_message(&mut buf, seq1, &first, false);
        encode_message(&mut buf, seq2, &second, false);

        let mut bytes = Bytes::from(buf.freeze());
        let (s1, e1) = decode_frame(&mut bytes, false).unwrap();
        assert_eq!(s1, seq1);
        assert_eq!(e1, FrameElement::Data(first));

        let (s2, e2) = decode_frame(&mut bytes, false).unwrap();
        assert_eq!(s2, seq2);
        assert_eq!(e2, FrameElement::Data(second));
        assert!(bytes.is_empty());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut buf = BytesMut::new();
        buf.put_slice(&Seq::pack(1, false, false).to_be_bytes());
        buf.put_u8(0x42);
        let mut bytes = Bytes::from(buf.freeze());
        assert_eq!(decode_frame(&mut bytes, false), Err(FramingError::UnknownTag(0x42)));
    }

    #[test]
    fn ack_and_empty_roundtrip() {
        let mut buf = BytesMut::new();
        let seq = Seq::pack(3, false, false);
        encode_ack(&mut buf, seq);
        let mut bytes = Bytes::from(buf.freeze());
        assert_eq!(decode_frame(&mut bytes, false).unwrap(), (seq, FrameElement::Ack));

        let mut buf = BytesMut::new();
        encode_empty(&mut buf, seq);
        let mut bytes = Bytes::from(buf.freeze());
        assert_eq!(decode_frame(&mut bytes, false).unwrap(), (seq, FrameElement::Empty));
    }
}
