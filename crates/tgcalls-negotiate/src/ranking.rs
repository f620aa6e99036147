// src/ranking.rs

use tgcalls_wire::{Message, VideoFormat};

/// Platform-supported encoder priority: AV1 > H.265 > VP9 > H.264 > VP8
/// (§4.3). Lower is more preferred. `None` for anything unsupported.
fn priority(name: &str) -> Option<u8> {
    match name.to_ascii_uppercase().as_str() {
        "AV1" => Some(0),
        "H265" | "H.265" => Some(1),
        "VP9" => Some(2),
        "H264" | "H.264" => Some(3),
        "VP8" => Some(4),
        _ => None,
    }
}

/// Filters out unsupported encoders and sorts the remainder by priority,
/// breaking ties by `(name, parameters)` (§4.3 "Ranking").
pub fn rank_encoders(encoders: &[VideoFormat]) -> Vec<VideoFormat> {
    let mut ranked: Vec<VideoFormat> = encoders
        .iter()
        .filter(|f| priority(&f.name).is_some())
        .cloned()
        .collect();

    ranked.sort_by(|a, b| {
        priority(&a.name)
            .cmp(&priority(&b.name))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.parameters.cmp(&b.parameters))
    });

    ranked
}

/// Builds the `VideoFormats` advertisement to send: ranked encoders first,
/// followed by decoder-only formats not already covered (§4.3 item 1).
pub fn build_video_formats_message(encoders: &[VideoFormat], decoders: &[VideoFormat]) -> Message {
    let ranked = rank_encoders(encoders);
    let encoders_count = ranked.len();
    let mut formats = ranked;

    for decoder in decoders {
        if !formats.contains(decoder) {
            formats.push(decoder.clone());
        }
    }

    Message::VideoFormats { formats, encoders_count }
}
