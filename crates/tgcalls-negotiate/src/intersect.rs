// src/intersect.rs

use tgcalls_wire::{CommonFormats, VideoFormat};

use crate::ranking::rank_encoders;

/// `ComputeCommonFormats` (§4.3 item 2, §8 properties 11-13).
///
/// `peer_formats[..peer_encoders_count]` is the peer's own encoder
/// advertisement; the remainder are the peer's decoder-only formats.
pub fn compute_common_formats(
    local_encoders: &[VideoFormat],
    local_decoders: &[VideoFormat],
    peer_formats: &[VideoFormat],
    peer_encoders_count: usize,
) -> CommonFormats {
    let ranked_local_encoders = rank_encoders(local_encoders);
    let peer_encoders_count = peer_encoders_count.min(peer_formats.len());

    let mut result: Vec<VideoFormat> = Vec::new();
    let mut preferred: Option<VideoFormat> = None;

    for encoder in &ranked_local_encoders {
        if peer_formats.contains(encoder) {
            if preferred.is_none() {
                preferred = Some(encoder.clone());
            }
            if !result.contains(encoder) {
                result.push(encoder.clone());
            }
        }
    }

    for peer_encoder in &peer_formats[..peer_encoders_count] {
        if result.contains(peer_encoder) {
            continue;
        }
        if local_decoders.contains(peer_encoder) {
            result.push(peer_encoder.clone());
        }
    }

    result.sort_by(|a, b| (&a.name, &a.parameters).cmp(&(&b.name, &b.parameters)));

    let my_encoder_index = preferred
        .as_ref()
        .and_then(|p| result.iter().position(|f| f == p))
        .map(|i| i as i32)
        .unwrap_or(-1);

    CommonFormats { formats: result, my_encoder_index }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s6_codec_intersection() {
        let local_encoders = vec![VideoFormat::new("VP8"), VideoFormat::new("VP9")];
        let local_decoders = vec![VideoFormat::new("H264")];
        let peer_formats = vec![VideoFormat::new("VP9"), VideoFormat::new("H264")];

        let result = compute_common_formats(&local_encoders, &local_decoders, &peer_formats, 2);

        assert_eq!(
            result.formats.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
            vec!["H264", "VP9"]
        );
        assert_eq!(result.my_encoder_index, 1);
    }

    #[test]
    fn no_shared_format_gives_negative_one() {
        let local_encoders = vec![VideoFormat::new("VP8")];
        let local_decoders = vec![VideoFormat::new("VP8")];
        let peer_formats = vec![VideoFormat::new("H264")];

        let result = compute_common_formats(&local_encoders, &local_decoders, &peer_formats, 1);
        assert!(result.formats.is_empty());
        assert_eq!(result.my_encoder_index, -1);
    }

    #[test]
    fn result_is_sorted_by_name_then_parameters() {
        let local_encoders = vec![VideoFormat::new("VP9"), VideoFormat::new("AV1")];
        let local_decoders = vec![];
        let peer_formats = vec![VideoFormat::new("AV1"), VideoFormat::new("VP9")];

        let result = compute_common_formats(&local_encoders, &local_decoders, &peer_formats, 2);
        let names: Vec<_> = result.formats.iter().map(|f| f.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn deterministic_given_identical_inputs() {
        let local_encoders = vec![VideoFormat::new("VP9"), VideoFormat::new("VP8")];
        let local_decoders = vec![VideoFormat::new("H264")];
        let peer_formats = vec![VideoFormat::new("VP8"), VideoFormat::new("H264"), VideoFormat::new("VP9")];

        let a = compute_common_formats(&local_encoders, &local_decoders, &peer_formats, 3);
        let b = compute_common_formats(&local_encoders, &local_decoders, &peer_formats, 3);
        assert_eq!(a, b);
    }
}
