// src/payload.rs

use tgcalls_wire::{Codec, CommonCodecs, CommonFormats, RtcpFeedback, VideoFormat};

/// Start of the dynamic payload-type space (§6.5 `DynamicPT range`).
const PT_START: u8 = 96;
/// Inclusive end of the dynamic payload-type space.
const PT_END: u8 = 127;

/// Advertised but never consumed (§6.5, §9 "FlexFEC advertisement").
const FLEXFEC_REPAIR_WINDOW: &str = "10000000";

/// Assigns sequential payload types to `common.formats`, then to the
/// virtual RED/ULPFEC/FlexFEC entries, pairing each with an RTX codec
/// except ULPFEC and FlexFEC (§4.3 "Payload-type assignment"; RED keeps
/// its RTX pair, see DESIGN.md).
///
/// Stops cleanly and returns only what fit if the `[96, 127]` space is
/// exhausted (§8 property 14).
pub fn assign_payload_types(common: &CommonFormats) -> CommonCodecs {
    let mut codecs = Vec::new();
    let mut next_pt = PT_START;

    for format in &common.formats {
        if !push_codec(&mut codecs, &mut next_pt, format.clone(), RtcpFeedback::FULL, true) {
            return CommonCodecs { codecs, my_encoder_index: common.my_encoder_index };
        }
    }

    if !push_codec(&mut codecs, &mut next_pt, VideoFormat::new("red"), RtcpFeedback::NONE, true) {
        return CommonCodecs { codecs, my_encoder_index: common.my_encoder_index };
    }
    if !push_codec(&mut codecs, &mut next_pt, VideoFormat::new("ulpfec"), RtcpFeedback::NONE, false) {
        return CommonCodecs { codecs, my_encoder_index: common.my_encoder_index };
    }
    let flexfec = VideoFormat::new("flexfec-03").with_parameter("repair-window", FLEXFEC_REPAIR_WINDOW);
    push_codec(&mut codecs, &mut next_pt, flexfec, RtcpFeedback::TRANSPORT_CC_ONLY, false);

    CommonCodecs { codecs, my_encoder_index: common.my_encoder_index }
}

/// Allocates one payload type for `format` (and, if `with_rtx`, a second
/// one for its RTX pair) out of `[PT_START, PT_END]`. Returns `false`
/// without mutating `codecs` if there isn't room for what was requested.
fn push_codec(
    codecs: &mut Vec<Codec>,
    next_pt: &mut u8,
    format: VideoFormat,
    feedback: RtcpFeedback,
    with_rtx: bool,
) -> bool {
    let needed = if with_rtx { 2 } else { 1 };
    if (PT_END as u16 + 1).saturating_sub(*next_pt as u16) < needed {
        return false;
    }

    let payload_type = *next_pt;
    *next_pt += 1;
    let rtx_payload_type = if with_rtx {
        let rtx = *next_pt;
        *next_pt += 1;
        Some(rtx)
    } else {
        None
    };

    codecs.push(Codec { format, payload_type, feedback, rtx_payload_type });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formats(names: &[&str]) -> CommonFormats {
        CommonFormats {
            formats: names.iter().map(|n| VideoFormat::new(*n)).collect(),
            my_encoder_index: 0,
        }
    }

    #[test]
    fn assigns_sequential_payload_types_with_rtx_pairs() {
        let common = formats(&["H264", "VP9"]);
        let result = assign_payload_types(&common);

        // H264 -> 96/97, VP9 -> 98/99, red -> 100/101, ulpfec -> 102 (no rtx),
        // flexfec -> 103 (no rtx).
        let pts: Vec<(u8, Option<u8>)> =
            result.codecs.iter().map(|c| (c.payload_type, c.rtx_payload_type)).collect();
        assert_eq!(
            pts,
            vec![(96, Some(97)), (98, Some(99)), (100, Some(101)), (102, None), (103, None)]
        );
    }

    #[test]
    fn red_gets_an_rtx_pair() {
        let common = formats(&[]);
        let result = assign_payload_types(&common);
        let red = result.codecs.iter().find(|c| c.format.name == "red").unwrap();
        assert!(red.rtx_payload_type.is_some());
    }

    #[test]
    fn ulpfec_and_flexfec_have_no_rtx_pair() {
        let common = formats(&[]);
        let result = assign_payload_types(&common);
        let ulpfec = result.codecs.iter().find(|c| c.format.name == "ulpfec").unwrap();
        let flexfec = result.codecs.iter().find(|c| c.format.name == "flexfec-03").unwrap();
        assert!(ulpfec.rtx_payload_type.is_none());
        assert!(flexfec.rtx_payload_type.is_none());
    }

    #[test]
    fn flexfec_carries_the_repair_window_parameter() {
        let common = formats(&[]);
        let result = assign_payload_types(&common);
        let flexfec = result.codecs.iter().find(|c| c.format.name == "flexfec-03").unwrap();
        assert_eq!(
            flexfec.format.parameters,
            vec![("repair-window".to_string(), "10000000".to_string())]
        );
    }

    #[test]
    fn payload_type_assignment_is_injective_and_stops_at_exhaustion() {
        // 16 codecs * 2 PTs each = 32, which already exceeds the 32-slot
        // [96, 127] space once RED/ULPFEC/FlexFEC are added; verify no
        // payload type repeats and assignment stops cleanly.
        let names: Vec<String> = (0..16).map(|i| format!("codec-{i}")).collect();
        let common = CommonFormats {
            formats: names.iter().map(|n| VideoFormat::new(n.clone())).collect(),
            my_encoder_index: -1,
        };
        let result = assign_payload_types(&common);

        let mut seen = std::collections::HashSet::new();
        for codec in &result.codecs {
            assert!(seen.insert(codec.payload_type), "duplicate payload type");
            if let Some(rtx) = codec.rtx_payload_type {
                assert!(seen.insert(rtx), "duplicate rtx payload type");
            }
            assert!(codec.payload_type >= PT_START && codec.payload_type <= PT_END);
        }
    }

    #[test]
    fn my_encoder_index_is_carried_through() {
        let mut common = formats(&["VP8"]);
        common.my_encoder_index = 0;
        let result = assign_payload_types(&common);
        assert_eq!(result.my_encoder_index, 0);
    }
}
