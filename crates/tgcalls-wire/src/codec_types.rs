// src/codec_types.rs

use crate::message::VideoFormat;

/// Default RTCP feedback parameters attached by payload-type assignment
/// (§4.3, §6.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcpFeedback {
    pub goog_remb: bool,
    pub transport_cc: bool,
    pub ccm_fir: bool,
    pub nack: bool,
    pub nack_pli: bool,
}

impl RtcpFeedback {
    pub const NONE: Self = Self {
        goog_remb: false,
        transport_cc: false,
        ccm_fir: false,
        nack: false,
        nack_pli: false,
    };

    pub const TRANSPORT_CC_ONLY: Self = Self { transport_cc: true, ..Self::NONE };

    pub const FULL: Self = Self {
        goog_remb: true,
        transport_cc: true,
        ccm_fir: true,
        nack: true,
        nack_pli: true,
    };
}

/// Result of `ComputeCommonFormats` (§3 `CommonFormats`): the intersected,
/// sorted format list plus the index of the locally preferred encoder, or
/// `-1` if the peer shares none of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonFormats {
    pub formats: Vec<VideoFormat>,
    pub my_encoder_index: i32,
}

/// A negotiated codec with an assigned payload type, optionally paired with
/// an RTX codec at a following payload type (§4.3, §3 `CommonCodecs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codec {
    pub format: VideoFormat,
    pub payload_type: u8,
    pub feedback: RtcpFeedback,
    pub rtx_payload_type: Option<u8>,
}

/// Result of payload-type assignment: the final codec list plus the
/// inherited `my_encoder_index` from the `CommonFormats` it was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonCodecs {
    pub codecs: Vec<Codec>,
    pub my_encoder_index: i32,
}
