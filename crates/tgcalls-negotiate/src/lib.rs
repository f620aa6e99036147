//! Codec ranking, format intersection, and payload-type/FEC/RTX
//! assignment (§4.3).

mod intersect;
mod payload;
mod ranking;

pub use intersect::compute_common_formats;
pub use payload::assign_payload_types;
pub use ranking::{build_video_formats_message, rank_encoders};
