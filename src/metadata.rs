//! Video metadata types.
//!
//! [`VideoMetadata`] is the pass-through record returned by
//! [`FrameDecoder::probe`](crate::FrameDecoder::probe). It is extracted from
//! the container headers without decoding any frames.

use std::time::Duration;

use serde_json::{Value, json};

/// Metadata for the best video stream of a media file.
///
/// Returned unmodified from the decoder probe; the service imposes no
/// invariant beyond `duration >= 0` signalling success.
#[derive(Debug, Clone)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Total container duration.
    pub duration: Duration,
    /// Codec name (e.g. `"h264"`, `"vp9"`, `"av1"`).
    pub codec: String,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Bit rate in bits per second, when the container reports one.
    pub bit_rate: Option<u64>,
    /// Rotation in degrees from the stream's `rotate` tag, when present.
    pub rotation: Option<i32>,
}

impl VideoMetadata {
    /// Duration in whole milliseconds, the unit used across the service
    /// boundary.
    pub fn duration_ms(&self) -> i64 {
        self.duration.as_millis() as i64
    }

    /// Serialize to the JSON record shape reported to callers.
    pub fn to_json(&self) -> Value {
        json!({
            "width": self.width,
            "height": self.height,
            "duration": self.duration_ms(),
            "codec": self.codec,
            "fps": self.frames_per_second,
            "bitRate": self.bit_rate,
            "rotation": self.rotation,
        })
    }
}
