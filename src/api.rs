//! Method-call surface.
//!
//! [`handle_method`] is the outermost service boundary: it accepts a method
//! name with a JSON argument map, dispatches to [`ThumbnailService`], and
//! converts every outcome into a [`MethodReply`]. Nothing crosses this
//! boundary as a panic or unstructured fault, and unknown method names get
//! a distinct not-implemented signal rather than a generic error.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use thumbframe::{MethodReply, ThumbnailService, handle_method};
//!
//! let service = ThumbnailService::with_ffmpeg().unwrap();
//! let reply = handle_method(
//!     &service,
//!     "getThumbnail",
//!     &json!({ "path": "input.mp4", "width": 320, "strategy": "keyframe" }),
//! );
//! match reply {
//!     MethodReply::Bytes(rgba) => println!("{} bytes", rgba.len()),
//!     MethodReply::Error { code, message } => eprintln!("{code}: {message}"),
//!     _ => {}
//! }
//! ```

use serde_json::Value;

use crate::{
    decoder::FrameDecoder,
    error::ThumbframeError,
    extractor::ThumbnailService,
    request::{DEFAULT_SIZE, DEFAULT_TIME_MS, ThumbnailRequest},
};

/// Outcome of one method call.
#[derive(Debug)]
#[must_use]
pub enum MethodReply {
    /// Raw RGBA8888 pixel buffer (`getThumbnail`).
    Bytes(Vec<u8>),
    /// JSON value (`getVideoDuration`, `getVideoMetadata`).
    Json(Value),
    /// A typed failure with its stable wire code.
    Error {
        /// Stable string identifier, e.g. `"EXTRACTION_FAILED"`.
        code: &'static str,
        /// Human-readable description.
        message: String,
    },
    /// The method name is not part of this service's API.
    NotImplemented,
}

impl From<ThumbframeError> for MethodReply {
    fn from(error: ThumbframeError) -> Self {
        MethodReply::Error {
            code: error.code(),
            message: error.to_string(),
        }
    }
}

/// Dispatch one method call against the service.
///
/// Supported methods: `getThumbnail`, `getVideoDuration`,
/// `getVideoMetadata`. Anything else yields
/// [`MethodReply::NotImplemented`].
pub fn handle_method<D: FrameDecoder>(
    service: &ThumbnailService<D>,
    method: &str,
    arguments: &Value,
) -> MethodReply {
    log::debug!("Method called: {method}");

    match method {
        "getThumbnail" => match service.extract(&request_from_arguments(arguments)) {
            Ok(buffer) => MethodReply::Bytes(buffer),
            Err(error) => {
                log::error!("getThumbnail failed: {error}");
                error.into()
            }
        },
        "getVideoDuration" => match service.duration(string_argument(arguments, "path")) {
            Ok(duration_ms) => MethodReply::Json(Value::from(duration_ms)),
            Err(error) => {
                log::error!("getVideoDuration failed: {error}");
                error.into()
            }
        },
        "getVideoMetadata" => match service.metadata(string_argument(arguments, "path")) {
            Ok(metadata) => MethodReply::Json(metadata.to_json()),
            Err(error) => {
                log::error!("getVideoMetadata failed: {error}");
                error.into()
            }
        },
        other => {
            log::warn!("Unknown method: {other}");
            MethodReply::NotImplemented
        }
    }
}

fn string_argument<'a>(arguments: &'a Value, key: &str) -> &'a str {
    arguments.get(key).and_then(Value::as_str).unwrap_or("")
}

/// Build a [`ThumbnailRequest`] from a JSON argument map.
///
/// Missing or mistyped optional arguments fall back to their defaults; a
/// missing `path` surfaces as `BAD_ARGS` when the request is normalized.
fn request_from_arguments(arguments: &Value) -> ThumbnailRequest {
    let mut request = ThumbnailRequest::new(string_argument(arguments, "path"));

    request.size = arguments
        .get("size")
        .and_then(Value::as_u64)
        .map(|size| size as u32)
        .unwrap_or(DEFAULT_SIZE);
    request.width = arguments
        .get("width")
        .and_then(Value::as_u64)
        .map(|width| width as u32);
    request.height = arguments
        .get("height")
        .and_then(Value::as_u64)
        .map(|height| height as u32);
    request.time_ms = arguments
        .get("timeMs")
        .and_then(Value::as_u64)
        .unwrap_or(DEFAULT_TIME_MS);
    request.strategy = arguments
        .get("strategy")
        .and_then(Value::as_str)
        .unwrap_or("normal")
        .to_string();
    request.request_id = arguments
        .get("requestId")
        .and_then(Value::as_str)
        .map(str::to_string);

    request
}
