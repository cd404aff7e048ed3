//! # thumbframe
//!
//! Extract single-frame RGBA thumbnails, durations, and metadata from video
//! files, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! `thumbframe` is a small service with three operations: grab one RGBA8888
//! frame near a target timestamp (with a strategy controlling how precisely
//! the decoder must land), read a file's duration, and read its video
//! metadata. Extractions can report a fixed progress checkpoint sequence to
//! a registered listener, keyed by a per-request correlation id.
//!
//! ## Quick Start
//!
//! ```no_run
//! use thumbframe::{ThumbnailRequest, ThumbnailService};
//!
//! let service = ThumbnailService::with_ffmpeg().unwrap();
//!
//! // 320x180 RGBA8888 frame near the 5-second mark.
//! let rgba = service
//!     .extract(
//!         &ThumbnailRequest::new("input.mp4")
//!             .with_width(320)
//!             .with_height(180)
//!             .with_time_ms(5000),
//!     )
//!     .unwrap();
//! assert_eq!(rgba.len(), 320 * 180 * 4);
//!
//! let duration_ms = service.duration("input.mp4").unwrap();
//! let metadata = service.metadata("input.mp4").unwrap();
//! println!("{duration_ms} ms, codec {}", metadata.codec);
//! ```
//!
//! ## Progress reporting
//!
//! Requests carrying a `request_id` emit checkpoint events
//! (`0.0, 0.2, 0.4, 0.6, 0.8, 0.9, 1.0`) tied to named pipeline stages.
//! Register a [`ProgressListener`] on the service's [`ProgressSink`]; the
//! slot is last-listener-wins and events with no listener are dropped.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use thumbframe::{ProgressEvent, ProgressListener, ThumbnailRequest, ThumbnailService};
//!
//! struct PrintProgress;
//! impl ProgressListener for PrintProgress {
//!     fn on_progress(&self, event: &ProgressEvent) {
//!         println!("[{}] {:.0}%", event.request_id, event.progress * 100.0);
//!     }
//! }
//!
//! let service = ThumbnailService::with_ffmpeg().unwrap();
//! service.progress().register(Arc::new(PrintProgress));
//! service
//!     .extract(&ThumbnailRequest::new("input.mp4").with_request_id("req-1"))
//!     .unwrap();
//! ```
//!
//! ## Strategies
//!
//! | strategy | target time | tolerance before | tolerance after |
//! |----------|-------------|------------------|-----------------|
//! | `normal` | as given | 0.5s | 0.5s |
//! | `keyframe` | as given | 0s | 1.0s |
//! | `firstFrame` | forced to 0 | 0s | 0s |
//!
//! Strategy names are case-insensitive; unknown names fall back to
//! `normal`.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `async` | `extract_async` runs the pipeline via `tokio::task::spawn_blocking` |
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod api;
mod convert;
pub mod decoder;
pub mod error;
pub mod extractor;
pub mod metadata;
pub mod progress;
pub mod request;

pub use api::{MethodReply, handle_method};
pub use decoder::{FfmpegDecoder, FfmpegLogLevel, FrameDecoder, set_ffmpeg_log_level};
pub use error::ThumbframeError;
pub use extractor::ThumbnailService;
pub use metadata::VideoMetadata;
pub use progress::{ProgressEvent, ProgressListener, ProgressSink, ProgressStage};
pub use request::{DecodeTolerance, Strategy, ThumbnailPlan, ThumbnailRequest};
