//! Decoder capability and its FFmpeg implementation.
//!
//! The extraction pipeline talks to the video-decoding library through the
//! [`FrameDecoder`] trait: `probe` parses container metadata and
//! `decode_frame` produces exactly one RGBA frame near a target timestamp.
//! [`FfmpegDecoder`] is the production implementation, built on
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next). Alternative
//! implementations (platform media frameworks, test stubs) plug in behind
//! the same trait.

use std::path::Path;
use std::time::Duration;

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    format::Pixel,
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::log::Level,
};
use image::RgbaImage;

use crate::{
    convert,
    error::ThumbframeError,
    metadata::VideoMetadata,
    request::DecodeTolerance,
};

/// Capability the extraction pipeline requires from a decoding backend.
///
/// Implementations must be [`Send`] and [`Sync`]: the service may drive
/// concurrent extractions from multiple threads, each against its own
/// demuxer context.
pub trait FrameDecoder: Send + Sync {
    /// Parse container metadata without decoding any frames.
    fn probe(&self, path: &Path) -> Result<VideoMetadata, ThumbframeError>;

    /// Seek into `[target - tolerance.before, target + tolerance.after]` and
    /// decode exactly one frame, converted to RGBA at source resolution.
    ///
    /// The decoder chooses the frame it can produce most cheaply inside the
    /// window.
    fn decode_frame(
        &self,
        path: &Path,
        target: Duration,
        tolerance: DecodeTolerance,
    ) -> Result<RgbaImage, ThumbframeError>;
}

/// FFmpeg-backed [`FrameDecoder`].
///
/// Each call opens its own demuxer and codec context, so concurrent calls
/// never contend on shared native handles.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use thumbframe::{FfmpegDecoder, FrameDecoder, Strategy, ThumbframeError};
///
/// let decoder = FfmpegDecoder::new()?;
/// let meta = decoder.probe("input.mp4".as_ref())?;
/// let frame = decoder.decode_frame(
///     "input.mp4".as_ref(),
///     Duration::from_secs(1),
///     Strategy::Normal.tolerance(),
/// )?;
/// # Ok::<(), ThumbframeError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FfmpegDecoder;

impl FfmpegDecoder {
    /// Initialise FFmpeg and create the decoder.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbframeError::UnsupportedPlatform`] when the FFmpeg
    /// libraries cannot be initialised in this environment. The error is
    /// raised here, before any decode attempt.
    pub fn new() -> Result<Self, ThumbframeError> {
        ffmpeg_next::init().map_err(|error| {
            ThumbframeError::UnsupportedPlatform(format!(
                "FFmpeg initialisation failed: {error}"
            ))
        })?;
        Ok(Self)
    }
}

impl FrameDecoder for FfmpegDecoder {
    fn probe(&self, path: &Path) -> Result<VideoMetadata, ThumbframeError> {
        let input = ffmpeg_next::format::input(&path).map_err(|error| {
            ThumbframeError::MetadataFailed(format!(
                "Failed to open {}: {error}",
                path.display()
            ))
        })?;

        let stream = input
            .streams()
            .best(Type::Video)
            .ok_or_else(|| ThumbframeError::MetadataFailed("No video stream found".to_string()))?;
        let stream_index = stream.index();

        let decoder = CodecContext::from_parameters(stream.parameters())
            .map_err(|error| {
                ThumbframeError::MetadataFailed(format!(
                    "Failed to read codec parameters for stream {stream_index}: {error}"
                ))
            })?
            .decoder()
            .video()
            .map_err(|error| {
                ThumbframeError::MetadataFailed(format!(
                    "Failed to create video decoder for stream {stream_index}: {error}"
                ))
            })?;

        let duration_microseconds = input.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let frame_rate = stream.avg_frame_rate();
        let frames_per_second = if frame_rate.denominator() != 0 {
            frame_rate.numerator() as f64 / frame_rate.denominator() as f64
        } else {
            let rate = stream.rate();
            if rate.denominator() != 0 {
                rate.numerator() as f64 / rate.denominator() as f64
            } else {
                0.0
            }
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let bit_rate = {
            let rate = decoder.bit_rate();
            if rate > 0 { Some(rate as u64) } else { None }
        };

        let rotation = stream
            .metadata()
            .get("rotate")
            .and_then(|value| value.parse::<i32>().ok());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            duration,
            codec,
            frames_per_second,
            bit_rate,
            rotation,
        };

        log::debug!(
            "Probed {}: {}x{}, {:.2} fps, codec={}, duration={:.2}s",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.codec,
            metadata.duration.as_secs_f64(),
        );

        Ok(metadata)
    }

    fn decode_frame(
        &self,
        path: &Path,
        target: Duration,
        tolerance: DecodeTolerance,
    ) -> Result<RgbaImage, ThumbframeError> {
        let mut input = ffmpeg_next::format::input(&path).map_err(|error| {
            ThumbframeError::ExtractionFailed(format!(
                "Failed to open {}: {error}",
                path.display()
            ))
        })?;

        let (stream_index, time_base) = {
            let stream = input.streams().best(Type::Video).ok_or_else(|| {
                ThumbframeError::ExtractionFailed("No video stream found".to_string())
            })?;
            (stream.index(), stream.time_base())
        };

        let mut decoder = {
            let stream = input
                .stream(stream_index)
                .ok_or_else(|| ThumbframeError::ExtractionFailed("Video stream vanished".to_string()))?;
            CodecContext::from_parameters(stream.parameters())?
                .decoder()
                .video()?
        };

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGBA,
            decoder.width(),
            decoder.height(),
            ScalingFlags::BILINEAR,
        )?;

        // Container-level seek in AV_TIME_BASE (microseconds), bounded by
        // the tolerance window. The demuxer lands on the nearest keyframe
        // it can reach inside the window.
        let window_start = target.saturating_sub(tolerance.before);
        let window_end = target + tolerance.after;
        let target_timestamp = target.as_micros() as i64;
        let seek_result = input.seek(
            target_timestamp,
            (window_start.as_micros() as i64)..(window_end.as_micros() as i64),
        );
        if let Err(error) = seek_result {
            // Keep going: an out-of-window seek still positions the demuxer
            // somewhere decodable, and the frame filter below decides
            // whether what comes out is acceptable.
            log::warn!(
                "Seek to {:?} failed ({error}), decoding from current position",
                target,
            );
        }

        // Accept the first frame at or after the window's lower edge. For
        // firstFrame (zero tolerance, target zero) that is frame zero; for
        // keyframe it is the sync frame the seek landed on.
        let accept_from = window_start.as_secs_f64();

        let mut decoded_frame = VideoFrame::empty();
        let mut rgba_frame = VideoFrame::empty();

        for (stream, packet) in input.packets() {
            if stream.index() != stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                let pts_seconds =
                    pts_to_seconds(decoded_frame.pts().unwrap_or(0), time_base);
                if pts_seconds >= accept_from {
                    scaler.run(&decoded_frame, &mut rgba_frame)?;
                    return frame_to_image(&rgba_frame, decoder.width(), decoder.height());
                }
            }
        }

        // Flush: the target may sit in the final group of pictures.
        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            let pts_seconds = pts_to_seconds(decoded_frame.pts().unwrap_or(0), time_base);
            if pts_seconds >= accept_from {
                scaler.run(&decoded_frame, &mut rgba_frame)?;
                return frame_to_image(&rgba_frame, decoder.width(), decoder.height());
            }
        }

        Err(ThumbframeError::ExtractionFailed(format!(
            "No decodable frame within {:?} of {:?} in {}",
            tolerance.after,
            target,
            path.display(),
        )))
    }
}

/// Convert a scaled RGBA video frame to an [`RgbaImage`].
fn frame_to_image(
    rgba_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<RgbaImage, ThumbframeError> {
    let buffer = convert::frame_to_rgba_buffer(rgba_frame, width, height);
    convert::rgba_buffer_to_image(buffer, width, height).ok_or_else(|| {
        ThumbframeError::ExtractionFailed(
            "Failed to construct RGBA image from decoded frame data".to_string(),
        )
    })
}

/// Rescale a PTS value from stream time base to seconds.
fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// FFmpeg internal log verbosity level.
///
/// FFmpeg prints its own diagnostics to stderr, separate from the Rust
/// [`log`] facade. This maps onto FFmpeg's `AV_LOG_*` constants so callers
/// can silence or tune that output without importing `ffmpeg-next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print no output at all.
    Quiet,
    /// Only unrecoverable errors that abort the process.
    Panic,
    /// Only unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Extremely verbose tracing output.
    Trace,
}

impl FfmpegLogLevel {
    fn to_ffmpeg_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }
}

/// Set FFmpeg's internal log verbosity.
///
/// Controls what FFmpeg itself prints to stderr; does not affect Rust-side
/// `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.to_ffmpeg_level());
}
