//! The extraction orchestrator.
//!
//! [`ThumbnailService`] ties the pieces together: it normalizes requests,
//! drives the decoder, converts the decoded frame to a bounded-size RGBA8888
//! buffer, and reports the fixed progress checkpoint sequence for requests
//! that carry a correlation id.
//!
//! # Concurrency
//!
//! Calls are fully concurrent with per-request isolation: every extraction
//! opens its own demuxer and codec context inside the decoder, and the
//! service holds no per-call mutable state. One request's failure never
//! affects another in flight. The only shared resource is the progress
//! listener slot, which tolerates being cleared mid-flight (events are then
//! dropped).
//!
//! # Example
//!
//! ```no_run
//! use thumbframe::{ThumbnailRequest, ThumbnailService, ThumbframeError};
//!
//! let service = ThumbnailService::with_ffmpeg()?;
//! let rgba = service.extract(
//!     &ThumbnailRequest::new("input.mp4").with_width(320).with_height(180),
//! )?;
//! assert_eq!(rgba.len(), 320 * 180 * 4);
//! # Ok::<(), ThumbframeError>(())
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use std::sync::Arc;

use image::{DynamicImage, imageops::FilterType};

use crate::{
    decoder::{FfmpegDecoder, FrameDecoder},
    error::ThumbframeError,
    metadata::VideoMetadata,
    progress::{ProgressSink, ProgressStage},
    request::{ThumbnailPlan, ThumbnailRequest},
};

/// Thumbnail extraction service.
///
/// Generic over the decoding backend so platform decoders and test stubs
/// interchange behind [`FrameDecoder`]; [`with_ffmpeg`](ThumbnailService::with_ffmpeg)
/// builds the production configuration.
pub struct ThumbnailService<D = FfmpegDecoder> {
    decoder: D,
    progress: Arc<ProgressSink>,
}

impl ThumbnailService<FfmpegDecoder> {
    /// Create a service backed by the FFmpeg decoder.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbframeError::UnsupportedPlatform`] when FFmpeg cannot
    /// be initialised in this environment.
    pub fn with_ffmpeg() -> Result<Self, ThumbframeError> {
        Ok(Self::new(FfmpegDecoder::new()?))
    }
}

impl<D: FrameDecoder> ThumbnailService<D> {
    /// Create a service around an arbitrary decoding backend.
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            progress: Arc::new(ProgressSink::new()),
        }
    }

    /// The progress sink for this service.
    ///
    /// Register a listener here to receive per-request checkpoint events;
    /// the slot is last-listener-wins.
    pub fn progress(&self) -> &Arc<ProgressSink> {
        &self.progress
    }

    /// Extract a single RGBA8888 thumbnail.
    ///
    /// Returns a tightly-packed buffer of exactly `width * height * 4`
    /// bytes, row-major, no row padding. The caller owns the buffer; the
    /// service retains no reference after return.
    ///
    /// Any fault escaping the pipeline, including panics, is caught at this
    /// boundary and converted to a typed error.
    ///
    /// # Errors
    ///
    /// - [`ThumbframeError::BadArguments`] for an empty path or zero
    ///   dimension, before any decoder call.
    /// - [`ThumbframeError::FileNotFound`] when the resource cannot be
    ///   found at check time.
    /// - [`ThumbframeError::ExtractionFailed`] when the decoder produces no
    ///   frame (corrupt file, timestamp beyond duration, unsupported codec).
    /// - [`ThumbframeError::ExtractionError`] for unexpected faults.
    pub fn extract(&self, request: &ThumbnailRequest) -> Result<Vec<u8>, ThumbframeError> {
        let plan = request.normalize()?;

        let outcome = catch_unwind(AssertUnwindSafe(|| self.run_pipeline(&plan)));
        match outcome {
            Ok(result) => result,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic in extraction pipeline".to_string());
                log::error!("Extraction panicked: {message}");
                Err(ThumbframeError::ExtractionError(message))
            }
        }
    }

    /// Total duration of the video in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbframeError::BadArguments`] for an empty path, or
    /// [`ThumbframeError::DurationFailed`] when the decoder cannot report a
    /// duration for the file.
    pub fn duration(&self, path: &str) -> Result<i64, ThumbframeError> {
        if path.is_empty() {
            return Err(ThumbframeError::BadArguments(
                "File path missing".to_string(),
            ));
        }

        let metadata = self
            .decoder
            .probe(Path::new(path))
            .map_err(|error| ThumbframeError::DurationFailed(error.to_string()))?;

        let duration_ms = metadata.duration_ms();
        log::info!("Duration of {path}: {duration_ms} ms");
        Ok(duration_ms)
    }

    /// Metadata record for the video, passed through from the decoder probe.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbframeError::BadArguments`] for an empty path, or
    /// [`ThumbframeError::MetadataFailed`] when the decoder returns no
    /// record.
    pub fn metadata(&self, path: &str) -> Result<VideoMetadata, ThumbframeError> {
        if path.is_empty() {
            return Err(ThumbframeError::BadArguments(
                "File path missing".to_string(),
            ));
        }

        let metadata = self.decoder.probe(Path::new(path))?;
        log::info!(
            "Metadata of {path}: {}x{}, codec={}",
            metadata.width,
            metadata.height,
            metadata.codec,
        );
        Ok(metadata)
    }

    /// The extraction pipeline: check, decode, scale, with checkpoint
    /// emission.
    ///
    /// A failure at any step returns immediately, short-circuiting the
    /// remaining checkpoints; `1.0` is only emitted on success.
    fn run_pipeline(&self, plan: &ThumbnailPlan) -> Result<Vec<u8>, ThumbframeError> {
        let emit = |stage: ProgressStage| {
            if let Some(request_id) = plan.request_id.as_deref() {
                self.progress.emit(request_id, stage);
            }
        };

        emit(ProgressStage::Accepted);

        // Advisory check: the decoder call below is the authority, and a
        // race between this check and the decode is tolerated.
        if !plan.path.exists() {
            log::error!("File not found: {}", plan.path.display());
            return Err(ThumbframeError::FileNotFound {
                path: plan.path.clone(),
            });
        }
        if let Ok(file_metadata) = std::fs::metadata(&plan.path) {
            log::debug!(
                "File check: path={}, len={}, readonly={}",
                plan.path.display(),
                file_metadata.len(),
                file_metadata.permissions().readonly(),
            );
        }
        emit(ProgressStage::FileOpened);
        emit(ProgressStage::DecoderReady);

        emit(ProgressStage::Seeking);
        let frame = self
            .decoder
            .decode_frame(&plan.path, plan.target, plan.tolerance)?;
        emit(ProgressStage::Decoding);

        let buffer = if frame.width() == plan.width && frame.height() == plan.height {
            frame.into_raw()
        } else {
            DynamicImage::ImageRgba8(frame)
                .resize_exact(plan.width, plan.height, FilterType::Triangle)
                .into_rgba8()
                .into_raw()
        };
        emit(ProgressStage::Scaling);

        emit(ProgressStage::Complete);
        log::info!(
            "Extracted thumbnail from {} ({} bytes, {}x{})",
            plan.path.display(),
            buffer.len(),
            plan.width,
            plan.height,
        );
        Ok(buffer)
    }
}

#[cfg(feature = "async")]
impl<D: FrameDecoder + 'static> ThumbnailService<D> {
    /// Extract a thumbnail without blocking the async runtime.
    ///
    /// The blocking pipeline runs via `tokio::task::spawn_blocking`, so
    /// CPU-heavy decoding does not consume the runtime's cooperative task
    /// budget and the caller's other in-flight requests proceed unhindered.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use thumbframe::{ThumbnailRequest, ThumbnailService, ThumbframeError};
    ///
    /// # async fn example() -> Result<(), ThumbframeError> {
    /// let service = Arc::new(ThumbnailService::with_ffmpeg()?);
    /// let rgba = service
    ///     .clone()
    ///     .extract_async(ThumbnailRequest::new("input.mp4"))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn extract_async(
        self: Arc<Self>,
        request: ThumbnailRequest,
    ) -> Result<Vec<u8>, ThumbframeError> {
        tokio::task::spawn_blocking(move || self.extract(&request))
            .await
            .map_err(|error| {
                ThumbframeError::ExtractionError(format!("Extraction task failed: {error}"))
            })?
    }
}
