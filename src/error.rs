//! Error types for the `thumbframe` crate.
//!
//! This module defines [`ThumbframeError`], the unified error type returned by
//! all fallible operations in the crate, and the stable string codes surfaced
//! to host applications through the method-call boundary.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `thumbframe` operations.
///
/// Every public method that can fail returns `Result<T, ThumbframeError>`.
/// Variants map one-to-one onto the string codes the service reports across
/// the method-call boundary; see [`ThumbframeError::code`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ThumbframeError {
    /// A required argument was missing or invalid.
    #[error("Bad arguments: {0}")]
    BadArguments(String),

    /// The video resource does not exist or cannot be read.
    #[error("Video file not found: {path}")]
    FileNotFound {
        /// Path the caller supplied.
        path: PathBuf,
    },

    /// The decoder produced no frame for the requested position.
    #[error("Thumbnail extraction failed: {0}")]
    ExtractionFailed(String),

    /// An unexpected fault escaped the extraction pipeline and was caught
    /// at the service boundary.
    #[error("Unexpected extraction error: {0}")]
    ExtractionError(String),

    /// The decoder reported no usable duration for the file.
    #[error("Failed to get video duration: {0}")]
    DurationFailed(String),

    /// The decoder returned no metadata record for the file.
    #[error("Failed to get video metadata: {0}")]
    MetadataFailed(String),

    /// The host environment cannot run the underlying decoder.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// An I/O error occurred while checking or reading files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),
}

impl ThumbframeError {
    /// The stable string identifier reported to callers across the service
    /// boundary.
    pub fn code(&self) -> &'static str {
        match self {
            ThumbframeError::BadArguments(_) => "BAD_ARGS",
            ThumbframeError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ThumbframeError::ExtractionFailed(_) => "EXTRACTION_FAILED",
            ThumbframeError::ExtractionError(_) => "EXTRACTION_ERROR",
            ThumbframeError::DurationFailed(_) => "DURATION_FAILED",
            ThumbframeError::MetadataFailed(_) => "METADATA_FAILED",
            ThumbframeError::UnsupportedPlatform(_) => "UNSUPPORTED_ARCHITECTURE",
            ThumbframeError::IoError(_) => "EXTRACTION_ERROR",
        }
    }
}

impl From<FfmpegError> for ThumbframeError {
    fn from(error: FfmpegError) -> Self {
        ThumbframeError::ExtractionFailed(error.to_string())
    }
}
