//! Thumbnail request normalization.
//!
//! [`ThumbnailRequest`] is the loosely-specified input a caller supplies;
//! [`ThumbnailRequest::normalize`] validates it and resolves defaults and the
//! frame-selection strategy into a [`ThumbnailPlan`] that the extraction
//! pipeline can execute without further policy decisions.
//!
//! # Example
//!
//! ```
//! use thumbframe::ThumbnailRequest;
//!
//! let plan = ThumbnailRequest::new("input.mp4")
//!     .with_time_ms(5000)
//!     .with_strategy("keyframe")
//!     .normalize()
//!     .unwrap();
//!
//! assert_eq!(plan.width, 720);
//! assert_eq!(plan.height, 405);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ThumbframeError;

/// Default output width when neither `width` nor `size` is supplied.
pub const DEFAULT_SIZE: u32 = 720;

/// Default target time when `time_ms` is not supplied.
pub const DEFAULT_TIME_MS: u64 = 1000;

/// Policy selecting which frame near the target time is acceptable.
///
/// Strategies trade seek precision for decode cost: a looser tolerance lets
/// the decoder stop at a cheap-to-produce frame near the target instead of
/// decoding forward to the exact one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Allow 0.5s of slack in both directions around the target.
    #[default]
    Normal,
    /// Land exactly on or after a sync frame: no slack before the target,
    /// up to 1.0s after it.
    Keyframe,
    /// Demand exactly frame zero.
    FirstFrame,
}

impl Strategy {
    /// Parse a strategy name, case-insensitively.
    ///
    /// Unrecognized values fall back to [`Strategy::Normal`]. This is a
    /// deliberate lenient default, not a validation failure.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "keyframe" => Strategy::Keyframe,
            "firstframe" => Strategy::FirstFrame,
            _ => Strategy::Normal,
        }
    }

    /// The seek slack this strategy grants the decoder.
    pub fn tolerance(self) -> DecodeTolerance {
        match self {
            Strategy::Normal => DecodeTolerance {
                before: Duration::from_millis(500),
                after: Duration::from_millis(500),
            },
            Strategy::Keyframe => DecodeTolerance {
                before: Duration::ZERO,
                after: Duration::from_secs(1),
            },
            Strategy::FirstFrame => DecodeTolerance {
                before: Duration::ZERO,
                after: Duration::ZERO,
            },
        }
    }
}

/// Allowed seek slack before and after the target timestamp.
///
/// The decoder may return any frame inside
/// `[target - before, target + after]`; it picks the one it can produce
/// most cheaply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTolerance {
    /// Slack before the target.
    pub before: Duration,
    /// Slack after the target.
    pub after: Duration,
}

/// A loosely-specified thumbnail request.
///
/// Only `path` is required; everything else has a policy-driven default.
/// Call [`normalize`](ThumbnailRequest::normalize) to obtain an executable
/// [`ThumbnailPlan`].
#[derive(Debug, Clone)]
#[must_use]
pub struct ThumbnailRequest {
    /// Path to the video resource.
    pub path: String,
    /// Fallback output width when `width` is unspecified. Defaults to 720.
    pub size: u32,
    /// Output width in pixels. `None` falls back to `size`.
    pub width: Option<u32>,
    /// Output height in pixels. `None` derives `round(width * 9/16)`.
    pub height: Option<u32>,
    /// Target time in milliseconds. Defaults to 1000. Forced to 0 by the
    /// `firstFrame` strategy.
    pub time_ms: u64,
    /// Frame-selection strategy name, matched case-insensitively.
    pub strategy: String,
    /// Correlation id for progress events. `None` disables progress
    /// reporting for this request.
    pub request_id: Option<String>,
}

impl ThumbnailRequest {
    /// Create a request for `path` with all defaults.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: DEFAULT_SIZE,
            width: None,
            height: None,
            time_ms: DEFAULT_TIME_MS,
            strategy: String::new(),
            request_id: None,
        }
    }

    /// Set the fallback size used when no explicit width is given.
    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Set an explicit output width.
    pub fn with_width(mut self, width: u32) -> Self {
        self.width = Some(width);
        self
    }

    /// Set an explicit output height.
    pub fn with_height(mut self, height: u32) -> Self {
        self.height = Some(height);
        self
    }

    /// Set the target time in milliseconds.
    pub fn with_time_ms(mut self, time_ms: u64) -> Self {
        self.time_ms = time_ms;
        self
    }

    /// Set the frame-selection strategy by name.
    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = strategy.into();
        self
    }

    /// Attach a correlation id, enabling progress events for this request.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Validate the request and resolve defaults and strategy into a
    /// fully-specified extraction plan.
    ///
    /// # Errors
    ///
    /// Returns [`ThumbframeError::BadArguments`] when `path` is empty or an
    /// explicitly supplied dimension is zero.
    pub fn normalize(&self) -> Result<ThumbnailPlan, ThumbframeError> {
        if self.path.is_empty() {
            return Err(ThumbframeError::BadArguments(
                "File path missing".to_string(),
            ));
        }

        if self.size == 0 || self.width == Some(0) || self.height == Some(0) {
            return Err(ThumbframeError::BadArguments(
                "Output dimensions must be positive".to_string(),
            ));
        }

        let width = self.width.unwrap_or(self.size);
        let height = self
            .height
            .unwrap_or_else(|| ((width as f64 * 9.0 / 16.0).round() as u32).max(1));

        let strategy = Strategy::parse(&self.strategy);
        let target_ms = if strategy == Strategy::FirstFrame {
            0
        } else {
            self.time_ms
        };

        log::debug!(
            "Normalized request: path={}, target={}ms, {}x{}, strategy={:?}, request_id={:?}",
            self.path,
            target_ms,
            width,
            height,
            strategy,
            self.request_id,
        );

        Ok(ThumbnailPlan {
            path: PathBuf::from(&self.path),
            target: Duration::from_millis(target_ms),
            width,
            height,
            tolerance: strategy.tolerance(),
            request_id: self.request_id.clone(),
        })
    }
}

/// A fully-resolved, strategy-free extraction plan.
///
/// Produced by [`ThumbnailRequest::normalize`]; every field is concrete and
/// the plan can be executed without consulting request defaults again.
#[derive(Debug, Clone)]
#[must_use]
pub struct ThumbnailPlan {
    /// Path to the video resource.
    pub path: PathBuf,
    /// Resolved target timestamp.
    pub target: Duration,
    /// Output width in pixels. Always positive.
    pub width: u32,
    /// Output height in pixels. Always positive.
    pub height: u32,
    /// Seek slack granted to the decoder.
    pub tolerance: DecodeTolerance,
    /// Correlation id for progress events, if reporting is enabled.
    pub request_id: Option<String>,
}
