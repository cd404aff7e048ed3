//! Shared test helpers: a scriptable stub decoder and a recording
//! progress listener.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use image::RgbaImage;
use thumbframe::{
    DecodeTolerance, FrameDecoder, ProgressEvent, ProgressListener, ThumbframeError,
    VideoMetadata,
};

/// How one stub decode call behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StubBehaviour {
    /// Return a solid-colour frame of the configured size.
    Succeed,
    /// Return an extraction failure.
    Fail,
    /// Panic, to exercise the service's panic boundary.
    Panic,
}

/// A [`FrameDecoder`] with scripted behaviour and call counting.
pub struct StubDecoder {
    pub behaviour: StubBehaviour,
    /// Source resolution of produced frames.
    pub frame_size: (u32, u32),
    pub duration: Duration,
    /// Shared call counters; clone the `Arc`s to observe the decoder after
    /// it has moved into a service.
    pub probe_calls: Arc<AtomicUsize>,
    pub decode_calls: Arc<AtomicUsize>,
}

impl StubDecoder {
    pub fn succeeding() -> Self {
        Self::with_behaviour(StubBehaviour::Succeed)
    }

    pub fn failing() -> Self {
        Self::with_behaviour(StubBehaviour::Fail)
    }

    pub fn panicking() -> Self {
        Self::with_behaviour(StubBehaviour::Panic)
    }

    pub fn with_behaviour(behaviour: StubBehaviour) -> Self {
        Self {
            behaviour,
            frame_size: (64, 48),
            duration: Duration::from_millis(2000),
            probe_calls: Arc::new(AtomicUsize::new(0)),
            decode_calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FrameDecoder for StubDecoder {
    fn probe(&self, _path: &Path) -> Result<VideoMetadata, ThumbframeError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            StubBehaviour::Fail => Err(ThumbframeError::MetadataFailed(
                "stub probe failure".to_string(),
            )),
            _ => Ok(VideoMetadata {
                width: self.frame_size.0,
                height: self.frame_size.1,
                duration: self.duration,
                codec: "h264".to_string(),
                frames_per_second: 30.0,
                bit_rate: Some(1_500_000),
                rotation: None,
            }),
        }
    }

    fn decode_frame(
        &self,
        _path: &Path,
        _target: Duration,
        _tolerance: DecodeTolerance,
    ) -> Result<RgbaImage, ThumbframeError> {
        self.decode_calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            StubBehaviour::Succeed => {
                let (width, height) = self.frame_size;
                Ok(RgbaImage::from_pixel(
                    width,
                    height,
                    image::Rgba([40, 80, 120, 255]),
                ))
            }
            StubBehaviour::Fail => Err(ThumbframeError::ExtractionFailed(
                "stub decode failure".to_string(),
            )),
            StubBehaviour::Panic => panic!("stub decoder panic"),
        }
    }
}

/// A listener that records every event it receives.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events_for(&self, request_id: &str) -> Vec<f64> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| event.request_id == request_id)
            .map(|event| event.progress)
            .collect()
    }

    /// Block until a `1.0` event arrives for `request_id` or the timeout
    /// elapses. Delivery is asynchronous, so assertions must wait for the
    /// terminal checkpoint first.
    pub fn wait_for_completion(&self, request_id: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self
                .events_for(request_id)
                .iter()
                .any(|&progress| progress == 1.0)
            {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }
}

impl ProgressListener for RecordingListener {
    fn on_progress(&self, event: &ProgressEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}
