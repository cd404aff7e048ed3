//! Progress reporting for thumbnail extraction.
//!
//! Extraction emits a fixed checkpoint sequence per request,
//! keyed by the request's correlation id. Events are delivered to a single
//! registered [`ProgressListener`] through [`ProgressSink`], a last-listener-
//! wins slot: registering a new listener replaces the previous one, and
//! events emitted while no listener is registered are dropped without a
//! backlog.
//!
//! Delivery happens on a dedicated notification thread, decoupled from the
//! extraction context, so a slow listener can never stall decoding.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use thumbframe::{ProgressEvent, ProgressListener, ProgressSink};
//!
//! struct PrintProgress;
//!
//! impl ProgressListener for PrintProgress {
//!     fn on_progress(&self, event: &ProgressEvent) {
//!         println!("[{}] {:.0}%", event.request_id, event.progress * 100.0);
//!     }
//! }
//!
//! let sink = ProgressSink::new();
//! sink.register(Arc::new(PrintProgress));
//! ```

use std::sync::{
    Arc, RwLock,
    mpsc::{Sender, channel},
};
use std::thread;

/// A named checkpoint in the extraction pipeline.
///
/// Each stage maps to a fixed progress fraction. The fractions are
/// calibration constants tied to pipeline stages, not measured throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStage {
    /// Request accepted.
    Accepted,
    /// Input file opened.
    FileOpened,
    /// Decoder parsed the container and is ready to seek.
    DecoderReady,
    /// Seeking to the target timestamp.
    Seeking,
    /// Decoding the selected frame.
    Decoding,
    /// Scaling and converting the decoded frame.
    Scaling,
    /// Extraction complete.
    Complete,
}

impl ProgressStage {
    /// The progress fraction reported for this stage.
    pub fn fraction(self) -> f64 {
        match self {
            ProgressStage::Accepted => 0.0,
            ProgressStage::FileOpened => 0.2,
            ProgressStage::DecoderReady => 0.4,
            ProgressStage::Seeking => 0.6,
            ProgressStage::Decoding => 0.8,
            ProgressStage::Scaling => 0.9,
            ProgressStage::Complete => 1.0,
        }
    }
}

/// A progress notification for one extraction request.
///
/// `progress` is in `[0.0, 1.0]` and monotonically non-decreasing within a
/// single request's event sequence. Events are discarded after delivery.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    /// Correlation id of the originating request.
    pub request_id: String,
    /// Completion fraction in `[0.0, 1.0]`.
    pub progress: f64,
}

/// Trait for receiving progress events.
///
/// Implementations must be [`Send`] and [`Sync`]: events are delivered from
/// the sink's notification thread, not from the caller's thread.
///
/// Listeners are infallible observers; they cannot influence the
/// extraction.
pub trait ProgressListener: Send + Sync {
    /// Called once per emitted checkpoint.
    fn on_progress(&self, event: &ProgressEvent);
}

type ListenerSlot = Arc<RwLock<Option<Arc<dyn ProgressListener>>>>;

/// Single-slot progress event channel.
///
/// Holds at most one listener at a time (last-listener-wins). Emission is
/// fire-and-forget: events are queued to a delivery thread and dropped
/// silently when no listener is registered at delivery time. The queue is
/// FIFO, so one request's checkpoints are never delivered out of order.
pub struct ProgressSink {
    listener: ListenerSlot,
    sender: Sender<ProgressEvent>,
}

impl ProgressSink {
    /// Create a sink with no listener and start its delivery thread.
    ///
    /// The thread exits when the sink (and any pending events) are dropped.
    pub fn new() -> Self {
        let listener: ListenerSlot = Arc::new(RwLock::new(None));
        let (sender, receiver) = channel::<ProgressEvent>();

        let slot = Arc::clone(&listener);
        let spawned = thread::Builder::new()
            .name("thumbframe-progress".to_string())
            .spawn(move || {
                while let Ok(event) = receiver.recv() {
                    let current = slot.read().ok().and_then(|guard| guard.clone());
                    if let Some(listener) = current {
                        listener.on_progress(&event);
                    }
                }
            });

        // Without a delivery thread the receiver is gone and emit() drops
        // events, which is the documented no-listener behaviour anyway.
        if let Err(error) = spawned {
            log::warn!("Failed to spawn progress delivery thread: {error}");
        }

        Self { listener, sender }
    }

    /// Register a listener, replacing any previous one.
    pub fn register(&self, listener: Arc<dyn ProgressListener>) {
        if let Ok(mut slot) = self.listener.write() {
            *slot = Some(listener);
        }
    }

    /// Remove the current listener. Subsequent events are dropped.
    pub fn clear(&self) {
        if let Ok(mut slot) = self.listener.write() {
            *slot = None;
        }
    }

    /// Queue a checkpoint event for `request_id`.
    ///
    /// Never fails: a full or closed queue, or an absent listener, loses the
    /// event silently. Progress delivery must not abort an extraction.
    pub fn emit(&self, request_id: &str, stage: ProgressStage) {
        let event = ProgressEvent {
            request_id: request_id.to_string(),
            progress: stage.fraction(),
        };
        log::debug!(
            "Progress: {} -> {:.0}% ({:?})",
            event.request_id,
            event.progress * 100.0,
            stage,
        );
        let _ = self.sender.send(event);
    }
}

impl Default for ProgressSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let has_listener = self
            .listener
            .read()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        f.debug_struct("ProgressSink")
            .field("has_listener", &has_listener)
            .finish()
    }
}
