use std::sync::mpsc::SyncSender;

use crate::capture::{audio_frame::AudioFrame, capture_error::CaptureError};

/// Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Event delivered by a running capture source.
#[derive(Debug)]
pub enum CaptureEvent {
    /// One fixed-size block of captured samples.
    Frame(AudioFrame),
    /// Unrecoverable device failure; fatal to the owning session.
    Error(CaptureError),
}

/// Abstraction over the microphone input.
///
/// Implementations:
/// - `CpalCaptureSource`: uses the real sound card.
/// - Fake sources in test code (no hardware).
///
/// Delivery is best-effort through a bounded queue: a source must never
/// block real time waiting for the consumer. If a frame cannot be enqueued
/// it is dropped and counted.
pub trait CaptureSource: Send {
    /// Starts capture from the input device.
    ///
    /// Captured frames are sent through `tx` in capture order.
    ///
    /// # Errors
    /// Returns an error if capture is already running. Device failures that
    /// occur after the worker has started are delivered asynchronously as
    /// [`CaptureEvent::Error`].
    fn start(&mut self, tx: SyncSender<CaptureEvent>) -> CaptureResult<()>;

    /// Stops capture and releases the device. Idempotent: safe to call
    /// repeatedly or without a prior `start`.
    fn stop(&mut self);

    /// Number of frames dropped due to back-pressure since the last start.
    fn frames_dropped(&self) -> u64 {
        0
    }
}
