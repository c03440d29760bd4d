//! Audio capture from the microphone, in fixed-size PCM blocks.
pub mod audio_frame;
pub mod capture_error;
pub mod capture_source;
pub mod cpal_capture;
pub use audio_frame::AudioFrame;
pub use capture_error::CaptureError;
pub use capture_source::{CaptureEvent, CaptureResult, CaptureSource};
pub use cpal_capture::{BLOCK_SAMPLES, CAPTURE_SAMPLE_RATE, CpalCaptureSource};
