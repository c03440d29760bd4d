/// A single block of captured audio with associated metadata.
///
/// Frames are produced in capture order, one per elapsed block interval,
/// and consumed exactly once by the outbound encode path.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    /// The raw audio samples (mono, f32).
    pub samples: Vec<f32>,
    /// Sample rate in Hz (e.g., 16000).
    pub sample_rate: u32,
    /// Timestamp of capture in milliseconds.
    pub timestamp_ms: u128,
}
