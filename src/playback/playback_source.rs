/// Lifecycle of a scheduled playback source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// Scheduled but its start time has not been reached yet.
    Pending,
    /// Currently feeding samples to the output.
    Playing,
    /// Played all of its samples.
    Ended,
    /// Forcibly stopped by an interruption.
    Stopped,
}

/// One scheduled unit of decoded translation audio.
///
/// Owns its sample buffer for its whole life: created on decode, destroyed
/// when playback ends or the source is forcibly stopped.
#[derive(Debug, Clone)]
pub struct PlaybackSource {
    samples: Vec<f32>,
    start_time: f64,
    start_sample: u64,
    cursor: usize,
    state: SourceState,
}

impl PlaybackSource {
    #[must_use]
    pub fn new(samples: Vec<f32>, start_time: f64, start_sample: u64) -> Self {
        Self {
            samples,
            start_time,
            start_sample,
            cursor: 0,
            state: SourceState::Pending,
        }
    }

    /// Scheduled start time on the output clock, in seconds.
    #[must_use]
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Scheduled start position on the output clock, in samples.
    #[must_use]
    pub fn start_sample(&self) -> u64 {
        self.start_sample
    }

    /// Duration of the buffer at the given output rate, in seconds.
    #[must_use]
    pub fn duration(&self, sample_rate: u32) -> f64 {
        self.samples.len() as f64 / f64::from(sample_rate)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub fn state(&self) -> SourceState {
        self.state
    }

    /// Takes the next sample, or `None` once the buffer is exhausted.
    /// Marks the source `Playing` on the first take and `Ended` on exhaustion.
    pub fn take_sample(&mut self) -> Option<f32> {
        if let Some(&s) = self.samples.get(self.cursor) {
            self.cursor += 1;
            self.state = SourceState::Playing;
            Some(s)
        } else {
            self.state = SourceState::Ended;
            None
        }
    }

    /// Forcibly stops the source; its remaining samples are discarded.
    pub fn stop(&mut self) {
        self.state = SourceState::Stopped;
        self.cursor = self.samples.len();
    }
}
