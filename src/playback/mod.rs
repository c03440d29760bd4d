//! Playback clock and gapless fragment scheduling.
pub mod playback_error;
pub mod playback_source;
pub mod playback_worker;
pub mod scheduler;
pub use playback_error::PlaybackError;
pub use playback_source::{PlaybackSource, SourceState};
pub use playback_worker::spawn_playback_worker;
pub use scheduler::{PLAYBACK_SAMPLE_RATE, PlaybackScheduler};
