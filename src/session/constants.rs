use std::time::Duration;

/// The transcript log keeps only this many recent entries.
pub const TRANSCRIPT_CAP: usize = 10;

/// Depth of the bounded capture frame queue; a full queue drops frames.
pub const CAPTURE_QUEUE_FRAMES: usize = 8;

/// Poll timeout for the capture receiver in the session event loop.
pub const CAPTURE_POLL: Duration = Duration::from_millis(5);

/// Poll timeout for the channel receiver in the session event loop.
pub const CHANNEL_POLL: Duration = Duration::from_millis(1);
