use std::fmt;

/// Lifecycle state of the live audio session.
///
/// Exactly one session is active at a time; starting a new one tears down
/// the old one first. Every terminal path (user stop, engine close, fatal
/// error) releases all resources and comes to rest at `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session; initial state and the rest state after teardown.
    Idle,
    /// Opening the capture device, playback clock and channel.
    Connecting,
    /// The channel confirmed open; audio flows in both directions.
    Live,
    /// Winding down after a stop request or engine close.
    Closing,
    /// All resources released; transitions to `Idle`.
    Closed,
    /// An unrecoverable error occurred; resources are released the same
    /// way as `Closing`, then the session rests at `Idle`.
    Failed,
}

impl fmt::Display for SessionState {
    /// User-facing status string.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "Standby",
            SessionState::Connecting => "Connecting...",
            SessionState::Live => "Live: Speak now",
            SessionState::Closing => "Closing...",
            SessionState::Closed => "Standby",
            SessionState::Failed => "Failed",
        };
        write!(f, "{s}")
    }
}
