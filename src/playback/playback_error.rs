use std::fmt;

#[derive(Debug, Clone)]
pub enum PlaybackError {
    /// No usable output device.
    DeviceUnavailable(String),
    StreamBuild(String),
    StreamPlay(String),
}

impl fmt::Display for PlaybackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackError::DeviceUnavailable(e) => write!(f, "output device unavailable: {e}"),
            PlaybackError::StreamBuild(e) => write!(f, "stream build error: {e}"),
            PlaybackError::StreamPlay(e) => write!(f, "stream play error: {e}"),
        }
    }
}

impl std::error::Error for PlaybackError {}
