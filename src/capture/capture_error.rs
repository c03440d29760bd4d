use std::fmt;

#[derive(Debug, Clone)]
pub enum CaptureError {
    /// No usable input device (missing, or permission denied).
    DeviceUnavailable(String),
    StreamBuild(String),
    StreamPlay(String),
    Runtime(String),
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::DeviceUnavailable(e) => write!(f, "input device unavailable: {e}"),
            CaptureError::StreamBuild(e) => write!(f, "stream build error: {e}"),
            CaptureError::StreamPlay(e) => write!(f, "stream play error: {e}"),
            CaptureError::Runtime(e) => write!(f, "runtime error: {e}"),
        }
    }
}

impl std::error::Error for CaptureError {}
