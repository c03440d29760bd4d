use crate::capture::CaptureEvent;
use crate::channel::ChannelEvent;
use crate::session::session_state::SessionState;

/// Everything the session's event loop can react to, from either of its two
/// producer flows. Consumed by one state-transition function.
#[derive(Debug)]
pub enum SessionEvent {
    /// From the capture path (microphone blocks, device failures).
    Capture(CaptureEvent),
    /// From the translation engine.
    Channel(ChannelEvent),
}

/// Observable output of the session, drained by the owner.
#[derive(Debug, Clone)]
pub enum SessionNotice {
    StateChanged(SessionState),
    Error(String),
}
