use std::fmt;

/// Errors that can occur while connecting to or sending on the channel.
///
/// In this design, the only things `send_audio()` can reliably report are
/// transport failure and disconnection; inbound failures arrive as
/// [`ChannelEvent::Error`](crate::channel::ChannelEvent::Error) instead.
#[derive(Debug, Clone)]
pub enum ChannelError {
    /// The handshake with the engine failed. Fatal to the attempt.
    Connect(String),
    Send(String),
    Disconnected,
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect(e) => write!(f, "connect error: {e}"),
            Self::Send(e) => write!(f, "send error: {e}"),
            Self::Disconnected => write!(f, "channel disconnected"),
        }
    }
}

impl std::error::Error for ChannelError {}
