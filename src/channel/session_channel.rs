use std::sync::mpsc::Sender;

use crate::channel::{channel_error::ChannelError, channel_event::ChannelEvent};
use crate::codec::encoded_chunk::EncodedChunk;

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// A connected bidirectional stream to the translation engine.
///
/// Outbound: encoded capture audio. Inbound events flow through the sender
/// handed to [`ChannelConnector::connect`].
pub trait SessionChannel: Send {
    /// Hands one encoded capture block to the engine.
    ///
    /// # Errors
    /// Returns [`ChannelError::Send`] on transport failure or
    /// [`ChannelError::Disconnected`] once the channel is gone.
    fn send_audio(&self, chunk: &EncodedChunk) -> ChannelResult<()>;

    /// Closes the channel. Idempotent: safe to call repeatedly.
    fn close(&mut self);
}

/// Opens channels to the translation engine.
pub trait ChannelConnector: Send {
    /// Starts the handshake for a translation stream targeting
    /// `target_language`. Inbound events — including the `Open`
    /// confirmation — are delivered through `events`.
    ///
    /// # Errors
    /// Returns [`ChannelError::Connect`] if the handshake cannot be
    /// initiated. Fatal to the attempt; never retried automatically.
    fn connect(
        &mut self,
        target_language: &str,
        events: Sender<ChannelEvent>,
    ) -> ChannelResult<Box<dyn SessionChannel>>;
}
