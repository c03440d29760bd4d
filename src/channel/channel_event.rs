/// Inbound event from the translation engine.
///
/// One explicit enum consumed by a single transition function, instead of
/// scattered callback closures.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// The channel handshake completed; outbound audio may now flow.
    Open,
    /// A fragment of translated speech, base64-framed 16-bit PCM at the
    /// fixed playback rate.
    Audio { payload: String },
    /// Transcription of what the user said.
    InputTranscript(String),
    /// Transcription of what the engine spoke.
    OutputTranscript(String),
    /// Barge-in: audio already in flight should be discarded because the
    /// user started speaking again.
    Interrupted,
    /// Terminal engine or transport failure.
    Error(String),
    /// The engine closed the channel.
    Closed,
}
