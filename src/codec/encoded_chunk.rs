/// A transmittable audio payload: base64-framed PCM bytes plus format tag.
///
/// Owned transiently by the outbound path; handed to the session channel and
/// discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedChunk {
    /// Base64-encoded little-endian 16-bit PCM bytes.
    pub data: String,
    /// Declared wire format of `data`.
    pub mime_type: &'static str,
}
