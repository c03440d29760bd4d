use std::fmt;

#[derive(Debug, Clone)]
pub enum CodecError {
    /// The inbound payload could not be decoded into whole PCM samples.
    MalformedPayload(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::MalformedPayload(e) => write!(f, "malformed payload: {e}"),
        }
    }
}

impl std::error::Error for CodecError {}
