//! PCM sample conversion and wire framing.
pub mod codec_error;
pub mod encoded_chunk;
pub mod pcm;
pub use codec_error::CodecError;
pub use encoded_chunk::EncodedChunk;
pub use pcm::{decode, encode};
