//! Linear PCM codec for the wire.
//!
//! This module provides pure functions to convert between raw PCM audio
//! samples (f32) and the base64-framed little-endian 16-bit representation
//! exchanged with the translation engine.
//!
//! No state, no side effects: these run on the outbound hot path (every
//! capture block) and on the inbound path (every received fragment).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use byteorder::{ByteOrder, LittleEndian};

use crate::codec::{codec_error::CodecError, encoded_chunk::EncodedChunk};

/// Wire format of outbound capture audio.
pub const CAPTURE_MIME: &str = "audio/pcm;rate=16000";

/// Quantization scale between f32 samples and i16 wire samples.
const PCM_SCALE: f32 = 32_768.0;

/// Encodes a slice of f32 PCM samples into a transmittable chunk.
///
/// Samples are expected in the range [-1.0, 1.0] and are scaled by 32768
/// with a saturating cast to `i16`; out-of-range input clips rather than
/// erroring. The i16 buffer is serialized little-endian and framed as
/// base64 text.
pub fn encode(samples: &[f32]) -> EncodedChunk {
    let mut bytes = vec![0u8; samples.len() * 2];
    for (i, sample) in samples.iter().enumerate() {
        // `as` saturates, which clips out-of-range input.
        let v = (sample * PCM_SCALE) as i16;
        LittleEndian::write_i16(&mut bytes[i * 2..(i + 1) * 2], v);
    }
    EncodedChunk {
        data: STANDARD.encode(bytes),
        mime_type: CAPTURE_MIME,
    }
}

/// Decodes a base64-framed little-endian 16-bit PCM payload into f32 samples
/// in the range [-1.0, 1.0).
///
/// # Errors
/// Returns [`CodecError::MalformedPayload`] if the payload is not valid
/// base64 or its byte length is not a whole number of 16-bit samples.
pub fn decode(payload: &str) -> Result<Vec<f32>, CodecError> {
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| CodecError::MalformedPayload(format!("invalid base64: {e}")))?;

    if bytes.len() % 2 != 0 {
        return Err(CodecError::MalformedPayload(format!(
            "{} bytes is not a whole number of 16-bit samples",
            bytes.len()
        )));
    }

    Ok(bytes
        .chunks_exact(2)
        .map(|pair| f32::from(LittleEndian::read_i16(pair)) / PCM_SCALE)
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;

    #[test]
    fn round_trip_within_one_quantization_step() {
        let original: Vec<f32> = vec![0.0, 0.25, -0.25, 0.9999, -1.0, 0.333_33];
        let chunk = encode(&original);
        let decoded = decode(&chunk.data).expect("round trip should decode");

        assert_eq!(decoded.len(), original.len());
        for (a, b) in original.iter().zip(decoded.iter()) {
            let diff = (a - b).abs();
            assert!(
                diff <= 1.0 / 32_768.0,
                "sample {a} decoded as {b}, off by {diff}"
            );
        }
    }

    #[test]
    fn out_of_range_input_clips() {
        let chunk = encode(&[1.5, -1.5]);
        let decoded = decode(&chunk.data).expect("clipped samples should decode");

        assert!(decoded[0] > 0.99, "should clip near max positive value");
        assert!(decoded[1] < -0.99, "should clip near min negative value");
    }

    #[test]
    fn outbound_mime_is_fixed() {
        let chunk = encode(&[0.0; 4]);
        assert_eq!(chunk.mime_type, CAPTURE_MIME);
    }

    #[test]
    fn odd_byte_count_is_malformed() {
        // 3 raw bytes -> not a whole number of i16 samples.
        let payload = STANDARD.encode([1u8, 2, 3]);
        match decode(&payload) {
            Err(CodecError::MalformedPayload(_)) => {}
            other => panic!("expected MalformedPayload, got: {:?}", other),
        }
    }

    #[test]
    fn invalid_base64_is_malformed() {
        match decode("not//valid==base64!!") {
            Err(CodecError::MalformedPayload(_)) => {}
            other => panic!("expected MalformedPayload, got: {:?}", other),
        }
    }
}
