//! Blob codec.
//!
//! Config content crosses the transport boundary as standard base64 (with
//! padding). Everything behind the boundary works on raw bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

/// Errors produced while decoding transport text.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Input is not valid base64 (bad alphabet, padding or length).
    #[error("malformed encoding: {0}")]
    Malformed(#[from] base64::DecodeError),
}

/// Encode raw bytes for transport.
pub fn encode(raw: &[u8]) -> String {
    STANDARD.encode(raw)
}

/// Decode transport text back into raw bytes.
pub fn decode(text: &str) -> Result<Vec<u8>, CodecError> {
    Ok(STANDARD.decode(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_arbitrary_bytes() {
        let samples: [&[u8]; 5] = [
            b"",
            b"# base\nserver {}\n",
            &[0x00, 0xff, 0x10, 0x7f, 0x80],
            "héllo \u{1F600}".as_bytes(),
            b"{\"json\": \"delims\", \"ctrl\": \"\x01\x02\"}",
        ];
        for raw in samples {
            assert_eq!(decode(&encode(raw)).unwrap(), raw);
        }
    }

    #[test]
    fn test_known_vector() {
        assert_eq!(encode(b"# base\n"), "IyBiYXNlCg==");
        assert_eq!(decode("IyBiYXNlCg==").unwrap(), b"# base\n");
    }

    #[test]
    fn test_rejects_bad_alphabet() {
        assert!(matches!(decode("not*base64!"), Err(CodecError::Malformed(_))));
    }

    #[test]
    fn test_rejects_bad_padding() {
        assert!(decode("IyBiYXNlCg=").is_err());
        assert!(decode("IyBiYXNlCg").is_err());
    }
}
