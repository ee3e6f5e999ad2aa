//! This module contains basic base64 functionality as used in Hawk.

use crate::error::*;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

/// STANDARD_ENGINE encodes with the standard alphabet and includes padding. Decoding requires
/// canonical padding and rejects non-zero trailing bits.
pub(crate) const STANDARD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_encode_padding(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

/// Number of bytes needed to encode `len` input bytes, padding included.
pub fn encoded_len(len: usize) -> Result<usize> {
    base64::encoded_len(len, true)
        .ok_or_else(|| Error::Overflow(format!("base64 length of {} bytes", len)))
}

/// Encode `input` into the front of `out`, returning the number of bytes written.
pub fn encode_into(input: &[u8], out: &mut [u8]) -> Result<usize> {
    STANDARD_ENGINE
        .encode_slice(input, out)
        .map_err(|e| Error::Base64(e.to_string()))
}

pub fn encode(input: &[u8]) -> String {
    STANDARD_ENGINE.encode(input)
}

/// Decode `input`, which must be padded standard base64 of a valid length.
pub fn decode(input: &[u8]) -> Result<Vec<u8>> {
    if input.len() % 4 != 0 {
        return Err(Error::Base64(format!(
            "encoded length {} is not a multiple of 4",
            input.len()
        )));
    }
    Ok(STANDARD_ENGINE.decode(input)?)
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn encode_known() {
        assert_eq!(encode(b""), "");
        assert_eq!(encode(b"f"), "Zg==");
        assert_eq!(encode(b"fo"), "Zm8=");
        assert_eq!(encode(b"foo"), "Zm9v");
        assert_eq!(encode(&[1, 2, 3, 4]), "AQIDBA==");
    }

    #[test]
    fn encode_into_fixed_buffer() {
        let mut buf = [0u8; 8];
        let n = encode_into(&[1, 2, 3, 4], &mut buf).unwrap();
        assert_eq!(&buf[..n], b"AQIDBA==");
        let mut small = [0u8; 4];
        assert_eq!(
            encode_into(&[1, 2, 3, 4], &mut small).unwrap_err().code(),
            ErrorCode::Base64
        );
    }

    #[test]
    fn encoded_len_matches_encode() {
        for n in 0..100 {
            let data = vec![0xa5u8; n];
            assert_eq!(encoded_len(n).unwrap(), encode(&data).len());
        }
    }

    #[test]
    fn round_trip_all_lengths() {
        for n in 0..=64usize {
            let data: Vec<u8> = (0..n).map(|i| (i * 37 + 11) as u8).collect();
            assert_eq!(decode(encode(&data).as_bytes()).unwrap(), data);
        }
        let all: Vec<u8> = (0..=255u8).collect();
        assert_eq!(decode(encode(&all).as_bytes()).unwrap(), all);
    }

    #[test]
    fn rejects_missing_padding() {
        assert_eq!(decode(b"Zg").unwrap_err().code(), ErrorCode::Base64);
        assert_eq!(decode(b"Zm8").unwrap_err().code(), ErrorCode::Base64);
    }

    #[test]
    fn rejects_bad_padding() {
        assert!(decode(b"Zg=a").is_err());
        assert!(decode(b"Z===").is_err());
        assert!(decode(b"=Zg=").is_err());
        assert!(decode(b"Zm9v====").is_err());
    }

    #[test]
    fn rejects_bad_alphabet() {
        assert!(decode(b"Zm9*").is_err());
        // url-safe alphabet is not accepted
        assert!(decode(b"-_-_").is_err());
    }

    #[test]
    fn rejects_trailing_bits() {
        // "Zh==" has non-zero bits after the single encoded byte
        assert!(decode(b"Zh==").is_err());
    }
}
