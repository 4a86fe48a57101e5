//! Scalar-value level UTF-8 codec.
//!
//! Everything here works on one scalar value at a time: [`decode_scalar`]
//! accepts exactly one encoded value, [`encode_scalar`] produces the minimal
//! encoding of one `char`. [`decode_all`] walks a whole byte string and is used
//! to validate input that is appended in one piece.

use smallvec::SmallVec;
use thiserror::Error;

use crate::constants::{is_surrogate, MAX_CODE_POINT, MAX_SEQUENCE_LEN};
use crate::error::Error;

pub type Utf8Bytes = SmallVec<[u8; MAX_SEQUENCE_LEN]>;

/// Smallest code point that needs `n` bytes, indexed by `n`.
const MIN_CODE_POINT: [u32; MAX_SEQUENCE_LEN + 1] = [0, 0, 0x80, 0x800, 0x10000];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Utf8Error {
    #[error("empty byte sequence")]
    Empty,
    #[error("byte value {0} is out of range 0..=255")]
    ByteOutOfRange(u32),
    #[error("invalid lead byte 0x{0:02X}")]
    InvalidLeadByte(u8),
    #[error("lead byte 0x{lead:02X} starts a {expected}-byte sequence but {actual} bytes were given")]
    LengthMismatch {
        lead: u8,
        expected: usize,
        actual: usize,
    },
    #[error("sequence at offset {offset} needs {expected} bytes but only {available} remain")]
    Truncated {
        offset: usize,
        expected: usize,
        available: usize,
    },
    #[error("invalid continuation byte 0x{byte:02X} at offset {offset}")]
    InvalidContinuation { byte: u8, offset: usize },
    #[error("overlong encoding of U+{0:04X}")]
    Overlong(u32),
    #[error("encoded surrogate U+{0:04X}")]
    Surrogate(u32),
    #[error("code point U+{0:X} is above U+10FFFF")]
    TooLarge(u32),
}

/// Length of the sequence introduced by `lead`, judged from its high bits
/// alone. `None` for continuation bytes and `0xF8..=0xFF`.
#[inline]
pub fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7F => Some(1),
        0xC0..=0xDF => Some(2),
        0xE0..=0xEF => Some(3),
        0xF0..=0xF7 => Some(4),
        _ => None,
    }
}

#[inline]
pub fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

/// Number of bytes the minimal encoding of `ch` occupies.
#[inline]
pub fn encoded_len(ch: char) -> usize {
    match u32::from(ch) {
        0..=0x7F => 1,
        0x80..=0x7FF => 2,
        0x800..=0xFFFF => 3,
        _ => 4,
    }
}

pub fn encode_scalar(ch: char) -> Utf8Bytes {
    let code = u32::from(ch);
    let mut out = Utf8Bytes::new();
    // Every shifted value below is masked or bounded to fit a byte.
    match encoded_len(ch) {
        1 => out.push(code as u8),
        2 => {
            out.push(0xC0 | (code >> 6) as u8);
            out.push(continuation(code));
        }
        3 => {
            out.push(0xE0 | (code >> 12) as u8);
            out.push(continuation(code >> 6));
            out.push(continuation(code));
        }
        _ => {
            out.push(0xF0 | (code >> 18) as u8);
            out.push(continuation(code >> 12));
            out.push(continuation(code >> 6));
            out.push(continuation(code));
        }
    }
    out
}

pub fn encode_into(ch: char, out: &mut Vec<u8>) {
    out.extend_from_slice(&encode_scalar(ch));
}

#[inline]
fn continuation(bits: u32) -> u8 {
    0x80 | (bits & 0x3F) as u8
}

/// Validates a code point given as an integer and turns it into a scalar value.
pub fn scalar_from_code_point(code: u32) -> Result<char, Error> {
    if code > MAX_CODE_POINT || is_surrogate(code) {
        return Err(Error::invalid_code_point(code));
    }
    char::from_u32(code).ok_or_else(|| Error::invalid_code_point(code))
}

/// Narrows operand values to bytes, rejecting anything above 255.
pub fn narrow_bytes(values: &[u32]) -> Result<Utf8Bytes, Utf8Error> {
    values
        .iter()
        .map(|&value| u8::try_from(value).map_err(|_| Utf8Error::ByteOutOfRange(value)))
        .collect()
}

/// Decodes `bytes` as the encoding of exactly one scalar value.
pub fn decode_scalar(bytes: &[u8]) -> Result<char, Utf8Error> {
    let Some(&lead) = bytes.first() else {
        return Err(Utf8Error::Empty);
    };
    let expected = sequence_len(lead).ok_or(Utf8Error::InvalidLeadByte(lead))?;
    if bytes.len() != expected {
        return Err(Utf8Error::LengthMismatch {
            lead,
            expected,
            actual: bytes.len(),
        });
    }
    assemble(bytes, 0)
}

/// Decodes a whole byte string. Fails on the first malformed sequence.
pub fn decode_all(bytes: &[u8]) -> Result<Vec<char>, Utf8Error> {
    let mut chars = Vec::with_capacity(bytes.len());
    let mut offset = 0;
    while offset < bytes.len() {
        let lead = bytes[offset];
        let expected = sequence_len(lead).ok_or(Utf8Error::InvalidLeadByte(lead))?;
        let available = bytes.len() - offset;
        if available < expected {
            return Err(Utf8Error::Truncated {
                offset,
                expected,
                available,
            });
        }
        chars.push(assemble(&bytes[offset..offset + expected], offset)?);
        offset += expected;
    }
    Ok(chars)
}

/// `bytes.len()` must already equal `sequence_len(bytes[0])`. `base` only
/// shifts the offsets reported in errors.
fn assemble(bytes: &[u8], base: usize) -> Result<char, Utf8Error> {
    let lead = bytes[0];
    let len = bytes.len();
    let mut code = match len {
        1 => return Ok(char::from(lead)),
        2 => u32::from(lead & 0x1F),
        3 => u32::from(lead & 0x0F),
        _ => u32::from(lead & 0x07),
    };

    for (idx, &byte) in bytes.iter().enumerate().skip(1) {
        if !is_continuation(byte) {
            return Err(Utf8Error::InvalidContinuation {
                byte,
                offset: base + idx,
            });
        }
        code = (code << 6) | u32::from(byte & 0x3F);
    }

    if code < MIN_CODE_POINT[len] {
        return Err(Utf8Error::Overlong(code));
    }
    if is_surrogate(code) {
        return Err(Utf8Error::Surrogate(code));
    }
    if code > MAX_CODE_POINT {
        return Err(Utf8Error::TooLarge(code));
    }
    char::from_u32(code).ok_or(Utf8Error::TooLarge(code))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::error::ErrorKind;

    #[rstest]
    #[case(&[0x47], 'G')]
    #[case(&[0xD0, 0x96], 'Ж')]
    #[case(&[0xE3, 0x83, 0x9F], 'ミ')]
    #[case(&[0xF0, 0x9F, 0x98, 0x84], '😄')]
    #[case(&[0x00], '\0')]
    #[case(&[0xC2, 0x80], '\u{80}')]
    #[case(&[0xEF, 0xBF, 0xBF], '\u{FFFF}')]
    #[case(&[0xF4, 0x8F, 0xBF, 0xBF], '\u{10FFFF}')]
    fn test_decode_scalar(#[case] bytes: &[u8], #[case] expected: char) {
        assert_eq!(decode_scalar(bytes), Ok(expected));
    }

    #[rstest]
    #[case(&[], Utf8Error::Empty)]
    #[case(&[0x80], Utf8Error::InvalidLeadByte(0x80))]
    #[case(&[0xBF], Utf8Error::InvalidLeadByte(0xBF))]
    #[case(&[0xF8, 0x80, 0x80, 0x80], Utf8Error::InvalidLeadByte(0xF8))]
    #[case(&[0xFF], Utf8Error::InvalidLeadByte(0xFF))]
    #[case(&[0xD0], Utf8Error::LengthMismatch { lead: 0xD0, expected: 2, actual: 1 })]
    #[case(&[0x47, 0x47], Utf8Error::LengthMismatch { lead: 0x47, expected: 1, actual: 2 })]
    #[case(&[0xE3, 0x83], Utf8Error::LengthMismatch { lead: 0xE3, expected: 3, actual: 2 })]
    #[case(&[0xD0, 0x16], Utf8Error::InvalidContinuation { byte: 0x16, offset: 1 })]
    #[case(&[0xE3, 0x83, 0xC0], Utf8Error::InvalidContinuation { byte: 0xC0, offset: 2 })]
    #[case(&[0xC0, 0x80], Utf8Error::Overlong(0))]
    #[case(&[0xC1, 0xBF], Utf8Error::Overlong(0x7F))]
    #[case(&[0xE0, 0x9F, 0xBF], Utf8Error::Overlong(0x7FF))]
    #[case(&[0xF0, 0x8F, 0xBF, 0xBF], Utf8Error::Overlong(0xFFFF))]
    #[case(&[0xED, 0xA0, 0x80], Utf8Error::Surrogate(0xD800))]
    #[case(&[0xED, 0xBF, 0xBF], Utf8Error::Surrogate(0xDFFF))]
    #[case(&[0xF4, 0x90, 0x80, 0x80], Utf8Error::TooLarge(0x110000))]
    #[case(&[0xF7, 0xBF, 0xBF, 0xBF], Utf8Error::TooLarge(0x1FFFFF))]
    fn test_decode_scalar_rejects(#[case] bytes: &[u8], #[case] expected: Utf8Error) {
        assert_eq!(decode_scalar(bytes), Err(expected));
    }

    #[rstest]
    #[case('T', &[0x54])]
    #[case('И', &[0xD0, 0x98])]
    #[case('ス', &[0xE3, 0x82, 0xB9])]
    #[case('😄', &[0xF0, 0x9F, 0x98, 0x84])]
    fn test_encode_scalar(#[case] ch: char, #[case] expected: &[u8]) {
        assert_eq!(encode_scalar(ch).as_slice(), expected);
        assert_eq!(encoded_len(ch), expected.len());
    }

    #[rstest]
    fn test_encode_matches_std_at_boundaries() {
        for code in [0x7F, 0x80, 0x7FF, 0x800, 0xD7FF, 0xE000, 0xFFFF, 0x10000, 0x10FFFF] {
            let ch = char::from_u32(code).expect("scalar");
            let mut std_buf = [0u8; 4];
            assert_eq!(
                encode_scalar(ch).as_slice(),
                ch.encode_utf8(&mut std_buf).as_bytes()
            );
        }
    }

    #[rstest]
    #[case(84, 'T')]
    #[case(1048, 'И')]
    #[case(12473, 'ス')]
    #[case(0xD7FF, '\u{D7FF}')]
    #[case(0xE000, '\u{E000}')]
    #[case(0x10FFFF, '\u{10FFFF}')]
    fn test_scalar_from_code_point(#[case] code: u32, #[case] expected: char) {
        assert_eq!(scalar_from_code_point(code).expect("valid"), expected);
    }

    #[rstest]
    #[case(0xD800)]
    #[case(0xDBFF)]
    #[case(0xDFFF)]
    #[case(0x110000)]
    #[case(u32::MAX)]
    fn test_scalar_from_code_point_rejects(#[case] code: u32) {
        let err = scalar_from_code_point(code).expect_err("invalid");
        assert_eq!(err.kind, ErrorKind::InvalidCodePoint);
    }

    #[rstest]
    fn test_narrow_bytes() {
        assert_eq!(narrow_bytes(&[0, 255]).expect("bytes").as_slice(), &[0, 255]);
        assert_eq!(narrow_bytes(&[208, 256]), Err(Utf8Error::ByteOutOfRange(256)));
    }

    #[rstest]
    fn test_decode_all() {
        let bytes = "aЮは😄".as_bytes();
        assert_eq!(decode_all(bytes), Ok(vec!['a', 'Ю', 'は', '😄']));
        assert_eq!(decode_all(&[]), Ok(Vec::new()));
    }

    #[rstest]
    #[case(&[0x61, 0xD0], Utf8Error::Truncated { offset: 1, expected: 2, available: 1 })]
    #[case(&[0x61, 0x80], Utf8Error::InvalidLeadByte(0x80))]
    #[case(&[0x61, 0x62, 0xE3, 0x41, 0x9F], Utf8Error::InvalidContinuation { byte: 0x41, offset: 3 })]
    fn test_decode_all_rejects(#[case] bytes: &[u8], #[case] expected: Utf8Error) {
        assert_eq!(decode_all(bytes), Err(expected));
    }
}
