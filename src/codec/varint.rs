//! Variable-length integer coding.
//!
//! Each byte carries 7 bits of payload, least significant group first, with
//! the high bit set when more bytes follow. Signed values are zigzag mapped
//! before encoding so small magnitudes stay short:
//! - 0 -> 0, -1 -> 1, 1 -> 2, -2 -> 3, 2 -> 4, ...
//! - Encoding: (n << 1) ^ (n >> 63)
//! - Decoding: (n >> 1) ^ -(n & 1)

use bytes::BufMut;

use crate::error::DecodeError;

/// Longest valid varint for a 64-bit value.
pub const MAX_VARINT_LEN: usize = 10;

// ============================================================================
// Decoding
// ============================================================================

/// Decode an unsigned varint, advancing the cursor past it.
///
/// # Errors
/// - `DecodeError::UnexpectedEof` if the input is truncated
/// - `DecodeError::InvalidVarint` if the varint exceeds 10 bytes
#[inline]
pub fn decode_varint(data: &mut &[u8]) -> Result<u64, DecodeError> {
    let mut result: u64 = 0;
    let mut shift: u32 = 0;

    loop {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *data = rest;

        result |= ((byte & 0x7F) as u64) << shift;

        if byte & 0x80 == 0 {
            return Ok(result);
        }

        shift += 7;
        if shift >= 64 {
            return Err(DecodeError::InvalidVarint);
        }
    }
}

/// Decode a zigzag-encoded signed varint.
#[inline]
pub fn decode_zigzag(data: &mut &[u8]) -> Result<i64, DecodeError> {
    let unsigned = decode_varint(data)?;
    Ok(unzigzag(unsigned))
}

/// Skip over a varint without decoding it.
///
/// Walks exactly the bytes `decode_varint` would consume; there is no way
/// to size a varint without reading it.
#[inline]
pub fn skip_varint(data: &mut &[u8]) -> Result<(), DecodeError> {
    for _ in 0..MAX_VARINT_LEN {
        let (&byte, rest) = data.split_first().ok_or(DecodeError::UnexpectedEof)?;
        *data = rest;
        if byte & 0x80 == 0 {
            return Ok(());
        }
    }
    Err(DecodeError::InvalidVarint)
}

#[inline]
pub fn unzigzag(n: u64) -> i64 {
    ((n >> 1) as i64) ^ (-((n & 1) as i64))
}

#[inline]
pub fn zigzag(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

// ============================================================================
// Encoding
// ============================================================================

/// Append an unsigned varint to `buf`.
#[inline]
pub fn put_varint<B: BufMut>(buf: &mut B, mut value: u64) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.put_u8(byte);
        if value == 0 {
            break;
        }
    }
}

/// Append a zigzag-encoded signed varint to `buf`.
#[inline]
pub fn put_zigzag<B: BufMut>(buf: &mut B, value: i64) {
    put_varint(buf, zigzag(value));
}

/// Encode an unsigned varint into a fresh vector.
pub fn encode_varint(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    put_varint(&mut out, value);
    out
}

/// Encode a signed value as a zigzag varint into a fresh vector.
pub fn encode_zigzag(value: i64) -> Vec<u8> {
    encode_varint(zigzag(value))
}
