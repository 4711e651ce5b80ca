//! Length prefix of the byte strings found in parameter streams.
//!
//! | first byte  | length                               |
//! |-------------|--------------------------------------|
//! | `0x00-0xfc` | the byte itself                      |
//! | `0xfd`      | next 2 bytes, little-endian `u16`    |
//! | `0xfe`      | next 4 bytes, little-endian `u32`    |
//! | `0xff`      | next 8 bytes, little-endian `u64`    |
//!
//! Each prefix is read at the width its tag declares.
use crate::env::errors::EnvError;

pub const TAG_U16: u8 = 0xfd;
pub const TAG_U32: u8 = 0xfe;
pub const TAG_U64: u8 = 0xff;

/// Decodes the length prefix found at `offset`. Returns the length and the
/// number of bytes the prefix occupies.
pub fn decode_len(buffer: &[u8], offset: usize) -> Result<(u64, usize), EnvError> {
    let tag = *buffer.get(offset).ok_or(EnvError::OutOfBounds {
        address: offset as u64,
        length: 1,
        limit: buffer.len() as u64,
    })?;
    let width = match tag {
        TAG_U16 => 2,
        TAG_U32 => 4,
        TAG_U64 => 8,
        inline => return Ok((inline as u64, 1)),
    };
    let field = buffer
        .get(offset + 1..offset + 1 + width)
        .ok_or_else(|| {
            EnvError::MalformedEncoding(format!(
                "length prefix 0x{:02x} at {} needs {} more bytes",
                tag, offset, width
            ))
        })?;
    let mut raw = [0u8; 8];
    raw[..width].copy_from_slice(field);
    Ok((u64::from_le_bytes(raw), 1 + width))
}

/// Appends the shortest length prefix able to hold `length`.
pub fn encode_len(length: u64, out: &mut Vec<u8>) {
    if length < TAG_U16 as u64 {
        out.push(length as u8);
    } else if length <= u16::MAX as u64 {
        out.push(TAG_U16);
        out.extend_from_slice(&(length as u16).to_le_bytes());
    } else if length <= u32::MAX as u64 {
        out.push(TAG_U32);
        out.extend_from_slice(&(length as u32).to_le_bytes());
    } else {
        out.push(TAG_U64);
        out.extend_from_slice(&length.to_le_bytes());
    }
}
