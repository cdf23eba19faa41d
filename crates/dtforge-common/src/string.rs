//! Engine string codec.
//!
//! Strings are stored as a signed 32-bit length followed by the characters and
//! a terminating NUL. A non-negative length counts single-byte characters; a
//! negative length counts UTF-16 code units (so the payload is `-length * 2`
//! bytes). A length of zero is the empty string with no payload at all.

use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::{BinaryReader, Error, Result};

/// A decoded engine string together with the encoding it was stored in.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineString {
    /// The text without its terminating NUL.
    pub text: String,
    /// Whether the string was stored as UTF-16.
    pub wide: bool,
}

impl EngineString {
    /// Read a length-prefixed string, dropping one terminating NUL.
    pub fn read(reader: &mut BinaryReader<'_>) -> Result<Self> {
        let position = reader.position();
        let length = reader.read_i32()?;
        let mut decoded = Self::read_payload(reader, position, length)?;
        if decoded.text.ends_with('\0') {
            decoded.text.pop();
        }
        Ok(decoded)
    }

    /// Read the characters of a string whose length prefix was already consumed.
    ///
    /// No NUL is removed.
    pub fn read_payload(reader: &mut BinaryReader<'_>, position: usize, length: i32) -> Result<Self> {
        if length == 0 {
            return Ok(Self::default());
        }
        if length == i32::MIN {
            return Err(Error::InvalidStringLength { position, length });
        }

        if length < 0 {
            let units = length.unsigned_abs() as usize;
            let bytes = reader.read_bytes(units * 2)?;
            let code_units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|c| u16::from_le_bytes([c[0], c[1]]))
                .collect();
            let text = String::from_utf16(&code_units).map_err(|_| Error::InvalidUtf16 { position })?;
            Ok(Self { text, wide: true })
        } else {
            let bytes = reader.read_bytes(length as usize)?;
            // Single-byte strings map each byte to the code point of the same value.
            let text = bytes.iter().map(|&b| char::from(b)).collect();
            Ok(Self { text, wide: false })
        }
    }
}

/// Whether `text` has to be stored as UTF-16.
#[inline]
pub fn needs_wide(text: &str) -> bool {
    !text.is_ascii()
}

/// Whether every character of `text` has a single-byte form.
///
/// Single-byte strings decode one byte to the code point of the same value,
/// so anything up to U+00FF can be written back that way.
#[inline]
pub fn fits_narrow(text: &str) -> bool {
    text.chars().all(|c| u32::from(c) <= 0xFF)
}

/// Write `text` as a length-prefixed, NUL-terminated engine string.
///
/// The encoding is chosen from the content: empty text is written as a bare
/// zero length, ASCII text as single bytes, anything else as UTF-16.
pub fn write<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    write_as(writer, text, needs_wide(text))
}

/// Write `text` in a given encoding.
///
/// Text that does not [fit](fits_narrow) a single-byte string is written as
/// UTF-16 regardless of `wide`.
pub fn write_as<W: Write>(writer: &mut W, text: &str, wide: bool) -> Result<()> {
    if text.is_empty() {
        writer.write_i32::<LittleEndian>(0)?;
        return Ok(());
    }

    if wide || !fits_narrow(text) {
        let units: Vec<u16> = text.encode_utf16().collect();
        writer.write_i32::<LittleEndian>(-(units.len() as i32 + 1))?;
        for unit in units {
            writer.write_u16::<LittleEndian>(unit)?;
        }
        writer.write_u16::<LittleEndian>(0)?;
    } else {
        let bytes: Vec<u8> = text.chars().map(|c| u32::from(c) as u8).collect();
        writer.write_i32::<LittleEndian>(bytes.len() as i32 + 1)?;
        writer.write_all(&bytes)?;
        writer.write_u8(0)?;
    }
    Ok(())
}

/// Size in bytes of `text` once written by [`write`], including the prefix.
pub fn encoded_len(text: &str) -> usize {
    encoded_len_as(text, needs_wide(text))
}

/// Size in bytes of `text` once written by [`write_as`].
pub fn encoded_len_as(text: &str, wide: bool) -> usize {
    if text.is_empty() {
        4
    } else if wide || !fits_narrow(text) {
        4 + (text.encode_utf16().count() + 1) * 2
    } else {
        4 + text.chars().count() + 1
    }
}
