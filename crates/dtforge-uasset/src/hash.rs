//! Name validation hash.
//!
//! Every name-table entry is followed by four bytes the engine recomputes on
//! load. They are two 16-bit halves:
//!
//! 1. a case-insensitive CRC over the upper-cased UTF-16 units, using the
//!    MSB-first CRC-32 table but shifting right;
//! 2. the low half of a standard CRC-32 over the characters widened to
//!    32 bits each.

use std::fmt;

/// Generator polynomial shared by both passes.
const POLYNOMIAL: u32 = 0x04C1_1DB7;

const fn msb_first_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ POLYNOMIAL
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

static UPPERCASE_TABLE: [u32; 256] = msb_first_table();

/// The 4-byte hash stored after each name-table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NameHash(pub [u8; 4]);

impl NameHash {
    /// Size of a serialized hash in bytes.
    pub const SIZE: usize = 4;

    /// Compute the hash of `name`.
    pub fn compute(name: &str) -> Self {
        let upper = uppercase_crc(name) as u16;
        let wide = wide_crc(name) as u16;

        let mut bytes = [0u8; 4];
        bytes[..2].copy_from_slice(&upper.to_le_bytes());
        bytes[2..].copy_from_slice(&wide.to_le_bytes());
        Self(bytes)
    }

    /// Wrap stored hash bytes.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for NameHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

fn uppercase_crc(name: &str) -> u32 {
    name.encode_utf16().fold(0u32, |hash, unit| {
        let code = upper_unit(unit);
        ((hash >> 8) & 0x00FF_FFFF) ^ UPPERCASE_TABLE[((hash ^ code) & 0xFF) as usize]
    })
}

/// Upper-case a single UTF-16 unit.
///
/// Characters whose upper case is not exactly one BMP character (`ß`,
/// ligatures) are kept, as are surrogate halves.
fn upper_unit(unit: u16) -> u32 {
    let Some(c) = char::from_u32(u32::from(unit)) else {
        return u32::from(unit);
    };
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) if u32::from(u) <= 0xFFFF => u32::from(u),
        _ => u32::from(unit),
    }
}

fn wide_crc(name: &str) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    for c in name.chars() {
        let narrow = if c.is_ascii() { c as u8 } else { b'?' };
        hasher.update(&[narrow, 0, 0, 0]);
    }
    hasher.finalize()
}
