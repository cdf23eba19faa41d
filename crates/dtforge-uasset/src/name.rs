//! Name references as stored in the payload file.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Reference to an entry in the name table.
///
/// `number == 0` means the entry is used verbatim; `number == n` appends a
/// numeric suffix derived from `n - 1` (see [`NameTable::resolve`]).
///
/// [`NameTable::resolve`]: crate::NameTable::resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C)]
pub struct NameReference {
    /// Index into the name table.
    pub index: i32,
    /// Instance number (0 = no suffix).
    pub number: i32,
}

impl NameReference {
    /// Size of a serialized reference in bytes.
    pub const SIZE: usize = 8;

    /// Create a new reference.
    #[inline]
    pub const fn new(index: i32, number: i32) -> Self {
        Self { index, number }
    }

    /// Whether the reference carries a numeric suffix.
    #[inline]
    pub const fn has_suffix(&self) -> bool {
        self.number != 0
    }

    /// The serialized little-endian form.
    #[inline]
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[..4].copy_from_slice(&self.index.to_le_bytes());
        bytes[4..].copy_from_slice(&self.number.to_le_bytes());
        bytes
    }
}
