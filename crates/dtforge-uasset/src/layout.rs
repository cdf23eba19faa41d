//! Fixed offsets of the supported metadata-file layout.

/// Byte offsets inside a metadata file that the name table and the size
/// ledger depend on.
///
/// All header fields are little-endian `i32`s except the name count, which is
/// an `i64` (only its low half is ever patched).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataLayout {
    /// Offset of the `i64` name count.
    pub name_count_offset: usize,
    /// Offset of the first name-table entry.
    pub name_list_offset: usize,
    /// Header fields that hold a byte size or an offset past the name table.
    pub byte_fields: &'static [usize],
    /// Header fields that hold the number of names.
    pub count_fields: &'static [usize],
    /// Distance from the end of the file to the trailing size field.
    pub trailer_byte_field_from_end: usize,
    /// The stored payload size is the file length minus this.
    pub payload_size_framing: i64,
}

impl MetadataLayout {
    /// Layout of the engine version this crate targets.
    pub const DEFAULT: Self = Self {
        name_count_offset: 0x75,
        name_list_offset: 0xC1,
        byte_fields: &[0x18, 0x3D, 0x45, 0x49, 0xA5, 0xA9, 0xBD],
        count_fields: &[0x29, 0x75],
        trailer_byte_field_from_end: 0x58,
        payload_size_framing: 4,
    };
}

impl Default for MetadataLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}
