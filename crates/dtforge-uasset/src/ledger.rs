//! Size bookkeeping for the metadata file.
//!
//! The metadata header records the size of the name table in several places,
//! and separately records the size of the payload file. Both must follow any
//! change or the engine refuses to load the pair.

use dtforge_common::search::{count_pattern, find_pattern_reverse};
use tracing::{debug, warn};

use crate::{Error, MetadataLayout, NameTable, Result};

/// Patches metadata header fields after names were appended or the payload
/// changed size.
#[derive(Debug, Clone, Copy, Default)]
pub struct SizeLedger {
    layout: MetadataLayout,
}

impl SizeLedger {
    pub const fn new(layout: MetadataLayout) -> Self {
        Self { layout }
    }

    #[inline]
    pub const fn layout(&self) -> &MetadataLayout {
        &self.layout
    }

    /// Insert the names appended to `names` into `metadata` and fix up the
    /// header.
    ///
    /// Returns a copy of `metadata` unchanged when nothing was appended.
    pub fn apply(&self, metadata: &[u8], names: &NameTable) -> Result<Vec<u8>> {
        let appended = names.appended();
        if appended.is_empty() {
            return Ok(metadata.to_vec());
        }

        let insert_at = names.end_offset();
        if insert_at > metadata.len() {
            return Err(Error::malformed(format!(
                "name list ends at {insert_at:#x}, past the end of a {} byte file",
                metadata.len()
            )));
        }

        let delta = names.appended_bytes();
        let byte_delta = i32::try_from(delta)
            .map_err(|_| Error::malformed(format!("appended names too large ({delta} bytes)")))?;
        let count_delta = i32::try_from(appended.len())
            .map_err(|_| Error::malformed("too many appended names"))?;

        let mut out = Vec::with_capacity(metadata.len() + delta);
        out.extend_from_slice(&metadata[..insert_at]);
        for name in appended {
            out.extend_from_slice(&name.bytes);
        }
        out.extend_from_slice(&metadata[insert_at..]);

        for &offset in self.layout.byte_fields {
            add_i32(&mut out, offset, byte_delta)?;
        }

        let trailer = out
            .len()
            .checked_sub(self.layout.trailer_byte_field_from_end)
            .filter(|&offset| offset >= insert_at + delta)
            .ok_or_else(|| Error::malformed("metadata file has no room for the trailing size field"))?;
        add_i32(&mut out, trailer, byte_delta)?;

        for &offset in self.layout.count_fields {
            add_i32(&mut out, offset, count_delta)?;
        }

        debug!(
            "Inserted {} names ({} bytes) at {:#x}",
            appended.len(),
            delta,
            insert_at
        );
        Ok(out)
    }

    /// Replace the payload size recorded in `metadata`.
    ///
    /// The field has no fixed offset; it is located by searching backward for
    /// the old value. Returns the patched offset, or `None` when the size did
    /// not change.
    pub fn sync_payload_size(
        &self,
        metadata: &mut [u8],
        old_len: usize,
        new_len: usize,
    ) -> Result<Option<usize>> {
        if old_len == new_len {
            return Ok(None);
        }

        let old_value = self.stored_size(old_len)?;
        let new_value = self.stored_size(new_len)?;
        let needle = old_value.to_le_bytes();

        let offset = find_pattern_reverse(&needle, metadata).ok_or_else(|| {
            Error::malformed(format!("payload size {old_value} is not recorded in the metadata"))
        })?;

        let occurrences = count_pattern(&needle, metadata);
        if occurrences > 1 {
            warn!(
                value = old_value,
                occurrences,
                offset,
                "Payload size appears more than once in metadata, patching the last"
            );
        }

        metadata[offset..offset + needle.len()].copy_from_slice(&new_value.to_le_bytes());
        debug!("Payload size {} -> {} at {:#x}", old_value, new_value, offset);
        Ok(Some(offset))
    }

    fn stored_size(&self, len: usize) -> Result<i64> {
        i64::try_from(len)
            .ok()
            .and_then(|len| len.checked_sub(self.layout.payload_size_framing))
            .ok_or_else(|| Error::malformed(format!("payload length {len} out of range")))
    }
}

fn add_i32(data: &mut [u8], offset: usize, delta: i32) -> Result<()> {
    let field = data
        .get_mut(offset..offset + 4)
        .ok_or_else(|| Error::malformed(format!("header field {offset:#x} is out of range")))?;
    let value = i32::from_le_bytes([field[0], field[1], field[2], field[3]]);
    let patched = value
        .checked_add(delta)
        .ok_or_else(|| Error::malformed(format!("header field {offset:#x} overflows")))?;
    field.copy_from_slice(&patched.to_le_bytes());
    Ok(())
}
