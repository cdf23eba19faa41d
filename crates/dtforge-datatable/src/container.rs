//! Loading and saving metadata/payload file pairs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dtforge_common::BinaryReader;
use dtforge_uasset::{NameReference, NameTable, SizeLedger};
use indexmap::IndexMap;
use tracing::{debug, info};

use crate::{DataTable, Decoder, Encoder, Error, Result};

/// Fixed offsets of the payload file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadLayout {
    /// Offset of the `i32` row count; everything before it is the header.
    pub row_count_offset: usize,
    /// Header length of a table without rows (a lone `None` reference).
    pub empty_header_len: usize,
}

impl PayloadLayout {
    pub const DEFAULT: Self = Self {
        row_count_offset: 0x29,
        empty_header_len: NameReference::SIZE,
    };

    /// Offset of the first row.
    #[inline]
    pub const fn rows_offset(&self) -> usize {
        self.row_count_offset + 4
    }
}

impl Default for PayloadLayout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Output of [`DataTable::encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedContainer {
    /// The patched metadata file.
    pub metadata: Vec<u8>,
    /// The payload file.
    pub payload: Vec<u8>,
    /// Number of names appended to the name table.
    pub appended_names: usize,
    /// Where the payload size was patched, if it changed.
    pub payload_size_offset: Option<usize>,
}

impl DataTable {
    /// Decode a table from in-memory file contents.
    pub fn from_bytes(name: impl Into<String>, metadata: &[u8], payload: &[u8]) -> Result<Self> {
        Self::from_bytes_with_layout(name, metadata, payload, &PayloadLayout::DEFAULT)
    }

    pub fn from_bytes_with_layout(
        name: impl Into<String>,
        metadata: &[u8],
        payload: &[u8],
        layout: &PayloadLayout,
    ) -> Result<Self> {
        let names = NameTable::parse(metadata)?;
        let mut table = DataTable {
            name: name.into(),
            ..Default::default()
        };

        let first: NameReference = BinaryReader::new(payload).peek_struct()?;
        if names.is_none(first) {
            table.header_bytes = payload[..layout.empty_header_len].to_vec();
            table.footer_bytes = payload[layout.empty_header_len..].to_vec();
            debug!("Table {} has no rows", table.name);
            return Ok(table);
        }

        let mut reader = BinaryReader::new_at(payload, layout.row_count_offset);
        let count = reader.read_i32()?;
        let count = usize::try_from(count).map_err(|_| Error::malformed(format!("negative row count {count}")))?;
        table.header_bytes = payload[..layout.row_count_offset].to_vec();

        let mut decoder = Decoder::new_at(payload, layout.rows_offset(), &names);
        let mut rows = IndexMap::with_capacity(count.min(payload.len()));
        for _ in 0..count {
            let key = decoder.read_name()?;
            let row = decoder.read_object()?;
            if rows.contains_key(&key) {
                return Err(Error::malformed(format!("duplicate row key {key:?}")));
            }
            rows.insert(key, row);
        }
        table.footer_bytes = decoder.remaining_bytes().to_vec();
        table.rows = rows;

        debug!(
            "Decoded table {} ({} rows, {} footer bytes)",
            table.name,
            table.rows.len(),
            table.footer_bytes.len()
        );
        Ok(table)
    }

    /// Load a table from a metadata file and its payload file.
    pub fn load(metadata_path: impl AsRef<Path>, payload_path: impl AsRef<Path>) -> Result<Self> {
        let metadata_path = metadata_path.as_ref();
        let payload_path = payload_path.as_ref();

        let metadata = read_file(metadata_path)?;
        let payload = read_file(payload_path)?;
        let name = metadata_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut table = Self::from_bytes(name, &metadata, &payload)?;
        table.metadata_path = Some(metadata_path.to_path_buf());
        table.payload_path = Some(payload_path.to_path_buf());

        info!("Loaded {} ({} rows)", metadata_path.display(), table.len());
        Ok(table)
    }

    /// Encode the table against the metadata it was loaded from.
    ///
    /// `original_payload_len` is the size of the payload file the metadata
    /// currently describes; the recorded size is moved to the new length.
    pub fn encode(&self, metadata: &[u8], original_payload_len: usize) -> Result<EncodedContainer> {
        self.encode_with_layout(metadata, original_payload_len, &PayloadLayout::DEFAULT)
    }

    pub fn encode_with_layout(
        &self,
        metadata: &[u8],
        original_payload_len: usize,
        layout: &PayloadLayout,
    ) -> Result<EncodedContainer> {
        let mut names = NameTable::parse(metadata)?;

        let mut payload = Vec::with_capacity(original_payload_len);
        payload.extend_from_slice(&self.header_bytes);
        if !self.rows.is_empty() {
            if self.header_bytes.len() != layout.row_count_offset {
                return Err(Error::malformed(format!(
                    "a {} byte payload header cannot hold rows",
                    self.header_bytes.len()
                )));
            }
            let count = i32::try_from(self.rows.len()).map_err(|_| Error::malformed("too many rows"))?;
            payload.extend_from_slice(&count.to_le_bytes());
        }

        let mut encoder = Encoder::new(&mut payload, &mut names);
        for (key, row) in &self.rows {
            encoder.write_name(key)?;
            encoder.write_object(row)?;
        }
        payload.extend_from_slice(&self.footer_bytes);

        let ledger = SizeLedger::default();
        let mut metadata = ledger.apply(metadata, &names)?;
        let payload_size_offset = ledger.sync_payload_size(&mut metadata, original_payload_len, payload.len())?;

        debug!(
            "Encoded table {} ({} payload bytes, {} new names)",
            self.name,
            payload.len(),
            names.appended().len()
        );
        Ok(EncodedContainer {
            metadata,
            payload,
            appended_names: names.appended().len(),
            payload_size_offset,
        })
    }

    /// Write the table back out.
    ///
    /// The source metadata file is re-read and patched; both files go to the
    /// override paths when given, otherwise over the source files.
    pub fn save(&self, metadata_override: Option<&Path>, payload_override: Option<&Path>) -> Result<()> {
        let metadata_source = self.metadata_path.as_deref().ok_or(Error::MissingPath("metadata"))?;
        let payload_source = self.payload_path.as_deref().ok_or(Error::MissingPath("payload"))?;

        let metadata = read_file(metadata_source)?;
        let original_payload_len = fs::metadata(payload_source)
            .map_err(|e| not_found(e, payload_source))?
            .len();
        let original_payload_len = usize::try_from(original_payload_len)
            .map_err(|_| Error::malformed(format!("{} is too large", payload_source.display())))?;

        let encoded = self.encode(&metadata, original_payload_len)?;

        let metadata_target = metadata_override.unwrap_or(metadata_source);
        let payload_target = payload_override.unwrap_or(payload_source);
        fs::write(payload_target, &encoded.payload)?;
        fs::write(metadata_target, &encoded.metadata)?;

        info!(
            "Saved {} and {} ({} new names)",
            metadata_target.display(),
            payload_target.display(),
            encoded.appended_names
        );
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| not_found(e, path))
}

fn not_found(err: io::Error, path: &Path) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::NotFound(PathBuf::from(path))
    } else {
        Error::Io(err)
    }
}
