//! The name table of a metadata file.
//!
//! Every string the payload file uses (column names, property tags, enum
//! values, row keys) is stored once here and referred to by index. The table
//! also owns the names appended during a save; the [`SizeLedger`] writes them
//! back into the metadata file.
//!
//! [`SizeLedger`]: crate::SizeLedger

use std::hash::BuildHasherDefault;

use byteorder::{LittleEndian, WriteBytesExt};
use dtforge_common::{string, BinaryReader, EngineString};
use hashbrown::HashMap as FastHashMap;
use rustc_hash::FxHasher;
use tracing::{debug, warn};

use crate::{Error, MetadataLayout, NameHash, NameReference, Result};

type FxHashMap<K, V> = FastHashMap<K, V, BuildHasherDefault<FxHasher>>;

/// The sentinel name that terminates an object stream.
pub const NONE: &str = "None";

/// Smallest possible serialized entry: empty length prefix plus hash.
const MIN_ENTRY_SIZE: usize = 4 + NameHash::SIZE;

/// A single name-table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameEntry {
    /// The name with trailing NULs removed.
    pub text: String,
    /// The hash stored (or computed, for appended names) beside the name.
    pub hash: NameHash,
    /// Whether the name is stored as UTF-16.
    pub wide: bool,
}

impl NameEntry {
    /// Whether the stored hash matches the one computed from the text.
    pub fn hash_matches(&self) -> bool {
        self.hash == NameHash::compute(&self.text)
    }
}

/// A name appended since the table was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendedName {
    /// Index assigned to the name.
    pub index: i32,
    /// The serialized entry, ready to be inserted into the metadata file.
    pub bytes: Vec<u8>,
}

/// Ordered, append-only name table.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    entries: Vec<NameEntry>,
    lookup: FxHashMap<String, i32>,
    end_offset: usize,
    appended: Vec<AppendedName>,
}

impl NameTable {
    /// Parse the name table of a metadata file with the default layout.
    pub fn parse(metadata: &[u8]) -> Result<Self> {
        Self::parse_with_layout(metadata, &MetadataLayout::DEFAULT)
    }

    /// Parse the name table of a metadata file.
    pub fn parse_with_layout(metadata: &[u8], layout: &MetadataLayout) -> Result<Self> {
        let count = BinaryReader::new_at(metadata, layout.name_count_offset).read_i64()?;
        let count = usize::try_from(count)
            .map_err(|_| Error::malformed(format!("negative name count {count}")))?;

        let available = metadata.len().saturating_sub(layout.name_list_offset);
        if count > available / MIN_ENTRY_SIZE {
            return Err(Error::malformed(format!(
                "name count {count} does not fit in {available} bytes"
            )));
        }

        let mut table = Self {
            entries: Vec::with_capacity(count),
            lookup: FxHashMap::default(),
            end_offset: 0,
            appended: Vec::new(),
        };

        let mut reader = BinaryReader::new_at(metadata, layout.name_list_offset);
        for _ in 0..count {
            let position = reader.position();
            let length = reader.read_i32()?;
            let EngineString { mut text, wide } = EngineString::read_payload(&mut reader, position, length)?;
            let trimmed = text.trim_end_matches('\0').len();
            text.truncate(trimmed);
            let hash = NameHash::from_bytes(reader.read_struct::<[u8; 4]>()?);
            table.push(NameEntry { text, hash, wide })?;
        }
        table.end_offset = reader.position();

        debug!(
            "Parsed name table ({} names, list ends at {:#x})",
            table.entries.len(),
            table.end_offset
        );
        Ok(table)
    }

    fn push(&mut self, entry: NameEntry) -> Result<i32> {
        let index = i32::try_from(self.entries.len())
            .map_err(|_| Error::malformed("name table index overflow"))?;
        match self.lookup.get(entry.text.as_str()) {
            Some(&first) => warn!(
                name = %entry.text,
                first,
                duplicate = index,
                "Duplicate name in table, lookups use the first index"
            ),
            None => {
                self.lookup.insert(entry.text.clone(), index);
            }
        }
        self.entries.push(entry);
        Ok(index)
    }

    /// Number of names, including appended ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Byte offset just past the last entry parsed from the file.
    #[inline]
    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    /// Get the name at `index`.
    pub fn get(&self, index: i32) -> Option<&str> {
        self.entry(index).map(|e| e.text.as_str())
    }

    /// Get the entry at `index`.
    pub fn entry(&self, index: i32) -> Option<&NameEntry> {
        usize::try_from(index).ok().and_then(|i| self.entries.get(i))
    }

    /// Iterate over all entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = &NameEntry> {
        self.entries.iter()
    }

    /// Whether `name` is an entry of its own.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Index of `name`.
    pub fn index_of(&self, name: &str) -> Result<i32> {
        self.lookup
            .get(name)
            .copied()
            .ok_or_else(|| Error::UnknownName(name.to_string()))
    }

    /// Resolve a reference to its display string.
    ///
    /// A non-zero instance number `n` produces `base_NNN` with `n - 1` padded
    /// to three digits. If that padded form is itself an entry of the table,
    /// the unpadded `base_{n - 1}` is produced instead; the engine does the
    /// same.
    pub fn resolve(&self, reference: NameReference) -> Result<String> {
        let base = self
            .get(reference.index)
            .ok_or(Error::UnknownIndex(reference.index))?;

        if reference.number == 0 {
            return Ok(base.to_string());
        }
        if reference.number < 0 {
            return Err(Error::malformed(format!(
                "negative instance number {} for {base:?}",
                reference.number
            )));
        }

        let instance = reference.number - 1;
        let padded = format!("{base}_{instance:03}");
        if self.contains(&padded) {
            Ok(format!("{base}_{instance}"))
        } else {
            Ok(padded)
        }
    }

    /// Whether `reference` resolves to the object terminator.
    pub fn is_none(&self, reference: NameReference) -> bool {
        reference.number == 0 && self.get(reference.index) == Some(NONE)
    }

    /// Append `name` and return its index and the number of bytes the
    /// metadata file grows by.
    ///
    /// Nothing is written until the table is handed to the [`SizeLedger`].
    ///
    /// [`SizeLedger`]: crate::SizeLedger
    pub fn append(&mut self, name: &str) -> Result<(i32, usize)> {
        let bytes = Self::encode_entry(name)?;
        let delta = bytes.len();
        let hash = NameHash::compute(name);
        let index = self.push(NameEntry {
            text: name.to_string(),
            hash,
            wide: string::needs_wide(name),
        })?;

        debug!(name, index, delta, "Appended name");
        self.appended.push(AppendedName { index, bytes });
        Ok((index, delta))
    }

    /// Find a reference for `name`, appending it if needed.
    ///
    /// `name` is split at its last `_`. When the prefix is already an entry
    /// and the suffix is a decimal number, the reference reuses the prefix
    /// with an instance number instead of adding a new entry.
    pub fn resolve_or_synthesize(&mut self, name: &str) -> Result<NameReference> {
        if self.contains(name) {
            return Ok(NameReference::new(self.index_of(name)?, 0));
        }

        if let Some((prefix, suffix)) = name.rsplit_once('_') {
            if let Some(instance) = parse_instance(suffix).filter(|_| self.contains(prefix)) {
                return Ok(NameReference::new(self.index_of(prefix)?, instance + 1));
            }
        }

        let (index, _) = self.append(name)?;
        Ok(NameReference::new(index, 0))
    }

    /// Names appended since parsing, in append order.
    #[inline]
    pub fn appended(&self) -> &[AppendedName] {
        &self.appended
    }

    /// Total serialized size of the appended names.
    pub fn appended_bytes(&self) -> usize {
        self.appended.iter().map(|a| a.bytes.len()).sum()
    }

    /// Serialize a name-table entry: length prefix, characters, NUL, hash.
    pub fn encode_entry(name: &str) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(string::encoded_len(name) + 1 + NameHash::SIZE);
        if name.is_empty() {
            // Entries always carry a terminator, even when empty.
            bytes.write_i32::<LittleEndian>(1)?;
            bytes.write_u8(0)?;
        } else {
            string::write(&mut bytes, name)?;
        }
        bytes.extend_from_slice(NameHash::compute(name).as_bytes());
        Ok(bytes)
    }
}

/// A decimal instance suffix that still leaves room for the `+ 1`.
fn parse_instance(suffix: &str) -> Option<i32> {
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse::<i32>().ok().filter(|n| *n < i32::MAX)
}
