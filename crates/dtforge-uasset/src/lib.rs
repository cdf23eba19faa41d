//! Metadata-file support for DataTable containers.
//!
//! The metadata file (`.uasset`) of a DataTable container carries the name
//! table: a deduplicated pool of strings that the payload file refers to by
//! index. This crate parses that pool, resolves and synthesizes references into
//! it, computes the per-entry validation hash the engine checks, and patches the
//! header fields that record the pool's size when names are appended.
//!
//! # Example
//!
//! ```no_run
//! use dtforge_uasset::{NameReference, NameTable, SizeLedger};
//!
//! let metadata = std::fs::read("DT_Items.uasset")?;
//! let mut names = NameTable::parse(&metadata)?;
//!
//! println!("{}", names.resolve(NameReference::new(0, 0))?);
//!
//! // Appending goes through the table; the file is patched afterwards.
//! let reference = names.resolve_or_synthesize("ITEM_NEW_SWORD")?;
//! let patched = SizeLedger::default().apply(&metadata, &names)?;
//! # let _ = (reference, patched);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod hash;
mod layout;
mod ledger;
mod name;
mod name_table;

pub use error::{Error, Result};
pub use hash::NameHash;
pub use layout::MetadataLayout;
pub use ledger::SizeLedger;
pub use name::NameReference;
pub use name_table::{AppendedName, NameEntry, NameTable, NONE};
