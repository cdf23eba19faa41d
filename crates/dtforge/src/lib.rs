//! Dtforge - engine DataTable container library.
//!
//! This crate provides a unified interface to the Dtforge crates for reading
//! and writing DataTable containers (`.uasset` + `.uexp` pairs).
//!
//! # Crates
//!
//! - [`dtforge_common`] - Binary reading, engine strings, byte search
//! - [`dtforge_uasset`] - Name table, name hash and metadata size ledger
//! - [`dtforge_datatable`] - Row decoding and encoding
//!
//! # Example
//!
//! ```no_run
//! use dtforge::prelude::*;
//!
//! let path = std::path::Path::new("DT_Items.uasset");
//! let table = DataTable::load(path, dtforge::paired_payload_path(path))?;
//! for (key, row) in &table.rows {
//!     println!("{key}: {} cells", row.cells().len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::path::{Path, PathBuf};

// Re-export all sub-crates
pub use dtforge_common as common;
pub use dtforge_datatable as datatable;
pub use dtforge_uasset as uasset;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use dtforge_common::{BinaryReader, EngineString};
    pub use dtforge_datatable::{
        Cell, CellValue, Column, DataTable, DataTableObject, PropertyKind, StructValue,
    };
    pub use dtforge_uasset::{NameHash, NameReference, NameTable, SizeLedger};
}

// Re-export commonly used types at the crate root
pub use dtforge_datatable::{DataTable, Error, Result};

/// Extension of metadata files.
pub const METADATA_EXTENSION: &str = "uasset";
/// Extension of payload files.
pub const PAYLOAD_EXTENSION: &str = "uexp";

/// The payload file that sits next to a metadata file.
pub fn paired_payload_path(metadata: impl AsRef<Path>) -> PathBuf {
    metadata.as_ref().with_extension(PAYLOAD_EXTENSION)
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
