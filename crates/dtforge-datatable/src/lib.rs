//! DataTable payload decoding and encoding.
//!
//! A DataTable container is a pair of files: the metadata file (`.uasset`)
//! holding the name table, and the payload file (`.uexp`) holding the rows as
//! tagged property streams that refer into it. [`DataTable::load`] decodes
//! both into an ordered map of rows; [`DataTable::save`] writes them back,
//! appending any new names and patching the size fields that depend on them.
//!
//! Unedited cells encode to the bytes they were read from.
//!
//! # Example
//!
//! ```no_run
//! use dtforge_datatable::{CellValue, DataTable};
//!
//! let mut table = DataTable::load("DT_Items.uasset", "DT_Items.uexp")?;
//! for column in table.columns() {
//!     println!("{}: {}", column.name, column.kind);
//! }
//!
//! if let Some(cell) = table.row_mut("Sword").and_then(|row| row.cell_mut("Price")) {
//!     cell.value = CellValue::Int(250);
//! }
//! table.save(None, None)?;
//! # Ok::<(), dtforge_datatable::Error>(())
//! ```

mod container;
mod decode;
mod encode;
mod error;
mod kind;
mod math;
mod model;

#[cfg(test)]
mod fixture;

pub use container::{EncodedContainer, PayloadLayout};
pub use decode::Decoder;
pub use encode::Encoder;
pub use error::{Error, Result};
pub use kind::PropertyKind;
pub use math::{LinearColor, MathStruct, Rotator, Vector, Vector2D, Vector4};
pub use model::{ArrayValue, Cell, CellValue, Column, DataTable, DataTableObject, StructValue};
