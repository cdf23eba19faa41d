//! In-memory representation of a DataTable.
//!
//! A [`DataTable`] is an ordered map from row key to [`DataTableObject`]. Cells
//! keep the raw tag bytes they were decoded from so that unedited cells encode
//! back to exactly the same bytes.

use std::fmt;
use std::path::PathBuf;

use dtforge_common::string;
use indexmap::IndexMap;

use crate::math::{LinearColor, MathStruct, Rotator, Vector, Vector2D, Vector4};
use crate::PropertyKind;

/// A decoded DataTable.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DataTable {
    /// Table name (the metadata file stem).
    pub name: String,
    /// Rows in file order.
    pub rows: IndexMap<String, DataTableObject>,
    /// Payload bytes before the row count, replayed verbatim.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub header_bytes: Vec<u8>,
    /// Payload bytes after the last row, replayed verbatim.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub footer_bytes: Vec<u8>,
    /// Where the metadata file was loaded from.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub metadata_path: Option<PathBuf>,
    /// Where the payload file was loaded from.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub payload_path: Option<PathBuf>,
}

impl DataTable {
    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns of the table, taken from the first row.
    pub fn columns(&self) -> Vec<Column> {
        self.rows
            .values()
            .next()
            .map(|row| row.cells().iter().map(Cell::column_info).collect())
            .unwrap_or_default()
    }

    pub fn row(&self, key: &str) -> Option<&DataTableObject> {
        self.rows.get(key)
    }

    pub fn row_mut(&mut self, key: &str) -> Option<&mut DataTableObject> {
        self.rows.get_mut(key)
    }
}

/// A row or nested struct.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DataTableObject {
    /// Named cells, terminated on the wire by `None`.
    Object(Vec<Cell>),
    Vector(Vector),
    Vector2D(Vector2D),
    Vector4(Vector4),
    Rotator(Rotator),
    LinearColor(LinearColor),
}

impl DataTableObject {
    /// Cells of an `Object`; math structs have none.
    pub fn cells(&self) -> &[Cell] {
        match self {
            Self::Object(cells) => cells,
            _ => &[],
        }
    }

    /// Find a cell by column name.
    pub fn cell(&self, column: &str) -> Option<&Cell> {
        self.cells().iter().find(|c| c.column == column)
    }

    /// Find a cell by column name for editing.
    pub fn cell_mut(&mut self, column: &str) -> Option<&mut Cell> {
        match self {
            Self::Object(cells) => cells.iter_mut().find(|c| c.column == column),
            _ => None,
        }
    }

    /// Name of a built-in math struct, `None` for generic objects.
    pub fn math_name(&self) -> Option<&'static str> {
        match self {
            Self::Object(_) => None,
            Self::Vector(_) => Some(Vector::NAME),
            Self::Vector2D(_) => Some(Vector2D::NAME),
            Self::Vector4(_) => Some(Vector4::NAME),
            Self::Rotator(_) => Some(Rotator::NAME),
            Self::LinearColor(_) => Some(LinearColor::NAME),
        }
    }

    /// Named float fields of a math struct in wire order.
    pub fn fields(&self) -> Vec<(&'static str, f32)> {
        match self {
            Self::Object(_) => Vec::new(),
            Self::Vector(v) => v.fields(),
            Self::Vector2D(v) => v.fields(),
            Self::Vector4(v) => v.fields(),
            Self::Rotator(v) => v.fields(),
            Self::LinearColor(v) => v.fields(),
        }
    }
}

/// A single property value with its captured tag bytes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Cell {
    pub column: String,
    pub value: CellValue,
    /// Tag bytes from the start of the cell up to its value. Array elements
    /// carry none.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub header: Option<Vec<u8>>,
    /// Whether a string value was stored as UTF-16 when decoded.
    pub is_unicode: bool,
    /// The string value as decoded.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub source_text: Option<String>,
}

impl Cell {
    /// A cell without captured tag bytes.
    pub fn element(column: impl Into<String>, value: CellValue) -> Self {
        Self {
            column: column.into(),
            value,
            header: None,
            is_unicode: false,
            source_text: None,
        }
    }

    /// Whether `text` should be written as UTF-16.
    ///
    /// While the value still equals the decoded string it keeps the encoding
    /// it was read with; edited text picks its encoding from its content.
    pub fn wide_for(&self, text: &str) -> bool {
        match &self.source_text {
            Some(source) if source == text => self.is_unicode,
            _ => string::needs_wide(text),
        }
    }

    #[inline]
    pub fn kind(&self) -> PropertyKind {
        self.value.kind()
    }

    pub fn column_info(&self) -> Column {
        Column {
            name: self.column.clone(),
            kind: self.kind(),
        }
    }
}

/// Name and kind of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Column {
    pub name: String,
    pub kind: PropertyKind,
}

/// A property value, one variant per kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CellValue {
    Bool(bool),
    /// Raw byte of a byte property without an enum.
    Byte(u8),
    /// Enum value name.
    Enum(String),
    Float(f32),
    Int(i32),
    UInt32(u32),
    Name(String),
    /// Object import index.
    Object(i32),
    /// Soft object path.
    SoftObject(String),
    Str(String),
    /// Localized text; `None` when the cell has no source string.
    Text(Option<String>),
    Struct(StructValue),
    Array(ArrayValue),
}

impl CellValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Bool(_) => PropertyKind::Bool,
            Self::Byte(_) => PropertyKind::Byte,
            Self::Enum(_) => PropertyKind::Enum,
            Self::Float(_) => PropertyKind::Float,
            Self::Int(_) => PropertyKind::Int,
            Self::UInt32(_) => PropertyKind::UInt32,
            Self::Name(_) => PropertyKind::Name,
            Self::Object(_) => PropertyKind::Object,
            Self::SoftObject(_) => PropertyKind::SoftObject,
            Self::Str(_) => PropertyKind::Str,
            Self::Text(_) => PropertyKind::Text,
            Self::Struct(_) => PropertyKind::Struct,
            Self::Array(_) => PropertyKind::Array,
        }
    }

    /// The string held by a string-like value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Enum(s) | Self::Name(s) | Self::SoftObject(s) | Self::Str(s) => Some(s),
            Self::Text(text) => text.as_deref(),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) | Self::Object(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Enum(s) | Self::Name(s) | Self::SoftObject(s) | Self::Str(s) => write!(f, "{s}"),
            Self::Text(Some(s)) => write!(f, "{s}"),
            Self::Text(None) => write!(f, "<empty text>"),
            Self::Struct(s) => write!(f, "{}{{..}}", s.struct_name),
            Self::Array(a) => write!(f, "{}[{}]", a.element_kind, a.elements.len()),
        }
    }
}

/// A nested struct value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct StructValue {
    pub struct_name: String,
    pub object: DataTableObject,
}

/// An array value.
///
/// Struct arrays store one inner tag for all elements; it is kept in
/// `struct_header` together with the struct name it names.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArrayValue {
    pub element_kind: PropertyKind,
    pub struct_name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub struct_header: Option<Vec<u8>>,
    pub elements: Vec<Cell>,
}
