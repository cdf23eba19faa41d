//! Property stream decoder.
//!
//! A cell on the wire is a column name reference, a type tag reference, a
//! kind-specific tag region, and the value. The tag region is captured
//! verbatim as the cell header; only the value is interpreted.

use dtforge_common::{BinaryReader, EngineString};
use dtforge_uasset::{NameReference, NameTable, NONE};
use tracing::trace;

use crate::math::{LinearColor, MathStruct, Rotator, Vector, Vector2D, Vector4};
use crate::model::{ArrayValue, Cell, CellValue, DataTableObject, StructValue};
use crate::{Error, PropertyKind, Result};

/// Size + array index.
const TAG_SIZE_AND_INDEX: usize = 8;
/// Struct guid (16) + property guid flag (1).
const STRUCT_GUID_AND_FLAG: usize = 17;
/// Text cells at or below this declared size carry no source string.
pub(crate) const MAX_EMPTY_TEXT_SIZE: i32 = 5;
/// Declared size through the text flags, history type and namespace.
const TEXT_PREFIX: usize = 0x12;

/// Decodes cells from a payload buffer, resolving names through a table.
pub struct Decoder<'a, 'n> {
    reader: BinaryReader<'a>,
    names: &'n NameTable,
}

impl<'a, 'n> Decoder<'a, 'n> {
    pub fn new(data: &'a [u8], names: &'n NameTable) -> Self {
        Self::new_at(data, 0, names)
    }

    pub fn new_at(data: &'a [u8], position: usize, names: &'n NameTable) -> Self {
        Self {
            reader: BinaryReader::new_at(data, position),
            names,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.reader.position()
    }

    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        self.reader.remaining_bytes()
    }

    /// Read a name reference and resolve it.
    pub fn read_name(&mut self) -> Result<String> {
        let reference: NameReference = self.reader.read_struct()?;
        Ok(self.names.resolve(reference)?)
    }

    /// Read an object stream up to and including its `None` terminator.
    pub fn read_object(&mut self) -> Result<DataTableObject> {
        let mut cells = Vec::new();
        loop {
            let next: NameReference = self.reader.peek_struct()?;
            if self.names.is_none(next) {
                self.reader.skip(NameReference::SIZE)?;
                break;
            }
            cells.push(self.read_cell()?);
        }
        Ok(DataTableObject::Object(cells))
    }

    /// Read one tagged cell.
    pub fn read_cell(&mut self) -> Result<Cell> {
        let start = self.reader.position();
        let column = self.read_name()?;
        let tag = self.read_name()?;
        let kind = PropertyKind::from_tag(&tag).ok_or_else(|| Error::UnsupportedKind(tag.clone()))?;
        trace!(column = %column, kind = %kind, offset = start, "cell");

        let mut is_unicode = false;
        let (header, value) = match kind {
            PropertyKind::Bool => {
                self.reader.skip(TAG_SIZE_AND_INDEX)?;
                let header = self.header_since(start);
                let value = self.read_bool()?;
                let reserved = self.reader.read_u8()?;
                if reserved != 0 {
                    return Err(Error::malformed(format!(
                        "non-zero reserved byte {reserved:#04x} after bool {column:?}"
                    )));
                }
                (header, CellValue::Bool(value))
            }
            PropertyKind::Byte | PropertyKind::Enum => {
                self.reader.skip(TAG_SIZE_AND_INDEX)?;
                let enum_name = self.read_name()?;
                self.reader.skip(1)?;
                let header = self.header_since(start);
                let value = if enum_name == NONE {
                    CellValue::Byte(self.reader.read_u8()?)
                } else {
                    CellValue::Enum(self.read_name()?)
                };
                (header, value)
            }
            PropertyKind::Float
            | PropertyKind::Int
            | PropertyKind::UInt32
            | PropertyKind::Name
            | PropertyKind::Object
            | PropertyKind::SoftObject
            | PropertyKind::Str => {
                self.reader.skip(TAG_SIZE_AND_INDEX + 1)?;
                let header = self.header_since(start);
                let value = match kind {
                    PropertyKind::Float => CellValue::Float(self.reader.read_f32()?),
                    PropertyKind::Int => CellValue::Int(self.reader.read_i32()?),
                    PropertyKind::UInt32 => CellValue::UInt32(self.reader.read_u32()?),
                    PropertyKind::Name => CellValue::Name(self.read_name()?),
                    PropertyKind::Object => CellValue::Object(self.reader.read_i32()?),
                    PropertyKind::SoftObject => CellValue::SoftObject(self.read_soft_object()?),
                    _ => {
                        let string = EngineString::read(&mut self.reader)?;
                        is_unicode = string.wide;
                        CellValue::Str(string.text)
                    }
                };
                (header, value)
            }
            PropertyKind::Text => {
                let size = self.reader.peek_i32()?;
                if size > MAX_EMPTY_TEXT_SIZE {
                    self.reader.skip(TEXT_PREFIX)?;
                    let key_length = self.reader.read_i32()?;
                    self.reader.skip(string_byte_len(key_length)?)?;
                    let header = self.header_since(start);
                    let string = EngineString::read(&mut self.reader)?;
                    is_unicode = string.wide;
                    (header, CellValue::Text(Some(string.text)))
                } else {
                    let size = usize::try_from(size)
                        .map_err(|_| Error::malformed(format!("negative text size {size} for {column:?}")))?;
                    self.reader.skip(TAG_SIZE_AND_INDEX + 1 + size)?;
                    (self.header_since(start), CellValue::Text(None))
                }
            }
            PropertyKind::Struct => {
                self.reader.skip(TAG_SIZE_AND_INDEX)?;
                let struct_name = self.read_name()?;
                self.reader.skip(STRUCT_GUID_AND_FLAG)?;
                let header = self.header_since(start);
                let object = self.read_struct_body(&struct_name)?;
                (header, CellValue::Struct(StructValue { struct_name, object }))
            }
            PropertyKind::Array => {
                self.reader.skip(TAG_SIZE_AND_INDEX)?;
                let element_tag = self.read_name()?;
                self.reader.skip(1)?;
                let header = self.header_since(start);
                (header, CellValue::Array(self.read_array(&column, &element_tag)?))
            }
        };

        Ok(Cell {
            column,
            source_text: source_text(&value),
            value,
            header: Some(header),
            is_unicode,
        })
    }

    fn header_since(&self, start: usize) -> Vec<u8> {
        self.reader.bytes_since(start).to_vec()
    }

    fn read_bool(&mut self) -> Result<bool> {
        match self.reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::malformed(format!(
                "bool byte {other:#04x} at {:#x}",
                self.reader.position() - 1
            ))),
        }
    }

    fn read_soft_object(&mut self) -> Result<String> {
        let path = self.read_name()?;
        let trailing = self.reader.read_i32()?;
        if trailing != 0 {
            return Err(Error::malformed(format!(
                "soft object {path:?} followed by {trailing:#x} instead of zero"
            )));
        }
        Ok(path)
    }

    /// Read the body of a struct named `struct_name`.
    pub fn read_struct_body(&mut self, struct_name: &str) -> Result<DataTableObject> {
        let object = if struct_name == Vector::NAME {
            DataTableObject::Vector(self.reader.read_struct()?)
        } else if struct_name == Rotator::NAME {
            DataTableObject::Rotator(self.reader.read_struct()?)
        } else if struct_name == Vector2D::NAME {
            DataTableObject::Vector2D(self.reader.read_struct()?)
        } else if struct_name == Vector4::NAME {
            DataTableObject::Vector4(self.reader.read_struct()?)
        } else if struct_name == LinearColor::NAME {
            DataTableObject::LinearColor(self.reader.read_struct()?)
        } else {
            self.read_object()?
        };
        Ok(object)
    }

    fn read_array(&mut self, column: &str, element_tag: &str) -> Result<ArrayValue> {
        let element_kind =
            PropertyKind::from_tag(element_tag).ok_or_else(|| Error::UnsupportedKind(element_tag.to_string()))?;
        let count = self.reader.read_i32()?;
        let count = usize::try_from(count)
            .map_err(|_| Error::malformed(format!("negative element count {count} in {column:?}")))?;
        // Every element takes at least one byte.
        if count > self.reader.remaining() {
            return Err(Error::malformed(format!(
                "{count} elements in {column:?} exceed the remaining {} bytes",
                self.reader.remaining()
            )));
        }

        if element_kind == PropertyKind::Struct {
            let inner_start = self.reader.position();
            self.reader.skip(NameReference::SIZE * 2 + TAG_SIZE_AND_INDEX)?;
            let struct_name = self.read_name()?;
            self.reader.skip(STRUCT_GUID_AND_FLAG)?;
            let struct_header = self.header_since(inner_start);

            let mut elements = Vec::with_capacity(count);
            for _ in 0..count {
                let object = self.read_struct_body(&struct_name)?;
                elements.push(Cell::element(
                    struct_name.clone(),
                    CellValue::Struct(StructValue {
                        struct_name: struct_name.clone(),
                        object,
                    }),
                ));
            }
            return Ok(ArrayValue {
                element_kind,
                struct_name: Some(struct_name),
                struct_header: Some(struct_header),
                elements,
            });
        }

        let mut elements = Vec::with_capacity(count);
        for _ in 0..count {
            let mut is_unicode = false;
            let value = match element_kind {
                PropertyKind::Bool => CellValue::Bool(self.read_bool()?),
                PropertyKind::Byte | PropertyKind::Enum => CellValue::Enum(self.read_name()?),
                PropertyKind::Float => CellValue::Float(self.reader.read_f32()?),
                PropertyKind::Int => CellValue::Int(self.reader.read_i32()?),
                PropertyKind::UInt32 => CellValue::UInt32(self.reader.read_u32()?),
                PropertyKind::Object => CellValue::Object(self.reader.read_i32()?),
                PropertyKind::Name => CellValue::Name(self.read_name()?),
                PropertyKind::SoftObject => CellValue::SoftObject(self.read_soft_object()?),
                PropertyKind::Str => {
                    let string = EngineString::read(&mut self.reader)?;
                    is_unicode = string.wide;
                    CellValue::Str(string.text)
                }
                PropertyKind::Text | PropertyKind::Array | PropertyKind::Struct => {
                    return Err(Error::UnsupportedKind(element_tag.to_string()));
                }
            };
            let mut cell = Cell::element(column, value);
            cell.is_unicode = is_unicode;
            cell.source_text = source_text(&cell.value);
            elements.push(cell);
        }

        Ok(ArrayValue {
            element_kind,
            struct_name: None,
            struct_header: None,
            elements,
        })
    }
}

fn source_text(value: &CellValue) -> Option<String> {
    match value {
        CellValue::Str(text) | CellValue::Text(Some(text)) => Some(text.clone()),
        _ => None,
    }
}

/// Byte length of a string payload with the given length prefix.
fn string_byte_len(length: i32) -> Result<usize> {
    if length == i32::MIN {
        return Err(Error::malformed(format!("invalid string length {length}")));
    }
    let units = length.unsigned_abs() as usize;
    Ok(if length < 0 { units * 2 } else { units })
}
