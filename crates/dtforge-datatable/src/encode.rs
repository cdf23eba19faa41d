//! Property stream encoder.
//!
//! The inverse of [`Decoder`](crate::Decoder): each cell's captured header is
//! written back unchanged and only the value is re-serialized. String values go
//! through [`NameTable::resolve_or_synthesize`], so new strings grow the table.

use std::io::Write;

use dtforge_common::{string, BinaryReader};
use dtforge_uasset::{NameReference, NameTable, NONE};
use zerocopy::IntoBytes;

use crate::decode::MAX_EMPTY_TEXT_SIZE;
use crate::model::{ArrayValue, Cell, CellValue, DataTableObject};
use crate::{Error, PropertyKind, Result};

/// Encodes cells into a writer, appending new names to a table.
pub struct Encoder<'n, W: Write> {
    writer: W,
    names: &'n mut NameTable,
}

impl<'n, W: Write> Encoder<'n, W> {
    pub fn new(writer: W, names: &'n mut NameTable) -> Self {
        Self { writer, names }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write the name reference for `name`, appending it if it is new.
    pub fn write_name(&mut self, name: &str) -> Result<()> {
        let reference = self.names.resolve_or_synthesize(name)?;
        self.writer.write_all(reference.as_bytes())?;
        Ok(())
    }

    /// Write an object: its cells and the `None` terminator, or a math
    /// struct's floats.
    pub fn write_object(&mut self, object: &DataTableObject) -> Result<()> {
        match object {
            DataTableObject::Object(cells) => {
                for cell in cells {
                    self.write_cell(cell)?;
                }
                self.write_name(NONE)?;
            }
            DataTableObject::Vector(v) => self.writer.write_all(v.as_bytes())?,
            DataTableObject::Vector2D(v) => self.writer.write_all(v.as_bytes())?,
            DataTableObject::Vector4(v) => self.writer.write_all(v.as_bytes())?,
            DataTableObject::Rotator(v) => self.writer.write_all(v.as_bytes())?,
            DataTableObject::LinearColor(v) => self.writer.write_all(v.as_bytes())?,
        }
        Ok(())
    }

    /// Write a tagged cell.
    pub fn write_cell(&mut self, cell: &Cell) -> Result<()> {
        let header = cell
            .header
            .as_deref()
            .ok_or_else(|| Error::malformed(format!("cell {:?} has no captured header", cell.column)))?;
        self.check_header(cell, header)?;
        self.writer.write_all(header)?;

        match &cell.value {
            CellValue::Bool(value) => self.writer.write_all(&[u8::from(*value), 0])?,
            CellValue::Byte(value) => self.writer.write_all(&[*value])?,
            CellValue::Enum(name) | CellValue::Name(name) => self.write_name(name)?,
            CellValue::Float(value) => self.writer.write_all(&value.to_le_bytes())?,
            CellValue::Int(value) | CellValue::Object(value) => self.writer.write_all(&value.to_le_bytes())?,
            CellValue::UInt32(value) => self.writer.write_all(&value.to_le_bytes())?,
            CellValue::SoftObject(path) => self.write_soft_object(path)?,
            CellValue::Str(text) | CellValue::Text(Some(text)) => {
                string::write_as(&mut self.writer, text, cell.wide_for(text))?
            }
            CellValue::Text(None) => {}
            CellValue::Struct(value) => self.write_object(&value.object)?,
            CellValue::Array(array) => self.write_array(&cell.column, array)?,
        }
        Ok(())
    }

    /// Fail unless the value has the shape the captured tag announces.
    ///
    /// Byte properties hold a raw byte only when their enum name is `None`, and
    /// text holds a string only in its long form.
    fn check_header(&self, cell: &Cell, header: &[u8]) -> Result<()> {
        let mut reader = BinaryReader::new_at(header, NameReference::SIZE);
        let tag = self.names.resolve(reader.read_struct()?)?;
        let kind = PropertyKind::from_tag(&tag).ok_or_else(|| Error::UnsupportedKind(tag.clone()))?;
        let size = reader.read_i32()?;

        let fits = match (kind, &cell.value) {
            (PropertyKind::Byte | PropertyKind::Enum, value) => {
                reader.skip(4)?;
                let has_enum = !self.names.is_none(reader.read_struct()?);
                match value {
                    CellValue::Byte(_) => kind == PropertyKind::Byte && !has_enum,
                    CellValue::Enum(_) => has_enum,
                    _ => false,
                }
            }
            (PropertyKind::Text, CellValue::Text(text)) => text.is_some() == (size > MAX_EMPTY_TEXT_SIZE),
            (kind, value) => kind == value.kind(),
        };
        if !fits {
            return Err(Error::malformed(format!(
                "{} value does not fit the {tag} tag of {:?}",
                cell.value.kind(),
                cell.column
            )));
        }
        Ok(())
    }

    fn write_soft_object(&mut self, path: &str) -> Result<()> {
        self.write_name(path)?;
        self.writer.write_all(&0i32.to_le_bytes())?;
        Ok(())
    }

    fn write_array(&mut self, column: &str, array: &ArrayValue) -> Result<()> {
        let count = i32::try_from(array.elements.len())
            .map_err(|_| Error::malformed(format!("too many elements in {column:?}")))?;
        self.writer.write_all(&count.to_le_bytes())?;

        if array.element_kind == PropertyKind::Struct {
            let inner = array.struct_header.as_deref().ok_or_else(|| {
                Error::malformed(format!("struct array {column:?} has no captured inner tag"))
            })?;
            self.writer.write_all(inner)?;
            for element in &array.elements {
                match &element.value {
                    CellValue::Struct(value) => self.write_object(&value.object)?,
                    other => return Err(element_mismatch(column, array.element_kind, other)),
                }
            }
            return Ok(());
        }

        for element in &array.elements {
            match (array.element_kind, &element.value) {
                (PropertyKind::Text | PropertyKind::Array | PropertyKind::Struct, _) => {
                    return Err(Error::UnsupportedKind(array.element_kind.as_tag().to_string()));
                }
                (PropertyKind::Bool, CellValue::Bool(value)) => self.writer.write_all(&[u8::from(*value)])?,
                (PropertyKind::Byte | PropertyKind::Enum, CellValue::Enum(name))
                | (PropertyKind::Name, CellValue::Name(name)) => self.write_name(name)?,
                (PropertyKind::Float, CellValue::Float(value)) => self.writer.write_all(&value.to_le_bytes())?,
                (PropertyKind::Int, CellValue::Int(value))
                | (PropertyKind::Object, CellValue::Object(value)) => {
                    self.writer.write_all(&value.to_le_bytes())?
                }
                (PropertyKind::UInt32, CellValue::UInt32(value)) => self.writer.write_all(&value.to_le_bytes())?,
                (PropertyKind::SoftObject, CellValue::SoftObject(path)) => self.write_soft_object(path)?,
                (PropertyKind::Str, CellValue::Str(text)) => {
                    string::write_as(&mut self.writer, text, element.wide_for(text))?
                }
                (kind, other) => return Err(element_mismatch(column, kind, other)),
            }
        }
        Ok(())
    }
}

fn element_mismatch(column: &str, kind: PropertyKind, value: &CellValue) -> Error {
    Error::malformed(format!(
        "array {column:?} of {kind} holds a {} element",
        value.kind()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{self, PayloadWriter};
    use crate::Decoder;

    fn names() -> NameTable {
        NameTable::parse(&fixture::metadata(fixture::NAMES, 0)).unwrap()
    }

    fn encode(names: &mut NameTable, object: &DataTableObject) -> Result<Vec<u8>> {
        let mut encoder = Encoder::new(Vec::new(), names);
        encoder.write_object(object)?;
        Ok(encoder.into_inner())
    }

    #[test]
    fn test_object_round_trip() {
        let mut table = names();
        let mut writer = PayloadWriter::new(&table);
        writer
            .int_cell("Price", 99)
            .bool_cell("IsStackable", false)
            .str_cell("Description", "Sharp")
            .long_text_cell("DisplayName", "8A1F", "Sword");
        writer.tag("Offset", "StructProperty", 12).name("Vector").raw(&[0; 17]);
        writer.f32(1.0).f32(-2.5).f32(3.25);
        writer.name("None");
        let bytes = writer.finish();

        let object = Decoder::new(&bytes, &table).read_object().unwrap();
        assert_eq!(encode(&mut table, &object).unwrap(), bytes);
        assert!(table.appended().is_empty());
    }

    #[test]
    fn test_string_encoding_follows_content() {
        let mut table = names();
        let bytes = PayloadWriter::new(&table)
            .str_cell("Description", "Zürich")
            .name("None")
            .finish();

        let mut object = Decoder::new(&bytes, &table).read_object().unwrap();
        let cell = object.cell_mut("Description").unwrap();
        assert!(cell.is_unicode);
        assert_eq!(cell.value, CellValue::Str("Zürich".into()));

        // The stale flag does not force UTF-16 once the text is plain ASCII.
        cell.value = CellValue::Str("Zurich".into());
        let encoded = encode(&mut table, &object).unwrap();
        let value_start = 25;
        assert_eq!(&encoded[value_start..value_start + 4], &7i32.to_le_bytes());
        assert_eq!(&encoded[value_start + 4..value_start + 11], b"Zurich\0");
    }

    #[test]
    fn test_unedited_strings_keep_stored_encoding() {
        let mut table = names();
        let mut writer = PayloadWriter::new(&table);
        // ASCII text stored as UTF-16, and Latin-1 text stored as single bytes.
        writer.tag("Description", "StrProperty", 10).u8(0).string_as("Hi", true);
        writer.tag("Mesh", "StrProperty", 8).u8(0).string_as("Ca\u{e9}", false);
        let size = 4 + 1 + 4 + string::encoded_len("8A1F") + string::encoded_len_as("Sword", true);
        writer
            .tag("DisplayName", "TextProperty", size as i32)
            .u8(0)
            .i32(0)
            .u8(0)
            .i32(0)
            .string("8A1F")
            .string_as("Sword", true);
        let bytes = writer.name("None").finish();

        let mut object = Decoder::new(&bytes, &table).read_object().unwrap();
        assert!(object.cell("Description").unwrap().is_unicode);
        assert!(!object.cell("Mesh").unwrap().is_unicode);
        assert_eq!(encode(&mut table, &object).unwrap(), bytes);

        // Edited text picks its encoding from the new content.
        object.cell_mut("Description").unwrap().value = CellValue::Str("Hello".into());
        let encoded = encode(&mut table, &object).unwrap();
        assert_eq!(&encoded[25..29], &6i32.to_le_bytes());
        assert_eq!(&encoded[29..35], b"Hello\0");
    }

    #[test]
    fn test_array_element_kinds_round_trip() {
        let mut table = names();
        let bytes = fixture::array_kinds(&table);
        let mut object = Decoder::new(&bytes, &table).read_object().unwrap();
        assert_eq!(encode(&mut table, &object).unwrap(), bytes);
        assert!(table.appended().is_empty());

        let CellValue::Array(models) = &mut object.cell_mut("Model").unwrap().value else {
            panic!("expected an array");
        };
        models.elements[1].value = CellValue::SoftObject("/Game/Items/SM_Axe".into());
        let encoded = encode(&mut table, &object).unwrap();
        assert_eq!(encoded.len(), bytes.len());
        assert_eq!(table.appended().len(), 1);

        let reparsed = Decoder::new(&encoded, &table).read_object().unwrap();
        assert_eq!(reparsed, object);
    }

    #[test]
    fn test_value_must_fit_captured_tag() {
        let mut table = names();
        let mut writer = PayloadWriter::new(&table);
        writer.tag("Rarity", "ByteProperty", 1).name("None").u8(0).u8(2);
        writer.tag("Category", "EnumProperty", 8).name("ECategory").u8(0).name("ECategory::Armor");
        writer.long_text_cell("DisplayName", "8A1F", "Sword");
        writer.tag("Icon", "TextProperty", 5).u8(0).raw(&[0, 0xFF, 0xFF, 0xFF, 0xFF]);
        writer.tag("Weight", "FloatProperty", 4).u8(0).f32(3.5);
        let bytes = writer.name("None").finish();
        let object = Decoder::new(&bytes, &table).read_object().unwrap();
        assert_eq!(encode(&mut table, &object).unwrap(), bytes);

        let edits = [
            ("Rarity", CellValue::Enum("ECategory::Armor".into())),
            ("Category", CellValue::Byte(1)),
            ("DisplayName", CellValue::Text(None)),
            ("Icon", CellValue::Text(Some("Shield".into()))),
            ("Weight", CellValue::Int(3)),
        ];
        for (column, value) in edits {
            let mut edited = object.clone();
            edited.cell_mut(column).unwrap().value = value;
            assert!(
                matches!(encode(&mut table, &edited), Err(Error::MalformedContainer(_))),
                "{column} accepted a mismatched value"
            );
        }
    }

    #[test]
    fn test_new_names_are_appended() {
        let mut table = names();
        let bytes = PayloadWriter::new(&table)
            .name_cell("Mesh", "SM_Sword")
            .name("None")
            .finish();
        let mut object = Decoder::new(&bytes, &table).read_object().unwrap();

        object.cell_mut("Mesh").unwrap().value = CellValue::Name("Item_004".into());
        encode(&mut table, &object).unwrap();
        assert!(table.appended().is_empty());

        object.cell_mut("Mesh").unwrap().value = CellValue::Name("SM_Axe".into());
        let encoded = encode(&mut table, &object).unwrap();
        assert_eq!(table.appended().len(), 1);
        assert_eq!(encoded.len(), bytes.len());

        let reparsed = Decoder::new(&encoded, &table).read_object().unwrap();
        assert_eq!(reparsed.cell("Mesh").unwrap().value, CellValue::Name("SM_Axe".into()));
    }

    #[test]
    fn test_cell_without_header() {
        let mut table = names();
        let object = DataTableObject::Object(vec![Cell::element("Price", CellValue::Int(1))]);
        assert!(matches!(
            encode(&mut table, &object),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_array_element_mismatch() {
        let mut table = names();
        let bytes = PayloadWriter::new(&table)
            .int_array_cell("Levels", &[1, 2])
            .name("None")
            .finish();
        let mut object = Decoder::new(&bytes, &table).read_object().unwrap();
        assert_eq!(encode(&mut table, &object).unwrap(), bytes);

        let CellValue::Array(array) = &mut object.cell_mut("Levels").unwrap().value else {
            panic!("expected an array");
        };
        array.elements.push(Cell::element("Levels", CellValue::Float(3.0)));
        assert!(matches!(
            encode(&mut table, &object),
            Err(Error::MalformedContainer(_))
        ));
    }

    #[test]
    fn test_math_struct_bytes() {
        let mut table = names();
        let color = DataTableObject::LinearColor(crate::LinearColor { a: 1.0, r: 0.0, g: 0.5, b: 0.25 });
        let encoded = encode(&mut table, &color).unwrap();
        assert_eq!(&encoded[..4], &1.0f32.to_le_bytes());
        assert_eq!(&encoded[12..], &0.25f32.to_le_bytes());
    }
}
