//! Synthetic containers for tests.

use dtforge_common::string;
use dtforge_uasset::{MetadataLayout, NameTable};

/// Names of the sample table, in index order.
pub(crate) const NAMES: &[&str] = &[
    "None",
    "ArrayProperty",
    "BoolProperty",
    "ByteProperty",
    "EnumProperty",
    "FloatProperty",
    "IntProperty",
    "UInt32Property",
    "NameProperty",
    "ObjectProperty",
    "SoftObjectProperty",
    "StrProperty",
    "TextProperty",
    "StructProperty",
    "Vector",
    "LinearColor",
    "ItemStats",
    "RowStruct",
    "Item",
    "IsStackable",
    "Rarity",
    "Category",
    "ECategory",
    "ECategory::Weapon",
    "ECategory::Armor",
    "Weight",
    "Price",
    "Flags",
    "Mesh",
    "SM_Sword",
    "SM_Shield",
    "Icon",
    "Model",
    "/Game/Items/SM_Sword",
    "/Game/Items/SM_Shield",
    "Description",
    "DisplayName",
    "Offset",
    "Tint",
    "Stats",
    "Damage",
    "Tags",
    "Fire",
    "Ice",
    "Sockets",
    "Levels",
];

/// Length of the trailer appended after the name list.
pub(crate) const TRAILER: usize = 0x60;
/// Offset of the stored payload size inside the trailer.
pub(crate) const TRAILER_PAYLOAD_SIZE: usize = 0x20;
/// Tag found at the end of payload files.
pub(crate) const FOOTER: [u8; 4] = [0xC1, 0x83, 0x2A, 0x9E];

/// Seed value of the `i`-th byte field.
pub(crate) fn byte_field_seed(i: usize) -> i32 {
    0x0001_0000 + 0x100 * i as i32
}

/// Build a metadata file holding `names` and recording `payload_len`.
pub(crate) fn metadata(names: &[&str], payload_len: usize) -> Vec<u8> {
    let layout = MetadataLayout::DEFAULT;
    let mut data = vec![0u8; layout.name_list_offset];
    for (i, &offset) in layout.byte_fields.iter().enumerate() {
        data[offset..offset + 4].copy_from_slice(&byte_field_seed(i).to_le_bytes());
    }
    data[0x29..0x2D].copy_from_slice(&(names.len() as i32).to_le_bytes());
    data[layout.name_count_offset..layout.name_count_offset + 8]
        .copy_from_slice(&(names.len() as i64).to_le_bytes());
    for name in names {
        data.extend(NameTable::encode_entry(name).unwrap());
    }

    let mut trailer = vec![0u8; TRAILER];
    let field = TRAILER - layout.trailer_byte_field_from_end;
    trailer[field..field + 4].copy_from_slice(&0x0200_0000i32.to_le_bytes());
    trailer[TRAILER_PAYLOAD_SIZE..TRAILER_PAYLOAD_SIZE + 8]
        .copy_from_slice(&(payload_len as i64 - layout.payload_size_framing).to_le_bytes());
    data.extend(trailer);
    data
}

/// Byte builder for payload streams.
pub(crate) struct PayloadWriter<'n> {
    names: &'n NameTable,
    bytes: Vec<u8>,
}

impl<'n> PayloadWriter<'n> {
    pub(crate) fn new(names: &'n NameTable) -> Self {
        Self {
            names,
            bytes: Vec::new(),
        }
    }

    pub(crate) fn finish(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.bytes)
    }

    pub(crate) fn name(&mut self, name: &str) -> &mut Self {
        self.name_n(name, 0)
    }

    pub(crate) fn name_n(&mut self, name: &str, number: i32) -> &mut Self {
        let index = self.names.index_of(name).unwrap();
        self.i32(index).i32(number)
    }

    pub(crate) fn u8(&mut self, value: u8) -> &mut Self {
        self.bytes.push(value);
        self
    }

    pub(crate) fn i32(&mut self, value: i32) -> &mut Self {
        self.raw(&value.to_le_bytes())
    }

    pub(crate) fn u32(&mut self, value: u32) -> &mut Self {
        self.raw(&value.to_le_bytes())
    }

    pub(crate) fn f32(&mut self, value: f32) -> &mut Self {
        self.raw(&value.to_le_bytes())
    }

    pub(crate) fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub(crate) fn string(&mut self, text: &str) -> &mut Self {
        string::write(&mut self.bytes, text).unwrap();
        self
    }

    /// A string in a fixed encoding.
    pub(crate) fn string_as(&mut self, text: &str, wide: bool) -> &mut Self {
        string::write_as(&mut self.bytes, text, wide).unwrap();
        self
    }

    /// Column name, type tag, declared size and array index.
    pub(crate) fn tag(&mut self, column: &str, kind: &str, size: i32) -> &mut Self {
        self.name(column).name(kind).i32(size).i32(0)
    }

    pub(crate) fn int_cell(&mut self, column: &str, value: i32) -> &mut Self {
        self.tag(column, "IntProperty", 4).u8(0).i32(value)
    }

    pub(crate) fn bool_cell(&mut self, column: &str, value: bool) -> &mut Self {
        self.tag(column, "BoolProperty", 0).u8(u8::from(value)).u8(0)
    }

    pub(crate) fn name_cell(&mut self, column: &str, value: &str) -> &mut Self {
        self.tag(column, "NameProperty", 8).u8(0).name(value)
    }

    pub(crate) fn str_cell(&mut self, column: &str, text: &str) -> &mut Self {
        let size = string::encoded_len(text) as i32;
        self.tag(column, "StrProperty", size).u8(0).string(text)
    }

    pub(crate) fn long_text_cell(&mut self, column: &str, key: &str, text: &str) -> &mut Self {
        let size = 4 + 1 + 4 + string::encoded_len(key) + string::encoded_len(text);
        self.tag(column, "TextProperty", size as i32)
            .u8(0) // guid flag
            .i32(0) // text flags
            .u8(0) // history type
            .i32(0) // namespace
            .string(key)
            .string(text)
    }

    pub(crate) fn int_array_cell(&mut self, column: &str, values: &[i32]) -> &mut Self {
        let size = 4 + 4 * values.len() as i32;
        self.tag(column, "ArrayProperty", size)
            .name("IntProperty")
            .u8(0)
            .i32(values.len() as i32);
        for &value in values {
            self.i32(value);
        }
        self
    }

    /// Array tag and element count; the caller writes the elements.
    pub(crate) fn array_header(&mut self, column: &str, element: &str, count: i32) -> &mut Self {
        self.tag(column, "ArrayProperty", 0).name(element).u8(0).i32(count)
    }

    /// Array of `Vector` structs with one shared inner tag.
    pub(crate) fn vector_array_cell(&mut self, column: &str, values: &[[f32; 3]]) -> &mut Self {
        let body = 12 * values.len() as i32;
        self.tag(column, "ArrayProperty", 4 + 49 + body)
            .name("StructProperty")
            .u8(0)
            .i32(values.len() as i32);
        self.tag(column, "StructProperty", body).name("Vector").raw(&[0; 17]);
        for value in values {
            self.f32(value[0]).f32(value[1]).f32(value[2]);
        }
        self
    }

    /// One full row of the sample table.
    pub(crate) fn item_row(&mut self, first: bool) -> &mut Self {
        let (rarity, category, weight, price) = if first {
            (2, "ECategory::Weapon", 3.5, 250)
        } else {
            (0, "ECategory::Armor", 7.25, 410)
        };
        let (mesh, model) = if first {
            ("SM_Sword", "/Game/Items/SM_Sword")
        } else {
            ("SM_Shield", "/Game/Items/SM_Shield")
        };

        self.bool_cell("IsStackable", !first);
        self.tag("Rarity", "ByteProperty", 1).name("None").u8(0).u8(rarity);
        self.tag("Category", "EnumProperty", 8).name("ECategory").u8(0).name(category);
        self.tag("Weight", "FloatProperty", 4).u8(0).f32(weight);
        self.int_cell("Price", price);
        self.tag("Flags", "UInt32Property", 4).u8(0).u32(0x8000_0001);
        self.name_cell("Mesh", mesh);
        self.tag("Icon", "ObjectProperty", 4).u8(0).i32(-3);
        self.tag("Model", "SoftObjectProperty", 12).u8(0).name(model).i32(0);

        if first {
            self.str_cell("Description", "A trusty blade");
            self.long_text_cell("DisplayName", "8A1F", "Sword");
        } else {
            self.str_cell("Description", "Bouclier légendaire");
            self.tag("DisplayName", "TextProperty", 5).u8(0).raw(&[0, 0xFF, 0xFF, 0xFF, 0xFF]);
        }

        self.tag("Offset", "StructProperty", 12).name("Vector").raw(&[0; 17]);
        self.f32(0.0).f32(12.5).f32(-4.0);
        self.tag("Tint", "StructProperty", 16).name("LinearColor").raw(&[0; 17]);
        self.f32(1.0).f32(0.8).f32(0.6).f32(0.4);
        self.tag("Stats", "StructProperty", 33).name("ItemStats").raw(&[0; 17]);
        self.int_cell("Damage", if first { 40 } else { 0 }).name("None");

        if first {
            self.tag("Tags", "ArrayProperty", 20).name("NameProperty").u8(0).i32(2);
            self.name("Fire").name("Ice");
            self.vector_array_cell("Sockets", &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        } else {
            self.tag("Tags", "ArrayProperty", 4).name("NameProperty").u8(0).i32(0);
            self.vector_array_cell("Sockets", &[]);
        }
        self.int_array_cell("Levels", &[1, 5, 10]);
        self.name("None")
    }
}

/// An object holding one array of every element kind but text and nested
/// arrays.
pub(crate) fn array_kinds(names: &NameTable) -> Vec<u8> {
    let mut writer = PayloadWriter::new(names);
    writer.array_header("Flags", "BoolProperty", 3).u8(1).u8(0).u8(1);
    writer
        .array_header("Category", "ByteProperty", 2)
        .name("ECategory::Weapon")
        .name("ECategory::Armor");
    writer.array_header("Weight", "FloatProperty", 2).f32(1.5).f32(-2.0);
    writer.array_header("Price", "UInt32Property", 1).u32(u32::MAX);
    writer.array_header("Icon", "ObjectProperty", 2).i32(-1).i32(4);
    writer
        .array_header("Model", "SoftObjectProperty", 2)
        .name("/Game/Items/SM_Sword")
        .i32(0)
        .name("/Game/Items/SM_Shield")
        .i32(0);
    writer
        .array_header("Tags", "StrProperty", 3)
        .string("Fire")
        .string_as("Ice", true)
        .string_as("Gl\u{e2}ce", false);

    writer.array_header("Stats", "StructProperty", 2);
    writer.tag("Stats", "StructProperty", 0).name("ItemStats").raw(&[0; 17]);
    writer.int_cell("Damage", 10).name("None");
    writer.int_cell("Damage", 20).bool_cell("IsStackable", true).name("None");

    writer.name("None");
    writer.finish()
}

/// Payload of the two-row sample table.
pub(crate) fn sample_payload(names: &NameTable) -> Vec<u8> {
    let mut writer = PayloadWriter::new(names);
    writer.name("RowStruct").raw(&[0; 0x29 - 8]).i32(2);
    writer.name_n("Item", 1).item_row(true);
    writer.name_n("Item", 2).item_row(false);
    writer.raw(&FOOTER);
    writer.finish()
}

/// Metadata and payload of the two-row sample table.
pub(crate) fn sample() -> (Vec<u8>, Vec<u8>) {
    let names = NameTable::parse(&metadata(NAMES, 0)).unwrap();
    let payload = sample_payload(&names);
    (metadata(NAMES, payload.len()), payload)
}

/// Metadata and payload of a table without rows.
pub(crate) fn empty() -> (Vec<u8>, Vec<u8>) {
    let names = NameTable::parse(&metadata(NAMES, 0)).unwrap();
    let mut writer = PayloadWriter::new(&names);
    let payload = writer.name("None").raw(&[0; 4]).raw(&FOOTER).finish();
    (metadata(NAMES, payload.len()), payload)
}
