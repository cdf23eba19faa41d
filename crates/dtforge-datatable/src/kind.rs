//! Property kinds understood by the codec.

use std::fmt;

/// The type of a property, as named by its type tag in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum PropertyKind {
    Array,
    Bool,
    Byte,
    Enum,
    Float,
    Int,
    UInt32,
    Name,
    Object,
    SoftObject,
    Str,
    Text,
    Struct,
}

impl PropertyKind {
    /// Every supported kind.
    pub const ALL: [Self; 13] = [
        Self::Array,
        Self::Bool,
        Self::Byte,
        Self::Enum,
        Self::Float,
        Self::Int,
        Self::UInt32,
        Self::Name,
        Self::Object,
        Self::SoftObject,
        Self::Str,
        Self::Text,
        Self::Struct,
    ];

    /// Parse a type tag such as `"IntProperty"`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_tag() == tag)
    }

    /// The type tag written in the payload.
    pub const fn as_tag(&self) -> &'static str {
        match self {
            Self::Array => "ArrayProperty",
            Self::Bool => "BoolProperty",
            Self::Byte => "ByteProperty",
            Self::Enum => "EnumProperty",
            Self::Float => "FloatProperty",
            Self::Int => "IntProperty",
            Self::UInt32 => "UInt32Property",
            Self::Name => "NameProperty",
            Self::Object => "ObjectProperty",
            Self::SoftObject => "SoftObjectProperty",
            Self::Str => "StrProperty",
            Self::Text => "TextProperty",
            Self::Struct => "StructProperty",
        }
    }

    /// Whether values of this kind are name-table strings.
    pub const fn is_name_backed(&self) -> bool {
        matches!(self, Self::Enum | Self::Name | Self::SoftObject)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for kind in PropertyKind::ALL {
            assert_eq!(PropertyKind::from_tag(kind.as_tag()), Some(kind));
        }
        assert_eq!(PropertyKind::from_tag("MapProperty"), None);
        assert_eq!(PropertyKind::Int.to_string(), "IntProperty");
    }
}
