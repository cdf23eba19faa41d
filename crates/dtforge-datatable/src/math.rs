//! Built-in math structs with a fixed binary layout.
//!
//! These are stored as bare float tuples instead of a tagged property stream.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// A struct stored as a fixed run of `f32`s.
pub trait MathStruct: FromBytes + IntoBytes + Immutable + Copy {
    /// Struct name in the name table.
    const NAME: &'static str;
    /// Field names in wire order.
    const FIELDS: &'static [&'static str];

    /// Named field values in wire order.
    fn fields(&self) -> Vec<(&'static str, f32)> {
        let values = self
            .as_bytes()
            .chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]));
        Self::FIELDS.iter().copied().zip(values).collect()
    }
}

macro_rules! math_struct {
    ($(#[$meta:meta])* $name:ident, $tag:literal, [$($field:ident),+]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, FromBytes, IntoBytes, Immutable, KnownLayout)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize))]
        #[repr(C)]
        pub struct $name {
            $(pub $field: f32,)+
        }

        impl MathStruct for $name {
            const NAME: &'static str = $tag;
            const FIELDS: &'static [&'static str] = &[$(stringify!($field)),+];
        }
    };
}

math_struct!(
    /// Three-component vector.
    Vector, "Vector", [x, y, z]
);
math_struct!(Vector2D, "Vector2D", [x, y]);
math_struct!(Vector4, "Vector4", [x, y, z, w]);
math_struct!(
    /// Rotation in degrees.
    Rotator, "Rotator", [pitch, yaw, roll]
);
math_struct!(
    /// Color with alpha stored first.
    LinearColor, "LinearColor", [a, r, g, b]
);
