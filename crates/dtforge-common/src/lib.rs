//! Common utilities for dtforge.
//!
//! This crate provides the low-level pieces shared by the container crates:
//!
//! - [`BinaryReader`] - Bounds-checked little-endian reading from byte slices
//! - [`string`] - Engine string codec (length-prefixed, single-byte or UTF-16)
//! - [`search`] - Byte pattern search used when patching containers

mod error;
mod reader;

pub mod search;
pub mod string;

pub use error::{Error, Result};
pub use reader::BinaryReader;
pub use string::EngineString;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
