//! Bounds-checked cursor over payload and metadata buffers.

use byteorder::{ByteOrder, LittleEndian};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// Little-endian cursor over a borrowed slice.
///
/// A read that would pass the end returns [`Error::UnexpectedEof`] and leaves
/// the cursor where it was.
///
/// # Example
///
/// ```
/// use dtforge_common::BinaryReader;
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
/// let mut reader = BinaryReader::new(&data);
///
/// assert_eq!(reader.read_u32().unwrap(), 0x04030201);
/// assert_eq!(reader.read_u32().unwrap(), 0x08070605);
/// assert!(reader.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

/// Generates a `read_*` / `peek_*` pair for a little-endian primitive.
macro_rules! primitive_reads {
    ($($ty:ty => $read:ident, $peek:ident, $decode:expr;)*) => {
        $(
            #[doc = concat!("Read a little-endian `", stringify!($ty), "`.")]
            #[inline]
            pub fn $read(&mut self) -> Result<$ty> {
                let value = self.$peek()?;
                self.position += std::mem::size_of::<$ty>();
                Ok(value)
            }

            #[inline]
            pub fn $peek(&self) -> Result<$ty> {
                let bytes = self.peek_bytes(std::mem::size_of::<$ty>())?;
                Ok($decode(bytes))
            }
        )*
    };
}

impl<'a> BinaryReader<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self::new_at(data, 0)
    }

    /// Reader whose cursor starts at `position`.
    #[inline]
    pub const fn new_at(data: &'a [u8], position: usize) -> Self {
        Self { data, position }
    }

    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Bytes left between the cursor and the end of the slice.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Everything from the cursor to the end of the slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.data.len() - self.remaining()..]
    }

    /// The region walked since `start`.
    ///
    /// Cells capture their tag bytes this way once the tag has been skipped.
    #[inline]
    pub fn bytes_since(&self, start: usize) -> &'a [u8] {
        let end = self.position.min(self.data.len());
        &self.data[start.min(end)..end]
    }

    fn check(&self, needed: usize) -> Result<()> {
        if self.remaining() < needed {
            return Err(Error::UnexpectedEof {
                position: self.position,
                needed,
                available: self.remaining(),
            });
        }
        Ok(())
    }

    /// Move the cursor forward; fails without moving if that would pass the end.
    #[inline]
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.check(count)?;
        self.position += count;
        Ok(())
    }

    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        self.check(count)?;
        Ok(&self.data[self.position..self.position + count])
    }

    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    primitive_reads! {
        u8 => read_u8, peek_u8, |b: &[u8]| b[0];
        u32 => read_u32, peek_u32, LittleEndian::read_u32;
        i32 => read_i32, peek_i32, LittleEndian::read_i32;
        i64 => read_i64, peek_i64, LittleEndian::read_i64;
        f32 => read_f32, peek_f32, LittleEndian::read_f32;
    }

    /// Read a plain-old-data struct with zerocopy.
    #[inline]
    pub fn read_struct<T: FromBytes>(&mut self) -> Result<T> {
        let value = self.peek_struct()?;
        self.position += std::mem::size_of::<T>();
        Ok(value)
    }

    #[inline]
    pub fn peek_struct<T: FromBytes>(&self) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.peek_bytes(size)?;
        T::read_from_bytes(bytes).map_err(|_| Error::UnexpectedEof {
            position: self.position,
            needed: size,
            available: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_primitives() {
        let data = [
            0x01u8, 0x02, 0x03, 0x04, // u32: 0x04030201
            0xFF, 0xFF, 0xFF, 0xFF, // i32: -1
        ];
        let mut reader = BinaryReader::new(&data);

        assert_eq!(reader.read_u32().unwrap(), 0x04030201);
        assert_eq!(reader.read_i32().unwrap(), -1);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let reader = BinaryReader::new(&data);

        assert_eq!(reader.peek_i32().unwrap(), 0x04030201);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_bytes_since_captures_walked_region() {
        let data = [1, 2, 3, 4, 5, 6];
        let mut reader = BinaryReader::new_at(&data, 1);
        let start = reader.position();
        reader.skip(3).unwrap();

        assert_eq!(reader.bytes_since(start), &[2, 3, 4]);
    }

    #[test]
    fn test_eof_error() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);

        assert!(matches!(
            reader.read_u32(),
            Err(Error::UnexpectedEof { needed: 4, available: 2, .. })
        ));
        assert!(reader.skip(3).is_err());
        assert_eq!(reader.position(), 0);
    }
}
