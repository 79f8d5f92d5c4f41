//! Little-endian cursor over a byte slice.

use crate::core::Sc4pacError;

/// A forward-only reader that fails with [`Sc4pacError::Decode`] instead of
/// panicking when the input runs out.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at offset 0.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
        }
    }

    /// Current offset.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Borrow the next `len` bytes.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], Sc4pacError> {
        let end = self.pos.checked_add(len).filter(|end| *end <= self.data.len()).ok_or_else(|| {
            Sc4pacError::decode(format!(
                "unexpected end of data: wanted {len} bytes at offset {}, {} left",
                self.pos,
                self.remaining()
            ))
        })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Skip `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<(), Sc4pacError> {
        self.take(len).map(|_| ())
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], Sc4pacError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.take(N)?);
        Ok(buf)
    }

    pub fn u8(&mut self) -> Result<u8, Sc4pacError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn u16(&mut self) -> Result<u16, Sc4pacError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, Sc4pacError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    pub fn i32(&mut self) -> Result<i32, Sc4pacError> {
        Ok(i32::from_le_bytes(self.array()?))
    }

    pub fn i64(&mut self) -> Result<i64, Sc4pacError> {
        Ok(i64::from_le_bytes(self.array()?))
    }

    pub fn f32(&mut self) -> Result<f32, Sc4pacError> {
        Ok(f32::from_le_bytes(self.array()?))
    }
}

/// Read a little-endian u32 at a fixed offset.
pub fn u32_at(data: &[u8], offset: usize) -> Option<u32> {
    let bytes = data.get(offset..offset.checked_add(4)?)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_little_endian() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0xFF];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.u32().unwrap(), 0x0403_0201);
        assert_eq!(reader.u16().unwrap(), 0x0605);
        assert_eq!(reader.u8().unwrap(), 0xFF);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_truncation_is_an_error() {
        let data = [0x01, 0x02];
        let mut reader = ByteReader::new(&data);
        let err = reader.u32().unwrap_err();
        assert!(err.to_string().contains("unexpected end of data"));
        // Failed reads don't advance.
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_u32_at() {
        let data = [0, 0, 0x78, 0x56, 0x34, 0x12];
        assert_eq!(u32_at(&data, 2), Some(0x1234_5678));
        assert_eq!(u32_at(&data, 3), None);
        assert_eq!(u32_at(&data, usize::MAX), None);
    }
}
