//! Typed property values.

use crate::core::Sc4pacError;
use crate::dbpf::bytes::ByteReader;

/// Value of one exemplar property.
///
/// Single values are stored as length-1 vectors so callers handle both
/// property shapes the same way.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Sint32(Vec<i32>),
    Sint64(Vec<i64>),
    Float32(Vec<f32>),
    Bool(Vec<bool>),
    String(String),
}

impl Value {
    /// Number of elements (bytes for strings).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Uint8(v) => v.len(),
            Self::Uint16(v) => v.len(),
            Self::Uint32(v) => v.len(),
            Self::Sint32(v) => v.len(),
            Self::Sint64(v) => v.len(),
            Self::Float32(v) => v.len(),
            Self::Bool(v) => v.len(),
            Self::String(s) => s.len(),
        }
    }

    /// Whether the value holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Unsigned integer elements widened to u32. `None` for signed, float,
    /// bool and string values.
    #[must_use]
    pub fn as_u32s(&self) -> Option<Vec<u32>> {
        match self {
            Self::Uint8(v) => Some(v.iter().map(|x| u32::from(*x)).collect()),
            Self::Uint16(v) => Some(v.iter().map(|x| u32::from(*x)).collect()),
            Self::Uint32(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// First unsigned integer element.
    #[must_use]
    pub fn first_u32(&self) -> Option<u32> {
        match self {
            Self::Uint8(v) => v.first().map(|x| u32::from(*x)),
            Self::Uint16(v) => v.first().map(|x| u32::from(*x)),
            Self::Uint32(v) => v.first().copied(),
            _ => None,
        }
    }

    /// The string, for string values.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Read `count` elements of `value_type`.
    pub(crate) fn read(reader: &mut ByteReader<'_>, value_type: u16, count: usize) -> Result<Self, Sc4pacError> {
        let width = element_width(value_type)?;
        if count.saturating_mul(width) > reader.remaining() {
            return Err(Sc4pacError::decode(format!(
                "property of {count} elements of type {value_type:#04x} exceeds the {} remaining bytes",
                reader.remaining()
            )));
        }

        let value = match value_type {
            0x01 => Self::Uint8(reader.take(count)?.to_vec()),
            0x02 => Self::Uint16((0..count).map(|_| reader.u16()).collect::<Result<_, _>>()?),
            0x03 => Self::Uint32((0..count).map(|_| reader.u32()).collect::<Result<_, _>>()?),
            0x07 => Self::Sint32((0..count).map(|_| reader.i32()).collect::<Result<_, _>>()?),
            0x08 => Self::Sint64((0..count).map(|_| reader.i64()).collect::<Result<_, _>>()?),
            0x09 => Self::Float32((0..count).map(|_| reader.f32()).collect::<Result<_, _>>()?),
            0x0B => Self::Bool(reader.take(count)?.iter().map(|b| *b != 0).collect()),
            0x0C => Self::String(String::from_utf8_lossy(reader.take(count)?).into_owned()),
            other => return Err(Sc4pacError::decode(format!("unknown property value type {other:#06x}"))),
        };
        Ok(value)
    }
}

fn element_width(value_type: u16) -> Result<usize, Sc4pacError> {
    match value_type {
        0x01 | 0x0B | 0x0C => Ok(1),
        0x02 => Ok(2),
        0x03 | 0x07 | 0x09 => Ok(4),
        0x08 => Ok(8),
        other => Err(Sc4pacError::decode(format!("unknown property value type {other:#06x}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening() {
        assert_eq!(Value::Uint8(vec![1, 2]).as_u32s(), Some(vec![1, 2]));
        assert_eq!(Value::Uint16(vec![0xFFFF]).first_u32(), Some(0xFFFF));
        assert_eq!(Value::Sint32(vec![-1]).as_u32s(), None);
        assert_eq!(Value::String("abc".into()).first_u32(), None);
        assert_eq!(Value::String("abc".into()).len(), 3);
    }

    #[test]
    fn test_read_rejects_oversized_count() {
        let data = [0u8; 8];
        let mut reader = ByteReader::new(&data);
        assert!(Value::read(&mut reader, 0x03, 1_000_000).is_err());
    }

    #[test]
    fn test_read_unknown_type() {
        let data = [0u8; 8];
        let mut reader = ByteReader::new(&data);
        let err = Value::read(&mut reader, 0x05, 1).unwrap_err();
        assert!(err.to_string().contains("unknown property value type"));
    }
}
