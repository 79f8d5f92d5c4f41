//! Binary exemplar and cohort decoding.
//!
//! Exemplars are property bags describing buildings, props, lots and most
//! other game objects. Cohorts have the same layout; exemplars inherit the
//! properties of their parent cohort.
//!
//! Layout of a binary exemplar (little-endian):
//!
//! ```text
//! signature        8 bytes   "EQZB1###" (exemplar) or "CQZB1###" (cohort)
//! parent           12 bytes  type, group, instance of the parent cohort
//! property count   u32
//! per property:
//!   id             u32
//!   value type     u16       0x01 u8, 0x02 u16, 0x03 u32, 0x07 i32,
//!                            0x08 i64, 0x09 f32, 0x0B bool, 0x0C string
//!   key type       u16       0x00 single value, 0x80 array
//!   unused         u8
//!   [count]        u32       arrays only; byte length for strings
//!   values
//! ```
//!
//! Text exemplars (`EQZT1###`, `CQZT1###`) are rejected with a
//! [`Sc4pacError::Decode`] error.

pub mod lot_object;
pub mod rkt;
pub mod value;

pub use lot_object::{LotObject, LotObjectKind};
pub use rkt::ResourceKey;
pub use value::Value;

use crate::constants::PROPERTY_EXEMPLAR_TYPE;
use crate::core::{Sc4pacError, Tgi};
use crate::dbpf::bytes::ByteReader;

/// Exemplar or cohort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExemplarKind {
    Exemplar,
    Cohort,
}

/// A single property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: u32,
    pub value: Value,
}

/// A decoded exemplar or cohort.
#[derive(Debug, Clone, PartialEq)]
pub struct Exemplar {
    pub kind: ExemplarKind,
    /// Parent cohort; zero when there is none.
    pub parent: Tgi,
    /// Properties in file order.
    pub properties: Vec<Property>,
}

impl Exemplar {
    /// Decode a binary exemplar or cohort.
    ///
    /// # Errors
    ///
    /// [`Sc4pacError::Decode`] on an unknown signature, an unknown value or
    /// key type, or truncated data.
    pub fn decode(bytes: &[u8]) -> Result<Self, Sc4pacError> {
        let mut reader = ByteReader::new(bytes);
        let signature = reader.take(8)?;

        let kind = match signature {
            b"EQZB1###" => ExemplarKind::Exemplar,
            b"CQZB1###" => ExemplarKind::Cohort,
            s if s.starts_with(b"EQZT") || s.starts_with(b"CQZT") => {
                return Err(Sc4pacError::decode("text exemplars are not supported"));
            }
            s => {
                return Err(Sc4pacError::decode(format!(
                    "unknown exemplar signature {:?}",
                    String::from_utf8_lossy(s)
                )));
            }
        };

        let parent = Tgi::new(reader.u32()?, reader.u32()?, reader.u32()?);
        let count = reader.u32()?;

        let mut properties = Vec::new();
        for _ in 0..count {
            properties.push(read_property(&mut reader)?);
        }

        Ok(Self {
            kind,
            parent,
            properties,
        })
    }

    /// Value of property `id`. No parent inheritance.
    #[must_use]
    pub fn value(&self, id: u32) -> Option<&Value> {
        self.properties.iter().find(|p| p.id == id).map(|p| &p.value)
    }

    /// First unsigned value of property `id`.
    #[must_use]
    pub fn first_u32(&self, id: u32) -> Option<u32> {
        self.value(id).and_then(Value::first_u32)
    }

    /// All unsigned values of property `id`.
    #[must_use]
    pub fn u32_values(&self, id: u32) -> Option<Vec<u32>> {
        self.value(id).and_then(Value::as_u32s)
    }

    /// The `ExemplarType` property.
    #[must_use]
    pub fn exemplar_type(&self) -> Option<u32> {
        self.first_u32(PROPERTY_EXEMPLAR_TYPE)
    }

    /// Whether a parent cohort is set.
    #[must_use]
    pub const fn has_parent(&self) -> bool {
        !self.parent.is_zero()
    }
}

fn read_property(reader: &mut ByteReader<'_>) -> Result<Property, Sc4pacError> {
    let id = reader.u32()?;
    let value_type = reader.u16()?;
    let key_type = reader.u16()?;
    reader.skip(1)?;

    let count = match key_type {
        0x00 if value_type == 0x0C => {
            return Err(Sc4pacError::decode(format!("string property {id:#010x} without length")));
        }
        0x00 => 1,
        0x80 => reader.u32()? as usize,
        other => {
            return Err(Sc4pacError::decode(format!(
                "unknown key type {other:#06x} on property {id:#010x}"
            )));
        }
    };

    Ok(Property {
        id,
        value: Value::read(reader, value_type, count)?,
    })
}
