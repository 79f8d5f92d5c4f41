//! Lot configuration objects.

use serde::{Deserialize, Serialize};

use super::Exemplar;
use crate::constants::{
    EXEMPLAR_TYPE_LOT_CONFIGURATIONS, LOT_OBJECT_IID_OFFSET, PROPERTY_LOT_OBJECT_FIRST,
    PROPERTY_LOT_OBJECT_LAST,
};

/// What a lot object places on the lot. Numbering follows the game's
/// `LotConfigPropertyLotObject` type field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LotObjectKind {
    Building,
    Prop,
    Texture,
    Fence,
    Flora,
    Water,
    Land,
    Network,
    Unknown(u32),
}

// Numbering as stored by the game: 3 is a fence, 4 is flora.
impl From<u32> for LotObjectKind {
    fn from(value: u32) -> Self {
        match value {
            0 => Self::Building,
            1 => Self::Prop,
            2 => Self::Texture,
            3 => Self::Fence,
            4 => Self::Flora,
            5 => Self::Water,
            6 => Self::Land,
            7 => Self::Network,
            other => Self::Unknown(other),
        }
    }
}

/// One lot object: the raw value array of a `0x88EDC900..=0x88EDCDFF`
/// property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LotObject {
    pub kind: LotObjectKind,
    pub values: Vec<u32>,
}

impl LotObject {
    /// Build from a property's values; element 0 is the object type.
    #[must_use]
    pub fn from_values(values: Vec<u32>) -> Option<Self> {
        let kind = LotObjectKind::from(*values.first()?);
        Some(Self {
            kind,
            values,
        })
    }

    /// Instance ids the object references (elements 12 onwards). Empty when the
    /// array is too short to hold any.
    #[must_use]
    pub fn instance_ids(&self) -> &[u32] {
        self.values.get(LOT_OBJECT_IID_OFFSET..).unwrap_or(&[])
    }
}

impl Exemplar {
    /// Whether this is a lot configuration exemplar.
    #[must_use]
    pub fn is_lot_configuration(&self) -> bool {
        self.exemplar_type() == Some(EXEMPLAR_TYPE_LOT_CONFIGURATIONS)
    }

    /// Lot objects in property order. Empty unless this is a lot
    /// configuration exemplar.
    #[must_use]
    pub fn lot_objects(&self) -> Vec<LotObject> {
        if !self.is_lot_configuration() {
            return Vec::new();
        }

        self.properties
            .iter()
            .filter(|p| (PROPERTY_LOT_OBJECT_FIRST..=PROPERTY_LOT_OBJECT_LAST).contains(&p.id))
            .filter_map(|p| p.value.as_u32s())
            .filter_map(LotObject::from_values)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ExemplarBuilder;

    #[test]
    fn test_extracts_lot_objects() {
        let bytes = ExemplarBuilder::exemplar()
            .exemplar_type(0x10)
            .lot_object(0, 0, &[0xAABB_CCDD])
            .lot_object(1, 1, &[0x1, 0x2])
            .lot_object(2, 7, &[0x3])
            .uint32(0x1234_5678, 9)
            .build();
        let exemplar = Exemplar::decode(&bytes).unwrap();

        let objects = exemplar.lot_objects();
        assert_eq!(objects.len(), 3);
        assert_eq!(objects[0].kind, LotObjectKind::Building);
        assert_eq!(objects[0].instance_ids(), &[0xAABB_CCDD]);
        assert_eq!(objects[1].kind, LotObjectKind::Prop);
        assert_eq!(objects[1].instance_ids(), &[0x1, 0x2]);
        assert_eq!(objects[2].kind, LotObjectKind::Network);
    }

    #[test]
    fn test_short_object_has_no_iids() {
        let bytes = ExemplarBuilder::exemplar()
            .exemplar_type(0x10)
            .uint32_array(PROPERTY_LOT_OBJECT_FIRST, &[2, 0, 0, 0])
            .build();
        let objects = Exemplar::decode(&bytes).unwrap().lot_objects();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].kind, LotObjectKind::Texture);
        assert!(objects[0].instance_ids().is_empty());
    }

    #[test]
    fn test_non_lot_exemplar_has_no_objects() {
        let bytes = ExemplarBuilder::exemplar().exemplar_type(0x02).lot_object(0, 0, &[0x1]).build();
        assert!(Exemplar::decode(&bytes).unwrap().lot_objects().is_empty());
    }

    #[test]
    fn test_kind_numbering() {
        assert_eq!(LotObjectKind::from(3), LotObjectKind::Fence);
        assert_eq!(LotObjectKind::from(4), LotObjectKind::Flora);
        assert_eq!(LotObjectKind::from(42), LotObjectKind::Unknown(42));
    }
}
