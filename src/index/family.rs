//! Family policies.
//!
//! Lots can reference a *family* id instead of a concrete building or prop
//! instance; the game then picks any member at runtime. Which records form
//! families is decided by a [`FamilyPolicy`] injected into
//! [`FileIndex::build_families`](super::FileIndex::build_families).

use super::IndexEntry;
use crate::constants::{PROPERTY_BUILDING_PROP_FAMILY, TYPE_EXEMPLAR};
use crate::exemplar::Exemplar;

/// Decides which records join which families.
pub trait FamilyPolicy: Send + Sync {
    /// Whether the record needs to be read to determine its families.
    fn is_family_eligible(&self, entry: &IndexEntry) -> bool;

    /// Family ids of a decoded eligible record.
    fn family_ids(&self, exemplar: &Exemplar) -> Vec<u32>;
}

/// Exemplars join every family listed in their building/prop family property
/// (`0x27812870`).
#[derive(Debug, Clone, Copy, Default)]
pub struct PropFamilyPolicy;

impl FamilyPolicy for PropFamilyPolicy {
    fn is_family_eligible(&self, entry: &IndexEntry) -> bool {
        entry.tgi().type_id == TYPE_EXEMPLAR
    }

    fn family_ids(&self, exemplar: &Exemplar) -> Vec<u32> {
        exemplar.u32_values(PROPERTY_BUILDING_PROP_FAMILY).unwrap_or_default()
    }
}

/// No families at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFamilies;

impl FamilyPolicy for NoFamilies {
    fn is_family_eligible(&self, _entry: &IndexEntry) -> bool {
        false
    }

    fn family_ids(&self, _exemplar: &Exemplar) -> Vec<u32> {
        Vec::new()
    }
}
