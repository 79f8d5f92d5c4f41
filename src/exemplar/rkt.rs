//! Resource Key Type (RKT) properties.
//!
//! RKT properties point an exemplar at the model it is drawn with. Two shapes
//! occur in the wild:
//!
//! - three values: a bare `T, G, I`
//! - repeated 8-value blocks (RKT4 and friends, one block per zoom/rotation
//!   state), with the `T, G, I` at offsets 5, 6 and 7 of each block

use crate::constants::{RKT_BLOCK_LEN, RKT_BLOCK_TGI_OFFSET, RKT_PROPERTIES};
use crate::core::Tgi;

use super::Exemplar;

/// A decoded RKT property value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKey {
    /// A single `T, G, I`.
    Bare(Tgi),
    /// One TGI per complete 8-value block.
    Blocks(Vec<Tgi>),
}

impl ResourceKey {
    /// Decode an RKT value array. `None` for lengths that are neither 3 nor
    /// at least one full block.
    #[must_use]
    pub fn decode(values: &[u32]) -> Option<Self> {
        match values.len() {
            3 => Some(Self::Bare(Tgi::new(values[0], values[1], values[2]))),
            len if len >= RKT_BLOCK_LEN => Some(Self::Blocks(
                values
                    .chunks_exact(RKT_BLOCK_LEN)
                    .map(|block| {
                        let t = &block[RKT_BLOCK_TGI_OFFSET..];
                        Tgi::new(t[0], t[1], t[2])
                    })
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Every TGI the key references.
    #[must_use]
    pub fn tgis(&self) -> &[Tgi] {
        match self {
            Self::Bare(tgi) => std::slice::from_ref(tgi),
            Self::Blocks(tgis) => tgis,
        }
    }
}

impl Exemplar {
    /// Decoded RKT properties, in the order of [`RKT_PROPERTIES`].
    #[must_use]
    pub fn resource_keys(&self) -> Vec<ResourceKey> {
        RKT_PROPERTIES
            .iter()
            .filter_map(|id| self.u32_values(*id))
            .filter_map(|values| ResourceKey::decode(&values))
            .collect()
    }
}
