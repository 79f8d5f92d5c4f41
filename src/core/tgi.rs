//! Type/Group/Instance identifiers.
//!
//! A [`Tgi`] is the universal key of a record inside a DBPF container. A
//! [`TgiQuery`] is a partially known key, used when a reference only carries an
//! instance id (lot objects) or when the group is unknown at the call site.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::Sc4pacError;

/// A (Type, Group, Instance) triple.
///
/// Equality and hashing are numeric; the hexadecimal [`Display`](fmt::Display)
/// form is for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Tgi {
    /// Type id, e.g. `0x6534284A` for exemplars.
    #[serde(rename = "type")]
    pub type_id: u32,
    /// Group id.
    pub group: u32,
    /// Instance id.
    pub instance: u32,
}

impl Tgi {
    /// Create a new TGI.
    #[must_use]
    pub const fn new(type_id: u32, group: u32, instance: u32) -> Self {
        Self {
            type_id,
            group,
            instance,
        }
    }

    /// Whether all three components are zero. Exemplars use the zero TGI to
    /// say "no parent cohort".
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.type_id == 0 && self.group == 0 && self.instance == 0
    }
}

impl fmt::Display for Tgi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", hex(self.type_id), hex(self.group), hex(self.instance))
    }
}

impl FromStr for Tgi {
    type Err = Sc4pacError;

    /// Parses `T-G-I`, `T,G,I` or `T G I` where each field is hexadecimal with
    /// an optional `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s
            .split(|c: char| c == '-' || c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .collect();

        let [t, g, i] = fields.as_slice() else {
            return Err(Sc4pacError::InvalidTgi {
                input: s.to_string(),
            });
        };

        Ok(Self::new(parse_hex(t, s)?, parse_hex(g, s)?, parse_hex(i, s)?))
    }
}

/// Parses one hexadecimal u32 field, with or without a `0x` prefix.
pub fn parse_hex_u32(field: &str) -> Option<u32> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    u32::from_str_radix(digits, 16).ok()
}

fn parse_hex(field: &str, input: &str) -> Result<u32, Sc4pacError> {
    parse_hex_u32(field).ok_or_else(|| Sc4pacError::InvalidTgi {
        input: input.to_string(),
    })
}

/// Formats a number the way SimCity 4 modding tools do: `0x` followed by eight
/// lowercase hex digits.
#[must_use]
pub fn hex(value: u32) -> String {
    format!("0x{value:08x}")
}

/// A partially known TGI. `None` fields match anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TgiQuery {
    /// Required type id, if known.
    pub type_id: Option<u32>,
    /// Required group id, if known.
    pub group: Option<u32>,
    /// Required instance id, if known.
    pub instance: Option<u32>,
}

impl TgiQuery {
    /// Query by instance only.
    #[must_use]
    pub const fn instance(instance: u32) -> Self {
        Self {
            type_id: None,
            group: None,
            instance: Some(instance),
        }
    }

    /// Query by type and instance, for call sites that don't know the group.
    #[must_use]
    pub const fn type_instance(type_id: u32, instance: u32) -> Self {
        Self {
            type_id: Some(type_id),
            group: None,
            instance: Some(instance),
        }
    }

    /// Query by type only.
    #[must_use]
    pub const fn type_id(type_id: u32) -> Self {
        Self {
            type_id: Some(type_id),
            group: None,
            instance: None,
        }
    }

    /// Returns the exact TGI when every field is known.
    #[must_use]
    pub const fn as_exact(&self) -> Option<Tgi> {
        match (self.type_id, self.group, self.instance) {
            (Some(t), Some(g), Some(i)) => Some(Tgi::new(t, g, i)),
            _ => None,
        }
    }

    /// Whether `tgi` satisfies every known field.
    #[must_use]
    pub fn matches(&self, tgi: &Tgi) -> bool {
        self.type_id.is_none_or(|t| t == tgi.type_id)
            && self.group.is_none_or(|g| g == tgi.group)
            && self.instance.is_none_or(|i| i == tgi.instance)
    }
}

impl From<Tgi> for TgiQuery {
    fn from(tgi: Tgi) -> Self {
        Self {
            type_id: Some(tgi.type_id),
            group: Some(tgi.group),
            instance: Some(tgi.instance),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_hex() {
        let tgi = Tgi::new(0x6534_284A, 0xA8FB_D372, 0x1);
        assert_eq!(tgi.to_string(), "0x6534284a-0xa8fbd372-0x00000001");
    }

    #[test]
    fn test_parse_accepts_separators_and_prefixes() {
        let expected = Tgi::new(0x6534_284A, 0xA8FB_D372, 0xAABB_CCDD);
        assert_eq!("0x6534284a-0xa8fbd372-0xaabbccdd".parse::<Tgi>().unwrap(), expected);
        assert_eq!("6534284A,A8FBD372,AABBCCDD".parse::<Tgi>().unwrap(), expected);
        assert_eq!("0x6534284a 0xa8fbd372 0xAABBCCDD".parse::<Tgi>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        assert!("0x1-0x2".parse::<Tgi>().is_err());
        assert!("0x1-0x2-0x3-0x4".parse::<Tgi>().is_err());
        assert!("zz-0x2-0x3".parse::<Tgi>().is_err());
    }

    #[test]
    fn test_zero_tgi() {
        assert!(Tgi::default().is_zero());
        assert!(!Tgi::new(0, 0, 1).is_zero());
    }

    #[test]
    fn test_query_matching() {
        let tgi = Tgi::new(1, 2, 3);
        assert!(TgiQuery::instance(3).matches(&tgi));
        assert!(TgiQuery::type_instance(1, 3).matches(&tgi));
        assert!(!TgiQuery::type_instance(2, 3).matches(&tgi));
        assert!(TgiQuery::default().matches(&tgi));
        assert_eq!(TgiQuery::from(tgi).as_exact(), Some(tgi));
        assert_eq!(TgiQuery::instance(3).as_exact(), None);
    }
}
