//! Entity identifiers and the static species/item tables.

mod item;
mod species;

pub use item::*;
pub use species::*;

use serde::{Deserialize, Serialize};

/// Identifier of an entry in the species table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SpeciesId(pub u16);

impl SpeciesId {
    pub const NONE: Self = Self(0);
}

impl std::fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "species#{}", self.0)
    }
}

/// Identifier of an entry in the item table.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u16);

impl ItemId {
    pub const NONE: Self = Self(0);
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item#{}", self.0)
    }
}

/// Identifier of a quest definition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QuestId(pub u16);

impl std::fmt::Display for QuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "quest#{}", self.0)
    }
}

/// A map location, addressed by group and number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct MapId {
    pub group: u8,
    pub num: u8,
}

impl MapId {
    pub fn new(group: u8, num: u8) -> Self {
        Self { group, num }
    }

    /// Unpack the `group << 8 | num` form used in trigger parameters.
    pub fn from_packed(packed: u16) -> Self {
        Self {
            group: (packed >> 8) as u8,
            num: (packed & 0xFF) as u8,
        }
    }

    pub fn packed(&self) -> u16 {
        (self.group as u16) << 8 | self.num as u16
    }
}
