//! Rules configuration, static table loading and the crate error type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{ItemId, ItemInfo, ItemTable, SpeciesId, SpeciesInfo, SpeciesTable};

/// Errors raised while loading tables, config or saves.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse save JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate species id {0}")]
    DuplicateSpecies(SpeciesId),

    #[error("duplicate item id {0}")]
    DuplicateItem(ItemId),

    #[error("{referenced_by} references unknown species {missing}")]
    UnknownSpecies {
        referenced_by: SpeciesId,
        missing: SpeciesId,
    },

    #[error("save version {found} is newer than supported version {supported}")]
    UnsupportedSaveVersion { found: u16, supported: u16 },

    #[error("save is missing its version field")]
    MissingSaveVersion,
}

/// Capacities and limits applied to the save containers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Party slots before granted creatures go to storage.
    pub party_capacity: usize,

    /// Distinct item stacks the bag can hold.
    pub bag_slots: usize,

    /// Maximum quantity in a single stack.
    pub max_stack: u16,

    /// Money is clamped to this value.
    pub max_money: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            party_capacity: 6,
            bag_slots: 30,
            max_stack: 999,
            max_money: 999_999,
        }
    }
}

impl RulesConfig {
    /// Parse a config from TOML. Missing keys fall back to defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, RulesError> {
        Ok(toml::from_str(source)?)
    }
}

#[derive(Debug, Deserialize)]
struct TableSource {
    #[serde(default)]
    species: Vec<SpeciesInfo>,
    #[serde(default)]
    items: Vec<ItemInfo>,
}

/// Both static universes.
#[derive(Debug, Clone, Default)]
pub struct RogueTables {
    pub species: SpeciesTable,
    pub items: ItemTable,
}

impl RogueTables {
    /// Load `[[species]]` and `[[items]]` arrays from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, RulesError> {
        let parsed: TableSource = toml::from_str(source)?;
        let tables = Self {
            species: SpeciesTable::from_entries(parsed.species)?,
            items: ItemTable::from_entries(parsed.items)?,
        };
        log::debug!(
            "loaded {} species and {} items",
            tables.species.len(),
            tables.items.len()
        );
        Ok(tables)
    }
}
