//! Species table definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ItemId, SpeciesId};
use crate::config::RulesError;
use crate::mechanics::{MonType, PresetFlags, TypeFlags};

fn enabled_by_default() -> bool {
    true
}

/// How an evolution is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionMethod {
    Level,
    Item(ItemId),
    Friendship,
    Trade,
}

/// A single edge in the evolution graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evolution {
    pub target: SpeciesId,
    /// Level gate. Non-level methods carry the level they are treated as.
    pub level: u8,
    #[serde(default = "Evolution::default_method")]
    pub method: EvolutionMethod,
}

impl Evolution {
    fn default_method() -> EvolutionMethod {
        EvolutionMethod::Level
    }
}

/// One row of the species table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesInfo {
    pub id: SpeciesId,
    pub name: String,
    pub primary_type: MonType,
    #[serde(default)]
    pub secondary_type: Option<MonType>,
    #[serde(default)]
    pub is_legendary: bool,
    /// Disabled species never appear in generated content.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub preset_flags: PresetFlags,
    /// Root of the evolution line. `None` means this species is its own base.
    #[serde(default)]
    pub base_species: Option<SpeciesId>,
    #[serde(default)]
    pub evolutions: Vec<Evolution>,
}

impl SpeciesInfo {
    /// Create a single-typed, enabled, non-legendary species.
    pub fn new(id: SpeciesId, name: impl Into<String>, primary_type: MonType) -> Self {
        Self {
            id,
            name: name.into(),
            primary_type,
            secondary_type: None,
            is_legendary: false,
            enabled: true,
            preset_flags: PresetFlags::NONE,
            base_species: None,
            evolutions: Vec::new(),
        }
    }

    pub fn with_secondary_type(mut self, ty: MonType) -> Self {
        self.secondary_type = Some(ty);
        self
    }

    pub fn legendary(mut self) -> Self {
        self.is_legendary = true;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_presets(mut self, flags: PresetFlags) -> Self {
        self.preset_flags = flags;
        self
    }

    pub fn with_base(mut self, base: SpeciesId) -> Self {
        self.base_species = Some(base);
        self
    }

    pub fn evolves_to(mut self, target: SpeciesId, level: u8) -> Self {
        self.evolutions.push(Evolution {
            target,
            level,
            method: EvolutionMethod::Level,
        });
        self
    }

    /// Both types as a bitmask.
    pub fn type_flags(&self) -> TypeFlags {
        TypeFlags::from_types(std::iter::once(self.primary_type).chain(self.secondary_type))
    }

    pub fn has_type(&self, ty: MonType) -> bool {
        self.primary_type == ty || self.secondary_type == Some(ty)
    }
}

/// The static creature universe, keyed and iterated by ascending id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpeciesTable {
    entries: BTreeMap<SpeciesId, SpeciesInfo>,
}

impl SpeciesTable {
    /// Build a table, rejecting duplicate ids and dangling references.
    pub fn from_entries(entries: impl IntoIterator<Item = SpeciesInfo>) -> Result<Self, RulesError> {
        let mut table = Self::default();
        for info in entries {
            let id = info.id;
            if table.entries.insert(id, info).is_some() {
                return Err(RulesError::DuplicateSpecies(id));
            }
        }
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<(), RulesError> {
        for info in self.entries.values() {
            for evo in &info.evolutions {
                if !self.entries.contains_key(&evo.target) {
                    return Err(RulesError::UnknownSpecies {
                        referenced_by: info.id,
                        missing: evo.target,
                    });
                }
            }
            if let Some(base) = info.base_species {
                if !self.entries.contains_key(&base) {
                    return Err(RulesError::UnknownSpecies {
                        referenced_by: info.id,
                        missing: base,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: SpeciesId) -> Option<&SpeciesInfo> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: SpeciesId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SpeciesInfo> {
        self.entries.values()
    }

    pub fn is_enabled(&self, id: SpeciesId) -> bool {
        self.get(id).is_some_and(|info| info.enabled)
    }

    pub fn is_legendary(&self, id: SpeciesId) -> bool {
        self.get(id).is_some_and(|info| info.is_legendary)
    }

    pub fn has_type(&self, id: SpeciesId, ty: MonType) -> bool {
        self.get(id).is_some_and(|info| info.has_type(ty))
    }

    /// Base form of the evolution line (the species itself for unknown ids).
    pub fn egg_species(&self, id: SpeciesId) -> SpeciesId {
        self.get(id).and_then(|info| info.base_species).unwrap_or(id)
    }

    /// Evolution edges leading to enabled species.
    pub fn active_evolutions(&self, id: SpeciesId) -> impl Iterator<Item = &Evolution> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|info| info.evolutions.iter())
            .filter(move |evo| self.is_enabled(evo.target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn starter_line() -> Vec<SpeciesInfo> {
        vec![
            SpeciesInfo::new(SpeciesId(1), "Sprout", MonType::Grass).evolves_to(SpeciesId(2), 16),
            SpeciesInfo::new(SpeciesId(2), "Shrub", MonType::Grass)
                .with_secondary_type(MonType::Poison)
                .with_base(SpeciesId(1))
                .evolves_to(SpeciesId(3), 32),
            SpeciesInfo::new(SpeciesId(3), "Grove", MonType::Grass)
                .with_base(SpeciesId(1))
                .disabled(),
        ]
    }

    #[test]
    fn test_table_lookup() {
        let table = SpeciesTable::from_entries(starter_line()).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.has_type(SpeciesId(2), MonType::Poison));
        assert!(!table.is_enabled(SpeciesId(3)));
        assert_eq!(table.egg_species(SpeciesId(2)), SpeciesId(1));
        assert_eq!(table.egg_species(SpeciesId(1)), SpeciesId(1));
    }

    #[test]
    fn test_active_evolutions_skip_disabled_targets() {
        let table = SpeciesTable::from_entries(starter_line()).unwrap();
        assert_eq!(table.active_evolutions(SpeciesId(1)).count(), 1);
        assert_eq!(table.active_evolutions(SpeciesId(2)).count(), 0);
    }

    #[test]
    fn test_duplicate_species_rejected() {
        let mut entries = starter_line();
        entries.push(SpeciesInfo::new(SpeciesId(1), "Again", MonType::Fire));
        assert!(matches!(
            SpeciesTable::from_entries(entries),
            Err(RulesError::DuplicateSpecies(SpeciesId(1)))
        ));
    }

    #[test]
    fn test_dangling_evolution_rejected() {
        let entries =
            vec![SpeciesInfo::new(SpeciesId(1), "Lonely", MonType::Ice).evolves_to(SpeciesId(9), 20)];
        assert!(matches!(
            SpeciesTable::from_entries(entries),
            Err(RulesError::UnknownSpecies { .. })
        ));
    }

    #[test]
    fn test_type_flags_cover_both_types() {
        let info = SpeciesInfo::new(SpeciesId(5), "Steam", MonType::Fire)
            .with_secondary_type(MonType::Water);
        let flags = info.type_flags();
        assert!(flags.contains(MonType::Fire));
        assert!(flags.contains(MonType::Water));
    }
}
