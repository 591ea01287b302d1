//! Species-specific filters and transforms.

use rogue_rules::{Evolution, EvolutionMethod, PresetFlags, SpeciesId, SpeciesTable, TypeFlags};

use super::{CandidateQuery, QueryMode};

/// Which evolution edges a transform may follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvoLimit {
    pub max_level: u8,
    /// Allow edges gated at exactly `max_level`.
    pub allow_equal: bool,
    /// Follow item-triggered edges as well as level ones.
    pub include_item_evos: bool,
}

impl EvoLimit {
    pub fn new(max_level: u8, allow_equal: bool) -> Self {
        Self {
            max_level,
            allow_equal,
            include_item_evos: false,
        }
    }

    pub fn with_item_evos(mut self) -> Self {
        self.include_item_evos = true;
        self
    }

    fn allows(&self, evo: &Evolution) -> bool {
        if matches!(evo.method, EvolutionMethod::Item(_)) && !self.include_item_evos {
            return false;
        }
        if self.allow_equal {
            evo.level <= self.max_level
        } else {
            evo.level < self.max_level
        }
    }
}

fn reachable_types(table: &SpeciesTable, id: SpeciesId, visited: &mut Vec<SpeciesId>) -> TypeFlags {
    if visited.contains(&id) {
        return TypeFlags::NONE;
    }
    visited.push(id);
    let own = table.get(id).map_or(TypeFlags::NONE, |info| info.type_flags());
    let targets: Vec<SpeciesId> = table.active_evolutions(id).map(|evo| evo.target).collect();
    targets
        .into_iter()
        .fold(own, |flags, target| flags | reachable_types(table, target, visited))
}

fn furthest_forms(
    table: &SpeciesTable,
    id: SpeciesId,
    limit: EvoLimit,
    visited: &mut Vec<SpeciesId>,
) -> Vec<SpeciesId> {
    visited.push(id);
    let next: Vec<SpeciesId> = table
        .active_evolutions(id)
        .filter(|evo| limit.allows(evo) && !visited.contains(&evo.target))
        .map(|evo| evo.target)
        .collect();

    if next.is_empty() {
        return vec![id];
    }
    next.into_iter()
        .flat_map(|target| furthest_forms(table, target, limit, visited))
        .collect()
}

impl<'a> CandidateQuery<'a, SpeciesTable> {
    /// Drop disabled species.
    pub fn is_species_active(&mut self) -> &mut Self {
        let table = self.table;
        self.retain_where(QueryMode::Include, |_, id| table.is_enabled(id))
    }

    pub fn is_legendary(&mut self, mode: QueryMode) -> &mut Self {
        let table = self.table;
        self.retain_where(mode, |_, id| table.is_legendary(id))
    }

    /// Match legendaries carrying all of `flags`.
    pub fn is_legendary_with_preset_flags(&mut self, mode: QueryMode, flags: PresetFlags) -> &mut Self {
        let table = self.table;
        self.retain_where(mode, |_, id| {
            table
                .get(id)
                .is_some_and(|info| info.is_legendary && info.preset_flags.contains(flags))
        })
    }

    /// Match species with at least one type in `types`.
    pub fn is_of_type(&mut self, mode: QueryMode, types: TypeFlags) -> &mut Self {
        let table = self.table;
        self.retain_where(mode, |_, id| {
            table
                .get(id)
                .is_some_and(|info| info.type_flags().intersects(types))
        })
    }

    /// Match species where the species itself or any enabled evolution
    /// downstream has a type in `types`.
    pub fn evos_contain_type(&mut self, mode: QueryMode, types: TypeFlags) -> &mut Self {
        let table = self.table;
        self.retain_where(mode, |_, id| {
            reachable_types(table, id, &mut Vec::new()).intersects(types)
        })
    }

    /// Replace each species with the base of its evolution line.
    pub fn transform_into_egg_species(&mut self) -> &mut Self {
        let table = self.table;
        self.transform(|id| vec![table.egg_species(id)])
    }

    /// Replace each species with the furthest forms reachable under `limit`.
    /// Species that cannot evolve within the limit stay as they are.
    pub fn transform_into_evos(&mut self, limit: EvoLimit) -> &mut Self {
        let table = self.table;
        self.transform(|id| furthest_forms(table, id, limit, &mut Vec::new()))
    }

    /// Match species with at least one enabled evolution.
    pub fn any_active_evos(&mut self, mode: QueryMode, include_item_evos: bool) -> &mut Self {
        let table = self.table;
        self.retain_where(mode, |_, id| {
            table.active_evolutions(id).any(|evo| {
                include_item_evos || !matches!(evo.method, EvolutionMethod::Item(_))
            })
        })
    }
}
