//! Run-generation helpers built on queries, weighted draws and the RNG.

use rogue_rules::{
    ItemId, ItemTable, Pocket, PresetFlags, SpeciesId, SpeciesTable, TypeFlags,
};

use crate::query::{EvoLimit, QueryMode, QueryWorkspace};
use crate::rng::RogueRng;

/// Level ceiling used to pick starters: low enough that nothing evolves.
const STARTER_EVO_LEVEL: u8 = 2;

/// Pick up to `count` starters with no shared types between them.
///
/// Returns fewer than `count` when the table runs out of type-distinct
/// candidates.
pub fn select_starters(
    workspace: &mut QueryWorkspace,
    species: &SpeciesTable,
    rng: &mut RogueRng,
    count: usize,
) -> Vec<SpeciesId> {
    let mut query = workspace.species.begin(species);
    query
        .is_species_active()
        .is_legendary(QueryMode::Exclude)
        .transform_into_egg_species()
        .transform_into_evos(EvoLimit::new(STARTER_EVO_LEVEL, false))
        .any_active_evos(QueryMode::Include, false);

    let mut starters: Vec<SpeciesId> = Vec::with_capacity(count);
    let mut draw = workspace.weights.begin(query.candidates());
    for _ in 0..count {
        draw.calculate(|_, id| {
            let types = species.get(id).map_or(TypeFlags::NONE, |info| info.type_flags());
            let clashes = starters.iter().any(|picked| {
                *picked == id
                    || species
                        .get(*picked)
                        .is_some_and(|info| info.type_flags().intersects(types))
            });
            u32::from(!clashes)
        });
        if !draw.has_any_weights() {
            break;
        }
        if let Some(pick) = draw.select(rng.next_u16() as u32) {
            starters.push(pick);
        }
    }

    log::debug!("selected starters {starters:?}");
    starters
}

/// Pick a legendary from `pool` that has not been assigned yet.
///
/// `strong_wild` selects between the strong legendaries reserved for the
/// box encounter and the rest.
pub fn select_legendary(
    workspace: &mut QueryWorkspace,
    species: &SpeciesTable,
    rng: &mut RogueRng,
    pool: &[SpeciesId],
    taken: &[SpeciesId],
    strong_wild: bool,
) -> Option<SpeciesId> {
    let mut query = workspace.species.begin(species);
    query.reset(QueryMode::Exclude);
    for &id in pool.iter().filter(|id| species.is_enabled(**id)) {
        query.include(id);
    }
    for &id in taken {
        query.exclude(id);
    }
    let mode = if strong_wild {
        QueryMode::Include
    } else {
        QueryMode::Exclude
    };
    query.is_legendary_with_preset_flags(mode, PresetFlags::STRONG_WILD);

    let mut draw = workspace.weights.begin(query.candidates());
    draw.fill(1);
    if !draw.has_any_weights() {
        log::warn!("no legendary left to assign (strong_wild = {strong_wild})");
        return None;
    }
    draw.select(rng.next_u16() as u32)
}

/// Fill `slots` wild encounter slots with distinct species of `types`,
/// evolved to suit `max_level`. Slots stay empty once candidates run out.
pub fn randomise_wild_encounters(
    workspace: &mut QueryWorkspace,
    species: &SpeciesTable,
    rng: &mut RogueRng,
    types: TypeFlags,
    max_level: u8,
    slots: usize,
) -> Vec<Option<SpeciesId>> {
    let evo_level = max_level.saturating_sub(6.min(max_level.saturating_sub(1)));

    let mut query = workspace.species.begin(species);
    query
        .is_species_active()
        .evos_contain_type(QueryMode::Include, types)
        .is_legendary(QueryMode::Exclude)
        .transform_into_egg_species()
        .transform_into_evos(EvoLimit::new(evo_level, false))
        .is_of_type(QueryMode::Include, types);

    let mut draw = workspace.weights.begin(query.candidates());
    draw.fill(1);
    (0..slots)
        .map(|_| {
            if draw.has_any_weights() {
                draw.select_with_update(rng.next_u16() as u32)
            } else {
                None
            }
        })
        .collect()
}

/// A random non-legendary evolved to the player's level, for wild dens.
pub fn select_wild_den_species(
    workspace: &mut QueryWorkspace,
    species: &SpeciesTable,
    rng: &mut RogueRng,
    player_level: u8,
) -> Option<SpeciesId> {
    let mut query = workspace.species.begin(species);
    query
        .is_species_active()
        .is_legendary(QueryMode::Exclude)
        .transform_into_egg_species()
        .transform_into_evos(EvoLimit::new(player_level, true));

    let mut draw = workspace.weights.begin(query.candidates());
    draw.fill(1);
    if !draw.has_any_weights() {
        return None;
    }
    draw.select(rng.next_u16() as u32)
}

/// What a shop should stock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MartRequest {
    /// Restrict to one pocket.
    pub pocket: Option<Pocket>,
    /// Restrict to general-shop items.
    pub general_shop: bool,
    pub max_price: u32,
    /// Percent chance each item is stocked.
    pub chance: u8,
    pub capacity: usize,
}

impl Default for MartRequest {
    fn default() -> Self {
        Self {
            pocket: None,
            general_shop: false,
            max_price: 10_000,
            chance: 100,
            capacity: usize::MAX,
        }
    }
}

/// Build a shop inventory.
///
/// The chance filter and capacity trim each run under an RNG guard, so
/// opening a shop leaves `rng` where it was.
pub fn create_mart_contents(
    workspace: &mut QueryWorkspace,
    items: &ItemTable,
    rng: &mut RogueRng,
    request: &MartRequest,
) -> Vec<ItemId> {
    let mut query = workspace.items.begin(items);
    query
        .is_item_active()
        .is_stored_in_pocket(QueryMode::Exclude, Pocket::KeyItems)
        .in_price_range(QueryMode::Include, 1, request.max_price);
    if let Some(pocket) = request.pocket {
        query.is_stored_in_pocket(QueryMode::Include, pocket);
    }
    if request.general_shop {
        query.is_general_shop_item(QueryMode::Include);
    }

    query.filter_by_chance(QueryMode::Include, &mut rng.guard(), request.chance);
    query.trim_to_capacity(&mut rng.guard(), request.capacity);

    let stock = query.end().to_vec();
    log::debug!("mart stocked {} items", stock.len());
    stock
}
