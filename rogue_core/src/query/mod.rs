//! Candidate queries over the static tables.
//!
//! A query narrows a working set of ids drawn from one universe (species or
//! items). The set lives in a [`QueryBuffer`] that is reused between
//! content-generation events; [`QueryBuffer::begin`] hands out a
//! [`CandidateQuery`] that exclusively borrows the buffer, so a second
//! session on the same buffer cannot be opened until the first is ended or
//! dropped. Sessions over different buffers interleave freely.
//!
//! Filters always apply to the *current* set. Transforms rewrite ids in
//! place and re-establish the sorted, duplicate-free invariant.

mod items;
mod species;

pub use species::EvoLimit;

use rogue_rules::{ItemId, ItemTable, SpeciesId, SpeciesTable};
use std::fmt::Debug;

use crate::rng::{RogueRng, StreamTag};
use crate::weights::WeightBuffer;

/// Whether a filter keeps or drops the entries it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Include,
    Exclude,
}

impl QueryMode {
    /// Decide whether an entry survives a filter given whether it matched.
    pub fn keeps(self, matched: bool) -> bool {
        match self {
            QueryMode::Include => matched,
            QueryMode::Exclude => !matched,
        }
    }
}

/// A static table a query can draw ids from.
pub trait Universe {
    type Id: Copy + Ord + Debug;

    /// Every id in the table, ascending.
    fn universe_ids(&self) -> Vec<Self::Id>;

    fn contains_id(&self, id: Self::Id) -> bool;
}

impl Universe for SpeciesTable {
    type Id = SpeciesId;

    fn universe_ids(&self) -> Vec<SpeciesId> {
        self.ids().collect()
    }

    fn contains_id(&self, id: SpeciesId) -> bool {
        self.contains(id)
    }
}

impl Universe for ItemTable {
    type Id = ItemId;

    fn universe_ids(&self) -> Vec<ItemId> {
        self.ids().collect()
    }

    fn contains_id(&self, id: ItemId) -> bool {
        self.contains(id)
    }
}

/// Reusable storage for one universe's candidate set.
#[derive(Debug, Clone)]
pub struct QueryBuffer<Id> {
    ids: Vec<Id>,
}

impl<Id> Default for QueryBuffer<Id> {
    fn default() -> Self {
        Self { ids: Vec::new() }
    }
}

impl<Id: Copy + Ord + Debug> QueryBuffer<Id> {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session over `table`, starting from the full universe.
    pub fn begin<'a, U>(&'a mut self, table: &'a U) -> CandidateQuery<'a, U>
    where
        U: Universe<Id = Id>,
    {
        let mut query = CandidateQuery {
            table,
            ids: &mut self.ids,
        };
        query.reset(QueryMode::Include);
        log::debug!("query begin: {} candidates", query.len());
        query
    }
}

pub type SpeciesQueryBuffer = QueryBuffer<SpeciesId>;
pub type ItemQueryBuffer = QueryBuffer<ItemId>;

/// The buffers a content-generation step needs: one per universe plus the
/// weight table.
#[derive(Debug, Default)]
pub struct QueryWorkspace {
    pub species: SpeciesQueryBuffer,
    pub items: ItemQueryBuffer,
    pub weights: WeightBuffer,
}

impl QueryWorkspace {
    /// Create a workspace with empty buffers.
    pub fn new() -> Self {
        Self::default()
    }
}

/// An open query session. The candidate list is kept ascending and unique.
pub struct CandidateQuery<'a, U: Universe> {
    table: &'a U,
    ids: &'a mut Vec<U::Id>,
}

impl<'a, U: Universe> CandidateQuery<'a, U> {
    pub fn table(&self) -> &'a U {
        self.table
    }

    /// Refill with every id (`Include`) or clear the set (`Exclude`).
    pub fn reset(&mut self, mode: QueryMode) -> &mut Self {
        self.ids.clear();
        if mode == QueryMode::Include {
            self.ids.extend(self.table.universe_ids());
        }
        self
    }

    /// Keep or drop entries by a caller predicate given `(index, id)`.
    pub fn retain_where<F>(&mut self, mode: QueryMode, mut predicate: F) -> &mut Self
    where
        F: FnMut(usize, U::Id) -> bool,
    {
        let mut index = 0;
        self.ids.retain(|&id| {
            let keep = mode.keeps(predicate(index, id));
            index += 1;
            keep
        });
        self
    }

    /// Add a single id to the set. Ids outside the universe are ignored.
    pub fn include(&mut self, id: U::Id) -> &mut Self {
        if self.table.contains_id(id) {
            if let Err(pos) = self.ids.binary_search(&id) {
                self.ids.insert(pos, id);
            }
        }
        self
    }

    pub fn exclude(&mut self, id: U::Id) -> &mut Self {
        if let Ok(pos) = self.ids.binary_search(&id) {
            self.ids.remove(pos);
        }
        self
    }

    /// Add every universe id in `first..=last`.
    pub fn include_range(&mut self, first: U::Id, last: U::Id) -> &mut Self {
        let extra: Vec<U::Id> = self
            .table
            .universe_ids()
            .into_iter()
            .filter(|id| (first..=last).contains(id))
            .collect();
        self.ids.extend(extra);
        self.normalize();
        self
    }

    /// Drop every id in `first..=last`.
    pub fn exclude_range(&mut self, first: U::Id, last: U::Id) -> &mut Self {
        self.ids.retain(|id| !(first..=last).contains(id));
        self
    }

    /// Match each entry with `chance` percent probability, one draw per
    /// entry in order.
    ///
    /// Draws come from `rng`; wrap it in a guard when the caller's stream must
    /// not move. A chance of 100 or more matches everything and draws nothing.
    pub fn filter_by_chance(&mut self, mode: QueryMode, rng: &mut RogueRng, chance: u8) -> &mut Self {
        if chance >= 100 {
            return self.retain_where(mode, |_, _| true);
        }
        self.retain_where(mode, |_, _| rng.range(100, StreamTag::Items) + 1 <= chance as u16)
    }

    /// Remove and return the entry at `index`.
    pub fn pop_index(&mut self, index: usize) -> Option<U::Id> {
        (index < self.ids.len()).then(|| self.ids.remove(index))
    }

    /// Randomly drop entries until at most `capacity` remain.
    pub fn trim_to_capacity(&mut self, rng: &mut RogueRng, capacity: usize) -> &mut Self {
        while self.ids.len() > capacity {
            let index = rng.next_u16() as usize % self.ids.len();
            self.ids.remove(index);
        }
        self
    }

    /// Number of candidates left.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: U::Id) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn candidates(&self) -> &[U::Id] {
        self.ids.as_slice()
    }

    /// Close the session, leaving the result readable from the buffer.
    pub fn end(self) -> &'a [U::Id] {
        log::debug!("query end: {} candidates", self.ids.len());
        let ids: &'a Vec<U::Id> = self.ids;
        ids.as_slice()
    }

    /// Replace every id with the output of `map`, then re-sort and dedupe.
    pub(crate) fn transform<F>(&mut self, mut map: F) -> &mut Self
    where
        F: FnMut(U::Id) -> Vec<U::Id>,
    {
        let rewritten: Vec<U::Id> = self.ids.iter().flat_map(|&id| map(id)).collect();
        *self.ids = rewritten;
        self.normalize();
        self
    }

    fn normalize(&mut self) {
        self.ids.sort_unstable();
        self.ids.dedup();
    }
}
