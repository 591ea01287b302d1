//! Weighted random selection over a candidate list.
//!
//! A [`WeightBuffer`] holds one weight per candidate. It is opened against a
//! candidate slice (normally the result of a query session) and the weight
//! table is sized to match, so the two can never disagree in length while a
//! draw session is open. A weight of zero keeps the candidate in the list but
//! makes it unselectable.

use std::fmt::Debug;

/// Reusable storage for a weight table.
#[derive(Debug, Clone, Default)]
pub struct WeightBuffer {
    weights: Vec<u32>,
}

impl WeightBuffer {
    /// Create an empty weight buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a draw session over `candidates` with every weight at zero.
    pub fn begin<'a, Id: Copy + Debug>(&'a mut self, candidates: &'a [Id]) -> WeightedDraw<'a, Id> {
        self.weights.clear();
        self.weights.resize(candidates.len(), 0);
        WeightedDraw {
            candidates,
            weights: &mut self.weights,
        }
    }
}

/// An open weight table paired with its candidates.
pub struct WeightedDraw<'a, Id> {
    candidates: &'a [Id],
    weights: &'a mut Vec<u32>,
}

impl<Id: Copy + Debug> WeightedDraw<'_, Id> {
    /// Give every candidate the same weight.
    pub fn fill(&mut self, weight: u32) -> &mut Self {
        self.weights.iter_mut().for_each(|w| *w = weight);
        self
    }

    /// Compute each weight from `(index, id)`. Returning 0 excludes the entry.
    pub fn calculate<F>(&mut self, mut weight_fn: F) -> &mut Self
    where
        F: FnMut(usize, Id) -> u32,
    {
        for (index, (weight, &id)) in self.weights.iter_mut().zip(self.candidates).enumerate() {
            *weight = weight_fn(index, id);
        }
        self
    }

    /// Overwrite one weight. Out-of-range indices are ignored.
    pub fn set_weight(&mut self, index: usize, weight: u32) {
        if let Some(slot) = self.weights.get_mut(index) {
            *slot = weight;
        }
    }

    pub fn weight_of(&self, index: usize) -> u32 {
        self.weights.get(index).copied().unwrap_or(0)
    }

    pub fn candidates(&self) -> &[Id] {
        self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Sum of all weights.
    pub fn total_weight(&self) -> u64 {
        self.weights.iter().map(|&w| w as u64).sum()
    }

    /// Check before sampling: a table with no weight cannot be drawn from.
    pub fn has_any_weights(&self) -> bool {
        self.weights.iter().any(|&w| w != 0)
    }

    fn select_index(&self, value: u32) -> Option<usize> {
        if self.candidates.is_empty() {
            return None;
        }

        let total = self.total_weight();
        if total == 0 {
            debug_assert!(false, "sampled a weight table with zero total");
            log::error!(
                "weighted draw over {} candidates with zero total weight, falling back to first",
                self.candidates.len()
            );
            return Some(0);
        }

        let target = value as u64 % total;
        let mut upper = 0u64;
        for (index, &weight) in self.weights.iter().enumerate() {
            upper += weight as u64;
            if target < upper {
                return Some(index);
            }
        }
        Some(0)
    }

    /// Pick the candidate whose cumulative interval contains
    /// `value % total_weight`.
    pub fn select(&self, value: u32) -> Option<Id> {
        self.select_index(value).map(|index| self.candidates[index])
    }

    /// As [`select`](Self::select), then zero the winner's weight so repeated
    /// calls sample without replacement.
    pub fn select_with_update(&mut self, value: u32) -> Option<Id> {
        let index = self.select_index(value)?;
        self.weights[index] = 0;
        Some(self.candidates[index])
    }

    pub fn end(self) {}
}
