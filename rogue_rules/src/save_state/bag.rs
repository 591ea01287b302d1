//! Slot-bounded item bag.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::ItemId;

/// Why a bag operation was rejected. The bag is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BagError {
    #[error("no room for {count}x {item}")]
    Full { item: ItemId, count: u16 },

    #[error("cannot remove {requested}x {item}, only {held} held")]
    NotEnough {
        item: ItemId,
        requested: u16,
        held: u32,
    },
}

/// A stack of one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub item: ItemId,
    pub quantity: u16,
}

/// The player's bag. Each stack occupies a slot; stacks cap at `max_stack`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bag {
    stacks: Vec<ItemStack>,
    slots: usize,
    max_stack: u16,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new(30, 999)
    }
}

impl Bag {
    /// Create an empty bag. A `max_stack` of 0 is raised to 1.
    pub fn new(slots: usize, max_stack: u16) -> Self {
        Self {
            stacks: Vec::new(),
            slots,
            max_stack: max_stack.max(1),
        }
    }

    /// Total quantity of `item` across stacks.
    pub fn count(&self, item: ItemId) -> u32 {
        self.stacks
            .iter()
            .filter(|stack| stack.item == item)
            .map(|stack| stack.quantity as u32)
            .sum()
    }

    pub fn stacks(&self) -> &[ItemStack] {
        &self.stacks
    }

    pub fn free_slots(&self) -> usize {
        self.slots.saturating_sub(self.stacks.len())
    }

    /// How many of `item` could still be added.
    pub fn room_for(&self, item: ItemId) -> u32 {
        let in_existing: u32 = self
            .stacks
            .iter()
            .filter(|stack| stack.item == item)
            .map(|stack| self.max_stack.saturating_sub(stack.quantity) as u32)
            .sum();
        in_existing + self.free_slots() as u32 * self.max_stack as u32
    }

    /// Add `count` of `item`, topping up existing stacks first.
    pub fn add(&mut self, item: ItemId, count: u16) -> Result<(), BagError> {
        if (count as u32) > self.room_for(item) {
            return Err(BagError::Full { item, count });
        }

        let mut remaining = count;
        for stack in self.stacks.iter_mut().filter(|stack| stack.item == item) {
            let moved = remaining.min(self.max_stack.saturating_sub(stack.quantity));
            stack.quantity += moved;
            remaining -= moved;
        }
        while remaining > 0 {
            let moved = remaining.min(self.max_stack);
            self.stacks.push(ItemStack {
                item,
                quantity: moved,
            });
            remaining -= moved;
        }
        Ok(())
    }

    /// Remove `count` of `item`, draining the most recent stacks first.
    pub fn remove(&mut self, item: ItemId, count: u16) -> Result<(), BagError> {
        let held = self.count(item);
        if (count as u32) > held {
            return Err(BagError::NotEnough {
                item,
                requested: count,
                held,
            });
        }

        let mut remaining = count;
        for stack in self.stacks.iter_mut().rev().filter(|stack| stack.item == item) {
            let taken = remaining.min(stack.quantity);
            stack.quantity -= taken;
            remaining -= taken;
            if remaining == 0 {
                break;
            }
        }
        self.stacks.retain(|stack| stack.quantity > 0);
        Ok(())
    }
}
