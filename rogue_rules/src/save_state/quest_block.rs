//! Per-quest persistent state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entities::QuestId;
use crate::mechanics::Tier;

/// State bits stored for every quest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestStateFlags(pub u8);

impl QuestStateFlags {
    pub const NONE: Self = Self(0);
    pub const UNLOCKED: Self = Self(1 << 0);
    pub const ACTIVE: Self = Self(1 << 1);
    pub const HAS_COMPLETE: Self = Self(1 << 2);
    pub const PENDING_REWARDS: Self = Self(1 << 3);
    pub const PINNED: Self = Self(1 << 4);
    pub const NEW_UNLOCK: Self = Self(1 << 5);

    pub fn contains(self, flag: QuestStateFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn set(&mut self, flag: QuestStateFlags, value: bool) {
        if value {
            self.0 |= flag.0;
        } else {
            self.0 &= !flag.0;
        }
    }
}

/// Mutable state of one quest within a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestState {
    pub flags: QuestStateFlags,
    /// Tier at the most recent completion.
    #[serde(default)]
    pub highest_complete: Option<Tier>,
    /// Tier whose rewards were last collected.
    #[serde(default)]
    pub highest_collected: Option<Tier>,
}

impl QuestState {
    pub fn has(&self, flag: QuestStateFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn set(&mut self, flag: QuestStateFlags, value: bool) {
        self.flags.set(flag, value);
    }

    pub fn is_unlocked(&self) -> bool {
        self.has(QuestStateFlags::UNLOCKED)
    }

    pub fn is_active(&self) -> bool {
        self.has(QuestStateFlags::ACTIVE)
    }

    pub fn has_completed(&self) -> bool {
        self.has(QuestStateFlags::HAS_COMPLETE)
    }

    pub fn has_pending_rewards(&self) -> bool {
        self.has(QuestStateFlags::PENDING_REWARDS)
    }

    /// Record a completion at `tier`: clears active, sets has-completed and
    /// pending-rewards in one step.
    pub fn mark_completed(&mut self, tier: Tier) {
        if !self.has_completed() {
            self.highest_collected = None;
        }
        self.highest_complete = Some(tier);
        self.set(QuestStateFlags::ACTIVE, false);
        self.set(QuestStateFlags::PENDING_REWARDS, true);
        self.set(QuestStateFlags::HAS_COMPLETE, true);
    }

    /// Clear pending rewards and record the collected tier.
    pub fn mark_collected(&mut self) {
        self.set(QuestStateFlags::PENDING_REWARDS, false);
        self.highest_collected = self.highest_complete;
    }
}

/// Quest states keyed by id. Quests absent from the map are in the default
/// (locked) state, so saves written before a quest existed load cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestBlock {
    states: BTreeMap<QuestId, QuestState>,
}

impl QuestBlock {
    pub fn get(&self, id: QuestId) -> QuestState {
        self.states.get(&id).copied().unwrap_or_default()
    }

    pub fn get_mut(&mut self, id: QuestId) -> &mut QuestState {
        self.states.entry(id).or_default()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestId, &QuestState)> {
        self.states.iter().map(|(id, state)| (*id, state))
    }
}
