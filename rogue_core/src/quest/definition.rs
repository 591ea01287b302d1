//! Immutable quest definitions.

use rogue_rules::{
    Comparison, ConfigRange, ConfigToggle, GameFlag, ItemId, QuestId, SaveState,
};
use serde::{Deserialize, Serialize};

use super::condition::Condition;
use super::reward::Reward;
use crate::events::TriggerMask;

/// A category or behaviour flag on a quest definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestFlag {
    MainQuest,
    /// Repeatable at a higher reward tier.
    Challenge,
    MonMastery,
    UnlockedByDefault,
    /// Activates as soon as it is unlocked.
    ActiveInHub,
    ActiveInRun,
    /// Excluded from the "all main quests done" check.
    FinalQuest,
}

impl QuestFlag {
    const ALL: [QuestFlag; 7] = [
        QuestFlag::MainQuest,
        QuestFlag::Challenge,
        QuestFlag::MonMastery,
        QuestFlag::UnlockedByDefault,
        QuestFlag::ActiveInHub,
        QuestFlag::ActiveInRun,
        QuestFlag::FinalQuest,
    ];

    pub fn mask(self) -> QuestFlags {
        QuestFlags(1 << self as u16)
    }
}

/// Bitmask over [`QuestFlag`]. Serialized as a list of flag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<QuestFlag>", into = "Vec<QuestFlag>")]
pub struct QuestFlags(pub u16);

impl QuestFlags {
    pub const NONE: Self = Self(0);

    pub fn has(self, flag: QuestFlag) -> bool {
        self.intersects(flag.mask())
    }

    pub fn intersects(self, other: QuestFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn iter(self) -> impl Iterator<Item = QuestFlag> {
        QuestFlag::ALL.into_iter().filter(move |flag| self.has(*flag))
    }
}

impl From<QuestFlag> for QuestFlags {
    fn from(flag: QuestFlag) -> Self {
        flag.mask()
    }
}

impl From<Vec<QuestFlag>> for QuestFlags {
    fn from(flags: Vec<QuestFlag>) -> Self {
        flags.into_iter().fold(Self::NONE, |acc, flag| acc | flag)
    }
}

impl From<QuestFlags> for Vec<QuestFlag> {
    fn from(flags: QuestFlags) -> Self {
        flags.iter().collect()
    }
}

impl std::ops::BitOr for QuestFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<QuestFlag> for QuestFlags {
    type Output = Self;

    fn bitor(self, rhs: QuestFlag) -> Self {
        self | rhs.mask()
    }
}

/// Outcome selected by a trigger once its condition is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QuestStatus {
    /// Keep evaluating the quest's remaining triggers.
    #[default]
    Pending,
    Success,
    Fail,
    /// Stop evaluating this quest for the current event.
    Break,
}

fn success() -> QuestStatus {
    QuestStatus::Success
}

/// An event-scoped check attached to a quest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub events: TriggerMask,
    pub condition: Condition,
    #[serde(default = "success")]
    pub on_pass: QuestStatus,
    #[serde(default)]
    pub on_fail: QuestStatus,
}

impl Trigger {
    pub fn new(events: impl Into<TriggerMask>, condition: Condition) -> Self {
        Self {
            events: events.into(),
            condition,
            on_pass: QuestStatus::Success,
            on_fail: QuestStatus::Pending,
        }
    }

    pub fn on_pass(mut self, status: QuestStatus) -> Self {
        self.on_pass = status;
        self
    }

    pub fn on_fail(mut self, status: QuestStatus) -> Self {
        self.on_fail = status;
        self
    }
}

/// A condition an active quest must keep satisfying, checked by
/// `QuestEngine::check_requirements`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Requirement {
    Item {
        item: ItemId,
        comparison: Comparison,
        count: u32,
    },
    Flag {
        flag: GameFlag,
        state: bool,
    },
    ConfigToggle {
        toggle: ConfigToggle,
        state: bool,
    },
    ConfigRange {
        range: ConfigRange,
        comparison: Comparison,
        value: u32,
    },
}

impl Requirement {
    pub fn passes(&self, save: &SaveState) -> bool {
        match *self {
            Requirement::Item {
                item,
                comparison,
                count,
            } => comparison.check(save.bag.count(item), count),
            Requirement::Flag { flag, state } => save.flags.get(flag) == state,
            Requirement::ConfigToggle { toggle, state } => save.config.toggle(toggle) == state,
            Requirement::ConfigRange {
                range,
                comparison,
                value,
            } => comparison.check(save.config.range(range), value),
        }
    }
}

/// A quest entry in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestDef {
    pub id: QuestId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub flags: QuestFlags,
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    #[serde(default)]
    pub rewards: Vec<Reward>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
}

impl QuestDef {
    pub fn new(id: QuestId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            flags: QuestFlags::NONE,
            triggers: Vec::new(),
            rewards: Vec::new(),
            requirements: Vec::new(),
        }
    }

    pub fn with_flags(mut self, flags: impl Into<QuestFlags>) -> Self {
        self.flags = self.flags | flags.into();
        self
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn with_reward(mut self, reward: impl Into<Reward>) -> Self {
        self.rewards.push(reward.into());
        self
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    /// Union of the events every trigger listens for.
    pub fn trigger_mask(&self) -> TriggerMask {
        self.triggers
            .iter()
            .fold(TriggerMask::NONE, |mask, trigger| mask | trigger.events)
    }

    pub fn has_flag(&self, flag: QuestFlag) -> bool {
        self.flags.has(flag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TriggerEvent;
    use rogue_rules::RulesConfig;

    #[test]
    fn test_flags_round_trip_as_names() {
        let flags = QuestFlags::from(QuestFlag::Challenge) | QuestFlag::ActiveInRun;
        let json = serde_json::to_string(&flags).unwrap();
        assert_eq!(json, r#"["Challenge","ActiveInRun"]"#);
        assert_eq!(serde_json::from_str::<QuestFlags>(&json).unwrap(), flags);
    }

    #[test]
    fn test_trigger_mask_is_union() {
        let quest = QuestDef::new(QuestId(1), "Test")
            .with_trigger(Trigger::new(TriggerEvent::BattleWon, Condition::Always))
            .with_trigger(Trigger::new(TriggerEvent::MapWarp, Condition::Always));
        let mask = quest.trigger_mask();
        assert!(mask.intersects(TriggerEvent::BattleWon.mask()));
        assert!(mask.intersects(TriggerEvent::MapWarp.mask()));
        assert!(!mask.intersects(TriggerEvent::ExitRun.mask()));
    }

    #[test]
    fn test_requirements() {
        let mut save = SaveState::new_game(&RulesConfig::default());
        save.bag.add(ItemId(5), 3).unwrap();

        let enough = Requirement::Item {
            item: ItemId(5),
            comparison: Comparison::GreaterThanEqual,
            count: 3,
        };
        assert!(enough.passes(&save));

        let flag = Requirement::Flag {
            flag: GameFlag::GauntletMode,
            state: true,
        };
        assert!(!flag.passes(&save));
        save.flags.set(GameFlag::GauntletMode, true);
        assert!(flag.passes(&save));

        let range = Requirement::ConfigRange {
            range: ConfigRange::LegendaryCount,
            comparison: Comparison::LessThan,
            value: 2,
        };
        assert!(range.passes(&save));
    }
}
