//! Shared vocabularies: creature types, pockets, item tags, tiers and the
//! config/flag keys read by quest conditions.

use serde::{Deserialize, Serialize};

/// Elemental creature types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MonType {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    /// Placeholder type; never rolled.
    Mystery,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
}

impl MonType {
    pub const ALL: [MonType; 19] = [
        MonType::Normal,
        MonType::Fighting,
        MonType::Flying,
        MonType::Poison,
        MonType::Ground,
        MonType::Rock,
        MonType::Bug,
        MonType::Ghost,
        MonType::Steel,
        MonType::Mystery,
        MonType::Fire,
        MonType::Water,
        MonType::Grass,
        MonType::Electric,
        MonType::Psychic,
        MonType::Ice,
        MonType::Dragon,
        MonType::Dark,
        MonType::Fairy,
    ];

    /// Single-bit mask for this type.
    pub fn flag(self) -> TypeFlags {
        TypeFlags(1 << self as u32)
    }
}

/// Bitmask over [`MonType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeFlags(pub u32);

impl TypeFlags {
    pub const NONE: Self = Self(0);

    pub fn from_types(types: impl IntoIterator<Item = MonType>) -> Self {
        types
            .into_iter()
            .fold(Self::NONE, |acc, ty| acc | ty.flag())
    }

    pub fn intersects(self, other: TypeFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub fn contains(self, ty: MonType) -> bool {
        self.intersects(ty.flag())
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for TypeFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Bag pocket an item is stored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pocket {
    Items,
    Medicine,
    Balls,
    TmHm,
    Berries,
    HeldItems,
    Charms,
    KeyItems,
}

/// Boolean category tags on an item entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemTags(pub u16);

impl ItemTags {
    pub const NONE: Self = Self(0);
    pub const MEDICINE: Self = Self(1 << 0);
    pub const HELD_ITEM: Self = Self(1 << 1);
    pub const RARE_HELD_ITEM: Self = Self(1 << 2);
    pub const GENERAL_SHOP: Self = Self(1 << 4);
    /// Can be aggregated into a single popup during a reward sequence.
    pub const STACKABLE_REWARD: Self = Self(1 << 5);

    pub fn contains(self, other: ItemTags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for ItemTags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Preset flags attached to species entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetFlags(pub u8);

impl PresetFlags {
    pub const NONE: Self = Self(0);
    /// Legendary strong enough to guard the box encounter.
    pub const STRONG_WILD: Self = Self(1 << 2);

    pub fn contains(self, other: PresetFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

/// Position on the run's difficulty ladder, used to gate repeatable quests.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tier(pub u8);

impl Tier {
    pub const EASY: Self = Self(1);
    pub const MEDIUM: Self = Self(2);
    pub const HARD: Self = Self(3);
    pub const BRUTAL: Self = Self(4);
}

/// Comparison applied by range-style requirements and conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanEqual,
    LessThanEqual,
}

impl Comparison {
    /// Compare `value` against `target` using this operation.
    pub fn check(self, value: u32, target: u32) -> bool {
        match self {
            Comparison::Equal => value == target,
            Comparison::NotEqual => value != target,
            Comparison::GreaterThan => value > target,
            Comparison::LessThan => value < target,
            Comparison::GreaterThanEqual => value >= target,
            Comparison::LessThanEqual => value <= target,
        }
    }
}

/// Boolean options the player configures for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigToggle {
    TrainerRogue,
    TrainerKanto,
    TrainerJohto,
    TrainerHoenn,
    OverLvl,
    EvGain,
    ExpAll,
    DisableChallengeQuests,
    DisableMainQuests,
}

impl ConfigToggle {
    /// The trainer-set toggles checked by "only these trainers" conditions.
    pub const TRAINER_SETS: [ConfigToggle; 4] = [
        ConfigToggle::TrainerRogue,
        ConfigToggle::TrainerKanto,
        ConfigToggle::TrainerJohto,
        ConfigToggle::TrainerHoenn,
    ];
}

/// Numeric options the player configures for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ConfigRange {
    LegendaryCount,
    BattleFormat,
    ItemRarity,
}

/// Named save flags. Anything a reward can set or a condition can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameFlag {
    ChallengesUnlocked,
    MasteriesUnlocked,
    RunActive,
    GauntletMode,
    RandomTradeWasActive,
    RandomTradeDisabled,
    RandomTradeWasFullParty,
    SafariUnlocked,
    DaycareUnlocked,
    BerryPlotsUnlocked,
}

/// Room kinds along an adventure path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Boss,
    Route,
    RestStop,
    Legendary,
    MiniBoss,
    WildDen,
    GameShow,
    DarkDeal,
    Lab,
}

/// Buildable areas of the hub town.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum HubArea {
    Labs,
    Adventure,
    Town,
    Wilds,
    Market,
    Homes,
}

impl HubArea {
    pub const ALL: [HubArea; 6] = [
        HubArea::Labs,
        HubArea::Adventure,
        HubArea::Town,
        HubArea::Wilds,
        HubArea::Market,
        HubArea::Homes,
    ];
}
