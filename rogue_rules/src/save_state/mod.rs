//! Save state - the typed, versioned block persisted between sessions.

mod bag;
mod party;
mod quest_block;

pub use bag::*;
pub use party::*;
pub use quest_block::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

use crate::config::{RulesConfig, RulesError};
use crate::entities::{ItemId, MapId, SpeciesId};
use crate::mechanics::{ConfigRange, ConfigToggle, GameFlag, HubArea, RoomKind, Tier};

/// Version written by this build.
pub const CURRENT_SAVE_VERSION: u16 = 2;

/// Unique identifier of a save slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaveId(pub Uuid);

impl SaveId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SaveId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SaveId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of raised [`GameFlag`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveFlags(BTreeSet<GameFlag>);

impl SaveFlags {
    pub fn get(&self, flag: GameFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn set(&mut self, flag: GameFlag, value: bool) {
        if value {
            self.0.insert(flag);
        } else {
            self.0.remove(&flag);
        }
    }
}

/// Player-chosen run options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub toggles: BTreeMap<ConfigToggle, bool>,
    #[serde(default)]
    pub ranges: BTreeMap<ConfigRange, u32>,
}

impl RunConfig {
    pub fn toggle(&self, toggle: ConfigToggle) -> bool {
        self.toggles.get(&toggle).copied().unwrap_or(false)
    }

    pub fn set_toggle(&mut self, toggle: ConfigToggle, value: bool) {
        self.toggles.insert(toggle, value);
    }

    pub fn range(&self, range: ConfigRange) -> u32 {
        self.ranges.get(&range).copied().unwrap_or(0)
    }

    pub fn set_range(&mut self, range: ConfigRange, value: u32) {
        self.ranges.insert(range, value);
    }
}

/// Progress through the current run and campaign.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunProgress {
    /// Rung of the difficulty ladder reached in the current run.
    pub difficulty: u8,
    /// Tier used for quest completion and repeat gating.
    pub reward_tier: Tier,
    pub room_kind: Option<RoomKind>,
    pub location: MapId,
    pub spent_on_map: u32,
    pub dex_region: u16,
    pub dex_variant: u16,
    pub final_quest_effects: bool,
    pub standard_run: bool,
}

/// Money held, clamped to a cap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    amount: u32,
    cap: u32,
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(999_999)
    }
}

impl Wallet {
    pub fn new(cap: u32) -> Self {
        Self { amount: 0, cap }
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    /// Add money, clamping at the cap. Returns how much was actually added.
    pub fn add(&mut self, amount: u32) -> u32 {
        let before = self.amount;
        self.amount = self.amount.saturating_add(amount).min(self.cap);
        self.amount - before
    }

    pub fn remove(&mut self, amount: u32) {
        self.amount = self.amount.saturating_sub(amount);
    }
}

/// Caught creatures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Pokedex {
    caught: BTreeSet<SpeciesId>,
    caught_shiny: BTreeSet<SpeciesId>,
}

impl Pokedex {
    pub fn mark_caught(&mut self, species: SpeciesId, shiny: bool) {
        self.caught.insert(species);
        if shiny {
            self.caught_shiny.insert(species);
        }
    }

    pub fn is_caught(&self, species: SpeciesId) -> bool {
        self.caught.contains(&species)
    }

    pub fn caught_count(&self) -> usize {
        self.caught.len()
    }
}

/// The complete persistent state of one save slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveState {
    pub version: u16,
    pub save_id: SaveId,
    #[serde(default)]
    pub flags: SaveFlags,
    #[serde(default)]
    pub progress: RunProgress,
    #[serde(default)]
    pub config: RunConfig,
    #[serde(default)]
    pub wallet: Wallet,
    #[serde(default)]
    pub bag: Bag,
    #[serde(default)]
    pub party: Party,
    #[serde(default)]
    pub quests: QuestBlock,

    // Added in v2.
    #[serde(default)]
    pub dex: Pokedex,
    #[serde(default)]
    pub hub_built: BTreeSet<HubArea>,
    #[serde(default)]
    pub shop_unlocks: BTreeSet<ItemId>,
}

impl SaveState {
    /// Create an empty save sized by `config`.
    pub fn new_game(config: &RulesConfig) -> Self {
        Self {
            version: CURRENT_SAVE_VERSION,
            save_id: SaveId::new(),
            flags: SaveFlags::default(),
            progress: RunProgress::default(),
            config: RunConfig::default(),
            wallet: Wallet::new(config.max_money),
            bag: Bag::new(config.bag_slots, config.max_stack),
            party: Party::new(config.party_capacity),
            quests: QuestBlock::default(),
            dex: Pokedex::default(),
            hub_built: BTreeSet::new(),
            shop_unlocks: BTreeSet::new(),
        }
    }

    /// Wipe all data but keep the slot identity.
    pub fn clear(&mut self, config: &RulesConfig) {
        let save_id = self.save_id;
        *self = Self::new_game(config);
        self.save_id = save_id;
    }

    pub fn money(&self) -> u32 {
        self.wallet.amount()
    }

    pub fn has_built_all_areas(&self) -> bool {
        HubArea::ALL.iter().all(|area| self.hub_built.contains(area))
    }

    /// Give a creature to the player and register it as caught.
    pub fn give_creature(&mut self, member: PartyMember) -> Placement {
        self.dex.mark_caught(member.species, member.shiny);
        self.party.receive(member)
    }

    pub fn to_json(&self) -> Result<String, RulesError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Load a save, upgrading older versions and rejecting newer ones.
    pub fn from_json(source: &str) -> Result<Self, RulesError> {
        let value: serde_json::Value = serde_json::from_str(source)?;
        let found = value
            .get("version")
            .and_then(serde_json::Value::as_u64)
            .ok_or(RulesError::MissingSaveVersion)? as u16;

        if found > CURRENT_SAVE_VERSION {
            return Err(RulesError::UnsupportedSaveVersion {
                found,
                supported: CURRENT_SAVE_VERSION,
            });
        }

        let mut save: SaveState = serde_json::from_value(value)?;
        if found < CURRENT_SAVE_VERSION {
            log::info!(
                "upgrading save {} from v{} to v{}",
                save.save_id,
                found,
                CURRENT_SAVE_VERSION
            );
            save.version = CURRENT_SAVE_VERSION;
        }
        Ok(save)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::QuestId;

    #[test]
    fn test_new_game_uses_config_capacities() {
        let config = RulesConfig {
            party_capacity: 2,
            bag_slots: 1,
            max_stack: 5,
            max_money: 100,
        };
        let mut save = SaveState::new_game(&config);
        assert_eq!(save.version, CURRENT_SAVE_VERSION);
        assert!(save.bag.add(ItemId(1), 6).is_err());
        assert_eq!(save.wallet.add(150), 100);
    }

    #[test]
    fn test_json_round_trip() {
        let mut save = SaveState::new_game(&RulesConfig::default());
        save.flags.set(GameFlag::ChallengesUnlocked, true);
        save.config.set_toggle(ConfigToggle::TrainerKanto, true);
        save.quests
            .get_mut(QuestId(3))
            .set(QuestStateFlags::UNLOCKED, true);
        save.give_creature(PartyMember::new(SpeciesId(7)).shiny());

        let json = save.to_json().unwrap();
        let loaded = SaveState::from_json(&json).unwrap();

        assert_eq!(loaded.save_id, save.save_id);
        assert!(loaded.flags.get(GameFlag::ChallengesUnlocked));
        assert!(loaded.config.toggle(ConfigToggle::TrainerKanto));
        assert!(loaded.quests.get(QuestId(3)).is_unlocked());
        assert!(loaded.dex.is_caught(SpeciesId(7)));
        assert_eq!(loaded.party.len(), 1);
    }

    #[test]
    fn test_v1_save_is_upgraded() {
        let save = SaveState::new_game(&RulesConfig::default());
        let mut value = serde_json::to_value(&save).unwrap();
        let object = value.as_object_mut().unwrap();
        object.insert("version".into(), serde_json::json!(1));
        object.remove("dex");
        object.remove("hub_built");
        object.remove("shop_unlocks");

        let loaded = SaveState::from_json(&value.to_string()).unwrap();
        assert_eq!(loaded.version, CURRENT_SAVE_VERSION);
        assert_eq!(loaded.dex.caught_count(), 0);
        assert!(loaded.shop_unlocks.is_empty());
    }

    #[test]
    fn test_newer_save_rejected() {
        let save = SaveState::new_game(&RulesConfig::default());
        let mut value = serde_json::to_value(&save).unwrap();
        value["version"] = serde_json::json!(CURRENT_SAVE_VERSION + 1);
        assert!(matches!(
            SaveState::from_json(&value.to_string()),
            Err(RulesError::UnsupportedSaveVersion { .. })
        ));
    }

    #[test]
    fn test_missing_version_rejected() {
        assert!(matches!(
            SaveState::from_json("{}"),
            Err(RulesError::MissingSaveVersion)
        ));
    }

    #[test]
    fn test_clear_keeps_identity() {
        let config = RulesConfig::default();
        let mut save = SaveState::new_game(&config);
        let id = save.save_id;
        save.wallet.add(500);
        save.clear(&config);
        assert_eq!(save.save_id, id);
        assert_eq!(save.money(), 0);
    }

    #[test]
    fn test_all_areas_built() {
        let mut save = SaveState::new_game(&RulesConfig::default());
        assert!(!save.has_built_all_areas());
        save.hub_built.extend(HubArea::ALL);
        assert!(save.has_built_all_areas());
    }
}
