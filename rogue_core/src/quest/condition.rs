//! The closed set of trigger conditions.

use rogue_rules::{
    Comparison, ConfigRange, ConfigToggle, GameFlag, MapId, MonType, PartyMember, QuestId,
    RoomKind, SaveState, SpeciesId, SpeciesTable,
};
use serde::{Deserialize, Serialize};

use super::catalog::QuestCatalog;
use super::definition::QuestFlag;
use super::gate;

/// Read-only view a condition is evaluated against.
pub struct ConditionContext<'a> {
    pub save: &'a SaveState,
    pub species: &'a SpeciesTable,
    pub catalog: &'a QuestCatalog,
}

/// A trigger condition and its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
    Always,
    DifficultyGreaterThan {
        threshold: u8,
    },
    DifficultyLessThan {
        threshold: u8,
    },
    StandardRunActive,
    /// Every listed quest has been completed at least once.
    CompletedAllQuests {
        quests: Vec<QuestId>,
    },
    CompletedAnyQuest {
        quests: Vec<QuestId>,
    },
    PartyContainsType {
        mon_type: MonType,
    },
    PartyOnlyContainsType {
        mon_type: MonType,
    },
    PartyContainsLegendary,
    PartyOnlyLegendaries,
    PartyOnlyShinies,
    PartyContainsPartner,
    /// Party holds a member of any listed evolution line.
    PartyContainsAnySpecies {
        species: Vec<SpeciesId>,
    },
    PartyContainsAllSpecies {
        species: Vec<SpeciesId>,
    },
    InMap {
        map: MapId,
    },
    /// `toggle` is the only trainer set enabled.
    OnlyTrainerSet {
        toggle: ConfigToggle,
    },
    DexRegion {
        region: u16,
    },
    DexVariant {
        variant: u16,
    },
    /// Every main quest apart from the final ones has been collected.
    CanUnlockFinalQuest,
    AllHubAreasBuilt,
    FinalQuestEffects,
    CaughtCountGreaterThan {
        count: u32,
    },
    InRoomKind {
        kinds: Vec<RoomKind>,
    },
    SpentOnMapGreaterThan {
        amount: u32,
    },
    MoneyGreaterThan {
        amount: u32,
    },
    RandomTradeWasUsed,
    RandomTradeWasActive,
    RandomTradeWasFullParty,
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

impl Condition {
    pub fn evaluate(&self, ctx: &ConditionContext<'_>) -> bool {
        let save = ctx.save;
        let members = save.party.members();

        match self {
            Condition::Always => true,
            Condition::DifficultyGreaterThan { threshold } => save.progress.difficulty > *threshold,
            Condition::DifficultyLessThan { threshold } => save.progress.difficulty < *threshold,
            Condition::StandardRunActive => save.progress.standard_run,
            Condition::CompletedAllQuests { quests } => quests
                .iter()
                .all(|quest| save.quests.get(*quest).has_completed()),
            Condition::CompletedAnyQuest { quests } => quests
                .iter()
                .any(|quest| save.quests.get(*quest).has_completed()),
            Condition::PartyContainsType { mon_type } => members
                .iter()
                .any(|member| ctx.species.has_type(member.species, *mon_type)),
            Condition::PartyOnlyContainsType { mon_type } => members
                .iter()
                .all(|member| ctx.species.has_type(member.species, *mon_type)),
            Condition::PartyContainsLegendary => members
                .iter()
                .any(|member| ctx.species.is_legendary(member.species)),
            Condition::PartyOnlyLegendaries => members
                .iter()
                .all(|member| ctx.species.is_legendary(member.species)),
            Condition::PartyOnlyShinies => members.iter().all(|member| member.shiny),
            Condition::PartyContainsPartner => save.party.contains_partner(),
            Condition::PartyContainsAnySpecies { species } => species
                .iter()
                .any(|target| party_has_line(members, ctx.species, *target)),
            Condition::PartyContainsAllSpecies { species } => species
                .iter()
                .all(|target| party_has_line(members, ctx.species, *target)),
            Condition::InMap { map } => save.progress.location == *map,
            Condition::OnlyTrainerSet { toggle } => ConfigToggle::TRAINER_SETS
                .iter()
                .all(|set| save.config.toggle(*set) == (set == toggle)),
            Condition::DexRegion { region } => save.progress.dex_region == *region,
            Condition::DexVariant { variant } => save.progress.dex_variant == *variant,
            Condition::CanUnlockFinalQuest => ctx
                .catalog
                .iter()
                .filter(|def| def.has_flag(QuestFlag::MainQuest) && !def.has_flag(QuestFlag::FinalQuest))
                .all(|def| gate::has_collected_rewards(def, save)),
            Condition::AllHubAreasBuilt => save.has_built_all_areas(),
            Condition::FinalQuestEffects => save.progress.final_quest_effects,
            Condition::CaughtCountGreaterThan { count } => save.dex.caught_count() as u32 > *count,
            Condition::InRoomKind { kinds } => save
                .progress
                .room_kind
                .is_some_and(|room| kinds.contains(&room)),
            Condition::SpentOnMapGreaterThan { amount } => save.progress.spent_on_map > *amount,
            Condition::MoneyGreaterThan { amount } => save.money() > *amount,
            Condition::RandomTradeWasUsed => {
                save.flags.get(GameFlag::RandomTradeWasActive)
                    && save.flags.get(GameFlag::RandomTradeDisabled)
            }
            Condition::RandomTradeWasActive => save.flags.get(GameFlag::RandomTradeWasActive),
            Condition::RandomTradeWasFullParty => save.flags.get(GameFlag::RandomTradeWasFullParty),
            Condition::Flag { flag, state } => save.flags.get(*flag) == *state,
            Condition::ConfigToggle { toggle, state } => save.config.toggle(*toggle) == *state,
            Condition::ConfigRange {
                range,
                comparison,
                value,
            } => comparison.check(save.config.range(*range), *value),
        }
    }

    /// Quests this condition reads the state of.
    pub fn referenced_quests(&self) -> &[QuestId] {
        match self {
            Condition::CompletedAllQuests { quests } | Condition::CompletedAnyQuest { quests } => quests,
            _ => &[],
        }
    }
}

fn party_has_line(members: &[PartyMember], species: &SpeciesTable, target: SpeciesId) -> bool {
    let base = species.egg_species(target);
    members
        .iter()
        .any(|member| species.egg_species(member.species) == base)
}
