//! The quest state machine.
//!
//! Definitions live in a [`QuestCatalog`]; per-save state lives in the
//! save's `QuestBlock`. The engine holds no per-save data apart from an open
//! [`RewardSequence`], so one engine can serve any number of saves.

use rogue_rules::{GameFlag, ItemId, QuestId, QuestStateFlags, RogueTables, SaveState, Tier};

use super::catalog::QuestCatalog;
use super::condition::ConditionContext;
use super::definition::{QuestDef, QuestFlag, QuestFlags, QuestStatus};
use super::gate;
use super::reward::{self, GrantLedger, RewardKind};
use super::sequence::RewardSequence;
use crate::error::EngineError;
use crate::events::TriggerMask;
use crate::popups::{Popup, PopupSink};

/// Mutable collaborators handed to state-changing operations.
pub struct QuestEnv<'a> {
    pub save: &'a mut SaveState,
    pub tables: &'a RogueTables,
    pub popups: &'a mut dyn PopupSink,
}

impl<'a> QuestEnv<'a> {
    pub fn new(
        save: &'a mut SaveState,
        tables: &'a RogueTables,
        popups: &'a mut dyn PopupSink,
    ) -> Self {
        Self {
            save,
            tables,
            popups,
        }
    }
}

/// Quests whose state changed while handling one event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerReport {
    pub completed: Vec<QuestId>,
    pub failed: Vec<QuestId>,
}

/// Active and inactive quest counts for a category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuestCounts {
    pub active: u16,
    pub inactive: u16,
}

#[derive(Debug, Default)]
pub struct QuestEngine {
    catalog: QuestCatalog,
    sequence: Option<RewardSequence>,
}

impl QuestEngine {
    pub fn new(catalog: QuestCatalog) -> Self {
        Self {
            catalog,
            sequence: None,
        }
    }

    pub fn catalog(&self) -> &QuestCatalog {
        &self.catalog
    }

    fn def(&self, id: QuestId) -> Result<&QuestDef, EngineError> {
        self.catalog.get(id).ok_or(EngineError::UnknownQuest(id))
    }

    // Lifecycle

    /// Reset every quest and unlock the default set.
    pub fn on_new_game(&self, save: &mut SaveState) {
        save.quests.clear();
        self.ensure_default_unlocks(save);
    }

    /// Unlock default quests added since the save was written.
    pub fn on_load_game(&self, save: &mut SaveState) {
        self.ensure_default_unlocks(save);
    }

    fn ensure_default_unlocks(&self, save: &mut SaveState) {
        for def in self.catalog.iter() {
            if def.has_flag(QuestFlag::UnlockedByDefault) {
                gate::try_unlock(&self.catalog, save, def.id);
            }
        }
    }

    // Queries

    pub fn is_unlocked(&self, save: &SaveState, id: QuestId) -> bool {
        save.quests.get(id).is_unlocked()
    }

    /// Unlocked and not hidden by a locked category.
    pub fn is_visible(&self, save: &SaveState, id: QuestId) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|def| gate::is_visible(def, save))
    }

    pub fn is_active(&self, save: &SaveState, id: QuestId) -> bool {
        let state = save.quests.get(id);
        state.is_unlocked() && state.is_active()
    }

    pub fn has_pending_rewards(&self, save: &SaveState, id: QuestId) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|def| gate::has_pending_rewards(def, save))
    }

    pub fn has_collected_rewards(&self, save: &SaveState, id: QuestId) -> bool {
        self.catalog
            .get(id)
            .is_some_and(|def| gate::has_collected_rewards(def, save))
    }

    pub fn has_any_pending_rewards(&self, save: &SaveState) -> bool {
        self.catalog
            .iter()
            .any(|def| gate::has_pending_rewards(def, save))
    }

    /// Any visible quest unlocked since the player last looked.
    pub fn has_pending_new_quests(&self, save: &SaveState) -> bool {
        self.catalog.iter().any(|def| {
            gate::is_visible(def, save) && save.quests.get(def.id).has(QuestStateFlags::NEW_UNLOCK)
        })
    }

    pub fn clear_new_unlocks(&self, save: &mut SaveState) {
        for def in self.catalog.iter() {
            if gate::is_visible(def, save) {
                save.quests
                    .get_mut(def.id)
                    .set(QuestStateFlags::NEW_UNLOCK, false);
            }
        }
    }

    /// Tier of the last completion, if the quest was ever completed.
    pub fn highest_complete_tier(&self, save: &SaveState, id: QuestId) -> Option<Tier> {
        let state = save.quests.get(id);
        state.highest_complete.filter(|_| state.has_completed())
    }

    /// Share of quests in `mask` completed at least once, in percent.
    /// An empty category reports 0.
    pub fn completion_percent_for(&self, save: &SaveState, mask: QuestFlags) -> u16 {
        let (total, complete) = self
            .catalog
            .iter()
            .filter(|def| def.flags.intersects(mask))
            .fold((0u32, 0u32), |(total, complete), def| {
                let done = save.quests.get(def.id).has_completed() as u32;
                (total + 1, complete + done)
            });

        if total == 0 {
            return 0;
        }
        (complete * 100 / total) as u16
    }

    pub fn quest_counts_for(&self, save: &SaveState, mask: QuestFlags) -> QuestCounts {
        self.catalog
            .iter()
            .filter(|def| def.flags.intersects(mask))
            .fold(QuestCounts::default(), |mut counts, def| {
                if self.is_active(save, def.id) {
                    counts.active += 1;
                } else {
                    counts.inactive += 1;
                }
                counts
            })
    }

    /// Completion shown to the player. Stays below 100 until every category
    /// has been unlocked.
    pub fn display_completion_percent(&self, save: &SaveState) -> u16 {
        let mut mask = QuestFlags::from(QuestFlag::MainQuest);
        let mut cap = 100;

        if save.flags.get(GameFlag::ChallengesUnlocked) {
            mask = mask | QuestFlag::Challenge;
        } else {
            cap = 99;
        }
        if save.flags.get(GameFlag::MasteriesUnlocked) {
            mask = mask | QuestFlag::MonMastery;
        } else {
            cap = 99;
        }

        self.completion_percent_for(save, mask).min(cap)
    }

    // State changes

    /// Unlock a quest. Returns `Ok(false)` when it was already unlocked.
    pub fn try_unlock_quest(&self, save: &mut SaveState, id: QuestId) -> Result<bool, EngineError> {
        self.def(id)?;
        Ok(gate::try_unlock(&self.catalog, save, id))
    }

    pub fn set_pinned(&self, save: &mut SaveState, id: QuestId, pinned: bool) -> Result<(), EngineError> {
        self.def(id)?;
        save.quests.get_mut(id).set(QuestStateFlags::PINNED, pinned);
        Ok(())
    }

    /// Bring the active flag of every quest in line with the activation
    /// gate. Quests outside `mask` are deactivated.
    pub fn activate_quests_for(&self, save: &mut SaveState, mask: QuestFlags) {
        for def in self.catalog.iter() {
            let desired = def.flags.intersects(mask) && gate::can_activate(def, save);
            let state = save.quests.get_mut(def.id);
            if state.is_active() != desired {
                state.set(QuestStateFlags::ACTIVE, desired);
                log::debug!("{} active = {desired}", def.id);
            }
        }
    }

    /// Fail any active quest whose requirements no longer hold.
    pub fn check_requirements(&self, env: &mut QuestEnv<'_>) -> Vec<QuestId> {
        let failing: Vec<QuestId> = self
            .catalog
            .iter()
            .filter(|def| self.is_active(env.save, def.id))
            .filter(|def| !def.requirements.iter().all(|req| req.passes(env.save)))
            .map(|def| def.id)
            .collect();

        for id in &failing {
            self.fail_quest(env, *id);
        }
        failing
    }

    /// Evaluate every active quest listening for `events`.
    pub fn on_trigger(&self, env: &mut QuestEnv<'_>, events: impl Into<TriggerMask>) -> TriggerReport {
        let events = events.into();
        let mut report = TriggerReport::default();

        for def in self.catalog.iter() {
            if !def.trigger_mask().intersects(events) || !env.save.quests.get(def.id).is_active() {
                continue;
            }

            match self.evaluate_triggers(env, def, events) {
                QuestStatus::Success => {
                    self.complete_quest(env, def);
                    report.completed.push(def.id);
                }
                QuestStatus::Fail => {
                    self.fail_quest(env, def.id);
                    report.failed.push(def.id);
                }
                QuestStatus::Pending | QuestStatus::Break => {}
            }
        }
        report
    }

    /// Walk a quest's triggers in order and return the first terminal status.
    fn evaluate_triggers(&self, env: &QuestEnv<'_>, def: &QuestDef, events: TriggerMask) -> QuestStatus {
        let ctx = ConditionContext {
            save: env.save,
            species: &env.tables.species,
            catalog: &self.catalog,
        };

        for trigger in def.triggers.iter().filter(|t| t.events.intersects(events)) {
            let status = if trigger.condition.evaluate(&ctx) {
                trigger.on_pass
            } else {
                trigger.on_fail
            };
            if status != QuestStatus::Pending {
                return status;
            }
        }
        QuestStatus::Pending
    }

    fn complete_quest(&self, env: &mut QuestEnv<'_>, def: &QuestDef) {
        let tier = env.save.progress.reward_tier;
        env.save.quests.get_mut(def.id).mark_completed(tier);
        log::info!("completed {} at tier {}", def.id, tier.0);

        if !gate::is_suppressed(def, env.save) {
            env.popups.push_popup(Popup::QuestComplete(def.id));
        }
    }

    fn fail_quest(&self, env: &mut QuestEnv<'_>, id: QuestId) {
        let state = env.save.quests.get_mut(id);
        state.set(QuestStateFlags::ACTIVE, false);
        let pinned = state.has(QuestStateFlags::PINNED);
        log::info!("failed {id}");

        if pinned {
            env.popups.push_popup(Popup::QuestFail(id));
        }
    }

    // Rewards

    /// Grant a completed quest's rewards as one transaction.
    ///
    /// Item rewards go first, in declaration order. If any is refused, the
    /// items granted so far are taken back and nothing else changes. Only
    /// then are the remaining rewards granted and pending-rewards cleared.
    pub fn try_collect_rewards(&mut self, env: &mut QuestEnv<'_>, id: QuestId) -> Result<(), EngineError> {
        let def = self.catalog.get(id).ok_or(EngineError::UnknownQuest(id))?;
        if !gate::has_pending_rewards(def, env.save) {
            return Err(EngineError::RewardsNotPending(id));
        }

        let mut ledger = GrantLedger::new(self.sequence.is_some());
        let high_priority: Vec<_> = def
            .rewards
            .iter()
            .filter(|reward| reward.kind.is_high_priority())
            .collect();

        for (granted, reward) in high_priority.iter().enumerate() {
            if let Err(source) = reward::grant(reward, env.save, &self.catalog, &env.tables.items, &mut ledger) {
                for done in high_priority[..granted].iter().rev() {
                    reward::revoke(done, env.save);
                }

                let (item, count) = match reward.kind {
                    RewardKind::Item { item, count } => (item, count),
                    _ => (ItemId::NONE, 0),
                };
                if let Some(sequence) = self.sequence.as_mut() {
                    sequence.record_failure(item, count);
                }
                log::warn!("rolled back rewards for {id}: {source}");
                return Err(EngineError::RewardRejected {
                    quest: id,
                    item,
                    count,
                    source,
                });
            }
        }

        for reward in def.rewards.iter().filter(|reward| !reward.kind.is_high_priority()) {
            if let Err(err) = reward::grant(reward, env.save, &self.catalog, &env.tables.items, &mut ledger) {
                log::error!("unfailable reward for {id} failed: {err}");
            }
        }

        env.save.quests.get_mut(id).mark_collected();
        if let Some(sequence) = self.sequence.as_mut() {
            sequence.absorb(&ledger);
        }
        for popup in ledger.popups {
            env.popups.push_popup(popup);
        }
        log::info!("collected rewards for {id}");
        Ok(())
    }

    pub fn is_reward_sequence_active(&self) -> bool {
        self.sequence.is_some()
    }

    pub fn reward_sequence(&self) -> Option<&RewardSequence> {
        self.sequence.as_ref()
    }

    /// Start batching money and stackable-item popups across collections.
    /// Items without the stackable-reward tag keep their own popups.
    pub fn begin_reward_sequence(&mut self) -> Result<(), EngineError> {
        if self.sequence.is_some() {
            log::error!("reward sequence opened twice");
            return Err(EngineError::SequenceAlreadyOpen);
        }
        self.sequence = Some(RewardSequence::default());
        Ok(())
    }

    /// Close the sequence and emit its combined popups.
    pub fn end_reward_sequence(&mut self, popups: &mut dyn PopupSink) -> Result<(), EngineError> {
        let sequence = self.sequence.take().ok_or_else(|| {
            log::error!("reward sequence closed while not open");
            EngineError::SequenceNotOpen
        })?;
        sequence.flush(popups);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TriggerEvent;
    use crate::quest::{Condition, QuestDef, Requirement, Trigger};
    use rogue_rules::{
        Comparison, ItemId, ItemTable, MonType, RulesConfig, SpeciesId, SpeciesInfo, SpeciesTable,
    };

    const MAIN: QuestId = QuestId(1);
    const CHALLENGE: QuestId = QuestId(2);
    const MASTERY: QuestId = QuestId(3);
    const HUB: QuestId = QuestId(4);

    fn tables() -> RogueTables {
        RogueTables {
            species: SpeciesTable::from_entries([SpeciesInfo::new(SpeciesId(1), "Ember", MonType::Fire)])
                .unwrap(),
            items: ItemTable::default(),
        }
    }

    fn catalog() -> QuestCatalog {
        QuestCatalog::from_defs([
            QuestDef::new(MAIN, "Main")
                .with_flags(QuestFlags::from(QuestFlag::MainQuest) | QuestFlag::UnlockedByDefault | QuestFlag::ActiveInRun)
                .with_trigger(Trigger::new(
                    TriggerEvent::BattleWon,
                    Condition::DifficultyGreaterThan { threshold: 1 },
                ))
                .with_reward(RewardKind::Money { amount: 100 })
                .with_reward(RewardKind::QuestUnlock { quest: HUB }),
            QuestDef::new(CHALLENGE, "Challenge")
                .with_flags(QuestFlags::from(QuestFlag::Challenge) | QuestFlag::UnlockedByDefault | QuestFlag::ActiveInRun)
                .with_trigger(Trigger::new(TriggerEvent::ExitRun, Condition::Always)),
            QuestDef::new(MASTERY, "Mastery")
                .with_flags(QuestFlags::from(QuestFlag::MonMastery) | QuestFlag::UnlockedByDefault | QuestFlag::ActiveInRun)
                .with_trigger(Trigger::new(TriggerEvent::ExitRun, Condition::Always)),
            QuestDef::new(HUB, "Hub")
                .with_flags(QuestFlags::from(QuestFlag::MainQuest) | QuestFlag::ActiveInHub),
        ])
        .unwrap()
    }

    fn new_save(engine: &QuestEngine) -> SaveState {
        let mut save = SaveState::new_game(&RulesConfig::default());
        engine.on_new_game(&mut save);
        save
    }

    #[test]
    fn test_new_game_unlocks_defaults() {
        let engine = QuestEngine::new(catalog());
        let save = new_save(&engine);
        assert!(engine.is_unlocked(&save, MAIN));
        assert!(engine.is_unlocked(&save, CHALLENGE));
        assert!(!engine.is_unlocked(&save, HUB));
        assert!(engine.has_pending_new_quests(&save));
        assert!(!engine.is_visible(&save, CHALLENGE));
    }

    #[test]
    fn test_clear_new_unlocks_skips_suppressed() {
        let engine = QuestEngine::new(catalog());
        let mut save = new_save(&engine);
        engine.clear_new_unlocks(&mut save);
        assert!(!engine.has_pending_new_quests(&save));
        assert!(save.quests.get(CHALLENGE).has(QuestStateFlags::NEW_UNLOCK));

        save.flags.set(GameFlag::ChallengesUnlocked, true);
        assert!(engine.has_pending_new_quests(&save));
    }

    #[test]
    fn test_activation_respects_suppression() {
        let engine = QuestEngine::new(catalog());
        let mut save = new_save(&engine);
        engine.activate_quests_for(&mut save, QuestFlag::ActiveInRun.into());

        assert!(engine.is_active(&save, MAIN));
        assert!(!engine.is_active(&save, CHALLENGE));
        assert!(engine.is_active(&save, MASTERY));

        engine.activate_quests_for(&mut save, QuestFlag::ActiveInHub.into());
        assert!(!engine.is_active(&save, MAIN));
    }

    #[test]
    fn test_trigger_completes_atomically() {
        let engine = QuestEngine::new(catalog());
        let mut save = new_save(&engine);
        engine.activate_quests_for(&mut save, QuestFlag::ActiveInRun.into());
        let tables = tables();
        let mut popups: Vec<Popup> = Vec::new();

        let mut env = QuestEnv::new(&mut save, &tables, &mut popups);
        let report = engine.on_trigger(&mut env, TriggerEvent::BattleWon);
        assert!(report.completed.is_empty(), "difficulty not reached yet");

        env.save.progress.difficulty = 2;
        env.save.progress.reward_tier = Tier::MEDIUM;
        let report = engine.on_trigger(&mut env, TriggerEvent::BattleWon);
        assert_eq!(report.completed, vec![MAIN]);

        let state = save.quests.get(MAIN);
        assert!(!state.is_active());
        assert!(state.has_completed());
        assert!(state.has_pending_rewards());
        assert_eq!(engine.highest_complete_tier(&save, MAIN), Some(Tier::MEDIUM));
        assert_eq!(popups, vec![Popup::QuestComplete(MAIN)]);
    }

    #[test]
    fn test_suppressed_mastery_completes_silently() {
        let engine = QuestEngine::new(catalog());
        let mut save = new_save(&engine);
        engine.activate_quests_for(&mut save, QuestFlag::ActiveInRun.into());
        let tables = tables();
        let mut popups: Vec<Popup> = Vec::new();

        let mut env = QuestEnv::new(&mut save, &tables, &mut popups);
        let report = engine.on_trigger(&mut env, TriggerEvent::ExitRun);
        assert_eq!(report.completed, vec![MASTERY]);
        assert!(popups.is_empty());
        assert!(!engine.has_pending_rewards(&save, MASTERY));
    }

    #[test]
    fn test_fail_notifies_only_when_pinned() {
        let catalog = QuestCatalog::from_defs([
            QuestDef::new(QuestId(1), "Fragile")
                .with_flags(QuestFlags::from(QuestFlag::MainQuest) | QuestFlag::UnlockedByDefault)
                .with_trigger(
                    Trigger::new(TriggerEvent::PartyChange, Condition::PartyOnlyShinies)
                        .on_pass(QuestStatus::Pending)
                        .on_fail(QuestStatus::Fail),
                ),
            QuestDef::new(QuestId(2), "Fragile pinned")
                .with_flags(QuestFlags::from(QuestFlag::MainQuest) | QuestFlag::UnlockedByDefault)
                .with_trigger(
                    Trigger::new(TriggerEvent::PartyChange, Condition::PartyOnlyShinies)
                        .on_pass(QuestStatus::Pending)
                        .on_fail(QuestStatus::Fail),
                ),
        ])
        .unwrap();
        let engine = QuestEngine::new(catalog);
        let mut save = new_save(&engine);
        engine.activate_quests_for(&mut save, QuestFlag::MainQuest.into());
        engine.set_pinned(&mut save, QuestId(2), true).unwrap();
        save.give_creature(rogue_rules::PartyMember::new(SpeciesId(1)));

        let tables = tables();
        let mut popups: Vec<Popup> = Vec::new();
        let mut env = QuestEnv::new(&mut save, &tables, &mut popups);
        let report = engine.on_trigger(&mut env, TriggerEvent::PartyChange);

        assert_eq!(report.failed, vec![QuestId(1), QuestId(2)]);
        assert_eq!(popups, vec![Popup::QuestFail(QuestId(2))]);
        assert!(!engine.is_active(&save, QuestId(1)));
        assert!(!save.quests.get(QuestId(1)).has_completed());
    }

    #[test]
    fn test_collect_grants_and_unlocks_hub_quest() {
        let mut engine = QuestEngine::new(catalog());
        let mut save = new_save(&engine);
        save.quests.get_mut(MAIN).mark_completed(Tier::EASY);
        let tables = tables();
        let mut popups: Vec<Popup> = Vec::new();

        let mut env = QuestEnv::new(&mut save, &tables, &mut popups);
        engine.try_collect_rewards(&mut env, MAIN).unwrap();
        assert!(matches!(
            engine.try_collect_rewards(&mut env, MAIN),
            Err(EngineError::RewardsNotPending(MAIN))
        ));

        assert_eq!(save.money(), 100);
        assert!(engine.has_collected_rewards(&save, MAIN));
        assert!(engine.is_active(&save, HUB));
        assert_eq!(popups, vec![Popup::AddMoney(100)]);
    }

    #[test]
    fn test_requirements_fail_active_quests() {
        let catalog = QuestCatalog::from_defs([QuestDef::new(QuestId(1), "Hold the charm")
            .with_flags(QuestFlags::from(QuestFlag::MainQuest) | QuestFlag::UnlockedByDefault)
            .with_requirement(Requirement::Item {
                item: ItemId(9),
                comparison: Comparison::GreaterThan,
                count: 0,
            })])
        .unwrap();
        let engine = QuestEngine::new(catalog);
        let mut save = new_save(&engine);
        save.bag.add(ItemId(9), 1).unwrap();
        engine.activate_quests_for(&mut save, QuestFlag::MainQuest.into());

        let tables = tables();
        let mut popups: Vec<Popup> = Vec::new();
        {
            let mut env = QuestEnv::new(&mut save, &tables, &mut popups);
            assert!(engine.check_requirements(&mut env).is_empty());
            env.save.bag.remove(ItemId(9), 1).unwrap();
            assert_eq!(engine.check_requirements(&mut env), vec![QuestId(1)]);
        }
        assert!(!engine.is_active(&save, QuestId(1)));
    }

    #[test]
    fn test_completion_percentages() {
        let engine = QuestEngine::new(catalog());
        let mut save = new_save(&engine);
        let main_mask = QuestFlags::from(QuestFlag::MainQuest);

        assert_eq!(engine.completion_percent_for(&save, main_mask), 0);
        save.quests.get_mut(MAIN).mark_completed(Tier::EASY);
        save.quests.get_mut(HUB).mark_completed(Tier::EASY);
        assert_eq!(engine.completion_percent_for(&save, main_mask), 100);
        assert_eq!(engine.display_completion_percent(&save), 99);

        save.flags.set(GameFlag::ChallengesUnlocked, true);
        save.flags.set(GameFlag::MasteriesUnlocked, true);
        assert_eq!(engine.display_completion_percent(&save), 50);

        assert_eq!(
            engine.completion_percent_for(&save, QuestFlag::FinalQuest.into()),
            0,
            "empty category"
        );
        let counts = engine.quest_counts_for(&save, main_mask);
        assert_eq!(counts, QuestCounts { active: 0, inactive: 2 });
    }

    #[test]
    fn test_sequence_brackets() {
        let mut engine = QuestEngine::new(catalog());
        let mut popups: Vec<Popup> = Vec::new();
        assert!(matches!(
            engine.end_reward_sequence(&mut popups),
            Err(EngineError::SequenceNotOpen)
        ));
        engine.begin_reward_sequence().unwrap();
        assert!(engine.is_reward_sequence_active());
        assert!(matches!(
            engine.begin_reward_sequence(),
            Err(EngineError::SequenceAlreadyOpen)
        ));
        engine.end_reward_sequence(&mut popups).unwrap();
        assert!(!engine.is_reward_sequence_active());
        assert!(popups.is_empty());
    }

    #[test]
    fn test_unknown_quest_operations() {
        let engine = QuestEngine::new(catalog());
        let mut save = new_save(&engine);
        assert!(matches!(
            engine.try_unlock_quest(&mut save, QuestId(99)),
            Err(EngineError::UnknownQuest(QuestId(99)))
        ));
        assert_eq!(engine.try_unlock_quest(&mut save, MAIN).unwrap(), false);
        assert_eq!(engine.try_unlock_quest(&mut save, HUB).unwrap(), true);
    }
}
