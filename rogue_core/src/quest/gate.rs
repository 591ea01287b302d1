//! Visibility and activation rules shared by the engine and conditions.

use rogue_rules::{ConfigToggle, GameFlag, QuestId, QuestStateFlags, SaveState};

use super::catalog::QuestCatalog;
use super::definition::{QuestDef, QuestFlag};

/// A suppressed quest belongs to a category the player has not unlocked yet.
/// It stays hidden from the UI.
pub(crate) fn is_suppressed(def: &QuestDef, save: &SaveState) -> bool {
    (def.has_flag(QuestFlag::Challenge) && !save.flags.get(GameFlag::ChallengesUnlocked))
        || (def.has_flag(QuestFlag::MonMastery) && !save.flags.get(GameFlag::MasteriesUnlocked))
}

/// Masteries keep evaluating while suppressed; challenges do not.
fn can_activate_while_suppressed(def: &QuestDef) -> bool {
    def.has_flag(QuestFlag::MonMastery)
}

pub(crate) fn is_visible(def: &QuestDef, save: &SaveState) -> bool {
    save.quests.get(def.id).is_unlocked() && !is_suppressed(def, save)
}

pub(crate) fn has_pending_rewards(def: &QuestDef, save: &SaveState) -> bool {
    is_visible(def, save) && save.quests.get(def.id).has_pending_rewards()
}

pub(crate) fn has_collected_rewards(def: &QuestDef, save: &SaveState) -> bool {
    let state = save.quests.get(def.id);
    is_visible(def, save) && state.has_completed() && !state.has_pending_rewards()
}

/// Whether `def` should be active given the current save.
pub(crate) fn can_activate(def: &QuestDef, save: &SaveState) -> bool {
    let state = save.quests.get(def.id);

    if !state.is_unlocked() || state.has_pending_rewards() {
        return false;
    }
    if is_suppressed(def, save) && !can_activate_while_suppressed(def) {
        return false;
    }

    if def.has_flag(QuestFlag::Challenge) {
        if save.config.toggle(ConfigToggle::DisableChallengeQuests) {
            return false;
        }
        // Repeatable only once the reward tier climbs past the last completion.
        if let Some(highest) = state.highest_complete.filter(|_| state.has_completed()) {
            if save.progress.reward_tier <= highest {
                return false;
            }
        }
        true
    } else {
        !save.config.toggle(ConfigToggle::DisableMainQuests) && !state.has_completed()
    }
}

/// Unlock `id` if it is still locked. Returns whether anything changed.
pub(crate) fn try_unlock(catalog: &QuestCatalog, save: &mut SaveState, id: QuestId) -> bool {
    let state = save.quests.get_mut(id);
    if state.is_unlocked() {
        return false;
    }

    state.set(QuestStateFlags::UNLOCKED, true);
    state.set(QuestStateFlags::NEW_UNLOCK, true);
    // Unlocks happen in the hub, so hub quests start straight away.
    if catalog
        .get(id)
        .is_some_and(|def| def.has_flag(QuestFlag::ActiveInHub))
    {
        state.set(QuestStateFlags::ACTIVE, true);
    }
    log::info!("unlocked {id}");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use rogue_rules::{QuestId, QuestStateFlags, RulesConfig, Tier};

    fn unlocked(save: &mut SaveState, def: &QuestDef) {
        save.quests
            .get_mut(def.id)
            .set(QuestStateFlags::UNLOCKED, true);
    }

    #[test]
    fn test_locked_quest_cannot_activate() {
        let save = SaveState::new_game(&RulesConfig::default());
        let def = QuestDef::new(QuestId(1), "Main").with_flags(QuestFlag::MainQuest);
        assert!(!can_activate(&def, &save));
    }

    #[test]
    fn test_main_quest_completes_once() {
        let mut save = SaveState::new_game(&RulesConfig::default());
        let def = QuestDef::new(QuestId(1), "Main").with_flags(QuestFlag::MainQuest);
        unlocked(&mut save, &def);
        assert!(can_activate(&def, &save));

        let state = save.quests.get_mut(def.id);
        state.mark_completed(Tier::EASY);
        state.mark_collected();
        assert!(!can_activate(&def, &save));
    }

    #[test]
    fn test_challenge_repeats_at_higher_tier() {
        let mut save = SaveState::new_game(&RulesConfig::default());
        save.flags.set(GameFlag::ChallengesUnlocked, true);
        let def = QuestDef::new(QuestId(2), "Challenge").with_flags(QuestFlag::Challenge);
        unlocked(&mut save, &def);

        let state = save.quests.get_mut(def.id);
        state.mark_completed(Tier::MEDIUM);
        assert!(!can_activate(&def, &save), "pending rewards block activation");

        save.quests.get_mut(def.id).mark_collected();
        save.progress.reward_tier = Tier::MEDIUM;
        assert!(!can_activate(&def, &save));
        save.progress.reward_tier = Tier::HARD;
        assert!(can_activate(&def, &save));

        save.config.set_toggle(ConfigToggle::DisableChallengeQuests, true);
        assert!(!can_activate(&def, &save));
    }

    #[test]
    fn test_suppression_by_category() {
        let mut save = SaveState::new_game(&RulesConfig::default());
        let challenge = QuestDef::new(QuestId(1), "C").with_flags(QuestFlag::Challenge);
        let mastery = QuestDef::new(QuestId(2), "M").with_flags(QuestFlag::MonMastery);
        unlocked(&mut save, &challenge);
        unlocked(&mut save, &mastery);

        assert!(is_suppressed(&challenge, &save));
        assert!(!can_activate(&challenge, &save));
        assert!(is_suppressed(&mastery, &save));
        assert!(can_activate(&mastery, &save));
        assert!(!is_visible(&mastery, &save));

        save.flags.set(GameFlag::MasteriesUnlocked, true);
        assert!(is_visible(&mastery, &save));
    }
}
