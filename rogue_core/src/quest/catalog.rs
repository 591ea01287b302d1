//! The validated set of quest definitions.

use rogue_rules::QuestId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::definition::QuestDef;
use super::reward::RewardKind;
use crate::error::EngineError;

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    quests: Vec<QuestDef>,
}

/// Quest definitions keyed and iterated by ascending id.
#[derive(Debug, Clone, Default)]
pub struct QuestCatalog {
    quests: BTreeMap<QuestId, QuestDef>,
}

impl QuestCatalog {
    /// Build a catalog, rejecting duplicate ids and references to quests
    /// that do not exist.
    pub fn from_defs(defs: impl IntoIterator<Item = QuestDef>) -> Result<Self, EngineError> {
        let mut catalog = Self::default();
        for def in defs {
            let id = def.id;
            if catalog.quests.insert(id, def).is_some() {
                return Err(EngineError::DuplicateQuest(id));
            }
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a `[[quests]]` TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, EngineError> {
        let file: CatalogFile = toml::from_str(source)?;
        let catalog = Self::from_defs(file.quests)?;
        log::debug!("loaded {} quests", catalog.len());
        Ok(catalog)
    }

    pub fn from_json_str(source: &str) -> Result<Self, EngineError> {
        let file: CatalogFile = serde_json::from_str(source)?;
        Self::from_defs(file.quests)
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        let file = CatalogFile {
            quests: self.quests.values().cloned().collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    fn validate(&self) -> Result<(), EngineError> {
        for def in self.quests.values() {
            let from_conditions = def
                .triggers
                .iter()
                .flat_map(|trigger| trigger.condition.referenced_quests().iter().copied());
            let from_rewards = def.rewards.iter().filter_map(|reward| match reward.kind {
                RewardKind::QuestUnlock { quest } => Some(quest),
                _ => None,
            });

            for referenced in from_conditions.chain(from_rewards) {
                if !self.quests.contains_key(&referenced) {
                    return Err(EngineError::UnknownQuestReference {
                        quest: def.id,
                        referenced,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, id: QuestId) -> Option<&QuestDef> {
        self.quests.get(&id)
    }

    pub fn contains(&self, id: QuestId) -> bool {
        self.quests.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = QuestId> + '_ {
        self.quests.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuestDef> {
        self.quests.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quest::{Condition, Trigger};
    use crate::events::TriggerEvent;

    #[test]
    fn test_duplicate_rejected() {
        let result = QuestCatalog::from_defs([
            QuestDef::new(QuestId(1), "A"),
            QuestDef::new(QuestId(1), "B"),
        ]);
        assert!(matches!(result, Err(EngineError::DuplicateQuest(QuestId(1)))));
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let quest = QuestDef::new(QuestId(1), "A").with_trigger(Trigger::new(
            TriggerEvent::ExitRun,
            Condition::CompletedAnyQuest {
                quests: vec![QuestId(9)],
            },
        ));
        assert!(matches!(
            QuestCatalog::from_defs([quest]),
            Err(EngineError::UnknownQuestReference {
                referenced: QuestId(9),
                ..
            })
        ));

        let unlock = QuestDef::new(QuestId(2), "B").with_reward(RewardKind::QuestUnlock { quest: QuestId(3) });
        assert!(QuestCatalog::from_defs([unlock]).is_err());
    }

    #[test]
    fn test_toml_catalog() {
        let source = r#"
            [[quests]]
            id = 1
            title = "First Steps"
            flags = ["MainQuest", "UnlockedByDefault", "ActiveInRun"]

            [[quests.triggers]]
            events = ["BattleWon"]
            condition = { kind = "difficulty_greater_than", threshold = 2 }

            [[quests.rewards]]
            kind = "money"
            amount = 500

            [[quests.rewards]]
            kind = "quest_unlock"
            quest = 2
            custom_popup = "A new path opens"

            [[quests]]
            id = 2
            title = "Second Steps"
        "#;
        let catalog = QuestCatalog::from_toml_str(source).unwrap();
        assert_eq!(catalog.len(), 2);

        let first = catalog.get(QuestId(1)).unwrap();
        assert_eq!(first.triggers[0].on_pass, crate::quest::QuestStatus::Success);
        assert_eq!(first.rewards[1].custom_popup.as_deref(), Some("A new path opens"));
        assert!(matches!(first.rewards[0].kind, RewardKind::Money { amount: 500 }));

        let json = catalog.to_json().unwrap();
        let reloaded = QuestCatalog::from_json_str(&json).unwrap();
        assert_eq!(reloaded.get(QuestId(1)), catalog.get(QuestId(1)));
    }
}
