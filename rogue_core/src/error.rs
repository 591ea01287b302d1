//! Engine error type.

use rogue_rules::{BagError, ItemId, QuestId};
use thiserror::Error;

/// Errors raised by the quest engine and catalog loading.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to parse quest catalog: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to parse quest catalog: {0}")]
    Json(#[from] serde_json::Error),

    #[error("quest {0} is defined twice")]
    DuplicateQuest(QuestId),

    #[error("quest {0} is not in the catalog")]
    UnknownQuest(QuestId),

    #[error("quest {quest} references unknown quest {referenced}")]
    UnknownQuestReference { quest: QuestId, referenced: QuestId },

    #[error("quest {0} has no pending rewards")]
    RewardsNotPending(QuestId),

    #[error("reward {count}x {item} from quest {quest} could not be granted")]
    RewardRejected {
        quest: QuestId,
        item: ItemId,
        count: u16,
        #[source]
        source: BagError,
    },

    #[error("a reward sequence is already open")]
    SequenceAlreadyOpen,

    #[error("no reward sequence is open")]
    SequenceNotOpen,
}
