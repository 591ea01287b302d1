//! Fire-and-forget notifications for the UI layer.

use rogue_rules::{ItemId, QuestId, SpeciesId};

/// A notification pushed to the popup queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Popup {
    QuestComplete(QuestId),
    QuestFail(QuestId),
    AddCreature { species: SpeciesId, shiny: bool },
    AddItem { item: ItemId, count: u32 },
    AddMoney(u32),
    UnlockedShopItem(ItemId),
    CannotTakeItem { item: ItemId, count: u16 },
    Custom(String),
}

/// Destination for popups. The engine never reads back what it pushed.
pub trait PopupSink {
    fn push_popup(&mut self, popup: Popup);
}

impl PopupSink for Vec<Popup> {
    fn push_popup(&mut self, popup: Popup) {
        self.push(popup);
    }
}
