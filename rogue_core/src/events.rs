//! Game events that drive quest trigger evaluation.

use serde::{Deserialize, Serialize};

/// A single game event raised by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TriggerEvent {
    /// A new run has begun.
    StartRun,
    /// The run ended, by victory or defeat.
    ExitRun,
    /// The player entered a room on the adventure path.
    EnterEncounter,
    /// A battle finished in the player's favour.
    BattleWon,
    /// The player warped to another map.
    MapWarp,
    /// Something was bought in a shop.
    ItemPurchase,
    /// Party composition changed.
    PartyChange,
    /// An item was used from the bag.
    ItemUsed,
    /// The player arrived back in the hub.
    EnterHub,
    /// Money changed outside of a purchase.
    MoneyChanged,
}

impl TriggerEvent {
    pub fn mask(self) -> TriggerMask {
        TriggerMask(1 << self as u32)
    }
}

/// Bitmask over [`TriggerEvent`]. Serialized as a list of event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TriggerEvent>", into = "Vec<TriggerEvent>")]
pub struct TriggerMask(pub u32);

impl TriggerMask {
    pub const NONE: Self = Self(0);

    const ALL_EVENTS: [TriggerEvent; 10] = [
        TriggerEvent::StartRun,
        TriggerEvent::ExitRun,
        TriggerEvent::EnterEncounter,
        TriggerEvent::BattleWon,
        TriggerEvent::MapWarp,
        TriggerEvent::ItemPurchase,
        TriggerEvent::PartyChange,
        TriggerEvent::ItemUsed,
        TriggerEvent::EnterHub,
        TriggerEvent::MoneyChanged,
    ];

    pub fn intersects(self, other: TriggerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn events(self) -> impl Iterator<Item = TriggerEvent> {
        Self::ALL_EVENTS
            .into_iter()
            .filter(move |event| self.intersects(event.mask()))
    }
}

impl From<TriggerEvent> for TriggerMask {
    fn from(event: TriggerEvent) -> Self {
        event.mask()
    }
}

impl From<Vec<TriggerEvent>> for TriggerMask {
    fn from(events: Vec<TriggerEvent>) -> Self {
        events
            .into_iter()
            .fold(Self::NONE, |mask, event| mask | event.mask())
    }
}

impl From<TriggerMask> for Vec<TriggerEvent> {
    fn from(mask: TriggerMask) -> Self {
        mask.events().collect()
    }
}

impl std::ops::BitOr for TriggerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOr<TriggerEvent> for TriggerMask {
    type Output = Self;

    fn bitor(self, rhs: TriggerEvent) -> Self {
        self | rhs.mask()
    }
}
