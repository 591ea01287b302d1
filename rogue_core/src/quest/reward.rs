//! Quest rewards and the grant / revoke primitives used by collection.

use rogue_rules::{
    BagError, GameFlag, ItemId, ItemTable, ItemTags, PartyMember, QuestId, SaveState, SpeciesId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::QuestCatalog;
use super::gate;
use crate::popups::Popup;

/// What a reward grants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RewardKind {
    Creature {
        species: SpeciesId,
        #[serde(default)]
        shiny: bool,
        #[serde(default)]
        nickname: Option<String>,
    },
    Item {
        item: ItemId,
        count: u16,
    },
    Money {
        amount: u32,
    },
    ShopItem {
        item: ItemId,
    },
    QuestUnlock {
        quest: QuestId,
    },
    Flag {
        flag: GameFlag,
    },
}

impl RewardKind {
    /// High-priority rewards can be refused and are granted first so they
    /// can be rolled back.
    pub fn is_high_priority(&self) -> bool {
        matches!(self, RewardKind::Item { .. })
    }
}

/// A reward entry on a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    #[serde(flatten)]
    pub kind: RewardKind,
    /// Replaces the per-kind popup when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_popup: Option<String>,
}

impl Reward {
    pub fn with_custom_popup(mut self, text: impl Into<String>) -> Self {
        self.custom_popup = Some(text.into());
        self
    }
}

impl From<RewardKind> for Reward {
    fn from(kind: RewardKind) -> Self {
        Self {
            kind,
            custom_popup: None,
        }
    }
}

/// Side effects of one collection attempt, held back until it commits.
#[derive(Debug, Default)]
pub(crate) struct GrantLedger {
    pub popups: Vec<Popup>,
    pub money: u32,
    /// Stackable-reward items held back for the sequence popup.
    pub items: BTreeMap<ItemId, u32>,
    /// Aggregate money and stackable items instead of emitting popups for
    /// them.
    pub batching: bool,
}

impl GrantLedger {
    pub fn new(batching: bool) -> Self {
        Self {
            batching,
            ..Self::default()
        }
    }
}

pub(crate) fn grant(
    reward: &Reward,
    save: &mut SaveState,
    catalog: &QuestCatalog,
    items: &ItemTable,
    ledger: &mut GrantLedger,
) -> Result<(), BagError> {
    let muted = reward.custom_popup.is_some();

    match &reward.kind {
        RewardKind::Creature {
            species,
            shiny,
            nickname,
        } => {
            let mut member = PartyMember::new(*species);
            member.shiny = *shiny;
            member.nickname = nickname.clone();
            save.give_creature(member);
            if !muted {
                ledger.popups.push(Popup::AddCreature {
                    species: *species,
                    shiny: *shiny,
                });
            }
        }
        RewardKind::Item { item, count } => {
            save.bag.add(*item, *count)?;
            if ledger.batching && items.has_tags(*item, ItemTags::STACKABLE_REWARD) {
                *ledger.items.entry(*item).or_default() += *count as u32;
            } else if !muted {
                ledger.popups.push(Popup::AddItem {
                    item: *item,
                    count: *count as u32,
                });
            }
        }
        RewardKind::Money { amount } => {
            save.wallet.add(*amount);
            if ledger.batching {
                ledger.money += amount;
            } else if !muted {
                ledger.popups.push(Popup::AddMoney(*amount));
            }
        }
        RewardKind::ShopItem { item } => {
            save.shop_unlocks.insert(*item);
            if !muted {
                ledger.popups.push(Popup::UnlockedShopItem(*item));
            }
        }
        RewardKind::QuestUnlock { quest } => {
            gate::try_unlock(catalog, save, *quest);
        }
        RewardKind::Flag { flag } => save.flags.set(*flag, true),
    }

    if let Some(text) = &reward.custom_popup {
        ledger.popups.push(Popup::Custom(text.clone()));
    }
    Ok(())
}

/// Undo a granted high-priority reward.
pub(crate) fn revoke(reward: &Reward, save: &mut SaveState) {
    match &reward.kind {
        RewardKind::Item { item, count } => {
            if let Err(err) = save.bag.remove(*item, *count) {
                log::error!("rollback could not remove granted item: {err}");
            }
        }
        other => {
            debug_assert!(false, "reward {other:?} cannot be revoked");
            log::error!("reward {other:?} cannot be revoked");
        }
    }
}
