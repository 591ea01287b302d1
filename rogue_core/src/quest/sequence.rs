//! Batching of reward popups across several collections.

use rogue_rules::ItemId;
use std::collections::BTreeMap;

use super::reward::GrantLedger;
use crate::popups::{Popup, PopupSink};

/// Totals gathered while a reward sequence is open.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewardSequence {
    money: u32,
    items: BTreeMap<ItemId, u32>,
    failed: Option<(ItemId, u16)>,
}

impl RewardSequence {
    pub fn money(&self) -> u32 {
        self.money
    }

    pub fn item_total(&self, item: ItemId) -> u32 {
        self.items.get(&item).copied().unwrap_or(0)
    }

    /// The most recent item grant that did not fit.
    pub fn last_failed(&self) -> Option<(ItemId, u16)> {
        self.failed
    }

    pub(crate) fn absorb(&mut self, ledger: &GrantLedger) {
        self.money = self.money.saturating_add(ledger.money);
        for (item, count) in &ledger.items {
            *self.items.entry(*item).or_default() += count;
        }
    }

    pub(crate) fn record_failure(&mut self, item: ItemId, count: u16) {
        self.failed = Some((item, count));
    }

    /// Emit the combined popups.
    pub(crate) fn flush(self, popups: &mut dyn PopupSink) {
        log::debug!(
            "reward sequence flush: {} money, {} item kinds, failed {:?}",
            self.money,
            self.items.len(),
            self.failed
        );
        for (item, count) in self.items {
            popups.push_popup(Popup::AddItem { item, count });
        }
        if self.money > 0 {
            popups.push_popup(Popup::AddMoney(self.money));
        }
        if let Some((item, count)) = self.failed {
            popups.push_popup(Popup::CannotTakeItem { item, count });
        }
    }
}
