//! Item table definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ItemId;
use crate::config::RulesError;
use crate::mechanics::{ItemTags, Pocket};

fn enabled_by_default() -> bool {
    true
}

/// One row of the item table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemInfo {
    pub id: ItemId,
    pub name: String,
    pub pocket: Pocket,
    /// Shop price. Zero means the item is never sold.
    #[serde(default)]
    pub price: u32,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    #[serde(default)]
    pub tags: ItemTags,
}

impl ItemInfo {
    /// Create an enabled, untagged item.
    pub fn new(id: ItemId, name: impl Into<String>, pocket: Pocket, price: u32) -> Self {
        Self {
            id,
            name: name.into(),
            pocket,
            price,
            enabled: true,
            tags: ItemTags::NONE,
        }
    }

    pub fn with_tags(mut self, tags: ItemTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// The static item universe, keyed and iterated by ascending id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemTable {
    entries: BTreeMap<ItemId, ItemInfo>,
}

impl ItemTable {
    /// Build a table, rejecting duplicate ids.
    pub fn from_entries(entries: impl IntoIterator<Item = ItemInfo>) -> Result<Self, RulesError> {
        let mut table = Self::default();
        for info in entries {
            let id = info.id;
            if table.entries.insert(id, info).is_some() {
                return Err(RulesError::DuplicateItem(id));
            }
        }
        Ok(table)
    }

    pub fn get(&self, id: ItemId) -> Option<&ItemInfo> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemInfo> {
        self.entries.values()
    }

    /// Check that `id` exists and carries every tag in `tags`.
    pub fn has_tags(&self, id: ItemId, tags: ItemTags) -> bool {
        self.get(id).is_some_and(|info| info.tags.contains(tags))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_table() {
        let table = ItemTable::from_entries([
            ItemInfo::new(ItemId(1), "Potion", Pocket::Medicine, 300)
                .with_tags(ItemTags::MEDICINE),
            ItemInfo::new(ItemId(2), "Leftovers", Pocket::HeldItems, 4000)
                .with_tags(ItemTags::HELD_ITEM | ItemTags::RARE_HELD_ITEM),
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        assert!(table.has_tags(ItemId(2), ItemTags::RARE_HELD_ITEM));
        assert!(!table.has_tags(ItemId(1), ItemTags::HELD_ITEM));
        assert!(!table.has_tags(ItemId(99), ItemTags::NONE));
    }

    #[test]
    fn test_duplicate_item_rejected() {
        let result = ItemTable::from_entries([
            ItemInfo::new(ItemId(1), "Potion", Pocket::Medicine, 300),
            ItemInfo::new(ItemId(1), "Potion", Pocket::Medicine, 300),
        ]);
        assert!(matches!(result, Err(RulesError::DuplicateItem(ItemId(1)))));
    }
}
