//! Item-specific filters.

use rogue_rules::{ItemTable, ItemTags, Pocket};

use super::{CandidateQuery, QueryMode};

impl<'a> CandidateQuery<'a, ItemTable> {
    /// Drop disabled items.
    pub fn is_item_active(&mut self) -> &mut Self {
        let table = self.table;
        self.retain_where(QueryMode::Include, |_, id| {
            table.get(id).is_some_and(|info| info.enabled)
        })
    }

    pub fn is_stored_in_pocket(&mut self, mode: QueryMode, pocket: Pocket) -> &mut Self {
        let table = self.table;
        self.retain_where(mode, |_, id| {
            table.get(id).is_some_and(|info| info.pocket == pocket)
        })
    }

    /// Match items priced within `min..=max`.
    pub fn in_price_range(&mut self, mode: QueryMode, min: u32, max: u32) -> &mut Self {
        let table = self.table;
        self.retain_where(mode, |_, id| {
            table
                .get(id)
                .is_some_and(|info| (min..=max).contains(&info.price))
        })
    }

    /// Match items carrying all of `tags`.
    pub fn with_tags(&mut self, mode: QueryMode, tags: ItemTags) -> &mut Self {
        let table = self.table;
        self.retain_where(mode, |_, id| table.has_tags(id, tags))
    }

    pub fn is_general_shop_item(&mut self, mode: QueryMode) -> &mut Self {
        self.with_tags(mode, ItemTags::GENERAL_SHOP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ItemQueryBuffer;
    use rogue_rules::{ItemId, ItemInfo};

    fn table() -> ItemTable {
        ItemTable::from_entries([
            ItemInfo::new(ItemId(1), "Potion", Pocket::Medicine, 300)
                .with_tags(ItemTags::MEDICINE | ItemTags::GENERAL_SHOP),
            ItemInfo::new(ItemId(2), "Poke Ball", Pocket::Balls, 200).with_tags(ItemTags::GENERAL_SHOP),
            ItemInfo::new(ItemId(3), "Leftovers", Pocket::HeldItems, 4000)
                .with_tags(ItemTags::HELD_ITEM | ItemTags::RARE_HELD_ITEM),
            ItemInfo::new(ItemId(4), "Bike", Pocket::KeyItems, 0),
            ItemInfo::new(ItemId(5), "Old Potion", Pocket::Medicine, 100).disabled(),
        ])
        .unwrap()
    }

    #[test]
    fn test_mart_style_chain() {
        let table = table();
        let mut buffer = ItemQueryBuffer::new();
        let mut query = buffer.begin(&table);
        query
            .is_item_active()
            .is_stored_in_pocket(QueryMode::Exclude, Pocket::KeyItems)
            .is_general_shop_item(QueryMode::Include);
        assert_eq!(query.end(), &[ItemId(1), ItemId(2)]);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let table = table();
        let mut buffer = ItemQueryBuffer::new();
        let mut query = buffer.begin(&table);
        query.in_price_range(QueryMode::Include, 200, 300);
        assert_eq!(query.candidates(), &[ItemId(1), ItemId(2)]);
    }

    #[test]
    fn test_tag_filter_requires_all_tags() {
        let table = table();
        let mut buffer = ItemQueryBuffer::new();
        let mut query = buffer.begin(&table);
        query.with_tags(QueryMode::Include, ItemTags::HELD_ITEM | ItemTags::RARE_HELD_ITEM);
        assert_eq!(query.candidates(), &[ItemId(3)]);
    }
}
