use crate::{
    error::LedgerError,
    model::{Item, ItemIndex, ItemPatch, Money},
};

/// Ordered receipt lines. An item's identity is its position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemLedger {
    items: Vec<Item>,
}

impl ItemLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Item>) -> Result<Self, LedgerError> {
        for item in &items {
            item.validate()?;
        }
        checked_subtotal(&items)?;
        Ok(Self { items })
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, index: ItemIndex) -> Option<&Item> {
        self.items.get(index.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemIndex, &Item)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(|(idx, item)| (ItemIndex(idx), item))
    }

    /// Σ unit_price × quantity over every item.
    pub fn subtotal(&self) -> Money {
        self.items.iter().map(Item::line_total).sum()
    }

    pub(crate) fn require(&self, index: ItemIndex) -> Result<&Item, LedgerError> {
        self.get(index).ok_or(LedgerError::UnknownItem { index })
    }

    pub(crate) fn push(&mut self, item: Item) -> Result<ItemIndex, LedgerError> {
        item.validate()?;
        checked_subtotal(self.items.iter().chain([&item]))?;
        self.items.push(item);
        Ok(ItemIndex(self.items.len() - 1))
    }

    /// Applies `patch` and returns the item as it was before the edit.
    pub(crate) fn patch(&mut self, index: ItemIndex, patch: &ItemPatch) -> Result<Item, LedgerError> {
        let current = self.require(index)?;
        let updated = patch.apply_to(current);
        updated.validate()?;
        checked_subtotal(
            self.iter()
                .map(|(idx, item)| if idx == index { &updated } else { item }),
        )?;
        Ok(std::mem::replace(&mut self.items[index.0], updated))
    }

    pub(crate) fn remove(&mut self, index: ItemIndex) -> Result<Item, LedgerError> {
        self.require(index)?;
        Ok(self.items.remove(index.0))
    }
}

/// Σ line totals, rejected once it passes [`Money::MAX_AMOUNT`].
fn checked_subtotal<'a>(items: impl IntoIterator<Item = &'a Item>) -> Result<Money, LedgerError> {
    let too_large = LedgerError::AmountTooLarge {
        field: "subtotal",
        limit: Money::MAX_AMOUNT,
    };
    items.into_iter().try_fold(Money::ZERO, |total, item| {
        total
            .checked_add(item.line_total())
            .filter(|total| *total <= Money::MAX_AMOUNT)
            .ok_or_else(|| too_large.clone())
    })
}
