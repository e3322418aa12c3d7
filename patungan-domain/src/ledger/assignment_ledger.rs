use fxhash::FxHashMap;
use indexmap::IndexSet;

use crate::{
    error::LedgerError,
    model::{Assignment, ItemIndex, Quantity, QuantityClamp},
};

/// Who claims how many units of which item.
///
/// Records are kept in creation order. Accumulating into or overwriting a
/// record keeps its position, so the order doubles as the clamp order when an
/// item shrinks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AssignmentLedger {
    people: IndexSet<String>,
    records: Vec<Assignment>,
}

pub(crate) fn normalize_person_name(name: &str) -> Result<&str, LedgerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::EmptyPersonName);
    }
    Ok(trimmed)
}

impl AssignmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn people(&self) -> impl Iterator<Item = &str> + '_ {
        self.people.iter().map(String::as_str)
    }

    pub fn person_count(&self) -> usize {
        self.people.len()
    }

    pub fn contains_person(&self, name: &str) -> bool {
        self.people.contains(name.trim())
    }

    pub fn records(&self) -> &[Assignment] {
        &self.records
    }

    pub fn assignments_for<'a>(&'a self, person: &'a str) -> impl Iterator<Item = &'a Assignment> + 'a {
        self.records
            .iter()
            .filter(move |record| record.person == person)
    }

    pub fn quantity_held(&self, person: &str, index: ItemIndex) -> Quantity {
        self.position(person, index)
            .map(|pos| self.records[pos].quantity)
            .unwrap_or(0)
    }

    /// Σ quantity over every person's claim on `index`.
    pub fn assigned_quantity(&self, index: ItemIndex) -> Quantity {
        self.records
            .iter()
            .filter(|record| record.item_index == index)
            .map(|record| record.quantity)
            .sum()
    }

    pub fn assigned_by_item(&self) -> FxHashMap<ItemIndex, Quantity> {
        let mut totals = FxHashMap::default();
        for record in &self.records {
            *totals.entry(record.item_index).or_insert(0) += record.quantity;
        }
        totals
    }

    /// Registers a person. Returns `false` when the name is already taken.
    pub fn add_person(&mut self, name: &str) -> Result<bool, LedgerError> {
        let name = normalize_person_name(name)?;
        if self.people.contains(name) {
            return Ok(false);
        }
        self.people.insert(name.to_owned());
        Ok(true)
    }

    /// Drops a person together with every record they hold.
    pub fn remove_person(&mut self, name: &str) -> Vec<Assignment> {
        let name = name.trim();
        if !self.people.shift_remove(name) {
            return Vec::new();
        }
        let (removed, kept): (Vec<Assignment>, Vec<Assignment>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|record| record.person == name);
        self.records = kept;
        removed
    }

    pub fn unassign(&mut self, person: &str, index: ItemIndex) -> Option<Assignment> {
        let pos = self.position(person.trim(), index)?;
        Some(self.records.remove(pos))
    }

    /// Adds `quantity` units to the person's claim. `capacity` is the item's quantity.
    pub(crate) fn assign(
        &mut self,
        person: &str,
        index: ItemIndex,
        quantity: Quantity,
        capacity: Quantity,
    ) -> Result<Quantity, LedgerError> {
        let person = normalize_person_name(person)?;
        let available = capacity.saturating_sub(self.assigned_quantity(index));
        if quantity == 0 || quantity > available {
            return Err(LedgerError::CapacityExceeded {
                index,
                requested: quantity,
                available,
            });
        }

        self.register(person);
        match self.position(person, index) {
            Some(pos) => {
                self.records[pos].quantity += quantity;
                Ok(self.records[pos].quantity)
            }
            None => {
                self.records.push(Assignment {
                    person: person.to_owned(),
                    item_index: index,
                    quantity,
                });
                Ok(quantity)
            }
        }
    }

    /// Overwrites the person's claim. Zero removes it. Only units held by other
    /// people count against `capacity`.
    pub(crate) fn set_quantity(
        &mut self,
        person: &str,
        index: ItemIndex,
        quantity: Quantity,
        capacity: Quantity,
    ) -> Result<Quantity, LedgerError> {
        let person = normalize_person_name(person)?;
        let held_by_others = self.assigned_quantity(index) - self.quantity_held(person, index);
        let available = capacity.saturating_sub(held_by_others);
        if quantity > available {
            return Err(LedgerError::CapacityExceeded {
                index,
                requested: quantity,
                available,
            });
        }

        if quantity == 0 {
            self.unassign(person, index);
            return Ok(0);
        }

        self.register(person);
        match self.position(person, index) {
            Some(pos) => self.records[pos].quantity = quantity,
            None => self.records.push(Assignment {
                person: person.to_owned(),
                item_index: index,
                quantity,
            }),
        }
        Ok(quantity)
    }

    /// Cuts claims on `index` down to `capacity`, newest record first.
    pub(crate) fn clamp_item(&mut self, index: ItemIndex, capacity: Quantity) -> Vec<QuantityClamp> {
        let mut excess = self.assigned_quantity(index).saturating_sub(capacity);
        let mut clamps = Vec::new();

        for record in self.records.iter_mut().rev() {
            if excess == 0 {
                break;
            }
            if record.item_index != index {
                continue;
            }
            let cut = record.quantity.min(excess);
            let from = record.quantity;
            record.quantity -= cut;
            excess -= cut;
            clamps.push(QuantityClamp {
                person: record.person.clone(),
                item_index: index,
                from,
                to: record.quantity,
            });
        }

        self.records.retain(|record| record.quantity > 0);
        clamps
    }

    /// Drops every claim on `index` and shifts claims on later items down by one.
    pub(crate) fn remove_item(&mut self, index: ItemIndex) -> Vec<Assignment> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.records.len());

        for mut record in self.records.drain(..) {
            if record.item_index == index {
                removed.push(record);
                continue;
            }
            if record.item_index > index {
                record.item_index = ItemIndex(record.item_index.0 - 1);
            }
            kept.push(record);
        }

        self.records = kept;
        removed
    }

    fn register(&mut self, person: &str) {
        if !self.people.contains(person) {
            self.people.insert(person.to_owned());
        }
    }

    fn position(&self, person: &str, index: ItemIndex) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.person == person && record.item_index == index)
    }
}
