use crate::{
    error::{IncompleteAllocation, IncompleteItem, LedgerError},
    ledger::{AssignmentLedger, ItemLedger, normalize_person_name},
    model::{
        Assignment, BillAdjustments, IdlePeople, Item, ItemAvailability, ItemIndex, ItemPatch,
        Money, PersonSplit, Quantity, QuantityClamp,
    },
    services::{AllocationContext, SplitCalculator},
};

/// Items, claims and bill-level adjustments of one receipt.
///
/// Every mutation keeps the capacity invariant: for each item, the units
/// claimed across all people never exceed the item's quantity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bill {
    items: ItemLedger,
    assignments: AssignmentLedger,
    adjustments: BillAdjustments,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemUpdate {
    pub item: Item,
    pub clamps: Vec<QuantityClamp>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeletedItem {
    pub item: Item,
    pub removed_assignments: Vec<Assignment>,
}

impl Bill {
    pub fn new(items: Vec<Item>, adjustments: BillAdjustments) -> Result<Self, LedgerError> {
        adjustments.validate()?;
        Ok(Self {
            items: ItemLedger::from_items(items)?,
            assignments: AssignmentLedger::new(),
            adjustments,
        })
    }

    pub fn items(&self) -> &ItemLedger {
        &self.items
    }

    pub fn list_items(&self) -> &[Item] {
        self.items.items()
    }

    pub fn assignments(&self) -> &AssignmentLedger {
        &self.assignments
    }

    pub fn adjustments(&self) -> &BillAdjustments {
        &self.adjustments
    }

    pub fn people(&self) -> impl Iterator<Item = &str> + '_ {
        self.assignments.people()
    }

    pub fn set_adjustments(&mut self, adjustments: BillAdjustments) -> Result<(), LedgerError> {
        adjustments.validate()?;
        self.adjustments = adjustments;
        Ok(())
    }

    pub fn add_item(&mut self, item: Item) -> Result<ItemIndex, LedgerError> {
        self.items.push(item)
    }

    /// Edits an item. Shrinking below the claimed units clamps the newest
    /// claims on that item first.
    pub fn update_item(
        &mut self,
        index: ItemIndex,
        patch: &ItemPatch,
    ) -> Result<ItemUpdate, LedgerError> {
        self.items.patch(index, patch)?;
        let item = self.items.require(index)?.clone();
        let clamps = self.assignments.clamp_item(index, item.quantity);

        for clamp in &clamps {
            tracing::warn!(
                item_index = %index,
                person = %clamp.person,
                from = clamp.from,
                to = clamp.to,
                item_quantity = item.quantity,
                "Assignment clamped after item quantity shrank"
            );
        }

        Ok(ItemUpdate { item, clamps })
    }

    /// Removes an item and every claim on it. Later items move down one position.
    pub fn delete_item(&mut self, index: ItemIndex) -> Result<DeletedItem, LedgerError> {
        let item = self.items.remove(index)?;
        let removed_assignments = self.assignments.remove_item(index);
        if !removed_assignments.is_empty() {
            tracing::debug!(
                item_index = %index,
                removed = removed_assignments.len(),
                "Assignments removed with deleted item"
            );
        }
        Ok(DeletedItem {
            item,
            removed_assignments,
        })
    }

    pub fn add_person(&mut self, name: &str) -> Result<bool, LedgerError> {
        self.assignments.add_person(name)
    }

    pub fn remove_person(&mut self, name: &str) -> Vec<Assignment> {
        self.assignments.remove_person(name)
    }

    /// Claims `quantity` more units for `person`. Returns the units now held.
    pub fn assign(
        &mut self,
        person: &str,
        index: ItemIndex,
        quantity: Quantity,
    ) -> Result<Quantity, LedgerError> {
        let capacity = self.items.require(index)?.quantity;
        self.assignments
            .assign(person, index, quantity, capacity)
            .inspect_err(|err| tracing::debug!(%err, person, item_index = %index, "Assignment rejected"))
    }

    /// Sets the units `person` holds; zero drops the claim.
    pub fn set_quantity(
        &mut self,
        person: &str,
        index: ItemIndex,
        quantity: Quantity,
    ) -> Result<Quantity, LedgerError> {
        let capacity = self.items.require(index)?.quantity;
        self.assignments
            .set_quantity(person, index, quantity, capacity)
            .inspect_err(|err| tracing::debug!(%err, person, item_index = %index, "Quantity change rejected"))
    }

    pub fn unassign(&mut self, person: &str, index: ItemIndex) -> Option<Assignment> {
        self.assignments.unassign(person, index)
    }

    pub fn increment(&mut self, person: &str, index: ItemIndex) -> Result<Quantity, LedgerError> {
        self.assign(person, index, 1)
    }

    /// Gives back one unit. A person holding nothing is left as is.
    pub fn decrement(&mut self, person: &str, index: ItemIndex) -> Result<Quantity, LedgerError> {
        let person = normalize_person_name(person)?;
        self.items.require(index)?;
        let held = self.assignments.quantity_held(person, index);
        if held == 0 {
            return Ok(0);
        }
        self.set_quantity(person, index, held - 1)
    }

    pub fn available_quantity(&self, index: ItemIndex) -> Result<Quantity, LedgerError> {
        let item = self.items.require(index)?;
        let assigned = self.assignments.assigned_quantity(index);
        debug_assert!(assigned <= item.quantity);
        Ok(item.quantity.saturating_sub(assigned))
    }

    pub fn availability(&self) -> Vec<ItemAvailability> {
        let assigned_by_item = self.assignments.assigned_by_item();
        self.items
            .iter()
            .map(|(index, item)| {
                let assigned = assigned_by_item.get(&index).copied().unwrap_or(0);
                ItemAvailability {
                    index,
                    quantity: item.quantity,
                    assigned,
                    available: item.quantity.saturating_sub(assigned),
                }
            })
            .collect()
    }

    pub fn incomplete_items(&self) -> Vec<IncompleteItem> {
        self.availability()
            .into_iter()
            .filter(|entry| entry.available > 0)
            .filter_map(|entry| {
                self.items.get(entry.index).map(|item| IncompleteItem {
                    index: entry.index,
                    name: item.name.clone(),
                    remaining: entry.available,
                })
            })
            .collect()
    }

    pub fn is_fully_assigned(&self) -> bool {
        self.availability().iter().all(|entry| entry.available == 0)
    }

    pub fn bill_subtotal(&self) -> Money {
        self.items.subtotal()
    }

    /// What the payment should be if the receipt is internally consistent.
    pub fn expected_payment(&self) -> Money {
        self.bill_subtotal() + self.adjustments.net_adjustment()
    }

    /// Provisional split over the current claims, every registered person included.
    pub fn preview_split(&self, context: AllocationContext) -> Vec<PersonSplit> {
        SplitCalculator.calculate(&self.items, &self.assignments, &self.adjustments, context)
    }

    /// Authoritative split. Only available once every unit is claimed.
    pub fn finalize_split(
        &self,
        context: AllocationContext,
        idle: IdlePeople,
    ) -> Result<Vec<PersonSplit>, IncompleteAllocation> {
        let incomplete = self.incomplete_items();
        if !incomplete.is_empty() {
            tracing::debug!(
                incomplete_count = incomplete.len(),
                "Split finalization blocked by unassigned units"
            );
            return Err(IncompleteAllocation { items: incomplete });
        }

        let mut splits = self.preview_split(context);
        if idle == IdlePeople::Exclude {
            splits.retain(|split| !split.is_idle());
        }
        Ok(splits)
    }
}
