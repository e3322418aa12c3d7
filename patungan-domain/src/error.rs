use thiserror::Error;

use crate::model::{ItemIndex, Money, Quantity};

/// Rejected ledger mutation. The ledger is left unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("item #{index} does not exist")]
    UnknownItem { index: ItemIndex },
    #[error("cannot assign {requested} unit(s) of item #{index}: {available} available")]
    CapacityExceeded {
        index: ItemIndex,
        requested: Quantity,
        available: Quantity,
    },
    #[error("item quantity must be at least 1")]
    ZeroQuantity,
    #[error("unit price must not be negative (got {price})")]
    NegativePrice { price: Money },
    #[error("{field} must not be negative (got {amount})")]
    NegativeAdjustment { field: &'static str, amount: Money },
    #[error("{field} exceeds the supported maximum of {limit}")]
    AmountTooLarge { field: &'static str, limit: Money },
        #[error("person name must not be empty")]
    EmptyPersonName,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncompleteItem {
    pub index: ItemIndex,
    pub name: String,
    pub remaining: Quantity,
}

/// Raised when a split is finalized while units are still unassigned.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{} item(s) still have unassigned units", .items.len())]
pub struct IncompleteAllocation {
    pub items: Vec<IncompleteItem>,
}
