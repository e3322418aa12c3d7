#![warn(clippy::uninlined_format_args)]

pub mod bill;
pub mod error;
pub mod ledger;
pub mod model;
pub mod services;

pub use bill::{Bill, DeletedItem, ItemUpdate};
pub use error::{IncompleteAllocation, IncompleteItem, LedgerError};
pub use ledger::{AssignmentLedger, ItemLedger};
pub use model::{
    Assignment, BillAdjustments, IdlePeople, Item, ItemAvailability, ItemIndex, ItemPatch, Money,
    PersonSplit, Quantity, QuantityClamp,
};
pub use services::{
    AllocationContext, Reconciliation, ReconciliationMismatch, RoundingMode, SplitCalculator,
};
