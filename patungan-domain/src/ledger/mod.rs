mod assignment_ledger;
mod item_ledger;

pub use assignment_ledger::AssignmentLedger;
pub(crate) use assignment_ledger::normalize_person_name;
pub use item_ledger::ItemLedger;
