pub mod allocation;
pub mod reconciliation;

pub use allocation::{
    AllocationContext, RoundingMode, SplitCalculator, adjustment_share, compute_split, proportion,
};
pub use reconciliation::{Reconciliation, ReconciliationMismatch, verify, verify_with_tolerance};
