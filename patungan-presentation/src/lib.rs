#![warn(clippy::uninlined_format_args)]

pub mod error_presenter;
pub mod split_presenter;
pub mod svg_table;

pub use error_presenter::{format_ledger_error, format_reconciliation_warning, format_session_error};
pub use split_presenter::{SplitSummaryPresenter, SplitSummaryView, format_currency};
