use crate::split_presenter::format_currency;
use patungan_application::{ParseFailure, RenderFailure, SessionError};
use patungan_domain::{IncompleteAllocation, Item, LedgerError, ReconciliationMismatch};
use patungan_i18n as i18n;

/// User-facing message for a rejected wizard operation. `items` resolves item names.
pub fn format_session_error(error: &SessionError, items: &[Item]) -> String {
    match error {
        SessionError::Parse(ParseFailure::UnsupportedDocument { .. }) => {
            i18n::UNSUPPORTED_DOCUMENT.to_owned()
        }
        SessionError::Parse(ParseFailure::InvalidReceipt { source }) => {
            i18n::parse_failed(format_ledger_error(source, items))
        }
        SessionError::Parse(failure) => i18n::parse_failed(failure),
        SessionError::Ledger(err) => format_ledger_error(err, items),
        SessionError::Incomplete(err) => format_incomplete_allocation(err),
        SessionError::Render(RenderFailure::Rasterise) => i18n::RENDER_FAILED.to_owned(),
        SessionError::Render(failure) => format!("{} ({failure})", i18n::RENDER_FAILED),
        SessionError::NoItems => i18n::NO_ITEMS.to_owned(),
        SessionError::NoPeople => i18n::NO_PEOPLE.to_owned(),
    }
}

pub fn format_ledger_error(error: &LedgerError, items: &[Item]) -> String {
    match error {
        LedgerError::UnknownItem { index } => i18n::unknown_item(index),
        LedgerError::CapacityExceeded {
            index,
            requested,
            available,
        } => match items.get(index.0) {
            Some(item) => i18n::capacity_exceeded(&item.name, *requested, *available),
            None => i18n::capacity_exceeded(format!("#{index}"), *requested, *available),
        },
        LedgerError::ZeroQuantity => i18n::ZERO_QUANTITY.to_owned(),
        LedgerError::NegativePrice { price } => {
            i18n::negative_amount(i18n::UNIT_PRICE, format_currency(*price))
        }
        LedgerError::NegativeAdjustment { field, amount } => {
            i18n::negative_amount(amount_label(field), format_currency(*amount))
        }
        LedgerError::AmountTooLarge { field, limit } => {
            i18n::amount_too_large(amount_label(field), format_currency(*limit))
        }
        LedgerError::EmptyPersonName => i18n::EMPTY_PERSON_NAME.to_owned(),
    }
}

pub fn format_reconciliation_warning(mismatch: &ReconciliationMismatch) -> String {
    i18n::reconciliation_warning(
        format_currency(mismatch.expected),
        format_currency(mismatch.actual),
        format_currency(mismatch.discrepancy),
    )
    .to_string()
}

fn format_incomplete_allocation(error: &IncompleteAllocation) -> String {
    let listing = error
        .items
        .iter()
        .map(|item| i18n::remaining_units(&item.name, item.remaining))
        .collect::<Vec<_>>()
        .join(", ");
    i18n::incomplete_allocation(listing)
}

fn amount_label(field: &str) -> &str {
    match field {
        "total_payment" => i18n::TOTAL_PAYMENT,
        "discount" => i18n::DISCOUNT,
        "discount_plus" => i18n::DISCOUNT_PLUS,
        "handling_fee" => i18n::HANDLING_FEE,
        "other_fee" => i18n::OTHER_FEE,
        "unit_price" => i18n::UNIT_PRICE,
        "subtotal" => i18n::SUBTOTAL,
        other => other,
    }
}
