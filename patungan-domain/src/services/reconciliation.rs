use rust_decimal::Decimal;
use thiserror::Error;

use crate::{
    model::{BillAdjustments, Money, PersonSplit},
    services::AllocationContext,
};

/// Outcome of comparing the split against what was actually paid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub ok: bool,
    /// `total_payment` from the receipt.
    pub expected: Money,
    /// Σ rounded per-person totals.
    pub actual: Money,
    /// `actual - expected`.
    pub discrepancy: Money,
    pub tolerance: Money,
}

/// Non-fatal warning: the split does not add up to the payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("split totals {actual} differ from total payment {expected} by {discrepancy} (tolerance {tolerance})")]
pub struct ReconciliationMismatch {
    pub expected: Money,
    pub actual: Money,
    pub discrepancy: Money,
    pub tolerance: Money,
}

impl Reconciliation {
    pub fn mismatch(&self) -> Option<ReconciliationMismatch> {
        if self.ok {
            return None;
        }
        Some(ReconciliationMismatch {
            expected: self.expected,
            actual: self.actual,
            discrepancy: self.discrepancy,
            tolerance: self.tolerance,
        })
    }
}

/// Checks Σ totals against `total_payment`, allowing one atomic unit of drift per person.
pub fn verify(
    splits: &[PersonSplit],
    adjustments: &BillAdjustments,
    context: AllocationContext,
) -> Reconciliation {
    let tolerance = context.atomic_unit() * Decimal::from(splits.len());
    verify_with_tolerance(splits, adjustments, tolerance)
}

pub fn verify_with_tolerance(
    splits: &[PersonSplit],
    adjustments: &BillAdjustments,
    tolerance: Money,
) -> Reconciliation {
    let actual: Money = splits.iter().map(|split| split.total).sum();
    let expected = adjustments.total_payment;
    let discrepancy = actual - expected;
    let ok = discrepancy.abs() <= tolerance;

    if !ok {
        tracing::warn!(
            expected = %expected,
            actual = %actual,
            discrepancy = %discrepancy,
            tolerance = %tolerance,
            person_count = splits.len(),
            "Split totals do not reconcile with total payment"
        );
    }

    Reconciliation {
        ok,
        expected,
        actual,
        discrepancy,
        tolerance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn split(person: &str, total: i64) -> PersonSplit {
        PersonSplit {
            person: person.to_owned(),
            item_subtotal: Money::from_i64(total),
            adjustment_share: Money::ZERO,
            total: Money::from_i64(total),
            items: Vec::new(),
        }
    }

    fn paid(total_payment: i64) -> BillAdjustments {
        BillAdjustments {
            total_payment: Money::from_i64(total_payment),
            ..BillAdjustments::default()
        }
    }

    #[rstest]
    #[case::exact(&[20_000, 20_000], 40_000, true, 0)]
    #[case::rounding_drift_within_people(&[35, 35, 35], 104, true, 1)]
    #[case::drift_at_tolerance(&[34, 35], 67, true, 2)]
    #[case::drift_beyond_tolerance(&[34, 35], 66, false, 3)]
    #[case::under_allocated(&[25_500], 15_500, false, 10_000)]
    #[case::over_paid(&[100], 150, false, -50)]
    #[case::nobody(&[], 0, true, 0)]
    fn reconciliation_cases(
        #[case] totals: &[i64],
        #[case] total_payment: i64,
        #[case] ok: bool,
        #[case] discrepancy: i64,
    ) {
        let splits: Vec<PersonSplit> = totals
            .iter()
            .enumerate()
            .map(|(idx, total)| split(&format!("P{idx}"), *total))
            .collect();

        let result = verify(&splits, &paid(total_payment), AllocationContext::whole_units());

        assert_eq!(result.ok, ok);
        assert_eq!(result.discrepancy, Money::from_i64(discrepancy));
        assert_eq!(result.mismatch().is_some(), !ok);
    }

    #[test]
    fn tolerance_follows_the_currency_scale() {
        let cents = AllocationContext {
            scale: 2,
            ..AllocationContext::whole_units()
        };
        let splits = vec![split("A", 10), split("B", 10), split("C", 10)];

        let drifted = verify(&splits, &paid(28), cents);
        assert!(!drifted.ok);
        assert_eq!(drifted.tolerance, Money::from_decimal(Decimal::new(3, 2)));
        assert_eq!(drifted.discrepancy, Money::from_i64(2));

        let mut rounded = splits;
        rounded[0].total = Money::from_decimal(Decimal::new(1_003, 2));
        assert!(verify(&rounded, &paid(30), cents).ok);
    }

    #[test]
    fn explicit_tolerance_overrides_person_count() {
        let splits = vec![split("A", 105)];
        assert!(!verify_with_tolerance(&splits, &paid(100), Money::from_i64(4)).ok);
        assert!(verify_with_tolerance(&splits, &paid(100), Money::from_i64(5)).ok);
    }
}
