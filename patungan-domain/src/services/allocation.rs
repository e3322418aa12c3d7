//! Proportional allocation of bill-level adjustments.
//!
//! Every person pays for the units they claimed. Fees and discounts that apply
//! to the whole bill are then spread in proportion to each person's share of
//! the item subtotal:
//!
//! ```text
//! share(p) = net_adjustment × item_subtotal(p) / bill_subtotal
//! total(p) = round(item_subtotal(p) + share(p))
//! ```
//!
//! Shares are exact decimals and only the final total is rounded, so rounding
//! error never compounds.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::{
    ledger::{AssignmentLedger, ItemLedger},
    model::{Assignment, BillAdjustments, Money, PersonSplit},
};

/// Rounding mode for the final per-person total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (e.g., 0.5 -> 1, -0.5 -> -1).
    #[default]
    HalfUp,
    /// Round half to nearest even number (banker's rounding).
    HalfEven,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// How totals are quantized.
///
/// # Example
/// ```
/// use patungan_domain::services::{AllocationContext, RoundingMode};
///
/// let ctx = AllocationContext {
///     scale: 0, // whole Rupiah
///     rounding_mode: RoundingMode::HalfUp,
/// };
/// assert_eq!(ctx, AllocationContext::whole_units());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AllocationContext {
    /// Number of decimal places of the atomic unit (0 for IDR or JPY, 2 for USD).
    pub scale: u32,
    pub rounding_mode: RoundingMode,
}

impl AllocationContext {
    pub fn whole_units() -> Self {
        Self {
            scale: 0,
            rounding_mode: RoundingMode::HalfUp,
        }
    }

    pub fn atomic_unit(self) -> Money {
        Money::from_decimal(Decimal::new(1, self.scale))
    }

    pub fn round(self, amount: Money) -> Money {
        Money::from_decimal(
            amount
                .as_decimal()
                .round_dp_with_strategy(self.scale, self.rounding_mode.strategy()),
        )
    }
}

impl Default for AllocationContext {
    fn default() -> Self {
        Self::whole_units()
    }
}

/// A person's fraction of the item subtotal. Zero when the bill has no value.
pub fn proportion(item_subtotal: Money, bill_subtotal: Money) -> Decimal {
    if bill_subtotal.is_zero() {
        return Decimal::ZERO;
    }
    item_subtotal.as_decimal() / bill_subtotal.as_decimal()
}

/// Unrounded share of `net_adjustment` owed by a person with `item_subtotal`.
pub fn adjustment_share(item_subtotal: Money, bill_subtotal: Money, net_adjustment: Money) -> Money {
    if bill_subtotal.is_zero() {
        return Money::ZERO;
    }
    // Multiply before dividing to keep the quotient's precision for the result.
    Money::from_decimal(
        net_adjustment.as_decimal() * item_subtotal.as_decimal() / bill_subtotal.as_decimal(),
    )
}

/// Split calculation service
pub struct SplitCalculator;

impl SplitCalculator {
    /// Computes one [`PersonSplit`] per registered person, in registration order.
    ///
    /// People without claims are included with a zero total; callers filter
    /// them when finalizing.
    pub fn calculate(
        &self,
        items: &ItemLedger,
        assignments: &AssignmentLedger,
        adjustments: &BillAdjustments,
        context: AllocationContext,
    ) -> Vec<PersonSplit> {
        let bill_subtotal = items.subtotal();
        let net_adjustment = adjustments.net_adjustment();

        let splits: Vec<PersonSplit> = assignments
            .people()
            .map(|person| {
                let claims: Vec<Assignment> = assignments.assignments_for(person).cloned().collect();
                let item_subtotal: Money = claims
                    .iter()
                    .filter_map(|claim| {
                        items
                            .get(claim.item_index)
                            .map(|item| item.unit_price * claim.quantity)
                    })
                    .sum();
                let share = adjustment_share(item_subtotal, bill_subtotal, net_adjustment);

                PersonSplit {
                    person: person.to_owned(),
                    item_subtotal,
                    adjustment_share: share,
                    total: context.round(item_subtotal + share),
                    items: claims,
                }
            })
            .collect();

        tracing::debug!(
            person_count = splits.len(),
            item_count = items.len(),
            bill_subtotal = %bill_subtotal,
            net_adjustment = %net_adjustment,
            scale = context.scale,
            rounding_mode = ?context.rounding_mode,
            "Split computed"
        );

        splits
    }
}

/// Pure form of [`SplitCalculator::calculate`].
pub fn compute_split(
    items: &ItemLedger,
    assignments: &AssignmentLedger,
    adjustments: &BillAdjustments,
    context: AllocationContext,
) -> Vec<PersonSplit> {
    SplitCalculator.calculate(items, assignments, adjustments, context)
}
