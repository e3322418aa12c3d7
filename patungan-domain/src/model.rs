use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::error::LedgerError;

/// Number of units of one receipt line.
pub type Quantity = u32;

/// Currency amount in whole units of the receipt's currency.
///
/// Backed by a decimal so proportional shares stay exact until the final
/// rounding step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Ceiling for a unit price, the bill subtotal and each adjustment: 10^14.
    /// Under it, `net_adjustment × item_subtotal` stays inside `Decimal`'s range.
    pub const MAX_AMOUNT: Self = Self(Decimal::from_parts(0x107A_4000, 0x5AF3, 0, false, 0));

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_u64(value: u64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    /// Whole-unit value, if the amount has no fractional part.
    pub fn to_i64(self) -> Option<i64> {
        if self.0.fract() != Decimal::ZERO {
            return None;
        }
        self.0.to_i64()
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn signum(self) -> i64 {
        if self.0 > Decimal::ZERO {
            1
        } else if self.0 < Decimal::ZERO {
            -1
        } else {
            0
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Mul<Quantity> for Money {
    type Output = Self;

    fn mul(self, rhs: Quantity) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Position of an item in the item ledger.
///
/// Items are identified by position, not by name, since receipts repeat names.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemIndex(pub usize);

impl fmt::Display for ItemIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Item {
    pub name: String,
    pub quantity: Quantity,
    pub unit_price: Money,
}

impl Item {
    pub fn new(name: impl Into<String>, quantity: Quantity, unit_price: Money) -> Self {
        Self {
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }

    pub(crate) fn validate(&self) -> Result<(), LedgerError> {
        if self.quantity == 0 {
            return Err(LedgerError::ZeroQuantity);
        }
        if self.unit_price.is_negative() {
            return Err(LedgerError::NegativePrice {
                price: self.unit_price,
            });
        }
        if self.unit_price > Money::MAX_AMOUNT {
            return Err(LedgerError::AmountTooLarge {
                field: "unit_price",
                limit: Money::MAX_AMOUNT,
            });
        }
        Ok(())
    }
}

/// Partial edit of an item. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<Quantity>,
    pub unit_price: Option<Money>,
}

impl ItemPatch {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn quantity(mut self, quantity: Quantity) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn unit_price(mut self, unit_price: Money) -> Self {
        self.unit_price = Some(unit_price);
        self
    }

    pub(crate) fn apply_to(&self, item: &Item) -> Item {
        Item {
            name: self.name.clone().unwrap_or_else(|| item.name.clone()),
            quantity: self.quantity.unwrap_or(item.quantity),
            unit_price: self.unit_price.unwrap_or(item.unit_price),
        }
    }
}

/// Bill-scoped discounts and fees, plus the amount actually paid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BillAdjustments {
    pub total_payment: Money,
    pub discount: Money,
    pub discount_plus: Money,
    pub handling_fee: Money,
    pub other_fee: Money,
}

impl BillAdjustments {
    /// Fees minus discounts. Positive for a net fee, negative for a net discount.
    pub fn net_adjustment(&self) -> Money {
        self.handling_fee + self.other_fee - self.discount - self.discount_plus
    }

    pub fn total_discount(&self) -> Money {
        self.discount + self.discount_plus
    }

    pub(crate) fn validate(&self) -> Result<(), LedgerError> {
        let fields = [
            ("total_payment", self.total_payment),
            ("discount", self.discount),
            ("discount_plus", self.discount_plus),
            ("handling_fee", self.handling_fee),
            ("other_fee", self.other_fee),
        ];
        for (field, amount) in fields {
            if amount.is_negative() {
                return Err(LedgerError::NegativeAdjustment { field, amount });
            }
            if amount > Money::MAX_AMOUNT {
                return Err(LedgerError::AmountTooLarge {
                    field,
                    limit: Money::MAX_AMOUNT,
                });
            }
        }
        Ok(())
    }
}

/// One person's claim on some units of one item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub person: String,
    pub item_index: ItemIndex,
    pub quantity: Quantity,
}

/// Record of an assignment cut down after its item's quantity shrank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuantityClamp {
    pub person: String,
    pub item_index: ItemIndex,
    pub from: Quantity,
    pub to: Quantity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ItemAvailability {
    pub index: ItemIndex,
    pub quantity: Quantity,
    pub assigned: Quantity,
    pub available: Quantity,
}

/// What one person owes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersonSplit {
    pub person: String,
    /// Σ unit_price × quantity over the person's claims.
    pub item_subtotal: Money,
    /// Unrounded share of the net bill adjustment.
    pub adjustment_share: Money,
    /// Rounded amount owed.
    pub total: Money,
    pub items: Vec<Assignment>,
}

impl PersonSplit {
    pub fn is_idle(&self) -> bool {
        self.items.is_empty()
    }
}

/// Whether people without any claim appear in a finalized split.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IdlePeople {
    #[default]
    Exclude,
    Include,
}
