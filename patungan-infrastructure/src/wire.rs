//! JSON shapes exchanged with the parsing service and split clients.
//!
//! Amounts are whole currency units on the wire.

use patungan_application::{ParseFailure, ParsedData, SessionId, SplitSession};
use patungan_domain::{
    AllocationContext, Assignment, Bill, BillAdjustments, Item, ItemIndex, LedgerError, Money,
    PersonSplit, Quantity,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDto {
    pub name: String,
    pub quantity: Quantity,
    pub unit_price: i64,
}

impl From<ItemDto> for Item {
    fn from(dto: ItemDto) -> Self {
        Item::new(dto.name, dto.quantity, Money::from_i64(dto.unit_price))
    }
}

impl From<&Item> for ItemDto {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: whole_units(item.unit_price),
        }
    }
}

/// Response body of the parsing service. Labels missing from the receipt come back as 0.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResponseDto {
    pub items: Vec<ItemDto>,
    #[serde(default)]
    pub total_price: i64,
    #[serde(default)]
    pub handling_fee: i64,
    #[serde(default)]
    pub other_fee: i64,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub discount_plus: i64,
    #[serde(default)]
    pub total_payment: i64,
}

impl From<ParseResponseDto> for ParsedData {
    fn from(dto: ParseResponseDto) -> Self {
        ParsedData {
            items: dto.items.into_iter().map(Item::from).collect(),
            total_price: Money::from_i64(dto.total_price),
            handling_fee: Money::from_i64(dto.handling_fee),
            other_fee: Money::from_i64(dto.other_fee),
            discount: Money::from_i64(dto.discount),
            discount_plus: Money::from_i64(dto.discount_plus),
            total_payment: Money::from_i64(dto.total_payment),
        }
    }
}

pub fn parse_service_response(body: &[u8]) -> Result<ParsedData, ParseFailure> {
    let dto: ParseResponseDto =
        serde_json::from_slice(body).map_err(|err| ParseFailure::Malformed {
            detail: err.to_string(),
        })?;
    if dto.items.is_empty() {
        return Err(ParseFailure::Malformed {
            detail: "no items found on the receipt".to_owned(),
        });
    }
    Ok(dto.into())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAssignmentDto {
    pub item_index: usize,
    pub quantity: Quantity,
}

impl From<&Assignment> for ItemAssignmentDto {
    fn from(assignment: &Assignment) -> Self {
        Self {
            item_index: assignment.item_index.0,
            quantity: assignment.quantity,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonAssignmentDto {
    pub name: String,
    pub items: Vec<ItemAssignmentDto>,
}

/// A whole bill with its claims, as a split client submits it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRequestDto {
    pub session_id: String,
    pub items: Vec<ItemDto>,
    pub assignments: Vec<PersonAssignmentDto>,
    #[serde(default)]
    pub total_payment: i64,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub discount_plus: i64,
    #[serde(default)]
    pub handling_fee: i64,
    #[serde(default)]
    pub other_fee: i64,
}

impl SplitRequestDto {
    /// Request skeleton for a freshly parsed receipt; nobody has claimed anything yet.
    pub fn from_parsed(session_id: &SessionId, parsed: &ParsedData) -> Self {
        Self {
            session_id: session_id.to_string(),
            items: parsed.items.iter().map(ItemDto::from).collect(),
            assignments: Vec::new(),
            total_payment: whole_units(parsed.total_payment),
            discount: whole_units(parsed.discount),
            discount_plus: whole_units(parsed.discount_plus),
            handling_fee: whole_units(parsed.handling_fee),
            other_fee: whole_units(parsed.other_fee),
        }
    }

    pub fn adjustments(&self) -> BillAdjustments {
        BillAdjustments {
            total_payment: Money::from_i64(self.total_payment),
            discount: Money::from_i64(self.discount),
            discount_plus: Money::from_i64(self.discount_plus),
            handling_fee: Money::from_i64(self.handling_fee),
            other_fee: Money::from_i64(self.other_fee),
        }
    }

    /// Rebuilds the bill, replaying every claim so capacity is enforced as if
    /// the claims had been made one by one.
    pub fn into_bill(self) -> Result<Bill, LedgerError> {
        let adjustments = self.adjustments();
        let items = self.items.into_iter().map(Item::from).collect();
        let mut bill = Bill::new(items, adjustments)?;

        for person in &self.assignments {
            bill.add_person(&person.name)?;
            for claim in &person.items {
                bill.assign(&person.name, ItemIndex(claim.item_index), claim.quantity)?;
            }
        }

        tracing::debug!(
            item_count = bill.list_items().len(),
            person_count = bill.assignments().person_count(),
            "Split request replayed"
        );
        Ok(bill)
    }

    pub fn into_session(self, context: AllocationContext) -> Result<SplitSession, LedgerError> {
        let id = SessionId::from(self.session_id.clone());
        let bill = self.into_bill()?;
        Ok(SplitSession::resume(id, bill, context))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSplitDto {
    pub name: String,
    pub total: i64,
    pub items: Vec<ItemAssignmentDto>,
}

impl From<&PersonSplit> for PersonSplitDto {
    fn from(split: &PersonSplit) -> Self {
        Self {
            name: split.person.clone(),
            total: whole_units(split.total),
            items: split.items.iter().map(ItemAssignmentDto::from).collect(),
        }
    }
}

/// Amount in whole units, rounding half away from zero when it is fractional.
/// Amounts past the `i64` range saturate.
fn whole_units(amount: Money) -> i64 {
    AllocationContext::whole_units()
        .round(amount)
        .to_i64()
        .unwrap_or_else(|| {
            let saturated = if amount.is_negative() { i64::MIN } else { i64::MAX };
            tracing::warn!(%amount, saturated, "Amount does not fit the wire format");
            saturated
        })
}
