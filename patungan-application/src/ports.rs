use patungan_domain::{Assignment, BillAdjustments, Item, PersonSplit};

use crate::{
    error::{ParseFailure, RenderFailure},
    receipt::{ParsedData, ReceiptDocument},
    session::SessionId,
};

pub trait ReceiptParser: Send + Sync {
    fn parse(&self, document: &ReceiptDocument<'_>) -> Result<ParsedData, ParseFailure>;
}

/// Everything a summary renderer needs; splits are already computed.
pub struct RenderRequest<'a> {
    pub session_id: &'a SessionId,
    pub items: &'a [Item],
    pub assignments: &'a [Assignment],
    pub adjustments: &'a BillAdjustments,
    pub splits: &'a [PersonSplit],
}

pub trait SummaryRenderer: Send + Sync {
    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<u8>, RenderFailure>;

    /// File extension of the rendered document, without the dot.
    fn extension(&self) -> &'static str;
}
