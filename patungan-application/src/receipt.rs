use patungan_domain::{Bill, BillAdjustments, Item, LedgerError, Money};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// An uploaded receipt, borrowed for the duration of one parse.
pub struct ReceiptDocument<'a> {
    pub bytes: &'a [u8],
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
}

impl<'a> ReceiptDocument<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            filename: None,
            content_type: None,
        }
    }

    pub fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = Some(filename);
        self
    }

    pub fn with_content_type(mut self, content_type: &'a str) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Declared metadata wins; the magic bytes are only consulted when nothing is declared.
    pub fn is_pdf(&self) -> bool {
        if let Some(content_type) = self.content_type
            && content_type.to_ascii_lowercase().contains("pdf")
        {
            return true;
        }
        if let Some(filename) = self.filename
            && filename.to_ascii_lowercase().ends_with(".pdf")
        {
            return true;
        }
        self.content_type.is_none() && self.filename.is_none() && self.bytes.starts_with(PDF_MAGIC)
    }
}

/// What the parsing collaborator extracts from a receipt.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedData {
    pub items: Vec<Item>,
    /// Subtotal as printed on the receipt.
    pub total_price: Money,
    pub handling_fee: Money,
    pub other_fee: Money,
    pub discount: Money,
    pub discount_plus: Money,
    pub total_payment: Money,
}

impl ParsedData {
    pub fn adjustments(&self) -> BillAdjustments {
        BillAdjustments {
            total_payment: self.total_payment,
            discount: self.discount,
            discount_plus: self.discount_plus,
            handling_fee: self.handling_fee,
            other_fee: self.other_fee,
        }
    }

    pub fn items_subtotal(&self) -> Money {
        self.items.iter().map(Item::line_total).sum()
    }

    /// Whether the printed subtotal agrees with the extracted lines.
    pub fn subtotal_matches_items(&self) -> bool {
        self.total_price == self.items_subtotal()
    }

    pub fn to_bill(&self) -> Result<Bill, LedgerError> {
        Bill::new(self.items.clone(), self.adjustments())
    }
}
