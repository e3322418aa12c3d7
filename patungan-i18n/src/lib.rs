#[cfg(all(feature = "id", feature = "en"))]
compile_error!("Cannot enable both 'id' and 'en' features at the same time");

#[cfg(feature = "id")]
pub mod strings {
    pub const SPLIT_SUMMARY: &str = "Ringkasan Patungan";
    pub const PERSON: &str = "Nama";
    pub const ITEM: &str = "Item";
    pub const ITEMS: &str = "Pesanan";
    pub const QUANTITY: &str = "Jumlah";
    pub const UNIT_PRICE: &str = "Harga Satuan";
    pub const SUBTOTAL: &str = "Subtotal";
    pub const ADJUSTMENT_SHARE: &str = "Biaya & Diskon";
    pub const TOTAL: &str = "Total";
    pub const HANDLING_FEE: &str = "Biaya Penanganan";
    pub const OTHER_FEE: &str = "Biaya Lainnya";
    pub const DISCOUNT: &str = "Diskon";
    pub const DISCOUNT_PLUS: &str = "Diskon Plus";
    pub const TOTAL_PAYMENT: &str = "Total Pembayaran";
    pub const UNSUPPORTED_DOCUMENT: &str = "Silakan pilih file PDF";
    pub const NO_ITEMS: &str = "Struk ini tidak memiliki item";
    pub const NO_PEOPLE: &str = "Tambahkan minimal satu orang sebelum menghitung";
    pub const ZERO_QUANTITY: &str = "Jumlah item minimal 1";
    pub const EMPTY_PERSON_NAME: &str = "Nama tidak boleh kosong";
    pub const RENDER_FAILED: &str = "Gagal membuat ringkasan. Silakan coba lagi.";
}

#[cfg(feature = "en")]
pub mod strings {
    pub const SPLIT_SUMMARY: &str = "Split Summary";
    pub const PERSON: &str = "Person";
    pub const ITEM: &str = "Item";
    pub const ITEMS: &str = "Items";
    pub const QUANTITY: &str = "Qty";
    pub const UNIT_PRICE: &str = "Unit Price";
    pub const SUBTOTAL: &str = "Subtotal";
    pub const ADJUSTMENT_SHARE: &str = "Fees & Discounts";
    pub const TOTAL: &str = "Total";
    pub const HANDLING_FEE: &str = "Handling Fee";
    pub const OTHER_FEE: &str = "Other Fee";
    pub const DISCOUNT: &str = "Discount";
    pub const DISCOUNT_PLUS: &str = "Discount Plus";
    pub const TOTAL_PAYMENT: &str = "Total Payment";
    pub const UNSUPPORTED_DOCUMENT: &str = "Please select a PDF file";
    pub const NO_ITEMS: &str = "The receipt has no items";
    pub const NO_PEOPLE: &str = "Add at least one person before calculating";
    pub const ZERO_QUANTITY: &str = "Item quantity must be at least 1";
    pub const EMPTY_PERSON_NAME: &str = "Name must not be empty";
    pub const RENDER_FAILED: &str = "Failed to generate the summary. Please try again.";
}

#[cfg(not(any(feature = "id", feature = "en")))]
pub mod strings {
    pub const SPLIT_SUMMARY: &str = "Split Summary";
    pub const PERSON: &str = "Person";
    pub const ITEM: &str = "Item";
    pub const ITEMS: &str = "Items";
    pub const QUANTITY: &str = "Qty";
    pub const UNIT_PRICE: &str = "Unit Price";
    pub const SUBTOTAL: &str = "Subtotal";
    pub const ADJUSTMENT_SHARE: &str = "Fees & Discounts";
    pub const TOTAL: &str = "Total";
    pub const HANDLING_FEE: &str = "Handling Fee";
    pub const OTHER_FEE: &str = "Other Fee";
    pub const DISCOUNT: &str = "Discount";
    pub const DISCOUNT_PLUS: &str = "Discount Plus";
    pub const TOTAL_PAYMENT: &str = "Total Payment";
    pub const UNSUPPORTED_DOCUMENT: &str = "Please select a PDF file";
    pub const NO_ITEMS: &str = "The receipt has no items";
    pub const NO_PEOPLE: &str = "Add at least one person before calculating";
    pub const ZERO_QUANTITY: &str = "Item quantity must be at least 1";
    pub const EMPTY_PERSON_NAME: &str = "Name must not be empty";
    pub const RENDER_FAILED: &str = "Failed to generate the summary. Please try again.";
}

pub use strings::*;

use std::fmt::Display;

#[cfg(feature = "id")]
pub fn parse_failed(detail: impl Display) -> String {
    format!("Gagal membaca PDF: {detail}")
}

#[cfg(feature = "id")]
pub fn unknown_item(index: impl Display) -> String {
    format!("Item #{index} tidak ditemukan")
}

#[cfg(feature = "id")]
pub fn capacity_exceeded(item: impl Display, requested: u32, available: u32) -> String {
    format!("Tidak bisa mengambil {requested} dari {item}: tersisa {available}")
}

#[cfg(feature = "id")]
pub fn amount_too_large(field: impl Display, limit: impl Display) -> String {
    format!("{field} melebihi batas {limit}")
}

#[cfg(feature = "id")]
pub fn negative_amount(field: impl Display, amount: impl Display) -> String {
    format!("{field} tidak boleh negatif ({amount})")
}

#[cfg(feature = "id")]
pub fn incomplete_allocation(items: impl Display) -> String {
    format!("Masih ada item yang belum dibagi: {items}")
}

#[cfg(feature = "id")]
pub fn remaining_units(item: impl Display, remaining: u32) -> String {
    format!("{item} (sisa {remaining})")
}

#[cfg(feature = "en")]
pub fn parse_failed(detail: impl Display) -> String {
    format!("Failed to parse PDF: {detail}")
}

#[cfg(feature = "en")]
pub fn unknown_item(index: impl Display) -> String {
    format!("Item #{index} does not exist")
}

#[cfg(feature = "en")]
pub fn capacity_exceeded(item: impl Display, requested: u32, available: u32) -> String {
    format!("Cannot take {requested} of {item}: only {available} left")
}

#[cfg(feature = "en")]
pub fn amount_too_large(field: impl Display, limit: impl Display) -> String {
    format!("{field} exceeds the supported maximum of {limit}")
}

#[cfg(feature = "en")]
pub fn negative_amount(field: impl Display, amount: impl Display) -> String {
    format!("{field} must not be negative ({amount})")
}

#[cfg(feature = "en")]
pub fn incomplete_allocation(items: impl Display) -> String {
    format!("Some items still have unassigned units: {items}")
}

#[cfg(feature = "en")]
pub fn remaining_units(item: impl Display, remaining: u32) -> String {
    format!("{item} ({remaining} left)")
}

#[cfg(not(any(feature = "id", feature = "en")))]
pub fn parse_failed(detail: impl Display) -> String {
    format!("Failed to parse PDF: {detail}")
}

#[cfg(not(any(feature = "id", feature = "en")))]
pub fn unknown_item(index: impl Display) -> String {
    format!("Item #{index} does not exist")
}

#[cfg(not(any(feature = "id", feature = "en")))]
pub fn capacity_exceeded(item: impl Display, requested: u32, available: u32) -> String {
    format!("Cannot take {requested} of {item}: only {available} left")
}

#[cfg(not(any(feature = "id", feature = "en")))]
pub fn amount_too_large(field: impl Display, limit: impl Display) -> String {
    format!("{field} exceeds the supported maximum of {limit}")
}

#[cfg(not(any(feature = "id", feature = "en")))]
pub fn negative_amount(field: impl Display, amount: impl Display) -> String {
    format!("{field} must not be negative ({amount})")
}

#[cfg(not(any(feature = "id", feature = "en")))]
pub fn incomplete_allocation(items: impl Display) -> String {
    format!("Some items still have unassigned units: {items}")
}

#[cfg(not(any(feature = "id", feature = "en")))]
pub fn remaining_units(item: impl Display, remaining: u32) -> String {
    format!("{item} ({remaining} left)")
}

pub struct ReconciliationWarning<T> {
    expected: T,
    actual: T,
    discrepancy: T,
}

pub fn reconciliation_warning<T: Display>(
    expected: T,
    actual: T,
    discrepancy: T,
) -> ReconciliationWarning<T> {
    ReconciliationWarning {
        expected,
        actual,
        discrepancy,
    }
}

#[cfg(feature = "id")]
impl<T: Display> Display for ReconciliationWarning<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Perhatian: total pembagian {} berbeda {} dari total pembayaran {}. Periksa kembali data struk.",
            self.actual, self.discrepancy, self.expected
        )
    }
}

#[cfg(feature = "en")]
impl<T: Display> Display for ReconciliationWarning<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Warning: split totals {} differ by {} from the total payment {}. Please double-check the receipt data.",
            self.actual, self.discrepancy, self.expected
        )
    }
}

#[cfg(not(any(feature = "id", feature = "en")))]
impl<T: Display> Display for ReconciliationWarning<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Warning: split totals {} differ by {} from the total payment {}. Please double-check the receipt data.",
            self.actual, self.discrepancy, self.expected
        )
    }
}
