use crate::svg_table::{Alignment, SvgTableBuilder, combine_svgs_vertically};
use patungan_application::RenderRequest;
use patungan_domain::{Assignment, BillAdjustments, Item, Money, PersonSplit};
use patungan_i18n as i18n;
use std::{borrow::Cow, fmt::Write};

const CURRENCY_PREFIX: &str = "Rp";

/// Formats an amount the way Indonesian receipts print it: `Rp25.500`, `-Rp1.250,5`.
pub fn format_currency(amount: Money) -> String {
    let digits = amount.abs().as_decimal().normalize().to_string();
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits.as_str(), None),
    };

    let mut out = String::with_capacity(digits.len() + 6);
    if amount.is_negative() {
        out.push('-');
    }
    out.push_str(CURRENCY_PREFIX);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            out.push('.');
        }
        out.push(digit);
    }
    if let Some(fraction) = fraction {
        out.push(',');
        out.push_str(fraction);
    }
    out
}

pub struct SplitSummaryPresenter;

pub struct SplitSummaryView {
    pub bill_table_svg: String,
    pub person_table_svg: String,
}

impl SplitSummaryView {
    /// Both tables in one document, bill first.
    pub fn combined_svg(&self) -> Option<String> {
        combine_svgs_vertically(&[&self.bill_table_svg, &self.person_table_svg])
    }
}

impl SplitSummaryPresenter {
    pub fn render(request: &RenderRequest<'_>) -> SplitSummaryView {
        SplitSummaryView {
            bill_table_svg: Self::build_bill_table_svg(request.items, request.adjustments),
            person_table_svg: Self::build_person_table_svg(request.splits, request.items),
        }
    }

    pub fn build_bill_table_svg(items: &[Item], adjustments: &BillAdjustments) -> String {
        let mut builder = SvgTableBuilder::new()
            .caption(i18n::SPLIT_SUMMARY)
            .alignments(&[
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(i18n::ITEM),
                Cow::Borrowed(i18n::QUANTITY),
                Cow::Borrowed(i18n::UNIT_PRICE),
                Cow::Borrowed(i18n::SUBTOTAL),
            ]);

        for item in items {
            builder = builder.row([
                Cow::Borrowed(item.name.as_str()),
                Cow::Owned(item.quantity.to_string()),
                Cow::Owned(format_currency(item.unit_price)),
                Cow::Owned(format_currency(item.line_total())),
            ]);
        }

        let fees = [
            (i18n::HANDLING_FEE, adjustments.handling_fee),
            (i18n::OTHER_FEE, adjustments.other_fee),
        ];
        let discounts = [
            (i18n::DISCOUNT, adjustments.discount),
            (i18n::DISCOUNT_PLUS, adjustments.discount_plus),
        ];
        for (label, amount) in fees {
            if !amount.is_zero() {
                builder = builder.row(summary_row(label, amount));
            }
        }
        for (label, amount) in discounts {
            if !amount.is_zero() {
                builder = builder.row(summary_row(label, -amount));
            }
        }

        builder
            .footer_row(summary_row(i18n::TOTAL_PAYMENT, adjustments.total_payment))
            .build()
    }

    pub fn build_person_table_svg(splits: &[PersonSplit], items: &[Item]) -> String {
        let mut builder = SvgTableBuilder::new()
            .alignments(&[
                Alignment::Left,
                Alignment::Left,
                Alignment::Right,
                Alignment::Right,
                Alignment::Right,
            ])
            .headers(&[
                Cow::Borrowed(i18n::PERSON),
                Cow::Borrowed(i18n::ITEMS),
                Cow::Borrowed(i18n::SUBTOTAL),
                Cow::Borrowed(i18n::ADJUSTMENT_SHARE),
                Cow::Borrowed(i18n::TOTAL),
            ]);

        for split in splits {
            builder = builder.row([
                Cow::Borrowed(split.person.as_str()),
                Cow::Owned(describe_claims(&split.items, items)),
                Cow::Owned(format_currency(split.item_subtotal)),
                Cow::Owned(format_currency(split.total - split.item_subtotal)),
                Cow::Owned(format_currency(split.total)),
            ]);
        }

        let total: Money = splits.iter().map(|split| split.total).sum();
        builder
            .footer_row([
                Cow::Borrowed(i18n::TOTAL),
                Cow::Borrowed(""),
                Cow::Borrowed(""),
                Cow::Borrowed(""),
                Cow::Owned(format_currency(total)),
            ])
            .build()
    }

    /// Plain-text rendition for terminals.
    pub fn render_text(splits: &[PersonSplit], items: &[Item]) -> String {
        let name_width = splits
            .iter()
            .map(|split| split.person.chars().count())
            .max()
            .unwrap_or(0)
            .max(i18n::PERSON.len());

        let mut out = String::new();
        for split in splits {
            let _ = writeln!(
                &mut out,
                "{:<name_width$}  {:>14}  {}",
                split.person,
                format_currency(split.total),
                describe_claims(&split.items, items)
            );
        }
        let total: Money = splits.iter().map(|split| split.total).sum();
        let _ = write!(
            &mut out,
            "{:<name_width$}  {:>14}",
            i18n::TOTAL,
            format_currency(total)
        );
        out
    }
}

fn summary_row(label: &str, amount: Money) -> [Cow<'_, str>; 4] {
    [
        Cow::Borrowed(label),
        Cow::Borrowed(""),
        Cow::Borrowed(""),
        Cow::Owned(format_currency(amount)),
    ]
}

fn describe_claims(claims: &[Assignment], items: &[Item]) -> String {
    claims
        .iter()
        .map(|claim| {
            let name = items
                .get(claim.item_index.0)
                .map(|item| item.name.as_str())
                .unwrap_or("?");
            format!("{name} ×{}", claim.quantity)
        })
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use patungan_application::SessionId;
    use patungan_domain::ItemIndex;
    use rstest::rstest;

    fn rp(value: i64) -> Money {
        Money::from_i64(value)
    }

    fn items() -> Vec<Item> {
        vec![
            Item::new("Nasi Goreng", 2, rp(25_000)),
            Item::new("Es Teh", 1, rp(5_000)),
        ]
    }

    fn splits() -> Vec<PersonSplit> {
        vec![
            PersonSplit {
                person: "Ayu".into(),
                item_subtotal: rp(25_000),
                adjustment_share: rp(-1_000),
                total: rp(24_000),
                items: vec![Assignment {
                    person: "Ayu".into(),
                    item_index: ItemIndex(0),
                    quantity: 1,
                }],
            },
            PersonSplit {
                person: "Budi".into(),
                item_subtotal: rp(30_000),
                adjustment_share: rp(-1_200),
                total: rp(28_800),
                items: vec![
                    Assignment {
                        person: "Budi".into(),
                        item_index: ItemIndex(0),
                        quantity: 1,
                    },
                    Assignment {
                        person: "Budi".into(),
                        item_index: ItemIndex(1),
                        quantity: 1,
                    },
                ],
            },
        ]
    }

    #[rstest]
    #[case::zero(0, "Rp0")]
    #[case::hundreds(500, "Rp500")]
    #[case::thousands(25_500, "Rp25.500")]
    #[case::millions(1_250_000, "Rp1.250.000")]
    #[case::negative(-2_200, "-Rp2.200")]
    fn currency_uses_dot_grouping(#[case] amount: i64, #[case] expected: &str) {
        assert_eq!(format_currency(rp(amount)), expected);
    }

    #[test]
    fn fractional_amounts_use_a_decimal_comma() {
        let amount = rp(12_345) + Money::from_decimal("0.50".parse().expect("decimal"));
        assert_eq!(format_currency(amount), "Rp12.345,5");
    }

    #[test]
    fn summary_lists_items_adjustments_and_people() {
        let items = items();
        let splits = splits();
        let adjustments = BillAdjustments {
            total_payment: rp(52_800),
            discount: rp(2_200),
            ..BillAdjustments::default()
        };
        let session_id = SessionId::from("1718000000000".to_owned());
        let request = RenderRequest {
            session_id: &session_id,
            items: &items,
            assignments: &[],
            adjustments: &adjustments,
            splits: &splits,
        };

        let view = SplitSummaryPresenter::render(&request);

        assert!(view.bill_table_svg.contains("Nasi Goreng"));
        assert!(view.bill_table_svg.contains("-Rp2.200"));
        assert!(view.bill_table_svg.contains("Rp52.800"));
        assert!(!view.bill_table_svg.contains(i18n::HANDLING_FEE));
        assert!(view.person_table_svg.contains("Nasi Goreng ×1, Es Teh ×1"));
        assert!(view.person_table_svg.contains("Rp28.800"));
        assert!(view.person_table_svg.contains("-Rp1.200"));

        let combined = view.combined_svg().expect("combined svg");
        assert!(combined.contains("Ayu"));
        assert!(combined.contains(i18n::TOTAL_PAYMENT));
    }

    #[test]
    fn text_summary_ends_with_grand_total() {
        let text = SplitSummaryPresenter::render_text(&splits(), &items());

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Ayu"));
        assert!(lines[0].contains("Rp24.000"));
        assert!(lines[2].contains("Rp52.800"));
    }
}
