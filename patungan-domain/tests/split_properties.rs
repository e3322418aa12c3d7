use patungan_domain::{
    AllocationContext, Bill, BillAdjustments, IdlePeople, Item, ItemIndex, Money,
    services::{adjustment_share, verify},
};
use proptest::prelude::*;
use rust_decimal::Decimal;

const PEOPLE: [&str; 5] = ["Ayu", "Budi", "Citra", "Dewi", "Eko"];

#[derive(Clone, Debug)]
enum Op {
    Assign { person: usize, item: usize, quantity: u32 },
    SetQuantity { person: usize, item: usize, quantity: u32 },
    Unassign { person: usize, item: usize },
    RemovePerson { person: usize },
    Shrink { item: usize, quantity: u32 },
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..5, 0usize..6, 0u32..=4).prop_map(|(person, item, quantity)| Op::Assign {
            person,
            item,
            quantity
        }),
        (0usize..5, 0usize..6, 0u32..=4).prop_map(|(person, item, quantity)| Op::SetQuantity {
            person,
            item,
            quantity
        }),
        (0usize..5, 0usize..6).prop_map(|(person, item)| Op::Unassign { person, item }),
        (0usize..5).prop_map(|person| Op::RemovePerson { person }),
        (0usize..6, 0u32..=4).prop_map(|(item, quantity)| Op::Shrink { item, quantity }),
    ]
}

fn build_bill(lines: &[(u32, u64)], adjustments: BillAdjustments) -> Bill {
    let items = lines
        .iter()
        .enumerate()
        .map(|(idx, (quantity, price))| Item::new(format!("Item {idx}"), *quantity, Money::from_u64(*price)))
        .collect();
    Bill::new(items, adjustments).expect("generated bill is valid")
}

/// Hands every unit of every item to people in round-robin order.
fn assign_everything(bill: &mut Bill, people: usize) {
    let quantities: Vec<u32> = bill.list_items().iter().map(|item| item.quantity).collect();
    let mut turn = 0usize;
    for (idx, quantity) in quantities.into_iter().enumerate() {
        for _ in 0..quantity {
            bill.increment(PEOPLE[turn % people], ItemIndex(idx))
                .expect("unit is available");
            turn += 1;
        }
    }
}

fn adjustments_strategy() -> impl Strategy<Value = (u64, u64, u64, u64)> {
    (0u64..=5_000, 0u64..=5_000, 0u64..=3_000, 0u64..=3_000)
}

proptest! {
    #[test]
    fn capacity_invariant_holds_after_any_mutation_sequence(
        lines in prop::collection::vec((1u32..=4, 0u64..=50_000), 1..=6),
        ops in prop::collection::vec(op_strategy(), 0..=60),
    ) {
        let mut bill = build_bill(&lines, BillAdjustments::default());

        for op in ops {
            let item_count = bill.list_items().len();
            match op {
                Op::Assign { person, item, quantity } => {
                    let _ = bill.assign(PEOPLE[person], ItemIndex(item % item_count), quantity);
                }
                Op::SetQuantity { person, item, quantity } => {
                    let _ = bill.set_quantity(PEOPLE[person], ItemIndex(item % item_count), quantity);
                }
                Op::Unassign { person, item } => {
                    bill.unassign(PEOPLE[person], ItemIndex(item % item_count));
                }
                Op::RemovePerson { person } => {
                    bill.remove_person(PEOPLE[person]);
                }
                Op::Shrink { item, quantity } => {
                    let patch = patungan_domain::ItemPatch::default().quantity(quantity.max(1));
                    let _ = bill.update_item(ItemIndex(item % item_count), &patch);
                }
            }

            for entry in bill.availability() {
                prop_assert!(entry.assigned <= entry.quantity);
                prop_assert_eq!(entry.assigned + entry.available, entry.quantity);
            }
        }
    }

    #[test]
    fn complete_allocation_reconciles_with_consistent_payment(
        lines in prop::collection::vec((1u32..=4, 1u64..=50_000), 1..=6),
        people in 1usize..=5,
        scale in 0u32..=2,
        (handling_fee, other_fee, discount, discount_plus) in adjustments_strategy(),
    ) {
        let subtotal: u64 = lines.iter().map(|(quantity, price)| u64::from(*quantity) * price).sum();
        let fees = handling_fee + other_fee;
        let discounts = (discount + discount_plus).min(subtotal + fees);
        let total_payment = subtotal + fees - discounts;
        let adjustments = BillAdjustments {
            total_payment: Money::from_u64(total_payment),
            discount: Money::from_u64(discounts),
            discount_plus: Money::ZERO,
            handling_fee: Money::from_u64(handling_fee),
            other_fee: Money::from_u64(other_fee),
        };
        let mut bill = build_bill(&lines, adjustments);
        assign_everything(&mut bill, people);

        let context = AllocationContext {
            scale,
            ..AllocationContext::whole_units()
        };
        let splits = bill
            .finalize_split(context, IdlePeople::Exclude)
            .expect("every unit is assigned");
        let reconciliation = verify(&splits, bill.adjustments(), context);

        prop_assert!(reconciliation.ok, "discrepancy {}", reconciliation.discrepancy);
        prop_assert_eq!(
            reconciliation.tolerance,
            context.atomic_unit() * Decimal::from(splits.len())
        );
    }

    #[test]
    fn adjustment_shares_follow_subtotal_ratio(
        subtotal_a in 1u64..=100_000,
        subtotal_b in 1u64..=100_000,
        net in -20_000i64..=20_000,
    ) {
        let bill_subtotal = Money::from_u64(subtotal_a + subtotal_b);
        let net = Money::from_i64(net);
        let share_a = adjustment_share(Money::from_u64(subtotal_a), bill_subtotal, net);
        let share_b = adjustment_share(Money::from_u64(subtotal_b), bill_subtotal, net);

        // share_a × Sb == share_b × Sa, up to decimal precision.
        let lhs = share_a.as_decimal() * Decimal::from(subtotal_b);
        let rhs = share_b.as_decimal() * Decimal::from(subtotal_a);
        prop_assert!((lhs - rhs).abs() < Decimal::new(1, 12));
        prop_assert!(((share_a + share_b) - net).abs().as_decimal() < Decimal::new(1, 12));
    }

    #[test]
    fn recomputation_is_idempotent(
        lines in prop::collection::vec((1u32..=4, 0u64..=50_000), 1..=6),
        people in 1usize..=5,
        (handling_fee, other_fee, discount, discount_plus) in adjustments_strategy(),
    ) {
        let adjustments = BillAdjustments {
            total_payment: Money::ZERO,
            discount: Money::from_u64(discount),
            discount_plus: Money::from_u64(discount_plus),
            handling_fee: Money::from_u64(handling_fee),
            other_fee: Money::from_u64(other_fee),
        };
        let mut bill = build_bill(&lines, adjustments);
        assign_everything(&mut bill, people);

        let first = bill.preview_split(AllocationContext::whole_units());
        let second = bill.preview_split(AllocationContext::whole_units());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn removing_a_person_frees_exactly_their_units(
        lines in prop::collection::vec((1u32..=4, 0u64..=50_000), 1..=6),
        people in 2usize..=5,
        victim in 0usize..5,
    ) {
        let mut bill = build_bill(&lines, BillAdjustments::default());
        assign_everything(&mut bill, people);
        let victim = PEOPLE[victim % people];

        let before = bill.availability();
        let removed = bill.remove_person(victim);
        let after = bill.availability();

        for (old, new) in before.iter().zip(&after) {
            let freed: u32 = removed
                .iter()
                .filter(|record| record.item_index == old.index)
                .map(|record| record.quantity)
                .sum();
            prop_assert_eq!(new.available, old.available + freed);
        }
        prop_assert!(removed.iter().all(|record| record.person == victim));
        prop_assert!(bill.assignments().assignments_for(victim).next().is_none());
    }
}
