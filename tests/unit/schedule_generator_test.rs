use chrono::{Datelike, Duration, NaiveDate};
use landledger::modules::contracts::models::{Contract, NewContract, SaleType};
use landledger::modules::installments::models::{InstallmentKind, InstallmentStatus};
use landledger::modules::installments::services::ScheduleGenerator;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn financed_contract(
    amount: Decimal,
    count: i32,
    first: NaiveDate,
    balloon: Option<(Decimal, NaiveDate)>,
) -> Contract {
    Contract::new(NewContract {
        property_id: "lot-7".to_string(),
        buyer_name: "Rosa Vance".to_string(),
        buyer_email: None,
        buyer_phone: None,
        sale_type: SaleType::Cfd,
        sale_price: dec!(30000.00),
        installment_amount: Some(amount),
        installment_count: Some(count),
        first_installment_date: Some(first),
        balloon_amount: balloon.map(|(a, _)| a),
        balloon_date: balloon.map(|(_, d)| d),
        tax_parcel_number: None,
        annual_property_tax: None,
    })
    .expect("contract input should be valid")
}

/// A schedule anchored on January 31 clamps short months without
/// drifting later due dates off the anchor day
#[test]
fn test_january_31_anchor_clamps_february() {
    let contract = financed_contract(dec!(250.00), 3, date(2025, 1, 31), None);

    let schedule = ScheduleGenerator::generate(&contract, date(2025, 1, 1)).unwrap();

    let dues: Vec<NaiveDate> = schedule.iter().map(|i| i.due_date).collect();
    assert_eq!(
        dues,
        vec![date(2025, 1, 31), date(2025, 2, 28), date(2025, 3, 31)]
    );
}

/// A 35-payment contract produces numbers 1..=35, all regular, all at
/// the contract amount
#[test]
fn test_thirty_five_payment_schedule() {
    let contract = financed_contract(dec!(195.00), 35, date(2025, 5, 25), None);

    let schedule = ScheduleGenerator::generate(&contract, date(2025, 5, 25)).unwrap();

    assert_eq!(schedule.len(), 35);
    for (i, installment) in schedule.iter().enumerate() {
        assert_eq!(installment.installment_number, i as i32 + 1);
        assert_eq!(installment.amount, dec!(195.00));
        assert_eq!(installment.kind, InstallmentKind::Regular);
        assert_eq!(installment.contract_id, contract.id);
        assert_eq!(installment.property_id, "lot-7");
    }
    assert_eq!(schedule[34].due_date, date(2028, 3, 25));
}

/// An installment due before the as-of date backfills as paid, one due
/// exactly on the as-of date stays pending
#[test]
fn test_as_of_date_is_exclusive() {
    let contract = financed_contract(
        dec!(195.00),
        1,
        date(2025, 5, 25),
        Some((dec!(5000.00), date(2025, 6, 1))),
    );

    let schedule = ScheduleGenerator::generate(&contract, date(2025, 6, 1)).unwrap();

    assert_eq!(schedule[0].due_date, date(2025, 5, 25));
    assert_eq!(schedule[0].status, InstallmentStatus::Paid);
    assert_eq!(schedule[1].due_date, date(2025, 6, 1));
    assert_eq!(schedule[1].status, InstallmentStatus::Pending);
}

/// Backfilled paid installments carry no received date; only recorded
/// payments set one
#[test]
fn test_backfill_leaves_paid_on_empty() {
    let contract = financed_contract(dec!(195.00), 6, date(2024, 1, 15), None);

    let schedule = ScheduleGenerator::generate(&contract, date(2024, 4, 1)).unwrap();

    assert!(schedule.iter().all(|i| i.paid_on.is_none()));
    assert_eq!(
        schedule
            .iter()
            .filter(|i| i.status == InstallmentStatus::Paid)
            .count(),
        3
    );
}

/// The balloon follows the regulars at the next number with its own
/// stored due date, not a computed one
#[test]
fn test_balloon_schedule_layout() {
    let contract = financed_contract(
        dec!(400.00),
        24,
        date(2025, 3, 10),
        Some((dec!(12000.00), date(2027, 3, 31))),
    );

    let schedule = ScheduleGenerator::generate(&contract, date(2025, 3, 1)).unwrap();

    assert_eq!(schedule.len(), 25);

    let balloon = schedule.last().unwrap();
    assert_eq!(balloon.installment_number, 25);
    assert_eq!(balloon.kind, InstallmentKind::Balloon);
    assert_eq!(balloon.due_date, date(2027, 3, 31));
    assert_eq!(balloon.amount, dec!(12000.00));

    assert!(schedule[..24]
        .iter()
        .all(|i| i.kind == InstallmentKind::Regular));
}

/// Generation is a pure function of contract and as-of date
#[test]
fn test_generation_is_deterministic() {
    let contract = financed_contract(dec!(310.50), 12, date(2025, 8, 31), None);
    let as_of = date(2025, 11, 30);

    let first_run = ScheduleGenerator::generate(&contract, as_of).unwrap();
    let second_run = ScheduleGenerator::generate(&contract, as_of).unwrap();

    assert_eq!(first_run.len(), second_run.len());
    for (a, b) in first_run.iter().zip(second_run.iter()) {
        assert_eq!(a.installment_number, b.installment_number);
        assert_eq!(a.due_date, b.due_date);
        assert_eq!(a.amount, b.amount);
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.status, b.status);
    }
}

proptest! {
    /// Property: the schedule always has exactly the contracted count of
    /// regulars, numbered 1..=count with no gaps
    #[test]
    fn prop_count_and_numbering(
        year in 2020i32..2035,
        month in 1u32..=12,
        day in 1u32..=28,
        count in 1i32..=72,
        cents in 1u64..=500_000,
    ) {
        let first = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let amount = Decimal::from(cents) / Decimal::from(100);
        let contract = financed_contract(amount, count, first, None);

        let schedule = ScheduleGenerator::generate(&contract, first).unwrap();

        prop_assert_eq!(schedule.len(), count as usize);
        for (i, installment) in schedule.iter().enumerate() {
            prop_assert_eq!(installment.installment_number, i as i32 + 1);
        }
    }

    /// Property: for anchor days that exist in every month, each due date
    /// keeps the anchor day and advances exactly one calendar month
    #[test]
    fn prop_monthly_cadence_preserves_safe_days(
        year in 2020i32..2035,
        month in 1u32..=12,
        day in 1u32..=28,
        count in 1i32..=48,
    ) {
        let first = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let contract = financed_contract(dec!(195.00), count, first, None);

        let schedule = ScheduleGenerator::generate(&contract, first).unwrap();

        for (i, installment) in schedule.iter().enumerate() {
            let months_from_anchor = (installment.due_date.year() - first.year()) * 12
                + installment.due_date.month() as i32
                - first.month() as i32;
            prop_assert_eq!(months_from_anchor, i as i32, "due date must advance one month per step");
            prop_assert_eq!(installment.due_date.day(), day, "anchor day must be preserved");
        }
    }

    /// Property: regular due dates are strictly increasing
    #[test]
    fn prop_due_dates_strictly_increase(
        year in 2020i32..2035,
        month in 1u32..=12,
        day in 1u32..=31,
        count in 2i32..=60,
    ) {
        prop_assume!(NaiveDate::from_ymd_opt(year, month, day).is_some());
        let first = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let contract = financed_contract(dec!(195.00), count, first, None);

        let schedule = ScheduleGenerator::generate(&contract, first).unwrap();

        for pair in schedule.windows(2) {
            prop_assert!(pair[0].due_date < pair[1].due_date);
        }
    }

    /// Property: status is paid exactly when the due date is strictly
    /// before the as-of date
    #[test]
    fn prop_status_partition_matches_as_of(
        year in 2020i32..2035,
        month in 1u32..=12,
        day in 1u32..=28,
        count in 1i32..=48,
        offset_days in -800i64..1500,
    ) {
        let first = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let as_of = first + Duration::days(offset_days);
        let contract = financed_contract(dec!(195.00), count, first, None);

        let schedule = ScheduleGenerator::generate(&contract, as_of).unwrap();

        for installment in &schedule {
            let expected = if installment.due_date < as_of {
                InstallmentStatus::Paid
            } else {
                InstallmentStatus::Pending
            };
            prop_assert_eq!(installment.status, expected);
        }
    }

    /// Property: a balloon always lands at count + 1 with its verbatim date
    #[test]
    fn prop_balloon_is_last_and_verbatim(
        year in 2020i32..2032,
        month in 1u32..=12,
        day in 1u32..=28,
        count in 1i32..=48,
        balloon_cents in 1u64..=5_000_000,
        balloon_offset_days in 0i64..4000,
    ) {
        let first = NaiveDate::from_ymd_opt(year, month, day).unwrap();
        let balloon_date = first + Duration::days(balloon_offset_days);
        let balloon_amount = Decimal::from(balloon_cents) / Decimal::from(100);
        let contract = financed_contract(
            dec!(195.00),
            count,
            first,
            Some((balloon_amount, balloon_date)),
        );

        let schedule = ScheduleGenerator::generate(&contract, first).unwrap();

        prop_assert_eq!(schedule.len(), count as usize + 1);

        let balloon = schedule.last().unwrap();
        prop_assert_eq!(balloon.installment_number, count + 1);
        prop_assert_eq!(balloon.kind, InstallmentKind::Balloon);
        prop_assert_eq!(balloon.due_date, balloon_date);
    }
}
