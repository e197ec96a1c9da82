//! Property tests for the status engine.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use withdrawal_core::engine::evaluate;
use withdrawal_core::models::{Animal, AnimalStatus, UsageRecord, WithdrawalDuration, WithdrawalUnit};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

fn animal() -> Animal {
    Animal::new("A-1".into(), "cow".into(), 3, "farm-1".into())
}

/// (is_days, amount, minutes after t0 the dose was given)
fn record_strategy() -> impl Strategy<Value = (bool, u32, i64)> {
    (any::<bool>(), 0u32..40, 0i64..(60 * 24 * 30))
}

fn build_records(animal: &Animal, specs: &[(bool, u32, i64)]) -> Vec<UsageRecord> {
    specs
        .iter()
        .enumerate()
        .map(|(i, &(is_days, amount, offset))| {
            let withdrawal = if is_days {
                WithdrawalDuration::days(amount)
            } else {
                WithdrawalDuration::minutes(amount * 60)
            };
            UsageRecord::new(
                animal.id.clone(),
                format!("Medicine {}", i),
                withdrawal,
                t0() + TimeDelta::minutes(offset),
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_record_order_does_not_matter(
        specs in prop::collection::vec(record_strategy(), 0..12),
        now_minutes in 0i64..(60 * 24 * 60),
        rotate in 0usize..12,
    ) {
        let animal = animal();
        let records = build_records(&animal, &specs);
        let now = t0() + TimeDelta::minutes(now_minutes);

        let mut shuffled = records.clone();
        shuffled.reverse();
        if !shuffled.is_empty() {
            let k = rotate % shuffled.len();
            shuffled.rotate_left(k);
        }

        let a = evaluate(now, &animal, &records);
        let b = evaluate(now, &animal, &shuffled);

        prop_assert_eq!(a.status, b.status);
        prop_assert_eq!(a.remaining, b.remaining);
        prop_assert_eq!(a.active_records, b.active_records);

        let mut expired_a = a.expired.clone();
        let mut expired_b = b.expired.clone();
        expired_a.sort();
        expired_b.sort();
        prop_assert_eq!(expired_a, expired_b);
    }

    #[test]
    fn prop_time_only_closes_windows(
        specs in prop::collection::vec(record_strategy(), 1..12),
        earlier in 0i64..(60 * 24 * 40),
        step in 0i64..(60 * 24 * 20),
    ) {
        let animal = animal();
        let records = build_records(&animal, &specs);
        let first = evaluate(t0() + TimeDelta::minutes(earlier), &animal, &records);
        let later = evaluate(t0() + TimeDelta::minutes(earlier + step), &animal, &records);

        // Anything expired stays expired
        for id in &first.expired {
            prop_assert!(later.expired.contains(id));
        }
        prop_assert!(later.active_records <= first.active_records);

        let first_delta = first.remaining.map(|r| r.delta).unwrap_or(TimeDelta::zero());
        let later_delta = later.remaining.map(|r| r.delta).unwrap_or(TimeDelta::zero());
        prop_assert!(later_delta <= first_delta);
    }

    #[test]
    fn prop_status_matches_open_windows(
        specs in prop::collection::vec(record_strategy(), 0..12),
        now_minutes in 0i64..(60 * 24 * 60),
    ) {
        let animal = animal();
        let records = build_records(&animal, &specs);
        let now = t0() + TimeDelta::minutes(now_minutes);
        let eval = evaluate(now, &animal, &records);

        let open = records.iter().filter(|r| !r.is_expired_at(now)).count();
        prop_assert_eq!(eval.active_records, open);
        prop_assert_eq!(eval.expired.len(), records.len() - open);
        if open > 0 {
            prop_assert_eq!(eval.status, AnimalStatus::Unsafe);
            prop_assert!(eval.remaining_time() > 0);
        } else {
            prop_assert_eq!(eval.status, AnimalStatus::Safe);
            prop_assert_eq!(eval.remaining_time(), 0);
        }
    }

    #[test]
    fn prop_exact_tie_reports_days(days in 1u32..30, minutes_first in any::<bool>()) {
        let animal = animal();
        let day_record = UsageRecord::new(
            animal.id.clone(),
            "Antibiotic X".into(),
            WithdrawalDuration::days(days),
            t0(),
        );
        let minute_record = UsageRecord::new(
            animal.id.clone(),
            "Test".into(),
            WithdrawalDuration::minutes(days * 24 * 60),
            t0(),
        );
        let records = if minutes_first {
            vec![minute_record, day_record]
        } else {
            vec![day_record, minute_record]
        };

        let eval = evaluate(t0() + TimeDelta::hours(1), &animal, &records);
        prop_assert_eq!(eval.remaining_unit(), WithdrawalUnit::Days);
        prop_assert_eq!(eval.remaining_time(), u64::from(days));
    }
}
