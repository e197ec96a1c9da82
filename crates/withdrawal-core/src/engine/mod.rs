//! Withdrawal status engine.
//!
//! A pure function of `(now, animal, usage records)`. It decides whether the
//! animal is SAFE or UNSAFE, how long the longest open withdrawal window has
//! left, and which records have fully elapsed and must be purged. Callers apply
//! the result with compute-then-diff-then-write: records are only deleted when
//! flagged, and the cached status is only written when it changed.
//!
//! `now` is captured once per pass and shared by every record (and by every
//! animal in an aggregate pass), so a record can never count as both open and
//! expired within one response.

mod remaining;

pub use remaining::*;

use chrono::{DateTime, Utc};

use crate::models::{Animal, AnimalStatus, UsageRecord, WithdrawalUnit};

/// Result of one status pass over one animal.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusEvaluation {
    /// Evaluated animal
    pub animal_id: String,
    /// The `now` this pass was evaluated at
    pub evaluated_at: DateTime<Utc>,
    /// Status cached on the animal before this pass
    pub previous_status: AnimalStatus,
    /// Status derived from the ledger
    pub status: AnimalStatus,
    /// Longest open window, `None` when safe
    pub remaining: Option<RemainingTime>,
    /// Records whose window has fully elapsed, to be deleted
    pub expired: Vec<String>,
    /// Number of records with an open window
    pub active_records: usize,
}

impl StatusEvaluation {
    /// Whether the cached status must be rewritten.
    pub fn status_changed(&self) -> bool {
        self.previous_status != self.status
    }

    /// Whether applying this evaluation needs any persistence write.
    pub fn needs_write(&self) -> bool {
        self.status_changed() || !self.expired.is_empty()
    }

    /// Remaining time in whole display units (0 when safe).
    pub fn remaining_time(&self) -> u64 {
        self.remaining.map(|r| r.display_value()).unwrap_or(0)
    }

    /// Display unit of `remaining_time`. Days when safe.
    pub fn remaining_unit(&self) -> WithdrawalUnit {
        self.remaining
            .map(|r| r.unit)
            .unwrap_or(WithdrawalUnit::Days)
    }
}

/// Evaluate an animal's withdrawal status at `now`.
///
/// Record order does not affect the result.
pub fn evaluate(now: DateTime<Utc>, animal: &Animal, records: &[UsageRecord]) -> StatusEvaluation {
    let mut expired = Vec::new();
    let mut remaining: Option<RemainingTime> = None;
    let mut active_records = 0;

    for record in records {
        let expiry = record.expires_at();
        if now >= expiry {
            expired.push(record.id.clone());
            continue;
        }

        active_records += 1;
        let candidate = RemainingTime {
            delta: expiry - now,
            unit: record.withdrawal.unit,
        };
        if remaining.map_or(true, |best| candidate.outranks(&best)) {
            remaining = Some(candidate);
        }
    }

    let status = if active_records > 0 {
        AnimalStatus::Unsafe
    } else {
        AnimalStatus::Safe
    };

    StatusEvaluation {
        animal_id: animal.id.clone(),
        evaluated_at: now,
        previous_status: animal.status,
        status,
        remaining,
        expired,
        active_records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WithdrawalDuration;
    use chrono::{TimeDelta, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap()
    }

    fn cow() -> Animal {
        Animal::new("A-1".into(), "cow".into(), 3, "farm-1".into())
    }

    fn record(animal: &Animal, name: &str, withdrawal: WithdrawalDuration, at: DateTime<Utc>) -> UsageRecord {
        UsageRecord::new(animal.id.clone(), name.into(), withdrawal, at)
    }

    #[test]
    fn test_no_records_is_safe() {
        let animal = cow();
        let eval = evaluate(t0(), &animal, &[]);

        assert_eq!(eval.status, AnimalStatus::Safe);
        assert_eq!(eval.remaining_time(), 0);
        assert_eq!(eval.remaining_unit(), WithdrawalUnit::Days);
        assert!(!eval.needs_write());
    }

    #[test]
    fn test_scenario_antibiotic_x() {
        let animal = cow();
        let records = vec![record(&animal, "Antibiotic X", WithdrawalDuration::days(10), t0())];

        let eval = evaluate(t0() + TimeDelta::days(9), &animal, &records);
        assert_eq!(eval.status, AnimalStatus::Unsafe);
        assert_eq!(eval.remaining_time(), 1);
        assert_eq!(eval.remaining_unit(), WithdrawalUnit::Days);
        assert!(eval.expired.is_empty());
        assert!(eval.status_changed());

        let eval = evaluate(t0() + TimeDelta::days(10) + TimeDelta::seconds(1), &animal, &records);
        assert_eq!(eval.status, AnimalStatus::Safe);
        assert_eq!(eval.expired, vec![records[0].id.clone()]);
    }

    #[test]
    fn test_expires_exactly_at_boundary() {
        let animal = cow();
        let records = vec![record(&animal, "Test 1", WithdrawalDuration::minutes(1), t0())];

        let before = evaluate(t0() + TimeDelta::seconds(59), &animal, &records);
        assert_eq!(before.status, AnimalStatus::Unsafe);
        assert_eq!(before.remaining_time(), 1);
        assert_eq!(before.remaining_unit(), WithdrawalUnit::Minutes);

        let at = evaluate(t0() + TimeDelta::minutes(1), &animal, &records);
        assert_eq!(at.status, AnimalStatus::Safe);
        assert_eq!(at.expired.len(), 1);
    }

    #[test]
    fn test_unit_tie_break_uses_magnitude() {
        let animal = cow();
        let now = t0();
        let records = vec![
            record(&animal, "Test 500", WithdrawalDuration::minutes(500), now),
            record(&animal, "PainRelief Y", WithdrawalDuration::days(5), now - TimeDelta::days(3)),
        ];

        let eval = evaluate(now, &animal, &records);
        assert_eq!(eval.status, AnimalStatus::Unsafe);
        assert_eq!(eval.remaining_unit(), WithdrawalUnit::Days);
        assert_eq!(eval.remaining_time(), 2);
        assert_eq!(eval.active_records, 2);
    }

    #[test]
    fn test_minute_record_wins_when_longer() {
        let animal = cow();
        let now = t0();
        let records = vec![
            record(&animal, "Antibiotic X", WithdrawalDuration::days(10), now - TimeDelta::days(10) + TimeDelta::hours(1)),
            record(&animal, "Test 90", WithdrawalDuration::minutes(90), now),
        ];

        let eval = evaluate(now, &animal, &records);
        assert_eq!(eval.remaining_unit(), WithdrawalUnit::Minutes);
        assert_eq!(eval.remaining_time(), 90);
    }

    #[test]
    fn test_expired_record_contributes_nothing() {
        let animal = cow();
        let now = t0();
        let old = record(&animal, "Wormer A", WithdrawalDuration::days(14), now - TimeDelta::days(30));
        let open = record(&animal, "Test 5", WithdrawalDuration::minutes(5), now);

        let eval = evaluate(now, &animal, &[old.clone(), open]);
        assert_eq!(eval.expired, vec![old.id]);
        assert_eq!(eval.remaining_time(), 5);
        assert_eq!(eval.remaining_unit(), WithdrawalUnit::Minutes);
    }

    #[test]
    fn test_zero_day_medicine_is_expired_immediately() {
        let animal = cow();
        let records = vec![record(&animal, "Vitamin Z", WithdrawalDuration::days(0), t0())];

        let eval = evaluate(t0(), &animal, &records);
        assert_eq!(eval.status, AnimalStatus::Safe);
        assert_eq!(eval.expired.len(), 1);
    }

    #[test]
    fn test_unchanged_status_needs_no_write() {
        let mut animal = cow();
        animal.status = AnimalStatus::Unsafe;
        let records = vec![record(&animal, "Antibiotic X", WithdrawalDuration::days(10), t0())];

        let eval = evaluate(t0() + TimeDelta::days(1), &animal, &records);
        assert!(!eval.status_changed());
        assert!(!eval.needs_write());
    }

    #[test]
    fn test_stale_unsafe_flips_to_safe() {
        let mut animal = cow();
        animal.status = AnimalStatus::Unsafe;

        let eval = evaluate(t0(), &animal, &[]);
        assert_eq!(eval.previous_status, AnimalStatus::Unsafe);
        assert_eq!(eval.status, AnimalStatus::Safe);
        assert!(eval.status_changed());
    }
}
