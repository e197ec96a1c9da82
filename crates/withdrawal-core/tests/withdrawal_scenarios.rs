//! End-to-end withdrawal tracking scenarios against a real database.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use withdrawal_core::db::Database;
use withdrawal_core::models::{default_catalog, AnimalStatus, FarmStatus, WithdrawalUnit};
use withdrawal_core::tracker::{NewAnimal, TrackerError, WithdrawalTracker};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 8, 30, 0).unwrap()
}

fn seeded_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.seed_catalog_if_empty(&default_catalog()).unwrap();
    db
}

#[test]
fn test_antibiotic_withdrawal_lifecycle() {
    let db = seeded_db();
    let tracker = WithdrawalTracker::new(&db);
    let farm = tracker.create_farm("Hillside", None, None).unwrap();
    let cow = tracker
        .register_animal(&farm.id, NewAnimal::new("A-1", "cow", 4))
        .unwrap();

    tracker.record_usage_at("A-1", "Antibiotic X", None, t0()).unwrap();

    let during = tracker.check_animal(&cow.id, t0() + TimeDelta::days(9)).unwrap();
    assert_eq!(during.report.status, AnimalStatus::Unsafe);
    assert_eq!(during.report.remaining_time, 1);
    assert_eq!(during.report.remaining_unit, WithdrawalUnit::Days);

    let after = tracker
        .check_animal(&cow.id, t0() + TimeDelta::days(10) + TimeDelta::seconds(1))
        .unwrap();
    assert_eq!(after.report.status, AnimalStatus::Safe);
    assert_eq!(after.report.remaining_time, 0);
    assert!(tracker
        .list_usage_at(&cow.id, t0() + TimeDelta::days(10) + TimeDelta::seconds(1))
        .unwrap()
        .is_empty());
    assert_eq!(
        db.get_animal(&cow.id).unwrap().unwrap().status,
        AnimalStatus::Safe
    );
}

#[test]
fn test_window_closes_exactly_at_expiry() {
    let db = seeded_db();
    let tracker = WithdrawalTracker::new(&db);
    let farm = tracker.create_farm("Hillside", None, None).unwrap();
    let pig = tracker
        .register_animal(&farm.id, NewAnimal::new("P-1", "pig", 1))
        .unwrap();
    tracker.record_usage_at("P-1", "PainRelief Y", None, t0()).unwrap();

    let just_before = tracker
        .check_animal(&pig.id, t0() + TimeDelta::days(5) - TimeDelta::milliseconds(1))
        .unwrap();
    assert_eq!(just_before.report.status, AnimalStatus::Unsafe);
    assert_eq!(just_before.report.remaining_time, 1);

    let at_expiry = tracker.check_animal(&pig.id, t0() + TimeDelta::days(5)).unwrap();
    assert_eq!(at_expiry.report.status, AnimalStatus::Safe);
    assert_eq!(at_expiry.outcome.purged, 1);
}

#[test]
fn test_longest_window_wins_across_units() {
    let db = seeded_db();
    let tracker = WithdrawalTracker::new(&db);
    let farm = tracker.create_farm("Hillside", None, None).unwrap();
    let sheep = tracker
        .register_animal(&farm.id, NewAnimal::new("S-1", "sheep", 2))
        .unwrap();

    // Two days of test-class withdrawal outlasts one day of catalog withdrawal
    db.upsert_medicine(&withdrawal_core::MedicineStandard::new("Drench D", 1, &["sheep"]))
        .unwrap();
    tracker.record_usage_at("S-1", "Drench D", None, t0()).unwrap();
    tracker.record_usage_at("S-1", "Test 2880", None, t0()).unwrap();

    let check = tracker.check_animal(&sheep.id, t0() + TimeDelta::hours(1)).unwrap();
    assert_eq!(check.report.remaining_unit, WithdrawalUnit::Minutes);
    assert_eq!(check.report.remaining_time, 2820);

    // Once the day record lapses the minute record still holds the animal
    let check = tracker.check_animal(&sheep.id, t0() + TimeDelta::hours(30)).unwrap();
    assert_eq!(check.report.status, AnimalStatus::Unsafe);
    assert_eq!(check.outcome.purged, 1);
    assert_eq!(check.report.remaining_time, 18 * 60);
}

#[test]
fn test_resolution_fallbacks() {
    let db = seeded_db();
    let tracker = WithdrawalTracker::new(&db);
    let farm = tracker.create_farm("Hillside", None, None).unwrap();
    tracker
        .register_animal(&farm.id, NewAnimal::new("A-1", "cow", 4))
        .unwrap();

    // Catalog lookup is exact and case-sensitive
    assert!(matches!(
        tracker.record_usage_at("A-1", "antibiotic x", None, t0()),
        Err(TrackerError::UnrecognizedMedicine { .. })
    ));

    // Known medicine that does not apply to cows
    match tracker.record_usage_at("A-1", "Wormer A", None, t0()) {
        Err(TrackerError::UnrecognizedMedicine {
            name, animal_type, ..
        }) => {
            assert_eq!(name, "Wormer A");
            assert_eq!(animal_type, "cow");
        }
        other => panic!("unexpected result: {:?}", other),
    }

    // Test-class names resolve without a catalog entry
    let record = tracker
        .record_usage_at("A-1", "Field Test 45", None, t0())
        .unwrap();
    assert_eq!(record.withdrawal.unit, WithdrawalUnit::Minutes);
    assert_eq!(record.withdrawal.amount, 45);
}

#[test]
fn test_reads_are_idempotent() {
    let db = seeded_db();
    let tracker = WithdrawalTracker::new(&db);
    let farm = tracker.create_farm("Hillside", None, None).unwrap();
    for tag in ["G-1", "G-2"] {
        tracker
            .register_animal(&farm.id, NewAnimal::new(tag, "goat", 1))
            .unwrap();
    }
    tracker.record_usage_at("G-1", "Test 10", None, t0()).unwrap();
    tracker.record_usage_at("G-2", "Wormer A", None, t0()).unwrap();

    let now = t0() + TimeDelta::minutes(20);
    let first = tracker.farm_summary(&farm.id, now).unwrap();
    let second = tracker.farm_summary(&farm.id, now).unwrap();

    assert_eq!(first.unsafe_animals, 1);
    assert_eq!(first.status, FarmStatus::Attention);
    assert_eq!(first.unsafe_animals, second.unsafe_animals);
    for (a, b) in first.animals.iter().zip(&second.animals) {
        assert_eq!(a.status, b.status);
        assert_eq!(a.remaining_time, b.remaining_time);
        assert_eq!(a.animal.status_updated_at, b.animal.status_updated_at);
    }

    // Nothing left to purge or flip
    let sweep = tracker.sweep_expired(now).unwrap();
    assert_eq!(sweep.records_purged, 0);
    assert_eq!(sweep.statuses_written, 0);
}

#[test]
fn test_aggregates_agree_with_single_checks() {
    let db = seeded_db();
    let tracker = WithdrawalTracker::new(&db);
    let north = tracker.create_farm("North", None, None).unwrap();
    let south = tracker.create_farm("South", None, None).unwrap();
    tracker
        .register_animal(&north.id, NewAnimal::new("N-1", "cow", 3))
        .unwrap();
    tracker
        .register_animal(&south.id, NewAnimal::new("S-1", "pig", 1))
        .unwrap();
    tracker.record_usage_at("N-1", "Test 1", None, t0()).unwrap();
    tracker.record_usage_at("S-1", "PainRelief Y", None, t0()).unwrap();

    let now = t0() + TimeDelta::minutes(5);
    let fleet = tracker.fleet_summary(now).unwrap();
    let unsafe_list = tracker.unsafe_animals(now).unwrap();

    assert_eq!(fleet.total_animals, 2);
    assert_eq!(fleet.unsafe_animals, 1);
    assert_eq!(unsafe_list.len(), fleet.unsafe_animals);
    assert_eq!(unsafe_list[0].report.animal.tag, "S-1");
    assert_eq!(unsafe_list[0].farm.name, "South");
}

#[test]
fn test_delete_animal_removes_ledger() {
    let db = seeded_db();
    let tracker = WithdrawalTracker::new(&db);
    let farm = tracker.create_farm("Hillside", None, None).unwrap();
    let cow = tracker
        .register_animal(&farm.id, NewAnimal::new("A-1", "cow", 4))
        .unwrap();
    let record = tracker
        .record_usage_at("A-1", "Antibiotic X", None, t0())
        .unwrap();

    tracker.delete_animal(&cow.id).unwrap();

    assert!(db.get_usage(&record.id).unwrap().is_none());
    assert!(matches!(
        tracker.check_animal(&cow.id, t0()),
        Err(TrackerError::AnimalNotFound(_))
    ));
    // The tag is free again
    tracker
        .register_animal(&farm.id, NewAnimal::new("A-1", "cow", 1))
        .unwrap();
}

#[test]
fn test_ledger_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");

    let animal_id = {
        let db = Database::open(&path).unwrap();
        db.seed_catalog_if_empty(&default_catalog()).unwrap();
        let tracker = WithdrawalTracker::new(&db);
        let farm = tracker.create_farm("Hillside", None, None).unwrap();
        let cow = tracker
            .register_animal(&farm.id, NewAnimal::new("A-1", "cow", 4))
            .unwrap();
        tracker.record_usage_at("A-1", "Antibiotic X", None, t0()).unwrap();
        cow.id
    };

    let db = Database::open(&path).unwrap();
    let tracker = WithdrawalTracker::new(&db);
    let check = tracker
        .check_animal(&animal_id, t0() + TimeDelta::days(3))
        .unwrap();
    assert_eq!(check.report.status, AnimalStatus::Unsafe);
    assert_eq!(check.report.remaining_time, 7);
}
