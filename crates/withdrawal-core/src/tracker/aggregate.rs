//! Farm and fleet roll-ups.
//!
//! Each aggregate captures `now` once and runs the same per-animal status pass
//! for every animal, so counts within one response always agree.

use chrono::{DateTime, Utc};

use super::{TrackerError, TrackerResult, WithdrawalTracker};
use crate::db::format_timestamp;
use crate::models::{
    AnimalStatus, AnimalStatusReport, FarmOverview, FarmStatus, FarmSummary, FleetSummary,
    UnsafeAnimal,
};

/// Totals from a reaper sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub animals_checked: usize,
    pub records_purged: usize,
    pub statuses_written: usize,
}

impl<'a> WithdrawalTracker<'a> {
    /// Dashboard summary for one farm.
    pub fn farm_summary(&self, farm_id: &str, now: DateTime<Utc>) -> TrackerResult<FarmSummary> {
        let animals = self.farm_animals(farm_id, now)?;
        let unsafe_animals = animals
            .iter()
            .filter(|r| r.status == AnimalStatus::Unsafe)
            .count();

        Ok(FarmSummary {
            farm_id: farm_id.to_string(),
            total_animals: animals.len(),
            unsafe_animals,
            status: FarmStatus::from_unsafe_count(unsafe_animals),
            animals,
        })
    }

    /// Every animal on a farm with its status checked at `now`, ordered by tag.
    pub fn farm_animals(
        &self,
        farm_id: &str,
        now: DateTime<Utc>,
    ) -> TrackerResult<Vec<AnimalStatusReport>> {
        if self.db.get_farm(farm_id)?.is_none() {
            return Err(TrackerError::FarmNotFound(farm_id.to_string()));
        }

        let mut animals = Vec::new();
        for animal in self.db.list_animals_for_farm(farm_id)? {
            animals.push(self.check_loaded(animal, now)?.report);
        }
        Ok(animals)
    }

    /// Counts across every farm.
    pub fn fleet_summary(&self, now: DateTime<Utc>) -> TrackerResult<FleetSummary> {
        let mut farms = Vec::new();
        let mut total_animals = 0;
        let mut unsafe_animals = 0;

        for farm in self.db.list_farms()? {
            let mut animal_count = 0;
            let mut unsafe_count = 0;
            for animal in self.db.list_animals_for_farm(&farm.id)? {
                let check = self.check_loaded(animal, now)?;
                animal_count += 1;
                if check.report.status == AnimalStatus::Unsafe {
                    unsafe_count += 1;
                }
            }
            total_animals += animal_count;
            unsafe_animals += unsafe_count;
            farms.push(FarmOverview {
                farm,
                animal_count,
                unsafe_count,
            });
        }

        tracing::debug!(
            "Fleet summary: {} farms, {} animals, {} unsafe",
            farms.len(),
            total_animals,
            unsafe_animals
        );

        Ok(FleetSummary {
            evaluated_at: format_timestamp(now),
            total_farms: farms.len(),
            total_animals,
            unsafe_animals,
            farms,
        })
    }

    /// Every animal currently under withdrawal, most recently flagged first.
    pub fn unsafe_animals(&self, now: DateTime<Utc>) -> TrackerResult<Vec<UnsafeAnimal>> {
        let mut unsafe_animals = Vec::new();
        for farm in self.db.list_farms()? {
            for animal in self.db.list_animals_for_farm(&farm.id)? {
                let report = self.check_loaded(animal, now)?.report;
                if report.status == AnimalStatus::Unsafe {
                    unsafe_animals.push(UnsafeAnimal {
                        report,
                        farm: farm.clone(),
                    });
                }
            }
        }

        unsafe_animals.sort_by(|a, b| {
            b.report
                .animal
                .status_updated_at
                .cmp(&a.report.animal.status_updated_at)
                .then_with(|| a.report.animal.tag.cmp(&b.report.animal.tag))
        });
        Ok(unsafe_animals)
    }

    /// Run a status pass over every animal, purging whatever has expired.
    ///
    /// Reads stay correct without this; it only moves purge work off the read path.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> TrackerResult<SweepReport> {
        let mut report = SweepReport::default();
        for animal in self.db.list_animals()? {
            let check = self.check_loaded(animal, now)?;
            report.animals_checked += 1;
            report.records_purged += check.outcome.purged;
            if check.outcome.status_written {
                report.statuses_written += 1;
            }
        }

        tracing::info!(
            "Sweep checked {} animals, purged {} records, wrote {} statuses",
            report.animals_checked,
            report.records_purged,
            report.statuses_written
        );
        Ok(report)
    }
}
