//! Registry and usage ledger writes.

use chrono::{DateTime, SubsecRound, Utc};

use super::{TrackerError, TrackerResult, WithdrawalTracker};
use crate::db::{format_timestamp, DbError};
use crate::models::{Animal, AnimalStatus, Farm, MedicineStandard, UsageRecord};
use crate::resolver::MedicineResolver;

/// Fields needed to register an animal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnimal {
    pub tag: String,
    pub animal_type: String,
    pub age: u32,
    pub weight_kg: Option<f64>,
}

impl NewAnimal {
    /// Create registration fields without a weight.
    pub fn new(tag: impl Into<String>, animal_type: impl Into<String>, age: u32) -> Self {
        Self {
            tag: tag.into(),
            animal_type: animal_type.into(),
            age,
            weight_kg: None,
        }
    }
}

impl<'a> WithdrawalTracker<'a> {
    /// Create a farm.
    pub fn create_farm(
        &self,
        name: &str,
        location: Option<String>,
        owner_name: Option<String>,
    ) -> TrackerResult<Farm> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::InvalidInput("farm name is required".into()));
        }

        let mut farm = Farm::new(name.to_string());
        farm.location = location;
        farm.owner_name = owner_name;
        self.db.insert_farm(&farm)?;
        tracing::info!("Created farm {} ({})", farm.name, farm.id);
        Ok(farm)
    }

    /// Register an animal on a farm. Tags are unique across every farm.
    pub fn register_animal(&self, farm_id: &str, new_animal: NewAnimal) -> TrackerResult<Animal> {
        let tag = new_animal.tag.trim();
        let animal_type = new_animal.animal_type.trim();
        if tag.is_empty() || animal_type.is_empty() {
            return Err(TrackerError::InvalidInput(
                "animal tag and type are required".into(),
            ));
        }
        if let Some(weight) = new_animal.weight_kg {
            if !weight.is_finite() || weight <= 0.0 {
                return Err(TrackerError::InvalidInput(format!(
                    "weight must be positive: {}",
                    weight
                )));
            }
        }

        if self.db.get_farm(farm_id)?.is_none() {
            return Err(TrackerError::FarmNotFound(farm_id.to_string()));
        }
        if self.db.animal_tag_exists(tag)? {
            return Err(TrackerError::DuplicateAnimalId(tag.to_string()));
        }

        let mut animal = Animal::new(
            tag.to_string(),
            animal_type.to_string(),
            new_animal.age,
            farm_id.to_string(),
        );
        animal.weight_kg = new_animal.weight_kg;

        match self.db.insert_animal(&animal) {
            Ok(()) => {}
            // Lost a race with a concurrent registration of the same tag
            Err(DbError::Sqlite(rusqlite::Error::SqliteFailure(e, _)))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(TrackerError::DuplicateAnimalId(tag.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!("Registered {} {} on farm {}", animal.animal_type, animal.tag, farm_id);
        Ok(animal)
    }

    /// Delete an animal and every usage record it owns.
    pub fn delete_animal(&self, animal_id: &str) -> TrackerResult<()> {
        if !self.db.delete_animal(animal_id)? {
            return Err(TrackerError::AnimalNotFound(animal_id.to_string()));
        }
        tracing::info!("Deleted animal {}", animal_id);
        Ok(())
    }

    /// Catalog entries that can be administered to an animal type.
    pub fn available_medicines(&self, animal_type: &str) -> TrackerResult<Vec<MedicineStandard>> {
        Ok(self.db.list_medicines_for_animal(animal_type)?)
    }

    /// Record a medicine administration, stamped with the current time.
    pub fn record_usage(
        &self,
        animal_tag: &str,
        medicine_name: &str,
        notes: Option<String>,
    ) -> TrackerResult<UsageRecord> {
        self.record_usage_at(animal_tag, medicine_name, notes, Utc::now())
    }

    /// Record a medicine administration given at `administered_at`.
    ///
    /// The withdrawal period is resolved now and snapshotted into the record.
    /// A non-zero period marks the animal UNSAFE immediately.
    pub fn record_usage_at(
        &self,
        animal_tag: &str,
        medicine_name: &str,
        notes: Option<String>,
        administered_at: DateTime<Utc>,
    ) -> TrackerResult<UsageRecord> {
        let medicine_name = medicine_name.trim();
        if medicine_name.is_empty() {
            return Err(TrackerError::InvalidInput("medicine name is required".into()));
        }

        let animal = self
            .db
            .get_animal_by_tag(animal_tag)?
            .ok_or_else(|| TrackerError::AnimalNotFound(animal_tag.to_string()))?;

        let resolver =
            MedicineResolver::new(self.db).with_suggestion_threshold(self.suggestion_threshold);
        let resolution = match resolver.resolve(medicine_name, &animal.canonical_type()) {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!("Rejected administration to {}: {}", animal.tag, e);
                return Err(e.into());
            }
        };

        // Stored timestamps carry millisecond precision
        let administered_at = administered_at.trunc_subsecs(3);
        let mut record = UsageRecord::new(
            animal.id.clone(),
            medicine_name.to_string(),
            resolution.duration,
            administered_at,
        );
        record.notes = notes.filter(|n| !n.trim().is_empty());
        self.db.insert_usage(&record)?;

        tracing::info!(
            "Recorded {} for {} ({} {} withdrawal)",
            record.medicine_name,
            animal.tag,
            record.withdrawal.amount,
            record.withdrawal.unit.as_str()
        );

        if !record.withdrawal.is_zero() && animal.status != AnimalStatus::Unsafe {
            self.db.update_animal_status(
                &animal.id,
                AnimalStatus::Unsafe,
                &format_timestamp(administered_at),
            )?;
        }

        Ok(record)
    }

    /// The open ledger for one animal as of now.
    pub fn list_usage(&self, animal_id: &str) -> TrackerResult<Vec<UsageRecord>> {
        self.list_usage_at(animal_id, Utc::now())
    }

    /// The open ledger for one animal at `now`. Runs a status pass first, so
    /// records whose window has elapsed are purged rather than returned.
    pub fn list_usage_at(
        &self,
        animal_id: &str,
        now: DateTime<Utc>,
    ) -> TrackerResult<Vec<UsageRecord>> {
        self.check_animal(animal_id, now)?;
        Ok(self.db.list_usages_for_animal(animal_id)?)
    }
}
