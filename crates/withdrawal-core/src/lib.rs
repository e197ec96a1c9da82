//! Withdrawal Tracker Core Library
//!
//! Tracks livestock medicine withdrawal periods: the window after a drug is
//! administered during which an animal's products must not be used.
//!
//! # Architecture
//!
//! ```text
//!   administer medicine ──► Medicine Resolution ──► Usage Ledger (append)
//!                           (catalog | "test" N min)        │
//!                                                            ▼
//!   read animal / farm / fleet ──► Status Engine (pure, shared `now`)
//!                                        │
//!                      ┌─────────────────┴─────────────────┐
//!                      ▼                                   ▼
//!            purge expired records               write status only if changed
//! ```
//!
//! # Core Principle
//!
//! **The ledger is authoritative.** An animal's cached `status` is re-derived on
//! every read; nothing trusts a stored flag without re-running the pass.
//!
//! # Modules
//!
//! - [`db`]: SQLite persistence
//! - [`models`]: Domain types (MedicineStandard, Animal, UsageRecord, summaries)
//! - [`resolver`]: Medicine name → withdrawal period
//! - [`engine`]: Pure withdrawal status evaluation
//! - [`tracker`]: Ledger lifecycle, status passes and aggregates
//! - [`config`]: TOML configuration
//! - [`logging`]: tracing subscriber setup

pub mod config;
pub mod db;
pub mod engine;
pub mod logging;
pub mod models;
pub mod resolver;
pub mod tracker;

// Re-export commonly used types
pub use config::Config;
pub use db::Database;
pub use engine::{evaluate, RemainingTime, StatusEvaluation};
pub use models::{
    Animal, AnimalStatus, AnimalStatusReport, Farm, FarmStatus, FarmSummary, FleetSummary,
    MedicineStandard, UsageRecord, WithdrawalDuration, WithdrawalUnit,
};
pub use resolver::MedicineResolver;
pub use tracker::{NewAnimal, TrackerError, WithdrawalTracker};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum WithdrawalTrackerError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Animal not found: {0}")]
    AnimalNotFound(String),

    #[error("Farm not found: {0}")]
    FarmNotFound(String),

    #[error("Unrecognized medicine: {0}")]
    UnrecognizedMedicine(String),

    #[error("Duplicate animal ID: {0}")]
    DuplicateAnimalId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<TrackerError> for WithdrawalTrackerError {
    fn from(e: TrackerError) -> Self {
        match e {
            TrackerError::AnimalNotFound(id) => WithdrawalTrackerError::AnimalNotFound(id),
            TrackerError::FarmNotFound(id) => WithdrawalTrackerError::FarmNotFound(id),
            TrackerError::UnrecognizedMedicine { message, .. } => {
                WithdrawalTrackerError::UnrecognizedMedicine(message)
            }
            TrackerError::DuplicateAnimalId(tag) => WithdrawalTrackerError::DuplicateAnimalId(tag),
            TrackerError::InvalidInput(msg) => WithdrawalTrackerError::InvalidInput(msg),
            TrackerError::Database(e) => WithdrawalTrackerError::DatabaseError(e.to_string()),
        }
    }
}

impl From<db::DbError> for WithdrawalTrackerError {
    fn from(e: db::DbError) -> Self {
        WithdrawalTrackerError::DatabaseError(e.to_string())
    }
}

impl From<config::ConfigError> for WithdrawalTrackerError {
    fn from(e: config::ConfigError) -> Self {
        WithdrawalTrackerError::ConfigError(e.to_string())
    }
}

impl From<serde_json::Error> for WithdrawalTrackerError {
    fn from(e: serde_json::Error) -> Self {
        WithdrawalTrackerError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for WithdrawalTrackerError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        WithdrawalTrackerError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Install the tracing subscriber. `level` is used unless RUST_LOG is set.
#[uniffi::export]
pub fn init_logging(level: String) {
    logging::init_with_level(&level);
}

/// Open or create a tracker database at the given path with default settings.
#[uniffi::export]
pub fn open_tracker(path: String) -> Result<Arc<WithdrawalCore>, WithdrawalTrackerError> {
    let db = Database::open(&path)?;
    WithdrawalCore::from_database(db, &Config::default())
}

/// Create an in-memory tracker (for testing).
#[uniffi::export]
pub fn open_tracker_in_memory() -> Result<Arc<WithdrawalCore>, WithdrawalTrackerError> {
    let db = Database::open_in_memory()?;
    WithdrawalCore::from_database(db, &Config::default())
}

/// Open a tracker described by a TOML config file, or the default config location.
#[uniffi::export]
pub fn open_tracker_with_config(
    config_path: Option<String>,
) -> Result<Arc<WithdrawalCore>, WithdrawalTrackerError> {
    let config = match config_path {
        Some(path) => Config::load_from(std::path::Path::new(&path))?,
        None => Config::load()?,
    };
    if let Some(parent) = config.database.path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| WithdrawalTrackerError::ConfigError(e.to_string()))?;
    }
    let db = Database::open(&config.database.path)?;
    WithdrawalCore::from_database(db, &config)
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe tracker handle for FFI.
#[derive(uniffi::Object)]
pub struct WithdrawalCore {
    db: Arc<Mutex<Database>>,
    suggestion_threshold: f64,
}

impl WithdrawalCore {
    /// Wrap an opened database, seeding the catalog as configured.
    pub fn from_database(
        db: Database,
        config: &Config,
    ) -> Result<Arc<Self>, WithdrawalTrackerError> {
        config.validate()?;
        if config.catalog.seed_defaults {
            db.seed_catalog_if_empty(&models::default_catalog())?;
        }
        for medicine in &config.catalog.extra {
            db.upsert_medicine(medicine)?;
        }
        Ok(Arc::new(Self {
            db: Arc::new(Mutex::new(db)),
            suggestion_threshold: config.resolver.suggestion_threshold,
        }))
    }

    fn tracker<'a>(&self, db: &'a Database) -> WithdrawalTracker<'a> {
        WithdrawalTracker::new(db).with_suggestion_threshold(self.suggestion_threshold)
    }
}

#[uniffi::export]
impl WithdrawalCore {
    // =========================================================================
    // Catalog Operations
    // =========================================================================

    /// Add or update a catalog medicine.
    pub fn upsert_medicine(&self, medicine: FfiMedicine) -> Result<(), WithdrawalTrackerError> {
        if medicine.name.trim().is_empty() {
            return Err(WithdrawalTrackerError::InvalidInput(
                "medicine name is required".into(),
            ));
        }
        let db = self.db.lock()?;
        db.upsert_medicine(&medicine.into())?;
        Ok(())
    }

    /// List the whole catalog.
    pub fn list_medicines(&self) -> Result<Vec<FfiMedicine>, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        Ok(db.list_medicines()?.into_iter().map(Into::into).collect())
    }

    /// Medicines that can be administered to an animal type.
    pub fn available_medicines(
        &self,
        animal_type: String,
    ) -> Result<Vec<FfiMedicine>, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let medicines = self.tracker(&db).available_medicines(&animal_type)?;
        Ok(medicines.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Registry Operations
    // =========================================================================

    /// Create a farm.
    pub fn create_farm(
        &self,
        name: String,
        location: Option<String>,
        owner_name: Option<String>,
    ) -> Result<FfiFarm, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let farm = self.tracker(&db).create_farm(&name, location, owner_name)?;
        Ok(farm.into())
    }

    /// List all farms.
    pub fn list_farms(&self) -> Result<Vec<FfiFarm>, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        Ok(db.list_farms()?.into_iter().map(Into::into).collect())
    }

    /// Register an animal on a farm.
    pub fn register_animal(
        &self,
        farm_id: String,
        tag: String,
        animal_type: String,
        age: u32,
        weight_kg: Option<f64>,
    ) -> Result<FfiAnimal, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let new_animal = NewAnimal {
            tag,
            animal_type,
            age,
            weight_kg,
        };
        let animal = self.tracker(&db).register_animal(&farm_id, new_animal)?;
        Ok(animal.into())
    }

    /// Get an animal by internal ID, with its status checked now.
    pub fn get_animal(&self, animal_id: String) -> Result<FfiAnimal, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let check = self
            .tracker(&db)
            .check_animal(&animal_id, chrono::Utc::now())?;
        Ok(check.report.animal.into())
    }

    /// Animals registered on a farm, each with its status checked now.
    pub fn list_animals(
        &self,
        farm_id: String,
    ) -> Result<Vec<FfiAnimalStatus>, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let animals = self
            .tracker(&db)
            .farm_animals(&farm_id, chrono::Utc::now())?;
        Ok(animals.into_iter().map(Into::into).collect())
    }

    /// Delete an animal and its usage records.
    pub fn delete_animal(&self, animal_id: String) -> Result<(), WithdrawalTrackerError> {
        let db = self.db.lock()?;
        self.tracker(&db).delete_animal(&animal_id)?;
        Ok(())
    }

    // =========================================================================
    // Ledger Operations
    // =========================================================================

    /// Record a medicine administration for the animal with `animal_tag`.
    pub fn administer_medicine(
        &self,
        animal_tag: String,
        medicine_name: String,
        notes: Option<String>,
    ) -> Result<FfiUsageRecord, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let record = self
            .tracker(&db)
            .record_usage(&animal_tag, &medicine_name, notes)?;
        Ok(record.into())
    }

    /// Open usage records of one animal. Elapsed records are purged first.
    pub fn list_usage(
        &self,
        animal_id: String,
    ) -> Result<Vec<FfiUsageRecord>, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let records = self.tracker(&db).list_usage(&animal_id)?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    // =========================================================================
    // Status Operations
    // =========================================================================

    /// Current withdrawal status of one animal.
    pub fn animal_status(
        &self,
        animal_id: String,
    ) -> Result<FfiAnimalStatus, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let check = self
            .tracker(&db)
            .check_animal(&animal_id, chrono::Utc::now())?;
        Ok(check.report.into())
    }

    /// Dashboard summary for one farm.
    pub fn farm_summary(&self, farm_id: String) -> Result<FfiFarmSummary, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let summary = self
            .tracker(&db)
            .farm_summary(&farm_id, chrono::Utc::now())?;
        Ok(summary.into())
    }

    /// Dashboard summary for one farm as JSON.
    pub fn farm_summary_json(&self, farm_id: String) -> Result<String, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let summary = self
            .tracker(&db)
            .farm_summary(&farm_id, chrono::Utc::now())?;
        Ok(summary.to_json()?)
    }

    /// Counts across every farm.
    pub fn fleet_summary(&self) -> Result<FfiFleetSummary, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let summary = self.tracker(&db).fleet_summary(chrono::Utc::now())?;
        Ok(summary.into())
    }

    /// Counts across every farm as JSON.
    pub fn fleet_summary_json(&self) -> Result<String, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let summary = self.tracker(&db).fleet_summary(chrono::Utc::now())?;
        Ok(summary.to_json()?)
    }

    /// Every animal currently under withdrawal.
    pub fn unsafe_animals(&self) -> Result<Vec<FfiUnsafeAnimal>, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let animals = self.tracker(&db).unsafe_animals(chrono::Utc::now())?;
        Ok(animals.into_iter().map(Into::into).collect())
    }

    /// Purge every expired record now instead of waiting for reads.
    pub fn sweep_expired(&self) -> Result<FfiSweepReport, WithdrawalTrackerError> {
        let db = self.db.lock()?;
        let report = self.tracker(&db).sweep_expired(chrono::Utc::now())?;
        Ok(report.into())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe catalog medicine.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiMedicine {
    pub name: String,
    pub withdrawal_days: u32,
    pub applicable_animals: Vec<String>,
}

impl From<MedicineStandard> for FfiMedicine {
    fn from(medicine: MedicineStandard) -> Self {
        Self {
            name: medicine.name,
            withdrawal_days: medicine.withdrawal_days,
            applicable_animals: medicine.applicable_animals,
        }
    }
}

impl From<FfiMedicine> for MedicineStandard {
    fn from(medicine: FfiMedicine) -> Self {
        MedicineStandard {
            name: medicine.name.trim().to_string(),
            withdrawal_days: medicine.withdrawal_days,
            applicable_animals: medicine.applicable_animals,
        }
    }
}

/// FFI-safe farm.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFarm {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub owner_name: Option<String>,
}

impl From<Farm> for FfiFarm {
    fn from(farm: Farm) -> Self {
        Self {
            id: farm.id,
            name: farm.name,
            location: farm.location,
            owner_name: farm.owner_name,
        }
    }
}

/// FFI-safe animal.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimal {
    pub id: String,
    pub tag: String,
    pub animal_type: String,
    pub age: u32,
    pub weight_kg: Option<f64>,
    pub farm_id: String,
    pub status: String,
}

impl From<Animal> for FfiAnimal {
    fn from(animal: Animal) -> Self {
        Self {
            id: animal.id,
            tag: animal.tag,
            animal_type: animal.animal_type,
            age: animal.age,
            weight_kg: animal.weight_kg,
            farm_id: animal.farm_id,
            status: animal.status.as_str().to_string(),
        }
    }
}

/// FFI-safe per-animal status.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAnimalStatus {
    pub animal: FfiAnimal,
    pub status: String,
    pub remaining_time: u64,
    pub remaining_unit: String,
}

impl From<AnimalStatusReport> for FfiAnimalStatus {
    fn from(report: AnimalStatusReport) -> Self {
        Self {
            status: report.status.as_str().to_string(),
            remaining_time: report.remaining_time,
            remaining_unit: report.remaining_unit.as_str().to_string(),
            animal: report.animal.into(),
        }
    }
}

/// FFI-safe usage record.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUsageRecord {
    pub id: String,
    pub animal_id: String,
    pub medicine_name: String,
    pub administered_at: String,
    pub withdrawal_amount: u32,
    pub withdrawal_unit: String,
    pub notes: Option<String>,
}

impl From<UsageRecord> for FfiUsageRecord {
    fn from(record: UsageRecord) -> Self {
        Self {
            id: record.id,
            animal_id: record.animal_id,
            medicine_name: record.medicine_name,
            administered_at: db::format_timestamp(record.administered_at),
            withdrawal_amount: record.withdrawal.amount,
            withdrawal_unit: record.withdrawal.unit.as_str().to_string(),
            notes: record.notes,
        }
    }
}

/// FFI-safe farm summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFarmSummary {
    pub farm_id: String,
    pub total_animals: u64,
    pub unsafe_animals: u64,
    pub status: String,
    pub animals: Vec<FfiAnimalStatus>,
}

impl From<FarmSummary> for FfiFarmSummary {
    fn from(summary: FarmSummary) -> Self {
        Self {
            farm_id: summary.farm_id,
            total_animals: summary.total_animals as u64,
            unsafe_animals: summary.unsafe_animals as u64,
            status: summary.status.as_str().to_string(),
            animals: summary.animals.into_iter().map(Into::into).collect(),
        }
    }
}

/// FFI-safe per-farm counts.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFarmOverview {
    pub farm: FfiFarm,
    pub animal_count: u64,
    pub unsafe_count: u64,
}

/// FFI-safe fleet summary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFleetSummary {
    pub evaluated_at: String,
    pub total_farms: u64,
    pub total_animals: u64,
    pub unsafe_animals: u64,
    pub farms: Vec<FfiFarmOverview>,
}

impl From<FleetSummary> for FfiFleetSummary {
    fn from(summary: FleetSummary) -> Self {
        Self {
            evaluated_at: summary.evaluated_at,
            total_farms: summary.total_farms as u64,
            total_animals: summary.total_animals as u64,
            unsafe_animals: summary.unsafe_animals as u64,
            farms: summary
                .farms
                .into_iter()
                .map(|overview| FfiFarmOverview {
                    farm: overview.farm.into(),
                    animal_count: overview.animal_count as u64,
                    unsafe_count: overview.unsafe_count as u64,
                })
                .collect(),
        }
    }
}

/// FFI-safe unsafe animal entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiUnsafeAnimal {
    pub status: FfiAnimalStatus,
    pub farm: FfiFarm,
}

impl From<models::UnsafeAnimal> for FfiUnsafeAnimal {
    fn from(entry: models::UnsafeAnimal) -> Self {
        Self {
            status: entry.report.into(),
            farm: entry.farm.into(),
        }
    }
}

/// FFI-safe sweep totals.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSweepReport {
    pub animals_checked: u64,
    pub records_purged: u64,
    pub statuses_written: u64,
}

impl From<tracker::SweepReport> for FfiSweepReport {
    fn from(report: tracker::SweepReport) -> Self {
        Self {
            animals_checked: report.animals_checked as u64,
            records_purged: report.records_purged as u64,
            statuses_written: report.statuses_written as u64,
        }
    }
}
