//! Withdrawal tracker: the usage ledger lifecycle and status passes over stored data.
//!
//! Every read runs the status engine fresh against the ledger, purges records
//! it found expired and rewrites the cached status only when it changed.

mod aggregate;
mod ledger;

pub use aggregate::*;
pub use ledger::*;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::db::{format_timestamp, Database, DbError};
use crate::engine::{evaluate, StatusEvaluation};
use crate::models::{Animal, AnimalStatusReport};
use crate::resolver::{ResolverError, DEFAULT_SUGGESTION_THRESHOLD};

/// Tracker errors.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Animal not found: {0}")]
    AnimalNotFound(String),

    #[error("Farm not found: {0}")]
    FarmNotFound(String),

    #[error("{message}")]
    UnrecognizedMedicine {
        name: String,
        animal_type: String,
        suggestion: Option<String>,
        message: String,
    },

    #[error("Animal ID already exists: {0}")]
    DuplicateAnimalId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database error: {0}")]
    Database(#[from] DbError),
}

impl From<ResolverError> for TrackerError {
    fn from(e: ResolverError) -> Self {
        let message = e.to_string();
        match e {
            ResolverError::Database(e) => TrackerError::Database(e),
            ResolverError::Unrecognized {
                name,
                animal_type,
                suggestion,
                ..
            } => TrackerError::UnrecognizedMedicine {
                name,
                animal_type,
                suggestion,
                message,
            },
        }
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Persistence writes performed while applying one evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyOutcome {
    /// Usage records actually removed (already-gone records are not counted)
    pub purged: usize,
    /// Whether the cached status was rewritten
    pub status_written: bool,
}

impl ApplyOutcome {
    /// Whether anything was written.
    pub fn wrote_anything(&self) -> bool {
        self.purged > 0 || self.status_written
    }
}

/// Result of checking one animal.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusCheck {
    /// Dashboard view of the animal
    pub report: AnimalStatusReport,
    /// Raw engine output
    pub evaluation: StatusEvaluation,
    /// Writes performed
    pub outcome: ApplyOutcome,
}

/// Ledger and status operations over a database.
pub struct WithdrawalTracker<'a> {
    db: &'a Database,
    suggestion_threshold: f64,
}

impl<'a> WithdrawalTracker<'a> {
    /// Create a new tracker.
    pub fn new(db: &'a Database) -> Self {
        Self {
            db,
            suggestion_threshold: DEFAULT_SUGGESTION_THRESHOLD,
        }
    }

    /// Override the minimum similarity for "did you mean" suggestions.
    pub fn with_suggestion_threshold(mut self, threshold: f64) -> Self {
        self.suggestion_threshold = threshold;
        self
    }

    /// Get the underlying database.
    pub fn db(&self) -> &Database {
        self.db
    }

    /// Check an animal's withdrawal status at `now`, purging expired records.
    pub fn check_animal(&self, animal_id: &str, now: DateTime<Utc>) -> TrackerResult<StatusCheck> {
        let animal = self
            .db
            .get_animal(animal_id)?
            .ok_or_else(|| TrackerError::AnimalNotFound(animal_id.to_string()))?;
        self.check_loaded(animal, now)
    }

    /// Check an animal looked up by tag.
    pub fn check_animal_by_tag(&self, tag: &str, now: DateTime<Utc>) -> TrackerResult<StatusCheck> {
        let animal = self
            .db
            .get_animal_by_tag(tag)?
            .ok_or_else(|| TrackerError::AnimalNotFound(tag.to_string()))?;
        self.check_loaded(animal, now)
    }

    /// Run a status pass for an already-loaded animal.
    pub(crate) fn check_loaded(&self, mut animal: Animal, now: DateTime<Utc>) -> TrackerResult<StatusCheck> {
        let records = self.db.list_usages_for_animal(&animal.id)?;
        let evaluation = evaluate(now, &animal, &records);
        let outcome = self.apply(&evaluation)?;

        animal.status = evaluation.status;
        if outcome.status_written {
            animal.status_updated_at = Some(format_timestamp(evaluation.evaluated_at));
        }

        let report = AnimalStatusReport {
            status: evaluation.status,
            remaining_time: evaluation.remaining_time(),
            remaining_unit: evaluation.remaining_unit(),
            animal,
        };

        Ok(StatusCheck {
            report,
            evaluation,
            outcome,
        })
    }

    /// Apply an evaluation: delete flagged records, write the status only if it changed.
    pub fn apply(&self, evaluation: &StatusEvaluation) -> TrackerResult<ApplyOutcome> {
        let mut outcome = ApplyOutcome::default();
        if !evaluation.needs_write() {
            return Ok(outcome);
        }

        outcome.purged = self.purge_expired(&evaluation.expired)?;

        if evaluation.status_changed() {
            outcome.status_written = self.db.update_animal_status(
                &evaluation.animal_id,
                evaluation.status,
                &format_timestamp(evaluation.evaluated_at),
            )?;
            tracing::info!(
                "Animal {} status changed {} -> {}",
                evaluation.animal_id,
                evaluation.previous_status.as_str(),
                evaluation.status.as_str()
            );
        }

        Ok(outcome)
    }

    /// Delete usage records flagged as expired. Records already gone are skipped.
    pub fn purge_expired(&self, record_ids: &[String]) -> TrackerResult<usize> {
        let purged = self.db.delete_usages(record_ids)?;
        if purged > 0 {
            tracing::debug!("Purged {} expired usage records", purged);
        }
        Ok(purged)
    }
}
