//! Medicine resolution: free-text medicine name + animal type → withdrawal period.
//!
//! Order of precedence:
//! 1. Exact catalog entry applicable to the animal type (days)
//! 2. No exact entry: synthetic test medicine, any name containing "test" (minutes)
//! 3. Unrecognized

mod suggest;

pub use suggest::*;

use crate::db::Database;
use crate::models::{MedicineStandard, WithdrawalDuration};
use thiserror::Error;

/// Marker that identifies a synthetic test medicine, matched case-insensitively.
pub const TEST_MEDICINE_MARKER: &str = "test";

/// Resolver errors.
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Database error: {0}")]
    Database(#[from] crate::db::DbError),

    #[error("{}", unrecognized_message(.name, .animal_type, .not_applicable, .suggestion))]
    Unrecognized {
        name: String,
        animal_type: String,
        /// The name exists in the catalog but not for this animal type
        not_applicable: bool,
        suggestion: Option<String>,
    },
}

fn unrecognized_message(
    name: &str,
    animal_type: &str,
    not_applicable: &bool,
    suggestion: &Option<String>,
) -> String {
    let mut message = if *not_applicable {
        format!(
            "Medicine '{}' is not applicable to animal type '{}'",
            name, animal_type
        )
    } else {
        format!("Medicine '{}' not recognized in standard catalog", name)
    };
    if let Some(suggestion) = suggestion {
        message.push_str(&format!(" (did you mean '{}'?)", suggestion));
    }
    message
}

pub type ResolverResult<T> = Result<T, ResolverError>;

/// How a withdrawal period was resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionSource {
    /// Taken from a catalog entry
    Catalog(MedicineStandard),
    /// Parsed from a test medicine name
    TestPattern,
}

/// A resolved withdrawal period.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub duration: WithdrawalDuration,
    pub source: ResolutionSource,
}

/// Resolves medicine names against the catalog.
pub struct MedicineResolver<'a> {
    db: &'a Database,
    suggestion_threshold: f64,
}

impl<'a> MedicineResolver<'a> {
    /// Create a new resolver.
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

    /// Resolve a medicine name for an animal type.
    pub fn resolve(&self, medicine_name: &str, animal_type: &str) -> ResolverResult<Resolution> {
        let exact = self.db.get_medicine(medicine_name)?;

        if let Some(medicine) = &exact {
            if medicine.is_applicable_to(animal_type) {
                return Ok(Resolution {
                    duration: WithdrawalDuration::days(medicine.withdrawal_days),
                    source: ResolutionSource::Catalog(medicine.clone()),
                });
            }
        }

        // A catalog name that does not apply to this type never becomes a test medicine
        if exact.is_none() {
            if let Some(duration) = parse_test_medicine(medicine_name) {
                return Ok(Resolution {
                    duration,
                    source: ResolutionSource::TestPattern,
                });
            }
        }

        let available = self.db.list_medicines_for_animal(animal_type)?;
        let suggestion = closest_medicine(medicine_name, &available, self.suggestion_threshold)
            .map(str::to_string);

        Err(ResolverError::Unrecognized {
            name: medicine_name.to_string(),
            animal_type: animal_type.to_string(),
            not_applicable: exact.is_some(),
            suggestion,
        })
    }
}

/// Parse a synthetic test medicine name into a minute-granularity period.
///
/// The magnitude is the first run of decimal digits in the name, 1 if there is none.
/// Returns `None` if the name does not contain the test marker.
pub fn parse_test_medicine(name: &str) -> Option<WithdrawalDuration> {
    if !name.to_lowercase().contains(TEST_MEDICINE_MARKER) {
        return None;
    }

    let digits: String = name
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();

    let minutes = if digits.is_empty() {
        1
    } else {
        digits
            .chars()
            .filter_map(|c| c.to_digit(10))
            .fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d))
    };

    Some(WithdrawalDuration::minutes(minutes))
}
