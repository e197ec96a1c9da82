//! Animal and farm models.

use serde::{Deserialize, Serialize};

/// Cached withdrawal status of an animal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AnimalStatus {
    /// No open withdrawal window
    #[default]
    Safe,
    /// At least one open withdrawal window
    Unsafe,
}

impl AnimalStatus {
    /// Stable string form used in storage and over FFI.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalStatus::Safe => "SAFE",
            AnimalStatus::Unsafe => "UNSAFE",
        }
    }

    /// Parse the stable string form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SAFE" => Some(AnimalStatus::Safe),
            "UNSAFE" => Some(AnimalStatus::Unsafe),
            _ => None,
        }
    }
}

/// An animal registered to a farm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Animal {
    /// Internal UUID
    pub id: String,
    /// Identity tag (ear tag etc.) - unique across the registry
    pub tag: String,
    /// Animal type (e.g., "cow", "goat")
    pub animal_type: String,
    /// Age in years
    pub age: u32,
    /// Weight in kg
    pub weight_kg: Option<f64>,
    /// Owning farm
    pub farm_id: String,
    /// Cached status, re-derived on every status check
    pub status: AnimalStatus,
    /// Evaluation time of the last status write
    pub status_updated_at: Option<String>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl Animal {
    /// Create a new animal with required fields.
    pub fn new(tag: String, animal_type: String, age: u32, farm_id: String) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tag,
            animal_type,
            age,
            weight_kg: None,
            farm_id,
            status: AnimalStatus::Safe,
            status_updated_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// Get the canonical animal type (lowercase).
    pub fn canonical_type(&self) -> String {
        self.animal_type.trim().to_lowercase()
    }
}

/// A farm owning a set of animals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Farm {
    /// Internal UUID
    pub id: String,
    /// Farm name
    pub name: String,
    /// Location description
    pub location: Option<String>,
    /// Owner name
    pub owner_name: Option<String>,
    /// Creation timestamp
    pub created_at: String,
}

impl Farm {
    /// Create a new farm.
    pub fn new(name: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            location: None,
            owner_name: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}
