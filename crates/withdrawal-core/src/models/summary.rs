//! Status reports and aggregate summaries returned to the host layer.

use serde::{Deserialize, Serialize};

use super::animal::{Animal, AnimalStatus, Farm};
use super::usage::WithdrawalUnit;

/// Per-animal status as shown on a dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnimalStatusReport {
    /// The animal, with its status already refreshed
    pub animal: Animal,
    /// Current status
    pub status: AnimalStatus,
    /// Longest remaining withdrawal, in `remaining_unit` (0 when safe)
    pub remaining_time: u64,
    /// Unit of `remaining_time`
    pub remaining_unit: WithdrawalUnit,
}

/// Farm-level roll-up status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum FarmStatus {
    /// No animal is under withdrawal
    Safe,
    /// At least one animal is under withdrawal
    Attention,
}

impl FarmStatus {
    /// Derive from an unsafe count.
    pub fn from_unsafe_count(unsafe_animals: usize) -> Self {
        if unsafe_animals > 0 {
            FarmStatus::Attention
        } else {
            FarmStatus::Safe
        }
    }

    /// Stable string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            FarmStatus::Safe => "SAFE",
            FarmStatus::Attention => "ATTENTION",
        }
    }
}

/// Dashboard summary for a single farm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmSummary {
    pub farm_id: String,
    pub total_animals: usize,
    pub unsafe_animals: usize,
    pub status: FarmStatus,
    /// Per-animal reports, ordered by tag
    pub animals: Vec<AnimalStatusReport>,
}

impl FarmSummary {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// One farm's counts inside a fleet summary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FarmOverview {
    pub farm: Farm,
    pub animal_count: usize,
    pub unsafe_count: usize,
}

/// Inspector view across every farm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FleetSummary {
    /// Evaluation time shared by every count (RFC 3339)
    pub evaluated_at: String,
    pub total_farms: usize,
    pub total_animals: usize,
    pub unsafe_animals: usize,
    pub farms: Vec<FarmOverview>,
}

impl FleetSummary {
    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// An unsafe animal together with the farm it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UnsafeAnimal {
    pub report: AnimalStatusReport,
    pub farm: Farm,
}
