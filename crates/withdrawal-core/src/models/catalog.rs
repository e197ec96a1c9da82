//! Medicine catalog models.

use serde::{Deserialize, Serialize};

/// A standard medicine in the withdrawal catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MedicineStandard {
    /// Medicine name - unique, case-sensitive lookup key
    pub name: String,
    /// Mandated withdrawal period in days
    pub withdrawal_days: u32,
    /// Animal types this medicine applies to (lower-cased, e.g. ["cow", "goat"])
    pub applicable_animals: Vec<String>,
}

impl MedicineStandard {
    /// Create a new catalog entry. Animal types are stored lower-cased.
    pub fn new(name: impl Into<String>, withdrawal_days: u32, applicable_animals: &[&str]) -> Self {
        Self {
            name: name.into(),
            withdrawal_days,
            applicable_animals: applicable_animals
                .iter()
                .map(|a| a.trim().to_lowercase())
                .collect(),
        }
    }

    /// Check if this medicine applies to a given animal type.
    pub fn is_applicable_to(&self, animal_type: &str) -> bool {
        if self.applicable_animals.is_empty() {
            return true; // No restriction means all animal types
        }
        let type_lower = animal_type.trim().to_lowercase();
        self.applicable_animals
            .iter()
            .any(|a| a.to_lowercase() == type_lower)
    }

    /// Lower-case and de-duplicate the applicable animal types.
    pub fn normalize_animals(&mut self) {
        let mut seen = Vec::with_capacity(self.applicable_animals.len());
        for animal in self.applicable_animals.drain(..) {
            let lower = animal.trim().to_lowercase();
            if !lower.is_empty() && !seen.contains(&lower) {
                seen.push(lower);
            }
        }
        self.applicable_animals = seen;
    }
}

/// The standard catalog seeded into an empty database.
pub fn default_catalog() -> Vec<MedicineStandard> {
    vec![
        MedicineStandard::new("Antibiotic X", 10, &["cow", "sheep", "goat"]),
        MedicineStandard::new("PainRelief Y", 5, &["cow", "pig"]),
        MedicineStandard::new("Vitamin Z", 0, &["cow", "sheep", "goat", "pig"]),
        MedicineStandard::new("Wormer A", 14, &["sheep", "goat"]),
    ]
}
