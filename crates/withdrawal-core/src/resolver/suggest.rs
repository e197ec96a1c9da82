//! "Did you mean" suggestions for unrecognized medicine names.

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::models::MedicineStandard;

/// Default minimum similarity for a suggestion to be offered.
pub const DEFAULT_SUGGESTION_THRESHOLD: f64 = 0.8;

/// Similarity between two medicine names, 0.0 to 1.0.
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let jw = jaro_winkler(&a, &b);
    let lev = normalized_levenshtein(&a, &b);

    // Jaro-Winkler favours shared prefixes, which is how names get mistyped
    jw * 0.6 + lev * 0.4
}

/// Closest catalog name to `name`, if any scores at or above `threshold`.
///
/// Ties keep the alphabetically first candidate.
pub fn closest_medicine<'m>(
    name: &str,
    candidates: &'m [MedicineStandard],
    threshold: f64,
) -> Option<&'m str> {
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let score = name_similarity(name, &candidate.name);
        if score < threshold {
            continue;
        }
        let better = match best {
            None => true,
            Some((best_name, best_score)) => {
                score > best_score || (score == best_score && candidate.name.as_str() < best_name)
            }
        };
        if better {
            best = Some((candidate.name.as_str(), score));
        }
    }
    best.map(|(name, _)| name)
}
