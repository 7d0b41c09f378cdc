use serde::{Deserialize, Serialize};

use crate::scores::models::ScoreStore;

/// Used when no entry carries any score.
pub const DEFAULT_SELECTION_THRESHOLD: f64 = 0.5;
pub const DEFAULT_REJECTION_THRESHOLD: f64 = 0.3;
/// Lower bound on a computed threshold.
pub const MIN_THRESHOLD: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdScores {
    pub selection_threshold: f64,
    pub rejection_threshold: f64,
}

impl Default for ThresholdScores {
    fn default() -> Self {
        Self {
            selection_threshold: DEFAULT_SELECTION_THRESHOLD,
            rejection_threshold: DEFAULT_REJECTION_THRESHOLD,
        }
    }
}

/// Importance-weighted mean of selection and rejection scores across every
/// role and category.
///
/// Entries whose selection, rejection and importance are all zero do not
/// contribute. Each mean is floored at `MIN_THRESHOLD`.
pub fn compute_thresholds(store: &ScoreStore) -> ThresholdScores {
    let weighted: Vec<(f64, f64)> = store
        .roles()
        .flat_map(|(_, record)| record.entries())
        .map(|(_, _, entry)| entry)
        .filter(|e| e.selection_score != 0.0 || e.rejection_score != 0.0 || e.importance != 0.0)
        .map(|e| {
            (
                e.selection_score * e.importance / 100.0,
                e.rejection_score * e.importance / 100.0,
            )
        })
        .collect();

    if weighted.is_empty() {
        return ThresholdScores::default();
    }

    let n = weighted.len() as f64;
    let (selection_sum, rejection_sum) = weighted
        .iter()
        .fold((0.0_f64, 0.0_f64), |(s, r), (ws, wr)| (s + ws, r + wr));

    ThresholdScores {
        selection_threshold: (selection_sum / n).max(MIN_THRESHOLD),
        rejection_threshold: (rejection_sum / n).max(MIN_THRESHOLD),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scores::models::{RoleRecord, SkillEntry};

    fn entry(importance: f64, selection: f64, rejection: f64) -> SkillEntry {
        SkillEntry {
            rating: 5.0,
            importance,
            selection_score: selection,
            rejection_score: rejection,
        }
    }

    #[test]
    fn test_empty_store_uses_defaults() {
        let scores = compute_thresholds(&ScoreStore::default());
        assert_eq!(scores, ThresholdScores::default());
    }

    #[test]
    fn test_all_zero_entries_use_defaults() {
        let mut role = RoleRecord::default();
        role.skills.insert("Idle".to_string(), entry(0.0, 0.0, 0.0));
        let mut store = ScoreStore::default();
        store.insert_role("Ops", role);

        assert_eq!(compute_thresholds(&store), ThresholdScores::default());
    }

    #[test]
    fn test_weighted_mean_across_categories() {
        let mut role = RoleRecord::default();
        // 50 * 40 / 100 = 20, 30 * 40 / 100 = 12
        role.skills.insert("Python".to_string(), entry(40.0, 50.0, 30.0));
        // 10 * 100 / 100 = 10, 20 * 100 / 100 = 20
        role.activities.insert("Deploy".to_string(), entry(100.0, 10.0, 20.0));
        let mut store = ScoreStore::default();
        store.insert_role("ML Engineer", role);

        let scores = compute_thresholds(&store);
        assert!((scores.selection_threshold - 15.0).abs() < 1e-9);
        assert!((scores.rejection_threshold - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_floor() {
        let mut role = RoleRecord::default();
        // Importance alone counts as a contributing entry, but yields 0.
        role.skills.insert("Soft skills".to_string(), entry(10.0, 0.0, 0.0));
        let mut store = ScoreStore::default();
        store.insert_role("Support", role);

        let scores = compute_thresholds(&store);
        assert_eq!(scores.selection_threshold, MIN_THRESHOLD);
        assert_eq!(scores.rejection_threshold, MIN_THRESHOLD);
    }
}
