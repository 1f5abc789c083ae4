//! Composite Scorer: weighted combination of the three sub-scores.
//!
//! Pure and stateless: the same sub-scores and weights always give the same
//! `MatchResult`. Weights are normalized to sum to 1.0 before use, and when a
//! sub-score is unavailable its weight is redistributed across the others
//! unless that dimension is listed as required.

use serde::{Deserialize, Serialize};

use crate::errors::{MatchError, Result};
use crate::models::MatchResult;
use crate::scoring::normalize::to_score;
use crate::scoring::weights::{Dimension, Weights};

/// Raw 0–100 sub-scores. `None` marks a sub-matcher that could not run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub skills: Option<f64>,
    pub experience: Option<f64>,
    pub location: Option<f64>,
}

impl SubScores {
    pub fn complete(skills: f64, experience: f64, location: f64) -> Self {
        Self {
            skills: Some(skills),
            experience: Some(experience),
            location: Some(location),
        }
    }

    pub fn get(&self, dimension: Dimension) -> Option<f64> {
        match dimension {
            Dimension::Skills => self.skills,
            Dimension::Experience => self.experience,
            Dimension::Location => self.location,
        }
    }

    pub fn present(&self) -> Vec<Dimension> {
        Dimension::ALL
            .into_iter()
            .filter(|d| self.get(*d).is_some())
            .collect()
    }
}

/// Overall score from three complete sub-scores.
pub fn compute_match(
    skill_score: f64,
    experience_score: f64,
    location_score: f64,
    weights: &Weights,
) -> Result<MatchResult> {
    compute_partial_match(
        &SubScores::complete(skill_score, experience_score, location_score),
        weights,
        &Dimension::ALL,
    )
}

/// Overall score from possibly incomplete sub-scores.
///
/// Fails with `IncompleteMatch` when a dimension in `required` is missing;
/// otherwise the weights of the present dimensions are rescaled to sum to 1.0.
pub fn compute_partial_match(
    scores: &SubScores,
    weights: &Weights,
    required: &[Dimension],
) -> Result<MatchResult> {
    for dimension in Dimension::ALL {
        if let Some(value) = scores.get(dimension) {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(MatchError::invalid(
                    format!("{}_score", dimension.as_str()),
                    format!("must be within [0, 100], got {value}"),
                ));
            }
        }
    }

    if let Some(missing) = required.iter().find(|d| scores.get(**d).is_none()) {
        return Err(MatchError::IncompleteMatch {
            missing: missing.as_str().to_string(),
        });
    }

    let effective_weights = weights.renormalized(&scores.present())?;

    let overall: f64 = Dimension::ALL
        .iter()
        .filter_map(|d| scores.get(*d).map(|s| s * effective_weights.get(*d)))
        .sum();

    Ok(MatchResult {
        overall_score: to_score(overall),
        skills_match_score: scores.skills.map(to_score),
        experience_match_score: scores.experience.map(to_score),
        location_match_score: scores.location.map(to_score),
        effective_weights,
        explanation: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_example() {
        // 0.7*90 + 0.2*80 + 0.1*100 = 63 + 16 + 10
        let result = compute_match(90.0, 80.0, 100.0, &Weights::default()).unwrap();
        assert_eq!(result.overall_score, 89);
        assert_eq!(result.skills_match_score, Some(90));
        assert_eq!(result.experience_match_score, Some(80));
        assert_eq!(result.location_match_score, Some(100));
        assert!(result.explanation.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let w = Weights::default();
        let a = compute_match(73.3, 41.7, 12.0, &w).unwrap();
        let b = compute_match(73.3, 41.7, 12.0, &w).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_weights_override_defaults() {
        let w = Weights {
            skills: 0.0,
            experience: 0.0,
            location: 1.0,
        };
        let result = compute_match(10.0, 10.0, 90.0, &w).unwrap();
        assert_eq!(result.overall_score, 90);
    }

    #[test]
    fn test_bounds_hold_at_extremes() {
        let w = Weights::default();
        assert_eq!(compute_match(0.0, 0.0, 0.0, &w).unwrap().overall_score, 0);
        assert_eq!(compute_match(100.0, 100.0, 100.0, &w).unwrap().overall_score, 100);
    }

    #[test]
    fn test_out_of_range_sub_score_rejected() {
        let err = compute_match(101.0, 50.0, 50.0, &Weights::default()).unwrap_err();
        assert_eq!(err.field(), Some("skills_score"));
    }

    #[test]
    fn test_missing_required_dimension_is_incomplete() {
        let scores = SubScores {
            skills: None,
            experience: Some(80.0),
            location: Some(100.0),
        };
        let err =
            compute_partial_match(&scores, &Weights::default(), &[Dimension::Skills]).unwrap_err();
        match err {
            MatchError::IncompleteMatch { missing } => assert_eq!(missing, "skills"),
            other => panic!("Expected IncompleteMatch, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_optional_dimension_redistributes_weight() {
        let scores = SubScores {
            skills: Some(90.0),
            experience: Some(80.0),
            location: None,
        };
        let result =
            compute_partial_match(&scores, &Weights::default(), &[Dimension::Skills]).unwrap();
        assert!((result.effective_weights.sum() - 1.0).abs() < 1e-9);
        assert_eq!(result.effective_weights.location, 0.0);
        // (0.7*90 + 0.2*80) / 0.9 = 79 / 0.9 = 87.78
        assert_eq!(result.overall_score, 88);
        assert_eq!(result.location_match_score, None);
        assert!(result.is_partial());
    }

    #[test]
    fn test_nothing_present_is_incomplete() {
        let err = compute_partial_match(&SubScores::default(), &Weights::default(), &[])
            .unwrap_err();
        assert!(matches!(err, MatchError::IncompleteMatch { .. }));
    }
}
