use std::fmt::Display;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::MatchError;
use crate::scoring::experience::ExperienceConfig;
use crate::scoring::location::LocationConfig;
use crate::scoring::skills::SkillConfig;
use crate::scoring::threshold::SimilarityThreshold;
use crate::scoring::weights::{Dimension, Weights};

/// Every scoring knob in one place. `ScoringConfig::default()` is the single
/// default table; callers override per tenant or job category and pass the
/// result by reference into the scorers.
///
/// | knob                                 | default          |
/// |--------------------------------------|------------------|
/// | weights (skills/experience/location) | 0.7 / 0.2 / 0.1  |
/// | skills.empty_profile_score           | 50               |
/// | skills.empty_nice_to_have_coverage   | 0.5              |
/// | skills.semantic_credit_floor         | 0.75             |
/// | experience.under_penalty_per_year    | 20               |
/// | experience.over_penalty_per_year     | 5                |
/// | experience.unknown_years_score       | 50               |
/// | location.km_per_point                | 10               |
/// | location.ungeocoded_score            | 50               |
/// | similarity_threshold                 | 0.5              |
/// | min_score / result_limit             | 50 / 10          |
/// | required_dimensions                  | [skills]         |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: Weights,
    pub skills: SkillConfig,
    pub experience: ExperienceConfig,
    pub location: LocationConfig,
    pub similarity_threshold: SimilarityThreshold,
    /// Lowest overall score kept by `rank_candidates`.
    pub min_score: u8,
    /// Most matches returned by `rank_candidates`.
    pub result_limit: usize,
    /// Sub-scores that must be available for a match to be produced.
    pub required_dimensions: Vec<Dimension>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            skills: SkillConfig::default(),
            experience: ExperienceConfig::default(),
            location: LocationConfig::default(),
            similarity_threshold: SimilarityThreshold::default(),
            min_score: 50,
            result_limit: 10,
            required_dimensions: vec![Dimension::Skills],
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        self.weights.validate()?;
        self.skills.validate()?;
        self.experience.validate()?;
        self.location.validate()?;
        if self.min_score > 100 {
            return Err(MatchError::invalid(
                "min_score",
                format!("must be within [0, 100], got {}", self.min_score),
            ));
        }
        Ok(())
    }

    /// Copy of this config with different sub-score weights (e.g. a tenant override).
    pub fn with_weights(&self, weights: Weights) -> Result<Self, MatchError> {
        weights.validate()?;
        Ok(Self {
            weights,
            ..self.clone()
        })
    }
}

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub scoring: ScoringConfig,
    /// Enables `LlmExplainer` when present.
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub rust_log: String,
}

pub const DEFAULT_GROQ_MODEL: &str = "llama3-8b-8192";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Unset keys take their defaults;
    /// set-but-invalid keys are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = ScoringConfig::default();

        let scoring = ScoringConfig {
            weights: Weights {
                skills: parse_or(&lookup, "SKILLS_MATCH_WEIGHT", defaults.weights.skills)?,
                experience: parse_or(
                    &lookup,
                    "EXPERIENCE_MATCH_WEIGHT",
                    defaults.weights.experience,
                )?,
                location: parse_or(&lookup, "LOCATION_MATCH_WEIGHT", defaults.weights.location)?,
            },
            experience: ExperienceConfig {
                under_penalty_per_year: parse_or(
                    &lookup,
                    "EXPERIENCE_UNDER_PENALTY_PER_YEAR",
                    defaults.experience.under_penalty_per_year,
                )?,
                over_penalty_per_year: parse_or(
                    &lookup,
                    "EXPERIENCE_OVER_PENALTY_PER_YEAR",
                    defaults.experience.over_penalty_per_year,
                )?,
                ..defaults.experience.clone()
            },
            location: LocationConfig {
                km_per_point: parse_or(
                    &lookup,
                    "LOCATION_KM_PER_POINT",
                    defaults.location.km_per_point,
                )?,
                ..defaults.location.clone()
            },
            similarity_threshold: SimilarityThreshold::new(parse_or(
                &lookup,
                "SIMILARITY_THRESHOLD",
                SimilarityThreshold::DEFAULT,
            )?)
            .context("SIMILARITY_THRESHOLD must be within [0, 1]")?,
            min_score: parse_or(&lookup, "MATCH_MIN_SCORE", defaults.min_score)?,
            result_limit: parse_or(&lookup, "MATCH_RESULT_LIMIT", defaults.result_limit)?,
            ..defaults
        };

        scoring
            .validate()
            .context("Scoring configuration is invalid")?;

        Ok(Config {
            scoring,
            groq_api_key: lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
            groq_model: lookup("GROQ_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.scoring, ScoringConfig::default());
        assert!(config.groq_api_key.is_none());
        assert_eq!(config.groq_model, DEFAULT_GROQ_MODEL);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_env_overrides_weights_and_slopes() {
        let config = Config::from_lookup(lookup_from(&[
            ("SKILLS_MATCH_WEIGHT", "0.5"),
            ("EXPERIENCE_MATCH_WEIGHT", "0.3"),
            ("LOCATION_MATCH_WEIGHT", "0.2"),
            ("EXPERIENCE_OVER_PENALTY_PER_YEAR", "2.5"),
            ("SIMILARITY_THRESHOLD", "0.65"),
            ("GROQ_API_KEY", "gsk_test"),
        ]))
        .unwrap();
        assert_eq!(config.scoring.weights.skills, 0.5);
        assert_eq!(config.scoring.experience.over_penalty_per_year, 2.5);
        assert_eq!(config.scoring.experience.under_penalty_per_year, 20.0);
        assert_eq!(config.scoring.similarity_threshold.value(), 0.65);
        assert_eq!(config.groq_api_key.as_deref(), Some("gsk_test"));
    }

    #[test]
    fn test_unparseable_value_is_error() {
        let err = Config::from_lookup(lookup_from(&[("SKILLS_MATCH_WEIGHT", "lots")])).unwrap_err();
        assert!(format!("{err:#}").contains("SKILLS_MATCH_WEIGHT"));
    }

    #[test]
    fn test_threshold_out_of_range_is_error() {
        assert!(Config::from_lookup(lookup_from(&[("SIMILARITY_THRESHOLD", "1.5")])).is_err());
    }

    #[test]
    fn test_negative_weight_is_error() {
        assert!(Config::from_lookup(lookup_from(&[("LOCATION_MATCH_WEIGHT", "-1")])).is_err());
    }

    #[test]
    fn test_blank_api_key_treated_as_unset() {
        let config = Config::from_lookup(lookup_from(&[("GROQ_API_KEY", "  ")])).unwrap();
        assert!(config.groq_api_key.is_none());
    }

    #[test]
    fn test_scoring_config_deserializes_partial_override() {
        let config: ScoringConfig = serde_json::from_str(
            r#"{"weights": {"skills": 0.6, "experience": 0.3, "location": 0.1}, "min_score": 60}"#,
        )
        .unwrap();
        assert_eq!(config.weights.skills, 0.6);
        assert_eq!(config.min_score, 60);
        assert_eq!(config.skills, SkillConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_weights_rejects_invalid() {
        let base = ScoringConfig::default();
        let bad = Weights {
            skills: 0.0,
            experience: 0.0,
            location: 0.0,
        };
        assert!(base.with_weights(bad).is_err());
    }
}
