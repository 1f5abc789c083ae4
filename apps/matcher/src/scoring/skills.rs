//! Skill Matcher: required / nice-to-have coverage blended with an optional
//! embedding similarity signal.
//!
//! score = embedding × 0.4 + required_coverage × 0.5 + nice_to_have_coverage × 0.1
//! (each component on 0–100). Without an embedding signal the required
//! coverage stands in for it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{MatchError, Result};
use crate::models::SkillProfile;
use crate::scoring::normalize::{ensure_unit, normalize_set, normalize_token};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillConfig {
    pub embedding_weight: f64,
    pub required_weight: f64,
    pub nice_to_have_weight: f64,
    /// Returned when neither side lists any skill.
    pub empty_profile_score: f64,
    /// Coverage credited when the job lists no nice-to-have skills.
    pub empty_nice_to_have_coverage: f64,
    /// Minimum per-skill similarity for a non-exact match to earn credit.
    pub semantic_credit_floor: f64,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            embedding_weight: 0.4,
            required_weight: 0.5,
            nice_to_have_weight: 0.1,
            empty_profile_score: 50.0,
            empty_nice_to_have_coverage: 0.5,
            semantic_credit_floor: 0.75,
        }
    }
}

impl SkillConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_unit("skills.embedding_weight", self.embedding_weight)?;
        ensure_unit("skills.required_weight", self.required_weight)?;
        ensure_unit("skills.nice_to_have_weight", self.nice_to_have_weight)?;
        ensure_unit("skills.empty_nice_to_have_coverage", self.empty_nice_to_have_coverage)?;
        ensure_unit("skills.semantic_credit_floor", self.semantic_credit_floor)?;
        if !(0.0..=100.0).contains(&self.empty_profile_score) {
            return Err(MatchError::invalid(
                "skills.empty_profile_score",
                format!("must be within [0, 100], got {}", self.empty_profile_score),
            ));
        }
        let total = self.embedding_weight + self.required_weight + self.nice_to_have_weight;
        if (total - 1.0).abs() > 1e-6 {
            return Err(MatchError::invalid(
                "skills",
                format!("component weights must sum to 1.0, got {total}"),
            ));
        }
        Ok(())
    }
}

/// Skill sub-score plus the coverage detail used for explanations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillBreakdown {
    pub score: f64,
    pub required_coverage: f64,
    pub nice_to_have_coverage: f64,
    pub embedding_component: f64,
    /// Required skills found verbatim (after normalization).
    pub matched: Vec<String>,
    /// Required skills credited through per-skill semantic similarity.
    pub related: Vec<String>,
    /// Required skills with no credit at all.
    pub missing: Vec<String>,
}

/// Scores a skill profile on 0–100.
pub fn score_skills(
    profile: &SkillProfile,
    embedding_similarity: Option<f64>,
    config: &SkillConfig,
) -> Result<SkillBreakdown> {
    let required = normalize_set("required_skills", &profile.required)?;
    let nice_to_have = normalize_set("nice_to_have_skills", &profile.nice_to_have)?;
    let possessed = normalize_set("skills", &profile.possessed)?;
    let semantic = normalize_similarity_map(&profile.semantic_similarity)?;
    let embedding = embedding_similarity
        .map(|s| ensure_unit("embedding_similarity", s))
        .transpose()?;

    let mut matched = Vec::new();
    let mut related = Vec::new();
    let mut missing = Vec::new();
    let mut credit = 0.0;

    for skill in &required {
        if possessed.contains(skill) {
            credit += 1.0;
            matched.push(skill.clone());
            continue;
        }
        match semantic.get(skill) {
            Some(&similarity) if similarity >= config.semantic_credit_floor => {
                credit += similarity;
                related.push(skill.clone());
            }
            _ => missing.push(skill.clone()),
        }
    }

    let required_coverage = if required.is_empty() {
        1.0
    } else {
        credit / required.len() as f64
    };

    let nice_to_have_coverage = if nice_to_have.is_empty() {
        config.empty_nice_to_have_coverage
    } else {
        nice_to_have.intersection(&possessed).count() as f64 / nice_to_have.len() as f64
    };

    let embedding_component = match embedding {
        Some(similarity) => similarity,
        None => {
            debug!("No embedding similarity supplied; using required coverage in its place");
            required_coverage
        }
    };

    let score = if required.is_empty() && possessed.is_empty() {
        config.empty_profile_score
    } else {
        ((embedding_component * config.embedding_weight
            + required_coverage * config.required_weight
            + nice_to_have_coverage * config.nice_to_have_weight)
            * 100.0)
            .clamp(0.0, 100.0)
    };

    Ok(SkillBreakdown {
        score,
        required_coverage,
        nice_to_have_coverage,
        embedding_component,
        matched,
        related,
        missing,
    })
}

fn normalize_similarity_map(raw: &BTreeMap<String, f64>) -> Result<BTreeMap<String, f64>> {
    raw.iter()
        .map(|(skill, &similarity)| {
            let key = normalize_token(skill);
            if key.is_empty() {
                return Err(MatchError::invalid(
                    "skill_similarity",
                    "skill key is empty after normalization",
                ));
            }
            let similarity = ensure_unit(&format!("skill_similarity.{key}"), similarity)?;
            Ok((key, similarity))
        })
        .collect()
}
