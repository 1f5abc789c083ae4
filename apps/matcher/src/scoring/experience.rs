//! Experience Matcher: years-in-range with asymmetric linear decay, plus
//! industry and role-level agreement.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{MatchError, Result};
use crate::models::ExperienceProfile;
use crate::scoring::normalize::{ensure_non_negative, ensure_unit, normalize_set, normalize_token};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceConfig {
    pub years_weight: f64,
    pub industry_weight: f64,
    pub role_weight: f64,
    /// Points lost per year below the required minimum.
    pub under_penalty_per_year: f64,
    /// Points lost per year above the required maximum.
    pub over_penalty_per_year: f64,
    /// Industry/role agreement assumed when either side has no tag.
    pub neutral_match: f64,
    /// Role agreement lost per step on the seniority ladder.
    pub role_step_penalty: f64,
    /// Years component (0–100) used when the candidate's years are unknown.
    pub unknown_years_score: f64,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        Self {
            years_weight: 0.5,
            industry_weight: 0.3,
            role_weight: 0.2,
            under_penalty_per_year: 20.0,
            over_penalty_per_year: 5.0,
            neutral_match: 0.5,
            role_step_penalty: 0.5,
            unknown_years_score: 50.0,
        }
    }
}

impl ExperienceConfig {
    pub fn validate(&self) -> Result<()> {
        ensure_unit("experience.years_weight", self.years_weight)?;
        ensure_unit("experience.industry_weight", self.industry_weight)?;
        ensure_unit("experience.role_weight", self.role_weight)?;
        ensure_non_negative("experience.under_penalty_per_year", self.under_penalty_per_year)?;
        ensure_non_negative("experience.over_penalty_per_year", self.over_penalty_per_year)?;
        ensure_unit("experience.neutral_match", self.neutral_match)?;
        ensure_unit("experience.role_step_penalty", self.role_step_penalty)?;
        ensure_unit("experience.unknown_years_score", self.unknown_years_score / 100.0)?;
        let total = self.years_weight + self.industry_weight + self.role_weight;
        if (total - 1.0).abs() > 1e-6 {
            return Err(MatchError::invalid(
                "experience",
                format!("component weights must sum to 1.0, got {total}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceBreakdown {
    pub score: f64,
    pub years_component: f64,
    pub industry_match: f64,
    pub role_match: f64,
}

/// 100 inside `[required_min, required_max]`; outside, linear decay from the
/// nearest bound, steeper below the minimum than above the maximum. Floored at 0.
pub fn years_component(
    required_min: f64,
    required_max: Option<f64>,
    candidate_years: f64,
    config: &ExperienceConfig,
) -> f64 {
    if candidate_years < required_min {
        let shortfall = required_min - candidate_years;
        (100.0 - shortfall * config.under_penalty_per_year).max(0.0)
    } else {
        match required_max {
            Some(max) if candidate_years > max => {
                let excess = candidate_years - max;
                (100.0 - excess * config.over_penalty_per_year).max(0.0)
            }
            _ => 100.0,
        }
    }
}

/// Experience sub-score on 0–100 from already-computed industry and role agreement.
pub fn score_experience(
    required_min: f64,
    required_max: Option<f64>,
    candidate_years: f64,
    industry_match: f64,
    role_match: f64,
    config: &ExperienceConfig,
) -> Result<f64> {
    ensure_required_range(required_min, required_max)?;
    ensure_non_negative("candidate_years", candidate_years)?;
    let years = years_component(required_min, required_max, candidate_years, config);
    combine(years, industry_match, role_match, config)
}

fn ensure_required_range(required_min: f64, required_max: Option<f64>) -> Result<()> {
    ensure_non_negative("required_min", required_min)?;
    if let Some(max) = required_max {
        ensure_non_negative("required_max", max)?;
        if max < required_min {
            return Err(MatchError::invalid(
                "required_max",
                format!("must be >= required_min ({required_min}), got {max}"),
            ));
        }
    }
    Ok(())
}

fn combine(years: f64, industry_match: f64, role_match: f64, config: &ExperienceConfig) -> Result<f64> {
    ensure_unit("industry_match", industry_match)?;
    ensure_unit("role_match", role_match)?;

    let score = years * config.years_weight
        + industry_match * 100.0 * config.industry_weight
        + role_match * 100.0 * config.role_weight;

    Ok(score.clamp(0.0, 100.0))
}

/// Scores a full experience profile, deriving industry and role agreement from tags.
/// Unknown candidate years take `unknown_years_score` as the years component.
pub fn score_experience_profile(
    profile: &ExperienceProfile,
    config: &ExperienceConfig,
) -> Result<ExperienceBreakdown> {
    ensure_required_range(profile.required_min, profile.required_max)?;
    let job_industries = normalize_set("job_industries", &profile.job_industries)?;
    let candidate_industries = normalize_set("candidate_industries", &profile.candidate_industries)?;
    let industry = industry_match(&job_industries, &candidate_industries, config);
    let role = role_match(
        profile.job_role_level.as_deref(),
        profile.candidate_role_level.as_deref(),
        config,
    );

    let years = match profile.candidate_years {
        Some(years) => {
            ensure_non_negative("candidate_years", years)?;
            years_component(profile.required_min, profile.required_max, years, config)
        }
        None => {
            debug!("Candidate years unknown; using neutral years component");
            config.unknown_years_score
        }
    };

    Ok(ExperienceBreakdown {
        score: combine(years, industry, role, config)?,
        years_component: years,
        industry_match: industry,
        role_match: role,
    })
}

/// Share of the job's industries the candidate has worked in.
pub fn industry_match(
    job: &BTreeSet<String>,
    candidate: &BTreeSet<String>,
    config: &ExperienceConfig,
) -> f64 {
    if job.is_empty() || candidate.is_empty() {
        return config.neutral_match;
    }
    job.intersection(candidate).count() as f64 / job.len() as f64
}

/// Seniority ladder, lowest first. Each entry lists accepted spellings.
const ROLE_LADDER: &[&[&str]] = &[
    &["intern", "internship", "trainee", "apprentice"],
    &["junior", "jr", "entry", "entry level", "entry-level", "graduate"],
    &["mid", "mid level", "mid-level", "intermediate", "associate"],
    &["senior", "sr"],
    &["lead", "staff", "tech lead", "team lead"],
    &["principal", "architect", "distinguished"],
    &["director", "head", "vp", "executive", "cto"],
];

/// Position of a role-level tag on the seniority ladder.
pub fn role_rank(tag: &str) -> Option<usize> {
    let tag = normalize_token(tag);
    ROLE_LADDER
        .iter()
        .position(|aliases| aliases.iter().any(|alias| *alias == tag))
}

/// 1.0 for the same level, minus `role_step_penalty` per ladder step apart.
/// Unknown tags only compare equal to themselves; missing tags are neutral.
pub fn role_match(job: Option<&str>, candidate: Option<&str>, config: &ExperienceConfig) -> f64 {
    let (job, candidate) = match (job, candidate) {
        (Some(j), Some(c)) if !j.trim().is_empty() && !c.trim().is_empty() => (j, c),
        _ => return config.neutral_match,
    };

    match (role_rank(job), role_rank(candidate)) {
        (Some(j), Some(c)) => {
            let steps = j.abs_diff(c) as f64;
            (1.0 - steps * config.role_step_penalty).max(0.0)
        }
        _ if normalize_token(job) == normalize_token(candidate) => 1.0,
        _ => config.neutral_match,
    }
}
