//! Pair evaluation and the `MatchService` handle used by host services.
//!
//! `evaluate_pair` runs the three sub-matchers independently. A sub-matcher
//! that rejects its input only takes its own dimension out of the match: if
//! that dimension is required the original error is returned, otherwise its
//! weight is redistributed by the composite scorer.

pub mod batch;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::{Config, ScoringConfig};
use crate::errors::{MatchError, Result};
use crate::explain::{Explainer, LlmExplainer, TemplateExplainer};
use crate::llm_client::LlmClient;
use crate::models::{
    CandidateInput, CandidateMatch, CandidateProfile, ExperienceProfile, JobInput, JobMatch,
    JobProfile, LocationProfile, MatchResult, MatchSignals, SkillProfile,
};
use crate::scoring::experience::{score_experience_profile, ExperienceBreakdown};
use crate::scoring::location::score_location_profile;
use crate::scoring::skills::{score_skills, SkillBreakdown};
use crate::scoring::threshold::{
    filter_by_threshold, rank_matches, Ranked, SimilarityHit, SimilarityThreshold,
};
use crate::scoring::{compute_partial_match, Dimension, SubScores};

pub use batch::{BulkMatchReport, JobBulkReport};

/// A sub-matcher that could not produce a score for this pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedDimension {
    pub dimension: Dimension,
    pub reason: String,
}

/// Ranked matches plus the scoring failures that were left out of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ranking<T> {
    pub matches: Vec<T>,
    /// One message per input that could not be scored, naming its id.
    pub errors: Vec<String>,
}

/// Full detail behind a `MatchResult`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairEvaluation {
    pub result: MatchResult,
    pub skills: Option<SkillBreakdown>,
    pub experience: Option<ExperienceBreakdown>,
    pub location: Option<f64>,
    pub skipped: Vec<SkippedDimension>,
}

/// Scores one job/candidate pair. Pure: no I/O, no clock, no randomness.
pub fn evaluate_pair(
    job: &JobProfile,
    candidate: &CandidateProfile,
    signals: &MatchSignals,
    config: &ScoringConfig,
) -> Result<PairEvaluation> {
    let skills = score_skills(
        &SkillProfile::from_pair(job, candidate, signals),
        signals.embedding_similarity,
        &config.skills,
    );
    let experience =
        score_experience_profile(&ExperienceProfile::from_pair(job, candidate), &config.experience);
    let location =
        score_location_profile(&LocationProfile::from_pair(job, candidate), &config.location);

    let mut skipped = Vec::new();
    let skills = settle(Dimension::Skills, skills, config, &mut skipped)?;
    let experience = settle(Dimension::Experience, experience, config, &mut skipped)?;
    let location = settle(Dimension::Location, location, config, &mut skipped)?;

    for skip in &skipped {
        warn!(
            job_id = %job.job_id,
            candidate_id = %candidate.candidate_id,
            dimension = skip.dimension.as_str(),
            reason = %skip.reason,
            "Sub-score unavailable; redistributing its weight"
        );
    }

    let scores = SubScores {
        skills: skills.as_ref().map(|b| b.score),
        experience: experience.as_ref().map(|b| b.score),
        location,
    };
    let result = compute_partial_match(&scores, &config.weights, &config.required_dimensions)?;

    Ok(PairEvaluation {
        result,
        skills,
        experience,
        location,
        skipped,
    })
}

/// Scores one pair, returning only the `MatchResult`.
pub fn score_pair(
    job: &JobProfile,
    candidate: &CandidateProfile,
    signals: &MatchSignals,
    config: &ScoringConfig,
) -> Result<MatchResult> {
    evaluate_pair(job, candidate, signals, config).map(|e| e.result)
}

/// Required dimensions propagate their error; optional ones are recorded as skipped.
fn settle<T>(
    dimension: Dimension,
    outcome: Result<T>,
    config: &ScoringConfig,
    skipped: &mut Vec<SkippedDimension>,
) -> Result<Option<T>> {
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(err) if config.required_dimensions.contains(&dimension) => Err(err),
        Err(err) => {
            skipped.push(SkippedDimension {
                dimension,
                reason: err.to_string(),
            });
            Ok(None)
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MatchService
// ────────────────────────────────────────────────────────────────────────────

/// Shared handle bundling the scoring config with the explanation backend.
/// Cheap to clone; safe to use from any number of tasks.
#[derive(Clone)]
pub struct MatchService {
    config: Arc<ScoringConfig>,
    explainer: Arc<dyn Explainer>,
}

impl MatchService {
    pub fn new(config: ScoringConfig, explainer: Arc<dyn Explainer>) -> Result<Self> {
        config
            .validate()
            .map_err(|e| MatchError::Config(e.to_string()))?;
        Ok(Self {
            config: Arc::new(config),
            explainer,
        })
    }

    /// Uses `LlmExplainer` when an API key is configured, `TemplateExplainer` otherwise.
    pub fn from_config(config: &Config) -> Result<Self> {
        let explainer: Arc<dyn Explainer> = match &config.groq_api_key {
            Some(key) => {
                let llm = LlmClient::new(key.clone(), config.groq_model.clone())?;
                Arc::new(LlmExplainer(llm))
            }
            None => Arc::new(TemplateExplainer),
        };
        info!(
            explainer = explainer.backend(),
            "Match service initialized"
        );
        Self::new(config.scoring.clone(), explainer)
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn explainer_backend(&self) -> &'static str {
        self.explainer.backend()
    }

    pub fn match_pair(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
        signals: &MatchSignals,
    ) -> Result<MatchResult> {
        score_pair(job, candidate, signals, &self.config)
    }

    /// Returns a copy of `result` with the explanation filled in.
    pub async fn explain(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
        result: MatchResult,
    ) -> Result<MatchResult> {
        let text = self.explainer.explain(job, candidate, &result).await?;
        Ok(result.with_explanation(text))
    }

    pub async fn match_and_explain(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
        signals: &MatchSignals,
    ) -> Result<MatchResult> {
        let result = self.match_pair(job, candidate, signals)?;
        self.explain(job, candidate, result).await
    }

    pub async fn bulk_match(&self, job: &JobProfile, candidates: Vec<CandidateInput>) -> BulkMatchReport {
        batch::bulk_match(Arc::clone(&self.config), job, candidates).await
    }

    /// Best candidates for a job: scores everyone, keeps `overall >= min_score`,
    /// returns at most `limit`. Unset bounds fall back to the config.
    pub async fn rank_candidates(
        &self,
        job: &JobProfile,
        candidates: Vec<CandidateInput>,
        min_score: Option<u8>,
        limit: Option<usize>,
    ) -> Result<Ranking<CandidateMatch>> {
        let report = self.bulk_match(job, candidates).await;
        Ok(Ranking {
            matches: self.rank(report.matches, min_score, limit)?,
            errors: report.errors,
        })
    }

    pub async fn bulk_match_jobs(
        &self,
        candidate: &CandidateProfile,
        jobs: Vec<JobInput>,
    ) -> JobBulkReport {
        batch::bulk_match_jobs(Arc::clone(&self.config), candidate, jobs).await
    }

    /// Best jobs for a candidate, with the same bounds as `rank_candidates`.
    pub async fn rank_jobs(
        &self,
        candidate: &CandidateProfile,
        jobs: Vec<JobInput>,
        min_score: Option<u8>,
        limit: Option<usize>,
    ) -> Result<Ranking<JobMatch>> {
        let report = self.bulk_match_jobs(candidate, jobs).await;
        Ok(Ranking {
            matches: self.rank(report.matches, min_score, limit)?,
            errors: report.errors,
        })
    }

    fn rank<T: Ranked>(
        &self,
        matches: Vec<T>,
        min_score: Option<u8>,
        limit: Option<usize>,
    ) -> Result<Vec<T>> {
        rank_matches(
            matches,
            min_score.unwrap_or(self.config.min_score),
            Some(limit.unwrap_or(self.config.result_limit)),
        )
    }

    /// Threshold filter with the configured defaults for τ and top-K.
    pub fn filter_hits<T>(
        &self,
        hits: Vec<SimilarityHit<T>>,
        threshold: Option<SimilarityThreshold>,
        top_k: Option<usize>,
    ) -> Result<Vec<SimilarityHit<T>>> {
        filter_by_threshold(
            hits,
            threshold.unwrap_or(self.config.similarity_threshold),
            Some(top_k.unwrap_or(self.config.result_limit)),
        )
    }

    /// Explains many results concurrently, keeping input order. A failed
    /// explanation leaves that result's explanation empty.
    pub async fn explain_all(
        &self,
        job: &JobProfile,
        pairs: Vec<(CandidateProfile, MatchResult)>,
    ) -> Vec<MatchResult> {
        batch::explain_all(Arc::clone(&self.explainer), job, pairs).await
    }
}
