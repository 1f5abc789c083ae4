use serde::{Deserialize, Serialize};

use crate::models::profile::{CandidateProfile, JobProfile};
use crate::scoring::weights::{Dimension, Weights};

/// Outcome of scoring one job/candidate pair.
///
/// Built once by the composite scorer and never mutated afterwards; the
/// explanation is attached by producing a new value via `with_explanation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub overall_score: u8,
    /// `None` only when the sub-score was unavailable and its weight redistributed.
    pub skills_match_score: Option<u8>,
    pub experience_match_score: Option<u8>,
    pub location_match_score: Option<u8>,
    /// Weights actually applied, always summing to 1.0.
    pub effective_weights: Weights,
    /// Filled by an `Explainer`; empty straight out of the scorer.
    #[serde(default)]
    pub explanation: String,
}

impl MatchResult {
    pub fn with_explanation(self, explanation: impl Into<String>) -> Self {
        Self {
            explanation: explanation.into(),
            ..self
        }
    }

    pub fn sub_score(&self, dimension: Dimension) -> Option<u8> {
        match dimension {
            Dimension::Skills => self.skills_match_score,
            Dimension::Experience => self.experience_match_score,
            Dimension::Location => self.location_match_score,
        }
    }

    pub fn is_partial(&self) -> bool {
        Dimension::ALL.iter().any(|d| self.sub_score(*d).is_none())
    }
}

/// A scored candidate as returned by ranking and batch operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateMatch {
    pub candidate_id: String,
    pub candidate_name: Option<String>,
    pub current_job_title: Option<String>,
    pub key_skills: Vec<String>,
    pub result: MatchResult,
}

/// Number of skills surfaced on a `CandidateMatch` or `JobMatch`.
const KEY_SKILLS_LIMIT: usize = 5;

impl CandidateMatch {
    pub fn new(candidate: &CandidateProfile, result: MatchResult) -> Self {
        Self {
            candidate_id: candidate.candidate_id.clone(),
            candidate_name: candidate.name.clone(),
            current_job_title: candidate.current_job_title.clone(),
            key_skills: candidate
                .skills
                .iter()
                .take(KEY_SKILLS_LIMIT)
                .cloned()
                .collect(),
            result,
        }
    }

    pub fn overall_score(&self) -> u8 {
        self.result.overall_score
    }
}

/// A scored job as returned when ranking jobs for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobMatch {
    pub job_id: String,
    pub title: Option<String>,
    /// The job's location label, if it has one.
    pub location: Option<String>,
    pub key_skills: Vec<String>,
    pub result: MatchResult,
}

impl JobMatch {
    pub fn new(job: &JobProfile, result: MatchResult) -> Self {
        Self {
            job_id: job.job_id.clone(),
            title: job.title.clone(),
            location: job.location.label.clone(),
            key_skills: job
                .required_skills
                .iter()
                .take(KEY_SKILLS_LIMIT)
                .cloned()
                .collect(),
            result,
        }
    }

    pub fn overall_score(&self) -> u8 {
        self.result.overall_score
    }
}
