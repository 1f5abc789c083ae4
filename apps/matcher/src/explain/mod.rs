//! Match explanations: pluggable, trait-based writers for the human-readable
//! summary attached to a `MatchResult`.
//!
//! Default: `TemplateExplainer` (deterministic, no network).
//! `LlmExplainer` asks the chat model for a short recruiter-style summary.
//!
//! `MatchService` holds an `Arc<dyn Explainer>`, chosen at startup from config.

pub mod prompts;

use async_trait::async_trait;

use crate::errors::{MatchError, Result};
use crate::llm_client::LlmClient;
use crate::models::{CandidateProfile, JobProfile, MatchResult};
use crate::scoring::normalize::normalize_set;
use prompts::{MATCH_SUMMARY_PROMPT_TEMPLATE, MATCH_SUMMARY_SYSTEM};

/// Writes the explanation for an already-scored match. Implement this to swap
/// backends without touching the scoring or batch code.
#[async_trait]
pub trait Explainer: Send + Sync {
    async fn explain(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
        result: &MatchResult,
    ) -> Result<String>;

    /// Short backend label ("template" | "llm") for logs.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// TemplateExplainer
// ────────────────────────────────────────────────────────────────────────────

/// Builds the summary from scores and required-skill gaps. Same inputs, same text.
pub struct TemplateExplainer;

#[async_trait]
impl Explainer for TemplateExplainer {
    async fn explain(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
        result: &MatchResult,
    ) -> Result<String> {
        build_summary(job, candidate, result)
    }

    fn backend(&self) -> &'static str {
        "template"
    }
}

fn build_summary(
    job: &JobProfile,
    candidate: &CandidateProfile,
    result: &MatchResult,
) -> Result<String> {
    let required = normalize_set("required_skills", &job.required_skills)?;
    let possessed = normalize_set("skills", &candidate.skills)?;

    let covered = required.intersection(&possessed).count();
    let gaps: Vec<&str> = required
        .difference(&possessed)
        .take(3)
        .map(String::as_str)
        .collect();

    let score = result.overall_score;
    let mut summary = if score >= 80 {
        format!("Strong match ({score}/100).")
    } else if score >= 60 {
        format!("Moderate match ({score}/100).")
    } else {
        format!("Weak match ({score}/100).")
    };

    if !required.is_empty() {
        summary.push_str(&format!(
            " Covers {covered} of {} required skills.",
            required.len()
        ));
    }
    if !gaps.is_empty() {
        summary.push_str(&format!(" Missing: {}.", gaps.join(", ")));
    }

    let unavailable: Vec<&str> = crate::scoring::Dimension::ALL
        .iter()
        .filter(|d| result.sub_score(**d).is_none())
        .map(|d| d.as_str())
        .collect();
    if !unavailable.is_empty() {
        summary.push_str(&format!(
            " Not scored: {} (weight redistributed).",
            unavailable.join(", ")
        ));
    }

    Ok(summary)
}

// ────────────────────────────────────────────────────────────────────────────
// LlmExplainer
// ────────────────────────────────────────────────────────────────────────────

/// Summary written by the chat model.
pub struct LlmExplainer(pub LlmClient);

#[async_trait]
impl Explainer for LlmExplainer {
    async fn explain(
        &self,
        job: &JobProfile,
        candidate: &CandidateProfile,
        result: &MatchResult,
    ) -> Result<String> {
        let prompt = render_match_summary_prompt(job, candidate, result);
        self.0
            .complete(&prompt, MATCH_SUMMARY_SYSTEM)
            .await
            .map_err(MatchError::from)
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

fn score_or_na(score: Option<u8>) -> String {
    score.map_or_else(|| "n/a".to_string(), |s| s.to_string())
}

pub fn render_match_summary_prompt(
    job: &JobProfile,
    candidate: &CandidateProfile,
    result: &MatchResult,
) -> String {
    let experience_range = match job.experience.max {
        Some(max) => format!("{}-{} years", job.experience.min, max),
        None => format!("{}+ years", job.experience.min),
    };

    MATCH_SUMMARY_PROMPT_TEMPLATE
        .replace("{job_title}", job.title.as_deref().unwrap_or("Unknown"))
        .replace("{required_skills}", &job.required_skills.join(", "))
        .replace("{experience_range}", &experience_range)
        .replace("{candidate_name}", candidate.name.as_deref().unwrap_or("Unknown"))
        .replace(
            "{current_role}",
            candidate.current_job_title.as_deref().unwrap_or("Unknown"),
        )
        .replace("{candidate_skills}", &candidate.skills.join(", "))
        .replace(
            "{candidate_years}",
            &candidate
                .years_experience
                .map_or_else(|| "unknown".to_string(), |y| y.to_string()),
        )
        .replace("{overall_score}", &result.overall_score.to_string())
        .replace("{skills_match_score}", &score_or_na(result.skills_match_score))
        .replace(
            "{experience_match_score}",
            &score_or_na(result.experience_match_score),
        )
        .replace(
            "{location_match_score}",
            &score_or_na(result.location_match_score),
        )
}
