//! Batch matching: one job against many candidates, or one candidate
//! against many jobs.
//!
//! Each pair is independent, so the input list is split into chunks that are
//! scored on the blocking pool and merged back in chunk order. An item that
//! fails to score is reported in `errors`; it never aborts the batch.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::ScoringConfig;
use crate::explain::Explainer;
use crate::matching::score_pair;
use crate::models::{
    CandidateInput, CandidateMatch, CandidateProfile, JobInput, JobMatch, JobProfile, MatchResult,
};
use crate::scoring::threshold::sort_matches;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkMatchReport {
    pub batch_id: Uuid,
    pub job_id: String,
    pub started_at: DateTime<Utc>,
    pub total_candidates: usize,
    pub processed_candidates: usize,
    /// Best first; ties ordered by candidate id.
    pub matches: Vec<CandidateMatch>,
    pub errors: Vec<String>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobBulkReport {
    pub batch_id: Uuid,
    pub candidate_id: String,
    pub started_at: DateTime<Utc>,
    pub total_jobs: usize,
    pub processed_jobs: usize,
    /// Best first; ties ordered by job id.
    pub matches: Vec<JobMatch>,
    pub errors: Vec<String>,
    pub processing_time_ms: u64,
}

type ChunkOutcome<O> = Vec<Result<O, String>>;

fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Runs `score` over `items` in chunks on the blocking pool. Successes keep
/// input order; failures become error messages.
async fn score_in_chunks<I, O, F>(batch_id: Uuid, items: Vec<I>, score: F) -> (Vec<O>, Vec<String>)
where
    I: Send + 'static,
    O: Send + 'static,
    F: Fn(I) -> Result<O, String> + Send + Sync + 'static,
{
    let total = items.len();
    let chunk_size = total.div_ceil(worker_count()).max(1);
    let score = Arc::new(score);
    let mut tasks: JoinSet<(usize, ChunkOutcome<O>)> = JoinSet::new();

    let mut remaining = items.into_iter().peekable();
    let mut chunk_index = 0;
    while remaining.peek().is_some() {
        let chunk: Vec<I> = remaining.by_ref().take(chunk_size).collect();
        let score = Arc::clone(&score);
        let index = chunk_index;
        tasks.spawn_blocking(move || (index, chunk.into_iter().map(|item| score(item)).collect()));
        chunk_index += 1;
    }

    let mut chunks: Vec<(usize, ChunkOutcome<O>)> = Vec::with_capacity(chunk_index);
    let mut errors = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(chunk) => chunks.push(chunk),
            Err(e) => {
                warn!(%batch_id, error = %e, "Scoring worker failed");
                errors.push(format!("Scoring worker failed: {e}"));
            }
        }
    }
    chunks.sort_by_key(|(index, _)| *index);

    let mut scored = Vec::with_capacity(total);
    for outcome in chunks.into_iter().flat_map(|(_, outcomes)| outcomes) {
        match outcome {
            Ok(item) => scored.push(item),
            Err(message) => {
                warn!(%batch_id, "{message}");
                errors.push(message);
            }
        }
    }
    (scored, errors)
}

pub async fn bulk_match(
    config: Arc<ScoringConfig>,
    job: &JobProfile,
    candidates: Vec<CandidateInput>,
) -> BulkMatchReport {
    let batch_id = Uuid::new_v4();
    let started_at = Utc::now();
    let clock = Instant::now();
    let total_candidates = candidates.len();

    info!(%batch_id, job_id = %job.job_id, total_candidates, "Bulk match started");

    let shared_job = Arc::new(job.clone());
    let (mut matches, errors) = score_in_chunks(batch_id, candidates, move |input: CandidateInput| {
        score_pair(&shared_job, &input.profile, &input.signals, &config)
            .map(|result| CandidateMatch::new(&input.profile, result))
            .map_err(|e| format!("Error matching candidate {}: {e}", input.profile.candidate_id))
    })
    .await;
    sort_matches(&mut matches);

    let processing_time_ms = clock.elapsed().as_millis() as u64;
    info!(
        %batch_id,
        processed = matches.len(),
        failed = errors.len(),
        processing_time_ms,
        "Bulk match finished"
    );

    BulkMatchReport {
        batch_id,
        job_id: job.job_id.clone(),
        started_at,
        total_candidates,
        processed_candidates: matches.len(),
        matches,
        errors,
        processing_time_ms,
    }
}

/// Scores one candidate against many jobs.
pub async fn bulk_match_jobs(
    config: Arc<ScoringConfig>,
    candidate: &CandidateProfile,
    jobs: Vec<JobInput>,
) -> JobBulkReport {
    let batch_id = Uuid::new_v4();
    let started_at = Utc::now();
    let clock = Instant::now();
    let total_jobs = jobs.len();

    info!(%batch_id, candidate_id = %candidate.candidate_id, total_jobs, "Job match started");

    let shared_candidate = Arc::new(candidate.clone());
    let (mut matches, errors) = score_in_chunks(batch_id, jobs, move |input: JobInput| {
        score_pair(&input.profile, &shared_candidate, &input.signals, &config)
            .map(|result| JobMatch::new(&input.profile, result))
            .map_err(|e| format!("Error matching job {}: {e}", input.profile.job_id))
    })
    .await;
    sort_matches(&mut matches);

    let processing_time_ms = clock.elapsed().as_millis() as u64;
    info!(
        %batch_id,
        processed = matches.len(),
        failed = errors.len(),
        processing_time_ms,
        "Job match finished"
    );

    JobBulkReport {
        batch_id,
        candidate_id: candidate.candidate_id.clone(),
        started_at,
        total_jobs,
        processed_jobs: matches.len(),
        matches,
        errors,
        processing_time_ms,
    }
}

/// Fills explanations concurrently. Output order matches `pairs`.
pub async fn explain_all(
    explainer: Arc<dyn Explainer>,
    job: &JobProfile,
    pairs: Vec<(CandidateProfile, MatchResult)>,
) -> Vec<MatchResult> {
    let job = Arc::new(job.clone());
    let mut tasks: JoinSet<(usize, MatchResult)> = JoinSet::new();
    let mut slots: Vec<Option<MatchResult>> = Vec::with_capacity(pairs.len());

    for (index, (candidate, result)) in pairs.into_iter().enumerate() {
        slots.push(Some(result.clone()));
        let explainer = Arc::clone(&explainer);
        let job = Arc::clone(&job);
        tasks.spawn(async move {
            match explainer.explain(&job, &candidate, &result).await {
                Ok(text) => (index, result.with_explanation(text)),
                Err(e) => {
                    warn!(
                        candidate_id = %candidate.candidate_id,
                        backend = explainer.backend(),
                        error = %e,
                        "Explanation failed; leaving it empty"
                    );
                    (index, result)
                }
            }
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!(error = %e, "Explanation task failed"),
        }
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::errors::{MatchError, Result};
    use crate::explain::TemplateExplainer;
    use crate::models::{ExperienceRange, MatchSignals};

    fn job() -> JobProfile {
        JobProfile {
            job_id: "job-42".to_string(),
            required_skills: vec!["rust".to_string(), "tokio".to_string()],
            experience: ExperienceRange { min: 2.0, max: None },
            remote_ok: true,
            ..JobProfile::default()
        }
    }

    fn candidate(id: &str, skills: &[&str]) -> CandidateInput {
        CandidateProfile {
            candidate_id: id.to_string(),
            skills: skills.iter().map(|s| s.to_string()).collect(),
            years_experience: Some(4.0),
            ..CandidateProfile::default()
        }
        .into()
    }

    #[tokio::test]
    async fn test_bulk_match_orders_and_counts() {
        let candidates: Vec<CandidateInput> = (0..25)
            .map(|i| {
                let skills: &[&str] = if i % 2 == 0 { &["rust", "tokio"] } else { &["rust"] };
                candidate(&format!("c-{i:02}"), skills)
            })
            .collect();

        let report = bulk_match(Arc::new(ScoringConfig::default()), &job(), candidates).await;

        assert_eq!(report.job_id, "job-42");
        assert_eq!(report.total_candidates, 25);
        assert_eq!(report.processed_candidates, 25);
        assert!(report.errors.is_empty());
        assert!(report
            .matches
            .windows(2)
            .all(|w| w[0].overall_score() >= w[1].overall_score()));
        // Full coverage candidates come first, in id order.
        assert_eq!(report.matches[0].candidate_id, "c-00");
        assert_eq!(report.matches[1].candidate_id, "c-02");
    }

    #[tokio::test]
    async fn test_bulk_match_collects_failures() {
        let mut bad = candidate("bad", &["rust"]);
        bad.profile.years_experience = Some(-3.0);
        let mut blank = candidate("blank", &["rust"]);
        blank.profile.skills.push(String::new());

        let report = bulk_match(
            Arc::new(ScoringConfig::default()),
            &job(),
            vec![candidate("ok", &["rust", "tokio"]), bad, blank],
        )
        .await;

        assert_eq!(report.total_candidates, 3);
        // Negative years only knocks out the optional experience dimension.
        assert_eq!(report.processed_candidates, 2);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("blank"));
        let bad_match = report.matches.iter().find(|m| m.candidate_id == "bad").unwrap();
        assert_eq!(bad_match.result.experience_match_score, None);
    }

    #[tokio::test]
    async fn test_bulk_match_empty_input() {
        let report = bulk_match(Arc::new(ScoringConfig::default()), &job(), vec![]).await;
        assert_eq!(report.total_candidates, 0);
        assert!(report.matches.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_match_uses_signals() {
        let mut strong = candidate("strong", &["rust"]);
        strong.signals = MatchSignals::with_embedding(1.0);
        let mut weak = candidate("weak", &["rust"]);
        weak.signals = MatchSignals::with_embedding(0.0);

        let report =
            bulk_match(Arc::new(ScoringConfig::default()), &job(), vec![weak, strong]).await;
        assert_eq!(report.matches[0].candidate_id, "strong");
        assert!(report.matches[0].overall_score() > report.matches[1].overall_score());
    }

    struct FailingExplainer;

    #[async_trait]
    impl Explainer for FailingExplainer {
        async fn explain(
            &self,
            _job: &JobProfile,
            candidate: &CandidateProfile,
            _result: &MatchResult,
        ) -> Result<String> {
            if candidate.candidate_id == "boom" {
                Err(MatchError::invalid("candidate", "explainer refused"))
            } else {
                Ok(format!("ok {}", candidate.candidate_id))
            }
        }

        fn backend(&self) -> &'static str {
            "test"
        }
    }

    #[tokio::test]
    async fn test_explain_all_keeps_order_and_tolerates_failure() {
        let config = ScoringConfig::default();
        let job = job();
        let pairs: Vec<(CandidateProfile, MatchResult)> = ["a", "boom", "c"]
            .iter()
            .map(|id| {
                let input = candidate(id, &["rust"]);
                let result =
                    score_pair(&job, &input.profile, &input.signals, &config).unwrap();
                (input.profile, result)
            })
            .collect();

        let out = explain_all(Arc::new(FailingExplainer), &job, pairs).await;
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].explanation, "ok a");
        assert_eq!(out[1].explanation, "");
        assert_eq!(out[2].explanation, "ok c");
    }

    #[tokio::test]
    async fn test_explain_all_with_template() {
        let config = ScoringConfig::default();
        let job = job();
        let input = candidate("x", &["rust", "tokio"]);
        let result = score_pair(&job, &input.profile, &input.signals, &config).unwrap();
        let out = explain_all(Arc::new(TemplateExplainer), &job, vec![(input.profile, result)]).await;
        assert!(out[0].explanation.contains("Covers 2 of 2 required skills"));
    }

    fn posting(id: &str, required: &[&str]) -> JobInput {
        JobProfile {
            job_id: id.to_string(),
            required_skills: required.iter().map(|s| s.to_string()).collect(),
            experience: ExperienceRange { min: 2.0, max: None },
            remote_ok: true,
            ..JobProfile::default()
        }
        .into()
    }

    #[tokio::test]
    async fn test_bulk_match_jobs_orders_and_collects_failures() {
        let seeker = candidate("c-1", &["rust", "tokio"]).profile;
        let report = bulk_match_jobs(
            Arc::new(ScoringConfig::default()),
            &seeker,
            vec![
                posting("job-b", &["rust", "kafka"]),
                posting("job-c", &["rust", "tokio"]),
                posting("job-bad", &["rust", " "]),
                posting("job-a", &["rust", "tokio"]),
            ],
        )
        .await;

        assert_eq!(report.candidate_id, "c-1");
        assert_eq!(report.total_jobs, 4);
        assert_eq!(report.processed_jobs, 3);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("job-bad"));
        let ids: Vec<&str> = report.matches.iter().map(|m| m.job_id.as_str()).collect();
        assert_eq!(ids, vec!["job-a", "job-c", "job-b"]);
    }
}
