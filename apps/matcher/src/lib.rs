//! Job/candidate match scoring.
//!
//! Scores a structured job profile against candidate profiles on skills,
//! experience and location, combines the sub-scores with configurable weights,
//! and attaches a human-readable explanation.

pub mod config;
pub mod errors;
pub mod explain;
pub mod intake;
pub mod llm_client;
pub mod matching;
pub mod models;
pub mod scoring;
pub mod telemetry;

pub use config::{Config, ScoringConfig};
pub use errors::{MatchError, ParseError, Result};
pub use explain::{Explainer, LlmExplainer, TemplateExplainer};
pub use intake::{parse_candidate_record, parse_job_record};
pub use matching::{
    evaluate_pair, score_pair, BulkMatchReport, JobBulkReport, MatchService, PairEvaluation, Ranking,
};
pub use models::{
    CandidateInput, CandidateMatch, CandidateProfile, JobInput, JobMatch, JobProfile, MatchResult,
    MatchSignals,
};
pub use scoring::{compute_match, Dimension, SimilarityThreshold, Weights};
