//! Threshold Filter: ranking step over externally supplied similarities
//! (e.g. cosine scores from a vector search), plus the equivalent ordering
//! for scored match lists in either direction.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::{MatchError, Result};
use crate::models::{CandidateMatch, JobMatch};
use crate::scoring::normalize::ensure_unit;

/// Minimum similarity a hit needs to survive ranking. Always within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct SimilarityThreshold(f64);

impl SimilarityThreshold {
    pub const DEFAULT: f64 = 0.5;

    pub fn new(value: f64) -> Result<Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MatchError::invalid(
                "similarity_threshold",
                format!("must be within [0, 1], got {value}"),
            ))
        }
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for SimilarityThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl TryFrom<f64> for SimilarityThreshold {
    type Error = MatchError;

    fn try_from(value: f64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SimilarityThreshold> for f64 {
    fn from(threshold: SimilarityThreshold) -> f64 {
        threshold.0
    }
}

/// One vector-search hit: a candidate, its similarity, and whatever payload
/// the caller wants carried through the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarityHit<T> {
    pub candidate_id: String,
    pub similarity: f64,
    pub item: T,
}

/// Keeps hits with `similarity >= threshold`, orders them by similarity
/// descending (candidate id ascending on ties) and returns at most `top_k`.
pub fn filter_by_threshold<T>(
    hits: Vec<SimilarityHit<T>>,
    threshold: SimilarityThreshold,
    top_k: Option<usize>,
) -> Result<Vec<SimilarityHit<T>>> {
    for (i, hit) in hits.iter().enumerate() {
        ensure_unit(&format!("hits[{i}].similarity"), hit.similarity)?;
    }

    let mut kept: Vec<SimilarityHit<T>> = hits
        .into_iter()
        .filter(|h| h.similarity >= threshold.value())
        .collect();

    kept.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });

    if let Some(k) = top_k {
        kept.truncate(k);
    }

    Ok(kept)
}

/// A scored match that can be ranked: overall score plus a stable id for ties.
pub trait Ranked {
    fn overall_score(&self) -> u8;
    fn ranking_id(&self) -> &str;
}

impl Ranked for CandidateMatch {
    fn overall_score(&self) -> u8 {
        self.result.overall_score
    }

    fn ranking_id(&self) -> &str {
        &self.candidate_id
    }
}

impl Ranked for JobMatch {
    fn overall_score(&self) -> u8 {
        self.result.overall_score
    }

    fn ranking_id(&self) -> &str {
        &self.job_id
    }
}

fn by_overall_score<T: Ranked>(a: &T, b: &T) -> Ordering {
    b.overall_score()
        .cmp(&a.overall_score())
        .then_with(|| a.ranking_id().cmp(b.ranking_id()))
}

/// Orders matches by overall score descending, id ascending on ties.
pub fn sort_matches<T: Ranked>(matches: &mut [T]) {
    matches.sort_by(by_overall_score);
}

/// Keeps matches scoring at least `min_score`, best first, at most `limit`.
pub fn rank_matches<T: Ranked>(
    matches: Vec<T>,
    min_score: u8,
    limit: Option<usize>,
) -> Result<Vec<T>> {
    if min_score > 100 {
        return Err(MatchError::invalid(
            "min_score",
            format!("must be within [0, 100], got {min_score}"),
        ));
    }

    let mut kept: Vec<T> = matches
        .into_iter()
        .filter(|m| m.overall_score() >= min_score)
        .collect();
    sort_matches(&mut kept);

    if let Some(limit) = limit {
        kept.truncate(limit);
    }
    Ok(kept)
}
