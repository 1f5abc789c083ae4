use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Geocoded coordinates in decimal degrees. Geocoding happens upstream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// A free-form place label plus optional coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
}

impl Location {
    pub fn labeled(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            coordinates: None,
        }
    }

    pub fn at(lat: f64, lon: f64) -> Self {
        Self {
            label: None,
            coordinates: Some(GeoPoint { lat, lon }),
        }
    }
}

/// Years of experience a job asks for. `max = None` means no upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRange {
    #[serde(default)]
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
}

/// Structured job record, already extracted from a job description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobProfile {
    pub job_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub nice_to_have_skills: Vec<String>,
    #[serde(default, alias = "experience_range")]
    pub experience: ExperienceRange,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub role_level: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub remote_ok: bool,
}

/// Structured candidate record, already extracted from a résumé.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub candidate_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_job_title: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    /// `None` when the extractor found no experience figure.
    #[serde(default)]
    pub years_experience: Option<f64>,
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub role_level: Option<String>,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub remote_ok: bool,
}

/// Externally computed similarity signals for one job/candidate pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSignals {
    /// Whole-document embedding similarity (e.g. cosine from a vector search), 0–1.
    #[serde(default)]
    pub embedding_similarity: Option<f64>,
    /// Per required-skill similarity (0–1), keyed by the job's skill token.
    #[serde(default)]
    pub skill_similarity: BTreeMap<String, f64>,
}

impl MatchSignals {
    pub fn with_embedding(similarity: f64) -> Self {
        Self {
            embedding_similarity: Some(similarity),
            ..Self::default()
        }
    }
}

/// One candidate in a batch, with the signals computed for it against the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateInput {
    pub profile: CandidateProfile,
    #[serde(default)]
    pub signals: MatchSignals,
}

impl From<CandidateProfile> for CandidateInput {
    fn from(profile: CandidateProfile) -> Self {
        Self {
            profile,
            signals: MatchSignals::default(),
        }
    }
}

/// One job in a candidate-side batch, with the signals computed for it against the candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobInput {
    pub profile: JobProfile,
    #[serde(default)]
    pub signals: MatchSignals,
}

impl From<JobProfile> for JobInput {
    fn from(profile: JobProfile) -> Self {
        Self {
            profile,
            signals: MatchSignals::default(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-matcher inputs
// ────────────────────────────────────────────────────────────────────────────

/// Skill tokens for both sides of a match. Tokens are normalized on scoring.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SkillProfile {
    pub required: Vec<String>,
    pub nice_to_have: Vec<String>,
    pub possessed: Vec<String>,
    /// Similarity for required tokens that have no exact counterpart.
    #[serde(default)]
    pub semantic_similarity: BTreeMap<String, f64>,
}

impl SkillProfile {
    pub fn from_pair(job: &JobProfile, candidate: &CandidateProfile, signals: &MatchSignals) -> Self {
        Self {
            required: job.required_skills.clone(),
            nice_to_have: job.nice_to_have_skills.clone(),
            possessed: candidate.skills.clone(),
            semantic_similarity: signals.skill_similarity.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExperienceProfile {
    pub required_min: f64,
    pub required_max: Option<f64>,
    /// Unknown years score a neutral years component.
    #[serde(default)]
    pub candidate_years: Option<f64>,
    #[serde(default)]
    pub job_industries: Vec<String>,
    #[serde(default)]
    pub candidate_industries: Vec<String>,
    #[serde(default)]
    pub job_role_level: Option<String>,
    #[serde(default)]
    pub candidate_role_level: Option<String>,
}

impl ExperienceProfile {
    pub fn from_pair(job: &JobProfile, candidate: &CandidateProfile) -> Self {
        Self {
            required_min: job.experience.min,
            required_max: job.experience.max,
            candidate_years: candidate.years_experience,
            job_industries: job.industries.clone(),
            candidate_industries: candidate.industries.clone(),
            job_role_level: job.role_level.clone(),
            candidate_role_level: candidate.role_level.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationProfile {
    pub job: Location,
    pub candidate: Location,
    pub job_remote_ok: bool,
    pub candidate_remote_ok: bool,
}

impl LocationProfile {
    pub fn from_pair(job: &JobProfile, candidate: &CandidateProfile) -> Self {
        Self {
            job: job.location.clone(),
            candidate: candidate.location.clone(),
            job_remote_ok: job.remote_ok,
            candidate_remote_ok: candidate.remote_ok,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_profile_accepts_experience_range_alias() {
        let job: JobProfile = serde_json::from_value(json!({
            "job_id": "job-1",
            "required_skills": ["Rust"],
            "experience_range": {"min": 3, "max": 7}
        }))
        .unwrap();
        assert_eq!(job.experience.min, 3.0);
        assert_eq!(job.experience.max, Some(7.0));
        assert!(!job.remote_ok);
    }

    #[test]
    fn test_candidate_input_defaults_to_no_signals() {
        let input: CandidateInput = serde_json::from_value(json!({
            "profile": {"candidate_id": "c-1", "skills": ["python"]}
        }))
        .unwrap();
        assert!(input.signals.embedding_similarity.is_none());
        assert!(input.signals.skill_similarity.is_empty());
    }

    #[test]
    fn test_candidate_without_years_keeps_them_unknown() {
        let candidate: CandidateProfile =
            serde_json::from_value(json!({"candidate_id": "c-2", "skills": ["rust"]})).unwrap();
        assert_eq!(candidate.years_experience, None);
        let job = JobProfile {
            job_id: "j".to_string(),
            ..JobProfile::default()
        };
        assert_eq!(ExperienceProfile::from_pair(&job, &candidate).candidate_years, None);
    }

    #[test]
    fn test_location_profile_from_pair_copies_remote_flags() {
        let job = JobProfile {
            job_id: "j".to_string(),
            remote_ok: true,
            location: Location::labeled("Berlin"),
            ..JobProfile::default()
        };
        let candidate = CandidateProfile {
            candidate_id: "c".to_string(),
            location: Location::at(48.85, 2.35),
            ..CandidateProfile::default()
        };
        let profile = LocationProfile::from_pair(&job, &candidate);
        assert!(profile.job_remote_ok);
        assert!(!profile.candidate_remote_ok);
        assert_eq!(profile.job.label.as_deref(), Some("Berlin"));
        assert!(profile.candidate.coordinates.is_some());
    }
}
