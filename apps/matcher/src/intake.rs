//! Turns extractor output (often an LLM reply) into typed profiles.
//!
//! Malformed records are errors. Nothing here substitutes an empty profile.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::errors::ParseError;
use crate::llm_client::strip_json_fences;
use crate::models::{CandidateProfile, JobProfile};

pub fn parse_job_record(raw: &str) -> Result<JobProfile, ParseError> {
    let job: JobProfile = parse_record(raw, "job_id")?;

    if job.experience.min < 0.0 || !job.experience.min.is_finite() {
        return Err(invalid("experience.min", "must be a non-negative number"));
    }
    if let Some(max) = job.experience.max {
        if !max.is_finite() || max < job.experience.min {
            return Err(invalid(
                "experience.max",
                format!("must be >= experience.min ({})", job.experience.min),
            ));
        }
    }
    ensure_no_blank("required_skills", &job.required_skills)?;
    ensure_no_blank("nice_to_have_skills", &job.nice_to_have_skills)?;

    debug!(job_id = %job.job_id, "Parsed job record");
    Ok(job)
}

pub fn parse_candidate_record(raw: &str) -> Result<CandidateProfile, ParseError> {
    let candidate: CandidateProfile = parse_record(raw, "candidate_id")?;

    if let Some(years) = candidate.years_experience {
        if years < 0.0 || !years.is_finite() {
            return Err(invalid("years_experience", "must be a non-negative number"));
        }
    }
    ensure_no_blank("skills", &candidate.skills)?;

    debug!(candidate_id = %candidate.candidate_id, "Parsed candidate record");
    Ok(candidate)
}

/// Parses after stripping code fences, requiring a non-blank string `id_field`.
fn parse_record<T: DeserializeOwned>(raw: &str, id_field: &str) -> Result<T, ParseError> {
    let value: Value = serde_json::from_str(strip_json_fences(raw))?;

    match value.get(id_field) {
        Some(Value::String(id)) if !id.trim().is_empty() => {}
        Some(Value::String(_)) => {
            return Err(invalid(id_field, "must not be blank"));
        }
        Some(_) => return Err(invalid(id_field, "must be a string")),
        None => return Err(ParseError::MissingField(id_field.to_string())),
    }

    Ok(serde_json::from_value(value)?)
}

fn ensure_no_blank(field: &str, values: &[String]) -> Result<(), ParseError> {
    match values.iter().position(|v| v.trim().is_empty()) {
        Some(i) => Err(invalid(format!("{field}[{i}]"), "must not be blank")),
        None => Ok(()),
    }
}

fn invalid(field: impl Into<String>, reason: impl Into<String>) -> ParseError {
    ParseError::InvalidValue {
        field: field.into(),
        reason: reason.into(),
    }
}
