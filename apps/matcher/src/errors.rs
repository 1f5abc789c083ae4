use thiserror::Error;

use crate::llm_client::LlmError;

/// Crate-level error type returned by every matcher and by `MatchService`.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Invalid input for '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Incomplete match: required sub-score '{missing}' is unavailable")]
    IncompleteMatch { missing: String },

    #[error("Record parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl MatchError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        MatchError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Field name carried by `InvalidInput`, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            MatchError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Failure to turn an extractor's JSON output into a profile.
/// Returned instead of falling back to an empty default record.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing field: {0}")]
    MissingField(String),

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

pub type Result<T, E = MatchError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_names_field() {
        let err = MatchError::invalid("candidate_years", "must be non-negative");
        assert_eq!(err.field(), Some("candidate_years"));
        assert!(err.to_string().contains("candidate_years"));
    }

    #[test]
    fn test_parse_error_converts() {
        let err: MatchError = ParseError::MissingField("job_id".to_string()).into();
        assert!(matches!(err, MatchError::Parse(_)));
        assert!(err.to_string().contains("job_id"));
    }
}
