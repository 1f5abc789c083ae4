use std::collections::BTreeSet;

use crate::errors::{MatchError, Result};

/// Lowercases and collapses internal whitespace: `"  Fast API "` → `"fast api"`.
pub fn normalize_token(token: &str) -> String {
    token
        .split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes a token list into a set. A token that is empty after
/// normalization is malformed input, not something to drop silently.
pub fn normalize_set(field: &str, tokens: &[String]) -> Result<BTreeSet<String>> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, raw)| {
            let token = normalize_token(raw);
            if token.is_empty() {
                Err(MatchError::invalid(
                    format!("{field}[{i}]"),
                    "token is empty after normalization",
                ))
            } else {
                Ok(token)
            }
        })
        .collect()
}

/// Rejects values outside [0, 1], including NaN.
pub fn ensure_unit(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(MatchError::invalid(field, format!("must be within [0, 1], got {value}")))
    }
}

/// Rejects negative or non-finite values.
pub fn ensure_non_negative(field: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MatchError::invalid(field, format!("must be a non-negative number, got {value}")))
    }
}

/// Clamps a raw 0–100 score and rounds it for reporting.
pub fn to_score(raw: f64) -> u8 {
    raw.clamp(0.0, 100.0).round() as u8
}
