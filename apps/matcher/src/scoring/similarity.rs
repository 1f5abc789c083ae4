use crate::errors::{MatchError, Result};

/// Cosine similarity between two embeddings, clamped to [0, 1] so it can be
/// fed straight into the skill matcher or the threshold filter.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(MatchError::invalid(
            "embedding",
            format!("dimension mismatch: {} vs {}", a.len(), b.len()),
        ));
    }
    if a.is_empty() {
        return Err(MatchError::invalid("embedding", "embeddings are empty"));
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(MatchError::invalid("embedding", "zero-length vector"));
    }
    if !dot.is_finite() || !norm_a.is_finite() || !norm_b.is_finite() {
        return Err(MatchError::invalid("embedding", "contains non-finite values"));
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(0.0, 1.0))
}
