use serde::{Deserialize, Serialize};

use crate::errors::{MatchError, Result};

/// The three sub-scores feeding the overall match score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Skills,
    Experience,
    Location,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Dimension::Skills, Dimension::Experience, Dimension::Location];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Skills => "skills",
            Dimension::Experience => "experience",
            Dimension::Location => "location",
        }
    }
}

/// Relative weight of each sub-score in the overall match score.
/// Callers may override per tenant or per job category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub skills: f64,
    pub experience: f64,
    pub location: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            skills: 0.7,
            experience: 0.2,
            location: 0.1,
        }
    }
}

impl Weights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Skills => self.skills,
            Dimension::Experience => self.experience,
            Dimension::Location => self.location,
        }
    }

    pub fn sum(&self) -> f64 {
        self.skills + self.experience + self.location
    }

    /// Every weight finite and non-negative, with a positive total.
    pub fn validate(&self) -> Result<()> {
        for dimension in Dimension::ALL {
            let w = self.get(dimension);
            if !w.is_finite() || w < 0.0 {
                return Err(MatchError::invalid(
                    format!("weights.{}", dimension.as_str()),
                    format!("must be a finite non-negative number, got {w}"),
                ));
            }
        }
        if self.sum() <= 0.0 {
            return Err(MatchError::invalid("weights", "at least one weight must be positive"));
        }
        Ok(())
    }

    /// Weights restricted to `present` dimensions, scaled so they sum to 1.0.
    /// Absent dimensions get weight 0.
    pub fn renormalized(&self, present: &[Dimension]) -> Result<Weights> {
        self.validate()?;

        let keep = |d: Dimension| if present.contains(&d) { self.get(d) } else { 0.0 };
        let kept = Weights {
            skills: keep(Dimension::Skills),
            experience: keep(Dimension::Experience),
            location: keep(Dimension::Location),
        };

        let total = kept.sum();
        if total <= 0.0 {
            let missing = Dimension::ALL
                .iter()
                .filter(|d| !present.contains(d))
                .map(|d| d.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(MatchError::IncompleteMatch { missing });
        }

        Ok(Weights {
            skills: kept.skills / total,
            experience: kept.experience / total,
            location: kept.location / total,
        })
    }
}
