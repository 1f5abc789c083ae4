// Match scoring core: three independent sub-matchers, the composite scorer,
// and the threshold filter used for ranking. Everything here is pure.

pub mod composite;
pub mod experience;
pub mod location;
pub mod normalize;
pub mod similarity;
pub mod skills;
pub mod threshold;
pub mod weights;

pub use composite::{compute_match, compute_partial_match, SubScores};
pub use experience::{score_experience, score_experience_profile, ExperienceConfig};
pub use location::{score_location, score_location_profile, LocationConfig};
pub use similarity::cosine_similarity;
pub use skills::{score_skills, SkillBreakdown, SkillConfig};
pub use threshold::{filter_by_threshold, rank_matches, Ranked, SimilarityHit, SimilarityThreshold};
pub use weights::{Dimension, Weights};
