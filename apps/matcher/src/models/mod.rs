pub mod match_result;
pub mod profile;

pub use match_result::{CandidateMatch, JobMatch, MatchResult};
pub use profile::{
    CandidateInput, CandidateProfile, ExperienceProfile, ExperienceRange, GeoPoint, JobInput,
    JobProfile, Location, LocationProfile, MatchSignals, SkillProfile,
};
