pub mod candidate;
pub mod job;
pub mod result;

pub use candidate::{
    CandidateProfile, EducationEntry, EnrichmentSignals, ExperienceEntry, GithubSignals,
    SocialSignals, Website,
};
pub use job::Job;
pub use result::{ExecutionMetadata, PipelineResult, ScoredCandidate, Stage, StageCounts};
