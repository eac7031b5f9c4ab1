//! Candidate scorer: pluggable, trait-based seam between the pipeline and the rubric.
//!
//! Default: `RubricScorer` (the six-criterion weighted rubric, pure and deterministic).
//! The pipeline holds an `Arc<dyn CandidateScorer>` and treats any `Err` as a
//! per-candidate failure, falling back to a default assessment.

use async_trait::async_trait;

use crate::errors::SourcingError;
use crate::models::candidate::CandidateProfile;
use crate::models::job::Job;
use crate::scoring::{assess, FitAssessment, ScoreBreakdown, ScoringWeights};

/// Score assigned to a candidate whose scoring failed.
pub const FALLBACK_SCORE: f64 = 5.0;
/// Confidence assigned to a candidate whose scoring failed.
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Implement this to swap scoring backends without touching the orchestrator.
#[async_trait]
pub trait CandidateScorer: Send + Sync {
    async fn score(&self, candidate: &CandidateProfile, job: &Job)
        -> Result<FitAssessment, SourcingError>;

    /// Short label for logs.
    fn backend(&self) -> &'static str;
}

/// The canonical weighted rubric.
#[derive(Debug, Clone, Default)]
pub struct RubricScorer {
    weights: ScoringWeights,
}

impl RubricScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }
}

#[async_trait]
impl CandidateScorer for RubricScorer {
    async fn score(
        &self,
        candidate: &CandidateProfile,
        job: &Job,
    ) -> Result<FitAssessment, SourcingError> {
        Ok(assess(candidate, job, &self.weights))
    }

    fn backend(&self) -> &'static str {
        "rubric"
    }
}

/// Assessment used when a scorer fails for one candidate. The empty breakdown
/// marks it as a fallback rather than a computed score.
pub fn fallback_assessment() -> FitAssessment {
    FitAssessment {
        final_score: FALLBACK_SCORE,
        breakdown: ScoreBreakdown::default(),
        confidence: FALLBACK_CONFIDENCE,
    }
}
