use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::candidate::CandidateProfile;
use crate::scoring::{FitAssessment, ScoreBreakdown};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Validate,
    Search,
    Enrich,
    Score,
    Message,
    Done,
}

/// A candidate carrying its score fields and, for the top-N, an outreach draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    /// 1-based position in the ranked output; 0 until ranking runs.
    pub rank: usize,
    pub profile: CandidateProfile,
    pub fit_score: f64,
    pub score_breakdown: ScoreBreakdown,
    pub confidence: f64,
    /// True when scoring failed and default values were assigned.
    pub score_fallback: bool,
    pub outreach_message: Option<String>,
}

impl ScoredCandidate {
    pub fn new(profile: CandidateProfile, assessment: FitAssessment, score_fallback: bool) -> Self {
        Self {
            rank: 0,
            profile,
            fit_score: assessment.final_score,
            score_breakdown: assessment.breakdown,
            confidence: assessment.confidence,
            score_fallback,
            outreach_message: None,
        }
    }
}

/// Candidate counts after each stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub searched: usize,
    pub enriched: usize,
    pub scored: usize,
    pub above_threshold: usize,
    pub ranked: usize,
    pub messaged: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionMetadata {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    /// Last stage reached. `Done` unless a fatal error stopped the run.
    pub stage: Stage,
    pub counts: StageCounts,
    /// Non-fatal errors, in the order they occurred.
    pub errors: Vec<String>,
}

impl ExecutionMetadata {
    pub fn started(at: DateTime<Utc>) -> Self {
        Self {
            started_at: at,
            finished_at: at,
            duration_ms: 0,
            stage: Stage::Validate,
            counts: StageCounts::default(),
            errors: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
        self.duration_ms = (self.finished_at - self.started_at).num_milliseconds();
    }
}

/// Outcome of one pipeline run. Always produced, even when the job fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub job_id: String,
    pub success: bool,
    /// The fatal error that aborted the run, if any.
    pub error: Option<String>,
    /// Ranked best-first.
    pub candidates: Vec<ScoredCandidate>,
    pub metadata: ExecutionMetadata,
}

impl PipelineResult {
    /// A result for a job that never produced candidates.
    pub fn failed(job_id: impl Into<String>, error: impl Into<String>, stage: Stage) -> Self {
        let mut metadata = ExecutionMetadata::started(Utc::now());
        metadata.stage = stage;
        metadata.finish();
        Self {
            job_id: job_id.into(),
            success: false,
            error: Some(error.into()),
            candidates: Vec::new(),
            metadata,
        }
    }

    pub fn top_candidate(&self) -> Option<&ScoredCandidate> {
        self.candidates.first()
    }
}
