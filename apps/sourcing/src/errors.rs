use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm_client::LlmError;

/// How the orchestrator reacts when a given error surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Malformed job; raised before any stage runs.
    Validation,
    /// Aborts the job (search stage).
    Fatal,
    /// Logged; the stage falls back to its input (enrichment stage).
    Recoverable,
    /// Affects a single candidate, which keeps a default value.
    PerCandidate,
}

/// Crate-level error type.
/// Collaborators return it so the pipeline can decide fatal vs. non-fatal handling.
#[derive(Debug, Error)]
pub enum SourcingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Enrichment failed: {0}")]
    Enrichment(String),

    #[error("Scoring failed for {candidate}: {reason}")]
    Scoring { candidate: String, reason: String },

    #[error("Message generation failed for {candidate}: {reason}")]
    Messaging { candidate: String, reason: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SourcingError {
    pub fn severity(&self) -> Severity {
        match self {
            SourcingError::Validation(_) => Severity::Validation,
            SourcingError::Search(_) | SourcingError::Internal(_) => Severity::Fatal,
            SourcingError::Enrichment(_) => Severity::Recoverable,
            SourcingError::Scoring { .. }
            | SourcingError::Messaging { .. }
            | SourcingError::Llm(_) => Severity::PerCandidate,
        }
    }

    /// Whether a retry wrapper should try the call again.
    /// Validation problems never heal by themselves.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SourcingError::Validation(_))
    }
}
