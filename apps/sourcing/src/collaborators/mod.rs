//! Collaborators: the three external seams the pipeline depends on.
//!
//! The orchestrator only ever sees `Arc<dyn CandidateSearch>`, `Arc<dyn ProfileEnricher>`
//! and `Arc<dyn MessageGenerator>`. Real providers, fixtures and the middleware
//! wrappers in `middleware` all implement the same traits.

pub mod fixtures;
pub mod middleware;
pub mod outreach;
pub mod signals;

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::SourcingError;
use crate::models::{CandidateProfile, Job, ScoredCandidate};

pub use fixtures::{FixtureEnricher, FixtureSearch};
pub use middleware::{RateLimited, Retry, RetryPolicy};
pub use outreach::{LlmMessageGenerator, TemplateMessageGenerator};

// ────────────────────────────────────────────────────────────────────────────
// Trait definitions
// ────────────────────────────────────────────────────────────────────────────

/// Finds candidate profiles for a job. A failure here aborts the job.
#[async_trait]
pub trait CandidateSearch: Send + Sync {
    async fn search(&self, job: &Job) -> Result<Vec<CandidateProfile>, SourcingError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Augments profiles with auxiliary signals.
///
/// Must return one profile per input profile, in the same order. The pipeline
/// discards any output that breaks this and keeps the unenriched list.
#[async_trait]
pub trait ProfileEnricher: Send + Sync {
    async fn enrich(
        &self,
        candidates: Vec<CandidateProfile>,
    ) -> Result<Vec<CandidateProfile>, SourcingError>;

    fn name(&self) -> &'static str;
}

/// Drafts an outreach message for one ranked candidate.
#[async_trait]
pub trait MessageGenerator: Send + Sync {
    async fn generate(&self, candidate: &ScoredCandidate, job: &Job)
        -> Result<String, SourcingError>;

    fn name(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// Shared collaborators
// ────────────────────────────────────────────────────────────────────────────

// Lets middleware wrap an already-shared `Arc<dyn ...>`.

#[async_trait]
impl<T: CandidateSearch + ?Sized> CandidateSearch for Arc<T> {
    async fn search(&self, job: &Job) -> Result<Vec<CandidateProfile>, SourcingError> {
        (**self).search(job).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[async_trait]
impl<T: ProfileEnricher + ?Sized> ProfileEnricher for Arc<T> {
    async fn enrich(
        &self,
        candidates: Vec<CandidateProfile>,
    ) -> Result<Vec<CandidateProfile>, SourcingError> {
        (**self).enrich(candidates).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

#[async_trait]
impl<T: MessageGenerator + ?Sized> MessageGenerator for Arc<T> {
    async fn generate(
        &self,
        candidate: &ScoredCandidate,
        job: &Job,
    ) -> Result<String, SourcingError> {
        (**self).generate(candidate, job).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
