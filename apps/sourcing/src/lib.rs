//! Candidate sourcing engine.
//!
//! Finds candidates for a job, enriches their profiles, scores them with a
//! six-criterion weighted rubric, and drafts outreach for the best matches.
//! `pipeline::Pipeline` is the entry point; collaborators plug in through the
//! traits in `collaborators`.

pub mod cli;
pub mod collaborators;
pub mod config;
pub mod errors;
pub mod llm_client;
pub mod models;
pub mod pipeline;
pub mod scoring;

pub use errors::SourcingError;
pub use models::{CandidateProfile, Job, PipelineResult, ScoredCandidate};
pub use pipeline::{Pipeline, PipelineConfig};
