//! Pipeline orchestrator: SEARCH → ENRICH → SCORE → MESSAGE → DONE for one job.
//!
//! Stages run in sequence; candidates inside SCORE and MESSAGE run concurrently.
//! Only a search failure aborts a job. Everything else degrades: enrichment falls
//! back to its input, a failed score becomes the fallback assessment, and a
//! failed message becomes the generic template. Non-fatal errors are collected
//! in the result metadata.

pub mod batch;
pub mod ranking;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::collaborators::outreach::generic_message;
use crate::collaborators::{CandidateSearch, MessageGenerator, ProfileEnricher};
use crate::errors::SourcingError;
use crate::models::candidate::has_text;
use crate::models::{CandidateProfile, ExecutionMetadata, Job, PipelineResult, ScoredCandidate, Stage};
use crate::scoring::scorer::fallback_assessment;
use crate::scoring::{CandidateScorer, RubricScorer, ScoringWeights, MAX_SCORE};

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 5;

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Everything the orchestrator needs to know, passed in at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Inclusive minimum `fit_score`. `None` keeps every candidate.
    pub score_threshold: Option<f64>,
    pub top_n: usize,
    pub max_concurrent_jobs: usize,
    pub enable_enrichment: bool,
    pub enable_messaging: bool,
    pub weights: ScoringWeights,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            score_threshold: None,
            top_n: DEFAULT_TOP_N,
            max_concurrent_jobs: DEFAULT_MAX_CONCURRENT_JOBS,
            enable_enrichment: true,
            enable_messaging: true,
            weights: ScoringWeights::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), SourcingError> {
        if let Some(threshold) = self.score_threshold {
            if !(0.0..=MAX_SCORE).contains(&threshold) {
                return Err(SourcingError::Validation(format!(
                    "Score threshold must be between 0 and {MAX_SCORE} (got {threshold})"
                )));
            }
        }
        if self.top_n == 0 {
            return Err(SourcingError::Validation("top_n must be at least 1".to_string()));
        }
        if self.max_concurrent_jobs == 0 {
            return Err(SourcingError::Validation(
                "max_concurrent_jobs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipeline
// ────────────────────────────────────────────────────────────────────────────

/// One configured orchestrator. Cheap to clone; collaborators are shared.
#[derive(Clone)]
pub struct Pipeline {
    search: Arc<dyn CandidateSearch>,
    enricher: Option<Arc<dyn ProfileEnricher>>,
    scorer: Arc<dyn CandidateScorer>,
    messenger: Option<Arc<dyn MessageGenerator>>,
    config: PipelineConfig,
}

impl Pipeline {
    /// A pipeline that only searches and scores, using the rubric with `config.weights`.
    pub fn new(search: Arc<dyn CandidateSearch>, config: PipelineConfig) -> Self {
        Self {
            search,
            enricher: None,
            scorer: Arc::new(RubricScorer::new(config.weights)),
            messenger: None,
            config,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn ProfileEnricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_scorer(mut self, scorer: Arc<dyn CandidateScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn with_messenger(mut self, messenger: Arc<dyn MessageGenerator>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one job through every stage.
    ///
    /// Returns `Err` only for a malformed job, before any stage runs. Stage
    /// failures are reported inside the `PipelineResult`.
    pub async fn run(&self, mut job: Job) -> Result<PipelineResult, SourcingError> {
        job.validate()?;
        let job_id = job.ensure_id().to_string();
        let mut metadata = ExecutionMetadata::started(Utc::now());

        info!("Pipeline started for job {} ({} at {})", job_id, job.title, job.company);

        // ── SEARCH ──────────────────────────────────────────────────────────
        metadata.stage = Stage::Search;
        let candidates = match self.search.search(&job).await {
            Ok(candidates) => candidates,
            Err(e) => {
                error!("Search failed for job {}: {}", job_id, e);
                metadata.finish();
                return Ok(PipelineResult {
                    job_id,
                    success: false,
                    error: Some(e.to_string()),
                    candidates: Vec::new(),
                    metadata,
                });
            }
        };
        metadata.counts.searched = candidates.len();
        info!("Search ({}) found {} candidates", self.search.name(), candidates.len());
        warn_incomplete(&candidates);

        // ── ENRICH ──────────────────────────────────────────────────────────
        let candidates = match &self.enricher {
            Some(enricher) if self.config.enable_enrichment => {
                metadata.stage = Stage::Enrich;
                enrich_stage(enricher.as_ref(), candidates, &mut metadata).await
            }
            _ => candidates,
        };
        metadata.counts.enriched = candidates.iter().filter(|c| c.is_enriched()).count();

        // ── SCORE ───────────────────────────────────────────────────────────
        metadata.stage = Stage::Score;
        let scored = score_stage(self.scorer.as_ref(), candidates, &job, &mut metadata).await;
        metadata.counts.scored = scored.len();

        let qualified = ranking::apply_threshold(scored, self.config.score_threshold);
        metadata.counts.above_threshold = qualified.len();
        let mut ranked = ranking::order_and_truncate(qualified, self.config.top_n);
        metadata.counts.ranked = ranked.len();
        info!(
            "Scored {} candidates, {} above threshold, keeping top {}",
            metadata.counts.scored,
            metadata.counts.above_threshold,
            ranked.len()
        );

        // ── MESSAGE ─────────────────────────────────────────────────────────
        if let Some(messenger) = &self.messenger {
            if self.config.enable_messaging {
                metadata.stage = Stage::Message;
                message_stage(messenger.as_ref(), &mut ranked, &job, &mut metadata).await;
                metadata.counts.messaged = ranked
                    .iter()
                    .filter(|c| c.outreach_message.is_some())
                    .count();
            }
        }

        metadata.stage = Stage::Done;
        metadata.finish();
        info!(
            "Pipeline finished for job {} in {}ms with {} non-fatal errors",
            job_id,
            metadata.duration_ms,
            metadata.errors.len()
        );

        Ok(PipelineResult {
            job_id,
            success: true,
            error: None,
            candidates: ranked,
            metadata,
        })
    }
}

fn warn_incomplete(candidates: &[CandidateProfile]) {
    for (i, candidate) in candidates.iter().enumerate() {
        if !has_text(&candidate.name) {
            warn!("Candidate #{} is missing a name", i + 1);
        }
        if !has_text(&candidate.linkedin_url) {
            warn!("Candidate {} is missing a LinkedIn URL", candidate.display_name());
        }
    }
}

async fn enrich_stage(
    enricher: &dyn ProfileEnricher,
    candidates: Vec<CandidateProfile>,
    metadata: &mut ExecutionMetadata,
) -> Vec<CandidateProfile> {
    let original = candidates.clone();
    match enricher.enrich(candidates).await {
        Ok(enriched) if enriched.len() == original.len() => {
            debug!("Enrichment ({}) succeeded", enricher.name());
            enriched
        }
        Ok(enriched) => {
            let e = SourcingError::Enrichment(format!(
                "returned {} profiles for {} inputs",
                enriched.len(),
                original.len()
            ));
            warn!("{}; continuing with unenriched profiles", e);
            metadata.errors.push(e.to_string());
            original
        }
        Err(e) => {
            warn!("{}; continuing with unenriched profiles", e);
            metadata.errors.push(e.to_string());
            original
        }
    }
}

async fn score_stage(
    scorer: &dyn CandidateScorer,
    candidates: Vec<CandidateProfile>,
    job: &Job,
    metadata: &mut ExecutionMetadata,
) -> Vec<ScoredCandidate> {
    debug!("Scoring {} candidates with {}", candidates.len(), scorer.backend());

    // A panicking scorer only costs the candidate it was scoring.
    let outcomes = join_all(candidates.into_iter().map(|candidate| async move {
        let outcome = AssertUnwindSafe(scorer.score(&candidate, job))
            .catch_unwind()
            .await
            .unwrap_or_else(|_| {
                Err(SourcingError::Scoring {
                    candidate: candidate.display_name().to_string(),
                    reason: "scorer panicked".to_string(),
                })
            });
        (candidate, outcome)
    }))
    .await;

    outcomes
        .into_iter()
        .map(|(candidate, outcome)| match outcome {
            Ok(assessment) => ScoredCandidate::new(candidate, assessment, false),
            Err(e) => {
                let e = per_candidate_error(e, &candidate, |candidate, reason| {
                    SourcingError::Scoring { candidate, reason }
                });
                warn!("{}; using fallback score", e);
                metadata.errors.push(e.to_string());
                ScoredCandidate::new(candidate, fallback_assessment(), true)
            }
        })
        .collect()
}

async fn message_stage(
    messenger: &dyn MessageGenerator,
    ranked: &mut [ScoredCandidate],
    job: &Job,
    metadata: &mut ExecutionMetadata,
) {
    debug!("Drafting {} messages with {}", ranked.len(), messenger.name());

    let outcomes = join_all(
        ranked
            .iter()
            .map(|c| AssertUnwindSafe(messenger.generate(c, job)).catch_unwind()),
    )
    .await;

    for (candidate, outcome) in ranked.iter_mut().zip(outcomes) {
        let message = match outcome {
            Ok(Ok(message)) if has_text(&message) => message,
            Ok(Ok(_)) => {
                let e = SourcingError::Messaging {
                    candidate: candidate.profile.display_name().to_string(),
                    reason: "generator returned an empty message".to_string(),
                };
                warn!("{}; using generic message", e);
                metadata.errors.push(e.to_string());
                generic_message(&candidate.profile, job)
            }
            Ok(Err(e)) => {
                let e = per_candidate_error(e, &candidate.profile, |candidate, reason| {
                    SourcingError::Messaging { candidate, reason }
                });
                warn!("{}; using generic message", e);
                metadata.errors.push(e.to_string());
                generic_message(&candidate.profile, job)
            }
            Err(_) => {
                let e = SourcingError::Messaging {
                    candidate: candidate.profile.display_name().to_string(),
                    reason: "generator panicked".to_string(),
                };
                error!("{}; using generic message", e);
                metadata.errors.push(e.to_string());
                generic_message(&candidate.profile, job)
            }
        };
        candidate.outreach_message = Some(message);
    }
}

/// Tags an error with the candidate it belongs to, unless it already is tagged.
fn per_candidate_error(
    e: SourcingError,
    candidate: &CandidateProfile,
    wrap: impl FnOnce(String, String) -> SourcingError,
) -> SourcingError {
    match e {
        SourcingError::Scoring { .. } | SourcingError::Messaging { .. } => e,
        other => wrap(candidate.display_name().to_string(), other.to_string()),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::collaborators::{FixtureEnricher, FixtureSearch, TemplateMessageGenerator};
    use crate::models::ExperienceEntry;
    use crate::scoring::FitAssessment;

    pub(crate) struct FailingSearch;

    #[async_trait]
    impl CandidateSearch for FailingSearch {
        async fn search(&self, _job: &Job) -> Result<Vec<CandidateProfile>, SourcingError> {
            Err(SourcingError::Search("upstream 503".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct FailingEnricher;

    #[async_trait]
    impl ProfileEnricher for FailingEnricher {
        async fn enrich(
            &self,
            _candidates: Vec<CandidateProfile>,
        ) -> Result<Vec<CandidateProfile>, SourcingError> {
            Err(SourcingError::Enrichment("provider timeout".to_string()))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    /// Drops the last profile, breaking the one-in-one-out contract.
    struct LossyEnricher;

    #[async_trait]
    impl ProfileEnricher for LossyEnricher {
        async fn enrich(
            &self,
            mut candidates: Vec<CandidateProfile>,
        ) -> Result<Vec<CandidateProfile>, SourcingError> {
            candidates.pop();
            Ok(candidates)
        }

        fn name(&self) -> &'static str {
            "lossy"
        }
    }

    /// Fails for candidates whose name starts with "Bad", panics on "Crash".
    struct PickyScorer;

    #[async_trait]
    impl CandidateScorer for PickyScorer {
        async fn score(
            &self,
            candidate: &CandidateProfile,
            job: &Job,
        ) -> Result<FitAssessment, SourcingError> {
            if candidate.name.starts_with("Crash") {
                panic!("scorer bug");
            }
            if candidate.name.starts_with("Bad") {
                Err(SourcingError::Internal(anyhow::anyhow!("model unavailable")))
            } else {
                RubricScorer::default().score(candidate, job).await
            }
        }

        fn backend(&self) -> &'static str {
            "picky"
        }
    }

    struct FailingMessenger;

    #[async_trait]
    impl MessageGenerator for FailingMessenger {
        async fn generate(
            &self,
            candidate: &ScoredCandidate,
            _job: &Job,
        ) -> Result<String, SourcingError> {
            Err(SourcingError::Messaging {
                candidate: candidate.profile.display_name().to_string(),
                reason: "quota exceeded".to_string(),
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct PanickingMessenger;

    #[async_trait]
    impl MessageGenerator for PanickingMessenger {
        async fn generate(
            &self,
            _candidate: &ScoredCandidate,
            _job: &Job,
        ) -> Result<String, SourcingError> {
            panic!("template engine bug");
        }

        fn name(&self) -> &'static str {
            "panicking"
        }
    }

    pub(crate) fn backend_job() -> Job {
        Job::new("Backend Engineer", "Acme")
            .with_required_skills(["Python", "Docker"])
            .with_location("Austin, TX", true)
    }

    fn fixture_pipeline(config: PipelineConfig) -> Pipeline {
        Pipeline::new(Arc::new(FixtureSearch::sample().unwrap()), config)
    }

    #[tokio::test]
    async fn test_full_run_with_fixtures() {
        let pipeline = fixture_pipeline(PipelineConfig::default())
            .with_enricher(Arc::new(FixtureEnricher::sample().unwrap()))
            .with_messenger(Arc::new(TemplateMessageGenerator::default()));

        let result = pipeline.run(backend_job()).await.unwrap();
        assert!(result.success);
        assert!(result.error.is_none());
        assert!(!result.job_id.is_empty());
        assert_eq!(result.metadata.stage, Stage::Done);
        assert!(result.metadata.errors.is_empty());

        let counts = result.metadata.counts;
        assert_eq!(counts.searched, result.candidates.len());
        assert_eq!(counts.enriched, 1);
        assert_eq!(counts.messaged, counts.ranked);

        for pair in result.candidates.windows(2) {
            assert!(pair[0].fit_score >= pair[1].fit_score);
        }
        for candidate in &result.candidates {
            assert!((0.0..=10.0).contains(&candidate.fit_score));
            assert!((0.0..=1.0).contains(&candidate.confidence));
            assert!(!candidate.score_fallback);
            assert!(candidate.outreach_message.is_some());
        }
        assert_eq!(result.top_candidate().map(|c| c.rank), Some(1));
    }

    #[tokio::test]
    async fn test_search_failure_is_fatal() {
        let pipeline = Pipeline::new(Arc::new(FailingSearch), PipelineConfig::default());
        let result = pipeline.run(backend_job()).await.unwrap();

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Search failed: upstream 503"));
        assert!(result.candidates.is_empty());
        assert_eq!(result.metadata.stage, Stage::Search);
    }

    #[tokio::test]
    async fn test_invalid_job_is_rejected_before_search() {
        let pipeline = Pipeline::new(Arc::new(FailingSearch), PipelineConfig::default());
        let err = pipeline.run(Job::new("", "Acme")).await.unwrap_err();
        assert!(matches!(err, SourcingError::Validation(_)));
    }

    #[tokio::test]
    async fn test_enrichment_failure_falls_back() {
        let pipeline =
            fixture_pipeline(PipelineConfig::default()).with_enricher(Arc::new(FailingEnricher));
        let result = pipeline.run(backend_job()).await.unwrap();

        assert!(result.success);
        assert!(!result.candidates.is_empty());
        assert_eq!(result.metadata.counts.enriched, 0);
        assert_eq!(
            result.metadata.errors,
            vec!["Enrichment failed: provider timeout".to_string()]
        );
    }

    #[tokio::test]
    async fn test_enrichment_length_mismatch_is_rejected() {
        let pipeline =
            fixture_pipeline(PipelineConfig::default()).with_enricher(Arc::new(LossyEnricher));
        let result = pipeline.run(backend_job()).await.unwrap();

        assert_eq!(result.metadata.counts.scored, result.metadata.counts.searched);
        assert_eq!(result.metadata.errors.len(), 1);
        assert!(result.metadata.errors[0].starts_with("Enrichment failed: returned"));
    }

    #[tokio::test]
    async fn test_disabled_enrichment_is_skipped() {
        let config = PipelineConfig {
            enable_enrichment: false,
            ..Default::default()
        };
        let pipeline = fixture_pipeline(config).with_enricher(Arc::new(FailingEnricher));
        let result = pipeline.run(backend_job()).await.unwrap();
        assert!(result.metadata.errors.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_messaging_leaves_messages_empty() {
        let config = PipelineConfig {
            enable_messaging: false,
            ..Default::default()
        };
        let pipeline = fixture_pipeline(config).with_messenger(Arc::new(FailingMessenger));
        let result = pipeline.run(backend_job()).await.unwrap();

        assert!(result.metadata.errors.is_empty());
        assert_eq!(result.metadata.counts.messaged, 0);
        assert!(result.candidates.iter().all(|c| c.outreach_message.is_none()));
    }

    #[tokio::test]
    async fn test_scoring_failure_uses_fallback_and_keeps_candidate() {
        let mut good = CandidateProfile::new("Good Candidate");
        good.skills = vec!["Python".to_string(), "Docker".to_string()];
        good.experience = vec![ExperienceEntry::new("Acme", "Backend Engineer", "6 years")];
        let bad = CandidateProfile::new("Bad Candidate");

        let pipeline = Pipeline::new(
            Arc::new(FixtureSearch::new(vec![bad, good])),
            PipelineConfig::default(),
        )
        .with_scorer(Arc::new(PickyScorer));

        let result = pipeline.run(Job::new("Backend Engineer", "Acme")).await.unwrap();
        assert!(result.success);
        assert_eq!(result.candidates.len(), 2);

        let fallback = result
            .candidates
            .iter()
            .find(|c| c.profile.name == "Bad Candidate")
            .unwrap();
        assert!(fallback.score_fallback);
        assert_eq!(fallback.fit_score, 5.0);
        assert_eq!(fallback.confidence, 0.5);
        assert_eq!(
            result.metadata.errors,
            vec!["Scoring failed for Bad Candidate: Internal error: model unavailable".to_string()]
        );
    }

    #[tokio::test]
    async fn test_scorer_panic_only_affects_its_candidate() {
        let mut good = CandidateProfile::new("Good Candidate");
        good.skills = vec!["Python".to_string(), "Docker".to_string()];
        let crash = CandidateProfile::new("Crash Candidate");

        let pipeline = Pipeline::new(
            Arc::new(FixtureSearch::new(vec![crash, good])),
            PipelineConfig::default(),
        )
        .with_scorer(Arc::new(PickyScorer));

        let result = pipeline.run(Job::new("Backend Engineer", "Acme")).await.unwrap();
        assert!(result.success);
        assert_eq!(result.candidates.len(), 2);

        let crashed = result
            .candidates
            .iter()
            .find(|c| c.profile.name == "Crash Candidate")
            .unwrap();
        assert!(crashed.score_fallback);
        assert_eq!(crashed.fit_score, 5.0);
        assert_eq!(
            result.metadata.errors,
            vec!["Scoring failed for Crash Candidate: scorer panicked".to_string()]
        );
        assert!(result
            .candidates
            .iter()
            .any(|c| c.profile.name == "Good Candidate" && !c.score_fallback));
    }

    #[tokio::test]
    async fn test_messenger_panic_uses_generic_message() {
        let pipeline = fixture_pipeline(PipelineConfig::default())
            .with_messenger(Arc::new(PanickingMessenger));
        let result = pipeline.run(backend_job()).await.unwrap();

        assert!(result.success);
        assert!(!result.candidates.is_empty());
        assert_eq!(result.metadata.errors.len(), result.candidates.len());
        for candidate in &result.candidates {
            let message = candidate.outreach_message.as_deref().unwrap();
            assert_eq!(message, generic_message(&candidate.profile, &backend_job()));
        }
    }

    #[tokio::test]
    async fn test_messaging_failure_uses_generic_message() {
        let pipeline = fixture_pipeline(PipelineConfig::default())
            .with_messenger(Arc::new(FailingMessenger));
        let result = pipeline.run(backend_job()).await.unwrap();

        assert!(result.success);
        assert_eq!(result.metadata.errors.len(), result.candidates.len());
        for candidate in &result.candidates {
            let message = candidate.outreach_message.as_deref().unwrap();
            assert_eq!(message, generic_message(&candidate.profile, &backend_job()));
        }
    }

    #[tokio::test]
    async fn test_threshold_and_top_n_apply() {
        let config = PipelineConfig {
            score_threshold: Some(10.0),
            ..Default::default()
        };
        let result = fixture_pipeline(config).run(backend_job()).await.unwrap();
        assert!(result.success);
        assert!(result.candidates.is_empty());
        assert!(result.top_candidate().is_none());

        let config = PipelineConfig {
            top_n: 1,
            ..Default::default()
        };
        let result = fixture_pipeline(config).run(backend_job()).await.unwrap();
        assert_eq!(result.candidates.len(), 1);
        assert!(result.metadata.counts.scored > 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(PipelineConfig::default().validate().is_ok());
        let bad = PipelineConfig {
            score_threshold: Some(11.0),
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = PipelineConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
