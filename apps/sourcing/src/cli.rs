use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use tracing::info;

use crate::collaborators::{
    CandidateSearch, FixtureEnricher, FixtureSearch, LlmMessageGenerator, MessageGenerator,
    ProfileEnricher, RateLimited, Retry, TemplateMessageGenerator,
};
use crate::config::Config;
use crate::llm_client::{self, LlmClient};
use crate::models::{CandidateProfile, Job};
use crate::pipeline::{Pipeline, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "sourcing",
    version,
    about = "Candidate sourcing pipeline: search, enrich, score and draft outreach"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one or more jobs through the full pipeline and print the results as JSON.
    Run(RunCommand),
    /// Score a single candidate against a job and print the assessment as JSON.
    Score(ScoreCommand),
}

#[derive(Args)]
pub struct RunCommand {
    /// Job file: a JSON job object or an array of jobs. Repeatable.
    #[arg(long = "job", required = true)]
    pub jobs: Vec<PathBuf>,
    /// Candidate roster (JSON array of profiles). Defaults to the bundled sample.
    #[arg(long)]
    pub candidates: Option<PathBuf>,
    /// Minimum fit score to keep, inclusive.
    #[arg(long)]
    pub threshold: Option<f64>,
    #[arg(long)]
    pub top_n: Option<usize>,
}

#[derive(Args)]
pub struct ScoreCommand {
    #[arg(long)]
    pub job: PathBuf,
    /// A single candidate profile (JSON object).
    #[arg(long)]
    pub candidate: PathBuf,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JobFile {
    Many(Vec<Job>),
    One(Job),
}

pub fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

pub fn load_jobs(paths: &[PathBuf]) -> Result<Vec<Job>> {
    let mut jobs = Vec::new();
    for path in paths {
        match read_json::<JobFile>(path)? {
            JobFile::Many(many) => jobs.extend(many),
            JobFile::One(job) => jobs.push(job),
        }
    }
    Ok(jobs)
}

/// CLI flags win over environment configuration.
pub fn pipeline_config(config: &Config, command: &RunCommand) -> PipelineConfig {
    let mut pipeline_config = config.pipeline_config();
    if command.threshold.is_some() {
        pipeline_config.score_threshold = command.threshold;
    }
    if let Some(top_n) = command.top_n {
        pipeline_config.top_n = top_n;
    }
    pipeline_config
}

/// Wires fixture search and enrichment, plus LLM outreach when an API key is
/// configured (template outreach otherwise). Upstream collaborators get the
/// configured retry and rate-limit wrappers.
pub fn build_pipeline(
    config: &Config,
    pipeline_config: PipelineConfig,
    roster: Option<&Path>,
) -> Result<Pipeline> {
    pipeline_config
        .validate()
        .context("Invalid pipeline configuration")?;

    let search = match roster {
        Some(path) => {
            let profiles: Vec<CandidateProfile> = read_json(path)?;
            FixtureSearch::new(profiles)
        }
        None => FixtureSearch::sample()?,
    }
    .with_limit(config.search_limit);
    info!("Candidate roster loaded: {} profiles", search.roster().len());

    let search: Arc<dyn CandidateSearch> = Arc::new(search);
    let enricher: Arc<dyn ProfileEnricher> = Arc::new(FixtureEnricher::sample()?);

    let messenger: Arc<dyn MessageGenerator> = match &config.anthropic_api_key {
        Some(key) => {
            // The client retries 429/5xx itself.
            let llm = LlmClient::new(key.clone())?.with_retries(
                config.max_retries,
                config.retry_policy().base_delay,
            );
            info!("Outreach via LLM (model: {})", llm_client::MODEL);
            match config.rate_limit() {
                Some(interval) => Arc::new(RateLimited::new(LlmMessageGenerator(llm), interval)),
                None => Arc::new(LlmMessageGenerator(llm)),
            }
        }
        None => {
            info!("Outreach via templates (ANTHROPIC_API_KEY not set)");
            Arc::new(TemplateMessageGenerator::default())
        }
    };

    Ok(Pipeline::new(wrap_search(search, config), pipeline_config)
        .with_enricher(wrap_enricher(enricher, config))
        .with_messenger(messenger))
}

fn wrap_search(inner: Arc<dyn CandidateSearch>, config: &Config) -> Arc<dyn CandidateSearch> {
    let inner: Arc<dyn CandidateSearch> = match config.rate_limit() {
        Some(interval) => Arc::new(RateLimited::new(inner, interval)),
        None => inner,
    };
    Arc::new(Retry::new(inner, config.retry_policy()))
}

fn wrap_enricher(inner: Arc<dyn ProfileEnricher>, config: &Config) -> Arc<dyn ProfileEnricher> {
    let inner: Arc<dyn ProfileEnricher> = match config.rate_limit() {
        Some(interval) => Arc::new(RateLimited::new(inner, interval)),
        None => inner,
    };
    Arc::new(Retry::new(inner, config.retry_policy()))
}
