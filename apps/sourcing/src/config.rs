use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::collaborators::fixtures::DEFAULT_SEARCH_LIMIT;
use crate::collaborators::RetryPolicy;
use crate::pipeline::{PipelineConfig, DEFAULT_MAX_CONCURRENT_JOBS, DEFAULT_TOP_N};
use crate::scoring::ScoringWeights;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub score_threshold: Option<f64>,
    pub top_n: usize,
    pub max_concurrent_jobs: usize,
    pub search_limit: usize,
    pub enable_enrichment: bool,
    pub enable_messaging: bool,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// 0 disables rate limiting.
    pub rate_limit_delay_ms: u64,
    /// Enables LLM-drafted outreach when set.
    pub anthropic_api_key: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key → value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let config = Config {
            score_threshold: get("SOURCING_SCORE_THRESHOLD")
                .map(|v| parse(&v, "SOURCING_SCORE_THRESHOLD"))
                .transpose()?,
            top_n: parse_or(get("SOURCING_TOP_N"), "SOURCING_TOP_N", DEFAULT_TOP_N)?,
            max_concurrent_jobs: parse_or(
                get("SOURCING_MAX_CONCURRENT_JOBS"),
                "SOURCING_MAX_CONCURRENT_JOBS",
                DEFAULT_MAX_CONCURRENT_JOBS,
            )?,
            search_limit: parse_or(
                get("SOURCING_SEARCH_LIMIT"),
                "SOURCING_SEARCH_LIMIT",
                DEFAULT_SEARCH_LIMIT,
            )?,
            enable_enrichment: parse_flag(get("SOURCING_ENABLE_ENRICHMENT"), "SOURCING_ENABLE_ENRICHMENT", true)?,
            enable_messaging: parse_flag(get("SOURCING_ENABLE_MESSAGING"), "SOURCING_ENABLE_MESSAGING", true)?,
            max_retries: parse_or(get("SOURCING_MAX_RETRIES"), "SOURCING_MAX_RETRIES", 3)?,
            retry_base_delay_ms: parse_or(
                get("SOURCING_RETRY_BASE_DELAY_MS"),
                "SOURCING_RETRY_BASE_DELAY_MS",
                1000,
            )?,
            rate_limit_delay_ms: parse_or(
                get("SOURCING_RATE_LIMIT_DELAY_MS"),
                "SOURCING_RATE_LIMIT_DELAY_MS",
                0,
            )?,
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        };

        config
            .pipeline_config()
            .validate()
            .context("Invalid pipeline configuration")?;
        Ok(config)
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            score_threshold: self.score_threshold,
            top_n: self.top_n,
            max_concurrent_jobs: self.max_concurrent_jobs,
            enable_enrichment: self.enable_enrichment,
            enable_messaging: self.enable_messaging,
            weights: ScoringWeights::default(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    /// Minimum spacing between upstream calls, if rate limiting is on.
    pub fn rate_limit(&self) -> Option<Duration> {
        (self.rate_limit_delay_ms > 0).then(|| Duration::from_millis(self.rate_limit_delay_ms))
    }
}

fn parse<T>(value: &str, key: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value '{value}'"))
}

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.map_or(Ok(default), |v| parse(&v, key))
}

fn parse_flag(value: Option<String>, key: &str, default: bool) -> Result<bool> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("{key} must be true or false (got '{other}')"),
    }
}
