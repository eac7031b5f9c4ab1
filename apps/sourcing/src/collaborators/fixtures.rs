//! Fixed-data collaborators: a candidate roster and a table of enrichment signals.
//!
//! Used by the CLI when no live provider is wired in, and by tests.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::collaborators::{signals, CandidateSearch, ProfileEnricher};
use crate::errors::SourcingError;
use crate::models::{CandidateProfile, EnrichmentSignals, Job};

const SAMPLE_ROSTER: &str = include_str!("../../data/roster.json");
const SAMPLE_ENRICHMENT: &str = include_str!("../../data/enrichment.json");

pub const DEFAULT_SEARCH_LIMIT: usize = 10;
/// Required-skill overlap a profile needs to be returned.
const MIN_SKILL_OVERLAP: usize = 2;

// ────────────────────────────────────────────────────────────────────────────
// FixtureSearch
// ────────────────────────────────────────────────────────────────────────────

/// Searches a fixed roster.
///
/// A profile matches when it shares at least two required skills with the job
/// (or all of them, when the job lists fewer than two). Jobs without required
/// skills match the whole roster. Results keep roster order and are capped at `limit`.
#[derive(Debug, Clone)]
pub struct FixtureSearch {
    roster: Vec<CandidateProfile>,
    limit: usize,
}

impl FixtureSearch {
    pub fn new(roster: Vec<CandidateProfile>) -> Self {
        Self {
            roster,
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }

    /// The bundled sample roster.
    pub fn sample() -> Result<Self, SourcingError> {
        Self::from_json(SAMPLE_ROSTER)
    }

    /// Parses a JSON array of profiles.
    pub fn from_json(json: &str) -> Result<Self, SourcingError> {
        let roster: Vec<CandidateProfile> = serde_json::from_str(json)
            .map_err(|e| SourcingError::Search(format!("Invalid candidate roster: {e}")))?;
        Ok(Self::new(roster))
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn roster(&self) -> &[CandidateProfile] {
        &self.roster
    }

    fn matches(&self, candidate: &CandidateProfile, required: &BTreeSet<String>) -> bool {
        if required.is_empty() {
            return true;
        }
        let overlap = candidate
            .skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect::<BTreeSet<_>>()
            .intersection(required)
            .count();
        overlap >= MIN_SKILL_OVERLAP.min(required.len())
    }
}

#[async_trait]
impl CandidateSearch for FixtureSearch {
    async fn search(&self, job: &Job) -> Result<Vec<CandidateProfile>, SourcingError> {
        let required: BTreeSet<String> = job
            .required_skills
            .iter()
            .map(|s| s.trim().to_lowercase())
            .collect();

        let found: Vec<CandidateProfile> = self
            .roster
            .iter()
            .filter(|c| self.matches(c, &required))
            .take(self.limit)
            .cloned()
            .collect();

        debug!(
            "Fixture search for '{}': {} of {} profiles matched",
            job.title,
            found.len(),
            self.roster.len()
        );
        Ok(found)
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// FixtureEnricher
// ────────────────────────────────────────────────────────────────────────────

/// Enrichment data for one profile, keyed by LinkedIn URL in the fixture table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnrichmentFixture {
    pub signals: EnrichmentSignals,
    pub certifications: Vec<String>,
    pub publications: Vec<String>,
}

/// Attaches fixed signals to profiles whose LinkedIn URL is in the table.
/// Other profiles pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct FixtureEnricher {
    table: HashMap<String, EnrichmentFixture>,
}

impl FixtureEnricher {
    pub fn new(table: HashMap<String, EnrichmentFixture>) -> Self {
        Self { table }
    }

    pub fn sample() -> Result<Self, SourcingError> {
        let table = serde_json::from_str(SAMPLE_ENRICHMENT)
            .map_err(|e| SourcingError::Enrichment(format!("Invalid enrichment table: {e}")))?;
        Ok(Self::new(table))
    }

    fn enrich_one(&self, mut profile: CandidateProfile) -> CandidateProfile {
        let Some(fixture) = self.table.get(profile.linkedin_url.trim()) else {
            return profile;
        };

        let mut enrichment = fixture.signals.clone();
        signals::apply(&mut enrichment);

        merge_unique(&mut profile.skills, &enrichment.additional_skills);
        merge_unique(&mut profile.certifications, &fixture.certifications);
        merge_unique(&mut profile.publications, &fixture.publications);
        profile.enrichment = Some(enrichment);
        profile
    }
}

/// Appends entries not already present (case-insensitive).
fn merge_unique(target: &mut Vec<String>, extra: &[String]) {
    for item in extra {
        let exists = target.iter().any(|t| t.eq_ignore_ascii_case(item));
        if !exists {
            target.push(item.clone());
        }
    }
}

#[async_trait]
impl ProfileEnricher for FixtureEnricher {
    async fn enrich(
        &self,
        candidates: Vec<CandidateProfile>,
    ) -> Result<Vec<CandidateProfile>, SourcingError> {
        Ok(candidates
            .into_iter()
            .map(|c| self.enrich_one(c))
            .collect())
    }

    fn name(&self) -> &'static str {
        "fixture"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_fixtures_parse() {
        let search = FixtureSearch::sample().unwrap();
        assert!(search.roster().len() >= 5);
        let enricher = FixtureEnricher::sample().unwrap();
        assert!(!enricher.table.is_empty());
    }

    #[tokio::test]
    async fn test_search_filters_by_skill_overlap() {
        let search = FixtureSearch::sample().unwrap();
        let job = Job::new("Backend Engineer", "Acme").with_required_skills(["Java", "Kafka"]);
        let found = search.search(&job).await.unwrap();
        let names: Vec<&str> = found.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Emily Rodriguez", "James Wilson"]);
    }

    #[tokio::test]
    async fn test_search_single_skill_job_needs_one_match() {
        let search = FixtureSearch::sample().unwrap();
        let job = Job::new("ML Engineer", "Acme").with_required_skills(["pytorch"]);
        let found = search.search(&job).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Alex Martinez");
    }

    #[tokio::test]
    async fn test_search_respects_limit() {
        let search = FixtureSearch::sample().unwrap().with_limit(2);
        let found = search.search(&Job::new("Anything", "Acme")).await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_invalid_roster_is_a_search_error() {
        let err = FixtureSearch::from_json("{not json").unwrap_err();
        assert!(matches!(err, SourcingError::Search(_)));
    }

    #[tokio::test]
    async fn test_enricher_preserves_length_and_order() {
        let search = FixtureSearch::sample().unwrap();
        let enricher = FixtureEnricher::sample().unwrap();
        let before = search.roster().to_vec();

        let after = enricher.enrich(before.clone()).await.unwrap();
        assert_eq!(after.len(), before.len());
        for (a, b) in after.iter().zip(&before) {
            assert_eq!(a.name, b.name);
        }

        let sarah = &after[0];
        let signals = sarah.enrichment.as_ref().unwrap();
        assert_eq!(signals.enrichment_score, 5.11);
        assert!(sarah.certifications.contains(&"AWS Certified Developer".to_string()));
        assert_eq!(sarah.skills.last().map(String::as_str), Some("Go"));
        assert_eq!(sarah.skills.len(), before[0].skills.len() + 1);

        // Michael has no fixture entry
        assert!(!after[1].is_enriched());
        assert_eq!(after[1], before[1]);
    }

    #[test]
    fn test_merge_unique_skips_duplicates() {
        let mut target = vec!["AWS Certified Developer".to_string()];
        merge_unique(
            &mut target,
            &["aws certified developer".to_string(), "CKA".to_string()],
        );
        assert_eq!(target.len(), 2);
    }
}
