use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::SourcingError;
use crate::scoring::{round2, Criterion, CriterionResult, MAX_SCORE};

/// Per-criterion weights. The default rubric sums to exactly 1.0.
/// Custom tables go through `try_new`, so every value in circulation is valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoringWeights {
    skills_match: f64,
    experience_relevance: f64,
    education: f64,
    company_prestige: f64,
    location_fit: f64,
    profile_completeness: f64,
}

/// The canonical six-criterion rubric.
pub const RUBRIC_WEIGHTS: ScoringWeights = ScoringWeights {
    skills_match: 0.30,
    experience_relevance: 0.25,
    education: 0.15,
    company_prestige: 0.15,
    location_fit: 0.10,
    profile_completeness: 0.05,
};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

impl Default for ScoringWeights {
    fn default() -> Self {
        RUBRIC_WEIGHTS
    }
}

impl ScoringWeights {
    /// Builds a custom weight table. Rejects negative weights and tables that do not sum to 1.0.
    pub fn try_new(
        skills_match: f64,
        experience_relevance: f64,
        education: f64,
        company_prestige: f64,
        location_fit: f64,
        profile_completeness: f64,
    ) -> Result<Self, SourcingError> {
        let weights = Self {
            skills_match,
            experience_relevance,
            education,
            company_prestige,
            location_fit,
            profile_completeness,
        };

        if Criterion::ALL
            .iter()
            .any(|c| !weights.weight(*c).is_finite() || weights.weight(*c) < 0.0)
        {
            return Err(SourcingError::Validation(
                "Scoring weights must be finite and non-negative".to_string(),
            ));
        }
        let sum = weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(SourcingError::Validation(format!(
                "Scoring weights must sum to 1.0 (got {sum})"
            )));
        }
        Ok(weights)
    }

    pub fn weight(&self, criterion: Criterion) -> f64 {
        match criterion {
            Criterion::SkillsMatch => self.skills_match,
            Criterion::ExperienceRelevance => self.experience_relevance,
            Criterion::Education => self.education,
            Criterion::CompanyPrestige => self.company_prestige,
            Criterion::LocationFit => self.location_fit,
            Criterion::ProfileCompleteness => self.profile_completeness,
        }
    }

    pub fn sum(&self) -> f64 {
        Criterion::ALL.iter().map(|c| self.weight(*c)).sum()
    }
}

/// How one criterion fed into the final score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionBreakdown {
    pub score: f64,
    pub weight: f64,
    /// score × weight, unrounded
    pub contribution: f64,
    pub details: Value,
}

/// Criterion name → breakdown. Enough to rebuild `final_score` without re-running evaluators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreBreakdown(pub BTreeMap<Criterion, CriterionBreakdown>);

impl ScoreBreakdown {
    pub fn get(&self, criterion: Criterion) -> Option<&CriterionBreakdown> {
        self.0.get(&criterion)
    }

    /// Σ contribution, rounded the same way `final_score` is.
    pub fn total(&self) -> f64 {
        round2(self.0.values().map(|b| b.contribution).sum::<f64>()).clamp(0.0, MAX_SCORE)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Combines criterion results into `(final_score, breakdown)`.
/// Criteria absent from `results` contribute nothing.
pub fn aggregate(
    results: Vec<(Criterion, CriterionResult)>,
    weights: &ScoringWeights,
) -> (f64, ScoreBreakdown) {
    let breakdown: BTreeMap<Criterion, CriterionBreakdown> = results
        .into_iter()
        .map(|(criterion, result)| {
            let weight = weights.weight(criterion);
            (
                criterion,
                CriterionBreakdown {
                    score: result.score,
                    weight,
                    contribution: result.score * weight,
                    details: result.breakdown,
                },
            )
        })
        .collect();

    let breakdown = ScoreBreakdown(breakdown);
    (breakdown.total(), breakdown)
}
