//! Scoring engine: six criterion evaluators, a confidence estimator, and the
//! weighted aggregator that turns them into one bounded fit score.
//!
//! Everything here is pure: no I/O, no configuration lookups, no shared state.
//! The same (candidate, job, weights) always yields the same assessment.

pub mod aggregate;
pub mod confidence;
pub mod criteria;
pub mod scorer;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::candidate::CandidateProfile;
use crate::models::job::Job;

pub use aggregate::{aggregate, CriterionBreakdown, ScoreBreakdown, ScoringWeights, RUBRIC_WEIGHTS};
pub use confidence::estimate_confidence;
pub use scorer::{CandidateScorer, RubricScorer};

pub const MAX_SCORE: f64 = 10.0;

/// One scoring dimension of the rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    SkillsMatch,
    ExperienceRelevance,
    Education,
    CompanyPrestige,
    LocationFit,
    ProfileCompleteness,
}

impl Criterion {
    pub const ALL: [Criterion; 6] = [
        Criterion::SkillsMatch,
        Criterion::ExperienceRelevance,
        Criterion::Education,
        Criterion::CompanyPrestige,
        Criterion::LocationFit,
        Criterion::ProfileCompleteness,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::SkillsMatch => "skills_match",
            Criterion::ExperienceRelevance => "experience_relevance",
            Criterion::Education => "education",
            Criterion::CompanyPrestige => "company_prestige",
            Criterion::LocationFit => "location_fit",
            Criterion::ProfileCompleteness => "profile_completeness",
        }
    }
}

/// Output of a single evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    /// 0 – 10, rounded to two decimals
    pub score: f64,
    pub breakdown: Value,
}

impl CriterionResult {
    /// Clamps to [0, 10] and rounds to two decimals.
    pub fn new(score: f64, breakdown: Value) -> Self {
        let score = if score.is_finite() {
            round2(score.clamp(0.0, MAX_SCORE))
        } else {
            0.0
        };
        Self { score, breakdown }
    }
}

/// Everything scoring attaches to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitAssessment {
    pub final_score: f64,
    pub breakdown: ScoreBreakdown,
    /// 0 – 1, independent of `final_score`
    pub confidence: f64,
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Runs all six evaluators for one candidate/job pair.
pub fn evaluate_all(candidate: &CandidateProfile, job: &Job) -> Vec<(Criterion, CriterionResult)> {
    vec![
        (
            Criterion::SkillsMatch,
            criteria::skills_match(&candidate.skills, &job.required_skills, &job.preferred_skills),
        ),
        (
            Criterion::ExperienceRelevance,
            criteria::experience_relevance(&candidate.experience, &job.title, job.required_years),
        ),
        (
            Criterion::Education,
            criteria::education(&candidate.education, job.required_degree.as_deref()),
        ),
        (
            Criterion::CompanyPrestige,
            criteria::company_prestige(&candidate.experience),
        ),
        (
            Criterion::LocationFit,
            criteria::location_fit(&candidate.location, &job.location, job.remote_allowed),
        ),
        (
            Criterion::ProfileCompleteness,
            criteria::profile_completeness(candidate),
        ),
    ]
}

/// Scores a candidate against a job: weighted fit score, breakdown, and confidence.
pub fn assess(candidate: &CandidateProfile, job: &Job, weights: &ScoringWeights) -> FitAssessment {
    let (final_score, breakdown) = aggregate(evaluate_all(candidate, job), weights);
    FitAssessment {
        final_score,
        breakdown,
        confidence: estimate_confidence(candidate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{EducationEntry, ExperienceEntry};

    fn sample_job() -> Job {
        Job::new("Senior Software Engineer", "Acme")
            .with_required_skills(["Python", "AWS"])
            .with_location("San Francisco, CA", false)
            .with_required_years(4)
    }

    fn sample_candidate() -> CandidateProfile {
        CandidateProfile {
            name: "Sarah Johnson".to_string(),
            linkedin_url: "https://linkedin.com/in/sarah-johnson-123".to_string(),
            headline: "Senior Software Engineer at TechCorp".to_string(),
            location: "San Francisco, CA".to_string(),
            skills: vec!["Python".to_string(), "Docker".to_string()],
            experience: vec![
                ExperienceEntry::new("TechCorp", "Senior Software Engineer", "2 years"),
                ExperienceEntry::new("StartupXYZ", "Software Engineer", "3 years"),
            ],
            education: vec![EducationEntry::new("Stanford University", "MS Computer Science")],
            summary: String::new(),
            ..Default::default()
        }
    }

    #[test]
    fn test_criterion_names_match_serde() {
        for criterion in Criterion::ALL {
            let value = serde_json::to_value(criterion).unwrap();
            assert_eq!(value, Value::String(criterion.as_str().to_string()));
        }
    }

    #[test]
    fn test_criterion_result_clamps_and_rounds() {
        assert_eq!(CriterionResult::new(12.0, Value::Null).score, 10.0);
        assert_eq!(CriterionResult::new(-1.0, Value::Null).score, 0.0);
        assert_eq!(CriterionResult::new(7.3333, Value::Null).score, 7.33);
        assert_eq!(CriterionResult::new(f64::NAN, Value::Null).score, 0.0);
    }

    #[test]
    fn test_end_to_end_score_recomputable_by_hand() {
        let job = sample_job();
        let candidate = sample_candidate();
        let assessment = assess(&candidate, &job, &RUBRIC_WEIGHTS);

        let skills = assessment.breakdown.get(Criterion::SkillsMatch).unwrap();
        assert_eq!(skills.score, 4.0);

        // experience: 5 years / 4 * 8 = 10 → capped
        // education: MS 8.5 + Stanford 1.0 = 9.5
        // company: TechCorp 6.0, StartupXYZ 7.0 → 6.5
        // location: exact → 10.0
        // completeness: 6/7 required → 6.857 → 6.86
        let expected = [
            (Criterion::SkillsMatch, 4.0),
            (Criterion::ExperienceRelevance, 10.0),
            (Criterion::Education, 9.5),
            (Criterion::CompanyPrestige, 6.5),
            (Criterion::LocationFit, 10.0),
            (Criterion::ProfileCompleteness, 6.86),
        ];
        let mut by_hand = 0.0;
        for (criterion, score) in expected {
            let entry = assessment.breakdown.get(criterion).unwrap();
            assert_eq!(entry.score, score, "{}", criterion.as_str());
            by_hand += score * RUBRIC_WEIGHTS.weight(criterion);
        }
        assert_eq!(assessment.final_score, round2(by_hand));
        assert_eq!(assessment.final_score, 7.44);
    }

    #[test]
    fn test_empty_candidate_stays_in_bounds() {
        let assessment = assess(&CandidateProfile::default(), &sample_job(), &RUBRIC_WEIGHTS);
        assert!((0.0..=10.0).contains(&assessment.final_score));
        assert_eq!(assessment.confidence, 0.0);
    }

    #[test]
    fn test_assessment_is_idempotent() {
        let job = sample_job();
        let candidate = sample_candidate();
        assert_eq!(evaluate_all(&candidate, &job), evaluate_all(&candidate, &job));
        assert_eq!(
            assess(&candidate, &job, &RUBRIC_WEIGHTS),
            assess(&candidate, &job, &RUBRIC_WEIGHTS)
        );
    }

    #[test]
    fn test_confidence_ignores_job() {
        let candidate = sample_candidate();
        let a = assess(&candidate, &sample_job(), &RUBRIC_WEIGHTS).confidence;
        let b = assess(&candidate, &Job::new("Chef", "Bistro"), &RUBRIC_WEIGHTS).confidence;
        assert_eq!(a, b);
        assert!((0.0..=1.0).contains(&a));
    }
}
