use crate::models::candidate::{has_text, CandidateProfile};

/// Presence weights for the confidence estimate. They sum to 1.0.
const CONFIDENCE_FACTORS: &[(&str, f64)] = &[
    ("linkedin_url", 0.20),
    ("experience", 0.20),
    ("education", 0.15),
    ("skills", 0.15),
    ("summary", 0.10),
    ("location", 0.10),
    ("headline", 0.10),
];

/// Estimates how much the profile data can be trusted, in [0, 1].
///
/// Depends only on which fields are populated, never on the job, and has no
/// influence on the fit score.
pub fn estimate_confidence(candidate: &CandidateProfile) -> f64 {
    let confidence: f64 = CONFIDENCE_FACTORS
        .iter()
        .filter(|(field, _)| has_field(candidate, field))
        .map(|(_, weight)| weight)
        .sum();
    confidence.clamp(0.0, 1.0)
}

fn has_field(candidate: &CandidateProfile, field: &str) -> bool {
    match field {
        "linkedin_url" => has_text(&candidate.linkedin_url),
        "experience" => !candidate.experience.is_empty(),
        "education" => !candidate.education.is_empty(),
        "skills" => !candidate.skills.is_empty(),
        "summary" => has_text(&candidate.summary),
        "location" => has_text(&candidate.location),
        "headline" => has_text(&candidate.headline),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::candidate::{EducationEntry, ExperienceEntry};

    #[test]
    fn test_factor_weights_sum_to_one() {
        let sum: f64 = CONFIDENCE_FACTORS.iter().map(|(_, w)| w).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_profile_has_zero_confidence() {
        assert_eq!(estimate_confidence(&CandidateProfile::default()), 0.0);
    }

    #[test]
    fn test_full_profile_has_full_confidence() {
        let profile = CandidateProfile {
            name: "Ada".to_string(),
            linkedin_url: "https://linkedin.com/in/ada".to_string(),
            headline: "Engineer".to_string(),
            location: "London".to_string(),
            skills: vec!["Rust".to_string()],
            experience: vec![ExperienceEntry::new("Acme", "Engineer", "2 years")],
            education: vec![EducationEntry::new("MIT", "BS")],
            summary: "Ships".to_string(),
            ..Default::default()
        };
        assert!((estimate_confidence(&profile) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_whitespace_strings_do_not_count() {
        let profile = CandidateProfile {
            linkedin_url: "   ".to_string(),
            summary: "\t".to_string(),
            skills: vec!["Go".to_string()],
            ..Default::default()
        };
        assert!((estimate_confidence(&profile) - 0.15).abs() < 1e-9);
    }
}
