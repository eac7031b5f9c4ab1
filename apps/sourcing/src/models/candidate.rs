use serde::{Deserialize, Serialize};

/// One employment entry as reported by the search collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceEntry {
    pub company_name: String,
    pub title: String,
    /// Free text such as "2 years" or "6 months".
    pub duration: String,
}

impl ExperienceEntry {
    pub fn new(
        company_name: impl Into<String>,
        title: impl Into<String>,
        duration: impl Into<String>,
    ) -> Self {
        Self {
            company_name: company_name.into(),
            title: title.into(),
            duration: duration.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationEntry {
    pub school: String,
    pub degree: String,
}

impl EducationEntry {
    pub fn new(school: impl Into<String>, degree: impl Into<String>) -> Self {
        Self {
            school: school.into(),
            degree: degree.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSignals {
    pub username: String,
    pub repos_count: u32,
    pub followers: u32,
    pub top_languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocialSignals {
    pub handle: String,
    pub followers: u32,
    pub posts_count: u32,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Website {
    pub url: String,
    pub description: String,
}

/// Auxiliary signals attached by the enrichment stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentSignals {
    pub github: Option<GithubSignals>,
    pub social: Option<SocialSignals>,
    pub websites: Vec<Website>,
    /// Merged into the profile's skills during enrichment.
    pub additional_skills: Vec<String>,
    /// 0 – 10, see `collaborators::signals::enrichment_score`.
    pub enrichment_score: f64,
    pub insights: Vec<String>,
}

/// A candidate profile as produced by search and augmented by enrichment.
///
/// Every field is optional on the wire: partially-populated profiles are the norm,
/// and the scoring engine degrades toward neutral defaults instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    pub linkedin_url: String,
    pub headline: String,
    pub location: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub summary: String,

    // Optional fields, only counted toward completeness.
    pub certifications: Vec<String>,
    pub volunteer: Vec<String>,
    pub publications: Vec<String>,
    pub patents: Vec<String>,
    pub awards: Vec<String>,
    pub languages: Vec<String>,

    pub enrichment: Option<EnrichmentSignals>,
}

impl CandidateProfile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name used in logs and error messages.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "<unnamed candidate>"
        } else {
            self.name.trim()
        }
    }

    pub fn is_enriched(&self) -> bool {
        self.enrichment.is_some()
    }
}

/// True when a string field carries content after trimming whitespace.
pub(crate) fn has_text(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_profile_deserializes() {
        let profile: CandidateProfile = serde_json::from_str(
            r#"{"name": "Emily Rodriguez", "skills": ["Python"], "experience": [{"company_name": "CloudTech"}]}"#,
        )
        .unwrap();
        assert_eq!(profile.skills, vec!["Python".to_string()]);
        assert_eq!(profile.experience[0].duration, "");
        assert!(profile.enrichment.is_none());
    }

    #[test]
    fn test_display_name_falls_back() {
        assert_eq!(CandidateProfile::new("  ").display_name(), "<unnamed candidate>");
        assert_eq!(CandidateProfile::new(" Ada ").display_name(), "Ada");
    }

    #[test]
    fn test_has_text_trims() {
        assert!(!has_text("   "));
        assert!(has_text(" x "));
    }
}
