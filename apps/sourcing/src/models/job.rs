use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::SourcingError;

/// A job opening that candidates are sourced and scored against.
/// Treated as immutable for the duration of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Job {
    /// Caller-supplied identifier. A v4 UUID is assigned when left empty.
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub description: String,
    pub required_skills: BTreeSet<String>,
    pub preferred_skills: BTreeSet<String>,
    pub location: String,
    pub remote_allowed: bool,
    pub required_years: u32,
    pub required_degree: Option<String>,
}

impl Job {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            title: title.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    pub fn with_required_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_preferred_skills<I, S>(mut self, skills: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.preferred_skills = skills.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>, remote_allowed: bool) -> Self {
        self.location = location.into();
        self.remote_allowed = remote_allowed;
        self
    }

    pub fn with_required_years(mut self, years: u32) -> Self {
        self.required_years = years;
        self
    }

    /// Returns the job id, generating one if the caller left it blank.
    pub fn ensure_id(&mut self) -> &str {
        if self.job_id.trim().is_empty() {
            self.job_id = Uuid::new_v4().to_string();
        }
        &self.job_id
    }

    /// Rejects jobs that cannot be sourced: a blank title or company, or blank skill names.
    pub fn validate(&self) -> Result<(), SourcingError> {
        let mut missing = Vec::new();
        if self.title.trim().is_empty() {
            missing.push("title");
        }
        if self.company.trim().is_empty() {
            missing.push("company");
        }
        if !missing.is_empty() {
            return Err(SourcingError::Validation(format!(
                "Missing required job fields: {}",
                missing.join(", ")
            )));
        }

        let blank_skill = self
            .required_skills
            .iter()
            .chain(self.preferred_skills.iter())
            .any(|s| s.trim().is_empty());
        if blank_skill {
            return Err(SourcingError::Validation(
                "Skill names cannot be blank".to_string(),
            ));
        }

        Ok(())
    }
}
