//! Template outreach generator.
//!
//! Builds a LinkedIn-style message from personalization hooks found in the
//! profile (notable employers, skills, schools, career progression), then
//! tunes it for response rate and checks it against a few quality rules.
//! Deterministic and offline; also supplies the generic fallback message the
//! pipeline uses when any generator fails.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use crate::collaborators::MessageGenerator;
use crate::errors::SourcingError;
use crate::llm_client::{prompts, LlmClient};
use crate::models::candidate::has_text;
use crate::models::{CandidateProfile, Job, ScoredCandidate};
use crate::scoring::criteria::{is_prestigious_company, is_prestigious_school};

const TECHNICAL_SKILLS: &[&str] = &[
    "python",
    "java",
    "javascript",
    "react",
    "node",
    "aws",
    "docker",
    "kubernetes",
    "machine learning",
    "data science",
    "sql",
    "nosql",
    "api",
    "microservices",
    "devops",
    "cloud",
    "azure",
    "gcp",
    "tensorflow",
    "pytorch",
    "scala",
    "rust",
    "go",
    "ai",
];

const MAX_HIGHLIGHTED_SKILLS: usize = 3;
const SHORTEN_ABOVE_WORDS: usize = 150;
const MAX_WORDS: usize = 200;
const MIN_WORDS: usize = 50;

const CALL_TO_ACTION: &str = "Would you be interested in learning more about this opportunity?";
const CTA_PHRASES: &[&str] = &["interested", "connect", "discuss", "learn more"];
const URGENCY_WORDS: &[&str] = &["urgent", "quick", "immediate", "asap"];

// ────────────────────────────────────────────────────────────────────────────
// Profile analysis
// ────────────────────────────────────────────────────────────────────────────

/// Facts about a profile that a message can reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileHighlights {
    /// (title, company) for each entry with both fields present.
    pub roles: Vec<(String, String)>,
    pub technical_skills: Vec<String>,
    /// (degree, school) for each entry with both fields present.
    pub degrees: Vec<(String, String)>,
    /// Ordered strongest first.
    pub hooks: Vec<String>,
}

pub fn analyze_profile(profile: &CandidateProfile) -> ProfileHighlights {
    let roles = profile
        .experience
        .iter()
        .filter(|e| has_text(&e.company_name) && has_text(&e.title))
        .map(|e| (e.title.trim().to_string(), e.company_name.trim().to_string()))
        .collect();

    let technical_skills = profile
        .skills
        .iter()
        .filter(|s| is_technical_skill(s))
        .take(MAX_HIGHLIGHTED_SKILLS)
        .map(|s| s.trim().to_string())
        .collect();

    let degrees = profile
        .education
        .iter()
        .filter(|e| has_text(&e.school) && has_text(&e.degree))
        .map(|e| (e.degree.trim().to_string(), e.school.trim().to_string()))
        .collect();

    ProfileHighlights {
        roles,
        technical_skills,
        degrees,
        hooks: personalization_hooks(profile),
    }
}

pub fn personalization_hooks(profile: &CandidateProfile) -> Vec<String> {
    let mut hooks = Vec::new();

    for entry in &profile.experience {
        if has_text(&entry.company_name) && is_prestigious_company(&entry.company_name) {
            hooks.push(format!("experience at {}", entry.company_name.trim()));
        }
    }

    let top_skills: Vec<&str> = profile
        .skills
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(MAX_HIGHLIGHTED_SKILLS)
        .collect();
    if !top_skills.is_empty() {
        hooks.push(format!("expertise in {}", top_skills.join(", ")));
    }

    for entry in &profile.education {
        if has_text(&entry.school) && is_prestigious_school(&entry.school) {
            hooks.push(format!("background from {}", entry.school.trim()));
        }
    }

    if profile.experience.len() > 1 {
        hooks.push("impressive career progression".to_string());
    }

    hooks
}

/// Substring match, except two-letter keywords ("ai", "go") which must equal a word.
fn is_technical_skill(skill: &str) -> bool {
    let skill = skill.to_lowercase();
    TECHNICAL_SKILLS.iter().any(|keyword| {
        if keyword.len() <= 2 {
            skill.split_whitespace().any(|w| w == *keyword)
        } else {
            skill.contains(keyword)
        }
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Message assembly
// ────────────────────────────────────────────────────────────────────────────

fn greeting_name(profile: &CandidateProfile) -> &str {
    if has_text(&profile.name) {
        profile.name.trim()
    } else {
        "there"
    }
}

fn role_and_company(job: &Job) -> (&str, &str) {
    let title = if has_text(&job.title) { job.title.trim() } else { "new" };
    let company = if has_text(&job.company) {
        job.company.trim()
    } else {
        "our company"
    };
    (title, company)
}

pub fn personalization_details(highlights: &ProfileHighlights) -> String {
    let mut details = Vec::new();

    if let Some((title, company)) = highlights.roles.first() {
        details.push(format!(
            "Your experience as {title} at {company} particularly caught my attention."
        ));
    }
    if !highlights.technical_skills.is_empty() {
        details.push(format!(
            "Your expertise in {} aligns perfectly with what we're looking for.",
            highlights.technical_skills.join(", ")
        ));
    }
    if let Some((degree, school)) = highlights.degrees.first() {
        details.push(format!(
            "Your {degree} from {school} demonstrates the strong foundation we value."
        ));
    }

    if details.is_empty() {
        "Your professional background and experience seem like a great match for our team."
            .to_string()
    } else {
        details.join(" ")
    }
}

fn compose(profile: &CandidateProfile, job: &Job, sender: &str) -> String {
    let highlights = analyze_profile(profile);
    let (title, company) = role_and_company(job);
    let name = greeting_name(profile);
    let details = personalization_details(&highlights);

    match highlights.hooks.first() {
        Some(hook) => format!(
            "Hi {name},\n\n\
             I came across your profile and was particularly impressed by your {hook}. \
             Your background seems like a great fit for our {title} position at {company}.\n\n\
             {details}\n\n\
             Would you be interested in learning more about this opportunity? \
             I'd love to connect and discuss how your experience could contribute to our team.\n\n\
             Best regards,\n{sender}"
        ),
        None => format!(
            "Hi {name},\n\n\
             I hope this message finds you well. I came across your profile and was impressed \
             by your professional background. We're currently hiring for a {title} position at \
             {company}, and I believe your experience could be a great fit.\n\n\
             {details}\n\n\
             Would you be interested in learning more about this opportunity? \
             I'd be happy to share details about the role and our company.\n\n\
             Best regards,\n{sender}"
        ),
    }
}

/// Response-rate pass: keep it short, make sure there is a call to action,
/// and frame the role as an exciting opportunity.
pub fn optimize_for_response(message: String) -> String {
    let mut message = if word_count(&message) > SHORTEN_ABOVE_WORDS {
        shorten(&message)
    } else {
        message
    };

    if !message.contains("Would you be interested") {
        message = message.replace("Best regards,", &format!("{CALL_TO_ACTION}\n\nBest regards,"));
    }
    if message.contains("I came across your profile") && !message.contains("impressed") {
        message = message.replace(
            "I came across your profile",
            "I came across your profile and was impressed",
        );
    }
    if message.contains("this opportunity") && !message.contains("exciting") {
        message = message.replace("this opportunity", "this exciting opportunity");
    }
    message
}

/// Keeps the first two sentences and the last one.
fn shorten(message: &str) -> String {
    let sentences: Vec<&str> = message.split(". ").collect();
    if sentences.len() <= 3 {
        return message.to_string();
    }
    let mut kept = sentences[..2].to_vec();
    kept.push(sentences[sentences.len() - 1]);
    kept.join(". ")
}

fn word_count(message: &str) -> usize {
    message.split_whitespace().count()
}

/// Fallback used when message generation fails for a candidate.
pub fn generic_message(profile: &CandidateProfile, job: &Job) -> String {
    let (_, company) = role_and_company(job);
    let role = if has_text(&job.title) {
        format!("the {} role", job.title.trim())
    } else {
        "an open role".to_string()
    };
    format!(
        "Hi {}, I came across your profile and think your background could be a great fit \
         for {role} at {company}. Would you be interested in learning more?",
        greeting_name(profile)
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Quality checks
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageQuality {
    pub is_valid: bool,
    pub word_count: usize,
    pub character_count: usize,
    pub issues: Vec<String>,
    pub suggestions: Vec<String>,
}

pub fn validate_message(message: &str) -> MessageQuality {
    let lower = message.to_lowercase();
    let mut quality = MessageQuality {
        word_count: word_count(message),
        character_count: message.chars().count(),
        ..Default::default()
    };

    if quality.word_count > MAX_WORDS {
        quality
            .issues
            .push(format!("Message is too long (over {MAX_WORDS} words)"));
        quality
            .suggestions
            .push("Consider shortening to improve readability".to_string());
    }
    if quality.word_count < MIN_WORDS {
        quality
            .issues
            .push(format!("Message is too short (under {MIN_WORDS} words)"));
        quality
            .suggestions
            .push("Add more personalization details".to_string());
    }
    if !lower.contains("your") {
        quality.issues.push("Message lacks personalization".to_string());
        quality
            .suggestions
            .push("Include specific details about the candidate".to_string());
    }
    if !CTA_PHRASES.iter().any(|p| lower.contains(p)) {
        quality.issues.push("No clear call-to-action".to_string());
        quality
            .suggestions
            .push("Add a specific next step or question".to_string());
    }
    // Urgency is a style suggestion, not an issue.
    if URGENCY_WORDS.iter().any(|w| lower.contains(w)) {
        quality.suggestions.push(
            "Consider removing urgency language for a more professional tone".to_string(),
        );
    }

    quality.is_valid = quality.issues.is_empty();
    quality
}

// ────────────────────────────────────────────────────────────────────────────
// TemplateMessageGenerator
// ────────────────────────────────────────────────────────────────────────────

/// Offline `MessageGenerator` built on the templates above.
#[derive(Debug, Clone)]
pub struct TemplateMessageGenerator {
    sender: String,
}

impl Default for TemplateMessageGenerator {
    fn default() -> Self {
        Self::new("The Recruiting Team")
    }
}

impl TemplateMessageGenerator {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
        }
    }

    pub fn draft(&self, profile: &CandidateProfile, job: &Job) -> String {
        optimize_for_response(compose(profile, job, &self.sender))
    }
}

#[async_trait]
impl MessageGenerator for TemplateMessageGenerator {
    async fn generate(
        &self,
        candidate: &ScoredCandidate,
        job: &Job,
    ) -> Result<String, SourcingError> {
        let message = self.draft(&candidate.profile, job);

        let quality = validate_message(&message);
        if !quality.is_valid {
            debug!(
                "Outreach for {} has quality issues: {}",
                candidate.profile.display_name(),
                quality.issues.join("; ")
            );
        }
        Ok(message)
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmMessageGenerator
// ────────────────────────────────────────────────────────────────────────────

/// Drafts outreach through Claude. Errors surface as per-candidate failures,
/// which the pipeline answers with `generic_message`.
#[derive(Clone)]
pub struct LlmMessageGenerator(pub LlmClient);

#[async_trait]
impl MessageGenerator for LlmMessageGenerator {
    async fn generate(
        &self,
        candidate: &ScoredCandidate,
        job: &Job,
    ) -> Result<String, SourcingError> {
        let prompt = prompts::outreach_prompt(candidate, job);
        let message = self.0.complete(&prompt, prompts::OUTREACH_SYSTEM).await?;

        let quality = validate_message(&message);
        if !quality.is_valid {
            debug!(
                "LLM outreach for {} has quality issues: {}",
                candidate.profile.display_name(),
                quality.issues.join("; ")
            );
        }
        Ok(message)
    }

    fn name(&self) -> &'static str {
        "llm"
    }
}
