// Prompt constants and builders for LLM-drafted outreach.

use crate::collaborators::outreach::{analyze_profile, personalization_details};
use crate::models::{Job, ScoredCandidate};

/// System prompt for outreach drafting: plain text only.
pub const OUTREACH_SYSTEM: &str = "You are a senior technical recruiter writing LinkedIn outreach. \
    Write one short, warm, professional message in plain text. \
    Reference specific details from the candidate profile. \
    Do NOT invent facts that are not in the profile. \
    Do NOT use markdown, subject lines, or placeholders. \
    End with a clear, low-pressure call to action.";

/// Outreach prompt template. Replace every `{...}` slot before sending.
pub const OUTREACH_PROMPT_TEMPLATE: &str = "Write a LinkedIn message (80 to 150 words) inviting \
the candidate below to learn about the {title} role at {company}.

ROLE
Title: {title}
Company: {company}
Location: {location}
Required skills: {required_skills}

CANDIDATE
Name: {name}
Headline: {headline}
Strongest hooks: {hooks}
Profile details: {details}
Fit score: {fit_score}/10

Open with the strongest hook. Do not mention the fit score.";

pub fn outreach_prompt(candidate: &ScoredCandidate, job: &Job) -> String {
    let profile = &candidate.profile;
    let highlights = analyze_profile(profile);
    let hooks = if highlights.hooks.is_empty() {
        "none".to_string()
    } else {
        highlights.hooks.join("; ")
    };
    let required_skills = job
        .required_skills
        .iter()
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    OUTREACH_PROMPT_TEMPLATE
        .replace("{title}", job.title.trim())
        .replace("{company}", job.company.trim())
        .replace("{location}", or_unknown(&job.location))
        .replace("{required_skills}", or_unknown(&required_skills))
        .replace("{name}", profile.display_name())
        .replace("{headline}", or_unknown(&profile.headline))
        .replace("{hooks}", &hooks)
        .replace("{details}", &personalization_details(&highlights))
        .replace("{fit_score}", &format!("{:.2}", candidate.fit_score))
}

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        "unknown"
    } else {
        value.trim()
    }
}
