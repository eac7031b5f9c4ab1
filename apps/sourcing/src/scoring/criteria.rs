//! Criterion evaluators: one pure function per rubric dimension.
//!
//! Each evaluator takes only the candidate and job fields it needs and returns a
//! `CriterionResult` with a score in [0, 10] and a JSON breakdown. Missing or empty
//! input never fails: it degrades to the documented neutral default instead.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::json;

use crate::models::candidate::{has_text, CandidateProfile, EducationEntry, ExperienceEntry};
use crate::scoring::{round2, CriterionResult, MAX_SCORE};

/// Neutral score used when a job or profile gives nothing to evaluate.
pub const NEUTRAL_SCORE: f64 = 5.0;
/// Candidates with no experience at all carry real risk, so they sit below neutral.
pub const NO_EXPERIENCE_SCORE: f64 = 1.0;
/// Assumed length of an experience entry whose duration cannot be parsed.
pub const DEFAULT_DURATION_YEARS: f64 = 1.0;
/// Title-word overlap above which an entry counts as relevant experience.
pub const RELEVANT_TITLE_RATIO: f64 = 0.6;

const REQUIRED_SKILLS_MAX: f64 = 8.0;
const PREFERRED_SKILLS_MAX: f64 = 2.0;

const YEARS_MAX: f64 = 8.0;
const RELEVANCE_MAX: f64 = 2.0;

const PRESTIGE_SCHOOL_BONUS: f64 = 1.0;

/// Degree keywords and their score. Matching picks the longest keyword found,
/// so "masters" beats "ma" and "high school" beats nothing.
/// Keywords of three characters or fewer only match whole tokens ("ms", "ba", "phd").
const DEGREE_LEVELS: &[(&str, f64)] = &[
    ("doctorate", 10.0),
    ("doctor", 10.0),
    ("phd", 10.0),
    ("masters", 8.5),
    ("master", 8.5),
    ("mba", 8.5),
    ("msc", 8.5),
    ("ms", 8.5),
    ("ma", 8.0),
    ("bachelors", 7.0),
    ("bachelor", 7.0),
    ("bsc", 7.0),
    ("bs", 7.0),
    ("ba", 6.5),
    ("associate", 5.0),
    ("high school", 3.0),
];

const PRESTIGIOUS_SCHOOLS: &[&str] = &["stanford", "mit", "harvard", "berkeley", "cmu", "caltech"];

const PRESTIGIOUS_COMPANIES: &[&str] = &[
    "google",
    "microsoft",
    "apple",
    "amazon",
    "meta",
    "facebook",
    "netflix",
    "uber",
    "airbnb",
    "stripe",
    "square",
    "palantir",
    "salesforce",
    "oracle",
    "ibm",
    "intel",
    "nvidia",
    "amd",
];

const PRESTIGE_COMPANY_SCORE: f64 = 9.0;
const STARTUP_COMPANY_SCORE: f64 = 7.0;
const OTHER_COMPANY_SCORE: f64 = 6.0;

const REQUIRED_PROFILE_FIELDS: usize = 7;
const OPTIONAL_PROFILE_FIELDS: usize = 6;

// ────────────────────────────────────────────────────────────────────────────
// Skills match
// ────────────────────────────────────────────────────────────────────────────

/// Scores skill overlap. Required coverage is worth up to 8 points, preferred
/// coverage up to 2. Skill names are compared case-insensitively.
pub fn skills_match(
    candidate_skills: &[String],
    required_skills: &BTreeSet<String>,
    preferred_skills: &BTreeSet<String>,
) -> CriterionResult {
    let required = normalize_skill_set(required_skills);
    if required.is_empty() {
        return CriterionResult::new(
            NEUTRAL_SCORE,
            json!({ "reason": "No required skills specified" }),
        );
    }

    let have: HashSet<String> = candidate_skills.iter().map(|s| normalize(s)).collect();

    let matched_required = required.keys().filter(|k| have.contains(*k)).count();
    let required_match = matched_required as f64 / required.len() as f64;

    let preferred = normalize_skill_set(preferred_skills);
    let preferred_match = if preferred.is_empty() {
        0.0
    } else {
        preferred.keys().filter(|k| have.contains(*k)).count() as f64 / preferred.len() as f64
    };
    let preferred_bonus = preferred_match * PREFERRED_SKILLS_MAX;

    let score = (required_match * REQUIRED_SKILLS_MAX + preferred_bonus).min(MAX_SCORE);

    let missing_required: Vec<&str> = required
        .iter()
        .filter(|(k, _)| !have.contains(*k))
        .map(|(_, original)| original.as_str())
        .collect();

    CriterionResult::new(
        score,
        json!({
            "required_match": round2(required_match),
            "matched_required": matched_required,
            "preferred_match": round2(preferred_match),
            "preferred_bonus": round2(preferred_bonus),
            "candidate_skills": candidate_skills,
            "missing_required": missing_required,
        }),
    )
}

fn normalize(skill: &str) -> String {
    skill.trim().to_lowercase()
}

/// normalized → original spelling, ignoring blanks and case-only duplicates.
fn normalize_skill_set(skills: &BTreeSet<String>) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for skill in skills {
        let key = normalize(skill);
        if !key.is_empty() {
            out.entry(key).or_insert_with(|| skill.trim().to_string());
        }
    }
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Experience relevance
// ────────────────────────────────────────────────────────────────────────────

/// Scores tenure against the required years plus the share of that tenure
/// spent in titles resembling the job title.
pub fn experience_relevance(
    experience: &[ExperienceEntry],
    job_title: &str,
    required_years: u32,
) -> CriterionResult {
    if experience.is_empty() {
        return CriterionResult::new(
            NO_EXPERIENCE_SCORE,
            json!({ "reason": "No experience data available" }),
        );
    }

    let mut total_years = 0.0_f64;
    let mut relevant_years = 0.0_f64;
    let mut relevance_sum = 0.0_f64;
    let mut unparsed_durations = 0_usize;

    for entry in experience {
        let years = match parse_duration_years(&entry.duration) {
            Some(y) => y,
            None => {
                unparsed_durations += 1;
                DEFAULT_DURATION_YEARS
            }
        };
        total_years += years;

        let ratio = title_relevance(&entry.title, job_title);
        relevance_sum += ratio;
        if ratio > RELEVANT_TITLE_RATIO {
            relevant_years += years;
        }
    }

    let years_score = total_years / f64::from(required_years.max(1)) * YEARS_MAX;
    let relevance_score = relevant_years / total_years.max(1.0) * RELEVANCE_MAX;
    let score = (years_score + relevance_score).min(MAX_SCORE);

    CriterionResult::new(
        score,
        json!({
            "total_years": round2(total_years),
            "relevant_years": round2(relevant_years),
            "required_years": required_years,
            "years_score": round2(years_score),
            "relevance_score": round2(relevance_score),
            "title_relevance_avg": round2(relevance_sum / experience.len() as f64),
            "unparsed_durations": unparsed_durations,
        }),
    )
}

/// Parses free-text durations such as "2 years", "6 months", "1 year 6 months" or "3+ yrs".
/// Returns `None` when no number/unit pair is recognised.
pub fn parse_duration_years(duration: &str) -> Option<f64> {
    let lower = duration.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    let mut years = 0.0_f64;
    let mut recognised = false;

    for (i, token) in tokens.iter().enumerate() {
        let (number, attached_unit) = split_number(token);
        let Some(value) = number else { continue };

        let unit = if attached_unit.is_empty() {
            tokens.get(i + 1).copied().unwrap_or("")
        } else {
            attached_unit
        };

        if unit.starts_with("year") || unit.starts_with("yr") {
            years += value;
            recognised = true;
        } else if unit.starts_with("month") || unit.starts_with("mo") {
            years += value / 12.0;
            recognised = true;
        }
    }

    recognised.then_some(years)
}

/// Splits "2", "2.5", "3+" or "2yrs" into the number and any unit glued to it.
fn split_number(token: &str) -> (Option<f64>, &str) {
    let end = token
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(token.len());
    if end == 0 {
        return (None, "");
    }
    let value = token[..end]
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0);
    let rest = token[end..].trim_start_matches('+');
    (value, rest)
}

/// Share of job-title words that also appear in the candidate's title.
pub fn title_relevance(candidate_title: &str, job_title: &str) -> f64 {
    let job_words: HashSet<String> = job_title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    if job_words.is_empty() {
        return 0.0;
    }
    let candidate_words: HashSet<String> = candidate_title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect();
    job_words.intersection(&candidate_words).count() as f64 / job_words.len() as f64
}

// ────────────────────────────────────────────────────────────────────────────
// Education
// ────────────────────────────────────────────────────────────────────────────

/// Scores the highest degree found, plus a flat bonus for a prestigious school.
/// `required_degree` is reported in the breakdown but does not move the score.
pub fn education(education: &[EducationEntry], required_degree: Option<&str>) -> CriterionResult {
    if education.is_empty() {
        return CriterionResult::new(
            NEUTRAL_SCORE,
            json!({ "reason": "No education data available" }),
        );
    }

    let mut degree_score = 0.0_f64;
    let mut best_degree = "";
    for entry in education {
        if let Some(score) = degree_level(&entry.degree) {
            if score > degree_score {
                degree_score = score;
                best_degree = entry.degree.as_str();
            }
        }
    }

    let prestigious_school = education.iter().find(|e| {
        let school = e.school.to_lowercase();
        PRESTIGIOUS_SCHOOLS.iter().any(|p| school.contains(p))
    });
    let school_bonus = if prestigious_school.is_some() {
        PRESTIGE_SCHOOL_BONUS
    } else {
        0.0
    };

    let required_degree_met = required_degree
        .filter(|d| has_text(d))
        .map(|d| degree_level(d).map_or(true, |required| degree_score >= required));

    CriterionResult::new(
        (degree_score + school_bonus).min(MAX_SCORE),
        json!({
            "highest_degree": best_degree,
            "degree_score": degree_score,
            "school_bonus": school_bonus,
            "prestigious_school": prestigious_school.map(|e| e.school.as_str()),
            "education_entries": education.len(),
            "required_degree_met": required_degree_met,
        }),
    )
}

/// Maps a free-text degree to its level score. Dual degrees ("BS/MS") take the higher level.
pub fn degree_level(degree: &str) -> Option<f64> {
    let cleaned: String = degree.to_lowercase().replace('.', "");
    let tokens: HashSet<&str> = cleaned
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    DEGREE_LEVELS
        .iter()
        .filter(|(keyword, _)| {
            if keyword.len() <= 3 {
                tokens.contains(keyword)
            } else {
                cleaned.contains(keyword)
            }
        })
        .map(|(_, score)| *score)
        .max_by(f64::total_cmp)
}

// ────────────────────────────────────────────────────────────────────────────
// Company prestige
// ────────────────────────────────────────────────────────────────────────────

/// Averages a per-employer prestige score. Entries with a blank company name are ignored.
pub fn company_prestige(experience: &[ExperienceEntry]) -> CriterionResult {
    let scores: Vec<(&str, f64)> = experience
        .iter()
        .filter(|e| has_text(&e.company_name))
        .map(|e| (e.company_name.trim(), employer_score(&e.company_name)))
        .collect();

    if scores.is_empty() {
        return CriterionResult::new(
            NEUTRAL_SCORE,
            json!({ "reason": "No company data available" }),
        );
    }

    let mean = scores.iter().map(|(_, s)| s).sum::<f64>() / scores.len() as f64;
    let prestigious = scores
        .iter()
        .filter(|(_, s)| *s >= PRESTIGE_COMPANY_SCORE)
        .count();

    CriterionResult::new(
        mean,
        json!({
            "company_scores": scores
                .iter()
                .map(|(name, score)| json!({ "company": name, "score": score }))
                .collect::<Vec<_>>(),
            "prestigious_companies": prestigious,
            "total_companies": scores.len(),
        }),
    )
}

fn employer_score(company_name: &str) -> f64 {
    let name = company_name.to_lowercase();
    if is_prestigious_lowercase(&name) {
        PRESTIGE_COMPANY_SCORE
    } else if name.contains("startup") || name.contains("inc") {
        STARTUP_COMPANY_SCORE
    } else {
        OTHER_COMPANY_SCORE
    }
}

pub(crate) fn is_prestigious_company(company_name: &str) -> bool {
    is_prestigious_lowercase(&company_name.to_lowercase())
}

fn is_prestigious_lowercase(name: &str) -> bool {
    PRESTIGIOUS_COMPANIES.iter().any(|p| name.contains(p))
}

pub(crate) fn is_prestigious_school(school: &str) -> bool {
    let school = school.to_lowercase();
    PRESTIGIOUS_SCHOOLS.iter().any(|p| school.contains(p))
}

// ────────────────────────────────────────────────────────────────────────────
// Location fit
// ────────────────────────────────────────────────────────────────────────────

/// Exact match 10, same city 9, same state/region 7, remote 6, otherwise 3.
pub fn location_fit(
    candidate_location: &str,
    job_location: &str,
    remote_allowed: bool,
) -> CriterionResult {
    if !has_text(candidate_location) || !has_text(job_location) {
        return CriterionResult::new(
            NEUTRAL_SCORE,
            json!({ "match": "unknown", "reason": "Location data incomplete" }),
        );
    }

    let candidate_parts = location_segments(candidate_location);
    let job_parts = location_segments(job_location);

    let (score, label) = if candidate_location.trim().to_lowercase()
        == job_location.trim().to_lowercase()
    {
        (10.0, "exact")
    } else if same_segment(&candidate_parts, &job_parts, 0) {
        (9.0, "same_city")
    } else if same_segment(&candidate_parts, &job_parts, 1) {
        (7.0, "same_region")
    } else if remote_allowed {
        (6.0, "remote")
    } else {
        (3.0, "mismatch")
    };

    CriterionResult::new(
        score,
        json!({
            "match": label,
            "candidate_location": candidate_location,
            "job_location": job_location,
            "remote_allowed": remote_allowed,
        }),
    )
}

fn location_segments(location: &str) -> Vec<String> {
    location
        .split(',')
        .map(|p| p.trim().to_lowercase())
        .collect()
}

/// Blank segments never match.
fn same_segment(a: &[String], b: &[String], index: usize) -> bool {
    match (a.get(index), b.get(index)) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profile completeness
// ────────────────────────────────────────────────────────────────────────────

/// Required-field coverage is worth up to 8 points, optional fields up to 1.
pub fn profile_completeness(candidate: &CandidateProfile) -> CriterionResult {
    let required = [
        ("name", has_text(&candidate.name)),
        ("headline", has_text(&candidate.headline)),
        ("location", has_text(&candidate.location)),
        ("experience", !candidate.experience.is_empty()),
        ("education", !candidate.education.is_empty()),
        ("skills", !candidate.skills.is_empty()),
        ("summary", has_text(&candidate.summary)),
    ];
    let optional = [
        ("certifications", !candidate.certifications.is_empty()),
        ("volunteer", !candidate.volunteer.is_empty()),
        ("publications", !candidate.publications.is_empty()),
        ("patents", !candidate.patents.is_empty()),
        ("awards", !candidate.awards.is_empty()),
        ("languages", !candidate.languages.is_empty()),
    ];

    let required_ratio =
        required.iter().filter(|(_, present)| *present).count() as f64 / REQUIRED_PROFILE_FIELDS as f64;
    let optional_bonus = optional.iter().filter(|(_, present)| *present).count() as f64
        / OPTIONAL_PROFILE_FIELDS as f64
        * 0.5;

    let score = (required_ratio * 8.0 + optional_bonus * 2.0).min(MAX_SCORE);

    let missing_required: Vec<&str> = required
        .iter()
        .filter(|(_, present)| !present)
        .map(|(field, _)| *field)
        .collect();

    CriterionResult::new(
        score,
        json!({
            "required_fields_complete": round2(required_ratio),
            "optional_fields_bonus": round2(optional_bonus),
            "missing_required": missing_required,
        }),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
