//! Enrichment signal analysis.
//!
//! Turns raw GitHub / social / website signals into banded sub-scores, readable
//! insights and one combined enrichment score (0 – 10). Pure and deterministic;
//! enrichers call `apply` after attaching raw signals to a profile.

use serde::Serialize;

use crate::models::{EnrichmentSignals, GithubSignals, SocialSignals, Website};
use crate::scoring::round2;

const GITHUB_SHARE: f64 = 0.7;
const SOCIAL_SHARE: f64 = 0.3;

const TECHNICAL_KEYWORDS: &[&str] = &["tech", "software", "ai", "ml", "programming", "engineering"];
const THOUGHT_LEADERSHIP_SCORE: f64 = 8.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GithubAnalysis {
    pub activity: f64,
    pub technical_expertise: f64,
    pub community_engagement: f64,
    pub overall: f64,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SocialAnalysis {
    pub professional_presence: f64,
    pub content_quality: f64,
    pub industry_engagement: f64,
    pub thought_leadership: f64,
    pub overall: f64,
    pub insights: Vec<String>,
}

pub fn analyze_github(github: &GithubSignals) -> GithubAnalysis {
    let mut insights = Vec::new();

    let activity = match github.repos_count {
        n if n > 20 => {
            insights.push("Very active GitHub user with many repositories".to_string());
            9.0
        }
        n if n > 10 => {
            insights.push("Active GitHub user with good repository count".to_string());
            7.0
        }
        n if n > 5 => {
            insights.push("Moderate GitHub activity".to_string());
            5.0
        }
        _ => {
            insights.push("Limited GitHub activity".to_string());
            3.0
        }
    };

    let community_engagement = match github.followers {
        n if n > 100 => {
            insights.push("Strong community presence".to_string());
            9.0
        }
        n if n > 50 => {
            insights.push("Good community engagement".to_string());
            7.0
        }
        n if n > 20 => {
            insights.push("Moderate community engagement".to_string());
            5.0
        }
        _ => {
            insights.push("Limited community engagement".to_string());
            3.0
        }
    };

    let technical_expertise = if github.top_languages.is_empty() {
        0.0
    } else {
        insights.push(format!("Proficient in {}", github.top_languages.join(", ")));
        (github.top_languages.len() as f64 * 2.0).min(10.0)
    };

    // No contribution-graph data is collected, so that 0.3 share stays empty.
    let overall = activity * 0.3 + technical_expertise * 0.2 + community_engagement * 0.2;

    GithubAnalysis {
        activity,
        technical_expertise,
        community_engagement,
        overall,
        insights,
    }
}

pub fn analyze_social(social: Option<&SocialSignals>, websites: &[Website]) -> SocialAnalysis {
    let mut analysis = SocialAnalysis::default();

    if let Some(social) = social {
        analysis.professional_presence = match social.followers {
            n if n > 1000 => {
                analysis
                    .insights
                    .push("Strong professional social media presence".to_string());
                8.0
            }
            n if n > 500 => {
                analysis
                    .insights
                    .push("Good professional social media presence".to_string());
                6.0
            }
            n if n > 100 => {
                analysis.insights.push("Moderate social media presence".to_string());
                4.0
            }
            _ => 0.0,
        };

        if !social.topics.is_empty() {
            analysis.industry_engagement = (social.topics.len() as f64 * 2.0).min(10.0);
            analysis
                .insights
                .push(format!("Engages with topics: {}", social.topics.join(", ")));
        }
    }

    if !websites.is_empty() {
        analysis.content_quality = (websites.len() as f64 * 3.0).min(10.0);
        analysis.insights.push(format!(
            "Maintains {} professional websites/blogs",
            websites.len()
        ));

        if websites.iter().any(|w| is_technical(&w.description)) {
            analysis.thought_leadership = THOUGHT_LEADERSHIP_SCORE;
            analysis
                .insights
                .push("Shares technical knowledge and insights".to_string());
        }
    }

    analysis.overall = analysis.professional_presence * 0.3
        + analysis.content_quality * 0.3
        + analysis.industry_engagement * 0.2
        + analysis.thought_leadership * 0.2;
    analysis
}

/// Short keywords ("ai", "ml") must match a whole word; longer ones match anywhere.
fn is_technical(text: &str) -> bool {
    let text = text.to_lowercase();
    let words: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    TECHNICAL_KEYWORDS.iter().any(|keyword| {
        if keyword.len() <= 2 {
            words.contains(keyword)
        } else {
            text.contains(keyword)
        }
    })
}

/// Combined score, GitHub weighted more heavily than social presence.
pub fn enrichment_score(github: Option<&GithubAnalysis>, social: &SocialAnalysis) -> f64 {
    let github = github.map_or(0.0, |g| g.overall);
    round2(github * GITHUB_SHARE + social.overall * SOCIAL_SHARE)
}

/// Recomputes `enrichment_score` and `insights` from the raw signals.
pub fn apply(signals: &mut EnrichmentSignals) {
    let github = signals.github.as_ref().map(analyze_github);
    let social = analyze_social(signals.social.as_ref(), &signals.websites);

    signals.enrichment_score = enrichment_score(github.as_ref(), &social);
    signals.insights = github
        .map(|g| g.insights)
        .unwrap_or_default()
        .into_iter()
        .chain(social.insights)
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn github() -> GithubSignals {
        GithubSignals {
            username: "sarahjohnson".to_string(),
            repos_count: 15,
            followers: 45,
            top_languages: vec!["Python".into(), "JavaScript".into(), "Go".into()],
        }
    }

    fn social() -> SocialSignals {
        SocialSignals {
            handle: "@sarahjohnson".to_string(),
            followers: 1200,
            posts_count: 850,
            topics: vec!["AI".into(), "Machine Learning".into(), "Tech".into()],
        }
    }

    fn websites() -> Vec<Website> {
        vec![
            Website {
                url: "https://sarahjohnson.com".to_string(),
                description: "Personal blog about software engineering and AI".to_string(),
            },
            Website {
                url: "https://medium.com/@sarahjohnson".to_string(),
                description: "Technical articles and tutorials".to_string(),
            },
        ]
    }

    #[test]
    fn test_github_bands() {
        let analysis = analyze_github(&github());
        assert_eq!(analysis.activity, 7.0);
        assert_eq!(analysis.community_engagement, 5.0);
        assert_eq!(analysis.technical_expertise, 6.0);
        assert!((analysis.overall - 4.3).abs() < 1e-9);
        assert_eq!(analysis.insights.len(), 3);
    }

    #[test]
    fn test_github_language_score_caps_at_ten() {
        let mut signals = github();
        signals.top_languages = (0..8).map(|i| format!("lang{i}")).collect();
        assert_eq!(analyze_github(&signals).technical_expertise, 10.0);
    }

    #[test]
    fn test_inactive_github_gets_floor_bands() {
        let analysis = analyze_github(&GithubSignals::default());
        assert_eq!(analysis.activity, 3.0);
        assert_eq!(analysis.community_engagement, 3.0);
        assert_eq!(analysis.technical_expertise, 0.0);
    }

    #[test]
    fn test_social_analysis() {
        let analysis = analyze_social(Some(&social()), &websites());
        assert_eq!(analysis.professional_presence, 8.0);
        assert_eq!(analysis.industry_engagement, 6.0);
        assert_eq!(analysis.content_quality, 6.0);
        assert_eq!(analysis.thought_leadership, 8.0);
        assert!((analysis.overall - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_short_keywords_need_whole_words() {
        assert!(!is_technical("I maintain a gardening diary"));
        assert!(is_technical("Notes on ML systems"));
        assert!(is_technical("Technology essays"));
    }

    #[test]
    fn test_nothing_found_scores_zero() {
        let social = analyze_social(None, &[]);
        assert_eq!(social.overall, 0.0);
        assert_eq!(enrichment_score(None, &social), 0.0);
    }

    #[test]
    fn test_apply_combines_sources() {
        let mut signals = EnrichmentSignals {
            github: Some(github()),
            social: Some(social()),
            websites: websites(),
            ..Default::default()
        };
        apply(&mut signals);
        // 4.3 × 0.7 + 7.0 × 0.3
        assert_eq!(signals.enrichment_score, 5.11);
        assert!(signals
            .insights
            .iter()
            .any(|i| i == "Shares technical knowledge and insights"));
    }
}
