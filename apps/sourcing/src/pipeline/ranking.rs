use crate::models::ScoredCandidate;

/// Keeps candidates scoring at or above `threshold`. `None` keeps everyone.
pub fn apply_threshold(candidates: Vec<ScoredCandidate>, threshold: Option<f64>) -> Vec<ScoredCandidate> {
    match threshold {
        Some(min) => candidates
            .into_iter()
            .filter(|c| c.fit_score >= min)
            .collect(),
        None => candidates,
    }
}

/// Sorts best-first, truncates to `top_n`, and assigns 1-based ranks.
/// Ties keep their input order.
pub fn order_and_truncate(mut candidates: Vec<ScoredCandidate>, top_n: usize) -> Vec<ScoredCandidate> {
    candidates.sort_by(|a, b| b.fit_score.total_cmp(&a.fit_score));
    candidates.truncate(top_n);
    for (i, candidate) in candidates.iter_mut().enumerate() {
        candidate.rank = i + 1;
    }
    candidates
}
