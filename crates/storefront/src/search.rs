//! Fuzzy product search.
//!
//! Scoring is deliberately simple and runs on every keystroke:
//!
//! | Match | Score |
//! |-------|-------|
//! | name equals query (ignoring case) | 1.0 |
//! | name contains query | 0.8 |
//! | otherwise | matched query chars / query length |
//!
//! The last rule is a single greedy left-to-right scan of the name, not a
//! longest-common-subsequence, so a scattered subsequence can outscore a
//! substring hit (`"pizza"` scores 1.0 for `"pa"`, `"pasta"` 0.8).

use tiffin_core::Product;

/// Score for a case-insensitive exact match.
pub const EXACT_MATCH: f64 = 1.0;

/// Score when the candidate contains the query.
pub const SUBSTRING_MATCH: f64 = 0.8;

/// A normalized, non-blank search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Trim and lower-case raw input.
    ///
    /// Returns `None` for blank input, which callers treat as "no filtering".
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let query = raw.trim();
        if query.is_empty() {
            None
        } else {
            Some(Self(query.to_lowercase()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Similarity of `candidate` to `query`, in `[0, 1]`.
///
/// An empty query is contained in every non-empty candidate, so it scores
/// 0.8 (or 1.0 against an empty candidate) and the ratio branch never sees a
/// zero-length query.
#[must_use]
#[allow(clippy::cast_precision_loss)] // Product names are short
pub fn score(candidate: &str, query: &str) -> f64 {
    let candidate = candidate.to_lowercase();
    let query = query.to_lowercase();

    if candidate == query {
        return EXACT_MATCH;
    }
    if candidate.contains(&query) {
        return SUBSTRING_MATCH;
    }

    let query: Vec<char> = query.chars().collect();
    let mut matched = 0usize;
    for c in candidate.chars() {
        match query.get(matched) {
            Some(&wanted) if wanted == c => matched += 1,
            Some(_) => {}
            None => break,
        }
    }

    matched as f64 / query.len() as f64
}

/// Products whose name scores above zero, best first.
///
/// Equal scores keep their catalog order.
#[must_use]
pub fn rank_and_filter<'a>(products: &'a [Product], query: &str) -> Vec<&'a Product> {
    let mut scored: Vec<(&Product, f64)> = products
        .iter()
        .map(|p| (p, score(&p.name, query)))
        .filter(|&(_, s)| s > 0.0)
        .collect();

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.into_iter().map(|(p, _)| p).collect()
}

/// Names of the ranked matches, for the suggestion dropdown.
#[must_use]
pub fn suggestions<'a>(products: &'a [Product], query: &str) -> Vec<&'a str> {
    rank_and_filter(products, query)
        .into_iter()
        .map(|p| p.name.as_str())
        .collect()
}
