//! Approximate title matching over the catalog key set.

use strsim::jaro_winkler;

/// Minimum Jaro-Winkler similarity for a key to count as a candidate.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Upper bound on candidates offered in one disambiguation prompt.
pub const MAX_CANDIDATES: usize = 3;

/// One ranked candidate key.
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    pub key: String,
    pub score: f64,
}

#[derive(Debug, Clone)]
pub struct FuzzyMatcher {
    threshold: f64,
    limit: usize,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            threshold: SIMILARITY_THRESHOLD,
            limit: MAX_CANDIDATES,
        }
    }
}

impl FuzzyMatcher {
    pub fn new(threshold: f64, limit: usize) -> Self {
        Self { threshold, limit }
    }

    /// Rank catalog keys by similarity to the normalized query: descending by
    /// score, truncated to the candidate limit, then filtered by threshold.
    ///
    /// Keys are sorted lexicographically before the stable score sort, so
    /// equal scores rank the same way regardless of backend iteration order.
    pub fn top_matches(&self, query: &str, keys: &[String]) -> Vec<FuzzyMatch> {
        let mut candidates: Vec<&String> = keys.iter().collect();
        candidates.sort();

        let mut hits: Vec<FuzzyMatch> = candidates
            .into_iter()
            .map(|key| FuzzyMatch {
                key: key.clone(),
                score: jaro_winkler(query, key),
            })
            .collect();

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(self.limit);
        hits.retain(|m| m.score >= self.threshold);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn exact_key_scores_one() {
        let matcher = FuzzyMatcher::default();
        let hits = matcher.top_matches("inception", &keys(&["inception", "interstellar"]));
        assert_eq!(hits[0].key, "inception");
        assert!((hits[0].score - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn near_miss_clears_the_threshold() {
        let matcher = FuzzyMatcher::default();
        let hits = matcher.top_matches("incepton", &keys(&["inception"]));
        assert_eq!(hits.len(), 1);
        assert!(hits[0].score >= SIMILARITY_THRESHOLD);
    }

    #[test]
    fn unrelated_keys_are_filtered_out() {
        let matcher = FuzzyMatcher::default();
        let hits = matcher.top_matches("zzzzqq", &keys(&["inception", "matrix"]));
        assert!(hits.is_empty());
    }

    #[test]
    fn empty_candidate_set_yields_empty_output() {
        let matcher = FuzzyMatcher::default();
        assert!(matcher.top_matches("inception", &[]).is_empty());
    }

    #[test]
    fn never_returns_more_than_the_limit() {
        let matcher = FuzzyMatcher::default();
        let hits = matcher.top_matches(
            "matrix",
            &keys(&["matrix", "matrix reloaded", "matrix revolutions", "matrix resurrections"]),
        );
        assert!(hits.len() <= MAX_CANDIDATES);
        assert_eq!(hits[0].key, "matrix");
    }

    #[test]
    fn tie_break_is_lexicographic() {
        let matcher = FuzzyMatcher::new(0.0, 3);
        let forward = matcher.top_matches("abc", &keys(&["b-title", "a-title"]));
        let reverse = matcher.top_matches("abc", &keys(&["a-title", "b-title"]));
        assert_eq!(forward, reverse);
    }
}
