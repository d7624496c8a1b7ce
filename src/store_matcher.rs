//! Fuzzy store-name resolution against the dataset roster.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

use crate::dataset::canonical;

/// Resolves free-text store mentions against the known store roster using a
/// token-set similarity score (0-100). Word order and duplicate tokens are
/// ignored; shared tokens dominate the score.
pub struct StoreMatcher {
    /// Minimum score (0-100) for the best roster match to be accepted.
    pub score_threshold: u32,
}

impl Default for StoreMatcher {
    fn default() -> Self {
        Self { score_threshold: 80 }
    }
}

impl StoreMatcher {
    pub fn new(score_threshold: u32) -> Self {
        Self { score_threshold }
    }

    /// Resolve each candidate to its best roster match.
    ///
    /// A candidate whose best score falls below the threshold is dropped
    /// silently. Output preserves candidate order and keeps duplicates, so
    /// two mentions of the same store both show up; callers filtering a
    /// dataset must use set membership over this list.
    pub fn resolve(&self, candidates: &[String], roster: &[String]) -> Vec<String> {
        if candidates.is_empty() {
            return Vec::new();
        }
        let roster: Vec<String> = roster.iter().map(|s| canonical(s)).collect();
        let mut matched = Vec::new();
        for candidate in candidates {
            let candidate = canonical(candidate);
            if let Some((store, score)) = best_match(&candidate, &roster) {
                if score >= self.score_threshold {
                    matched.push(store);
                }
            }
        }
        matched
    }
}

fn best_match(candidate: &str, roster: &[String]) -> Option<(String, u32)> {
    let mut best: Option<(String, u32)> = None;
    for store in roster {
        let score = token_set_ratio(candidate, store);
        let better = match &best {
            Some((_, best_score)) => score > *best_score,
            None => true,
        };
        if better {
            best = Some((store.clone(), score));
        }
    }
    best
}

/// Token-set similarity on a 0-100 scale.
///
/// Both strings are reduced to sorted unique token sets; the score is the
/// best similarity ratio among the shared-token string and the two
/// shared-plus-remainder strings. Equal token sets score 100 regardless of
/// word order or token repetition.
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let shared = tokens_a
        .intersection(&tokens_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let only_a = tokens_a
        .difference(&tokens_b)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    let only_b = tokens_b
        .difference(&tokens_a)
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    let shared_a = concat_tokens(&shared, &only_a);
    let shared_b = concat_tokens(&shared, &only_b);

    ratio(&shared, &shared_a)
        .max(ratio(&shared, &shared_b))
        .max(ratio(&shared_a, &shared_b))
}

fn concat_tokens(head: &str, tail: &str) -> String {
    if head.is_empty() {
        tail.to_string()
    } else if tail.is_empty() {
        head.to_string()
    } else {
        format!("{} {}", head, tail)
    }
}

fn ratio(a: &str, b: &str) -> u32 {
    (normalized_levenshtein(a, b) * 100.0).round() as u32
}
