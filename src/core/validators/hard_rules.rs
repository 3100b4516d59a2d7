//! Deterministic acceptance gate
//!
//! Three ordered checks, short-circuiting on the first failure: numeric and
//! date preservation, critical-token preservation, and a coarse vocabulary
//! novelty bound. Pure function of its inputs.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static NUMERIC_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\d+[.,]\d+",                       // decimals
        r"\d+\s*%",                          // percentages
        r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b", // dates
        r"\b\d+\b",                          // bare integers
    ]
    .iter()
    .map(|p| Regex::new(p).expect("numeric preservation regex should compile"))
    .collect()
});

/// Words stripped before the novelty comparison: articles, prepositions,
/// conjunctions, copulas.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "of", "to", "in", "on", "at", "with", "without", "by", "for", "from", "and",
    "or", "but", "that", "is", "are", "was", "were", "be", "been", "being", "as", "it", "its",
];

/// Share of brand-new substantial words above which a candidate is rejected
const MAX_NEW_WORD_RATIO: f64 = 0.4;

/// Hard-rules validator
#[derive(Debug, Clone, Copy, Default)]
pub struct HardRulesValidator;

impl HardRulesValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a rewrite candidate against the deterministic rules.
    ///
    /// Returns `Err` with a human-readable reason on the first rule that
    /// fails.
    pub fn validate(
        &self,
        original: &str,
        candidate: &str,
        critical_tokens: &[String],
    ) -> Result<(), String> {
        if !check_numeric_preservation(original, candidate) {
            return Err("Numbers, dates or percentages were not preserved".to_string());
        }

        if let Some(missing) = first_missing_token(candidate, critical_tokens) {
            return Err(format!("Critical token not preserved: {missing}"));
        }

        if !check_no_new_facts(original, candidate) {
            return Err("Candidate introduces too much new vocabulary".to_string());
        }

        Ok(())
    }
}

/// Every numeric/date/percentage match of the original must also match in
/// the candidate. Set semantics: order and duplication are ignored, and new
/// numbers in the candidate are allowed.
fn check_numeric_preservation(original: &str, candidate: &str) -> bool {
    for pattern in NUMERIC_PATTERNS.iter() {
        let original_matches: HashSet<&str> =
            pattern.find_iter(original).map(|m| m.as_str()).collect();
        let candidate_matches: HashSet<&str> =
            pattern.find_iter(candidate).map(|m| m.as_str()).collect();

        if !original_matches.is_subset(&candidate_matches) {
            return false;
        }
    }
    true
}

/// Simple substring containment for each critical token
fn first_missing_token<'a>(candidate: &str, critical_tokens: &'a [String]) -> Option<&'a str> {
    critical_tokens
        .iter()
        .find(|token| !candidate.contains(token.as_str()))
        .map(String::as_str)
}

/// Coarse novelty bound: lowercase both texts, drop stop words, and reject
/// when the candidate's new-word set exceeds 40% of the original's
/// vocabulary. Bounds drift, does not judge meaning.
fn check_no_new_facts(original: &str, candidate: &str) -> bool {
    let substantial = |text: &str| -> HashSet<String> {
        text.split_whitespace()
            .map(|w| w.to_lowercase())
            .filter(|w| !STOP_WORDS.contains(&w.as_str()))
            .collect()
    };

    let original_words = substantial(original);
    let candidate_words = substantial(candidate);

    let new_words = candidate_words.difference(&original_words).count();
    (new_words as f64) <= (original_words.len() as f64) * MAX_NEW_WORD_RATIO
}
