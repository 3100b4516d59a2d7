//! Deterministic word counting
//!
//! One consistent definition of "word" for the whole pipeline: tokens
//! separated by whitespace runs, punctuation left attached. Also extracts
//! the critical tokens (numbers, percentages, dates, acronyms) that a
//! rewrite must carry over verbatim.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;

static DECIMAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+[.,]\d+").expect("DECIMAL_RE regex should compile"));

static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\s*%").expect("PERCENT_RE regex should compile"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\b").expect("DATE_RE regex should compile")
});

static ACRONYM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z]{2,}\b").expect("ACRONYM_RE regex should compile"));

/// Word counter with a fixed whitespace strategy
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCounter;

impl WordCounter {
    pub fn new() -> Self {
        Self
    }

    /// Count words in a text.
    ///
    /// Words are whitespace-delimited tokens; punctuation attached to a
    /// token counts as part of it. Empty or whitespace-only text yields 0.
    pub fn count(&self, text: &str) -> u32 {
        text.split_whitespace().count() as u32
    }

    /// Extract critical tokens that must survive a rewrite verbatim.
    ///
    /// Matches decimal numbers, percentages, day/month/year dates and
    /// all-caps acronyms. Duplicates collapse and the result is returned in
    /// deterministic ascending order.
    pub fn extract_critical_tokens(&self, text: &str) -> Vec<String> {
        let mut tokens = BTreeSet::new();
        for pattern in [&*DECIMAL_RE, &*PERCENT_RE, &*DATE_RE, &*ACRONYM_RE] {
            for m in pattern.find_iter(text) {
                tokens.insert(m.as_str().to_string());
            }
        }
        tokens.into_iter().collect()
    }

    /// Byte offsets `(start, end)` of each whitespace-delimited word.
    ///
    /// Each word is located by scanning forward from the end of the previous
    /// match, so repeated identical words resolve to their next unconsumed
    /// occurrence rather than always the first.
    pub fn word_boundaries(&self, text: &str) -> Vec<(usize, usize)> {
        let mut boundaries = Vec::new();
        let mut current_pos = 0;

        for word in text.split_whitespace() {
            if let Some(offset) = text[current_pos..].find(word) {
                let start = current_pos + offset;
                let end = start + word.len();
                boundaries.push((start, end));
                current_pos = end;
            }
        }

        boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_basic() {
        let counter = WordCounter::new();
        assert_eq!(counter.count("one two three"), 3);
        assert_eq!(counter.count("  spaced   out   words  "), 3);
    }

    #[test]
    fn test_count_empty_and_whitespace() {
        let counter = WordCounter::new();
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("   \t\n  "), 0);
    }

    #[test]
    fn test_count_keeps_punctuation_attached() {
        let counter = WordCounter::new();
        // "word," is one token, not two
        assert_eq!(counter.count("Hello, world! How are you?"), 5);
    }

    #[test]
    fn test_extract_critical_tokens() {
        let counter = WordCounter::new();
        let tokens =
            counter.extract_critical_tokens("The USA reported 3.14 growth, 25% on 01/02/2024");

        assert!(tokens.contains(&"USA".to_string()));
        assert!(tokens.contains(&"3.14".to_string()));
        assert!(tokens.contains(&"25%".to_string()));
        assert!(tokens.contains(&"01/02/2024".to_string()));
    }

    #[test]
    fn test_extract_critical_tokens_deduplicates() {
        let counter = WordCounter::new();
        let tokens = counter.extract_critical_tokens("NASA and NASA again");
        assert_eq!(tokens, vec!["NASA".to_string()]);
    }

    #[test]
    fn test_extract_critical_tokens_spaced_percent() {
        let counter = WordCounter::new();
        let tokens = counter.extract_critical_tokens("a rise of 50 %");
        assert!(tokens.contains(&"50 %".to_string()));
    }

    #[test]
    fn test_word_boundaries() {
        let counter = WordCounter::new();
        let text = "ab cd ef";
        assert_eq!(counter.word_boundaries(text), vec![(0, 2), (3, 5), (6, 8)]);
    }

    #[test]
    fn test_word_boundaries_repeated_words_advance() {
        let counter = WordCounter::new();
        let text = "go go go";
        // Each occurrence resolves to the next unconsumed position
        assert_eq!(counter.word_boundaries(text), vec![(0, 2), (3, 5), (6, 8)]);
    }
}
