//! Rewrite orchestrator
//!
//! The retry-and-validation state machine. Drives up to `max_attempts`
//! rewrite calls, gates in-range candidates through the hard rules and the
//! semantic validator, tracks a fallback candidate, and aggregates usage
//! across attempts. Every path returns a well-formed result; no error
//! escapes this boundary.

use crate::core::provider::{RewriteCall, RewriteProvider};
use crate::core::validators::{HardRulesValidator, SemanticValidator};
use crate::core::word_counter::WordCounter;
use crate::models::rewrite::{
    AttemptRecord, AttemptStatus, Mode, RewriteRequest, RewriteResult, RunStatus, UsageMetrics,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Similarity thresholds per mode
#[derive(Debug, Clone, Copy)]
pub struct ModeThresholds {
    pub strict: f64,
    pub balanced: f64,
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self { strict: 0.85, balanced: 0.75 }
    }
}

impl ModeThresholds {
    fn for_mode(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Strict => self.strict,
            Mode::Balanced => self.balanced,
        }
    }
}

/// Orchestrator over a rewriting collaborator and the two acceptance gates
pub struct RewriteOrchestrator {
    word_counter: WordCounter,
    rewriter: Arc<dyn RewriteProvider>,
    hard_rules: HardRulesValidator,
    semantic: SemanticValidator,
    thresholds: ModeThresholds,
}

impl RewriteOrchestrator {
    pub fn new(rewriter: Arc<dyn RewriteProvider>, semantic: SemanticValidator) -> Self {
        Self {
            word_counter: WordCounter::new(),
            rewriter,
            hard_rules: HardRulesValidator::new(),
            semantic,
            thresholds: ModeThresholds::default(),
        }
    }

    /// Override the mode thresholds (fluent builder pattern)
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: ModeThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Run the full rewrite flow for one request.
    ///
    /// Attempts execute strictly sequentially: each attempt's guidance
    /// depends on the previous outcome.
    pub async fn orchestrate(&self, request: &RewriteRequest) -> RewriteResult {
        let session = request.session_id.clone().unwrap_or_else(|| "unknown".to_string());
        info!(
            session = %session,
            min = request.min_words,
            max = request.max_words,
            "Starting rewrite"
        );

        if let Err(reason) = validate_request(request) {
            warn!(session = %session, "Invalid request: {}", reason);
            return RewriteResult {
                original_text: request.input_text.clone(),
                original_word_count: 0,
                final_text: String::new(),
                final_word_count: 0,
                status: RunStatus::Error,
                total_attempts: 0,
                attempts: Vec::new(),
                validation_reason: String::new(),
                target_words: None,
                mode: request.mode,
                session_id: request.session_id.clone(),
                usage: None,
                error: Some(format!("Invalid request: {reason}")),
            };
        }

        let original_count = self.word_counter.count(&request.input_text);
        debug!(session = %session, "Original count: {} words", original_count);

        // Already within range: nothing to rewrite
        if (request.min_words..=request.max_words).contains(&original_count) {
            info!(session = %session, "Text already within range");
            return RewriteResult {
                original_text: request.input_text.clone(),
                original_word_count: original_count,
                final_text: request.input_text.clone(),
                final_word_count: original_count,
                status: RunStatus::Accepted,
                total_attempts: 0,
                attempts: Vec::new(),
                validation_reason: "Already within the requested range".to_string(),
                target_words: None,
                mode: request.mode,
                session_id: request.session_id.clone(),
                usage: None,
                error: None,
            };
        }

        // Extracted once; sent to the provider on attempt 1 only
        let critical_tokens = self.word_counter.extract_critical_tokens(&request.input_text);
        debug!(session = %session, "Critical tokens: {:?}", critical_tokens);

        // Computed once, never recomputed mid-run
        let target_words = target_words(original_count, request.min_words, request.max_words);
        let threshold = self.thresholds.for_mode(request.mode);

        let mut attempts: Vec<AttemptRecord> = Vec::new();
        let mut best_candidate: Option<String> = None;
        let mut best_similarity = -1.0_f64;

        for attempt_number in 1..=request.max_attempts {
            debug!(session = %session, "Attempt {}/{}", attempt_number, request.max_attempts);

            // Directional guidance from the current fallback candidate
            let delta_feedback = match (&best_candidate, attempt_number) {
                (Some(candidate), n) if n > 1 => {
                    Some(i64::from(self.word_counter.count(candidate)) - i64::from(target_words))
                }
                _ => None,
            };

            let call = RewriteCall {
                text: &request.input_text,
                min_words: request.min_words,
                max_words: request.max_words,
                target_words,
                mode: request.mode,
                model: &request.model,
                delta: delta_feedback,
                critical_tokens: (attempt_number == 1).then_some(critical_tokens.as_slice()),
                attempt_number,
            };

            let output = match self.rewriter.rewrite(&call).await {
                Ok(output) => output,
                Err(e) => {
                    warn!(session = %session, "Rewrite call failed: {}", e);
                    attempts.push(AttemptRecord {
                        attempt_number,
                        proposed_text: String::new(),
                        word_count: 0,
                        status: AttemptStatus::OutOfRange,
                        delta: 0,
                        similarity_score: None,
                        hard_rules_passed: true,
                        error_message: Some(e.to_string()),
                        usage: None,
                    });
                    // Failed calls never become the fallback
                    continue;
                }
            };

            let proposed_count = self.word_counter.count(&output.text);
            let delta = i64::from(proposed_count) - i64::from(target_words);
            debug!(session = %session, "Proposal: {} words (delta {})", proposed_count, delta);

            // Scored eagerly so the record carries a similarity even for
            // out-of-range candidates
            let verdict = self.semantic.validate(&request.input_text, &output.text, threshold).await;

            let in_range = (request.min_words..=request.max_words).contains(&proposed_count);
            if !in_range {
                attempts.push(AttemptRecord {
                    attempt_number,
                    proposed_text: output.text.clone(),
                    word_count: proposed_count,
                    status: AttemptStatus::OutOfRange,
                    delta,
                    similarity_score: Some(verdict.similarity),
                    hard_rules_passed: true,
                    error_message: None,
                    usage: output.usage,
                });
                // Latest out-of-range attempt wins the fallback slot
                best_candidate = Some(output.text);
                continue;
            }

            if let Err(reason) =
                self.hard_rules.validate(&request.input_text, &output.text, &critical_tokens)
            {
                debug!(session = %session, "Hard rules rejected: {}", reason);
                attempts.push(AttemptRecord {
                    attempt_number,
                    proposed_text: output.text.clone(),
                    word_count: proposed_count,
                    status: AttemptStatus::RejectedByHardRules,
                    delta,
                    similarity_score: Some(verdict.similarity),
                    hard_rules_passed: false,
                    error_message: Some(reason),
                    usage: output.usage,
                });
                // Same most-recent policy as out-of-range
                best_candidate = Some(output.text);
                continue;
            }

            if !verdict.passed {
                debug!(
                    session = %session,
                    "Semantic gate rejected: similarity {:.3}", verdict.similarity
                );
                attempts.push(AttemptRecord {
                    attempt_number,
                    proposed_text: output.text.clone(),
                    word_count: proposed_count,
                    status: AttemptStatus::RejectedBySemanticSimilarity,
                    delta,
                    similarity_score: Some(verdict.similarity),
                    hard_rules_passed: true,
                    error_message: verdict.reason,
                    usage: output.usage,
                });
                // Semantic near-misses are ranked by similarity, unlike the
                // recency policy above
                if verdict.similarity > best_similarity {
                    best_similarity = verdict.similarity;
                    best_candidate = Some(output.text);
                }
                continue;
            }

            // Both gates passed
            attempts.push(AttemptRecord {
                attempt_number,
                proposed_text: output.text.clone(),
                word_count: proposed_count,
                status: AttemptStatus::Accepted,
                delta,
                similarity_score: Some(verdict.similarity),
                hard_rules_passed: true,
                error_message: None,
                usage: output.usage,
            });
            info!(session = %session, "Accepted on attempt {}", attempt_number);

            let usage = UsageMetrics::aggregate(&attempts);
            return RewriteResult {
                original_text: request.input_text.clone(),
                original_word_count: original_count,
                final_text: output.text,
                final_word_count: proposed_count,
                status: RunStatus::Accepted,
                total_attempts: attempt_number,
                attempts,
                validation_reason: "Passed all validations".to_string(),
                target_words: Some(target_words),
                mode: request.mode,
                session_id: request.session_id.clone(),
                usage,
                error: None,
            };
        }

        info!(
            session = %session,
            "No acceptance within {} attempts", request.max_attempts
        );
        let usage = UsageMetrics::aggregate(&attempts);

        match best_candidate {
            Some(candidate) => {
                let final_count = self.word_counter.count(&candidate);
                RewriteResult {
                    original_text: request.input_text.clone(),
                    original_word_count: original_count,
                    final_text: candidate,
                    final_word_count: final_count,
                    status: RunStatus::RejectedNoValidCandidate,
                    total_attempts: request.max_attempts,
                    attempts,
                    validation_reason: "No candidate passed validation within the attempt budget"
                        .to_string(),
                    target_words: Some(target_words),
                    mode: request.mode,
                    session_id: request.session_id.clone(),
                    usage,
                    error: Some("Returning best candidate by similarity".to_string()),
                }
            }
            None => RewriteResult {
                original_text: request.input_text.clone(),
                original_word_count: original_count,
                final_text: String::new(),
                final_word_count: 0,
                status: RunStatus::Error,
                total_attempts: request.max_attempts,
                attempts,
                validation_reason: String::new(),
                target_words: Some(target_words),
                mode: request.mode,
                session_id: request.session_id.clone(),
                usage,
                error: Some("No valid candidates could be generated".to_string()),
            },
        }
    }
}

/// Word-count target for the rewrite: the original count clamped to the
/// nearest range boundary, which minimizes the edit the provider has to make
pub fn target_words(original_count: u32, min_words: u32, max_words: u32) -> u32 {
    original_count.clamp(min_words, max_words)
}

/// Request sanity checks; the reason feeds the terminal error message
fn validate_request(request: &RewriteRequest) -> Result<(), String> {
    if request.input_text.is_empty() {
        return Err("input text is empty".to_string());
    }
    if request.min_words < 1 {
        return Err("min_words must be at least 1".to_string());
    }
    if request.max_words < request.min_words {
        return Err("max_words must be greater than or equal to min_words".to_string());
    }
    if request.max_attempts < 1 {
        return Err("max_attempts must be at least 1".to_string());
    }
    Ok(())
}
