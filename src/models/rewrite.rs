//! Rewrite pipeline data models
//!
//! Request, per-attempt record, usage metrics and final result structures
//! shared between the orchestrator core and the web layer

use serde::{Deserialize, Serialize};

/// Rewriting mode
///
/// Strict keeps the rewrite as literal as possible and raises the semantic
/// similarity bar; balanced allows more rephrasing freedom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Strict,
    #[default]
    Balanced,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Strict => write!(f, "strict"),
            Mode::Balanced => write!(f, "balanced"),
        }
    }
}

/// Outcome of a single rewrite attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttemptStatus {
    /// Candidate word count fell outside the requested range (also used
    /// for attempts where the rewrite call itself failed)
    OutOfRange,
    /// In range but failed the deterministic preservation checks
    RejectedByHardRules,
    /// In range, passed hard rules, but scored below the similarity threshold
    RejectedBySemanticSimilarity,
    /// Passed every gate
    Accepted,
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AttemptStatus::OutOfRange => "OUT_OF_RANGE",
            AttemptStatus::RejectedByHardRules => "REJECTED_BY_HARD_RULES",
            AttemptStatus::RejectedBySemanticSimilarity => "REJECTED_BY_SEMANTIC_SIMILARITY",
            AttemptStatus::Accepted => "ACCEPTED",
        };
        write!(f, "{name}")
    }
}

/// Terminal status of a whole orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Accepted,
    RejectedNoValidCandidate,
    Error,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunStatus::Accepted => "ACCEPTED",
            RunStatus::RejectedNoValidCandidate => "REJECTED_NO_VALID_CANDIDATE",
            RunStatus::Error => "ERROR",
        };
        write!(f, "{name}")
    }
}

/// Rewrite request handed to the orchestrator
///
/// Immutable once constructed; the web layer fills defaults from Settings
/// before building one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRequest {
    /// Text to rewrite
    pub input_text: String,
    /// Lower bound of the accepted word range (inclusive)
    pub min_words: u32,
    /// Upper bound of the accepted word range (inclusive)
    pub max_words: u32,
    /// Rewriting mode
    pub mode: Mode,
    /// Attempt budget, at least 1
    pub max_attempts: u32,
    /// Chat model to use for rewriting (request-scoped, never shared state)
    pub model: String,
    /// Opaque correlation id for logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Token usage and derived cost of one provider call
///
/// Absent usage means the provider never reported any, which is distinct
/// from a call that reported zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Model that produced the usage
    pub model: String,
    /// Prompt tokens billed at the input rate
    pub input_tokens: u64,
    /// Prompt tokens served from the provider cache
    pub cached_tokens: u64,
    /// Completion tokens
    pub output_tokens: u64,
    /// Cost in USD derived from the pricing catalog
    pub cost_usd: f64,
}

impl UsageMetrics {
    /// Sum usage across an attempt log.
    ///
    /// Returns `None` when no attempt carried usage (for example when the
    /// provider was never successfully invoked). The aggregate model id is
    /// the first non-empty model id seen in attempt order.
    pub fn aggregate(attempts: &[AttemptRecord]) -> Option<UsageMetrics> {
        let mut total: Option<UsageMetrics> = None;

        for usage in attempts.iter().filter_map(|a| a.usage.as_ref()) {
            let acc = total.get_or_insert_with(|| UsageMetrics {
                model: String::new(),
                input_tokens: 0,
                cached_tokens: 0,
                output_tokens: 0,
                cost_usd: 0.0,
            });
            if acc.model.is_empty() && !usage.model.is_empty() {
                acc.model = usage.model.clone();
            }
            acc.input_tokens += usage.input_tokens;
            acc.cached_tokens += usage.cached_tokens;
            acc.output_tokens += usage.output_tokens;
            acc.cost_usd += usage.cost_usd;
        }

        total
    }
}

/// Record of one rewrite attempt, appended to the run's ordered log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// 1-based attempt index, contiguous across the log
    pub attempt_number: u32,
    /// Candidate text produced by the provider (empty when the call failed)
    pub proposed_text: String,
    /// Word count of the candidate
    pub word_count: u32,
    /// Attempt outcome
    pub status: AttemptStatus,
    /// Signed word-count distance from the target, 0 when unknown
    #[serde(default)]
    pub delta: i64,
    /// Cosine similarity against the original, when it was scored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    /// Whether the hard-rules gate passed (true when it never ran)
    #[serde(default = "default_true")]
    pub hard_rules_passed: bool,
    /// Failure detail for rejected or errored attempts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Usage reported by the rewrite call, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetrics>,
}

fn default_true() -> bool {
    true
}

/// Final outcome of an orchestration run
///
/// Created once per call and never mutated after return. A terminal result
/// either carries a non-empty `final_text` or has status `Error` with an
/// empty one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResult {
    pub original_text: String,
    pub original_word_count: u32,
    pub final_text: String,
    pub final_word_count: u32,
    pub status: RunStatus,
    pub total_attempts: u32,
    #[serde(default)]
    pub attempts: Vec<AttemptRecord>,
    /// Human-readable explanation of the terminal status
    #[serde(default)]
    pub validation_reason: String,
    /// Word-count target the provider was steered toward
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_words: Option<u32>,
    pub mode: Mode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Usage summed over every attempt that reported it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
