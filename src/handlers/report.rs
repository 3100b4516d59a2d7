//! Result presentation
//!
//! Shapes a rewrite result for the JSON API and renders the plain-text
//! report served by the download endpoint

use crate::models::rewrite::{AttemptRecord, RewriteResult, RunStatus, UsageMetrics};
use serde::{Deserialize, Serialize};

/// JSON payload returned by the rewrite endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct WebResult {
    /// True when the run terminated with ACCEPTED
    pub success: bool,
    pub original_text: String,
    pub original_word_count: u32,
    pub final_text: String,
    pub final_word_count: u32,
    pub status: RunStatus,
    pub total_attempts: u32,
    pub validation_reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_words: Option<u32>,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageMetrics>,
    pub attempts: Vec<WebAttempt>,
    /// Human-readable outcome paragraph
    pub summary: String,
}

/// One attempt as shown to the caller
#[derive(Debug, Serialize, Deserialize)]
pub struct WebAttempt {
    pub attempt_number: u32,
    pub proposed_text: String,
    pub word_count: u32,
    pub status: String,
    pub delta: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    pub hard_rules_passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl WebResult {
    /// Shape a result for the JSON API
    pub fn from_result(result: &RewriteResult) -> Self {
        Self {
            success: result.status == RunStatus::Accepted,
            original_text: result.original_text.clone(),
            original_word_count: result.original_word_count,
            final_text: result.final_text.clone(),
            final_word_count: result.final_word_count,
            status: result.status,
            total_attempts: result.total_attempts,
            validation_reason: result.validation_reason.clone(),
            target_words: result.target_words,
            mode: result.mode.to_string(),
            error: result.error.clone(),
            usage: result.usage.clone(),
            attempts: result.attempts.iter().map(web_attempt).collect(),
            summary: summary(result),
        }
    }
}

fn web_attempt(attempt: &AttemptRecord) -> WebAttempt {
    WebAttempt {
        attempt_number: attempt.attempt_number,
        proposed_text: attempt.proposed_text.clone(),
        word_count: attempt.word_count,
        status: attempt.status.to_string(),
        delta: attempt.delta,
        similarity_score: attempt.similarity_score.map(round3),
        hard_rules_passed: attempt.hard_rules_passed,
        error_message: attempt.error_message.clone(),
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Outcome paragraph shown alongside the structured fields
fn summary(result: &RewriteResult) -> String {
    match result.status {
        RunStatus::Accepted => format!(
            "Success in {} attempt(s). Words: {} -> {}. Validation: {}",
            result.total_attempts,
            result.original_word_count,
            result.final_word_count,
            result.validation_reason
        ),
        RunStatus::RejectedNoValidCandidate => format!(
            "No acceptance within {} attempt(s). Returning the best candidate by semantic \
             similarity. Candidate words: {}",
            result.total_attempts, result.final_word_count
        ),
        RunStatus::Error => {
            format!("ERROR: {}", result.error.as_deref().unwrap_or("unknown error"))
        }
    }
}

/// Render the plain-text report served by the download endpoint
pub fn render_report(result: &RewriteResult) -> String {
    let mut output = format!(
        "REWRITE REPORT\n\
         ==============\n\n\
         ORIGINAL TEXT ({} words):\n{}\n\n\
         FINAL TEXT ({} words):\n{}\n\n\
         METRICS:\n\
         - Total attempts: {}\n\
         - Target words: {}\n\
         - Mode: {}\n\
         - Status: {}\n\
         - Validation reason: {}\n",
        result.original_word_count,
        result.original_text,
        result.final_word_count,
        result.final_text,
        result.total_attempts,
        result.target_words.map_or_else(|| "N/A".to_string(), |t| t.to_string()),
        result.mode,
        result.status,
        result.validation_reason,
    );

    if let Some(usage) = &result.usage {
        output.push_str(&format!(
            "- Usage: {} input / {} cached / {} output tokens, ${:.6} ({})\n",
            usage.input_tokens, usage.cached_tokens, usage.output_tokens, usage.cost_usd,
            usage.model
        ));
    }

    output.push_str("\nATTEMPT DETAILS:\n");
    for attempt in &result.attempts {
        output.push_str(&format!("\n  Attempt {}:\n", attempt.attempt_number));
        output.push_str(&format!("    - Words: {}\n", attempt.word_count));
        output.push_str(&format!("    - Status: {}\n", attempt.status));
        if attempt.delta != 0 {
            output.push_str(&format!("    - Delta: {}\n", attempt.delta));
        }
        if let Some(similarity) = attempt.similarity_score {
            output.push_str(&format!("    - Similarity: {:.3}\n", similarity));
        }
        if let Some(message) = &attempt.error_message {
            output.push_str(&format!("    - Error: {}\n", message));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::rewrite::{AttemptStatus, Mode};

    fn accepted_result() -> RewriteResult {
        RewriteResult {
            original_text: "one two three".to_string(),
            original_word_count: 3,
            final_text: "one two three four five six".to_string(),
            final_word_count: 6,
            status: RunStatus::Accepted,
            total_attempts: 2,
            attempts: vec![AttemptRecord {
                attempt_number: 1,
                proposed_text: "way too long".to_string(),
                word_count: 20,
                status: AttemptStatus::OutOfRange,
                delta: 14,
                similarity_score: Some(0.81234),
                hard_rules_passed: true,
                error_message: None,
                usage: None,
            }],
            validation_reason: "Passed all validations".to_string(),
            target_words: Some(6),
            mode: Mode::Balanced,
            session_id: Some("abc12345".to_string()),
            usage: None,
            error: None,
        }
    }

    #[test]
    fn test_web_result_success_flag_and_rounding() {
        let web = WebResult::from_result(&accepted_result());
        assert!(web.success);
        assert_eq!(web.attempts[0].similarity_score, Some(0.812));
        assert_eq!(web.attempts[0].status, "OUT_OF_RANGE");
        assert!(web.summary.contains("Success in 2 attempt(s)"));
    }

    #[test]
    fn test_error_summary() {
        let mut result = accepted_result();
        result.status = RunStatus::Error;
        result.error = Some("No valid candidates could be generated".to_string());

        let web = WebResult::from_result(&result);
        assert!(!web.success);
        assert!(web.summary.starts_with("ERROR:"));
    }

    #[test]
    fn test_render_report_sections() {
        let report = render_report(&accepted_result());
        assert!(report.contains("REWRITE REPORT"));
        assert!(report.contains("ORIGINAL TEXT (3 words):"));
        assert!(report.contains("FINAL TEXT (6 words):"));
        assert!(report.contains("Attempt 1:"));
        assert!(report.contains("- Delta: 14"));
        assert!(report.contains("- Similarity: 0.812"));
    }

    #[test]
    fn test_render_report_skips_zero_delta() {
        let mut result = accepted_result();
        result.attempts[0].delta = 0;
        let report = render_report(&result);
        assert!(!report.contains("- Delta:"));
    }
}
