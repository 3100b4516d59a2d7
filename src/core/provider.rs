//! Collaborator seams of the rewrite pipeline
//!
//! The orchestrator only ever talks to the generative service through these
//! two traits, which keeps the state machine testable with scripted
//! providers and keeps model selection request-scoped.

use crate::models::rewrite::{Mode, UsageMetrics};
use async_trait::async_trait;
use thiserror::Error;

/// Failure of a provider call
#[derive(Error, Debug)]
pub enum ProviderError {
    /// No credentials configured
    #[error("API key is not configured")]
    MissingApiKey,

    /// Transport-level failure
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with an error payload
    #[error("provider returned an error: {0}")]
    Api(String),

    /// The provider answered 2xx with a body we cannot use
    #[error("malformed provider response: {0}")]
    InvalidResponse(String),
}

/// One rewrite invocation
///
/// Everything the generative service needs is carried per call; in
/// particular the model id, so a shared client handle never holds mutable
/// per-request state.
#[derive(Debug, Clone)]
pub struct RewriteCall<'a> {
    /// Original text to rewrite
    pub text: &'a str,
    pub min_words: u32,
    pub max_words: u32,
    /// Word count the rewrite should aim for
    pub target_words: u32,
    pub mode: Mode,
    /// Chat model id for this call
    pub model: &'a str,
    /// Signed word-count miss of the previous best candidate, when known
    pub delta: Option<i64>,
    /// Tokens to preserve verbatim; only sent on the first attempt
    pub critical_tokens: Option<&'a [String]>,
    /// 1-based attempt index
    pub attempt_number: u32,
}

/// Text plus the usage its generation reported
#[derive(Debug, Clone)]
pub struct RewriteOutput {
    pub text: String,
    pub usage: Option<UsageMetrics>,
}

/// Embedding vector plus the usage its computation reported
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub vector: Vec<f32>,
    pub usage: Option<UsageMetrics>,
}

/// Generative rewriting collaborator
#[async_trait]
pub trait RewriteProvider: Send + Sync {
    async fn rewrite(&self, call: &RewriteCall<'_>) -> Result<RewriteOutput, ProviderError>;
}

/// Embedding collaborator used by the semantic validator
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<EmbeddingOutput, ProviderError>;
}
