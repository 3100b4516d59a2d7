//! Semantic similarity gate
//!
//! Scores meaning preservation as the cosine similarity between the
//! embedding vectors of the original and the candidate. Gating is optional:
//! without an embedding collaborator the gate always passes, and an
//! embedding failure follows the configured fail-open/fail-closed policy.

use crate::core::provider::EmbeddingProvider;
use std::sync::Arc;
use tracing::warn;

/// Verdict of one semantic validation
#[derive(Debug, Clone)]
pub struct SemanticVerdict {
    pub passed: bool,
    pub similarity: f64,
    /// Reason when the gate failed (or would have failed open)
    pub reason: Option<String>,
}

/// Semantic validator over an optional embedding collaborator
#[derive(Clone)]
pub struct SemanticValidator {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    fail_open: bool,
}

impl SemanticValidator {
    pub fn new(embedder: Option<Arc<dyn EmbeddingProvider>>, fail_open: bool) -> Self {
        Self { embedder, fail_open }
    }

    /// Validator that never gates (no embedding collaborator configured)
    pub fn disabled() -> Self {
        Self { embedder: None, fail_open: true }
    }

    /// Score a candidate against the original and compare to the threshold.
    ///
    /// Without an embedder the verdict passes with similarity 1.0. When the
    /// embedding call fails, fail-open passes the candidate with similarity
    /// 0.0; fail-closed rejects it.
    pub async fn validate(&self, original: &str, candidate: &str, threshold: f64) -> SemanticVerdict {
        let Some(embedder) = &self.embedder else {
            return SemanticVerdict { passed: true, similarity: 1.0, reason: None };
        };

        let embeddings = async {
            let original = embedder.embed(original).await?;
            let candidate = embedder.embed(candidate).await?;
            Ok::<_, crate::core::provider::ProviderError>((original, candidate))
        }
        .await;

        match embeddings {
            Ok((original_emb, candidate_emb)) => {
                let similarity =
                    f64::from(cosine_similarity(&original_emb.vector, &candidate_emb.vector));
                if similarity >= threshold {
                    SemanticVerdict { passed: true, similarity, reason: None }
                } else {
                    SemanticVerdict {
                        passed: false,
                        similarity,
                        reason: Some(format!(
                            "Semantic similarity too low: {similarity:.2} < {threshold}"
                        )),
                    }
                }
            }
            Err(e) => {
                warn!("Embedding call failed: {}", e);
                if self.fail_open {
                    SemanticVerdict { passed: true, similarity: 0.0, reason: None }
                } else {
                    SemanticVerdict {
                        passed: false,
                        similarity: 0.0,
                        reason: Some(format!("Embedding service unavailable: {e}")),
                    }
                }
            }
        }
    }
}

/// Cosine similarity between two vectors.
///
/// Defined as 0.0 when either vector has zero norm or the dimensions
/// disagree, so a degenerate embedding never divides by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
