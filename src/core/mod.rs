//! Rewrite pipeline core
//!
//! Word counting, acceptance gates, collaborator seams and the retry
//! orchestrator that ties them together

pub mod orchestrator;
pub mod provider;
pub mod validators;
pub mod word_counter;

pub use orchestrator::{target_words, ModeThresholds, RewriteOrchestrator};
pub use provider::{
    EmbeddingOutput, EmbeddingProvider, ProviderError, RewriteCall, RewriteOutput, RewriteProvider,
};
pub use validators::{HardRulesValidator, SemanticValidator, SemanticVerdict};
pub use word_counter::WordCounter;
