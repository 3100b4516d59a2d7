//! Acceptance gates for rewrite candidates
//!
//! Hard rules run first (deterministic, cheap), the semantic gate second

pub mod hard_rules;
pub mod semantic;

pub use hard_rules::HardRulesValidator;
pub use semantic::{cosine_similarity, SemanticValidator, SemanticVerdict};
