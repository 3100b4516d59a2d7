//! Wordfit library
//!
//! Rewrites text into a caller-specified word range while preserving
//! meaning and critical factual tokens

pub mod config;
pub mod core;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

// Re-export common types
pub use crate::config::Settings;
pub use crate::core::{ModeThresholds, RewriteOrchestrator, SemanticValidator};
pub use crate::handlers::{create_router, router_with_state, AppState};
pub use crate::models::rewrite::{Mode, RewriteRequest, RewriteResult, RunStatus};
pub use crate::services::OpenAIClient;
pub use crate::utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
