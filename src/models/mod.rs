//! Data models module
//!
//! Rewrite pipeline DTOs plus the OpenAI wire structures

pub mod openai;
pub mod rewrite;

pub use rewrite::{
    AttemptRecord, AttemptStatus, Mode, RewriteRequest, RewriteResult, RunStatus, UsageMetrics,
};
