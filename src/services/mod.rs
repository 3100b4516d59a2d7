//! Service layer module
//!
//! Concrete providers behind the core's collaborator seams

pub mod client;

pub use client::OpenAIClient;
