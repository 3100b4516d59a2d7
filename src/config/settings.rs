//! Application configuration settings
//!
//! Defines all configuration structures and loading logic

use crate::config::pricing;
use crate::models::rewrite::Mode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Server configuration
    pub server: ServerConfig,
    /// OpenAI API configuration
    pub openai: OpenAIConfig,
    /// Rewrite pipeline configuration
    pub rewrite: RewriteConfig,
    /// Request limits
    pub limits: LimitsConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen host
    pub host: String,
    /// Listen port
    pub port: u16,
}

/// OpenAI API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAIConfig {
    /// API key
    pub api_key: String,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout: u64,
    /// Embedding model used by the semantic validator
    pub embedding_model: String,
}

/// Rewrite pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteConfig {
    /// Chat model used when the request does not name one
    pub default_model: String,
    /// Attempt budget used when the request does not set one
    pub default_max_attempts: u32,
    /// Mode used when the request does not set one
    pub default_mode: Mode,
    /// Similarity threshold applied in strict mode
    pub strict_threshold: f64,
    /// Similarity threshold applied in balanced mode
    pub balanced_threshold: f64,
    /// Whether an embedding failure passes the semantic gate
    pub semantic_fail_open: bool,
    /// Longest accepted input text in characters
    pub max_input_chars: usize,
    /// Largest accepted max_words value
    pub max_words_limit: u32,
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes
    pub max_request_size: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (text/json)
    pub format: String,
}

impl Settings {
    /// Create a new configuration instance from the environment
    pub fn new() -> Result<Self> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let settings = Self {
            server: ServerConfig {
                host: get_env_or_default("SERVER_HOST", "127.0.0.1"),
                port: get_env_or_default("SERVER_PORT", "5000")
                    .parse()
                    .context("Invalid port number")?,
            },
            openai: OpenAIConfig {
                api_key: std::env::var("OPENAI_API_KEY")
                    .context("OPENAI_API_KEY environment variable not set")?,
                base_url: get_env_or_default("OPENAI_BASE_URL", "https://api.openai.com/v1"),
                timeout: get_env_or_default("REQUEST_TIMEOUT", "30")
                    .parse()
                    .context("Invalid timeout value")?,
                embedding_model: get_env_or_default(
                    "OPENAI_EMBEDDING_MODEL",
                    "text-embedding-3-small",
                ),
            },
            rewrite: RewriteConfig {
                default_model: get_env_or_default("DEFAULT_MODEL", pricing::DEFAULT_MODEL),
                default_max_attempts: get_env_or_default("DEFAULT_MAX_ATTEMPTS", "5")
                    .parse()
                    .context("Invalid default attempt budget")?,
                default_mode: parse_mode(&get_env_or_default("DEFAULT_MODE", "balanced"))?,
                strict_threshold: get_env_or_default("SIMILARITY_THRESHOLD_STRICT", "0.85")
                    .parse()
                    .context("Invalid strict similarity threshold")?,
                balanced_threshold: get_env_or_default("SIMILARITY_THRESHOLD_BALANCED", "0.75")
                    .parse()
                    .context("Invalid balanced similarity threshold")?,
                semantic_fail_open: get_env_or_default("SEMANTIC_FAIL_OPEN", "true")
                    .parse()
                    .context("Invalid semantic fail-open flag")?,
                max_input_chars: get_env_or_default("MAX_INPUT_CHARS", "5000")
                    .parse()
                    .context("Invalid maximum input length")?,
                max_words_limit: get_env_or_default("MAX_WORDS", "2000")
                    .parse()
                    .context("Invalid maximum word limit")?,
            },
            limits: LimitsConfig {
                max_request_size: get_env_or_default("MAX_REQUEST_SIZE", "1048576")
                    .parse()
                    .context("Invalid maximum request size")?,
            },
            logging: LoggingConfig {
                level: get_env_or_default("RUST_LOG", "info"),
                format: get_env_or_default("LOG_FORMAT", "text"),
            },
        };

        // Validate configuration
        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration validity
    fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            anyhow::bail!("Port number cannot be 0");
        }

        if self.openai.api_key.is_empty() {
            anyhow::bail!("OpenAI API key cannot be empty");
        }

        if self.openai.api_key.contains(char::is_whitespace) {
            anyhow::bail!("OpenAI API key cannot contain whitespace characters");
        }

        if !self.openai.base_url.starts_with("http") {
            anyhow::bail!("Invalid OpenAI base URL format, should start with 'http'");
        }

        if self.openai.timeout == 0 {
            anyhow::bail!("Timeout values cannot be 0");
        }

        if self.rewrite.default_max_attempts == 0 {
            anyhow::bail!("Default attempt budget must be at least 1");
        }

        for threshold in [self.rewrite.strict_threshold, self.rewrite.balanced_threshold] {
            if !(0.0..=1.0).contains(&threshold) {
                anyhow::bail!("Similarity thresholds must be between 0.0 and 1.0");
            }
        }

        if self.rewrite.max_input_chars == 0 {
            anyhow::bail!("Maximum input length cannot be 0");
        }

        if self.rewrite.max_words_limit == 0 {
            anyhow::bail!("Maximum word limit cannot be 0");
        }

        if self.limits.max_request_size == 0 {
            anyhow::bail!("Maximum request size cannot be 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            anyhow::bail!("Invalid log level: {}", self.logging.level);
        }

        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            anyhow::bail!("Invalid log format: {}", self.logging.format);
        }

        Ok(())
    }

    /// Similarity threshold for a rewriting mode
    pub fn threshold_for(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Strict => self.rewrite.strict_threshold,
            Mode::Balanced => self.rewrite.balanced_threshold,
        }
    }
}

/// Parse a mode string from the environment
fn parse_mode(value: &str) -> Result<Mode> {
    match value.to_lowercase().as_str() {
        "strict" => Ok(Mode::Strict),
        "balanced" => Ok(Mode::Balanced),
        other => anyhow::bail!("Invalid rewrite mode: {}", other),
    }
}

/// Get environment variable or default value
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
