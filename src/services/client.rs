//! HTTP client service
//!
//! Encapsulates HTTP communication with the OpenAI API: chat completions
//! for rewriting and the embeddings endpoint for the semantic gate

use crate::config::pricing;
use crate::config::Settings;
use crate::core::provider::{
    EmbeddingOutput, EmbeddingProvider, ProviderError, RewriteCall, RewriteOutput, RewriteProvider,
};
use crate::models::openai::{
    ApiErrorResponse, ApiUsage, ChatMessage, ChatRequest, ChatResponse, EmbeddingRequest,
    EmbeddingResponse,
};
use crate::models::rewrite::{Mode, UsageMetrics};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

/// System prompt for the rewriting model
const REWRITE_SYSTEM_PROMPT: &str =
    "You are a precise text editor. You rewrite texts to a requested length \
     without changing their meaning or inventing information.";

/// OpenAI API client
///
/// The handle is immutable after construction; the chat model is a per-call
/// parameter, so one client can serve concurrent orchestrations without any
/// request leaking its model selection into another.
#[derive(Debug, Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    embedding_model: String,
}

impl OpenAIClient {
    /// Create a new client instance
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.openai.timeout))
            .user_agent(concat!("wordfit/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.openai.api_key.clone(),
            base_url: settings.openai.base_url.clone(),
            embedding_model: settings.openai.embedding_model.clone(),
        })
    }

    /// Send a chat completion request
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        debug!("Sending chat completion request for model {}", request.model);
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            response
                .json::<ChatResponse>()
                .await
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
        } else {
            let error_text = response.text().await.unwrap_or_default();
            // Prefer the structured API error message when the body parses
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                error!("OpenAI API error: {}", error_response.error.message);
                Err(ProviderError::Api(error_response.error.message))
            } else {
                error!("OpenAI API request failed: {} - {}", status, error_text);
                Err(ProviderError::Api(format!("{status} - {error_text}")))
            }
        }
    }

    /// Convert an API usage block into priced usage metrics
    fn usage_metrics(&self, model: &str, usage: &ApiUsage) -> UsageMetrics {
        let cached = usage.prompt_tokens_details.as_ref().map_or(0, |d| d.cached_tokens);
        // Cached tokens are billed at the cached rate, the rest at the input rate
        let input = usage.prompt_tokens.saturating_sub(cached);
        let pricing = pricing::pricing_for(model);

        UsageMetrics {
            model: model.to_string(),
            input_tokens: input,
            cached_tokens: cached,
            output_tokens: usage.completion_tokens,
            cost_usd: pricing::cost_usd(pricing, input, cached, usage.completion_tokens),
        }
    }
}

#[async_trait]
impl RewriteProvider for OpenAIClient {
    async fn rewrite(&self, call: &RewriteCall<'_>) -> Result<RewriteOutput, ProviderError> {
        let request = ChatRequest {
            model: call.model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: REWRITE_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage { role: "user".to_string(), content: build_rewrite_prompt(call) },
            ],
            temperature: Some(match call.mode {
                Mode::Strict => 0.2,
                Mode::Balanced => 0.7,
            }),
            max_tokens: None,
        };

        let response = self.chat_completion(&request).await?;
        let text = response
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| {
                ProviderError::InvalidResponse("chat response contained no choices".to_string())
            })?;

        let usage = response.usage.as_ref().map(|u| self.usage_metrics(call.model, u));

        Ok(RewriteOutput { text, usage })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAIClient {
    async fn embed(&self, text: &str) -> Result<EmbeddingOutput, ProviderError> {
        if self.api_key.is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        debug!("Requesting embedding with model {}", self.embedding_model);
        let url = format!("{}/embeddings", self.base_url);
        let request =
            EmbeddingRequest { model: self.embedding_model.clone(), input: text.to_string() };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api(format!("{status} - {error_text}")));
        }

        let parsed = response
            .json::<EmbeddingResponse>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| {
                ProviderError::InvalidResponse("embedding response contained no data".to_string())
            })?;

        let usage = parsed.usage.map(|u| UsageMetrics {
            model: self.embedding_model.clone(),
            input_tokens: u.prompt_tokens,
            cached_tokens: 0,
            output_tokens: 0,
            cost_usd: u.prompt_tokens as f64 * pricing::EMBEDDING_COST_PER_MTOK / 1_000_000.0,
        });

        Ok(EmbeddingOutput { vector, usage })
    }
}

/// Build the user prompt for one rewrite call.
///
/// Critical tokens ride along only when the caller passes them (attempt 1);
/// later attempts carry the delta guidance instead.
fn build_rewrite_prompt(call: &RewriteCall<'_>) -> String {
    let mode_instruction = match call.mode {
        Mode::Strict => "as literal as possible, no significant changes",
        Mode::Balanced => "balanced between literal fidelity and natural phrasing",
    };

    let mut prompt = format!(
        "Rewrite the following text so it has between {} and {} words (target: {}).\n\n\
         Original text:\n{}\n\n\
         Instructions:\n\
         1. Keep the same meaning and intent.\n\
         2. Do not add new facts or information.\n\
         3. Preserve numbers, dates, percentages, entities and proper nouns exactly.\n\
         4. Rewriting mode: {}.\n",
        call.min_words, call.max_words, call.target_words, call.text, mode_instruction
    );

    if let Some(tokens) = call.critical_tokens.filter(|t| !t.is_empty()) {
        prompt.push_str(&format!("5. Preserve these tokens exactly: {}\n", tokens.join(", ")));
    }

    if let Some(delta) = call.delta.filter(|d| *d != 0) {
        let guidance = if delta > 0 { "too many; remove" } else { "too few; add" };
        prompt.push_str(&format!(
            "6. Your previous attempt was {} words {} {} words.\n",
            delta.abs(),
            guidance,
            delta.abs()
        ));
    }

    prompt.push_str("\nReturn ONLY the final text, with no explanations or lists.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call<'a>(
        text: &'a str,
        delta: Option<i64>,
        critical_tokens: Option<&'a [String]>,
    ) -> RewriteCall<'a> {
        RewriteCall {
            text,
            min_words: 10,
            max_words: 50,
            target_words: 30,
            mode: Mode::Balanced,
            model: "gpt-4o-mini",
            delta,
            critical_tokens,
            attempt_number: 1,
        }
    }

    #[test]
    fn test_prompt_contains_range_and_target() {
        let prompt = build_rewrite_prompt(&call("sample text", None, None));
        assert!(prompt.contains("between 10 and 50 words"));
        assert!(prompt.contains("target: 30"));
        assert!(prompt.contains("sample text"));
    }

    #[test]
    fn test_prompt_lists_critical_tokens() {
        let tokens = vec!["25%".to_string(), "NASA".to_string()];
        let prompt = build_rewrite_prompt(&call("text", None, Some(&tokens)));
        assert!(prompt.contains("Preserve these tokens exactly: 25%, NASA"));
    }

    #[test]
    fn test_prompt_delta_guidance_direction() {
        let over = build_rewrite_prompt(&call("text", Some(7), None));
        assert!(over.contains("7 words too many"));

        let under = build_rewrite_prompt(&call("text", Some(-4), None));
        assert!(under.contains("4 words too few"));
    }

    #[test]
    fn test_prompt_omits_zero_delta() {
        let prompt = build_rewrite_prompt(&call("text", Some(0), None));
        assert!(!prompt.contains("previous attempt"));
    }

    #[test]
    fn test_usage_metrics_split_cached_tokens() {
        let settings = test_settings();
        let client = OpenAIClient::new(&settings).unwrap();

        let usage = ApiUsage {
            prompt_tokens: 100,
            completion_tokens: 40,
            total_tokens: 140,
            prompt_tokens_details: Some(crate::models::openai::PromptTokensDetails {
                cached_tokens: 30,
            }),
        };

        let metrics = client.usage_metrics("gpt-4o-mini", &usage);
        assert_eq!(metrics.input_tokens, 70);
        assert_eq!(metrics.cached_tokens, 30);
        assert_eq!(metrics.output_tokens, 40);
        let expected = (70.0 * 0.15 + 30.0 * 0.075 + 40.0 * 0.60) / 1_000_000.0;
        assert!((metrics.cost_usd - expected).abs() < 1e-12);
    }

    fn test_settings() -> Settings {
        use crate::config::settings::*;
        use crate::models::rewrite::Mode;

        Settings {
            server: ServerConfig { host: "localhost".to_string(), port: 5000 },
            openai: OpenAIConfig {
                api_key: "sk-test".to_string(),
                base_url: "https://api.openai.com/v1".to_string(),
                timeout: 30,
                embedding_model: "text-embedding-3-small".to_string(),
            },
            rewrite: RewriteConfig {
                default_model: "gpt-4o-mini".to_string(),
                default_max_attempts: 5,
                default_mode: Mode::Balanced,
                strict_threshold: 0.85,
                balanced_threshold: 0.75,
                semantic_fail_open: true,
                max_input_chars: 5000,
                max_words_limit: 2000,
            },
            limits: LimitsConfig { max_request_size: 1_048_576 },
            logging: LoggingConfig { level: "info".to_string(), format: "text".to_string() },
        }
    }
}
