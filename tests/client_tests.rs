//! OpenAI client tests
//!
//! Exercise the reqwest client against a mocked API endpoint

use httpmock::prelude::*;
use wordfit::config::settings::{
    LimitsConfig, LoggingConfig, OpenAIConfig, RewriteConfig, ServerConfig, Settings,
};
use wordfit::core::provider::{EmbeddingProvider, ProviderError, RewriteCall, RewriteProvider};
use wordfit::models::rewrite::Mode;
use wordfit::services::OpenAIClient;

fn settings_for(base_url: String) -> Settings {
    Settings {
        server: ServerConfig { host: "127.0.0.1".to_string(), port: 5000 },
        openai: OpenAIConfig {
            api_key: "sk-test".to_string(),
            base_url,
            timeout: 5,
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

fn rewrite_call<'a>(text: &'a str) -> RewriteCall<'a> {
    RewriteCall {
        text,
        min_words: 5,
        max_words: 15,
        target_words: 10,
        mode: Mode::Balanced,
        model: "gpt-4o-mini",
        delta: None,
        critical_tokens: None,
        attempt_number: 1,
    }
}

#[tokio::test]
async fn test_rewrite_parses_choice_and_prices_usage() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/chat/completions")
            .header("authorization", "Bearer sk-test");
        then.status(200).json_body(serde_json::json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "  the rewritten text  "},
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 100,
                "completion_tokens": 40,
                "total_tokens": 140,
                "prompt_tokens_details": {"cached_tokens": 20}
            }
        }));
    });

    let client = OpenAIClient::new(&settings_for(server.base_url())).unwrap();
    let output = client.rewrite(&rewrite_call("original text")).await.unwrap();

    mock.assert();
    assert_eq!(output.text, "the rewritten text");

    let usage = output.usage.unwrap();
    assert_eq!(usage.model, "gpt-4o-mini");
    assert_eq!(usage.input_tokens, 80);
    assert_eq!(usage.cached_tokens, 20);
    assert_eq!(usage.output_tokens, 40);
    let expected_cost = (80.0 * 0.15 + 20.0 * 0.075 + 40.0 * 0.60) / 1_000_000.0;
    assert!((usage.cost_usd - expected_cost).abs() < 1e-12);
}

#[tokio::test]
async fn test_rewrite_surfaces_api_error_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(429).json_body(serde_json::json!({
            "error": {"message": "Rate limit reached", "type": "rate_limit_error"}
        }));
    });

    let client = OpenAIClient::new(&settings_for(server.base_url())).unwrap();
    let error = client.rewrite(&rewrite_call("text")).await.unwrap_err();

    match error {
        ProviderError::Api(message) => assert!(message.contains("Rate limit reached")),
        other => panic!("expected Api error, got: {other}"),
    }
}

#[tokio::test]
async fn test_rewrite_rejects_empty_choice_list() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/chat/completions");
        then.status(200).json_body(serde_json::json!({
            "id": "chatcmpl-2",
            "model": "gpt-4o-mini",
            "choices": []
        }));
    });

    let client = OpenAIClient::new(&settings_for(server.base_url())).unwrap();
    let error = client.rewrite(&rewrite_call("text")).await.unwrap_err();

    assert!(matches!(error, ProviderError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_embed_returns_vector_and_priced_usage() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(200).json_body(serde_json::json!({
            "data": [{"index": 0, "embedding": [0.1, 0.2, 0.3]}],
            "model": "text-embedding-3-small",
            "usage": {"prompt_tokens": 8, "total_tokens": 8}
        }));
    });

    let client = OpenAIClient::new(&settings_for(server.base_url())).unwrap();
    let output = client.embed("some text").await.unwrap();

    mock.assert();
    assert_eq!(output.vector, vec![0.1, 0.2, 0.3]);

    let usage = output.usage.unwrap();
    assert_eq!(usage.model, "text-embedding-3-small");
    assert_eq!(usage.input_tokens, 8);
    let expected_cost = 8.0 * 0.02 / 1_000_000.0;
    assert!((usage.cost_usd - expected_cost).abs() < 1e-15);
}

#[tokio::test]
async fn test_embed_maps_http_error_to_provider_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/embeddings");
        then.status(500).body("internal error");
    });

    let client = OpenAIClient::new(&settings_for(server.base_url())).unwrap();
    let error = client.embed("some text").await.unwrap_err();

    assert!(matches!(error, ProviderError::Api(_)));
}
