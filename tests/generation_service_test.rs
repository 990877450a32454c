// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use clonrs::config::settings::GenerationSettings;
use clonrs::domain::services::generation_service::GenerationService;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn settings(api_key: Option<&str>, base_url: &str) -> GenerationSettings {
    GenerationSettings {
        api_key: api_key.map(|k| k.to_string()),
        model: "gpt-4o-mini".to_string(),
        api_base_url: base_url.to_string(),
        temperature: 0.4,
        max_tokens: 256,
    }
}

fn chat_reply(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": content
            }
        }]
    })
}

#[tokio::test]
async fn test_generate_parses_fenced_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            "```json\n{\"sqlSchema\":\"CREATE TABLE a(id INT);\",\"nodeRoute\":\"module.exports = {};\"}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let service = GenerationService::from_settings(&settings(Some("test-key"), &server.uri()));
    let code = service.generate("<form><input name=\"email\"></form>").await;

    assert_eq!(code.sql_schema, "CREATE TABLE a(id INT);");
    assert_eq!(code.node_route, "module.exports = {};");
}

#[tokio::test]
async fn test_generate_without_api_key_returns_fallback_without_calling_api() {
    // No server at all: a missing credential must short-circuit to fallback
    // before any network activity.
    let service = GenerationService::from_settings(&settings(None, "http://127.0.0.1:9"));
    let code = service.generate("<div>page</div>").await;

    assert_eq!(code, GenerationService::fallback_code());
}

#[tokio::test]
async fn test_generate_falls_back_on_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(429).set_body_string("Rate limit reached for requests"),
        )
        .mount(&server)
        .await;

    let service = GenerationService::from_settings(&settings(Some("test-key"), &server.uri()));
    let code = service.generate("<div>page</div>").await;

    assert_eq!(code, GenerationService::fallback_code());
}

#[tokio::test]
async fn test_generate_falls_back_on_unparseable_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            "I cannot produce a schema for this page.",
        )))
        .mount(&server)
        .await;

    let service = GenerationService::from_settings(&settings(Some("test-key"), &server.uri()));
    let code = service.generate("<div>page</div>").await;

    assert_eq!(code, GenerationService::fallback_code());
}

#[tokio::test]
async fn test_generate_falls_back_on_missing_key_in_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply(
            "{\"sqlSchema\":\"CREATE TABLE a(id INT);\"}",
        )))
        .mount(&server)
        .await;

    let service = GenerationService::from_settings(&settings(Some("test-key"), &server.uri()));
    let code = service.generate("<div>page</div>").await;

    assert_eq!(code, GenerationService::fallback_code());
}
