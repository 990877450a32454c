// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::{Extension, Router};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use clonrs::config::settings::{GenerationSettings, RenderSettings, ServerSettings, Settings};
use clonrs::domain::services::generation_service::GenerationService;
use clonrs::engines::traits::{RenderEngine, RenderError, RenderRequest, RenderedPage};
use clonrs::presentation::routes;

/// 返回固定页面内容的桩引擎，并统计调用次数
#[derive(Default)]
struct StubEngine {
    calls: AtomicUsize,
}

#[async_trait]
impl RenderEngine for StubEngine {
    async fn render(&self, request: &RenderRequest) -> Result<RenderedPage, RenderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RenderedPage {
            html: format!(
                r#"<div class="box">Hi</div><span data-origin="{}"></span>"#,
                request.url
            ),
            css: ".box{color:red}".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// 始终失败的桩引擎
struct FailingEngine;

#[async_trait]
impl RenderEngine for FailingEngine {
    async fn render(&self, _request: &RenderRequest) -> Result<RenderedPage, RenderError> {
        Err(RenderError::Navigation("net::ERR_NAME_NOT_RESOLVED".to_string()))
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

fn test_settings(environment: &str) -> Arc<Settings> {
    Arc::new(Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: environment.to_string(),
        },
        render: RenderSettings {
            timeout_secs: 35,
            settle_ms: 0,
            auto_scroll: false,
            max_scroll_steps: 0,
            full_document: true,
            capture_computed_styles: false,
        },
        generation: GenerationSettings {
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            api_base_url: "http://127.0.0.1:9".to_string(),
            temperature: 0.4,
            max_tokens: 256,
        },
    })
}

fn app(
    engine: Arc<dyn RenderEngine>,
    generation: Arc<GenerationService>,
    settings: Arc<Settings>,
) -> Router {
    routes::routes()
        .layer(Extension(engine))
        .layer(Extension(generation))
        .layer(Extension(settings))
}

fn generation_service(settings: &Settings) -> Arc<GenerationService> {
    Arc::new(GenerationService::from_settings(&settings.generation))
}

fn clone_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/clone")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let settings = test_settings("development");
    let app = app(
        Arc::new(StubEngine::default()),
        generation_service(&settings),
        settings,
    );

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_unmatched_route_returns_404_envelope() {
    let settings = test_settings("development");
    let app = app(
        Arc::new(StubEngine::default()),
        generation_service(&settings),
        settings,
    );

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Not Found");
}

#[tokio::test]
async fn test_missing_url_returns_400_without_invoking_pipeline() {
    let settings = test_settings("development");
    let stub = Arc::new(StubEngine::default());
    let engine: Arc<dyn RenderEngine> = stub.clone();
    let app = app(engine, generation_service(&settings), settings);

    for body in [r#"{}"#, r#"{"url":""}"#, r#"{"url":"   "}"#] {
        let response = app.clone().oneshot(clone_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"], "URL is required");
    }

    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_malformed_url_returns_400_without_invoking_pipeline() {
    let settings = test_settings("development");
    let stub = Arc::new(StubEngine::default());
    let engine: Arc<dyn RenderEngine> = stub.clone();
    let app = app(engine, generation_service(&settings), settings);

    for body in [
        r#"{"url":"not a url"}"#,
        r#"{"url":"example.com"}"#,
        r#"{"url":"ftp://example.com"}"#,
        r#"{"url":"javascript:alert(1)"}"#,
    ] {
        let response = app.clone().oneshot(clone_request(body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = response_json(response).await;
        assert_eq!(json["error"], "Invalid URL", "body: {}", body);
    }

    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_clone_success_with_mocked_model_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "```json\n{\"sqlSchema\":\"CREATE TABLE t(id INT);\",\"nodeRoute\":\"module.exports={}\"}\n```"
                }
            }]
        })))
        .mount(&server)
        .await;

    let mut settings = (*test_settings("development")).clone();
    settings.generation.api_key = Some("test-key".to_string());
    settings.generation.api_base_url = server.uri();
    let settings = Arc::new(settings);

    let app = app(
        Arc::new(StubEngine::default()),
        generation_service(&settings),
        settings,
    );

    let response = app
        .oneshot(clone_request(r#"{"url":"https://example.com"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);

    let data = &body["data"];
    assert!(data["html"].as_str().unwrap().contains(r#"class="box""#));
    assert!(data["css"].as_str().unwrap().contains("color:red"));
    assert_eq!(data["sqlSchema"], "CREATE TABLE t(id INT);");
    assert_eq!(data["nodeRoute"], "module.exports={}");

    let metadata = &data["metadata"];
    assert_eq!(metadata["sourceUrl"], "https://example.com");
    assert!(metadata["processingTime"].as_str().unwrap().ends_with('s'));
    assert!(metadata["timestamp"].is_string());
}

#[tokio::test]
async fn test_clone_without_api_key_returns_fallback_code() {
    let settings = test_settings("development");
    let app = app(
        Arc::new(StubEngine::default()),
        generation_service(&settings),
        settings,
    );

    let response = app
        .oneshot(clone_request(r#"{"url":"https://example.com"}"#))
        .await
        .unwrap();

    // Generation failures are invisible to the caller
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["success"], true);

    let fallback = GenerationService::fallback_code();
    assert_eq!(body["data"]["sqlSchema"], fallback.sql_schema);
    assert_eq!(body["data"]["nodeRoute"], fallback.node_route);
}

#[tokio::test]
async fn test_render_failure_returns_500_with_details_in_development() {
    let settings = test_settings("development");
    let app = app(
        Arc::new(FailingEngine),
        generation_service(&settings),
        settings,
    );

    let response = app
        .oneshot(clone_request(r#"{"url":"https://unreachable.example"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
    assert!(body["message"].is_string());
    assert!(body["details"]
        .as_str()
        .unwrap()
        .contains("ERR_NAME_NOT_RESOLVED"));
}

#[tokio::test]
async fn test_render_failure_hides_details_in_production() {
    let settings = test_settings("production");
    let app = app(
        Arc::new(FailingEngine),
        generation_service(&settings),
        settings,
    );

    let response = app
        .oneshot(clone_request(r#"{"url":"https://unreachable.example"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_concurrent_requests_keep_results_separate() {
    let settings = test_settings("development");
    let app = app(
        Arc::new(StubEngine::default()),
        generation_service(&settings),
        settings,
    );

    let urls: Vec<String> = (1..=5)
        .map(|i| format!("https://site{}.test/page", i))
        .collect();

    let responses = futures::future::join_all(urls.iter().map(|url| {
        let app = app.clone();
        let body = format!(r#"{{"url":"{}"}}"#, url);
        async move { app.oneshot(clone_request(&body)).await.unwrap() }
    }))
    .await;

    for (url, response) in urls.iter().zip(responses) {
        assert_eq!(response.status(), StatusCode::OK);
        let body = response_json(response).await;
        assert_eq!(body["data"]["metadata"]["sourceUrl"], url.as_str());
        // The stub echoes the rendered URL into the markup, so cross-request
        // mixing would show up here as well.
        assert!(body["data"]["html"].as_str().unwrap().contains(url.as_str()));
    }
}
