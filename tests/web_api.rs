//! HTTP 接口集成测试

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use trans22::translation::LanguageCatalog;
use trans22::web::{WebConfig, WebServer};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{echo, EchoTranslator, FailingTranslator, TestEnvironment};

fn test_config(static_dir: Option<String>) -> WebConfig {
    WebConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 3000,
        static_dir,
        preload: false,
        fanout_concurrency: 2,
    }
}

fn app(env: &TestEnvironment) -> Router {
    WebServer::new(test_config(None), env.orchestrator.clone()).router()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn test_languages_endpoint_lists_catalog() {
    let env = TestEnvironment::ready_with(Arc::new(EchoTranslator::new()));
    let (status, body) = send(app(&env), get("/api/languages")).await;

    assert_eq!(status, StatusCode::OK);
    let languages = body["languages"].as_array().unwrap();
    assert_eq!(languages.len(), LanguageCatalog::builtin().len());
    assert_eq!(languages[0]["code"], "zh-CN");
    assert!(languages[0]["name"].is_string());

    // 列出语言不会触发模型加载
    assert_eq!(env.fetcher.attempt_count(), 0);
}

#[tokio::test]
async fn test_translate_success() {
    let env = TestEnvironment::ready_with(Arc::new(EchoTranslator::new()));
    let (status, body) = send(
        app(&env),
        post("/api/translate", json!({ "text": "Hello", "targetLang": "ja" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translation"], echo("Hello", "jpn_Jpan"));
    assert_eq!(body["targetLang"], "ja");
    assert_eq!(body["sourceLang"], "en");
}

#[tokio::test]
async fn test_translate_missing_parameters() {
    let env = TestEnvironment::ready_with(Arc::new(EchoTranslator::new()));

    let (status, body) = send(app(&env), post("/api/translate", json!({ "text": "Hello" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "缺少必要参数");

    let (status, body) = send(app(&env), post("/api/translate", json!({ "targetLang": "ja" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "缺少必要参数");

    let (status, body) = send(app(&env), post("/api/translate-all", json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "缺少文本参数");

    let (status, body) = send(app(&env), post("/api/translate-all", json!({ "text": "" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "缺少文本参数");

    assert_eq!(env.fetcher.attempt_count(), 0);
}

#[tokio::test]
async fn test_translate_unsupported_language() {
    let env = TestEnvironment::ready_with(Arc::new(EchoTranslator::new()));
    let (status, body) = send(
        app(&env),
        post("/api/translate", json!({ "text": "Hello", "targetLang": "tlh" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "不支持的目标语言");
    assert_eq!(env.fetcher.attempt_count(), 0);
}

#[tokio::test]
async fn test_translate_when_model_unavailable() {
    let env = TestEnvironment::unreachable(&["https://a.example"]);

    let (status, body) = send(
        app(&env),
        post("/api/translate", json!({ "text": "Hello", "targetLang": "ja" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "模型未加载");
    assert!(body["details"].as_str().unwrap().contains("unreachable"));

    let (status, body) = send(
        app(&env),
        post("/api/translate-all", json!({ "text": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "模型未加载");
}

#[tokio::test]
async fn test_translate_failure_is_server_error() {
    let env = TestEnvironment::ready_with(Arc::new(FailingTranslator::new(&["jpn_Jpan"], "oom")));
    let (status, body) = send(
        app(&env),
        post("/api/translate", json!({ "text": "Hello", "targetLang": "ja" })),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "翻译失败");
    assert_eq!(body["details"], "oom");
}

#[tokio::test]
async fn test_translate_all_partial_failure() {
    let env = TestEnvironment::ready_with(Arc::new(FailingTranslator::new(&["kor_Hang"], "boom")));
    let (status, body) = send(
        app(&env),
        post("/api/translate-all", json!({ "text": "Hello", "sourceLang": "en" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let translations = body["translations"].as_object().unwrap();
    assert_eq!(translations.len(), LanguageCatalog::builtin().len() - 1);
    assert!(!translations.contains_key("en"));
    assert_eq!(translations["ko"]["failed"], true);
    assert_eq!(translations["ko"]["translation"], "翻译失败: boom");
    assert_eq!(translations["ja"]["translation"], echo("Hello", "jpn_Jpan"));
}

#[tokio::test]
async fn test_status_reports_model_and_logs() {
    let env = TestEnvironment::ready_with(Arc::new(EchoTranslator::new()));
    let app = app(&env);

    let (_, body) = send(app.clone(), get("/api/status")).await;
    assert_eq!(body["status"], "running");
    assert_eq!(body["modelLoaded"], false);
    assert_eq!(body["modelLoading"], false);
    assert_eq!(body["totalRequests"], 0);

    send(
        app.clone(),
        post("/api/translate", json!({ "text": "Hello", "targetLang": "ja" })),
    )
    .await;
    send(
        app.clone(),
        post("/api/translate", json!({ "text": "Hello", "targetLang": "tlh" })),
    )
    .await;

    let (status, body) = send(app, get("/api/status")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["modelLoaded"], true);
    assert_eq!(body["modelSource"]["host"], "https://good.example/");
    assert_eq!(body["modelCandidates"].as_array().unwrap().len(), 1);
    assert_eq!(body["totalRequests"], 2);

    let logs = body["recentLogs"].as_array().unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0]["targetLang"], "ja");
    assert_eq!(logs[0]["status"], "success");
    assert_eq!(logs[1]["targetLang"], "tlh");
    assert_eq!(logs[1]["status"], "error");
    assert!(logs[0]["timestamp"].is_string());
}

/// 请求总数只统计日志中保留的条目
#[tokio::test]
async fn test_status_total_requests_is_capped() {
    let env = TestEnvironment::ready_with(Arc::new(EchoTranslator::new()));
    let app = app(&env);

    for i in 0..105 {
        send(
            app.clone(),
            post("/api/translate", json!({ "text": format!("text {}", i), "targetLang": "tlh" })),
        )
        .await;
    }

    let (_, body) = send(app, get("/api/status")).await;
    assert_eq!(body["totalRequests"], 100);
    let logs = body["recentLogs"].as_array().unwrap();
    assert_eq!(logs.last().unwrap()["text"], "text 104");
}

#[tokio::test]
async fn test_status_reports_failures() {
    let env = TestEnvironment::unreachable(&["https://a.example", "https://b.example"]);
    let app = app(&env);

    send(
        app.clone(),
        post("/api/translate", json!({ "text": "Hello", "targetLang": "ja" })),
    )
    .await;

    let (_, body) = send(app, get("/api/status")).await;
    assert_eq!(body["modelLoaded"], false);
    assert!(body["modelError"].is_string());
    assert_eq!(body["modelFailures"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_static_files_are_served() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>Trans22</h1>").unwrap();

    let env = TestEnvironment::ready_with(Arc::new(EchoTranslator::new()));
    let server = WebServer::new(
        test_config(Some(dir.path().to_string_lossy().into_owned())),
        env.orchestrator.clone(),
    );

    let response = server.router().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"<h1>Trans22</h1>");

    let (status, _) = send(server.router(), get("/api/languages")).await;
    assert_eq!(status, StatusCode::OK);
}
