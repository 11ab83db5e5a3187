//! /restyle 端点集成测试

#![cfg(feature = "web")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::json;

use restyle::core::RestyleError;
use restyle::network::{build_gateway, GatewayConfig, Provider};
use restyle::utils::{SnapshotConfig, SnapshotLogger};
use restyle::web::{create_router, AppState};

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{post_restyle, send, test_app, MockGateway};

const PAGE: &str = "<html><body><script>x</script><div>Hi</div></body></html>";

#[tokio::test]
async fn test_restyle_returns_generated_css() {
    let gateway = MockGateway::replying("body { background: #000; color: #0ff; }");
    let app = test_app(gateway.clone());

    let (status, body) = post_restyle(
        app,
        json!({ "prompt": "make it cyberpunk", "html_structure": PAGE }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "generated_style": "body { background: #000; color: #0ff; }" })
    );

    let prompts = gateway.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(!prompts[0].contains("<script>"));
    assert!(prompts[0].contains("<div>Hi</div>"));
    assert!(prompts[0].contains("make it cyberpunk"));
}

#[tokio::test]
async fn test_noscript_scripts_never_reach_upstream() {
    let gateway = MockGateway::replying("p{}");
    let html = "<noscript><script>track()</script></noscript><body><noscript><script>pixel()</script><iframe><script>x()</script></iframe></noscript><p>x</p></body>";

    let (status, _) = post_restyle(
        test_app(gateway.clone()),
        json!({ "prompt": "plain", "html_structure": html }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let prompts = gateway.prompts();
    assert!(!prompts[0].contains("<script"));
    assert!(!prompts[0].contains("pixel()"));
    assert!(prompts[0].contains("<p>x</p>"));
}

#[tokio::test]
async fn test_markdown_fences_are_removed() {
    let gateway = MockGateway::replying("```css\na { color: red; }\n```");
    let (status, body) = post_restyle(
        test_app(gateway),
        json!({ "prompt": "red links", "html_structure": "<a href=\"/\">x</a>" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generated_style"], "a { color: red; }");
}

#[tokio::test]
async fn test_response_does_not_echo_request() {
    let (_, body) = post_restyle(
        test_app(MockGateway::replying("p{}")),
        json!({ "prompt": "calm", "html_structure": "<p>x</p>" }),
    )
    .await;

    let fields = body.as_object().unwrap();
    assert_eq!(fields.len(), 1);
    assert!(fields.contains_key("generated_style"));
}

#[tokio::test]
async fn test_missing_credential_is_reported() {
    let gateway = build_gateway(&GatewayConfig::new(Provider::OpenRouter));
    let app = test_app(gateway);

    for html in ["", "<p>x</p>", PAGE] {
        let (status, body) =
            post_restyle(app.clone(), json!({ "prompt": "any", "html_structure": html })).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains("OPENROUTER_API_KEY"), "detail: {}", detail);
    }
}

#[tokio::test]
async fn test_not_ready_gateway_is_never_called() {
    let gateway = MockGateway::not_ready(RestyleError::config("GOOGLE_API_KEY missing"));
    let (status, body) = post_restyle(
        test_app(gateway.clone()),
        json!({ "prompt": "x", "html_structure": PAGE }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].as_str().unwrap().contains("GOOGLE_API_KEY"));
    assert!(gateway.prompts().is_empty());
}

#[tokio::test]
async fn test_upstream_failure_is_surfaced() {
    let gateway = MockGateway::failing(RestyleError::upstream(Some(401), "invalid api key"));
    let (status, body) = post_restyle(
        test_app(gateway),
        json!({ "prompt": "x", "html_structure": "<p>x</p>" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Error generating style"));
    assert!(detail.contains("401"));
    assert!(detail.contains("invalid api key"));
    assert!(body.get("generated_style").is_none());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let (status, _) = post_restyle(
        test_app(MockGateway::replying("p{}")),
        json!({ "prompt": "missing html" }),
    )
    .await;

    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_cors_allows_any_origin_with_credentials() {
    let app = test_app(MockGateway::replying("p{}"));
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/restyle")
        .header("origin", "chrome-extension://abcdefghijklmnop")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = send(app, request).await;

    assert!(status.is_success());
    assert_eq!(
        headers["access-control-allow-origin"],
        "chrome-extension://abcdefghijklmnop"
    );
    assert_eq!(headers["access-control-allow-credentials"], "true");
}

#[tokio::test]
async fn test_snapshots_are_written_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = SnapshotLogger::new(SnapshotConfig {
        html_enabled: true,
        css_enabled: true,
        html_dir: dir.path().join("requests"),
        css_dir: dir.path().join("css"),
        host_annotation: false,
    });
    let state = AppState::new(MockGateway::replying("h1 { color: gold; }")).with_snapshots(snapshots);
    let app = create_router(Arc::new(state));

    let (status, _) = post_restyle(
        app,
        json!({ "prompt": "gold titles", "html_structure": "<h1>T</h1><script>x</script>" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let html_files: Vec<_> = std::fs::read_dir(dir.path().join("requests"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(html_files.len(), 1);
    assert!(html_files[0].to_string_lossy().ends_with("_gold_titles.html"));
    let html = std::fs::read_to_string(&html_files[0]).unwrap();
    assert!(html.contains("<h1>T</h1>"));
    assert!(!html.contains("script"));

    let css_files: Vec<_> = std::fs::read_dir(dir.path().join("css"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(css_files.len(), 1);
    assert_eq!(
        std::fs::read_to_string(&css_files[0]).unwrap(),
        "h1 { color: gold; }"
    );
}

#[tokio::test]
async fn test_snapshot_failure_does_not_fail_request() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "x").unwrap();

    let snapshots = SnapshotLogger::new(SnapshotConfig {
        html_enabled: true,
        css_enabled: true,
        html_dir: blocker.join("requests"),
        css_dir: blocker.join("css"),
        host_annotation: false,
    });
    let state = AppState::new(MockGateway::replying("p{}")).with_snapshots(snapshots);

    let (status, body) = post_restyle(
        create_router(Arc::new(state)),
        json!({ "prompt": "x", "html_structure": "<p>x</p>" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generated_style"], "p{}");
}

#[tokio::test]
async fn test_oversized_html_still_processed() {
    let state = AppState::new(MockGateway::replying("p{}")).with_max_html_bytes(16);
    let html = "<p>".to_string() + &"long text ".repeat(100) + "</p>";

    let (status, _) = post_restyle(
        create_router(Arc::new(state)),
        json!({ "prompt": "x", "html_structure": html }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
}
