//! HTTP surface tests: requests go through the full router in-process.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::*;
use discovery_core::kernel::{MockPlateSolver, MockReferenceImageSource};
use discovery_core::server::{build_app, middleware::RateLimit};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_for(harness: &TestHarness) -> Router {
    build_app(harness.app_state()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn discover_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/discover")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn encoded_dark_field() -> String {
    STANDARD.encode(png_bytes(&dark_field()))
}

#[tokio::test]
async fn health_reports_configuration() {
    let harness = TestHarness::new(
        MockPlateSolver::new(),
        MockReferenceImageSource::serving(png_bytes(&dark_field())),
    );

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(app_for(&harness), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["inference"], "absent");
}

#[tokio::test]
async fn discover_returns_report_shape() {
    let harness = TestHarness::new(
        MockPlateSolver::new(),
        MockReferenceImageSource::serving(png_bytes(&field_with_new_source(2000))),
    );

    let body = json!({ "imageBase64": encoded_dark_field(), "question": "what is this?" });
    let (status, report) = send(app_for(&harness), discover_request(body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["coords"]["ra"], "150.0000");
    assert_eq!(report["coords"]["dec"], "2.0000");
    assert_eq!(report["type"], "SUPERNOVA");
    assert!(report["historicalImage"].as_str().unwrap().starts_with("http"));
    assert!(report["discovery"].as_str().unwrap().contains("2000"));
}

#[tokio::test]
async fn data_url_payload_is_accepted() {
    let harness = TestHarness::new(
        MockPlateSolver::new(),
        MockReferenceImageSource::serving(png_bytes(&dark_field())),
    );

    let payload = format!("data:image/png;base64,{}", encoded_dark_field());
    let body = json!({ "imageBase64": payload });
    let (status, report) = send(app_for(&harness), discover_request(body.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["type"], "GALAXY");
}

#[tokio::test]
async fn bad_base64_is_bad_request() {
    let harness = TestHarness::new(
        MockPlateSolver::new(),
        MockReferenceImageSource::serving(png_bytes(&dark_field())),
    );

    let body = json!({ "imageBase64": "%%% not base64 %%%" });
    let (status, error) = send(app_for(&harness), discover_request(body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["error"].is_string());
    assert!(harness.deps.plate_solver.logins().is_empty());
}

#[tokio::test]
async fn malformed_json_is_client_error() {
    let harness = TestHarness::new(
        MockPlateSolver::new(),
        MockReferenceImageSource::serving(png_bytes(&dark_field())),
    );

    let (status, error) =
        send(app_for(&harness), discover_request("{\"image\": 1".to_string())).await;

    assert!(status.is_client_error());
    assert!(error["error"].is_string());
}

#[tokio::test]
async fn undecodable_image_is_bad_request() {
    let harness = TestHarness::new(
        MockPlateSolver::new(),
        MockReferenceImageSource::serving(png_bytes(&dark_field())),
    );

    let body = json!({ "imageBase64": STANDARD.encode(b"plain text, not pixels") });
    let (status, _) = send(app_for(&harness), discover_request(body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn solver_rejection_is_bad_gateway() {
    let harness = TestHarness::new(
        MockPlateSolver::new().rejecting_login(),
        MockReferenceImageSource::serving(png_bytes(&dark_field())),
    );

    let body = json!({ "imageBase64": encoded_dark_field() });
    let (status, error) = send(app_for(&harness), discover_request(body.to_string())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(error["error"].as_str().unwrap().contains("authentication"));
}

#[tokio::test]
async fn solver_timeout_is_gateway_timeout() {
    let harness = TestHarness::new(
        MockPlateSolver::new().never_solves(),
        MockReferenceImageSource::serving(png_bytes(&dark_field())),
    );

    let body = json!({ "imageBase64": encoded_dark_field() });
    let (status, _) = send(app_for(&harness), discover_request(body.to_string())).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn discover_is_rate_limited_per_client() {
    let harness = TestHarness::new(
        MockPlateSolver::new(),
        MockReferenceImageSource::serving(png_bytes(&dark_field())),
    );
    let mut state = harness.app_state();
    state.rate_limit = Some(RateLimit::new(60, 1));
    let app = build_app(state).unwrap();

    let request = || {
        Request::builder()
            .method("POST")
            .uri("/api/discover")
            .header(CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(json!({ "imageBase64": "" }).to_string()))
            .unwrap()
    };

    let first = app.clone().oneshot(request()).await.unwrap();
    assert_eq!(first.status(), StatusCode::BAD_REQUEST);

    let (status, error) = send(app, request()).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(error["error"].as_str().unwrap().contains("Too Many Requests"));
}
