//! HTTP-level tests of the Topic Tagging API against stub classifiers.

use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use topictag_model::{Classifier, ModelError, Prediction, DEFAULT_MODEL_ID};
use topictag_web::{router::build_router, state::AppState};

/// Records every input and answers with fixed, score-ordered predictions.
#[derive(Default)]
struct StubClassifier {
    inputs: Mutex<Vec<String>>,
}

impl Classifier for StubClassifier {
    fn classify(&self, text: &str) -> topictag_model::Result<Vec<Prediction>> {
        self.inputs.lock().unwrap().push(text.to_string());
        Ok(vec![
            Prediction { label: "Natural Language Processing Techniques".into(), score: 0.71 },
            Prediction { label: "Topic Modeling".into(), score: 0.12 },
            Prediction { label: "Speech Recognition".into(), score: 0.04 },
        ])
    }
}

struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn classify(&self, _text: &str) -> topictag_model::Result<Vec<Prediction>> {
        Err(ModelError::Inference("out of memory".into()))
    }
}

fn app_with(classifier: Arc<dyn Classifier>) -> Router {
    build_router(AppState::new(classifier, DEFAULT_MODEL_ID))
}

fn app() -> Router {
    app_with(Arc::new(StubClassifier::default()))
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, bytes.to_vec())
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn classify_returns_ranked_predictions() {
    let stub = Arc::new(StubClassifier::default());
    let body = r#"{"title": "Deep learning for NLP", "abstract": "We study transformer models."}"#;

    let (status, content_type, bytes) = send(app_with(stub.clone()), post_json("/classify", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let predictions: Vec<Prediction> = serde_json::from_slice(&bytes).unwrap();
    assert!(!predictions.is_empty() && predictions.len() <= 10);
    assert!(predictions.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(predictions[0].label, "Natural Language Processing Techniques");

    let inputs = stub.inputs.lock().unwrap();
    assert_eq!(
        inputs.as_slice(),
        ["<TITLE> Deep learning for NLP\n<ABSTRACT> We study transformer models."]
    );
}

#[tokio::test]
async fn classify_rejects_empty_title() {
    let stub = Arc::new(StubClassifier::default());
    let (status, _, bytes) =
        send(app_with(stub.clone()), post_json("/classify", r#"{"title": "", "abstract": "x"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json_body(&bytes), json!({ "error": "Both 'title' and 'abstract' are required" }));
    assert!(stub.inputs.lock().unwrap().is_empty(), "model must not be called");
}

#[tokio::test]
async fn classify_rejects_missing_fields() {
    for body in [r#"{"title": "x"}"#, r#"{"abstract": "x"}"#, "{}", r#"{"title": null, "abstract": "x"}"#] {
        let (status, _, bytes) = send(app(), post_json("/classify", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json_body(&bytes)["error"], "Both 'title' and 'abstract' are required");
    }
}

#[tokio::test]
async fn classify_reports_malformed_body_as_internal_error() {
    let (status, _, bytes) = send(app(), post_json("/classify", "{not json")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(&bytes);
    assert!(body["error"].as_str().is_some_and(|m| !m.is_empty()));
}

#[tokio::test]
async fn classify_rejects_falsy_values() {
    for body in [
        r#"{"title": false, "abstract": "x"}"#,
        r#"{"title": 0, "abstract": "x"}"#,
        r#"{"title": "x", "abstract": []}"#,
    ] {
        let (status, _, bytes) = send(app(), post_json("/classify", body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body}");
        assert_eq!(json_body(&bytes)["error"], "Both 'title' and 'abstract' are required");
    }
}

#[tokio::test]
async fn classify_formats_non_string_values() {
    let stub = Arc::new(StubClassifier::default());
    let body = r#"{"title": 2024, "abstract": "Annual report"}"#;

    let (status, _, _) = send(app_with(stub.clone()), post_json("/classify", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stub.inputs.lock().unwrap().as_slice(), ["<TITLE> 2024\n<ABSTRACT> Annual report"]);
}

#[tokio::test]
async fn classify_rejects_array_body() {
    let stub = Arc::new(StubClassifier::default());
    let body = r#"["Deep learning", "We study"]"#;

    let (status, _, bytes) = send(app_with(stub.clone()), post_json("/classify", body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&bytes), json!({ "error": "request body must be a JSON object" }));
    assert!(stub.inputs.lock().unwrap().is_empty(), "model must not be called");
}

#[tokio::test]
async fn classify_reports_model_failure() {
    let body = r#"{"title": "T", "abstract": "A"}"#;
    let (status, _, bytes) = send(app_with(Arc::new(FailingClassifier)), post_json("/classify", body)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&bytes), json!({ "error": "Inference error: out of memory" }));
}

#[tokio::test]
async fn classify_requires_post() {
    let (status, _, _) = send(app(), get("/classify")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn health_reports_healthy() {
    let (status, _, bytes) = send(app(), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&bytes), json!({ "status": "healthy", "message": "API is up and running" }));
}

#[tokio::test]
async fn version_is_fixed() {
    let (status, content_type, bytes) = send(app(), get("/version")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(
        String::from_utf8(bytes).unwrap(),
        r#"{"version":"1.0.0","description":"API for classifying text using OpenAlex topic classification","model":"OpenAlex/bert-base-multilingual-cased-finetuned-openalex-topic-classification-title-abstract"}"#
    );
}

#[tokio::test]
async fn home_lists_the_four_endpoints() {
    let (status, _, bytes) = send(app(), get("/")).await;

    assert_eq!(status, StatusCode::OK);
    let body = json_body(&bytes);
    assert_eq!(body["message"], "Welcome to the Topic Tagging API");
    assert_eq!(body["instructions"], "Use /classify with a JSON payload to classify text.");

    let endpoints = body["endpoints"].as_object().unwrap();
    let mut paths: Vec<&str> = endpoints.keys().map(String::as_str).collect();
    paths.sort_unstable();
    assert_eq!(paths, ["/", "/classify", "/health", "/version"]);
}

#[tokio::test]
async fn responses_carry_no_cors_headers() {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://example.org")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let (status, _, _) = send(app(), get("/predict")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
