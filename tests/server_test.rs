//! HTTP-level tests for the serving gateway: token issuance, header
//! verification ordering, and the predict contract.

use axum::body::Body;
use http_body_util::BodyExt;
use hyper::{Request, StatusCode};
use jsonwebtoken::{encode, get_current_timestamp, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use triage::data::{synthetic, Record};
use triage::train::{train, TrainConfig};
use triage::{build_router, AppState, Claims, TokenConfig, TriageLabel};

const TEST_SECRET: &str = "test-secret-for-http-tests";

fn test_records() -> Vec<Record> {
    synthetic::generate(200, synthetic::Distribution::Balanced, 42)
}

fn test_app() -> axum::Router {
    let cfg = TrainConfig {
        epochs: 200,
        ..TrainConfig::default()
    };
    let (pipeline, _) = train(&test_records(), &cfg).expect("training failed");
    let tokens = TokenConfig::new(TEST_SECRET, std::time::Duration::from_secs(3600));
    build_router(AppState::new(pipeline, tokens))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(value) = authorization {
        builder = builder.header("authorization", value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn expired_token() -> String {
    let claims = Claims {
        sub: "alice".into(),
        exp: get_current_timestamp() - 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_token_then_predict_end_to_end() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json("/get-token", json!({"username": "alice"}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json(
            "/predict",
            json!({"text": "mild headache for 2 days"}),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let prediction = body_json(response).await["prediction"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prediction.parse::<TriageLabel>().is_ok());
}

#[tokio::test]
async fn test_bearer_prefix_accepted() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json("/get-token", json!({"username": "bob"}), None))
        .await
        .unwrap();
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json(
            "/predict",
            json!({"text": "severe chest pain"}),
            Some(&format!("Bearer {}", token)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_rejected() {
    let app = test_app();
    let response = app
        .oneshot(post_json("/predict", json!({"text": "mild headache"}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["detail"], "Missing token");
}

#[tokio::test]
async fn test_verification_runs_before_inference() {
    // Empty text would fail input validation with 422, but an absent token
    // must win: the pipeline is never consulted for unauthenticated calls.
    let app = test_app();
    let response = app
        .oneshot(post_json("/predict", json!({"text": ""}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["detail"], "Missing token");
}

#[tokio::test]
async fn test_invalid_token_rejected() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/predict",
            json!({"text": "mild headache"}),
            Some("garbage"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["detail"], "Invalid token");
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = test_app();
    let response = app
        .oneshot(post_json(
            "/predict",
            json!({"text": "mild headache"}),
            Some(&expired_token()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["detail"], "Token expired");
}

#[tokio::test]
async fn test_empty_text_rejected_when_authenticated() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(post_json("/get-token", json!({"username": "carol"}), None))
        .await
        .unwrap();
    let token = body_json(response).await["token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(post_json("/predict", json!({"text": ""}), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_get_token_accepts_any_username() {
    let app = test_app();
    for username in ["", "alice", "no such user"] {
        let response = app
            .clone()
            .oneshot(post_json("/get-token", json!({"username": username}), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["token"].as_str().is_some());
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["classes"].as_array().unwrap().len(), 4);
}
