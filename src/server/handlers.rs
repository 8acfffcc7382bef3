use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::auth::AuthError;
use crate::classifier::TriageLabel;

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct SymptomInput {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct Prediction {
    pub prediction: TriageLabel,
}

/// `POST /get-token`: mints a token for the claimed identity.
///
/// No credential check precedes issuance; any username string succeeds.
pub async fn get_token(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = state
        .tokens()
        .issue(&req.username)
        .map_err(|e| ApiError::Internal(format!("Token encoding failed: {}", e)))?;
    info!("Issued token for subject {:?}", req.username);
    Ok(Json(TokenResponse { token }))
}

/// `POST /predict`: classifies a symptom description.
///
/// The credential is verified strictly before the pipeline runs; a rejected
/// request never touches the model.
pub async fn predict(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<SymptomInput>,
) -> Result<Json<Prediction>, ApiError> {
    let authorization = match headers.get(AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| AuthError::InvalidToken)?),
    };
    let claims = state.tokens().verify(authorization)?;
    debug!("Verified request from subject {:?}", claims.sub);

    let prediction = state.pipeline().predict(&input.text)?;
    Ok(Json(Prediction { prediction }))
}

/// `GET /health`: liveness probe, no authentication.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let info = state.pipeline().info();
    Json(json!({
        "status": "ok",
        "num_features": info.num_features,
        "classes": info.class_labels,
    }))
}
