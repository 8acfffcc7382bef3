//! The serving gateway: token issuance and authenticated inference over HTTP.
//!
//! Composes the verifier and the fitted pipeline behind two POST handlers.
//! All process-wide state is read-only after construction, so requests share
//! it without locking and the server stays stateless across calls.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::auth::TokenConfig;
use crate::classifier::TriagePipeline;

mod error;
pub mod handlers;

pub use error::ApiError;

/// Shared application state, injected at start-up and immutable afterwards.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<TriagePipeline>,
    tokens: TokenConfig,
}

impl AppState {
    pub fn new(pipeline: TriagePipeline, tokens: TokenConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            tokens,
        }
    }

    pub fn pipeline(&self) -> &TriagePipeline {
        &self.pipeline
    }

    pub fn tokens(&self) -> &TokenConfig {
        &self.tokens
    }
}

/// Builds the full axum router.
///
/// `/get-token` and `/health` are public; `/predict` verifies the
/// `Authorization` header inside the handler before any inference runs.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/get-token", post(handlers::get_token))
        .route("/predict", post(handlers::predict))
        .route("/health", get(handlers::health))
        .with_state(state)
}
