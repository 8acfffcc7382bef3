//! An authenticated symptom triage API built around a fitted short-text
//! classifier.
//!
//! The serving core is deliberately small: a token issuer/verifier
//! ([`auth`]), a vectorize-then-classify pipeline ([`classifier`]) and an
//! HTTP gateway ([`server`]) that composes them. Everything else in the crate
//! is offline tooling that produces the two model artifacts the server
//! consumes ([`data`], [`train`]).
//!
//! # Serving
//!
//! ```rust,no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use triage::{build_router, AppState, ArtifactStore, TokenConfig};
//!
//! let pipeline = ArtifactStore::new_default()?.load()?;
//! let app = build_router(AppState::new(pipeline, TokenConfig::from_env()));
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The fitted pipeline is immutable after loading and is shared read-only by
//! every concurrent request through an `Arc`; verification is a pure function
//! of the presented token plus the shared secret. Nothing in the request path
//! takes a lock.

pub mod auth;
pub mod classifier;
pub mod data;
pub mod server;
pub mod train;

pub use auth::{AuthError, Claims, TokenConfig};
pub use classifier::{
    ArtifactError, ArtifactStore, ClassifierError, LinearClassifier, PipelineInfo, TfidfVectorizer,
    TriageLabel, TriagePipeline,
};
pub use server::{build_router, ApiError, AppState};
pub use train::{EvalReport, TrainConfig, TrainError};

pub fn init_logger() {
    env_logger::init();
}
