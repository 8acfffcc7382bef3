use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::model::LinearClassifier;
use super::pipeline::TriagePipeline;
use super::vectorizer::TfidfVectorizer;

/// Environment variable overriding the model artifact directory.
pub const MODEL_DIR_ENV: &str = "TRIAGE_MODEL_DIR";

const VECTORIZER_FILE: &str = "vectorizer.json";
const CLASSIFIER_FILE: &str = "classifier.json";
const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Malformed artifact: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Hash mismatch: expected {expected}, got {actual} for {file_type} file")]
    HashMismatch {
        file_type: String,
        expected: String,
        actual: String,
    },
    #[error("Invalid artifact parameters: {0}")]
    InvalidParameters(String),
}

/// On-disk digest record written next to the artifacts.
#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    vectorizer_sha256: String,
    classifier_sha256: String,
}

/// Loads and saves the fitted model artifacts.
///
/// The store owns a single directory holding `vectorizer.json`,
/// `classifier.json` and a `manifest.json` with their sha256 digests. The
/// trainer writes through [`ArtifactStore::save`]; the server reads once at
/// start-up through [`ArtifactStore::load`] and fails fast if anything is
/// missing or corrupt.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    model_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at the default model directory.
    pub fn new_default() -> io::Result<Self> {
        Self::new(Self::default_model_dir())
    }

    /// Returns the default model directory path
    pub fn default_model_dir() -> PathBuf {
        if let Ok(path) = env::var(MODEL_DIR_ENV) {
            return PathBuf::from(path);
        }
        PathBuf::from("models")
    }

    pub fn new<P: AsRef<Path>>(model_dir: P) -> io::Result<Self> {
        let model_dir = model_dir.as_ref().to_path_buf();
        fs::create_dir_all(&model_dir)?;
        Ok(Self { model_dir })
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn vectorizer_path(&self) -> PathBuf {
        self.model_dir.join(VECTORIZER_FILE)
    }

    pub fn classifier_path(&self) -> PathBuf {
        self.model_dir.join(CLASSIFIER_FILE)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.model_dir.join(MANIFEST_FILE)
    }

    /// Whether both artifacts and the manifest are present on disk.
    pub fn is_trained(&self) -> bool {
        self.vectorizer_path().exists()
            && self.classifier_path().exists()
            && self.manifest_path().exists()
    }

    fn read_verified(&self, path: &Path, expected_hash: &str, file_type: &str) -> Result<Vec<u8>, ArtifactError> {
        if !path.exists() {
            return Err(ArtifactError::NotFound(path.display().to_string()));
        }
        let bytes = fs::read(path)?;
        let hash = sha256_hex(&bytes);
        log::debug!("Verified {} artifact: {} bytes, sha256 {}", file_type, bytes.len(), hash);
        if hash != expected_hash {
            log::error!(
                "{} artifact hash mismatch: expected {}, got {}",
                file_type,
                expected_hash,
                hash
            );
            return Err(ArtifactError::HashMismatch {
                file_type: file_type.to_string(),
                expected: expected_hash.to_string(),
                actual: hash,
            });
        }
        Ok(bytes)
    }

    /// Loads and verifies the fitted pipeline.
    ///
    /// Every artifact is checked against the manifest digests before parsing.
    /// Any failure here is fatal to the server: it must not accept traffic
    /// with a missing or corrupt model.
    pub fn load(&self) -> Result<TriagePipeline, ArtifactError> {
        let manifest_path = self.manifest_path();
        if !manifest_path.exists() {
            return Err(ArtifactError::NotFound(manifest_path.display().to_string()));
        }
        let manifest: Manifest = serde_json::from_slice(&fs::read(&manifest_path)?)?;

        let vectorizer_bytes = self.read_verified(
            &self.vectorizer_path(),
            &manifest.vectorizer_sha256,
            "vectorizer",
        )?;
        let classifier_bytes = self.read_verified(
            &self.classifier_path(),
            &manifest.classifier_sha256,
            "classifier",
        )?;

        let vectorizer: TfidfVectorizer = serde_json::from_slice(&vectorizer_bytes)?;
        let classifier: LinearClassifier = serde_json::from_slice(&classifier_bytes)?;

        TriagePipeline::new(vectorizer, classifier)
            .map_err(|e| ArtifactError::InvalidParameters(e.to_string()))
    }

    /// Persists the fitted pipeline and writes the digest manifest.
    pub fn save(&self, pipeline: &TriagePipeline) -> Result<(), ArtifactError> {
        let vectorizer_bytes = serde_json::to_vec(pipeline.vectorizer())?;
        let classifier_bytes = serde_json::to_vec(pipeline.classifier())?;

        fs::write(self.vectorizer_path(), &vectorizer_bytes)?;
        fs::write(self.classifier_path(), &classifier_bytes)?;

        let manifest = Manifest {
            vectorizer_sha256: sha256_hex(&vectorizer_bytes),
            classifier_sha256: sha256_hex(&classifier_bytes),
        };
        fs::write(self.manifest_path(), serde_json::to_vec_pretty(&manifest)?)?;

        log::info!(
            "Saved model artifacts to {:?} ({} vectorizer bytes, {} classifier bytes)",
            self.model_dir,
            vectorizer_bytes.len(),
            classifier_bytes.len()
        );
        Ok(())
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{TriageLabel, DEFAULT_MAX_FEATURES};

    fn small_pipeline() -> TriagePipeline {
        let vectorizer =
            TfidfVectorizer::fit(&["mild headache", "severe chest pain"], DEFAULT_MAX_FEATURES);
        let dimension = vectorizer.dimension();
        let classifier = LinearClassifier::new(
            vec![TriageLabel::SelfMonitor, TriageLabel::Emergency],
            vec![vec![0.0; dimension], vec![1.0; dimension]],
            vec![0.0, 0.0],
        )
        .unwrap();
        TriagePipeline::new(vectorizer, classifier).unwrap()
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        assert!(!store.is_trained());

        store.save(&small_pipeline()).unwrap();
        assert!(store.is_trained());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.info().num_features, small_pipeline().info().num_features);
    }

    #[test]
    fn test_missing_artifacts_fail() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        assert!(matches!(store.load(), Err(ArtifactError::NotFound(_))));
    }

    fn replace_classifier_artifact(store: &ArtifactStore, body: &[u8]) {
        // Keep the manifest digests consistent so only the parameter shapes
        // are wrong.
        fs::write(store.classifier_path(), body).unwrap();
        let manifest = Manifest {
            vectorizer_sha256: sha256_hex(&fs::read(store.vectorizer_path()).unwrap()),
            classifier_sha256: sha256_hex(body),
        };
        fs::write(
            store.manifest_path(),
            serde_json::to_vec_pretty(&manifest).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn test_empty_parameter_artifact_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        store.save(&small_pipeline()).unwrap();

        replace_classifier_artifact(&store, br#"{"classes":[],"weights":[],"intercepts":[]}"#);
        assert!(store.load().is_err());
    }

    #[test]
    fn test_ragged_parameter_artifact_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        let pipeline = small_pipeline();
        store.save(&pipeline).unwrap();

        // Row 0 matches the vectorizer dimension; row 1 is short. This must
        // be rejected at load, never at scoring time.
        let dimension = pipeline.info().num_features;
        let bad = serde_json::json!({
            "classes": ["self-monitor", "emergency"],
            "weights": [vec![0.0f32; dimension], vec![0.0f32; 1]],
            "intercepts": [0.0, 0.0],
        });
        replace_classifier_artifact(&store, serde_json::to_string(&bad).unwrap().as_bytes());
        assert!(store.load().is_err());
    }

    #[test]
    fn test_corrupt_artifact_fails_hash_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path()).unwrap();
        store.save(&small_pipeline()).unwrap();

        fs::write(store.classifier_path(), b"corrupted data").unwrap();
        assert!(matches!(
            store.load(),
            Err(ArtifactError::HashMismatch { .. })
        ));
    }
}
