use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod error;
mod model;
mod pipeline;
mod store;
mod vectorizer;

pub use error::ClassifierError;
pub use model::LinearClassifier;
pub use pipeline::{PipelineInfo, TriagePipeline, MAX_INPUT_BYTES};
pub use store::{ArtifactError, ArtifactStore};
pub use vectorizer::{TfidfVectorizer, DEFAULT_MAX_FEATURES};

/// The closed set of triage categories the classifier can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriageLabel {
    /// Symptoms that can be watched at home
    SelfMonitor,
    /// Symptoms that warrant a routine doctor visit
    Doctor,
    /// Symptoms that need same-day urgent care
    UrgentCare,
    /// Symptoms that need emergency services
    Emergency,
}

impl TriageLabel {
    /// All labels, in canonical order.
    pub const ALL: [TriageLabel; 4] = [
        TriageLabel::SelfMonitor,
        TriageLabel::Doctor,
        TriageLabel::UrgentCare,
        TriageLabel::Emergency,
    ];

    /// The wire/CSV spelling of the label.
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageLabel::SelfMonitor => "self-monitor",
            TriageLabel::Doctor => "doctor",
            TriageLabel::UrgentCare => "urgent-care",
            TriageLabel::Emergency => "emergency",
        }
    }
}

impl fmt::Display for TriageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TriageLabel {
    type Err = ClassifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "self-monitor" => Ok(TriageLabel::SelfMonitor),
            "doctor" => Ok(TriageLabel::Doctor),
            "urgent-care" => Ok(TriageLabel::UrgentCare),
            "emergency" => Ok(TriageLabel::Emergency),
            other => Err(ClassifierError::ValidationError(format!(
                "Unknown triage label: {}",
                other
            ))),
        }
    }
}
