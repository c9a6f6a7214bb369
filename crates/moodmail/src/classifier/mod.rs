//! Emotion classification of free text.
//!
//! The [`EmotionClassifier`] trait is the seam between ingestion and the
//! external inference service. [`HuggingFaceClassifier`] is the production
//! implementation.

pub mod error;
pub mod huggingface;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use error::ClassifierError;
pub use huggingface::HuggingFaceClassifier;

use crate::taxonomy::UNKNOWN_LABEL;

/// A single fine-grained label and its confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Ranked classifier output.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Labels ordered by score, highest first.
    pub labels: Vec<LabelScore>,
    /// Service output kept for audit: the label list in the service's order.
    /// A batched `[[...]]` response is unwrapped to its first inner list.
    pub raw: Value,
}

impl Classification {
    /// Builds a classification, ranking `labels` by score.
    pub fn new(mut labels: Vec<LabelScore>, raw: Value) -> Self {
        labels.sort_by(|a, b| b.score.total_cmp(&a.score));
        Self { labels, raw }
    }

    /// Highest-scoring label, or `unknown` when the service returned none.
    pub fn top_label(&self) -> &str {
        self.labels
            .first()
            .map(|l| l.label.as_str())
            .unwrap_or(UNKNOWN_LABEL)
    }
}

/// Classifies text into fine-grained emotion labels.
#[async_trait]
pub trait EmotionClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> error::Result<Classification>;
}
