//! Classifier error types.

use thiserror::Error;

/// Errors that can occur while classifying text.
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),

    /// Transport-level failure talking to the inference endpoint.
    #[error("Inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("Inference endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected label/score shape.
    #[error("Unexpected inference response: {0}")]
    Decode(String),
}

/// Result type for classifier operations.
pub type Result<T> = std::result::Result<T, ClassifierError>;
