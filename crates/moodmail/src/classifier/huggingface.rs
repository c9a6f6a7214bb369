//! Hugging Face text-classification inference client.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::{ClassifierError, Result};
use super::{Classification, EmotionClassifier, LabelScore};

/// Maximum length of an error body kept in error messages.
const MAX_ERROR_BODY_LENGTH: usize = 200;

fn truncate_error_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... (truncated)", &body[..end])
    } else {
        body.to_string()
    }
}

/// Single-input responses come back either flat or wrapped in a batch.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceOutput {
    Batched(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

/// Decodes an inference response body into a ranked classification.
pub(crate) fn decode_response(body: Value) -> Result<Classification> {
    let output: InferenceOutput = serde_json::from_value(body.clone())
        .map_err(|e| ClassifierError::Decode(truncate_error_body(&format!("{}: {}", e, body))))?;

    match output {
        InferenceOutput::Flat(labels) => Ok(Classification::new(labels, body)),
        InferenceOutput::Batched(batches) => {
            let labels = batches.into_iter().next().unwrap_or_default();
            let raw = body
                .as_array()
                .and_then(|outer| outer.first().cloned())
                .unwrap_or_else(|| Value::Array(Vec::new()));
            Ok(Classification::new(labels, raw))
        }
    }
}

/// Calls a hosted text-classification model over HTTP.
///
/// No request timeout is configured: a slow model makes the calling
/// request slow.
pub struct HuggingFaceClassifier {
    client: Client,
    endpoint: String,
    token: Option<SecretString>,
}

impl HuggingFaceClassifier {
    /// Creates a client for `{base_url}/{model}`.
    pub fn new(base_url: &str, model: &str, token: Option<SecretString>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("moodmail/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClassifierError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/{}", base_url.trim_end_matches('/'), model.trim_matches('/')),
            token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl EmotionClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Result<Classification> {
        debug!("Classifying {} bytes via {}", text.len(), self.endpoint);

        let mut request = self.client.post(&self.endpoint).json(&json!({ "inputs": text }));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body: truncate_error_body(&body),
            });
        }

        let body: Value = response.json().await?;
        decode_response(body)
    }
}
