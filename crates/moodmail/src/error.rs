use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoodmailError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Classifier error: {0}")]
    Classifier(#[from] crate::classifier::ClassifierError),

    #[error("Logging setup failed: {0}")]
    Logging(String),

    #[error("IO error ({context}): {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Failed to resolve secret: {0}")]
    Secret(#[from] crate::secrets::SecretError),
}

pub type Result<T> = std::result::Result<T, MoodmailError>;
