pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod secrets;
pub mod taxonomy;
pub mod time_range;

pub use classifier::{Classification, ClassifierError, EmotionClassifier, HuggingFaceClassifier};
pub use config::{load_config, resolve_config, Config};
pub use db::{Database, DatabaseError};
pub use error::{ConfigError, MoodmailError, Result};
pub use ingest::{ingest, InboundEmail, IngestError};
pub use metrics::MetricsError;
pub use secrets::{resolve_secret, resolve_secret_optional, SecretError};
pub use taxonomy::{map_label, Emotion};
pub use time_range::{InvalidTimeBound, TimeRange};
