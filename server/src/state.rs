//! Shared handler state.

use std::sync::Arc;

use moodmail::{Database, EmotionClassifier};

/// State cloned into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub classifier: Arc<dyn EmotionClassifier>,
}

impl AppState {
    pub fn new(db: Database, classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self { db, classifier }
    }
}
