//! Test harness for running ingestion and reporting against a real database.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use moodmail::classifier::error::Result as ClassifierResult;
use moodmail::classifier::{Classification, LabelScore};
use moodmail::{ClassifierError, Database, EmotionClassifier};
use serde_json::json;
use tempfile::TempDir;

/// Classifier that replays queued outputs in order.
///
/// Each output is a list of `(label, score)` pairs; `None` simulates a
/// failed inference call. Once the queue is empty every call fails.
pub struct ScriptedClassifier {
    outputs: Mutex<VecDeque<Option<Vec<(String, f64)>>>>,
    inputs: Mutex<Vec<String>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self {
            outputs: Mutex::new(VecDeque::new()),
            inputs: Mutex::new(Vec::new()),
        }
    }

    /// Queues a response whose top label is `label`.
    pub fn then_label(self, label: &str) -> Self {
        self.then_scores(&[(label, 0.9), ("neutral", 0.05)])
    }

    pub fn then_scores(self, scores: &[(&str, f64)]) -> Self {
        let scores = scores.iter().map(|(l, s)| (l.to_string(), *s)).collect();
        self.outputs.lock().unwrap().push_back(Some(scores));
        self
    }

    pub fn then_fail(self) -> Self {
        self.outputs.lock().unwrap().push_back(None);
        self
    }

    /// Texts passed to `classify`, in call order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmotionClassifier for ScriptedClassifier {
    async fn classify(&self, text: &str) -> ClassifierResult<Classification> {
        self.inputs.lock().unwrap().push(text.to_string());
        let next = self.outputs.lock().unwrap().pop_front().flatten();

        match next {
            Some(scores) => {
                let raw = json!(scores
                    .iter()
                    .map(|(label, score)| json!({ "label": label, "score": score }))
                    .collect::<Vec<_>>());
                let labels = scores
                    .into_iter()
                    .map(|(label, score)| LabelScore { label, score })
                    .collect();
                Ok(Classification::new(labels, raw))
            }
            None => Err(ClassifierError::Status {
                status: 503,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

/// Isolated environment backed by a database file in a temp directory.
pub struct TestHarness {
    temp_dir: TempDir,
    pub db_path: PathBuf,
    pub db: Database,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let db_path = temp_dir.path().join("data").join("moodmail.db");
        let db = Database::open(&db_path).expect("Failed to open database");

        Self {
            temp_dir,
            db_path,
            db,
        }
    }

    /// Opens a second handle on the same file, as a restarted process would.
    pub fn reopen(&self) -> Database {
        Database::open(&self.db_path).expect("Failed to reopen database")
    }

    /// Writes a config file into the temp directory.
    pub fn write_config(&self, filename: &str, json: &str) -> PathBuf {
        let path = self.temp_dir.path().join(filename);
        std::fs::write(&path, json).expect("Failed to write config file");
        path
    }
}
