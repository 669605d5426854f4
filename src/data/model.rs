use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;

/// Candidate answers from an extraction step, keyed by question id.
///
/// This mirrors what a language-model extraction or a structured UI submission
/// hands over: `{ "name": "Al", "role": "a", "extra": "x" }`. The engine applies
/// them in schema order regardless of key order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct AnswerSheet {
    answers: Map<String, Value>,
}

impl AnswerSheet {
    /// Load candidate answers from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let answers = serde_json::from_str(json)?;
        Ok(Self { answers })
    }

    pub fn insert(&mut self, question_id: impl Into<String>, value: Value) {
        self.answers.insert(question_id.into(), value);
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Consumes the sheet into `(questionId, value)` pairs for `Engine::store_candidates`.
    pub fn into_candidates(self) -> impl Iterator<Item = (String, Value)> {
        self.answers.into_iter()
    }
}
