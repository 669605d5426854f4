use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_.-]+)\}").expect("placeholder pattern is valid"));

/// What callers show once every reachable question has been answered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub message: String,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(rename = "type", default)]
    pub completion_type: String,
}

impl Completion {
    /// Substitutes `{questionId}` placeholders with top-level scalar profile values.
    /// Placeholders without a matching scalar are left as written.
    pub fn render(&self, profile: &Map<String, Value>) -> String {
        PLACEHOLDER
            .replace_all(&self.message, |caps: &Captures| {
                match profile.get(&caps[1]) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
