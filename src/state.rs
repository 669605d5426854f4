use ahash::{AHashMap, AHashSet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifies one branch of one choice field: `questionId:optionValue`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubFlowRef {
    pub question_id: String,
    pub option: String,
}

impl SubFlowRef {
    pub fn new(question_id: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            question_id: question_id.into(),
            option: option.into(),
        }
    }
}

impl fmt::Display for SubFlowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.question_id, self.option)
    }
}

impl FromStr for SubFlowRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((question_id, option)) if !question_id.is_empty() && !option.is_empty() => {
                Ok(SubFlowRef::new(question_id, option))
            }
            _ => Err(format!("'{}' is not a 'questionId:option' reference", s)),
        }
    }
}

impl TryFrom<String> for SubFlowRef {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SubFlowRef> for String {
    fn from(value: SubFlowRef) -> Self {
        value.to_string()
    }
}

/// One appended answer. Corrections append a new record; nothing is rewritten.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredAnswer {
    pub id: Uuid,
    pub field_id: String,
    pub question_id: String,
    pub value: Value,
    pub recorded_at: DateTime<Utc>,
}

/// Everything the engine knows about one conversation.
///
/// Callers own and persist this value; the engine only ever receives it by
/// reference and never keeps a copy between calls. Mutations from outside the
/// crate go through the engine, so the answer log stays append-only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowState {
    #[serde(default)]
    completed_fields: AHashSet<String>,
    #[serde(default)]
    collected_answers: Vec<StoredAnswer>,
    #[serde(default)]
    active_sub_flow: Option<SubFlowRef>,
}

impl FlowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field ids (not question ids) whose contract has been satisfied.
    pub fn completed_fields(&self) -> &AHashSet<String> {
        &self.completed_fields
    }

    pub fn is_completed(&self, field_id: &str) -> bool {
        self.completed_fields.contains(field_id)
    }

    /// The full answer log, oldest first.
    pub fn answers(&self) -> &[StoredAnswer] {
        &self.collected_answers
    }

    pub fn active_sub_flow(&self) -> Option<&SubFlowRef> {
        self.active_sub_flow.as_ref()
    }

    /// The authoritative answer for a field: the last one appended.
    pub fn latest_answer(&self, field_id: &str) -> Option<&StoredAnswer> {
        self.collected_answers
            .iter()
            .rev()
            .find(|a| a.field_id == field_id)
    }

    /// Every answer ever recorded for a field, oldest first.
    pub fn history<'a>(
        &'a self,
        field_id: &'a str,
    ) -> impl Iterator<Item = &'a StoredAnswer> + 'a {
        self.collected_answers
            .iter()
            .filter(move |a| a.field_id == field_id)
    }

    pub(crate) fn append(&mut self, answer: StoredAnswer) {
        self.collected_answers.push(answer);
    }

    pub(crate) fn mark_completed(&mut self, field_id: &str) {
        self.completed_fields.insert(field_id.to_string());
    }

    pub(crate) fn set_active_sub_flow(&mut self, sub_flow: Option<SubFlowRef>) {
        self.active_sub_flow = sub_flow;
    }
}

/// Latest value per field id, computed once per engine call.
pub(crate) struct AnswerView<'a> {
    latest: AHashMap<&'a str, (usize, &'a Value)>,
}

impl<'a> AnswerView<'a> {
    pub(crate) fn new(answers: &'a [StoredAnswer]) -> Self {
        let mut latest = AHashMap::with_capacity(answers.len());
        // Later records overwrite earlier ones: last write wins.
        for (position, answer) in answers.iter().enumerate() {
            latest.insert(answer.field_id.as_str(), (position, &answer.value));
        }
        Self { latest }
    }

    pub(crate) fn get(&self, field_id: &str) -> Option<&'a Value> {
        self.latest.get(field_id).map(|(_, value)| *value)
    }

    /// Log position of the field's latest record.
    pub(crate) fn position(&self, field_id: &str) -> Option<usize> {
        self.latest.get(field_id).map(|(position, _)| *position)
    }

    pub(crate) fn has(&self, field_id: &str) -> bool {
        self.latest.contains_key(field_id)
    }

    /// The answer as an option key, for choice lookups.
    pub(crate) fn get_str(&self, field_id: &str) -> Option<&'a str> {
        self.get(field_id).and_then(Value::as_str)
    }
}
