use crate::error::StoreError;
use crate::schema::{Completion, Field, Schema};
use crate::state::{AnswerView, FlowState};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;

mod completeness;
mod processor;
mod profile;
mod progress;
mod reach;
mod resolver;
mod validation;

use completeness::Completeness;
use processor::AnswerProcessor;
use reach::Reach;
use resolver::{Resolution, Resolver};

pub use processor::StoreOutcome;
pub use profile::{ProfileBuilder, ProfileTree};
pub use progress::Progress;

/// Behaviour switches for an [`Engine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Prompt optional fields once instead of silently skipping them. Storing a
    /// blank value for an optional field counts as skipping it.
    pub ask_optional_fields: bool,
    /// Trim surrounding whitespace from text answers before validating them.
    pub trim_text: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            ask_optional_fields: false,
            trim_text: true,
        }
    }
}

/// What the caller should do on this turn.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Turn {
    Ask { field: Field },
    Complete { completion: Option<Completion> },
}

/// Result of applying one candidate answer from a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOutcome {
    pub question_id: String,
    pub result: Result<StoreOutcome, StoreError>,
}

/// The conversation engine: a schema plus options, and no other state.
///
/// Every call takes the conversation's `FlowState` explicitly. The engine is
/// `Send + Sync` and can be shared across request threads; callers serialize
/// writes to any single conversation's state.
#[derive(Debug, Clone)]
pub struct Engine {
    schema: Schema,
    options: EngineOptions,
}

pub struct EngineBuilder {
    schema: Schema,
    options: EngineOptions,
}

impl EngineBuilder {
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            options: EngineOptions::default(),
        }
    }

    pub fn ask_optional_fields(mut self, enabled: bool) -> Self {
        self.options.ask_optional_fields = enabled;
        self
    }

    pub fn trim_text(mut self, enabled: bool) -> Self {
        self.options.trim_text = enabled;
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            schema: self.schema,
            options: self.options,
        }
    }
}

impl Engine {
    pub fn new(schema: Schema) -> Self {
        EngineBuilder::new(schema).build()
    }

    pub fn builder(schema: Schema) -> EngineBuilder {
        EngineBuilder::new(schema)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Whether `field`'s recorded answers satisfy its contract.
    pub fn is_complete(&self, field: &Field, state: &FlowState) -> bool {
        let answers = AnswerView::new(state.answers());
        self.completeness(&answers).is_complete(field)
    }

    /// The next field to ask, without touching the state.
    pub fn peek_next(&self, state: &FlowState) -> Option<Field> {
        self.resolve(state).prompt
    }

    /// The next field to ask, or `None` once every reachable required field is
    /// complete. Clears the active sub-flow once it has been fully answered.
    pub fn next_question(&self, state: &mut FlowState) -> Option<Field> {
        let Resolution {
            prompt,
            exit_active,
        } = self.resolve(state);
        if exit_active {
            state.set_active_sub_flow(None);
        }
        prompt
    }

    /// Like [`Engine::next_question`], but hands back the schema's completion
    /// block when there is nothing left to ask.
    pub fn next_turn(&self, state: &mut FlowState) -> Turn {
        match self.next_question(state) {
            Some(field) => Turn::Ask { field },
            None => Turn::Complete {
                completion: self.schema.completion().cloned(),
            },
        }
    }

    /// Validates and records an answer for a reachable question.
    ///
    /// On error the state is left exactly as it was.
    pub fn store(
        &self,
        state: &mut FlowState,
        question_id: &str,
        value: Value,
    ) -> Result<StoreOutcome, StoreError> {
        self.store_at(state, question_id, value, Utc::now())
    }

    /// [`Engine::store`] with an explicit timestamp for the answer record.
    pub fn store_at(
        &self,
        state: &mut FlowState,
        question_id: &str,
        value: Value,
        at: DateTime<Utc>,
    ) -> Result<StoreOutcome, StoreError> {
        AnswerProcessor::new(&self.schema, self.options).store(state, question_id, value, at)
    }

    /// Applies a batch of `{questionId → value}` candidates in schema order.
    ///
    /// Reachability is recomputed after every pass, so a choice and the answers
    /// for the sub-flow it opens can arrive together. Candidates that never
    /// become reachable are reported as unknown.
    pub fn store_candidates<I>(&self, state: &mut FlowState, candidates: I) -> Vec<CandidateOutcome>
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        let mut pending: Vec<(String, Value)> = candidates.into_iter().collect();
        let mut outcomes = Vec::with_capacity(pending.len());

        loop {
            let (ready, waiting): (Vec<_>, Vec<_>) = {
                let answers = AnswerView::new(state.answers());
                let reach = Reach::new(&self.schema, &answers, state.active_sub_flow());
                pending
                    .into_iter()
                    .map(|(question_id, value)| (reach.position(&question_id), question_id, value))
                    .partition(|(position, _, _)| position.is_some())
            };

            pending = waiting.into_iter().map(|(_, q, v)| (q, v)).collect();
            if ready.is_empty() {
                break;
            }

            let ready = ready
                .into_iter()
                .sorted_by_key(|(position, _, _)| *position);
            for (_, question_id, value) in ready {
                let result = self.store(state, &question_id, value);
                outcomes.push(CandidateOutcome {
                    question_id,
                    result,
                });
            }
        }

        outcomes.extend(pending.into_iter().map(|(question_id, _)| CandidateOutcome {
            result: Err(StoreError::UnknownField {
                question_id: question_id.clone(),
            }),
            question_id,
        }));
        outcomes
    }

    /// The nested profile built from the latest answer per field.
    pub fn profile(&self, state: &FlowState) -> ProfileTree {
        ProfileBuilder::new(&self.schema).build(state.answers())
    }

    pub fn progress(&self, state: &FlowState) -> Progress {
        let answers = AnswerView::new(state.answers());
        let reach = Reach::new(&self.schema, &answers, state.active_sub_flow());
        let total = reach.fields().len();
        let completed = reach
            .fields()
            .iter()
            .filter(|f| state.is_completed(&f.id))
            .count();
        let finished = self.resolve(state).prompt.is_none();
        Progress {
            completed,
            total,
            finished,
        }
    }

    /// Percentage complete along the current path, rounded.
    pub fn percent(&self, state: &FlowState) -> u8 {
        self.progress(state).percent()
    }

    fn completeness<'v>(&self, answers: &'v AnswerView<'v>) -> Completeness<'_, 'v> {
        Completeness::new(&self.schema, answers, self.options.ask_optional_fields)
    }

    fn resolve(&self, state: &FlowState) -> Resolution {
        let answers = AnswerView::new(state.answers());
        Resolver::new(&self.schema, self.completeness(&answers)).resolve(state.active_sub_flow())
    }
}
