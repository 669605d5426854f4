use super::EngineOptions;
use super::completeness::Completeness;
use super::reach::{Reach, active_flow};
use super::resolver::Resolver;
use super::validation::{is_blank, normalize_leaf};
use crate::error::{StoreError, ValidationReason};
use crate::schema::{Field, FieldKind, Schema};
use crate::state::{AnswerView, FlowState, StoredAnswer, SubFlowRef};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// The effect of one accepted answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreOutcome {
    /// Ids of the answer records appended by this call.
    pub answer_ids: Vec<Uuid>,
    /// Field ids that are complete after this call: the answered field(s) and
    /// any enclosing group that is now satisfied.
    pub completed_ids: Vec<String>,
    /// Set when the answer was to a choice whose option opens a sub-flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_sub_flow: Option<SubFlowRef>,
    /// Set when this answer closed the active sub-flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exited_sub_flow: Option<SubFlowRef>,
}

/// Validates answers and records them in a `FlowState`.
pub(crate) struct AnswerProcessor<'s> {
    schema: &'s Schema,
    options: EngineOptions,
}

impl<'s> AnswerProcessor<'s> {
    pub(crate) fn new(schema: &'s Schema, options: EngineOptions) -> Self {
        Self { schema, options }
    }

    pub(crate) fn store(
        &self,
        state: &mut FlowState,
        question_id: &str,
        value: Value,
        at: DateTime<Utc>,
    ) -> Result<StoreOutcome, StoreError> {
        // Plan everything against a read-only view; the state is only touched
        // once every check has passed.
        let (field, records) = {
            let answers = AnswerView::new(state.answers());
            let reach = Reach::new(self.schema, &answers, state.active_sub_flow());
            let field = reach.find(question_id).ok_or_else(|| {
                let declared = !self.schema.index().ids_for_question(question_id).is_empty();
                tracing::warn!(
                    question = %question_id,
                    declared,
                    "answer for unreachable question"
                );
                StoreError::UnknownField {
                    question_id: question_id.to_string(),
                }
            })?;
            let records = self.plan(field, value)?;
            (field, records)
        };

        let mut outcome = StoreOutcome::default();
        for (target, value) in &records {
            let id = Uuid::new_v4();
            state.append(StoredAnswer {
                id,
                field_id: target.id.clone(),
                question_id: target.question_id.clone(),
                value: value.clone(),
                recorded_at: at,
            });
            outcome.answer_ids.push(id);
        }

        outcome.completed_ids = self.completed_after(state, field, &records);
        for id in &outcome.completed_ids {
            state.mark_completed(id);
        }

        if let FieldKind::Choice { .. } = &field.kind {
            let chosen = records.first().and_then(|(_, value)| value.as_str());
            match chosen.filter(|option| field.option_flow(option).is_some()) {
                Some(option) => {
                    let sub_flow = SubFlowRef::new(&field.question_id, option);
                    tracing::debug!(sub_flow = %sub_flow, "entering sub-flow");
                    state.set_active_sub_flow(Some(sub_flow.clone()));
                    outcome.new_sub_flow = Some(sub_flow);
                }
                None => {
                    if let Some(active) = state.active_sub_flow().cloned() {
                        if active.question_id == field.question_id {
                            tracing::debug!(sub_flow = %active, "choice changed, leaving sub-flow");
                            state.set_active_sub_flow(None);
                            outcome.exited_sub_flow = Some(active);
                        }
                    }
                }
            }
        }

        if let Some(active) = state.active_sub_flow().cloned() {
            if self.is_sub_flow_finished(state, &active) {
                tracing::debug!(sub_flow = %active, "sub-flow complete");
                state.set_active_sub_flow(None);
                outcome.exited_sub_flow = Some(active);
            }
        }

        tracing::debug!(
            question = %question_id,
            records = records.len(),
            completed = ?outcome.completed_ids,
            "answer stored"
        );
        Ok(outcome)
    }

    /// Turns one submitted value into the records to append. Group submissions
    /// are split into one record per child; any failing child rejects the whole
    /// submission.
    fn plan(&self, field: &'s Field, value: Value) -> Result<Vec<(&'s Field, Value)>, StoreError> {
        let reject = |field: &Field, reason: ValidationReason| {
            tracing::warn!(
                question = %field.question_id,
                reason = reason.code(),
                "answer rejected"
            );
            StoreError::Validation {
                question_id: field.question_id.clone(),
                reason,
            }
        };

        match &field.kind {
            FieldKind::Form { children } | FieldKind::Files { children }
                if !children.is_empty() =>
            {
                if is_blank(&value) {
                    return if field.required {
                        Err(reject(field, ValidationReason::Required))
                    } else {
                        Ok(vec![(field, Value::Null)])
                    };
                }
                let Value::Object(entries) = value else {
                    return Err(reject(field, ValidationReason::ExpectedObject));
                };
                let mut records = Vec::with_capacity(entries.len());
                for (key, child_value) in entries {
                    let child = children
                        .iter()
                        .find(|c| c.question_id == key)
                        .ok_or_else(|| reject(field, ValidationReason::UnknownChild { key }))?;
                    records.extend(self.plan(child, child_value)?);
                }
                Ok(records)
            }
            _ => {
                let pattern = self.schema.index().pattern(&field.id);
                normalize_leaf(field, value, pattern, self.options.trim_text)
                    .map(|normalized| vec![(field, normalized)])
                    .map_err(|reason| reject(field, reason))
            }
        }
    }

    /// The answered fields plus every enclosing group, filtered to those now complete.
    fn completed_after(
        &self,
        state: &FlowState,
        field: &'s Field,
        records: &[(&'s Field, Value)],
    ) -> Vec<String> {
        let answers = AnswerView::new(state.answers());
        let check = Completeness::new(self.schema, &answers, self.options.ask_optional_fields);
        let index = self.schema.index();

        let mut affected: Vec<&str> = Vec::new();
        for id in records
            .iter()
            .map(|(target, _)| target.id.as_str())
            .chain(std::iter::once(field.id.as_str()))
        {
            let mut current = Some(id);
            while let Some(id) = current {
                affected.push(id);
                current = index.parent_of(id);
            }
        }

        affected
            .into_iter()
            .unique()
            .filter_map(|id| self.schema.field(id))
            .filter(|f| check.is_complete(f))
            .map(|f| f.id.clone())
            .collect()
    }

    fn is_sub_flow_finished(&self, state: &FlowState, active: &SubFlowRef) -> bool {
        let answers = AnswerView::new(state.answers());
        let path = Reach::new(self.schema, &answers, None);
        match active_flow(path.fields(), active) {
            Some((_, sub_flow)) => {
                let check =
                    Completeness::new(self.schema, &answers, self.options.ask_optional_fields);
                Resolver::new(self.schema, check).is_flow_complete(sub_flow)
            }
            None => true,
        }
    }
}
