use super::validation::normalize_leaf;
use crate::schema::{Field, FieldKind, Schema};
use crate::state::AnswerView;
use serde_json::Value;

/// Decides whether a field's stored answers satisfy its contract.
pub(crate) struct Completeness<'s, 'v> {
    schema: &'s Schema,
    answers: &'v AnswerView<'v>,
    ask_optional: bool,
}

impl<'s, 'v> Completeness<'s, 'v> {
    pub(crate) fn new(schema: &'s Schema, answers: &'v AnswerView<'v>, ask_optional: bool) -> Self {
        Self {
            schema,
            answers,
            ask_optional,
        }
    }

    pub(crate) fn answers(&self) -> &'v AnswerView<'v> {
        self.answers
    }

    /// Whether the field's stored answer(s) are present and valid.
    ///
    /// - leaves: the latest value passes the same checks a fresh answer would;
    ///   a blank value passes only when the field is optional
    /// - `form`: every required child is complete
    /// - `files`: every required slot holds a reference; a childless `files`
    ///   field is judged like a leaf
    /// - an optional group that was skipped with a blank answer is complete
    pub(crate) fn is_complete(&self, field: &Field) -> bool {
        let complete = match &field.kind {
            FieldKind::Text { .. }
            | FieldKind::Number { .. }
            | FieldKind::Choice { .. }
            | FieldKind::File => self.leaf_complete(field),
            FieldKind::Files { children } if children.is_empty() => self.leaf_complete(field),
            FieldKind::Form { children } | FieldKind::Files { children } => {
                self.is_skipped(field)
                    || children
                        .iter()
                        .all(|child| !child.required || self.is_complete(child))
            }
        };
        tracing::trace!(field = %field.id, complete, "completeness evaluated");
        complete
    }

    fn leaf_complete(&self, field: &Field) -> bool {
        match self.answers.get(&field.id) {
            None => false,
            Some(value) => normalize_leaf(
                field,
                value.clone(),
                self.schema.index().pattern(&field.id),
                false,
            )
            .is_ok(),
        }
    }

    /// An optional group whose latest record is a blank skip, with nothing
    /// recorded for any of its children since.
    fn is_skipped(&self, field: &Field) -> bool {
        if field.required || !field.is_group() {
            return false;
        }
        match (self.answers.get(&field.id), self.answers.position(&field.id)) {
            (Some(Value::Null), Some(skipped_at)) => !field
                .children()
                .iter()
                .any(|child| self.touched_after(child, skipped_at)),
            _ => false,
        }
    }

    fn touched_after(&self, field: &Field, position: usize) -> bool {
        self.answers
            .position(&field.id)
            .is_some_and(|p| p > position)
            || field
                .children()
                .iter()
                .any(|child| self.touched_after(child, position))
    }

    /// Whether anything has been recorded for the field or, for groups, any child.
    pub(crate) fn is_touched(&self, field: &Field) -> bool {
        self.answers.has(&field.id) || field.children().iter().any(|c| self.is_touched(c))
    }

    /// Whether the resolver should stop at this field.
    pub(crate) fn needs_answer(&self, field: &Field) -> bool {
        let touched = self.is_touched(field);
        if !touched && self.ask_optional && has_optional_content(field) {
            return true;
        }
        if !touched && !field.required {
            return false;
        }
        !self.is_complete(field)
    }

    /// A required child that still blocks its group.
    pub(crate) fn is_missing_child(&self, child: &Field) -> bool {
        child.required && !self.is_complete(child)
    }
}

fn has_optional_content(field: &Field) -> bool {
    !field.required || field.children().iter().any(has_optional_content)
}
