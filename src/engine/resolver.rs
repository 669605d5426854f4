use super::completeness::Completeness;
use super::reach::{Reach, active_flow};
use crate::schema::{Field, FieldKind, Schema};
use crate::state::SubFlowRef;

/// What the resolver decided for one turn.
pub(crate) struct Resolution {
    pub(crate) prompt: Option<Field>,
    /// The active sub-flow is finished (or gone) and should be cleared.
    pub(crate) exit_active: bool,
}

/// Walks the schema depth-first and finds the single next field to present.
pub(crate) struct Resolver<'s, 'v> {
    schema: &'s Schema,
    check: Completeness<'s, 'v>,
}

impl<'s, 'v> Resolver<'s, 'v> {
    pub(crate) fn new(schema: &'s Schema, check: Completeness<'s, 'v>) -> Self {
        Self { schema, check }
    }

    pub(crate) fn resolve(&self, active: Option<&SubFlowRef>) -> Resolution {
        let mut exit_active = false;

        // Continue an already-open sub-flow before anything else.
        if let Some(active) = active {
            let path = Reach::new(self.schema, self.check.answers(), None);
            match active_flow(path.fields(), active) {
                Some((_, sub_flow)) => match self.first_pending(sub_flow) {
                    Some(prompt) => {
                        tracing::debug!(
                            sub_flow = %active,
                            field = %prompt.id,
                            "continuing sub-flow"
                        );
                        return Resolution {
                            prompt: Some(prompt),
                            exit_active: false,
                        };
                    }
                    None => {
                        tracing::debug!(
                            sub_flow = %active,
                            "sub-flow complete, returning to main flow"
                        );
                        exit_active = true;
                    }
                },
                None => {
                    tracing::warn!(
                        sub_flow = %active,
                        "active sub-flow is not reachable, clearing it"
                    );
                    exit_active = true;
                }
            }
        }

        let prompt = self.first_pending(self.schema.flow());
        match &prompt {
            Some(field) => {
                tracing::debug!(
                    field = %field.id,
                    question = %field.question_id,
                    "next question"
                )
            }
            None => tracing::debug!("flow complete"),
        }
        Resolution {
            prompt,
            exit_active,
        }
    }

    /// The first field in `fields` (recursing into selected sub-flows) that still
    /// needs an answer.
    pub(crate) fn first_pending(&self, fields: &[Field]) -> Option<Field> {
        fields.iter().find_map(|field| self.pending(field))
    }

    pub(crate) fn is_flow_complete(&self, fields: &[Field]) -> bool {
        self.first_pending(fields).is_none()
    }

    fn pending(&self, field: &Field) -> Option<Field> {
        match &field.kind {
            FieldKind::Text { .. } | FieldKind::Number { .. } | FieldKind::File => {
                self.check.needs_answer(field).then(|| field.clone())
            }
            FieldKind::Choice { .. } => {
                if self.check.needs_answer(field) {
                    return Some(field.clone());
                }
                // Entering a sub-flow for the first time: its fields come before
                // any later top-level sibling.
                self.check
                    .answers()
                    .get_str(&field.id)
                    .and_then(|option| field.option_flow(option))
                    .and_then(|sub_flow| self.first_pending(sub_flow))
            }
            FieldKind::Form { .. } => {
                if !self.check.needs_answer(field) {
                    return None;
                }
                if !self.check.is_touched(field) {
                    return Some(field.clone());
                }
                // Re-prompt with only what is still missing.
                Some(field.with_children_where(|child| self.check.is_missing_child(child)))
            }
            // Files are never asked slot by slot.
            FieldKind::Files { .. } => self.check.needs_answer(field).then(|| field.clone()),
        }
    }
}
