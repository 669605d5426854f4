use crate::schema::{Field, FieldKind, Schema};
use crate::state::{AnswerView, SubFlowRef};

/// The fields a conversation can currently reach, in traversal order.
///
/// That is the main flow with its group children, plus the option flow picked
/// by the latest answer of every choice on the way, plus the active sub-flow.
pub(crate) struct Reach<'s> {
    fields: Vec<&'s Field>,
}

impl<'s> Reach<'s> {
    pub(crate) fn new(
        schema: &'s Schema,
        answers: &AnswerView,
        active: Option<&SubFlowRef>,
    ) -> Self {
        let mut fields = Vec::new();
        visit_path(schema.flow(), answers, &mut |field| fields.push(field));

        if let Some(active) = active {
            if let Some((owner, sub_flow)) = active_flow(&fields, active) {
                if answers.get_str(&owner.id) != Some(active.option.as_str()) {
                    visit_path(sub_flow, answers, &mut |field| fields.push(field));
                }
            }
        }
        Self { fields }
    }

    pub(crate) fn fields(&self) -> &[&'s Field] {
        &self.fields
    }

    pub(crate) fn find(&self, question_id: &str) -> Option<&'s Field> {
        self.fields
            .iter()
            .find(|f| f.question_id == question_id)
            .copied()
    }

    /// Position of the field in traversal order.
    pub(crate) fn position(&self, question_id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.question_id == question_id)
    }
}

fn visit_path<'s, F>(fields: &'s [Field], answers: &AnswerView, visit: &mut F)
where
    F: FnMut(&'s Field),
{
    for field in fields {
        visit(field);
        match &field.kind {
            FieldKind::Form { children } | FieldKind::Files { children } => {
                visit_path(children, answers, visit)
            }
            FieldKind::Choice { .. } => {
                if let Some(sub_flow) = answers
                    .get_str(&field.id)
                    .and_then(|option| field.option_flow(option))
                {
                    visit_path(sub_flow, answers, visit);
                }
            }
            FieldKind::Text { .. } | FieldKind::Number { .. } | FieldKind::File => {}
        }
    }
}

/// Resolves a `questionId:option` reference to its owning choice and sub-flow,
/// among the given candidate fields.
pub(crate) fn active_flow<'s>(
    candidates: &[&'s Field],
    active: &SubFlowRef,
) -> Option<(&'s Field, &'s [Field])> {
    candidates.iter().find_map(|field| {
        if field.question_id != active.question_id {
            return None;
        }
        field
            .option_flow(&active.option)
            .map(|sub_flow| (*field, sub_flow))
    })
}
