use crate::schema::{Field, FieldKind, Schema};
use crate::state::{AnswerView, StoredAnswer};
use serde_json::{Map, Value};

/// Nested answers keyed by question id, mirroring the schema's group structure.
pub type ProfileTree = Map<String, Value>;

/// Rebuilds a structured profile from the flat answer log.
///
/// File fields are skipped: their data is held as attachment references by
/// whoever owns uploads. Sub-flow answers sit beside the choice that opened them.
pub struct ProfileBuilder<'s> {
    schema: &'s Schema,
}

impl<'s> ProfileBuilder<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Builds the tree. When a field was answered more than once, the last
    /// recorded value wins.
    pub fn build(&self, answers: &[StoredAnswer]) -> ProfileTree {
        let view = AnswerView::new(answers);
        let mut tree = Map::new();
        write_fields(self.schema.flow(), &view, &mut tree);
        tree
    }
}

fn write_fields(fields: &[Field], view: &AnswerView, out: &mut ProfileTree) {
    for field in fields {
        match &field.kind {
            FieldKind::Text { .. } | FieldKind::Number { .. } => {
                if let Some(value) = view.get(&field.id) {
                    out.insert(field.question_id.clone(), value.clone());
                }
            }
            FieldKind::Choice { .. } => {
                if let Some(value) = view.get(&field.id) {
                    out.insert(field.question_id.clone(), value.clone());
                }
                if let Some(sub_flow) = view
                    .get_str(&field.id)
                    .and_then(|option| field.option_flow(option))
                {
                    write_fields(sub_flow, view, out);
                }
            }
            FieldKind::Form { children } => {
                let mut nested = Map::new();
                write_fields(children, view, &mut nested);
                if !nested.is_empty() {
                    out.insert(field.question_id.clone(), Value::Object(nested));
                }
            }
            FieldKind::File | FieldKind::Files { .. } => {}
        }
    }
}
