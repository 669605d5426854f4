use super::{Field, FieldKind};
use crate::error::SchemaError;
use ahash::AHashMap;
use regex::Regex;

/// One step from a field down to a nested field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathStep {
    Child(usize),
    Branch { option: String, position: usize },
}

/// Where a field lives inside the schema tree.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub(crate) root: usize,
    pub(crate) steps: Vec<PathStep>,
    /// The enclosing `form` or `files` field, if any.
    pub parent: Option<String>,
}

/// Lookup tables built once per schema load and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct FieldIndex {
    entries: AHashMap<String, IndexEntry>,
    by_question: AHashMap<String, Vec<String>>,
    patterns: AHashMap<String, Regex>,
}

impl FieldIndex {
    pub(crate) fn build(flow: &[Field]) -> Result<Self, SchemaError> {
        let mut index = FieldIndex::default();
        for (root, field) in flow.iter().enumerate() {
            index.insert(field, root, Vec::new(), None)?;
        }
        Ok(index)
    }

    fn insert(
        &mut self,
        field: &Field,
        root: usize,
        steps: Vec<PathStep>,
        parent: Option<String>,
    ) -> Result<(), SchemaError> {
        if self.entries.contains_key(&field.id) {
            return Err(SchemaError::DuplicateFieldId(field.id.clone()));
        }

        if let FieldKind::Text { validation } = &field.kind {
            if let Some(pattern) = &validation.pattern {
                let regex = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
                    field_id: field.id.clone(),
                    message: e.to_string(),
                })?;
                self.patterns.insert(field.id.clone(), regex);
            }
        }

        self.entries.insert(
            field.id.clone(),
            IndexEntry {
                root,
                steps: steps.clone(),
                parent,
            },
        );
        self.by_question
            .entry(field.question_id.clone())
            .or_default()
            .push(field.id.clone());

        match &field.kind {
            FieldKind::Form { children } | FieldKind::Files { children } => {
                for (i, child) in children.iter().enumerate() {
                    let mut child_steps = steps.clone();
                    child_steps.push(PathStep::Child(i));
                    self.insert(child, root, child_steps, Some(field.id.clone()))?;
                }
            }
            FieldKind::Choice { option_flows, .. } => {
                for (option, sub_flow) in option_flows {
                    for (position, sub_field) in sub_flow.iter().enumerate() {
                        let mut sub_steps = steps.clone();
                        sub_steps.push(PathStep::Branch {
                            option: option.clone(),
                            position,
                        });
                        self.insert(sub_field, root, sub_steps, None)?;
                    }
                }
            }
            FieldKind::Text { .. } | FieldKind::Number { .. } | FieldKind::File => {}
        }
        Ok(())
    }

    pub fn entry(&self, field_id: &str) -> Option<&IndexEntry> {
        self.entries.get(field_id)
    }

    pub fn parent_of(&self, field_id: &str) -> Option<&str> {
        self.entries.get(field_id)?.parent.as_deref()
    }

    /// Every field id declared with this question id, across all branches.
    pub fn ids_for_question(&self, question_id: &str) -> &[String] {
        self.by_question
            .get(question_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn pattern(&self, field_id: &str) -> Option<&Regex> {
        self.patterns.get(field_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Follows an index entry back down to the field it describes.
pub(crate) fn locate<'a>(flow: &'a [Field], entry: &IndexEntry) -> Option<&'a Field> {
    let mut current = flow.get(entry.root)?;
    for step in &entry.steps {
        current = match step {
            PathStep::Child(i) => current.children().get(*i)?,
            PathStep::Branch { option, position } => current.option_flow(option)?.get(*position)?,
        };
    }
    Some(current)
}
