use super::definition::{FieldDefinition, Scalar, SchemaDefinition, ValidationDefinition};
use super::{
    ChoiceOption, Completion, Field, FieldIndex, FieldKind, FieldOrder, FieldType, NumberBounds,
    Schema, TextRules,
};
use crate::error::SchemaError;
use itertools::Itertools;
use std::collections::BTreeMap;

/// Validates a `SchemaDefinition` and turns it into a traversable `Schema`.
///
/// Every structural check happens here, once. The engine assumes a schema that
/// made it through `build` is well formed and never re-validates it.
pub struct SchemaBuilder {
    definition: SchemaDefinition,
    completion: Option<Completion>,
}

impl SchemaBuilder {
    pub fn new(definition: SchemaDefinition) -> Self {
        Self {
            completion: definition.completion.clone(),
            definition,
        }
    }

    /// Replaces the completion block declared in the document, if any.
    pub fn with_completion(mut self, completion: Completion) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn build(self) -> Result<Schema, SchemaError> {
        let flow = convert_siblings(&self.definition.flow, "flow", false)?;
        let index = FieldIndex::build(&flow)?;
        check_question_scope(&flow, &[])?;

        tracing::debug!(
            fields = index.len(),
            top_level = flow.len(),
            "schema loaded"
        );

        Ok(Schema {
            flow,
            completion: self.completion,
            index,
        })
    }
}

fn convert_siblings(
    definitions: &[FieldDefinition],
    parent: &str,
    in_group: bool,
) -> Result<Vec<Field>, SchemaError> {
    let mut fields = definitions
        .iter()
        .enumerate()
        .map(|(position, def)| convert_field(def, position, in_group))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(order) = fields.iter().map(|f| &f.order).duplicates().next() {
        let field_ids = fields
            .iter()
            .filter(|f| &f.order == order)
            .map(|f| f.id.clone())
            .collect();
        return Err(SchemaError::DuplicateOrder {
            parent: parent.to_string(),
            order: order.to_string(),
            field_ids,
        });
    }

    fields.sort_by(|a, b| a.order.cmp(&b.order));
    Ok(fields)
}

fn convert_field(
    def: &FieldDefinition,
    position: usize,
    in_group: bool,
) -> Result<Field, SchemaError> {
    let id = def.id.to_string();
    let field_type: FieldType =
        def.field_type
            .parse()
            .map_err(|_| SchemaError::UnknownFieldType {
                field_id: id.clone(),
                type_name: def.field_type.clone(),
            })?;

    let misplaced = |attribute: &'static str| SchemaError::MisplacedAttribute {
        field_id: id.clone(),
        type_name: field_type.to_string(),
        attribute,
    };

    if !def.options.is_empty() && field_type != FieldType::Choice {
        return Err(misplaced("options"));
    }
    if !def.option_flows.is_empty() && field_type != FieldType::Choice {
        return Err(misplaced("option flows"));
    }
    if !def.children.is_empty() && !matches!(field_type, FieldType::Form | FieldType::Files) {
        return Err(misplaced("children"));
    }
    let validation = def.validation.clone().unwrap_or_default();
    if validation.has_text_rules() && field_type != FieldType::Text {
        return Err(misplaced("length or pattern validation"));
    }
    if validation.has_number_bounds() && field_type != FieldType::Number {
        return Err(misplaced("numeric bounds"));
    }

    let order = match &def.order {
        None => FieldOrder::from_index(position as i64 + 1),
        Some(Scalar::Integer(n)) => FieldOrder::from_index(*n),
        Some(Scalar::Text(s)) => s.parse().map_err(|_| SchemaError::InvalidOrder {
            field_id: id.clone(),
            order: s.clone(),
        })?,
    };

    let kind = match field_type {
        FieldType::Text => FieldKind::Text {
            validation: text_rules(&id, validation)?,
        },
        FieldType::Number => FieldKind::Number {
            validation: number_bounds(&id, validation)?,
        },
        FieldType::Choice => {
            if in_group && !def.option_flows.is_empty() {
                return Err(misplaced("option flows inside a group"));
            }
            let options: Vec<ChoiceOption> = def
                .options
                .iter()
                .map(|opt| {
                    let value = opt.value.to_string();
                    ChoiceOption {
                        label: opt.label.clone().unwrap_or_else(|| value.clone()),
                        value,
                    }
                })
                .collect();
            let mut option_flows = BTreeMap::new();
            for (option, sub_flow) in &def.option_flows {
                if !options.is_empty() && !options.iter().any(|o| &o.value == option) {
                    return Err(SchemaError::DanglingOptionFlow {
                        field_id: id.clone(),
                        option: option.clone(),
                    });
                }
                if sub_flow.is_empty() {
                    return Err(SchemaError::EmptyOptionFlow {
                        field_id: id.clone(),
                        option: option.clone(),
                    });
                }
                let label = format!("{}:{}", def.question_id, option);
                option_flows.insert(option.clone(), convert_siblings(sub_flow, &label, false)?);
            }
            FieldKind::Choice {
                options,
                option_flows,
            }
        }
        FieldType::Form => FieldKind::Form {
            children: convert_siblings(&def.children, &id, true)?,
        },
        FieldType::File => FieldKind::File,
        FieldType::Files => {
            let children = convert_siblings(&def.children, &id, true)?;
            if let Some(slot) = children
                .iter()
                .find(|c| c.field_type() != FieldType::File)
            {
                return Err(SchemaError::InvalidSlot {
                    field_id: id.clone(),
                    slot_id: slot.id.clone(),
                    type_name: slot.field_type().to_string(),
                });
            }
            FieldKind::Files { children }
        }
    };

    Ok(Field {
        id,
        order,
        question_id: def.question_id.clone(),
        required: def.required,
        question: def.question.clone(),
        placeholder: def.placeholder.clone(),
        kind,
    })
}

fn text_rules(id: &str, validation: ValidationDefinition) -> Result<TextRules, SchemaError> {
    if let (Some(min), Some(max)) = (validation.min_length, validation.max_length) {
        if min > max {
            return Err(SchemaError::InvalidBounds {
                field_id: id.to_string(),
                message: format!("minLength {} exceeds maxLength {}", min, max),
            });
        }
    }
    Ok(TextRules {
        min_length: validation.min_length,
        max_length: validation.max_length,
        pattern: validation.pattern,
    })
}

fn number_bounds(id: &str, validation: ValidationDefinition) -> Result<NumberBounds, SchemaError> {
    if let (Some(min), Some(max)) = (validation.min, validation.max) {
        if min > max {
            return Err(SchemaError::InvalidBounds {
                field_id: id.to_string(),
                message: format!("min {} exceeds max {}", min, max),
            });
        }
    }
    Ok(NumberBounds {
        min: validation.min,
        max: validation.max,
    })
}

/// Question ids answered on the same path: the given fields plus their group
/// children, but not the contents of option flows.
fn path_questions(fields: &[Field]) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    for field in fields {
        out.push((field.question_id.as_str(), field.id.as_str()));
        out.extend(path_questions(field.children()));
    }
    out
}

/// Every question id a choice can put on the path, across all of its options.
/// Options of one choice exclude each other, so each id is listed once.
fn branch_questions(choice: &Field) -> Vec<(&str, &str)> {
    let FieldKind::Choice { option_flows, .. } = &choice.kind else {
        return Vec::new();
    };
    option_flows
        .values()
        .flat_map(|sub_flow| {
            let mut questions = path_questions(sub_flow);
            questions.extend(sub_flow.iter().flat_map(branch_questions));
            questions
        })
        .unique_by(|(question_id, _)| *question_id)
        .collect()
}

/// Checks that no question id is reachable twice along any branch. Options of
/// the same choice may reuse a question id; flows of two different choices on
/// one path may not, since both can be open at once.
fn check_question_scope<'a>(
    fields: &'a [Field],
    inherited: &[(&'a str, &'a str)],
) -> Result<(), SchemaError> {
    let mut scope = inherited.to_vec();
    scope.extend(path_questions(fields));
    ensure_unique(&scope)?;

    for (position, field) in fields.iter().enumerate() {
        if let FieldKind::Choice { option_flows, .. } = &field.kind {
            let mut branch_scope = scope.clone();
            for (other_position, other) in fields.iter().enumerate() {
                if other_position != position {
                    branch_scope.extend(branch_questions(other));
                }
            }
            ensure_unique(&branch_scope)?;
            for sub_flow in option_flows.values() {
                check_question_scope(sub_flow, &branch_scope)?;
            }
        }
    }
    Ok(())
}

fn ensure_unique(scope: &[(&str, &str)]) -> Result<(), SchemaError> {
    match scope.iter().map(|(q, _)| *q).duplicates().next() {
        Some(question_id) => Err(SchemaError::AmbiguousQuestionId {
            question_id: question_id.to_string(),
            field_ids: scope
                .iter()
                .filter(|(q, _)| *q == question_id)
                .map(|(_, id)| id.to_string())
                .sorted()
                .collect(),
        }),
        None => Ok(()),
    }
}
