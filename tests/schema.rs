//! Tests for schema loading and structural validation.
mod common;
use common::*;
use monshin::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::json;

fn load_err(schema: serde_json::Value) -> SchemaError {
    Schema::from_json(&schema.to_string()).expect_err("schema should be rejected")
}

#[test]
fn test_loads_every_field_into_index() {
    let schema = load(onboarding_schema());
    // 12 in the main tree, 4 across the business branch
    assert_eq!(schema.index().len(), 16);
    assert_eq!(schema.flow().len(), 7);

    let vat_id = schema.field("vat_id").expect("nested sub-flow field is indexed");
    assert_eq!(vat_id.question_id, "vat_id");
    assert_eq!(
        schema.parent("street").map(|f| f.id.as_str()),
        Some("address")
    );
    assert!(schema.parent("company").is_none());

    let documents = schema.field("documents").expect("documents exists");
    assert!(documents.is_group() && documents.holds_attachments());
    assert_eq!(documents.field_type(), FieldType::Files);
    assert_eq!(
        schema.index().ids_for_question("vat_registered"),
        &["vat".to_string()]
    );
}

#[test]
fn test_siblings_sorted_by_dotted_order() {
    let schema = load(json!({
        "flow": [
            { "id": "c", "order": "2.10", "questionId": "c", "type": "text" },
            { "id": "a", "order": 1, "questionId": "a", "type": "text" },
            { "id": "d", "order": "2.9", "questionId": "d", "type": "text" },
            { "id": "b", "order": "2", "questionId": "b", "type": "text" }
        ]
    }));
    let ids: Vec<&str> = schema.flow().iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "d", "c"]);
}

#[test]
fn test_missing_order_defaults_to_position() {
    let schema = load(example_schema());
    assert_eq!(schema.flow()[0].order, FieldOrder::from_index(1));
    assert_eq!(schema.flow()[1].order, FieldOrder::from_index(2));
}

#[test]
fn test_numeric_ids_and_option_values() {
    let schema = load(json!({
        "flow": [
            { "id": 7, "questionId": "size", "type": "choice",
              "options": [{ "value": 1, "label": "Small" }, { "value": 2 }] }
        ]
    }));
    let field = schema.field("7").expect("numeric id is stringified");
    match &field.kind {
        FieldKind::Choice { options, .. } => {
            assert_eq!(options[0].value, "1");
            assert_eq!(options[0].label, "Small");
            assert_eq!(options[1].label, "2");
        }
        other => panic!("expected a choice, got {:?}", other),
    }
}

#[test]
fn test_rejects_duplicate_ids() {
    let err = load_err(json!({
        "flow": [
            { "id": "1", "questionId": "a", "type": "text" },
            { "id": "1", "questionId": "b", "type": "text" }
        ]
    }));
    assert_eq!(err, SchemaError::DuplicateFieldId("1".to_string()));
}

#[test]
fn test_rejects_duplicate_sibling_orders() {
    let err = load_err(json!({
        "flow": [
            { "id": "1", "order": 1, "questionId": "a", "type": "text" },
            { "id": "2", "order": "1", "questionId": "b", "type": "text" }
        ]
    }));
    assert!(matches!(err, SchemaError::DuplicateOrder { ref field_ids, .. } if field_ids.len() == 2));
}

#[test]
fn test_rejects_dangling_option_flow() {
    let err = load_err(json!({
        "flow": [
            { "id": "1", "questionId": "role", "type": "choice",
              "options": [{ "value": "a" }],
              "optionFlows": { "z": [{ "id": "2", "questionId": "x", "type": "text" }] } }
        ]
    }));
    assert_eq!(
        err,
        SchemaError::DanglingOptionFlow {
            field_id: "1".to_string(),
            option: "z".to_string()
        }
    );
}

#[test]
fn test_rejects_invalid_pattern() {
    let err = load_err(json!({
        "flow": [
            { "id": "1", "questionId": "a", "type": "text", "validation": { "pattern": "([" } }
        ]
    }));
    assert!(matches!(err, SchemaError::InvalidPattern { ref field_id, .. } if field_id == "1"));
}

#[test]
fn test_rejects_misplaced_attributes() {
    let children_on_text = load_err(json!({
        "flow": [
            { "id": "1", "questionId": "a", "type": "text",
              "children": [{ "id": "2", "questionId": "b", "type": "text" }] }
        ]
    }));
    assert!(matches!(
        children_on_text,
        SchemaError::MisplacedAttribute { attribute: "children", .. }
    ));

    let bounds_on_text = load_err(json!({
        "flow": [{ "id": "1", "questionId": "a", "type": "text", "validation": { "min": 1 } }]
    }));
    assert!(matches!(
        bounds_on_text,
        SchemaError::MisplacedAttribute { attribute: "numeric bounds", .. }
    ));

    let flow_inside_form = load_err(json!({
        "flow": [
            { "id": "1", "questionId": "g", "type": "form", "children": [
                { "id": "2", "questionId": "c", "type": "choice",
                  "options": [{ "value": "x" }],
                  "optionFlows": { "x": [{ "id": "3", "questionId": "d", "type": "text" }] } }
            ]}
        ]
    }));
    assert!(matches!(
        flow_inside_form,
        SchemaError::MisplacedAttribute { attribute: "option flows inside a group", .. }
    ));
}

#[test]
fn test_rejects_non_file_slots() {
    let err = load_err(json!({
        "flow": [
            { "id": "docs", "questionId": "docs", "type": "files",
              "children": [{ "id": "s", "questionId": "s", "type": "text" }] }
        ]
    }));
    assert_eq!(
        err,
        SchemaError::InvalidSlot {
            field_id: "docs".to_string(),
            slot_id: "s".to_string(),
            type_name: "text".to_string()
        }
    );
}

#[test]
fn test_rejects_unknown_type_and_bad_order() {
    let unknown = load_err(json!({
        "flow": [{ "id": "1", "questionId": "a", "type": "date" }]
    }));
    assert!(matches!(unknown, SchemaError::UnknownFieldType { ref type_name, .. } if type_name == "date"));

    let bad_order = load_err(json!({
        "flow": [{ "id": "1", "order": "one.two", "questionId": "a", "type": "text" }]
    }));
    assert!(matches!(bad_order, SchemaError::InvalidOrder { .. }));
}

#[test]
fn test_rejects_contradictory_bounds() {
    let err = load_err(json!({
        "flow": [{ "id": "1", "questionId": "a", "type": "text",
                   "validation": { "minLength": 5, "maxLength": 2 } }]
    }));
    assert!(matches!(err, SchemaError::InvalidBounds { .. }));
}

#[test]
fn test_question_id_scope() {
    // Mutually exclusive branches may reuse a question id.
    let schema = Schema::from_json(
        &json!({
            "flow": [
                { "id": "1", "questionId": "kind", "type": "choice",
                  "options": [{ "value": "a" }, { "value": "b" }],
                  "optionFlows": {
                      "a": [{ "id": "2", "questionId": "detail", "type": "text" }],
                      "b": [{ "id": "3", "questionId": "detail", "type": "number" }]
                  } }
            ]
        })
        .to_string(),
    );
    assert!(schema.is_ok());

    // A branch may not shadow a question from the main flow.
    let err = load_err(json!({
        "flow": [
            { "id": "1", "questionId": "detail", "type": "text" },
            { "id": "2", "questionId": "kind", "type": "choice",
              "options": [{ "value": "a" }],
              "optionFlows": { "a": [{ "id": "3", "questionId": "detail", "type": "text" }] } }
        ]
    }));
    assert_eq!(
        err,
        SchemaError::AmbiguousQuestionId {
            question_id: "detail".to_string(),
            field_ids: vec!["1".to_string(), "3".to_string()]
        }
    );

    // Flows of two different choices can be open together.
    let err = load_err(json!({
        "flow": [
            { "id": "1", "questionId": "x", "type": "choice",
              "options": [{ "value": "a" }, { "value": "c" }],
              "optionFlows": { "a": [{ "id": "2", "questionId": "detail", "type": "text" }] } },
            { "id": "3", "questionId": "y", "type": "choice",
              "options": [{ "value": "b" }],
              "optionFlows": { "b": [{ "id": "4", "questionId": "detail", "type": "number" }] } }
        ]
    }));
    assert_eq!(
        err,
        SchemaError::AmbiguousQuestionId {
            question_id: "detail".to_string(),
            field_ids: vec!["2".to_string(), "4".to_string()]
        }
    );

    // The same holds when one of the flows is nested under another choice.
    let err = load_err(json!({
        "flow": [
            { "id": "1", "questionId": "x", "type": "choice",
              "options": [{ "value": "a" }],
              "optionFlows": { "a": [
                  { "id": "2", "questionId": "z", "type": "choice",
                    "options": [{ "value": "yes" }],
                    "optionFlows": { "yes": [{ "id": "3", "questionId": "detail", "type": "text" }] } }
              ] } },
            { "id": "4", "questionId": "y", "type": "choice",
              "options": [{ "value": "b" }],
              "optionFlows": { "b": [{ "id": "5", "questionId": "detail", "type": "text" }] } }
        ]
    }));
    assert!(matches!(err, SchemaError::AmbiguousQuestionId { ref question_id, .. } if question_id == "detail"));

    // Sibling choices whose flows use distinct question ids still load.
    let schema = Schema::from_json(
        &json!({
            "flow": [
                { "id": "1", "questionId": "x", "type": "choice",
                  "options": [{ "value": "a" }, { "value": "c" }],
                  "optionFlows": {
                      "a": [{ "id": "2", "questionId": "x_detail", "type": "text" }],
                      "c": [{ "id": "3", "questionId": "x_detail", "type": "text" }]
                  } },
                { "id": "4", "questionId": "y", "type": "choice",
                  "options": [{ "value": "b" }],
                  "optionFlows": { "b": [{ "id": "5", "questionId": "y_detail", "type": "text" }] } }
            ]
        })
        .to_string(),
    );
    assert!(schema.is_ok());
}

#[test]
fn test_rejects_malformed_json() {
    let err = Schema::from_json("{ \"flow\": [ }").expect_err("not JSON");
    assert!(matches!(err, SchemaError::JsonParseError(_)));
}

#[test]
fn test_ui_hint_serialization() {
    let schema = load(onboarding_schema());
    let plan = serde_json::to_value(schema.field("plan").expect("plan exists")).expect("serializes");
    assert_eq!(
        plan,
        json!({
            "id": "plan",
            "order": 5,
            "questionId": "plan",
            "required": true,
            "type": "choice",
            "options": [
                { "value": "personal", "label": "Personal" },
                { "value": "business", "label": "Business" }
            ]
        })
    );

    let email = serde_json::to_value(schema.field("email").expect("email exists")).expect("serializes");
    assert_eq!(email["placeholder"], json!("you@example.com"));
    assert_eq!(email["validation"]["pattern"], json!("^[^@\\s]+@[^@\\s]+$"));

    let id_card = serde_json::to_value(schema.field("id_card").expect("slot exists")).expect("serializes");
    assert_eq!(id_card["type"], json!("file"));
}

#[test]
fn test_builder_completion_override() {
    let definition: SchemaDefinition =
        serde_json::from_value(example_schema()).expect("definition parses");
    let schema = Schema::builder(definition)
        .with_completion(Completion {
            message: "Done".to_string(),
            actions: vec![],
            completion_type: "plain".to_string(),
        })
        .build()
        .expect("schema builds");
    assert_eq!(schema.completion().map(|c| c.message.as_str()), Some("Done"));
}
