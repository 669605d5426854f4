//! Common test utilities for building schemas and engines.
use monshin::prelude::*;
use serde_json::{Value, json};

/// The two-question schema with one branch.
///
/// `name` -> `role` (a | b); choosing `a` opens a sub-flow asking `extra`.
#[allow(dead_code)]
pub fn example_schema() -> Value {
    json!({
        "flow": [
            { "id": "1", "questionId": "name", "type": "text", "required": true },
            {
                "id": "2",
                "questionId": "role",
                "type": "choice",
                "required": true,
                "options": [{ "value": "a" }, { "value": "b" }],
                "optionFlows": {
                    "a": [{ "id": "3", "questionId": "extra", "type": "text", "required": true }]
                }
            }
        ]
    })
}

/// A customer onboarding schema exercising every field type.
///
/// Layout: name, email, age, address{street, city, zip?}, plan (personal |
/// business -> company, size, vat_registered (yes -> vat_id)), documents{id_card,
/// proof?}, notes?
#[allow(dead_code)]
pub fn onboarding_schema() -> Value {
    json!({
        "flow": [
            { "id": "name", "order": 1, "questionId": "name", "type": "text",
              "question": "What is your name?", "validation": { "minLength": 2 } },
            { "id": "email", "order": 2, "questionId": "email", "type": "text",
              "placeholder": "you@example.com",
              "validation": { "pattern": "^[^@\\s]+@[^@\\s]+$" } },
            { "id": "age", "order": 3, "questionId": "age", "type": "number",
              "validation": { "min": 18, "max": 120 } },
            { "id": "address", "order": 4, "questionId": "address", "type": "form", "children": [
                { "id": "street", "order": 1, "questionId": "street", "type": "text" },
                { "id": "city", "order": 2, "questionId": "city", "type": "text" },
                { "id": "zip", "order": 3, "questionId": "zip", "type": "text", "required": false }
            ]},
            { "id": "plan", "order": 5, "questionId": "plan", "type": "choice",
              "options": [
                  { "value": "personal", "label": "Personal" },
                  { "value": "business", "label": "Business" }
              ],
              "optionFlows": {
                  "business": [
                      { "id": "company", "order": 1, "questionId": "company", "type": "text" },
                      { "id": "size", "order": 2, "questionId": "size", "type": "number" },
                      { "id": "vat", "order": 3, "questionId": "vat_registered", "type": "choice",
                        "options": [{ "value": "yes" }, { "value": "no" }],
                        "optionFlows": {
                            "yes": [{ "id": "vat_id", "questionId": "vat_id", "type": "text" }]
                        }
                      }
                  ]
              }
            },
            { "id": "documents", "order": 6, "questionId": "documents", "type": "files", "children": [
                { "id": "id_card", "order": 1, "questionId": "id_card", "type": "file" },
                { "id": "proof", "order": 2, "questionId": "proof", "type": "file", "required": false }
            ]},
            { "id": "notes", "order": 7, "questionId": "notes", "type": "text", "required": false }
        ],
        "completion": {
            "message": "Thanks {name}, we will reach out at {email}.",
            "actions": ["book_call"],
            "type": "summary"
        }
    })
}

#[allow(dead_code)]
pub fn load(schema: Value) -> Schema {
    Schema::from_json(&schema.to_string()).expect("fixture schema is valid")
}

#[allow(dead_code)]
pub fn engine(schema: Value) -> Engine {
    Engine::new(load(schema))
}

/// Stores an answer that the test expects to be accepted.
#[allow(dead_code)]
pub fn answer(engine: &Engine, state: &mut FlowState, question_id: &str, value: Value) -> StoreOutcome {
    engine
        .store(state, question_id, value)
        .unwrap_or_else(|e| panic!("answer for '{}' rejected: {}", question_id, e))
}

/// The id of the next field, if any.
#[allow(dead_code)]
pub fn next_id(engine: &Engine, state: &mut FlowState) -> Option<String> {
    engine.next_question(state).map(|field| field.id)
}

/// Answers the onboarding schema up to (not including) the `plan` question.
#[allow(dead_code)]
pub fn fill_personal_details(engine: &Engine, state: &mut FlowState) {
    answer(engine, state, "name", json!("Alice"));
    answer(engine, state, "email", json!("alice@example.com"));
    answer(engine, state, "age", json!(34));
    answer(
        engine,
        state,
        "address",
        json!({ "street": "1 Main St", "city": "Oslo" }),
    );
}
