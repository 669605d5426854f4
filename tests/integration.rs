//! End-to-end conversations, including batch extraction and completion.
mod common;
use common::*;
use monshin::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

#[test]
fn test_two_question_flow_with_branch() {
    let engine = engine(example_schema());
    let mut state = FlowState::new();

    assert_eq!(engine.percent(&state), 0);
    assert_eq!(next_id(&engine, &mut state).as_deref(), Some("1"));

    answer(&engine, &mut state, "name", json!("Al"));
    assert_eq!(engine.percent(&state), 50);
    assert_eq!(next_id(&engine, &mut state).as_deref(), Some("2"));

    let outcome = answer(&engine, &mut state, "role", json!("a"));
    assert_eq!(outcome.new_sub_flow, Some(SubFlowRef::new("role", "a")));
    assert_eq!(engine.percent(&state), 67);
    assert_eq!(next_id(&engine, &mut state).as_deref(), Some("3"));

    let outcome = answer(&engine, &mut state, "extra", json!("x"));
    assert_eq!(outcome.exited_sub_flow, Some(SubFlowRef::new("role", "a")));
    assert!(state.active_sub_flow().is_none());
    assert!(engine.next_question(&mut state).is_none());
    assert_eq!(engine.percent(&state), 100);

    assert_eq!(
        Value::Object(engine.profile(&state)),
        json!({ "name": "Al", "role": "a", "extra": "x" })
    );
    for id in ["1", "2", "3"] {
        assert!(state.is_completed(id), "{} completed", id);
    }
}

#[test]
fn test_branch_without_sub_flow_finishes() {
    let engine = engine(example_schema());
    let mut state = FlowState::new();
    answer(&engine, &mut state, "name", json!("Al"));
    let outcome = answer(&engine, &mut state, "role", json!("b"));

    assert_eq!(outcome.new_sub_flow, None);
    assert!(engine.next_question(&mut state).is_none());
    assert_eq!(engine.percent(&state), 100);
}

#[test]
fn test_progress_counts_reachable_fields() {
    let engine = engine(onboarding_schema());
    let mut state = FlowState::new();

    let progress = engine.progress(&state);
    assert_eq!((progress.completed, progress.total, progress.finished), (0, 12, false));

    fill_personal_details(&engine, &mut state);
    assert_eq!(engine.progress(&state).completed, 6);
    assert_eq!(engine.percent(&state), 50);

    answer(&engine, &mut state, "plan", json!("business"));
    let progress = engine.progress(&state);
    assert_eq!((progress.completed, progress.total), (7, 15));
}

#[test]
fn test_batch_candidates_applied_in_schema_order() {
    let engine = engine(example_schema());
    let mut state = FlowState::new();
    let sheet = AnswerSheet::from_json(r#"{ "extra": "x", "bogus": 1, "role": "a", "name": "Al" }"#)
        .expect("sheet parses");

    let outcomes = engine.store_candidates(&mut state, sheet.into_candidates());
    let summary: Vec<(&str, &str)> = outcomes
        .iter()
        .map(|o| {
            let code = match &o.result {
                Ok(_) => "ok",
                Err(e) => e.code(),
            };
            (o.question_id.as_str(), code)
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("name", "ok"),
            ("role", "ok"),
            ("extra", "ok"),
            ("bogus", "unknown_field"),
        ]
    );

    assert!(state.active_sub_flow().is_none());
    assert!(engine.next_question(&mut state).is_none());
}

#[test]
fn test_batch_reports_invalid_candidates() {
    let engine = engine(onboarding_schema());
    let mut state = FlowState::new();
    let candidates = vec![
        ("name".to_string(), json!("A")),
        ("email".to_string(), json!("alice@example.com")),
        ("plan".to_string(), json!("business")),
        ("company".to_string(), json!("Acme")),
    ];

    let outcomes = engine.store_candidates(&mut state, candidates);
    let name = outcomes
        .iter()
        .find(|o| o.question_id == "name")
        .expect("name outcome");
    assert_eq!(name.result.as_ref().map_err(StoreError::code), Err("too_short"));
    assert!(outcomes.iter().filter(|o| o.question_id != "name").all(|o| o.result.is_ok()));

    assert_eq!(next_id(&engine, &mut state).as_deref(), Some("size"));
    assert_eq!(engine.profile(&state)["company"], json!("Acme"));
}

#[test]
fn test_completion_turn_renders_profile() {
    let engine = engine(onboarding_schema());
    let mut state = FlowState::new();
    fill_personal_details(&engine, &mut state);

    match engine.next_turn(&mut state) {
        Turn::Ask { field } => assert_eq!(field.id, "plan"),
        other => panic!("expected a question, got {:?}", other),
    }

    answer(&engine, &mut state, "plan", json!("personal"));
    answer(&engine, &mut state, "documents", json!({ "id_card": "upload-1" }));

    match engine.next_turn(&mut state) {
        Turn::Complete {
            completion: Some(completion),
        } => {
            assert_eq!(completion.actions, vec!["book_call".to_string()]);
            assert_eq!(completion.completion_type, "summary");
            assert_eq!(
                completion.render(&engine.profile(&state)),
                "Thanks Alice, we will reach out at alice@example.com."
            );
        }
        other => panic!("expected completion, got {:?}", other),
    }
}

#[test]
fn test_turn_serialization() {
    let engine = engine(example_schema());
    let mut state = FlowState::new();

    let ask = serde_json::to_value(engine.next_turn(&mut state)).expect("turn serializes");
    assert_eq!(ask["status"], json!("ask"));
    assert_eq!(ask["field"]["questionId"], json!("name"));
    assert_eq!(ask["field"]["type"], json!("text"));

    let done = serde_json::to_value(Turn::Complete { completion: None }).expect("turn serializes");
    assert_eq!(done, json!({ "status": "complete", "completion": null }));
}

#[test]
fn test_state_survives_persistence_between_turns() {
    let engine = engine(onboarding_schema());
    let mut state = FlowState::new();
    fill_personal_details(&engine, &mut state);
    answer(&engine, &mut state, "plan", json!("business"));

    let saved = serde_json::to_string(&state).expect("state serializes");
    let mut restored: FlowState = serde_json::from_str(&saved).expect("state deserializes");
    assert_eq!(restored, state);
    assert_eq!(
        restored.active_sub_flow().map(ToString::to_string).as_deref(),
        Some("plan:business")
    );
    assert_eq!(next_id(&engine, &mut restored).as_deref(), Some("company"));
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = std::sync::Arc::new(engine(example_schema()));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = std::sync::Arc::clone(&engine);
            std::thread::spawn(move || {
                let mut state = FlowState::new();
                engine
                    .store(&mut state, "name", json!(format!("user-{}", i)))
                    .expect("answer accepted");
                engine.next_question(&mut state).map(|f| f.id)
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().expect("thread finished").as_deref(), Some("2"));
    }
}
