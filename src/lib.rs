//! # Monshin - Conversational Data-Collection Engine
//!
//! **Monshin** decides, turn by turn, which single question a conversation should
//! ask next. It walks a declarative, tree-shaped question schema (plain fields,
//! grouped forms, file slots, and choice fields that branch into alternate
//! sub-flows), validates and records the answers a caller supplies, and rebuilds
//! a structured profile from the flat answer log.
//!
//! The engine performs no I/O and keeps no state of its own. Everything about a
//! conversation lives in a [`FlowState`](state::FlowState) value that the caller
//! owns, persists and passes into every call.
//!
//! ## Core Workflow
//!
//! 1.  **Load a schema**: parse a schema document with [`Schema::from_json`](schema::Schema::from_json),
//!     or convert your own format through the [`IntoSchema`](schema::IntoSchema) trait and
//!     `Schema::builder`. All structural validation happens here, once.
//! 2.  **Build an engine**: `Engine::builder(schema)` with any options you need.
//! 3.  **Converse**: ask [`Engine::next_question`](engine::Engine::next_question) what to
//!     ask, feed the extracted value to [`Engine::store`](engine::Engine::store), repeat
//!     until it returns `None`.
//! 4.  **Collect**: [`Engine::profile`](engine::Engine::profile) returns the nested answers
//!     and [`Engine::percent`](engine::Engine::percent) the progress along the current path.
//!
//! ## Quick Start
//!
//! ```rust
//! use monshin::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     let schema = Schema::from_json(
//!         r#"{
//!             "flow": [
//!                 { "id": "1", "questionId": "name", "type": "text" },
//!                 {
//!                     "id": "2", "questionId": "role", "type": "choice",
//!                     "options": [{ "value": "a" }, { "value": "b" }],
//!                     "optionFlows": {
//!                         "a": [{ "id": "3", "questionId": "extra", "type": "text" }]
//!                     }
//!                 }
//!             ]
//!         }"#,
//!     )?;
//!     let engine = Engine::new(schema);
//!     let mut state = FlowState::new();
//!
//!     assert_eq!(engine.next_question(&mut state).map(|f| f.id), Some("1".to_string()));
//!     engine.store(&mut state, "name", json!("Al"))?;
//!
//!     let outcome = engine.store(&mut state, "role", json!("a"))?;
//!     assert_eq!(outcome.new_sub_flow.map(|s| s.to_string()), Some("role:a".to_string()));
//!     assert_eq!(engine.next_question(&mut state).map(|f| f.id), Some("3".to_string()));
//!
//!     engine.store(&mut state, "extra", json!("x"))?;
//!     assert!(state.active_sub_flow().is_none());
//!     assert!(engine.next_question(&mut state).is_none());
//!     assert_eq!(engine.percent(&state), 100);
//!
//!     let profile = engine.profile(&state);
//!     assert_eq!(profile["extra"], json!("x"));
//!     Ok(())
//! }
//! ```

pub mod data;
pub mod engine;
pub mod error;
pub mod prelude;
pub mod schema;
pub mod state;
