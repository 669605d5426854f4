//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the monshin crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use monshin::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let schema_json = std::fs::read_to_string("path/to/schema.json")?;
//! let engine = Engine::new(Schema::from_json(&schema_json)?);
//!
//! let mut state = FlowState::new();
//! let sheet = AnswerSheet::from_file("path/to/answers.json")?;
//! engine.store_candidates(&mut state, sheet.into_candidates());
//!
//! match engine.next_turn(&mut state) {
//!     Turn::Ask { field } => println!("Next: {}", field.question_id),
//!     Turn::Complete { .. } => println!("Profile: {:?}", engine.profile(&state)),
//! }
//! # Ok(())
//! # }
//! ```

// Engine
pub use crate::engine::{
    CandidateOutcome, Engine, EngineBuilder, EngineOptions, ProfileBuilder, ProfileTree, Progress,
    StoreOutcome, Turn,
};

// Schema model
pub use crate::schema::{
    ChoiceOption, Completion, Field, FieldDefinition, FieldKind, FieldOrder, FieldType,
    IntoSchema, NumberBounds, Scalar, Schema, SchemaBuilder, SchemaDefinition, TextRules,
};

// Conversation state
pub use crate::state::{FlowState, StoredAnswer, SubFlowRef};

// Candidate answers
pub use crate::data::AnswerSheet;

// Error types
pub use crate::error::{SchemaError, StoreError, ValidationReason};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
