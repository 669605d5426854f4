use crate::error::SchemaError;

mod builder;
mod completion;
pub mod conversion;
pub mod definition;
mod field;
mod index;
mod order;

pub use builder::SchemaBuilder;
pub use completion::Completion;
pub use conversion::IntoSchema;
pub use definition::*;
pub use field::*;
pub use index::{FieldIndex, IndexEntry};
pub use order::FieldOrder;

/// A validated question schema together with its lookup index.
#[derive(Debug, Clone)]
pub struct Schema {
    flow: Vec<Field>,
    completion: Option<Completion>,
    index: FieldIndex,
}

impl Schema {
    pub fn builder(definition: SchemaDefinition) -> SchemaBuilder {
        SchemaBuilder::new(definition)
    }

    /// Parses and validates a schema document in one step.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let definition = SchemaDefinition::from_json(json)
            .map_err(|e| SchemaError::JsonParseError(e.to_string()))?;
        SchemaBuilder::new(definition).build()
    }

    /// Top-level fields, sorted by order.
    pub fn flow(&self) -> &[Field] {
        &self.flow
    }

    pub fn completion(&self) -> Option<&Completion> {
        self.completion.as_ref()
    }

    pub fn index(&self) -> &FieldIndex {
        &self.index
    }

    /// Looks up any field in the tree, including group children and sub-flow fields.
    pub fn field(&self, field_id: &str) -> Option<&Field> {
        let entry = self.index.entry(field_id)?;
        index::locate(&self.flow, entry)
    }

    /// The group field that encloses `field_id`, if it is a child.
    pub fn parent(&self, field_id: &str) -> Option<&Field> {
        self.field(self.index.parent_of(field_id)?)
    }
}
