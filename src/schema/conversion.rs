use super::definition::SchemaDefinition;
use crate::error::SchemaConversionError;

/// A trait for custom schema formats that can be converted into a `SchemaDefinition`.
///
/// Implement this on your own configuration structs to feed a questionnaire
/// authored in another format (YAML, a CMS export, a database table) into the
/// schema builder.
///
/// # Example
///
/// ```rust
/// use monshin::prelude::*;
/// use monshin::error::SchemaConversionError;
///
/// struct Question { key: String, prompt: String }
/// struct Survey { questions: Vec<Question> }
///
/// impl IntoSchema for Survey {
///     fn into_schema(self) -> std::result::Result<SchemaDefinition, SchemaConversionError> {
///         let flow = self
///             .questions
///             .into_iter()
///             .enumerate()
///             .map(|(i, q)| FieldDefinition {
///                 id: Scalar::Integer(i as i64 + 1),
///                 order: None,
///                 question_id: q.key,
///                 field_type: "text".to_string(),
///                 required: true,
///                 question: Some(q.prompt),
///                 placeholder: None,
///                 validation: None,
///                 options: vec![],
///                 option_flows: Default::default(),
///                 children: vec![],
///             })
///             .collect();
///         Ok(SchemaDefinition { flow, completion: None })
///     }
/// }
/// ```
pub trait IntoSchema {
    /// Consumes the object and converts it into a schema document.
    fn into_schema(self) -> Result<SchemaDefinition, SchemaConversionError>;
}

impl IntoSchema for SchemaDefinition {
    fn into_schema(self) -> Result<SchemaDefinition, SchemaConversionError> {
        Ok(self)
    }
}
