use std::fmt;
use thiserror::Error;

/// Errors that can occur while loading and validating a question schema.
///
/// These are fatal: a schema that fails to load is never traversed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Failed to parse schema JSON: {0}")]
    JsonParseError(String),

    #[error("Field id '{0}' is declared more than once")]
    DuplicateFieldId(String),

    #[error("Fields {field_ids:?} under '{parent}' share the order value '{order}'")]
    DuplicateOrder {
        parent: String,
        order: String,
        field_ids: Vec<String>,
    },

    #[error("Field '{field_id}' has an invalid order value '{order}'")]
    InvalidOrder { field_id: String, order: String },

    #[error("Field '{field_id}' has an unsupported type '{type_name}'")]
    UnknownFieldType { field_id: String, type_name: String },

    #[error("Field '{field_id}' of type '{type_name}' cannot carry {attribute}")]
    MisplacedAttribute {
        field_id: String,
        type_name: String,
        attribute: &'static str,
    },

    #[error("Files field '{field_id}' has slot '{slot_id}' of type '{type_name}'; slots must be of type 'file'")]
    InvalidSlot {
        field_id: String,
        slot_id: String,
        type_name: String,
    },

    #[error("Choice field '{field_id}' declares an option flow for unknown option '{option}'")]
    DanglingOptionFlow { field_id: String, option: String },

    #[error("Choice field '{field_id}' declares an empty option flow for option '{option}'")]
    EmptyOptionFlow { field_id: String, option: String },

    #[error("Field '{field_id}' has an invalid validation pattern: {message}")]
    InvalidPattern { field_id: String, message: String },

    #[error("Field '{field_id}' has contradictory validation bounds: {message}")]
    InvalidBounds { field_id: String, message: String },

    #[error("Question id '{question_id}' is reachable twice on one path (fields {field_ids:?})")]
    AmbiguousQuestionId {
        question_id: String,
        field_ids: Vec<String>,
    },
}

/// Machine-readable reason an answer was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationReason {
    Required,
    TooShort { min: usize, actual: usize },
    TooLong { max: usize, actual: usize },
    PatternMismatch { pattern: String },
    NotANumber,
    BelowMinimum { min: f64 },
    AboveMaximum { max: f64 },
    UnknownOption { allowed: Vec<String> },
    ExpectedText,
    ExpectedObject,
    ExpectedReference,
    UnknownChild { key: String },
}

impl ValidationReason {
    /// A stable code callers can switch on when re-prompting.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationReason::Required => "required",
            ValidationReason::TooShort { .. } => "too_short",
            ValidationReason::TooLong { .. } => "too_long",
            ValidationReason::PatternMismatch { .. } => "pattern_mismatch",
            ValidationReason::NotANumber => "not_a_number",
            ValidationReason::BelowMinimum { .. } => "below_minimum",
            ValidationReason::AboveMaximum { .. } => "above_maximum",
            ValidationReason::UnknownOption { .. } => "unknown_option",
            ValidationReason::ExpectedText => "expected_text",
            ValidationReason::ExpectedObject => "expected_object",
            ValidationReason::ExpectedReference => "expected_reference",
            ValidationReason::UnknownChild { .. } => "unknown_child",
        }
    }
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationReason::Required => write!(f, "a value is required"),
            ValidationReason::TooShort { min, actual } => {
                write!(f, "must be at least {} characters (got {})", min, actual)
            }
            ValidationReason::TooLong { max, actual } => {
                write!(f, "must be at most {} characters (got {})", max, actual)
            }
            ValidationReason::PatternMismatch { pattern } => {
                write!(f, "does not match pattern '{}'", pattern)
            }
            ValidationReason::NotANumber => write!(f, "must be a number"),
            ValidationReason::BelowMinimum { min } => write!(f, "must be at least {}", min),
            ValidationReason::AboveMaximum { max } => write!(f, "must be at most {}", max),
            ValidationReason::UnknownOption { allowed } => {
                write!(f, "must be one of [{}]", allowed.join(", "))
            }
            ValidationReason::ExpectedText => write!(f, "must be text"),
            ValidationReason::ExpectedObject => {
                write!(f, "must be an object keyed by child question ids")
            }
            ValidationReason::ExpectedReference => {
                write!(f, "must be an attachment reference or a list of references")
            }
            ValidationReason::UnknownChild { key } => write!(f, "has no child named '{}'", key),
        }
    }
}

/// Errors returned when an answer cannot be stored. The flow state is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Question '{question_id}' is not reachable in the current flow")]
    UnknownField { question_id: String },

    #[error("Answer for '{question_id}' was rejected: {reason}")]
    Validation {
        question_id: String,
        reason: ValidationReason,
    },
}

impl StoreError {
    /// Machine-readable error code: `unknown_field` or the validation reason's code.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::UnknownField { .. } => "unknown_field",
            StoreError::Validation { reason, .. } => reason.code(),
        }
    }
}

/// Errors that can occur when converting a custom schema format into a `SchemaDefinition`.
#[derive(Error, Debug, Clone)]
pub enum SchemaConversionError {
    #[error("Invalid custom schema: {0}")]
    ValidationError(String),
}
