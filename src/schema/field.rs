use super::FieldOrder;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One node of a question schema, leaf or group.
///
/// Serializing a `Field` produces the UI hint handed to callers: type, prompt text,
/// placeholder, options, children and validation. Option flows are engine-internal
/// and are never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub order: FieldOrder,
    pub question_id: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

/// The closed set of field types, each carrying only the attributes it uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(skip_serializing_if = "TextRules::is_empty")]
        validation: TextRules,
    },
    Number {
        #[serde(skip_serializing_if = "NumberBounds::is_empty")]
        validation: NumberBounds,
    },
    Choice {
        options: Vec<ChoiceOption>,
        #[serde(skip)]
        option_flows: BTreeMap<String, Vec<Field>>,
    },
    Form {
        children: Vec<Field>,
    },
    File,
    Files {
        children: Vec<Field>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRules {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl TextRules {
    pub fn is_empty(&self) -> bool {
        self.min_length.is_none() && self.max_length.is_none() && self.pattern.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumberBounds {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl NumberBounds {
    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
}

/// The type tag of a field, as written in schema documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Number,
    Choice,
    Form,
    File,
    Files,
}

impl FromStr for FieldType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(FieldType::Text),
            "number" => Ok(FieldType::Number),
            "choice" => Ok(FieldType::Choice),
            "form" => Ok(FieldType::Form),
            "file" => Ok(FieldType::File),
            "files" => Ok(FieldType::Files),
            _ => Err(()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Choice => "choice",
            FieldType::Form => "form",
            FieldType::File => "file",
            FieldType::Files => "files",
        };
        write!(f, "{}", name)
    }
}

impl Field {
    pub fn field_type(&self) -> FieldType {
        match self.kind {
            FieldKind::Text { .. } => FieldType::Text,
            FieldKind::Number { .. } => FieldType::Number,
            FieldKind::Choice { .. } => FieldType::Choice,
            FieldKind::Form { .. } => FieldType::Form,
            FieldKind::File => FieldType::File,
            FieldKind::Files { .. } => FieldType::Files,
        }
    }

    /// Children of a `form` or `files` field; empty for every other type.
    pub fn children(&self) -> &[Field] {
        match &self.kind {
            FieldKind::Form { children } | FieldKind::Files { children } => children,
            _ => &[],
        }
    }

    /// The sub-flow a choice field opens for `option`, if any.
    pub fn option_flow(&self, option: &str) -> Option<&[Field]> {
        match &self.kind {
            FieldKind::Choice { option_flows, .. } => option_flows.get(option).map(Vec::as_slice),
            _ => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, FieldKind::Form { .. } | FieldKind::Files { .. })
    }

    /// Answers are opaque attachment references minted by an upload service.
    pub fn holds_attachments(&self) -> bool {
        matches!(self.kind, FieldKind::File | FieldKind::Files { .. })
    }

    /// A copy of this group field that carries only `keep` among its children.
    pub(crate) fn with_children_where<P>(&self, mut keep: P) -> Field
    where
        P: FnMut(&Field) -> bool,
    {
        let mut pruned = self.clone();
        if let FieldKind::Form { children } | FieldKind::Files { children } = &mut pruned.kind {
            children.retain(|child| keep(child));
        }
        pruned
    }
}
