use crate::error::ValidationReason;
use crate::schema::{ChoiceOption, Field, FieldKind, NumberBounds, TextRules};
use regex::Regex;
use serde_json::{Number, Value};

/// Null, whitespace-only strings, empty lists and empty objects count as "no answer".
pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Checks a single answer against its field and returns the value to store.
///
/// Blank answers are rejected for required fields and stored as `null` for
/// optional ones. Group fields with children are decomposed by the caller and
/// never reach this function.
pub(crate) fn normalize_leaf(
    field: &Field,
    value: Value,
    pattern: Option<&Regex>,
    trim: bool,
) -> Result<Value, ValidationReason> {
    if is_blank(&value) {
        return if field.required {
            Err(ValidationReason::Required)
        } else {
            Ok(Value::Null)
        };
    }

    match &field.kind {
        FieldKind::Text { validation } => {
            let text = as_text(value, trim)?;
            check_text(&text, validation, pattern)?;
            Ok(Value::String(text))
        }
        FieldKind::Number { validation } => {
            let number = as_number(&value)?;
            check_bounds(number, validation)?;
            Ok(number_value(number))
        }
        FieldKind::Choice { options, .. } => {
            let raw = as_text(value, true)?;
            if options.is_empty() {
                return Ok(Value::String(raw));
            }
            match_option(options, &raw)
                .map(|option| Value::String(option.value.clone()))
                .ok_or_else(|| ValidationReason::UnknownOption {
                    allowed: options.iter().map(|o| o.value.clone()).collect(),
                })
        }
        FieldKind::File => as_reference(value),
        FieldKind::Files { children } if children.is_empty() => as_reference(value),
        FieldKind::Files { .. } | FieldKind::Form { .. } => Err(ValidationReason::ExpectedObject),
    }
}

fn as_text(value: Value, trim: bool) -> Result<String, ValidationReason> {
    let text = match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(ValidationReason::ExpectedText),
    };
    Ok(if trim { text.trim().to_string() } else { text })
}

fn check_text(
    text: &str,
    rules: &TextRules,
    pattern: Option<&Regex>,
) -> Result<(), ValidationReason> {
    let length = text.chars().count();
    if let Some(min) = rules.min_length {
        if length < min {
            return Err(ValidationReason::TooShort {
                min,
                actual: length,
            });
        }
    }
    if let Some(max) = rules.max_length {
        if length > max {
            return Err(ValidationReason::TooLong {
                max,
                actual: length,
            });
        }
    }
    if let Some(regex) = pattern {
        if !regex.is_match(text) {
            return Err(ValidationReason::PatternMismatch {
                pattern: regex.as_str().to_string(),
            });
        }
    }
    Ok(())
}

fn as_number(value: &Value) -> Result<f64, ValidationReason> {
    match value {
        Value::Number(n) => n.as_f64().ok_or(ValidationReason::NotANumber),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or(ValidationReason::NotANumber),
        _ => Err(ValidationReason::NotANumber),
    }
}

fn check_bounds(number: f64, bounds: &NumberBounds) -> Result<(), ValidationReason> {
    if let Some(min) = bounds.min {
        if number < min {
            return Err(ValidationReason::BelowMinimum { min });
        }
    }
    if let Some(max) = bounds.max {
        if number > max {
            return Err(ValidationReason::AboveMaximum { max });
        }
    }
    Ok(())
}

// Whole numbers are stored as integers so profiles read `42`, not `42.0`.
fn number_value(number: f64) -> Value {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        Value::Number(Number::from(number as i64))
    } else {
        Number::from_f64(number).map_or(Value::Null, Value::Number)
    }
}

/// Exact value match first, then a case-insensitive match on value or label.
fn match_option<'a>(options: &'a [ChoiceOption], raw: &str) -> Option<&'a ChoiceOption> {
    options.iter().find(|o| o.value == raw).or_else(|| {
        options
            .iter()
            .find(|o| o.value.eq_ignore_ascii_case(raw) || o.label.eq_ignore_ascii_case(raw))
    })
}

fn as_reference(value: Value) -> Result<Value, ValidationReason> {
    match value {
        Value::String(s) => Ok(Value::String(s.trim().to_string())),
        Value::Array(items) => {
            let refs = items
                .into_iter()
                .map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => {
                        Ok(Value::String(s.trim().to_string()))
                    }
                    _ => Err(ValidationReason::ExpectedReference),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(refs))
        }
        _ => Err(ValidationReason::ExpectedReference),
    }
}
