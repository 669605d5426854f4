use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Position of a field among its siblings.
///
/// Orders are either plain integers (`3`) or dotted paths (`"2.1.3"`). Both are
/// stored as segment lists and compared segment-wise, so `2 < 2.1 < 2.10 < 3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldOrder(Vec<i64>);

impl FieldOrder {
    pub fn from_index(index: i64) -> Self {
        Self(vec![index])
    }
}

impl FromStr for FieldOrder {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .split('.')
            .map(|segment| segment.trim().parse::<i64>())
            .collect::<Result<Vec<_>, _>>()
            .map(FieldOrder)
    }
}

impl fmt::Display for FieldOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
            first = false;
        }
        Ok(())
    }
}

// Single-segment orders go back out as numbers, dotted ones as strings.
impl Serialize for FieldOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.as_slice() {
            [single] => serializer.serialize_i64(*single),
            _ => serializer.serialize_str(&self.to_string()),
        }
    }
}
