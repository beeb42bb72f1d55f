use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a request row
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the scalars a JSON row can carry.
///
/// Variant order matters for deserialization: integers are tried before
/// floats so `3` stays an `Integer` while `3.5` becomes a `Float`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric features.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Convert an arbitrary JSON value; nested arrays/objects become text.
    pub fn from_json(val: &JsonValue) -> Self {
        match val {
            JsonValue::String(s) => CellValue::String(s.clone()),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    CellValue::Float(f)
                } else {
                    CellValue::String(n.to_string())
                }
            }
            JsonValue::Bool(b) => CellValue::Bool(*b),
            JsonValue::Null => CellValue::Null,
            other => CellValue::String(other.to_string()),
        }
    }

    /// Best-effort typing of a textual field (CSV cells).
    pub fn guess(s: &str) -> Self {
        if s.is_empty() {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        if s == "true" || s == "false" {
            return CellValue::Bool(s == "true");
        }
        CellValue::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_json_scalars() {
        let row: Vec<CellValue> =
            serde_json::from_str(r#"[null, true, 3, 3.5, "gold"]"#).unwrap();
        assert_eq!(
            row,
            vec![
                CellValue::Null,
                CellValue::Bool(true),
                CellValue::Integer(3),
                CellValue::Float(3.5),
                CellValue::String("gold".into()),
            ]
        );
    }

    #[test]
    fn nested_values_are_rejected() {
        let parsed: Result<Vec<CellValue>, _> = serde_json::from_str(r#"[[1, 2]]"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn guess_types_csv_fields() {
        assert_eq!(CellValue::guess(""), CellValue::Null);
        assert_eq!(CellValue::guess("42"), CellValue::Integer(42));
        assert_eq!(CellValue::guess("0.25"), CellValue::Float(0.25));
        assert_eq!(CellValue::guess("false"), CellValue::Bool(false));
        assert_eq!(CellValue::guess("retail"), CellValue::String("retail".into()));
    }
}
