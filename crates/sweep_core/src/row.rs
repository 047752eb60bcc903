use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A single scalar value as returned by a shard query.
///
/// Deliberately small: the pipeline never computes on values, it only
/// carries them from the driver to a renderer with their type intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Encode for text display. `None` is SQL NULL; the renderer decides
    /// how a NULL is spelled.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(v) => Some(v.to_string()),
            Value::UInt(v) => Some(v.to_string()),
            Value::Float(v) => Some(v.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        }
    }

    /// Encode for the JSON renderer.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(v) => JsonValue::from(*v),
            Value::UInt(v) => JsonValue::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Bytes(b) => JsonValue::String(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

/// An ordered result set from one shard.
///
/// Column order is the server-reported order and every row holds exactly
/// `columns.len()` values, so a row is an ordered column-name → value
/// mapping without per-row key storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        RowSet {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append one row. The caller (a driver adapter or a test fixture)
    /// guarantees the arity matches the column list.
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len(), "row arity mismatch");
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_encoding() {
        assert_eq!(Value::Null.to_text(), None);
        assert_eq!(Value::Int(-7).to_text().as_deref(), Some("-7"));
        assert_eq!(Value::Text("abc".into()).to_text().as_deref(), Some("abc"));
        assert_eq!(
            Value::Bytes(vec![0x68, 0x69]).to_text().as_deref(),
            Some("hi")
        );
    }

    #[test]
    fn json_encoding() {
        assert_eq!(Value::Null.to_json(), JsonValue::Null);
        assert_eq!(Value::UInt(3).to_json(), JsonValue::from(3u64));
        assert_eq!(
            Value::Text("x".into()).to_json(),
            JsonValue::String("x".into())
        );
        // NaN has no JSON representation and degrades to null
        assert_eq!(Value::Float(f64::NAN).to_json(), JsonValue::Null);
    }

    #[test]
    fn rowset_keeps_order() {
        let mut set = RowSet::new(vec!["id".into(), "name".into()]);
        set.push_row(vec![Value::Int(1), Value::Text("a".into())]);
        set.push_row(vec![Value::Int(2), Value::Null]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.columns(), ["id", "name"]);
        assert_eq!(set.rows()[1][1], Value::Null);
    }
}
