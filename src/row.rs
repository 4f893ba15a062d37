//! Flat rows and per-table split rows
//! ---------------------------------
//! A flat row is one denormalized tuple: field name -> scalar-or-null. Field
//! order is preserved so projections keep the order the query produced.

use indexmap::IndexMap;
use serde_json::Value;

pub type Row = serde_json::Map<String, Value>;

/// A flat row partitioned by table: table name -> that table's fields.
pub type SplitRow = IndexMap<String, Row>;

/// A value counts as set when it is present and not null.
#[inline]
pub fn is_set(v: Option<&Value>) -> bool { matches!(v, Some(v) if !v.is_null()) }

/// True when at least one field of `row` holds a non-null value.
pub fn any_set(row: &Row) -> bool { row.values().any(|v| !v.is_null()) }

/// Render a value as one component of a record identifier.
pub fn key_part(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Bool(true)) => "1".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Build a record identifier from the values at `keys`, joined by `_`.
pub fn compose_id(row: &Row, keys: &[String]) -> String {
    keys.iter().map(|k| key_part(row.get(k))).collect::<Vec<_>>().join("_")
}

/// Convert a JSON array of objects into rows. Non-object elements are rejected.
pub fn rows_from_value(v: Value) -> crate::error::JoinResult<Vec<Row>> {
    let Value::Array(items) = v else {
        return Err(crate::error::JoinError::config("rows must be a JSON array of objects"));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::Object(m) => Ok(m),
            _ => Err(crate::error::JoinError::config(format!("row {} is not a JSON object", i))),
        })
        .collect()
}
