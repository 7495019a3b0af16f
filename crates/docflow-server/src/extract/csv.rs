//! CSV extraction: header row as keys, one JSON object per data row.

use serde_json::{Map, Value};

use super::ExtractError;

pub fn parse_rows(bytes: &[u8]) -> Result<Vec<Value>, ExtractError> {
    let mut reader = ::csv::ReaderBuilder::new().from_reader(bytes);
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Map::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), coerce_scalar(field));
        }
        rows.push(Value::Object(row));
    }

    Ok(rows)
}

/// Coerce a CSV field into the narrowest JSON scalar it parses as:
/// integer, then float, then bool, otherwise string.
pub(super) fn coerce_scalar(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = field.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = field.parse::<f64>() {
        if f.is_finite() {
            return Value::from(f);
        }
    }
    match field {
        "true" | "True" | "TRUE" => Value::from(true),
        "false" | "False" | "FALSE" => Value::from(false),
        _ => Value::from(field),
    }
}
