//! XLSX extraction via calamine: first worksheet, first row as headers.

use calamine::{Data, Reader, Xlsx};
use serde_json::{Map, Value};
use std::io::Cursor;

use super::ExtractError;

pub fn parse_rows(bytes: &[u8]) -> Result<Vec<Value>, ExtractError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ExtractError::EmptyWorkbook)??;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(header_row) => header_row.iter().map(cell_to_header).collect(),
        None => return Ok(Vec::new()),
    };

    let mut rows = Vec::new();
    for data_row in rows_iter {
        let mut row = Map::new();
        for (header, cell) in headers.iter().zip(data_row.iter()) {
            row.insert(header.clone(), cell_to_value(cell));
        }
        rows.push(Value::Object(row));
    }

    Ok(rows)
}

fn cell_to_header(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn cell_to_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => Value::from(s.as_str()),
        Data::Int(i) => Value::from(*i),
        // Spreadsheets store most numbers as floats; surface whole
        // numbers as JSON integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Value::from(*f as i64)
        },
        Data::Float(f) => Value::from(*f),
        Data::Bool(b) => Value::from(*b),
        Data::Error(e) => Value::from(format!("{:?}", e)),
        Data::DateTime(dt) => Value::from(dt.to_string()),
        Data::DateTimeIso(s) => Value::from(s.as_str()),
        Data::DurationIso(s) => Value::from(s.as_str()),
    }
}
