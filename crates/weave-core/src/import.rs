//! Dataset ingestion
//!
//! Builds `Dataset` values from the two supported inputs: CSV files
//! (header row + scalar cells, column types inferred) and free-text
//! journals (one record per entry, a leading date like "July 2nd -"
//! recognized when present). Ids are content hashes so re-importing the
//! same file yields the same ids.

use std::collections::HashMap;
use std::io::Read;

use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, StringRecord};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::dates::{leading_entry_date, parse_date};
use crate::error::{Error, Result};
use crate::models::{ColumnType, Dataset, Record, ScalarValue};

/// Rows examined when looking for a date-like column
const DATE_SAMPLE_ROWS: usize = 10;

const TRUE_WORDS: &[&str] = &["true", "yes"];
const FALSE_WORDS: &[&str] = &["false", "no"];

fn generate_id(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
    }
    hex::encode(hasher.finalize())
}

/// Parse a CSV stream into a dataset.
///
/// Column types are inferred from the values: all-numeric columns become
/// `Number`, all yes/no/true/false columns become `Bool`, anything else is
/// `Text`. Cells that fail their column's parse land as `Null` rather than
/// failing the import. Row timestamps come from the first date-like column
/// when one exists, otherwise the import time.
pub fn dataset_from_csv<R: Read>(reader: R, name: &str) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    if columns.is_empty() || columns.iter().all(|c| c.is_empty()) {
        return Err(Error::Import("CSV has no header row".into()));
    }

    let mut raw_rows: Vec<StringRecord> = Vec::new();
    for result in rdr.records() {
        raw_rows.push(result?);
    }

    let column_types = infer_column_types(&columns, &raw_rows);
    let date_column = columns.iter().position(|column| {
        raw_rows
            .iter()
            .take(DATE_SAMPLE_ROWS)
            .any(|row| cell(row, &columns, column).and_then(|c| parse_date(c)).is_some())
    });

    let dataset_id = generate_id(&[name, &columns.join(",")]);
    let imported_at = Utc::now();

    let rows: Vec<Record> = raw_rows
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            let mut fields = HashMap::new();
            for column in &columns {
                let value = cell(raw, &columns, column)
                    .map(|text| scalar_for(text, column_types[column]))
                    .unwrap_or(ScalarValue::Null);
                fields.insert(column.clone(), value);
            }
            let timestamp = date_column
                .and_then(|i| raw.get(i))
                .map(str::trim)
                .and_then(parse_date)
                .and_then(to_timestamp)
                .unwrap_or(imported_at);
            Record {
                id: generate_id(&[&dataset_id, &index.to_string(), &raw_join(raw)]),
                dataset_id: dataset_id.clone(),
                fields: Some(fields),
                text: None,
                timestamp,
            }
        })
        .collect();

    debug!(dataset = name, rows = rows.len(), "imported CSV dataset");
    Ok(Dataset {
        id: dataset_id,
        name: name.to_string(),
        columns,
        column_types,
        rows,
        created_at: imported_at,
    })
}

/// Split free text into a dataset of text records.
///
/// Entries are separated by blank lines; text without blank lines falls
/// back to one entry per non-empty line. A leading date ("July 2nd -",
/// "2024-07-02:") becomes the record timestamp.
pub fn dataset_from_text(content: &str, name: &str) -> Dataset {
    let mut entries: Vec<&str> = content
        .split("\n\n")
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .collect();
    if entries.len() <= 1 {
        entries = content
            .lines()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .collect();
    }

    let dataset_id = generate_id(&[name, "text"]);
    let imported_at = Utc::now();
    let rows: Vec<Record> = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let timestamp = leading_entry_date(entry)
                .and_then(to_timestamp)
                .unwrap_or(imported_at);
            Record {
                id: generate_id(&[&dataset_id, &index.to_string(), entry]),
                dataset_id: dataset_id.clone(),
                fields: None,
                text: Some((*entry).to_string()),
                timestamp,
            }
        })
        .collect();

    debug!(dataset = name, entries = rows.len(), "imported text dataset");
    Dataset {
        id: dataset_id,
        name: name.to_string(),
        columns: vec!["entry".to_string()],
        column_types: HashMap::from([("entry".to_string(), ColumnType::Text)]),
        rows,
        created_at: imported_at,
    }
}

fn cell<'a>(row: &'a StringRecord, columns: &[String], column: &str) -> Option<&'a str> {
    let index = columns.iter().position(|c| c == column)?;
    row.get(index).map(str::trim).filter(|c| !c.is_empty())
}

fn infer_column_types(
    columns: &[String],
    rows: &[StringRecord],
) -> HashMap<String, ColumnType> {
    columns
        .iter()
        .map(|column| {
            let values: Vec<&str> = rows
                .iter()
                .filter_map(|row| cell(row, columns, column))
                .collect();
            let inferred = if values.is_empty() {
                ColumnType::Text
            } else if values.iter().all(|v| v.parse::<f64>().is_ok()) {
                ColumnType::Number
            } else if values.iter().all(|v| {
                let lower = v.to_lowercase();
                TRUE_WORDS.contains(&lower.as_str()) || FALSE_WORDS.contains(&lower.as_str())
            }) {
                ColumnType::Bool
            } else {
                ColumnType::Text
            };
            (column.clone(), inferred)
        })
        .collect()
}

fn scalar_for(text: &str, column_type: ColumnType) -> ScalarValue {
    match column_type {
        ColumnType::Number => text
            .parse::<f64>()
            .map(ScalarValue::Number)
            .unwrap_or(ScalarValue::Null),
        ColumnType::Bool => {
            let lower = text.to_lowercase();
            if TRUE_WORDS.contains(&lower.as_str()) {
                ScalarValue::Bool(true)
            } else if FALSE_WORDS.contains(&lower.as_str()) {
                ScalarValue::Bool(false)
            } else {
                ScalarValue::Null
            }
        }
        ColumnType::Text => ScalarValue::Text(text.to_string()),
    }
}

fn to_timestamp(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
}

fn raw_join(row: &StringRecord) -> String {
    row.iter().collect::<Vec<&str>>().join(",")
}
