// src/storage/records.rs
//
// Loading tagged records from JSON files. The core only needs tags; the
// whole object is kept so the output can reproduce it verbatim.

use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::{ClusteringError, Result};
use crate::models::SourceRecord;

/// Which attributes of each JSON object feed the clustering.
#[derive(Debug, Clone)]
pub struct RecordFields {
    pub tags_field: String,
    pub diversity_field: Option<String>,
}

impl RecordFields {
    pub fn new(tags_field: impl Into<String>, diversity_field: Option<String>) -> Self {
        Self {
            tags_field: tags_field.into(),
            diversity_field,
        }
    }
}

/// Reads a JSON array, or JSON lines when the extension is `.jsonl`/`.ndjson`.
pub fn load_records(path: &Path, fields: &RecordFields) -> Result<Vec<SourceRecord>> {
    let content = fs::read_to_string(path)?;
    let values = if is_json_lines(path) {
        parse_json_lines(&content)?
    } else {
        match serde_json::from_str::<Value>(&content)? {
            Value::Array(values) => values,
            other => {
                return Err(ClusteringError::invalid_record(
                    0,
                    format!("expected a JSON array of records, found {}", type_name(&other)),
                ))
            }
        }
    };

    let records = records_from_values(values, fields)?;
    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Validates and converts already-parsed JSON values, row by row.
pub fn records_from_values(values: Vec<Value>, fields: &RecordFields) -> Result<Vec<SourceRecord>> {
    values
        .into_iter()
        .enumerate()
        .map(|(row, value)| record_from_value(row, value, fields))
        .collect()
}

fn record_from_value(row: usize, value: Value, fields: &RecordFields) -> Result<SourceRecord> {
    let object = value
        .as_object()
        .ok_or_else(|| ClusteringError::invalid_record(row, format!("expected an object, found {}", type_name(&value))))?;

    let tags_value = object
        .get(&fields.tags_field)
        .ok_or_else(|| ClusteringError::invalid_record(row, format!("missing `{}` attribute", fields.tags_field)))?;
    let tags = string_array(tags_value).ok_or_else(|| {
        ClusteringError::invalid_record(
            row,
            format!("`{}` must be an array of strings", fields.tags_field),
        )
    })?;

    let facets = match &fields.diversity_field {
        Some(field) => match object.get(field) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::String(single)) => vec![single.clone()],
            Some(other) => string_array(other).ok_or_else(|| {
                ClusteringError::invalid_record(
                    row,
                    format!("`{}` must be a string or an array of strings", field),
                )
            })?,
        },
        None => Vec::new(),
    };

    Ok(SourceRecord {
        row,
        tags,
        facets,
        data: value,
    })
}

/// Strings of a JSON array, first occurrence kept; `None` if anything else is inside.
fn string_array(value: &Value) -> Option<Vec<String>> {
    let items = value.as_array()?;
    let mut seen = HashSet::with_capacity(items.len());
    let mut strings = Vec::with_capacity(items.len());
    for item in items {
        let tag = item.as_str()?;
        if seen.insert(tag) {
            strings.push(tag.to_string());
        }
    }
    Some(strings)
}

fn parse_json_lines(content: &str) -> Result<Vec<Value>> {
    let mut values = Vec::new();
    for (line_number, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            debug!("Skipping blank line {}", line_number + 1);
            continue;
        }
        values.push(serde_json::from_str(line)?);
    }
    Ok(values)
}

fn is_json_lines(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("jsonl") | Some("ndjson")
    )
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
