//! File interfaces: newline-separated input texts and the CSV result table.
//!
//! The table has one row per input text with the header
//! `text_id,text,entities,entity_count,processed,error`. The `entities`
//! column holds the JSON-serialized entity list.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::Result;
use crate::types::{Entity, Judgment};

/// One row of the batch result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    /// Zero-based index of the text in the input.
    pub text_id: usize,
    pub text: String,
    /// JSON array of entities.
    pub entities: String,
    pub entity_count: usize,
    /// `false` when the row holds a fallback.
    #[serde(deserialize_with = "lenient_bool")]
    pub processed: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl BatchRow {
    /// Build the row for input `text_id` from its extraction judgment.
    pub fn from_judgment(text_id: usize, text: &str, judgment: &Judgment<Vec<Entity>>) -> Self {
        let entities = judgment.value();
        Self {
            text_id,
            text: text.to_string(),
            // serializing plain structs of strings and floats cannot fail
            entities: serde_json::to_string(entities).unwrap_or_else(|_| "[]".to_string()),
            entity_count: entities.len(),
            processed: !judgment.is_fallback(),
            error: judgment.failure().map(|f| f.message().to_string()),
        }
    }

    /// Decode the `entities` column. Empty cells decode to an empty list.
    pub fn parse_entities(&self) -> Result<Vec<Entity>> {
        let raw = self.entities.trim();
        if raw.is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(raw)?)
    }
}

/// Accepts `true`/`false` as well as the `True`/`False`/`1`/`0` spellings
/// other tools write.
fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid boolean: {other}"))),
    }
}

/// Split file contents into texts: one per line, trimmed, blank lines skipped.
pub fn parse_texts(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read newline-separated texts from a file.
pub fn read_texts(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let texts = parse_texts(&content);
    debug!(path = %path.display(), count = texts.len(), "read input texts");
    Ok(texts)
}

/// Write rows as CSV (with header) to any writer.
pub fn write_rows_to<W: Write>(writer: W, rows: &[BatchRow]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// Read CSV rows (with header) from any reader.
pub fn read_rows_from<R: Read>(reader: R) -> Result<Vec<BatchRow>> {
    let mut csv = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for row in csv.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Write the result table to `path`, replacing any existing file.
pub fn write_rows(path: &Path, rows: &[BatchRow]) -> Result<()> {
    write_rows_to(File::create(path)?, rows)?;
    debug!(path = %path.display(), rows = rows.len(), "wrote result table");
    Ok(())
}

/// Read the result table from `path`.
pub fn read_rows(path: &Path) -> Result<Vec<BatchRow>> {
    read_rows_from(File::open(path)?)
}
