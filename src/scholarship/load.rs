//! Bulk ingestion of scholarship files.
//!
//! JSON files hold an array of scholarship objects (the scraper's output is
//! one). CSV files hold one scholarship per row; every column is kept in the
//! stored document alongside a composed `description`. Records are inserted
//! one at a time and a bad record never aborts the load.

use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::scholarship::store::{self, InsertOutcome};

/// Columns the description is composed from, in order, with their labels.
const CSV_DESCRIPTION_COLUMNS: [(&str, &str); 7] = [
    ("Scholarship", "Scholarship Name"),
    ("Deadline", "Deadline"),
    ("Amount", "Amount"),
    ("Location", "Location"),
    ("Years", "Years"),
    ("Link", "Link"),
    ("Details", "Description"),
];

/// Summary of a load run.
#[derive(Debug, Default, Serialize)]
pub struct LoadReport {
    /// Store ids of the inserted records, in file order.
    pub inserted: Vec<String>,
    /// Records already present (same source key).
    pub duplicates: usize,
    pub failed: usize,
}

impl LoadReport {
    fn record(&mut self, outcome: Result<InsertOutcome>, position: usize) {
        match outcome {
            Ok(InsertOutcome::Inserted { id }) => {
                info!(%id, position, "inserted scholarship");
                self.inserted.push(id);
            }
            Ok(InsertOutcome::Duplicate { source_key }) => {
                info!(%source_key, position, "scholarship already loaded, skipping");
                self.duplicates += 1;
            }
            Err(e) => {
                warn!(position, error = %e, "failed to load scholarship");
                self.failed += 1;
            }
        }
    }
}

/// Load a `.json` or `.csv` file, chosen by extension.
pub fn load_file(conn: &Connection, path: &Path) -> Result<LoadReport> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("json") => load_json(conn, path),
        Some("csv") => load_csv(conn, path),
        _ => bail!(
            "unsupported file type: {} (expected .json or .csv)",
            path.display()
        ),
    }
}

/// Load a JSON array of scholarship objects.
pub fn load_json(conn: &Connection, path: &Path) -> Result<LoadReport> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let data: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
    let Value::Array(items) = data else {
        bail!("{} must contain a JSON array of scholarships", path.display());
    };

    let file_name = file_label(path);
    let pb = progress_bar(items.len() as u64, "Loading scholarships");
    let mut report = LoadReport::default();

    for (index, item) in items.iter().enumerate() {
        let source_key = item
            .get("id")
            .and_then(id_text)
            .map(|id| format!("{file_name}#{id}"));
        report.record(
            store::insert_document(conn, item, source_key.as_deref()),
            index,
        );
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(report)
}

/// Load a CSV file with a header row.
pub fn load_csv(conn: &Connection, path: &Path) -> Result<LoadReport> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("failed to read CSV header in {}", path.display()))?
        .clone();

    let file_name = file_label(path);
    let pb = ProgressBar::new_spinner();
    pb.set_message("Loading scholarships");
    let mut report = LoadReport::default();

    for (index, row) in reader.records().enumerate() {
        let outcome = row
            .context("malformed CSV row")
            .and_then(|row| csv_document(&headers, &row, index))
            .and_then(|doc| {
                let source_key = format!("{file_name}#{}", index + 1);
                store::insert_document(conn, &doc, Some(&source_key))
            });
        report.record(outcome, index);
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(report)
}

/// Build the stored document for one CSV row: every source column verbatim,
/// a 1-based `id` unless the row has its own, a `title` and the composed
/// `description`.
pub fn csv_document(
    headers: &csv::StringRecord,
    row: &csv::StringRecord,
    index: usize,
) -> Result<Value> {
    let mut doc = Map::new();
    for (header, value) in headers.iter().zip(row.iter()) {
        doc.insert(header.to_string(), Value::String(value.to_string()));
    }

    let mut lines = Vec::with_capacity(CSV_DESCRIPTION_COLUMNS.len());
    for (label, column) in CSV_DESCRIPTION_COLUMNS {
        let Some(value) = doc.get(column).and_then(Value::as_str) else {
            bail!("row {} is missing column {column:?}", index + 1);
        };
        lines.push(format!("{label}: {value}"));
    }
    let description = lines.join("\n");

    if let Some(name) = doc.get("Scholarship Name").cloned() {
        doc.entry("title").or_insert(name);
    }
    // A source `id` column wins over the row number.
    if doc.get("id").and_then(id_text).is_none() {
        doc.insert("id".into(), Value::from(index as u64 + 1));
    }
    doc.insert("description".into(), Value::String(description));
    Ok(Value::Object(doc))
}

fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn progress_bar(len: u64, message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} {bar:40.cyan/blue} {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message(message);
    pb
}
