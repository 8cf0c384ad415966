//! Read and write paths for the scholarship collection.
//!
//! Every mutation writes an entry to `scholarship_log`. The augmentation write
//! path ([`apply_augmentation`]) runs in a transaction and refuses to touch a
//! record that already carries the `augmented_at` marker.

use anyhow::{bail, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::scholarship::types::{ListKind, Scholarship};

/// Outcome of [`insert_document`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum InsertOutcome {
    Inserted { id: String },
    /// A record with the same source key was loaded before; nothing written.
    Duplicate { source_key: String },
}

/// Outcome of [`apply_augmentation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AugmentWrite {
    Applied,
    AlreadyAugmented,
}

/// Insert a new document. `source_key` identifies the record in its source
/// (file + row id) so repeated loads do not create duplicates.
pub fn insert_document(
    conn: &Connection,
    document: &Value,
    source_key: Option<&str>,
) -> Result<InsertOutcome> {
    let Value::Object(map) = document else {
        bail!("scholarship document must be a JSON object");
    };

    if let Some(key) = source_key {
        let exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM scholarships WHERE source_key = ?1",
            params![key],
            |row| row.get(0),
        )?;
        if exists {
            return Ok(InsertOutcome::Duplicate {
                source_key: key.to_string(),
            });
        }
    }

    // Store bookkeeping lives outside the document. An exported record keeps
    // its augmentation marker so reloading it never re-augments.
    let mut map = map.clone();
    map.remove("_id");
    let augmented_at = map
        .remove("_augmented_at")
        .and_then(|v| v.as_str().map(String::from))
        .filter(|v| !v.trim().is_empty());

    let id = uuid::Uuid::now_v7().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let json = serde_json::to_string(&map)?;

    conn.execute(
        "INSERT INTO scholarships (id, source_key, document, augmented_at, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![id, source_key, json, augmented_at, now],
    )?;

    let mut details = Map::new();
    if let Some(key) = source_key {
        details.insert("source_key".into(), Value::from(key));
    }
    if let Some(marker) = &augmented_at {
        details.insert("augmented_at".into(), Value::from(marker.as_str()));
    }
    write_audit_log(
        conn,
        "insert",
        &id,
        (!details.is_empty()).then(|| Value::Object(details)).as_ref(),
    )?;

    Ok(InsertOutcome::Inserted { id })
}

/// Fetch a single scholarship by store id.
pub fn get(conn: &Connection, id: &str) -> Result<Option<Scholarship>> {
    let row: Option<Row> = conn
        .query_row(
            "SELECT id, document, augmented_at FROM scholarships WHERE id = ?1",
            params![id],
            read_row,
        )
        .optional()?;

    row.map(decode).transpose()
}

/// Fetch several scholarships, preserving the order of `ids`. Unknown ids are
/// skipped.
pub fn get_many(conn: &Connection, ids: &[String]) -> Result<Vec<Scholarship>> {
    let mut stmt =
        conn.prepare("SELECT id, document, augmented_at FROM scholarships WHERE id = ?1")?;
    let mut out = Vec::with_capacity(ids.len());
    for id in ids {
        let row: Option<Row> = stmt.query_row(params![id], read_row).optional()?;
        if let Some(row) = row {
            out.push(decode(row)?);
        }
    }
    Ok(out)
}

/// Every scholarship, in insertion order.
pub fn list_all(conn: &Connection) -> Result<Vec<Scholarship>> {
    query_documents(
        conn,
        "SELECT id, document, augmented_at FROM scholarships ORDER BY created_at, id",
    )
}

/// Scholarships that have not been augmented yet, in insertion order.
pub fn list_pending_augmentation(conn: &Connection) -> Result<Vec<Scholarship>> {
    query_documents(
        conn,
        "SELECT id, document, augmented_at FROM scholarships WHERE augmented_at IS NULL \
         ORDER BY created_at, id",
    )
}

pub fn count(conn: &Connection) -> Result<u64> {
    let n: i64 = conn.query_row("SELECT COUNT(*) FROM scholarships", [], |row| row.get(0))?;
    Ok(n as u64)
}

/// Persist a saved/applied/favorited mark as a boolean document field.
pub fn set_flag(conn: &Connection, id: &str, kind: ListKind, value: bool) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let path = format!("$.{}", kind.as_str());
    let tx = conn.unchecked_transaction()?;
    let rows = tx.execute(
        "UPDATE scholarships SET document = json_set(document, ?1, json(?2)), updated_at = ?3 \
         WHERE id = ?4",
        params![path, if value { "true" } else { "false" }, now, id],
    )?;
    if rows == 0 {
        bail!("scholarship not found: {id}");
    }
    write_audit_log(
        &tx,
        "flag",
        id,
        Some(&serde_json::json!({ "flag": kind.as_str(), "value": value })),
    )?;
    tx.commit()?;
    Ok(())
}

/// Merge augmented fields into a stored record and stamp the augmentation
/// marker. A record that already carries the marker is left untouched.
pub fn apply_augmentation(
    conn: &mut Connection,
    id: &str,
    fields: &Map<String, Value>,
    model: &str,
) -> Result<AugmentWrite> {
    let tx = conn.transaction()?;

    let row: Option<(String, Option<String>)> = tx
        .query_row(
            "SELECT document, augmented_at FROM scholarships WHERE id = ?1",
            params![id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    let Some((doc_json, augmented_at)) = row else {
        bail!("scholarship not found: {id}");
    };

    if augmented_at.is_some() {
        return Ok(AugmentWrite::AlreadyAugmented);
    }

    let mut document: Map<String, Value> = serde_json::from_str(&doc_json)?;
    crate::augment::merge_fields(&mut document, fields);

    let now = chrono::Utc::now().to_rfc3339();
    tx.execute(
        "UPDATE scholarships SET document = ?1, augmented_at = ?2, augmented_model = ?3, updated_at = ?2 \
         WHERE id = ?4",
        params![serde_json::to_string(&document)?, now, model, id],
    )?;

    let keys: Vec<&String> = fields.keys().collect();
    write_audit_log(
        &tx,
        "augment",
        id,
        Some(&serde_json::json!({ "model": model, "fields": keys })),
    )?;

    tx.commit()?;
    Ok(AugmentWrite::Applied)
}

/// `augmented_at` marker for a record, if any.
#[cfg(test)]
pub(crate) fn augmented_at(conn: &Connection, id: &str) -> Result<Option<String>> {
    let marker: Option<Option<String>> = conn
        .query_row(
            "SELECT augmented_at FROM scholarships WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    Ok(marker.flatten())
}

pub fn delete(conn: &Connection, id: &str) -> Result<()> {
    let rows = conn.execute("DELETE FROM scholarships WHERE id = ?1", params![id])?;
    if rows == 0 {
        bail!("scholarship not found: {id}");
    }
    write_audit_log(conn, "delete", id, None)?;
    Ok(())
}

fn query_documents(conn: &Connection, sql: &str) -> Result<Vec<Scholarship>> {
    let mut stmt = conn.prepare(sql)?;
    let rows: Vec<Row> = stmt
        .query_map([], read_row)?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(decode).collect()
}

/// `(id, document, augmented_at)`
type Row = (String, String, Option<String>);

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Row> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
}

fn decode((id, document, augmented_at): Row) -> Result<Scholarship> {
    let document: Map<String, Value> = serde_json::from_str(&document)?;
    let mut record = Scholarship::new(id, document);
    record.augmented_at = augmented_at;
    Ok(record)
}

/// Write an entry to the scholarship_log audit table.
pub(crate) fn write_audit_log(
    conn: &Connection,
    operation: &str,
    scholarship_id: &str,
    details: Option<&Value>,
) -> Result<()> {
    let now = chrono::Utc::now().to_rfc3339();
    let details_json = details.map(|d| d.to_string());
    conn.execute(
        "INSERT INTO scholarship_log (operation, scholarship_id, details, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![operation, scholarship_id, details_json, now],
    )?;
    Ok(())
}
