#![allow(dead_code)]

use equalify::db;
use equalify::scholarship::store::{self, InsertOutcome};
use rusqlite::Connection;
use serde_json::{json, Value};

/// Open a fresh in-memory database with schema and migrations applied.
pub fn test_db() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    conn.pragma_update(None, "foreign_keys", "ON").unwrap();
    db::schema::init_schema(&conn).unwrap();
    db::migrations::run_migrations(&conn).unwrap();
    conn
}

/// Insert a document and return its store id.
pub fn insert(conn: &Connection, document: Value) -> String {
    match store::insert_document(conn, &document, None).unwrap() {
        InsertOutcome::Inserted { id } => id,
        other => panic!("expected insert, got {other:?}"),
    }
}

/// A small, varied collection covering every filterable field.
pub fn sample_documents() -> Vec<Value> {
    vec![
        json!({
            "title": "Hispanic Engineers Award",
            "description": "Supports Hispanic students pursuing engineering with strong grades.",
            "preferred_ethnicity": "Hispanic",
            "preferred_gender": null,
            "preferred_major": "Mechanical Engineering",
            "university": "Arizona State University",
            "location": "Arizona",
            "reward": 2500,
            "due_date": "2025-03-01",
            "is_merit_based": true,
            "first_generation": true,
        }),
        json!({
            "title": "Women in Computing Scholarship",
            "description": "For women majoring in computer science. Essay required.",
            "preferred_gender": "Female",
            "preferred_major": "Computer Science",
            "university": "Arizona State University",
            "reward": 5000,
            "due_date": "2025-01-15",
            "women_in_stem": true,
            "is_essay_required": true,
        }),
        json!({
            "title": "Rural Nursing Grant",
            "description": "Rural students studying nursing; low-income applicants preferred.",
            "preferred_major": "Nursing",
            "location": "Flagstaff",
            "reward": 0,
            "due_date": "2025-06-30",
            "rural": true,
            "low_income": true,
        }),
        json!({
            "title": "Open Community Award",
            "description": "Any student who volunteers in their community.",
            "extra_requirements": "Two letters of recommendation",
        }),
    ]
}

/// Insert [`sample_documents`] and return the ids in the same order.
pub fn seed(conn: &Connection) -> Vec<String> {
    sample_documents()
        .into_iter()
        .map(|doc| insert(conn, doc))
        .collect()
}
