use anyhow::Result;
use rusqlite::Connection;
use serde::Serialize;

/// Counts over the scholarship collection.
#[derive(Debug, Serialize)]
pub struct CollectionStats {
    pub total: u64,
    pub augmented: u64,
    pub pending: u64,
    pub saved: u64,
    pub applied: u64,
    pub favorited: u64,
    pub with_due_date: u64,
    pub with_reward: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newest: Option<String>,
}

pub fn collection_stats(conn: &Connection) -> Result<CollectionStats> {
    let total = count(conn, "1 = 1")?;
    let augmented = count(conn, "augmented_at IS NOT NULL")?;
    let saved = count(conn, "json_extract(document, '$.saved') = 1")?;
    let applied = count(conn, "json_extract(document, '$.applied') = 1")?;
    let favorited = count(conn, "json_extract(document, '$.favorited') = 1")?;
    let with_due_date = count(conn, "json_type(document, '$.due_date') = 'text'")?;
    let with_reward = count(
        conn,
        "json_type(document, '$.reward') IN ('integer', 'real', 'text')",
    )?;

    let (oldest, newest): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(created_at), MAX(created_at) FROM scholarships",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(CollectionStats {
        total,
        augmented,
        pending: total - augmented,
        saved,
        applied,
        favorited,
        with_due_date,
        with_reward,
        oldest,
        newest,
    })
}

fn count(conn: &Connection, predicate: &str) -> Result<u64> {
    let sql = format!("SELECT COUNT(*) FROM scholarships WHERE {predicate}");
    let n: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::scholarship::store::{self, InsertOutcome};
    use crate::scholarship::types::ListKind;
    use serde_json::json;

    #[test]
    fn empty_collection() {
        let conn = db::open_memory_database().unwrap();
        let stats = collection_stats(&conn).unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.pending, 0);
        assert!(stats.oldest.is_none());
    }

    #[test]
    fn counts_flags_and_fields() {
        let mut conn = db::open_memory_database().unwrap();
        let mut ids = Vec::new();
        for doc in [
            json!({"title": "a", "reward": 100, "due_date": "2024-10-01"}),
            json!({"title": "b", "reward": "$200"}),
            json!({"title": "c"}),
        ] {
            if let InsertOutcome::Inserted { id } = store::insert_document(&conn, &doc, None).unwrap() {
                ids.push(id);
            }
        }
        store::set_flag(&conn, &ids[0], ListKind::Saved, true).unwrap();
        store::set_flag(&conn, &ids[1], ListKind::Saved, false).unwrap();
        store::set_flag(&conn, &ids[2], ListKind::Favorited, true).unwrap();
        let fields = json!({"is_merit_based": true});
        store::apply_augmentation(&mut conn, &ids[2], fields.as_object().unwrap(), "m").unwrap();

        let stats = collection_stats(&conn).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.augmented, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.saved, 1);
        assert_eq!(stats.applied, 0);
        assert_eq!(stats.favorited, 1);
        assert_eq!(stats.with_due_date, 1);
        assert_eq!(stats.with_reward, 2);
        assert!(stats.oldest.is_some());
    }
}
