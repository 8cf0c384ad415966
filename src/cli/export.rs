use anyhow::Result;

use equalify::config::EqualifyConfig;
use equalify::scholarship::store;

/// Export every scholarship as a JSON array on stdout.
pub fn export(config: &EqualifyConfig) -> Result<()> {
    let conn = equalify::db::open_database(config.resolved_db_path())?;
    let records = store::list_all(&conn)?;

    let json = serde_json::to_string_pretty(&records)?;
    println!("{json}");

    eprintln!("Exported {} scholarships.", records.len());
    Ok(())
}
