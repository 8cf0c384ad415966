use std::path::Path;

use anyhow::Result;

use equalify::config::EqualifyConfig;

/// Load a JSON or CSV file of scholarships into the store.
pub fn load(config: &EqualifyConfig, file: &Path) -> Result<()> {
    let conn = equalify::db::open_database(config.resolved_db_path())?;
    let report = equalify::scholarship::load::load_file(&conn, file)?;

    println!("Loaded {}", file.display());
    println!("  Inserted:     {}", report.inserted.len());
    println!("  Duplicates:   {}", report.duplicates);
    println!("  Failed:       {}", report.failed);
    Ok(())
}
