//! CLI `doctor` command: database diagnostics.

use anyhow::{Context, Result};

use equalify::config::EqualifyConfig;
use equalify::db;

/// Run database diagnostics and print a health report.
pub fn doctor(config: &EqualifyConfig) -> Result<()> {
    let db_path = config.resolved_db_path();

    if !db_path.exists() {
        println!("Database: not found at {}", db_path.display());
        println!("Run `equalify load <file>` to create it.");
        return Ok(());
    }

    let file_size = std::fs::metadata(&db_path).map(|m| m.len()).unwrap_or(0);

    let conn = db::open_database(&db_path).context("failed to open database (may be corrupt)")?;
    let report = db::check_database_health(&conn).context("failed to run health check")?;

    println!("Equalify Health Report");
    println!("======================");
    println!();
    println!("Database:          {}", db_path.display());
    println!("File size:         {}", format_bytes(file_size));
    println!("Schema version:    {}", report.schema_version);
    println!();
    println!("Augmentation:");
    println!("  Model:           {}", config.augment.model);
    let key = config.augment.api_key.as_deref().is_some_and(|k| !k.trim().is_empty());
    println!("  API key:         {}", if key { "set" } else { "(not set)" });
    println!();
    println!("Row counts:");
    println!("  Scholarships:    {}", report.scholarship_count);
    println!("  Audit log:       {}", report.log_count);
    println!();
    if report.integrity_ok {
        println!("Integrity check:   PASSED");
    } else {
        println!("Integrity check:   FAILED ({})", report.integrity_details);
        println!();
        println!("Recovery steps:");
        println!("  1. Restore from a backup: cp backup.db ~/.equalify/scholarships.db");
        println!("  2. Or export from a good copy and reload:");
        println!("     equalify export > backup.json");
        println!("     equalify load backup.json");
    }

    Ok(())
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
