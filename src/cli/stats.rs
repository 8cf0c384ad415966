use anyhow::Result;

use equalify::config::EqualifyConfig;

/// Display collection statistics in the terminal.
pub fn stats(config: &EqualifyConfig) -> Result<()> {
    let conn = equalify::db::open_database(config.resolved_db_path())?;
    let s = equalify::scholarship::stats::collection_stats(&conn)?;

    println!("Scholarship Statistics");
    println!("{}", "=".repeat(40));
    println!("  Total scholarships:  {}", s.total);
    println!("  Augmented:           {}", s.augmented);
    println!("  Pending:             {}", s.pending);
    println!();

    println!("Flags:");
    println!("  {:<12} {}", "saved", s.saved);
    println!("  {:<12} {}", "applied", s.applied);
    println!("  {:<12} {}", "favorited", s.favorited);
    println!();

    println!("With due date:         {}", s.with_due_date);
    println!("With reward:           {}", s.with_reward);
    if let Some(ref oldest) = s.oldest {
        println!("Oldest record:         {oldest}");
    }
    if let Some(ref newest) = s.newest {
        println!("Newest record:         {newest}");
    }

    Ok(())
}
