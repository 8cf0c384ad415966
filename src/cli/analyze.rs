use std::path::Path;

use anyhow::{Context, Result};

use equalify::analysis;
use equalify::config::EqualifyConfig;
use equalify::scholarship::store;

use super::preview;

/// Run the corpus analysis and print a summary; optionally write the full
/// report as JSON.
pub fn analyze(config: &EqualifyConfig, out: Option<&Path>) -> Result<()> {
    let conn = equalify::db::open_database(config.resolved_db_path())?;
    let records = store::list_all(&conn)?;
    let report = analysis::analyze_corpus(&records, &config.analysis);

    if report.is_empty() {
        println!("No scholarships with descriptions to analyze.");
        return Ok(());
    }

    println!("Corpus Analysis");
    println!("{}", "=".repeat(40));
    println!("  Documents:    {}", report.documents.len());
    println!("  Terms:        {}", report.features);
    println!();

    println!("Clusters:");
    for c in &report.clusters {
        println!(
            "  {:<4} size {:<5} mean score {:<6.2} sentiment {:.3}",
            c.cluster, c.size, c.mean_dei_score, c.mean_sentiment
        );
    }
    println!();

    println!("Topics:");
    for t in &report.topics {
        println!("  {:<4} {}", t.index, t.words.join(", "));
    }
    println!();

    println!("Top scoring:");
    for (i, s) in report.top_scoring.iter().enumerate() {
        println!("  {}. {} (score {})", i + 1, s.title, s.dei_score);
        println!("     {}", preview(&s.description, 100));
    }

    if let Some(path) = out {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!();
        println!("Report written to {}", path.display());
    }

    Ok(())
}
