use anyhow::Result;

use equalify::augment::{self, OpenAiExtractor};
use equalify::config::EqualifyConfig;

/// Extract structured fields for every record not yet augmented.
pub async fn augment(config: &EqualifyConfig, limit: Option<usize>) -> Result<()> {
    if config.augment.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        anyhow::bail!("no API key configured: set OPENAI_API_KEY or augment.api_key");
    }

    let mut conn = equalify::db::open_database(config.resolved_db_path())?;
    let extractor = OpenAiExtractor::new(&config.augment)?;
    let report = augment::augment_pending(&mut conn, &extractor, limit).await?;

    println!("Augmentation ({})", config.augment.model);
    println!("{}", "=".repeat(40));
    println!("  Processed:    {}", report.processed);
    println!("  Augmented:    {}", report.augmented);
    println!("  Skipped:      {}", report.skipped);
    println!("  Failed:       {}", report.failed);
    Ok(())
}
