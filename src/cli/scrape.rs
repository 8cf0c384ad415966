use std::path::Path;

use anyhow::Result;

use equalify::config::EqualifyConfig;
use equalify::scholarship::load;
use equalify::scrape::{self, HttpFetcher, FETCH_FAILED};

/// Crawl the listing pages, write the results as JSON and optionally load
/// them straight into the store.
pub async fn scrape(config: &EqualifyConfig, out: &Path, store: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(&config.scraper)?;
    let records = scrape::scrape(&fetcher, &config.scraper).await?;
    scrape::write_json(out, &records)?;

    let failed = records
        .iter()
        .filter(|r| r.description == FETCH_FAILED)
        .count();
    println!(
        "Scraped {} scholarships into {} ({} pages could not be fetched).",
        records.len(),
        out.display(),
        failed
    );

    if store {
        let conn = equalify::db::open_database(config.resolved_db_path())?;
        let report = load::load_json(&conn, out)?;
        println!(
            "Stored {} new scholarships ({} already present, {} failed).",
            report.inserted.len(),
            report.duplicates,
            report.failed
        );
    }

    Ok(())
}
