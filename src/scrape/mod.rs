//! Scholarship discovery crawler.
//!
//! Walks the paginated listing, collects detail-page links (deduplicated,
//! first-seen order) and reads each detail page's description text. Fetching
//! goes through [`PageFetcher`] so the crawl logic can be exercised offline.

pub mod html;

use std::collections::HashSet;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ScraperConfig;

pub use html::{MISSING_HEADING, MISSING_PARENT};

/// Description stored when a detail page could not be fetched at all.
pub const FETCH_FAILED: &str = "Page could not be fetched";

/// One scraped detail page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedScholarship {
    /// Last path segment of the detail URL.
    pub id: String,
    pub url: String,
    pub description: String,
}

/// Source of page bodies.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String>> + Send;
}

/// [`PageFetcher`] backed by a shared `reqwest` client.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("{url} returned HTTP {status}");
        }
        response
            .text()
            .await
            .with_context(|| format!("failed to read body of {url}"))
    }
}

/// Listing page URLs `listing_url + 0 .. listing_url + (pages - 1)`.
pub fn listing_urls(config: &ScraperConfig) -> Vec<String> {
    (0..config.pages)
        .map(|page| format!("{}{page}", config.listing_url))
        .collect()
}

/// Links starting with `prefix` and naming something beyond it, deduplicated
/// in first-seen order.
pub fn detail_links(links: &[String], prefix: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    links
        .iter()
        .filter(|link| {
            link.strip_prefix(prefix)
                .is_some_and(|rest| !rest.trim_matches('/').is_empty())
        })
        .filter(|link| seen.insert(link.as_str()))
        .cloned()
        .collect()
}

/// Last non-empty path segment of a URL.
pub fn source_id(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(segment) = parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        {
            return segment.to_string();
        }
    }
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

/// Crawl listing pages, then every distinct detail page.
///
/// A listing page that fails to load is skipped; a detail page that fails to
/// load is still recorded, with [`FETCH_FAILED`] as its description.
pub async fn scrape<F: PageFetcher>(
    fetcher: &F,
    config: &ScraperConfig,
) -> Result<Vec<ScrapedScholarship>> {
    let mut links = Vec::new();
    for url in listing_urls(config) {
        match fetcher.fetch(&url).await {
            Ok(body) => {
                let found = html::extract_links(&body, &url);
                debug!(%url, links = found.len(), "listing page scanned");
                links.extend(found);
            }
            Err(e) => warn!(%url, error = %e, "skipping listing page"),
        }
    }

    let details = detail_links(&links, &config.detail_prefix);
    info!(count = details.len(), "found scholarship detail pages");

    let pb = ProgressBar::new(details.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} {bar:40.cyan/blue} {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("Scraping scholarships");

    let mut scraped = Vec::with_capacity(details.len());
    for url in details {
        let description = match fetcher.fetch(&url).await {
            Ok(body) => html::page_description(&body),
            Err(e) => {
                warn!(%url, error = %e, "detail page fetch failed");
                FETCH_FAILED.to_string()
            }
        };
        scraped.push(ScrapedScholarship {
            id: source_id(&url),
            url,
            description,
        });
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(scraped)
}

/// Write scraped records as a pretty-printed JSON array.
pub fn write_json(path: &Path, records: &[ScrapedScholarship]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(records)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), count = records.len(), "wrote scraped scholarships");
    Ok(())
}
