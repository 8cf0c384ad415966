use anyhow::Result;

use equalify::config::EqualifyConfig;
use equalify::scholarship::filter::{self, ScholarshipFilter, SortOrder};
use equalify::scholarship::store;

use super::preview;

/// Filter the store from the terminal and print one page of matches.
pub fn search(
    config: &EqualifyConfig,
    filter: &ScholarshipFilter,
    order: SortOrder,
    page: usize,
) -> Result<()> {
    let conn = equalify::db::open_database(config.resolved_db_path())?;
    let matched = filter::search(store::list_all(&conn)?, filter, order);
    let page = filter::paginate(&matched, page, config.search.page_size);

    if page.total_items == 0 {
        println!("No scholarships match.");
        return Ok(());
    }

    println!(
        "Found {} scholarship(s), page {} of {}\n",
        page.total_items, page.page, page.total_pages
    );

    for record in &page.items {
        let due = record
            .due_date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "no due date".into());
        let reward = record
            .reward()
            .map(|r| format!("${r:.0}"))
            .unwrap_or_else(|| "reward unknown".into());
        println!("  {} [{}] {}, {}", record.display_title(), record.id, due, reward);
        if let Some(description) = record.description() {
            println!("     {}", preview(description, 120));
        }
        println!();
    }

    Ok(())
}
