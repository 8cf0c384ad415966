pub mod analyze;
pub mod augment;
pub mod doctor;
pub mod export;
pub mod load;
pub mod scrape;
pub mod search;
pub mod stats;

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub(crate) fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}
