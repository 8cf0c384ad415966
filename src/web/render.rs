//! Server-side HTML for the search and analysis pages.

use std::fmt::Write as _;

use crate::analysis::metrics::Histogram;
use crate::analysis::CorpusReport;
use crate::scholarship::session::SessionState;
use crate::scholarship::types::{Criterion, ListKind, Scholarship};
use crate::scholarship::SortOrder;
use crate::web::params::{SearchParams, Tab};

/// Ethnicity choices offered in the filter form.
pub const ETHNICITY_OPTIONS: [&str; 5] =
    ["African American", "Hispanic", "Native American", "Asian", "Other"];
/// Gender choices offered in the filter form.
pub const GENDER_OPTIONS: [&str; 4] = ["Female", "Male", "Non-binary", "Other"];

const CLUSTER_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;color:#222}\
header{padding:12px 24px;background:linear-gradient(90deg,#e40303,#ff8c00,#ffed00,#008026,#004dff,#750787);}\
header a{color:#fff;font-weight:600;margin-right:16px;text-decoration:none}\
.layout{display:flex;gap:24px;padding:24px}\
aside{width:280px;flex-shrink:0}\
aside label{display:block;margin:8px 0 2px;font-size:14px}\
aside input[type=text],aside input[type=number],aside input[type=date],aside select{width:100%;box-sizing:border-box}\
aside .check{display:flex;gap:6px;align-items:center;margin:2px 0}\
main{flex:1;min-width:0}\
.tabs a{display:inline-block;padding:6px 12px;border:1px solid #ccc;border-bottom:none;margin-right:4px;text-decoration:none;color:#333}\
.tabs a.active{background:#333;color:#fff}\
.card{border-bottom:1px solid #ddd;padding:12px 0}\
.description{white-space:pre-line}\
.fields{list-style:none;padding:0}\
.actions{display:flex;gap:8px;flex-wrap:wrap}\
.actions form{margin:0}\
.badge{background:green;color:#fff;padding:6px 12px;border-radius:8px}\
.pager{display:flex;gap:16px;align-items:center;margin-top:16px}\
table{border-collapse:collapse;margin:8px 0 24px}\
td,th{border:1px solid #ddd;padding:4px 8px;text-align:left;vertical-align:top}\
svg{background:#fafafa;border:1px solid #eee}";

/// Escape text for HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// US-dollar amount with thousands separators; whole amounts drop cents.
pub fn format_usd(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let (whole, frac) = (cents / 100, cents % 100);
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{frac:02}")
    }
}

/// Reward line text; a zero reward means the amount varies.
pub fn reward_text(amount: f64) -> String {
    if amount == 0.0 {
        "Amount may vary".to_string()
    } else {
        format_usd(amount)
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\
         <title>{}</title><style>{STYLE}</style></head><body>\
         <header><a href=\"/\">Search</a><a href=\"/analysis\">Analysis</a></header>\
         {body}</body></html>",
        escape_html(title)
    )
}

/// Everything the search page shows.
pub struct SearchView<'a> {
    pub params: &'a SearchParams,
    /// Records on the current page (or the whole list on a list tab).
    pub records: &'a [Scholarship],
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub session: &'a SessionState,
    /// University choices for the filter form.
    pub universities: &'a [String],
}

pub fn search_page(view: &SearchView<'_>) -> String {
    let params = view.params;
    let current = params.href(params.tab, (params.tab == Tab::All).then_some(view.page));

    let mut body = String::from("<div class=\"layout\">");
    body.push_str(&filter_form(params, view.universities));
    body.push_str("<main><h1>🔎 Equalify Search</h1>");
    body.push_str(&tabs(params, view.session));

    let summary = match params.tab {
        Tab::All => format!(
            "Found {} scholarships matching your filters and search query.",
            view.total_items
        ),
        Tab::List(ListKind::Saved) => format!("You have saved {} scholarships.", view.total_items),
        Tab::List(ListKind::Applied) => {
            format!("You have applied to {} scholarships.", view.total_items)
        }
        Tab::List(ListKind::Favorited) => {
            format!("You have favorited {} scholarships.", view.total_items)
        }
    };
    let _ = write!(body, "<p class=\"summary\">{}</p>", escape_html(&summary));

    for record in view.records {
        body.push_str(&scholarship_card(record, view.session, params.tab, &current));
    }

    if params.tab == Tab::All && view.total_pages > 0 {
        body.push_str("<nav class=\"pager\">");
        if view.page > 1 {
            let _ = write!(
                body,
                "<a href=\"{}\">Previous</a>",
                escape_html(&params.href(Tab::All, Some(view.page - 1)))
            );
        }
        let _ = write!(body, "<span>Page {} of {}</span>", view.page, view.total_pages);
        if view.page < view.total_pages {
            let _ = write!(
                body,
                "<a href=\"{}\">Next</a>",
                escape_html(&params.href(Tab::All, Some(view.page + 1)))
            );
        }
        body.push_str("</nav>");
    }

    body.push_str("</main></div>");
    layout("Equalify Search", &body)
}

fn tabs(params: &SearchParams, session: &SessionState) -> String {
    let mut out = String::from("<nav class=\"tabs\">");
    for tab in Tab::ALL {
        let label = match tab {
            Tab::All => "All Scholarships".to_string(),
            Tab::List(kind) => format!("{} Scholarships ({})", kind.label(), session.len(kind)),
        };
        let class = if tab == params.tab { " class=\"active\"" } else { "" };
        let _ = write!(
            out,
            "<a{class} href=\"{}\">{}</a>",
            escape_html(&params.href(tab, None)),
            escape_html(&label)
        );
    }
    out.push_str("</nav>");
    out
}

fn filter_form(params: &SearchParams, universities: &[String]) -> String {
    let f = &params.filter;
    let value = |v: Option<&str>| escape_html(v.unwrap_or(""));
    let mut out = String::from(
        "<aside><h2>Filter Scholarships</h2><form method=\"get\" action=\"/\">",
    );
    if params.tab == Tab::All {
        // A new query starts from the first page.
        out.push_str("<input type=\"hidden\" name=\"page\" value=\"1\">");
    } else {
        let _ = write!(
            out,
            "<input type=\"hidden\" name=\"tab\" value=\"{}\">",
            params.tab.as_str()
        );
    }

    let _ = write!(
        out,
        "<label for=\"q\">Search for Scholarships</label>\
         <input type=\"text\" id=\"q\" name=\"q\" value=\"{}\">",
        value(f.search.as_deref())
    );

    let desc = params.order == SortOrder::Descending;
    let _ = write!(
        out,
        "<label for=\"sort\">Sort by Due Date</label><select id=\"sort\" name=\"sort\">\
         <option value=\"asc\"{}>Ascending</option><option value=\"desc\"{}>Descending</option></select>",
        if desc { "" } else { " selected" },
        if desc { " selected" } else { "" }
    );

    out.push_str(&select(
        "ethnicity",
        "Required Ethnicity",
        ETHNICITY_OPTIONS.iter().copied(),
        f.ethnicity.as_deref(),
    ));
    out.push_str(&select(
        "gender",
        "Gender",
        GENDER_OPTIONS.iter().copied(),
        f.gender.as_deref(),
    ));

    let _ = write!(
        out,
        "<label for=\"major\">Preferred Major</label>\
         <input type=\"text\" id=\"major\" name=\"major\" value=\"{}\">",
        value(f.major.as_deref())
    );

    if !universities.is_empty() {
        out.push_str(&select(
            "university",
            "University",
            universities.iter().map(String::as_str),
            f.university.as_deref(),
        ));
    }

    let number = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
    let _ = write!(
        out,
        "<label for=\"min_reward\">Minimum Reward Amount ($)</label>\
         <input type=\"number\" min=\"0\" id=\"min_reward\" name=\"min_reward\" value=\"{}\">\
         <label for=\"max_reward\">Maximum Reward Amount ($)</label>\
         <input type=\"number\" min=\"0\" id=\"max_reward\" name=\"max_reward\" value=\"{}\">",
        number(f.min_reward),
        number(f.max_reward)
    );

    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    let _ = write!(
        out,
        "<label for=\"due_after\">Due After</label>\
         <input type=\"date\" id=\"due_after\" name=\"due_after\" value=\"{}\">\
         <label for=\"due_before\">Due Before</label>\
         <input type=\"date\" id=\"due_before\" name=\"due_before\" value=\"{}\">",
        date(f.due_after),
        date(f.due_before)
    );

    for c in Criterion::ALL {
        let checked = if f.criteria.contains(&c) { " checked" } else { "" };
        let _ = write!(
            out,
            "<div class=\"check\"><input type=\"checkbox\" id=\"{field}\" name=\"{field}\"{checked}>\
             <label for=\"{field}\">{}</label></div>",
            escape_html(c.label()),
            field = c.field(),
        );
    }

    out.push_str("<p><button type=\"submit\">Apply filters</button> <a href=\"/\">Reset</a></p>");
    out.push_str("</form></aside>");
    out
}

fn select<'a>(
    name: &str,
    label: &str,
    options: impl Iterator<Item = &'a str>,
    selected: Option<&str>,
) -> String {
    let mut out = format!(
        "<label for=\"{name}\">{}</label><select id=\"{name}\" name=\"{name}\"><option value=\"All\">All</option>",
        escape_html(label)
    );
    for option in options {
        let sel = if selected.is_some_and(|s| s.eq_ignore_ascii_case(option)) {
            " selected"
        } else {
            ""
        };
        let escaped = escape_html(option);
        let _ = write!(out, "<option value=\"{escaped}\"{sel}>{escaped}</option>");
    }
    out.push_str("</select>");
    out
}

/// One scholarship with only the fields it actually has, plus its actions.
pub fn scholarship_card(
    record: &Scholarship,
    session: &SessionState,
    tab: Tab,
    return_to: &str,
) -> String {
    let mut out = String::from("<article class=\"card\">");
    if let Some(title) = record.title() {
        let _ = write!(out, "<h2>{}</h2>", escape_html(title));
    }
    if let Some(description) = record.description() {
        let _ = write!(out, "<p class=\"description\">{}</p>", escape_html(description));
    }

    let mut fields: Vec<(&str, String)> = Vec::new();
    let yes_no = |b: bool| if b { "Yes" } else { "No" }.to_string();
    if let Some(b) = record.criterion(Criterion::MeritBased) {
        fields.push(("Merit-Based", yes_no(b)));
    }
    if let Some(v) = record.preferred_ethnicity() {
        fields.push(("Preferred Ethnicity", v.to_string()));
    }
    if let Some(v) = record.preferred_gender() {
        fields.push(("Preferred Gender", v.to_string()));
    }
    if let Some(v) = record.preferred_major() {
        fields.push(("Preferred Major", v.to_string()));
    }
    if let Some(b) = record.criterion(Criterion::Lgbtq) {
        fields.push(("Supports LGBTQ+", yes_no(b)));
    }
    let universities = record.universities();
    if !universities.is_empty() {
        fields.push(("University", universities.join(", ")));
    }
    if let Some(v) = record.location() {
        fields.push(("Location", v.to_string()));
    }
    if let Some(reward) = record.reward() {
        fields.push(("Reward Amount", reward_text(reward)));
    }
    if let Some(v) = record.extra_requirements() {
        fields.push(("Extra Requirements", v.to_string()));
    }
    if let Some(d) = record.due_date() {
        fields.push(("Due Date", d.format("%Y-%m-%d").to_string()));
    }
    let tags: Vec<&str> = Criterion::ALL
        .into_iter()
        .filter(|c| !matches!(c, Criterion::MeritBased | Criterion::Lgbtq))
        .filter(|c| record.criterion(*c) == Some(true))
        .map(|c| c.label())
        .collect();
    if !tags.is_empty() {
        fields.push(("Eligibility", tags.join(", ")));
    }

    if !fields.is_empty() {
        out.push_str("<ul class=\"fields\">");
        for (label, value) in fields {
            let _ = write!(out, "<li><strong>{label}</strong>: {}</li>", escape_html(&value));
        }
        out.push_str("</ul>");
    }

    out.push_str("<div class=\"actions\">");
    for kind in ListKind::ALL {
        if session.contains(kind, &record.id) {
            let _ = write!(out, "<span class=\"badge\">{}</span>", kind.label());
        } else {
            out.push_str(&mark_form(kind, &record.id, "add", add_label(kind), return_to));
        }
    }
    if let Tab::List(kind) = tab {
        out.push_str(&mark_form(kind, &record.id, "remove", remove_label(kind), return_to));
    }
    out.push_str("</div></article>");
    out
}

fn add_label(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Saved => "Save",
        ListKind::Applied => "Mark as applied",
        ListKind::Favorited => "Favorite",
    }
}

fn remove_label(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Saved => "Remove from Saved",
        ListKind::Applied => "Remove from Applied",
        ListKind::Favorited => "Remove from Favorites",
    }
}

fn mark_form(kind: ListKind, id: &str, action: &str, label: &str, return_to: &str) -> String {
    format!(
        "<form method=\"post\" action=\"/mark\">\
         <input type=\"hidden\" name=\"kind\" value=\"{}\">\
         <input type=\"hidden\" name=\"id\" value=\"{}\">\
         <input type=\"hidden\" name=\"action\" value=\"{action}\">\
         <input type=\"hidden\" name=\"return_to\" value=\"{}\">\
         <button type=\"submit\">{}</button></form>",
        kind.as_str(),
        escape_html(id),
        escape_html(return_to),
        escape_html(label)
    )
}

/// Corpus report: scatter plot, topics, clusters, top-scoring list and
/// distributions.
pub fn analysis_page(report: &CorpusReport) -> String {
    let mut body = String::from("<main style=\"padding:24px\"><h1>Scholarship Corpus Analysis</h1>");
    if report.is_empty() {
        body.push_str("<p>No scholarships with descriptions to analyze.</p></main>");
        return layout("Equalify Analysis", &body);
    }

    let _ = write!(
        body,
        "<p>{} scholarships, {} terms, {} clusters (inertia {:.3}), {} topics.</p>",
        report.documents.len(),
        report.features,
        report.clusters.len(),
        report.inertia,
        report.topics.len()
    );

    body.push_str("<h2>Scholarship Clusters</h2>");
    body.push_str(&scatter_svg(report));

    body.push_str("<table><tr><th>Cluster</th><th>Size</th><th>Mean DEI &amp; Identity Score</th><th>Mean Sentiment</th></tr>");
    for c in &report.clusters {
        let _ = write!(
            body,
            "<tr><td style=\"color:{}\">{}</td><td>{}</td><td>{:.2}</td><td>{:.3}</td></tr>",
            cluster_color(c.cluster),
            c.cluster,
            c.size,
            c.mean_dei_score,
            c.mean_sentiment
        );
    }
    body.push_str("</table>");

    body.push_str("<h2>Topics</h2><table><tr><th>Topic</th><th>Top words</th></tr>");
    for t in &report.topics {
        let _ = write!(
            body,
            "<tr><td>Topic {}</td><td>{}</td></tr>",
            t.index,
            escape_html(&t.words.join(", "))
        );
    }
    body.push_str("</table>");

    body.push_str("<h2>Top Scoring Scholarships for DEI &amp; Identity</h2>");
    body.push_str("<table><tr><th>Title</th><th>Score</th><th>Description</th></tr>");
    for s in &report.top_scoring {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&s.title),
            s.dei_score,
            escape_html(&truncate(&s.description, 300))
        );
    }
    body.push_str("</table>");

    let n = report.documents.len() as f64;
    let mean = |f: &dyn Fn(&crate::analysis::DocumentAnalysis) -> f64| {
        report.documents.iter().map(|d| f(d)).sum::<f64>() / n
    };
    let _ = write!(
        body,
        "<h2>Text Complexity</h2><table><tr><th>Measure</th><th>Mean</th></tr>\
         <tr><td>Flesch reading ease</td><td>{:.1}</td></tr>\
         <tr><td>Flesch-Kincaid grade</td><td>{:.1}</td></tr>\
         <tr><td>SMOG index</td><td>{:.1}</td></tr></table>",
        mean(&|d| d.readability.flesch_reading_ease),
        mean(&|d| d.readability.flesch_kincaid_grade),
        mean(&|d| d.readability.smog_index)
    );

    body.push_str("<h2>Distribution of DEI &amp; Identity Scores</h2>");
    body.push_str(&histogram_svg(&report.dei_histogram));
    body.push_str("<h2>Sentiment Distribution</h2>");
    body.push_str(&histogram_svg(&report.sentiment_histogram));
    body.push_str("<h2>Description Length Distribution</h2>");
    body.push_str(&histogram_svg(&report.length_histogram));

    body.push_str("</main>");
    layout("Equalify Analysis", &body)
}

fn cluster_color(cluster: usize) -> &'static str {
    CLUSTER_COLORS[cluster % CLUSTER_COLORS.len()]
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

/// Scale `v` from `[lo, hi]` into `[out_lo, out_hi]`; a flat range maps to
/// the middle.
fn scale(v: f64, lo: f64, hi: f64, out_lo: f64, out_hi: f64) -> f64 {
    if (hi - lo).abs() < f64::EPSILON {
        return (out_lo + out_hi) / 2.0;
    }
    out_lo + (v - lo) / (hi - lo) * (out_hi - out_lo)
}

fn scatter_svg(report: &CorpusReport) -> String {
    const W: f64 = 640.0;
    const H: f64 = 420.0;
    const M: f64 = 24.0;

    let (x_lo, x_hi) = bounds(report.documents.iter().map(|d| d.x));
    let (y_lo, y_hi) = bounds(report.documents.iter().map(|d| d.y));

    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{W}\" height=\"{H}\" viewBox=\"0 0 {W} {H}\">"
    );
    for d in &report.documents {
        let cx = scale(d.x, x_lo, x_hi, M, W - M);
        let cy = scale(d.y, y_lo, y_hi, H - M, M);
        let _ = write!(
            out,
            "<circle cx=\"{cx:.1}\" cy=\"{cy:.1}\" r=\"5\" fill=\"{}\" fill-opacity=\"0.8\">\
             <title>{} (cluster {}, score {})</title></circle>",
            cluster_color(d.cluster),
            escape_html(&d.title),
            d.cluster,
            d.dei_score
        );
    }
    out.push_str("</svg>");
    out
}

fn histogram_svg(hist: &Histogram) -> String {
    const W: f64 = 640.0;
    const H: f64 = 220.0;
    const M: f64 = 24.0;

    let max = hist.counts.iter().copied().max().unwrap_or(0).max(1) as f64;
    let bins = hist.counts.len().max(1) as f64;
    let bar_w = (W - 2.0 * M) / bins;

    let mut out = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{W}\" height=\"{H}\" viewBox=\"0 0 {W} {H}\">"
    );
    for (i, &count) in hist.counts.iter().enumerate() {
        let h = (count as f64 / max) * (H - 2.0 * M);
        let x = M + i as f64 * bar_w;
        let y = H - M - h;
        let lo = hist.edges.get(i).copied().unwrap_or(0.0);
        let hi = hist.edges.get(i + 1).copied().unwrap_or(lo);
        let _ = write!(
            out,
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{:.1}\" height=\"{h:.1}\" fill=\"#4c78a8\">\
             <title>{lo:.2} to {hi:.2}: {count}</title></rect>",
            (bar_w - 1.0).max(1.0)
        );
    }
    if let (Some(first), Some(last)) = (hist.edges.first(), hist.edges.last()) {
        let _ = write!(
            out,
            "<text x=\"{M}\" y=\"{}\" font-size=\"11\">{first:.2}</text>\
             <text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"end\">{last:.2}</text>",
            H - 6.0,
            W - M,
            H - 6.0
        );
    }
    out.push_str("</svg>");
    out
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, doc: serde_json::Value) -> Scholarship {
        Scholarship::new(id, doc.as_object().unwrap().clone())
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
    }

    #[test]
    fn usd_formatting() {
        assert_eq!(format_usd(2500.0), "$2,500");
        assert_eq!(format_usd(1234567.5), "$1,234,567.50");
        assert_eq!(format_usd(999.0), "$999");
        assert_eq!(reward_text(0.0), "Amount may vary");
        assert_eq!(reward_text(100.0), "$100");
    }

    #[test]
    fn card_shows_only_present_fields() {
        let r = record(
            "r1",
            json!({
                "title": "Rural <STEM> Award",
                "description": "For rural students.",
                "reward": 0,
                "rural": true,
                "prefers_lgbt": false,
            }),
        );
        let html = scholarship_card(&r, &SessionState::default(), Tab::All, "/");
        assert!(html.contains("<h2>Rural &lt;STEM&gt; Award</h2>"));
        assert!(html.contains("Amount may vary"));
        assert!(html.contains("<strong>Supports LGBTQ+</strong>: No"));
        assert!(html.contains("Rural Student"));
        assert!(!html.contains("Merit-Based"));
        assert!(!html.contains("Due Date"));
        assert!(!html.contains("Location"));
        assert!(html.contains(">Save</button>"));
        assert!(!html.contains("Remove from"));
    }

    #[test]
    fn card_reflects_session_and_tab() {
        let r = record("r2", json!({"title": "T"}));
        let mut session = SessionState::default();
        session.mark(ListKind::Saved, "r2");
        let html = scholarship_card(&r, &session, Tab::List(ListKind::Saved), "/?tab=saved");
        assert!(html.contains("<span class=\"badge\">Saved</span>"));
        assert!(html.contains(">Mark as applied</button>"));
        assert!(html.contains(">Remove from Saved</button>"));
        assert!(html.contains("value=\"/?tab=saved\""));
    }

    #[test]
    fn search_page_pagination_links() {
        let params = SearchParams::default();
        let records = vec![record("a", json!({"title": "A"}))];
        let session = SessionState::default();
        let view = SearchView {
            params: &params,
            records: &records,
            page: 2,
            total_pages: 3,
            total_items: 11,
            session: &session,
            universities: &[],
        };
        let html = search_page(&view);
        assert!(html.contains("Found 11 scholarships matching your filters and search query."));
        assert!(html.contains("Page 2 of 3"));
        assert!(html.contains("href=\"/?page=1\">Previous"));
        assert!(html.contains("href=\"/?page=3\">Next"));
        assert!(html.contains("Saved Scholarships (0)"));
    }

    #[test]
    fn empty_analysis_page() {
        let report = crate::analysis::analyze_corpus(&[], &Default::default());
        let html = analysis_page(&report);
        assert!(html.contains("No scholarships with descriptions to analyze."));
    }
}
