//! Query-string parameters of the search page and the search API.

use std::collections::BTreeMap;

use reqwest::Url;

use crate::scholarship::types::{parse_date, Criterion, ListKind};
use crate::scholarship::{ScholarshipFilter, SortOrder};

/// Which list the search page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    All,
    List(ListKind),
}

impl Tab {
    pub const ALL: [Tab; 4] = [
        Tab::All,
        Tab::List(ListKind::Saved),
        Tab::List(ListKind::Applied),
        Tab::List(ListKind::Favorited),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::All => "all",
            Tab::List(kind) => kind.as_str(),
        }
    }

    pub fn parse(s: &str) -> Self {
        s.parse().map(Tab::List).unwrap_or(Tab::All)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub filter: ScholarshipFilter,
    pub order: SortOrder,
    pub tab: Tab,
    /// Explicit page request; `None` keeps the session's current page.
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl SearchParams {
    /// Parse leniently: blank or malformed values leave the predicate
    /// inactive rather than failing the request.
    pub fn from_query(query: &BTreeMap<String, String>) -> Self {
        let text = |key: &str| {
            query
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(String::from)
        };
        let number = |key: &str| text(key).and_then(|v| v.replace([',', '$'], "").parse::<f64>().ok());
        let count = |key: &str| text(key).and_then(|v| v.parse::<usize>().ok());
        let date = |key: &str| text(key).and_then(|v| parse_date(&v));

        let criteria = Criterion::ALL
            .into_iter()
            .filter(|c| text(c.field()).is_some_and(|v| is_checked(&v)))
            .collect();

        let filter = ScholarshipFilter {
            search: text("q"),
            ethnicity: text("ethnicity"),
            gender: text("gender"),
            major: text("major"),
            university: text("university"),
            criteria,
            min_reward: number("min_reward"),
            max_reward: number("max_reward"),
            due_after: date("due_after"),
            due_before: date("due_before"),
        }
        .normalized();

        Self {
            filter,
            order: text("sort").and_then(|s| s.parse().ok()).unwrap_or_default(),
            tab: text("tab").map(|t| Tab::parse(&t)).unwrap_or_default(),
            page: count("page").filter(|&p| p > 0),
            page_size: count("page_size").filter(|&n| n > 0),
        }
    }

    /// Key/value pairs describing the filter and sort (no tab or page).
    pub fn filter_pairs(&self) -> Vec<(String, String)> {
        let f = &self.filter;
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut push = |k: &str, v: Option<String>| {
            if let Some(v) = v {
                pairs.push((k.to_string(), v));
            }
        };
        push("q", f.search.clone());
        push("ethnicity", f.ethnicity.clone());
        push("gender", f.gender.clone());
        push("major", f.major.clone());
        push("university", f.university.clone());
        push("min_reward", f.min_reward.map(|v| v.to_string()));
        push("max_reward", f.max_reward.map(|v| v.to_string()));
        push("due_after", f.due_after.map(|d| d.to_string()));
        push("due_before", f.due_before.map(|d| d.to_string()));
        if self.order == SortOrder::Descending {
            push("sort", Some("desc".into()));
        }
        for c in &f.criteria {
            push(c.field(), Some("on".into()));
        }
        pairs
    }

    /// Link to the search page for `tab` and `page` with the same filter.
    pub fn href(&self, tab: Tab, page: Option<usize>) -> String {
        let mut pairs = self.filter_pairs();
        if tab != Tab::All {
            pairs.push(("tab".into(), tab.as_str().into()));
        }
        if let Some(page) = page {
            pairs.push(("page".into(), page.to_string()));
        }
        let query = encode_query(&pairs);
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{query}")
        }
    }
}

fn is_checked(value: &str) -> bool {
    !matches!(
        value.to_ascii_lowercase().as_str(),
        "false" | "off" | "0" | "no"
    )
}

/// `application/x-www-form-urlencoded` serialization.
pub fn encode_query(pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }
    let Ok(mut url) = Url::parse("http://localhost/") else {
        return String::new();
    };
    url.query_pairs_mut()
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    url.query().unwrap_or_default().to_string()
}
