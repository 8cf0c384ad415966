//! Filter, sort and paginate scholarships.
//!
//! A [`ScholarshipFilter`] is a conjunction of predicates; an unset field is
//! an inactive predicate ("All"). A record is in the result of [`search`] iff
//! it satisfies every active predicate.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::NaiveDate;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::scholarship::types::{Criterion, Scholarship};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScholarshipFilter {
    /// Matched case-insensitively against title, location and extra
    /// requirements. Treated as a regex, or literally if it does not compile.
    pub search: Option<String>,
    pub ethnicity: Option<String>,
    pub gender: Option<String>,
    /// Case-insensitive regex against the preferred major.
    pub major: Option<String>,
    pub university: Option<String>,
    #[serde(default)]
    pub criteria: BTreeSet<Criterion>,
    pub min_reward: Option<f64>,
    pub max_reward: Option<f64>,
    pub due_after: Option<NaiveDate>,
    pub due_before: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Ascending),
            "desc" | "descending" => Ok(Self::Descending),
            _ => Err(format!("unknown sort order: {s}")),
        }
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually returned.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

/// A filter with its regexes compiled once.
struct CompiledFilter<'a> {
    filter: &'a ScholarshipFilter,
    search: Option<Regex>,
    major: Option<Regex>,
}

impl ScholarshipFilter {
    /// Normalize "All"/blank selections to inactive predicates.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.search,
            &mut self.ethnicity,
            &mut self.gender,
            &mut self.major,
            &mut self.university,
        ] {
            if field
                .as_deref()
                .map(|v| v.trim().is_empty() || v.trim().eq_ignore_ascii_case("all"))
                .unwrap_or(false)
            {
                *field = None;
            }
        }
        self
    }

    /// `true` if no predicate is active.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Test a single record against every active predicate.
    pub fn matches(&self, record: &Scholarship) -> bool {
        self.compile().matches(record)
    }

    fn compile(&self) -> CompiledFilter<'_> {
        CompiledFilter {
            filter: self,
            search: self.search.as_deref().map(case_insensitive),
            major: self.major.as_deref().map(case_insensitive),
        }
    }
}

impl CompiledFilter<'_> {
    fn matches(&self, record: &Scholarship) -> bool {
        let f = self.filter;

        if let Some(re) = &self.search {
            let hit = [record.title(), record.location(), record.extra_requirements()]
                .into_iter()
                .flatten()
                .any(|text| re.is_match(text));
            if !hit {
                return false;
            }
        }

        if !equals_ignore_case(f.ethnicity.as_deref(), record.preferred_ethnicity()) {
            return false;
        }
        if !equals_ignore_case(f.gender.as_deref(), record.preferred_gender()) {
            return false;
        }

        if let Some(re) = &self.major {
            match record.preferred_major() {
                Some(major) if re.is_match(major) => {}
                _ => return false,
            }
        }

        if let Some(wanted) = f.university.as_deref() {
            let found = record
                .universities()
                .iter()
                .any(|u| u.eq_ignore_ascii_case(wanted.trim()));
            if !found {
                return false;
            }
        }

        if !f
            .criteria
            .iter()
            .all(|c| record.criterion(*c) == Some(true))
        {
            return false;
        }

        if f.min_reward.is_some() || f.max_reward.is_some() {
            let Some(reward) = record.reward() else {
                return false;
            };
            if f.min_reward.is_some_and(|min| reward < min) {
                return false;
            }
            if f.max_reward.is_some_and(|max| reward > max) {
                return false;
            }
        }

        if f.due_after.is_some() || f.due_before.is_some() {
            let Some(due) = record.due_date() else {
                return false;
            };
            if f.due_after.is_some_and(|after| due < after) {
                return false;
            }
            if f.due_before.is_some_and(|before| due > before) {
                return false;
            }
        }

        true
    }
}

fn case_insensitive(pattern: &str) -> Regex {
    let pattern = pattern.trim();
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .unwrap_or_else(|_| Regex::new("$^").expect("static regex"))
}

fn equals_ignore_case(wanted: Option<&str>, actual: Option<&str>) -> bool {
    match wanted {
        None => true,
        Some(w) => actual.is_some_and(|a| a.eq_ignore_ascii_case(w.trim())),
    }
}

/// Ascending due-date order. Records without a due date sort after every
/// dated record; ties break on store id, so the order is total.
pub fn compare_due_date(a: &Scholarship, b: &Scholarship) -> Ordering {
    let key = |s: &Scholarship| s.due_date().unwrap_or(NaiveDate::MAX);
    key(a).cmp(&key(b)).then_with(|| a.id.cmp(&b.id))
}

/// Sort in place by due date.
pub fn sort_by_due_date(records: &mut [Scholarship], order: SortOrder) {
    match order {
        SortOrder::Ascending => records.sort_by(compare_due_date),
        SortOrder::Descending => records.sort_by(|a, b| compare_due_date(b, a)),
    }
}

/// Filter then sort.
pub fn search(
    records: impl IntoIterator<Item = Scholarship>,
    filter: &ScholarshipFilter,
    order: SortOrder,
) -> Vec<Scholarship> {
    let compiled = filter.compile();
    let mut out: Vec<Scholarship> = records
        .into_iter()
        .filter(|r| compiled.matches(r))
        .collect();
    sort_by_due_date(&mut out, order);
    out
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    total_items.div_ceil(page_size)
}

/// Slice out a 1-based page. Out-of-range pages are clamped.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, page_size);
    let page = page.clamp(1, total_pages.max(1));
    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let items = if start < total_items {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };
    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}
