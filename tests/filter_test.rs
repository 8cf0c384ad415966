mod helpers;

use chrono::NaiveDate;
use equalify::scholarship::filter::{self, ScholarshipFilter, SortOrder};
use equalify::scholarship::{store, Criterion, Scholarship};

fn titles(records: &[Scholarship]) -> Vec<&str> {
    records.iter().map(|r| r.display_title()).collect()
}

fn all_records() -> Vec<Scholarship> {
    let conn = helpers::test_db();
    helpers::seed(&conn);
    store::list_all(&conn).unwrap()
}

/// Every combination of predicates the sample data can exercise.
fn filters() -> Vec<ScholarshipFilter> {
    let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok();
    let mut out = vec![ScholarshipFilter::default()];
    for ethnicity in [None, Some("hispanic".to_string())] {
        for gender in [None, Some("Female".to_string())] {
            for (min, max) in [(None, None), (Some(1000.0), None), (None, Some(2500.0))] {
                for (after, before) in [(None, None), (date("2025-02-01"), date("2025-12-31"))] {
                    out.push(ScholarshipFilter {
                        ethnicity: ethnicity.clone(),
                        gender: gender.clone(),
                        min_reward: min,
                        max_reward: max,
                        due_after: after,
                        due_before: before,
                        ..Default::default()
                    });
                }
            }
        }
    }
    for c in Criterion::ALL {
        out.push(ScholarshipFilter {
            criteria: [c].into_iter().collect(),
            ..Default::default()
        });
    }
    out
}

/// Reference predicate written independently of the filter implementation.
fn satisfies(r: &Scholarship, f: &ScholarshipFilter) -> bool {
    let eq = |want: &Option<String>, have: Option<&str>| match want {
        None => true,
        Some(w) => have.map(|h| h.to_lowercase()) == Some(w.to_lowercase()),
    };
    let in_range = |v: Option<f64>| match (f.min_reward, f.max_reward) {
        (None, None) => true,
        (min, max) => v.is_some_and(|v| min.is_none_or(|m| v >= m) && max.is_none_or(|m| v <= m)),
    };
    let in_dates = match (f.due_after, f.due_before) {
        (None, None) => true,
        (a, b) => r
            .due_date()
            .is_some_and(|d| a.is_none_or(|a| d >= a) && b.is_none_or(|b| d <= b)),
    };
    eq(&f.ethnicity, r.preferred_ethnicity())
        && eq(&f.gender, r.preferred_gender())
        && in_range(r.reward())
        && in_dates
        && f.criteria.iter().all(|c| r.criterion(*c) == Some(true))
}

#[test]
fn record_is_in_result_iff_it_satisfies_every_predicate() {
    let records = all_records();
    for f in filters() {
        let result = filter::search(records.clone(), &f, SortOrder::Ascending);
        for r in &records {
            let included = result.iter().any(|x| x.id == r.id);
            assert_eq!(included, satisfies(r, &f), "record {:?} with {f:?}", r.title());
        }
    }
}

#[test]
fn reward_zero_is_a_reward() {
    let records = all_records();
    let f = ScholarshipFilter {
        max_reward: Some(100.0),
        ..Default::default()
    };
    let result = filter::search(records, &f, SortOrder::Ascending);
    assert_eq!(titles(&result), vec!["Rural Nursing Grant"]);
}

#[test]
fn search_text_matches_title_location_and_requirements() {
    let records = all_records();
    let run = |q: &str| {
        let f = ScholarshipFilter {
            search: Some(q.into()),
            ..Default::default()
        };
        filter::search(records.clone(), &f, SortOrder::Ascending)
    };
    assert_eq!(titles(&run("computing")), vec!["Women in Computing Scholarship"]);
    assert_eq!(titles(&run("flagstaff")), vec!["Rural Nursing Grant"]);
    assert_eq!(titles(&run("letters of")), vec!["Open Community Award"]);
    assert_eq!(titles(&run("^(rural|open)")).len(), 2);
    // Invalid regex falls back to a literal match.
    assert!(run("award(").is_empty());
}

#[test]
fn major_is_a_case_insensitive_regex() {
    let records = all_records();
    let f = ScholarshipFilter {
        major: Some("engineering|computer".into()),
        ..Default::default()
    };
    let result = filter::search(records, &f, SortOrder::Ascending);
    assert_eq!(
        titles(&result),
        vec!["Women in Computing Scholarship", "Hispanic Engineers Award"]
    );
}

#[test]
fn descending_is_exact_reverse_of_ascending() {
    let records = all_records();
    let f = ScholarshipFilter::default();
    let asc = filter::search(records.clone(), &f, SortOrder::Ascending);
    let mut desc = filter::search(records, &f, SortOrder::Descending);
    assert_eq!(
        titles(&asc),
        vec![
            "Women in Computing Scholarship",
            "Hispanic Engineers Award",
            "Rural Nursing Grant",
            "Open Community Award",
        ]
    );
    desc.reverse();
    assert_eq!(asc, desc);
}

#[test]
fn sort_order_is_total_with_shared_dates() {
    let conn = helpers::test_db();
    for title in ["b", "a", "c"] {
        helpers::insert(&conn, serde_json::json!({"title": title, "due_date": "2025-05-05"}));
    }
    helpers::insert(&conn, serde_json::json!({"title": "undated"}));
    let records = store::list_all(&conn).unwrap();

    let asc = filter::search(records.clone(), &ScholarshipFilter::default(), SortOrder::Ascending);
    let ids: Vec<&str> = asc.iter().map(|r| r.id.as_str()).collect();
    let mut sorted_dated = ids[..3].to_vec();
    sorted_dated.sort();
    assert_eq!(ids[..3], sorted_dated[..]);
    assert_eq!(asc[3].display_title(), "undated");

    for w in asc.windows(2) {
        assert_eq!(filter::compare_due_date(&w[0], &w[1]), std::cmp::Ordering::Less);
    }
}

#[test]
fn pagination_covers_every_result_once() {
    let records = all_records();
    let matched = filter::search(records, &ScholarshipFilter::default(), SortOrder::Ascending);
    let mut seen = Vec::new();
    let total = filter::total_pages(matched.len(), 3);
    assert_eq!(total, 2);
    for page in 1..=total {
        let p = filter::paginate(&matched, page, 3);
        assert_eq!(p.page, page);
        seen.extend(p.items.into_iter().map(|r| r.id));
    }
    let expected: Vec<String> = matched.iter().map(|r| r.id.clone()).collect();
    assert_eq!(seen, expected);

    let clamped = filter::paginate(&matched, 99, 3);
    assert_eq!(clamped.page, 2);
    assert_eq!(clamped.items.len(), 1);
}
