//! Scholarship record types.
//!
//! A stored scholarship is a schema-free JSON document. [`Scholarship`] wraps
//! the document together with its store id and exposes lenient accessors: a
//! missing or oddly-typed field reads as `None` rather than an error, so every
//! revision of the document shape can be displayed and filtered.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A scholarship document plus its unique store id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scholarship {
    /// UUID v7 store id. Serialized as `_id` so it never collides with a
    /// source document's own `id` field.
    #[serde(rename = "_id")]
    pub id: String,
    /// When augmentation was merged in; `None` for records still pending.
    #[serde(
        rename = "_augmented_at",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub augmented_at: Option<String>,
    /// The stored document, exactly as loaded and enriched.
    #[serde(flatten)]
    pub document: Map<String, Value>,
}

/// Boolean eligibility attributes a scholarship can require or prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    MeritBased,
    Lgbtq,
    EssayRequired,
    WomenInStem,
    Disabilities,
    Rural,
    ImmigrantOrRefugee,
    Neurodiversity,
    LowIncome,
    FirstGeneration,
}

impl Criterion {
    pub const ALL: [Criterion; 10] = [
        Self::MeritBased,
        Self::Lgbtq,
        Self::EssayRequired,
        Self::WomenInStem,
        Self::Disabilities,
        Self::Rural,
        Self::ImmigrantOrRefugee,
        Self::Neurodiversity,
        Self::LowIncome,
        Self::FirstGeneration,
    ];

    /// Document field written by augmentation.
    pub fn field(&self) -> &'static str {
        match self {
            Self::MeritBased => "is_merit_based",
            Self::Lgbtq => "prefers_lgbt",
            Self::EssayRequired => "is_essay_required",
            Self::WomenInStem => "women_in_stem",
            Self::Disabilities => "disabilities",
            Self::Rural => "rural",
            Self::ImmigrantOrRefugee => "immigrant_or_refugee",
            Self::Neurodiversity => "neurodiversity",
            Self::LowIncome => "low_income",
            Self::FirstGeneration => "first_generation",
        }
    }

    /// Older field names used by hand-written sample data.
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::MeritBased => &["merit_based"],
            Self::Lgbtq => &["lgbtq"],
            Self::FirstGeneration => &["first_gen"],
            _ => &[],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::MeritBased => "Merit-Based",
            Self::Lgbtq => "Supports LGBTQ+",
            Self::EssayRequired => "Essay Required",
            Self::WomenInStem => "Women in STEM",
            Self::Disabilities => "Supports Disabilities",
            Self::Rural => "Rural Student",
            Self::ImmigrantOrRefugee => "Immigrant or Refugee",
            Self::Neurodiversity => "Supports Neurodiversity",
            Self::LowIncome => "Low Income",
            Self::FirstGeneration => "First Generation College Student",
        }
    }
}

impl std::fmt::Display for Criterion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field())
    }
}

impl std::str::FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.field() == s || c.aliases().contains(&s))
            .ok_or_else(|| format!("unknown criterion: {s}"))
    }
}

/// The per-session lists a user can put a scholarship on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Saved,
    Applied,
    Favorited,
}

impl ListKind {
    pub const ALL: [ListKind; 3] = [Self::Saved, Self::Applied, Self::Favorited];

    /// Document flag field, also used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Saved => "saved",
            Self::Applied => "applied",
            Self::Favorited => "favorited",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Saved => "Saved",
            Self::Applied => "Applied",
            Self::Favorited => "Favorited",
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "saved" => Ok(Self::Saved),
            "applied" => Ok(Self::Applied),
            "favorited" => Ok(Self::Favorited),
            _ => Err(format!("unknown list: {s}")),
        }
    }
}

impl Scholarship {
    pub fn new(id: impl Into<String>, document: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            augmented_at: None,
            document,
        }
    }

    pub fn is_augmented(&self) -> bool {
        self.augmented_at.is_some()
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.document.get(key).filter(|v| !v.is_null())
    }

    fn text(&self, key: &str) -> Option<&str> {
        self.field(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Display title; falls back to the legacy `name` field.
    pub fn title(&self) -> Option<&str> {
        self.text("title").or_else(|| self.text("name"))
    }

    pub fn description(&self) -> Option<&str> {
        self.text("description")
    }

    pub fn preferred_ethnicity(&self) -> Option<&str> {
        self.text("preferred_ethnicity").or_else(|| self.text("ethnicity"))
    }

    pub fn preferred_gender(&self) -> Option<&str> {
        self.text("preferred_gender").or_else(|| self.text("gender"))
    }

    pub fn preferred_major(&self) -> Option<&str> {
        self.text("preferred_major")
    }

    pub fn location(&self) -> Option<&str> {
        self.text("location")
    }

    pub fn extra_requirements(&self) -> Option<&str> {
        self.text("extra_requirements")
    }

    /// Applicable universities: the `university` string, or the legacy
    /// `universities` array.
    pub fn universities(&self) -> Vec<&str> {
        if let Some(u) = self.text("university") {
            return vec![u];
        }
        match self.field("universities") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Monetary reward in USD. Accepts numbers and numeric strings such as
    /// `"$5,000"`.
    pub fn reward(&self) -> Option<f64> {
        let value = self.field("reward").or_else(|| self.field("reward_amount"))?;
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                cleaned.parse().ok()
            }
            _ => None,
        }
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.text("due_date").and_then(parse_date)
    }

    /// `Some(bool)` if the document states the criterion, `None` if absent.
    pub fn criterion(&self, criterion: Criterion) -> Option<bool> {
        std::iter::once(criterion.field())
            .chain(criterion.aliases().iter().copied())
            .find_map(|key| self.field(key).and_then(as_bool))
    }

    /// Persisted saved/applied/favorited flag.
    pub fn flag(&self, kind: ListKind) -> bool {
        self.field(kind.as_str()).and_then(as_bool).unwrap_or(false)
    }

    /// Display title with a placeholder for untitled records.
    pub fn display_title(&self) -> &str {
        self.title().unwrap_or("Untitled scholarship")
    }
}

fn as_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|i| i != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parse the date formats seen in scholarship documents.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Scholarship {
        match value {
            Value::Object(map) => Scholarship::new("s1", map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn title_falls_back_to_name() {
        let s = record(json!({"name": "Hispanic Scholars Award"}));
        assert_eq!(s.title(), Some("Hispanic Scholars Award"));
        let s = record(json!({"title": "  ", "name": "Fallback"}));
        assert_eq!(s.title(), Some("Fallback"));
    }

    #[test]
    fn reward_accepts_numbers_and_strings() {
        assert_eq!(record(json!({"reward": 2500})).reward(), Some(2500.0));
        assert_eq!(record(json!({"reward": "$5,000"})).reward(), Some(5000.0));
        assert_eq!(record(json!({"reward_amount": 300.5})).reward(), Some(300.5));
        assert_eq!(record(json!({"reward": "varies"})).reward(), None);
        assert_eq!(record(json!({})).reward(), None);
    }

    #[test]
    fn due_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 12, 15);
        assert_eq!(record(json!({"due_date": "2024-12-15"})).due_date(), expected);
        assert_eq!(record(json!({"due_date": "12/15/2024"})).due_date(), expected);
        assert_eq!(
            record(json!({"due_date": "2024-12-15T00:00:00Z"})).due_date(),
            expected
        );
        assert_eq!(record(json!({"due_date": "soon"})).due_date(), None);
    }

    #[test]
    fn criterion_reads_aliases() {
        let s = record(json!({"first_gen": true, "merit_based": false, "rural": "yes"}));
        assert_eq!(s.criterion(Criterion::FirstGeneration), Some(true));
        assert_eq!(s.criterion(Criterion::MeritBased), Some(false));
        assert_eq!(s.criterion(Criterion::Rural), Some(true));
        assert_eq!(s.criterion(Criterion::LowIncome), None);
    }

    #[test]
    fn universities_from_string_or_array() {
        let s = record(json!({"university": "Arizona State University"}));
        assert_eq!(s.universities(), vec!["Arizona State University"]);
        let s = record(json!({"universities": ["A", "B"]}));
        assert_eq!(s.universities(), vec!["A", "B"]);
        assert!(record(json!({"university": null})).universities().is_empty());
    }

    #[test]
    fn criterion_parses_field_names() {
        assert_eq!("prefers_lgbt".parse::<Criterion>(), Ok(Criterion::Lgbtq));
        assert_eq!("lgbtq".parse::<Criterion>(), Ok(Criterion::Lgbtq));
        assert!("unknown".parse::<Criterion>().is_err());
    }

    #[test]
    fn serializes_flat() {
        let s = record(json!({"title": "T", "reward": 10}));
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v, json!({"_id": "s1", "title": "T", "reward": 10}));

        let mut s = s;
        s.augmented_at = Some("2025-01-01T00:00:00Z".into());
        assert!(s.is_augmented());
        let v = serde_json::to_value(&s).unwrap();
        assert_eq!(v["_augmented_at"], json!("2025-01-01T00:00:00Z"));
        let back: Scholarship = serde_json::from_value(v).unwrap();
        assert_eq!(back, s);
    }
}
