//! Structured enrichment of scholarship descriptions.
//!
//! Each pending record's free-text description is sent to an [`Extractor`]
//! which returns an [`AugmentedScholarship`]; its non-null fields are merged
//! into the stored document and the record is stamped as augmented. A stamped
//! record is never sent again.

pub mod openai;

use std::future::Future;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use rusqlite::Connection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::scholarship::store::{self, AugmentWrite};

pub use openai::OpenAiExtractor;

/// Fields extracted from a scholarship description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AugmentedScholarship {
    #[schemars(description = "Name of the scholarship")]
    pub title: String,
    pub is_merit_based: bool,
    #[schemars(description = "Preferred ethnicity, if any")]
    pub preferred_ethnicity: Option<String>,
    #[schemars(description = "Preferred gender, if any")]
    pub preferred_gender: Option<String>,
    #[schemars(description = "Preferred major or field of study, if any")]
    pub preferred_major: Option<String>,
    pub prefers_lgbt: bool,
    #[schemars(description = "Specific university, if any")]
    pub university: Option<String>,
    #[schemars(description = "Location requirement, if any")]
    pub location: Option<String>,
    pub is_essay_required: bool,
    #[schemars(description = "Scholarship amount in USD")]
    pub reward: f64,
    #[schemars(description = "Any additional requirements")]
    pub extra_requirements: Option<String>,
    pub women_in_stem: bool,
    pub disabilities: bool,
    pub rural: bool,
    pub immigrant_or_refugee: bool,
    pub neurodiversity: bool,
    pub low_income: bool,
    pub first_generation: bool,
}

impl AugmentedScholarship {
    /// Document fields to merge: every field except those that are null.
    pub fn into_fields(self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
            _ => Map::new(),
        }
    }
}

/// Why an extraction attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    #[error("no API key configured (set OPENAI_API_KEY or augment.api_key)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("model refused the request: {0}")]
    Refused(String),
    #[error("model returned no content")]
    EmptyResponse,
    #[error("model output did not match the schema: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Turns a description into structured fields.
pub trait Extractor {
    /// Model identifier recorded alongside augmented records.
    fn model(&self) -> &str;

    fn extract(
        &self,
        description: &str,
    ) -> impl Future<Output = Result<AugmentedScholarship, AugmentError>> + Send;
}

/// JSON schema for [`AugmentedScholarship`] in strict structured-output form:
/// every property required, no additional properties, no `format` hints.
pub fn response_schema() -> Value {
    let mut schema = schemars::schema_for!(AugmentedScholarship).to_value();
    make_strict(&mut schema);
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
}

fn make_strict(schema: &mut Value) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };
    obj.remove("format");
    if let Some(Value::Object(props)) = obj.get_mut("properties") {
        let names: Vec<Value> = props.keys().cloned().map(Value::String).collect();
        for prop in props.values_mut() {
            make_strict(prop);
        }
        obj.insert("required".into(), Value::Array(names));
        obj.insert("additionalProperties".into(), Value::Bool(false));
    }
}

/// User prompt for one description.
pub fn build_prompt(description: &str) -> String {
    format!(
        "Given the following scholarship description, extract or infer the required information.\n\n\
         Description: {description}\n\n\
         Answer in the structured format defined by the schema. \
         Use null for optional fields that do not apply or are not mentioned."
    )
}

/// Overwrite document keys with every non-null field.
pub fn merge_fields(document: &mut Map<String, Value>, fields: &Map<String, Value>) {
    for (key, value) in fields {
        if !value.is_null() {
            document.insert(key.clone(), value.clone());
        }
    }
}

/// Outcome of an augmentation run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct AugmentReport {
    pub processed: usize,
    pub augmented: usize,
    /// No description, or already augmented by the time of the write.
    pub skipped: usize,
    pub failed: usize,
}

/// Augment up to `limit` pending records, one at a time.
pub async fn augment_pending<E: Extractor>(
    conn: &mut Connection,
    extractor: &E,
    limit: Option<usize>,
) -> Result<AugmentReport> {
    let pending = store::list_pending_augmentation(conn)?;
    let take = limit.unwrap_or(pending.len()).min(pending.len());
    info!(pending = pending.len(), take, model = extractor.model(), "augmenting scholarships");

    let pb = ProgressBar::new(take as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} {bar:40.cyan/blue} {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("Processing scholarships");

    let mut report = AugmentReport::default();
    for record in pending.into_iter().take(take) {
        report.processed += 1;
        pb.inc(1);

        let Some(description) = record
            .description()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
        else {
            debug!(id = %record.id, "no description, skipping");
            report.skipped += 1;
            continue;
        };

        let extracted = match extractor.extract(&description).await {
            Ok(extracted) => extracted,
            Err(e) => {
                warn!(id = %record.id, error = %e, "extraction failed");
                report.failed += 1;
                continue;
            }
        };

        let fields = extracted.into_fields();
        match store::apply_augmentation(conn, &record.id, &fields, extractor.model()) {
            Ok(AugmentWrite::Applied) => report.augmented += 1,
            Ok(AugmentWrite::AlreadyAugmented) => report.skipped += 1,
            Err(e) => {
                warn!(id = %record.id, error = %e, "failed to store augmentation");
                report.failed += 1;
            }
        }
    }

    pb.finish_and_clear();
    info!(
        processed = report.processed,
        augmented = report.augmented,
        skipped = report.skipped,
        failed = report.failed,
        "augmentation finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;
    use serde_json::json;

    fn sample() -> AugmentedScholarship {
        AugmentedScholarship {
            title: "STEM Futures".into(),
            is_merit_based: true,
            preferred_ethnicity: None,
            preferred_gender: Some("Female".into()),
            preferred_major: Some("Engineering".into()),
            prefers_lgbt: false,
            university: None,
            location: Some("Arizona".into()),
            is_essay_required: true,
            reward: 2500.0,
            extra_requirements: None,
            women_in_stem: true,
            disabilities: false,
            rural: false,
            immigrant_or_refugee: false,
            neurodiversity: false,
            low_income: false,
            first_generation: true,
        }
    }

    struct FixedExtractor;

    impl Extractor for FixedExtractor {
        fn model(&self) -> &str {
            "fixed"
        }

        async fn extract(&self, description: &str) -> Result<AugmentedScholarship, AugmentError> {
            if description.contains("refuse") {
                return Err(AugmentError::Refused("no".into()));
            }
            Ok(sample())
        }
    }

    #[test]
    fn schema_is_strict() {
        let schema = response_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["additionalProperties"], false);
        let props = schema["properties"].as_object().unwrap();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(props.len(), 18);
        assert_eq!(required.len(), props.len());
        assert!(required.contains(&"preferred_major"));
        assert!(props["reward"].get("format").is_none());
        assert!(schema.get("$schema").is_none());
    }

    #[test]
    fn into_fields_drops_nulls() {
        let fields = sample().into_fields();
        assert!(!fields.contains_key("preferred_ethnicity"));
        assert_eq!(fields["preferred_gender"], "Female");
        assert_eq!(fields["reward"], 2500.0);
        assert_eq!(fields.len(), 15);
    }

    #[test]
    fn merge_overwrites_non_null_only() {
        let mut doc = json!({"title": "old", "location": "Ohio", "id": 3})
            .as_object()
            .unwrap()
            .clone();
        let fields = json!({"title": "new", "location": null, "rural": true})
            .as_object()
            .unwrap()
            .clone();
        merge_fields(&mut doc, &fields);
        assert_eq!(doc["title"], "new");
        assert_eq!(doc["location"], "Ohio");
        assert_eq!(doc["rural"], true);
        assert_eq!(doc["id"], 3);
    }

    #[test]
    fn prompt_embeds_description() {
        let prompt = build_prompt("Open to nursing students.");
        assert!(prompt.contains("Description: Open to nursing students."));
    }

    #[tokio::test]
    async fn augment_pending_counts_outcomes() {
        let mut conn = open_memory_database().unwrap();
        store::insert_document(&conn, &json!({"description": "Engineering award"}), None).unwrap();
        store::insert_document(&conn, &json!({"description": "please refuse"}), None).unwrap();
        store::insert_document(&conn, &json!({"title": "no description"}), None).unwrap();

        let report = augment_pending(&mut conn, &FixedExtractor, None).await.unwrap();
        assert_eq!(
            report,
            AugmentReport { processed: 3, augmented: 1, skipped: 1, failed: 1 }
        );

        // Only the failed and skipped records remain pending.
        assert_eq!(store::list_pending_augmentation(&conn).unwrap().len(), 2);
        let again = augment_pending(&mut conn, &FixedExtractor, None).await.unwrap();
        assert_eq!(again.augmented, 0);
    }

    #[tokio::test]
    async fn augment_pending_honors_limit() {
        let mut conn = open_memory_database().unwrap();
        for i in 0..3 {
            store::insert_document(&conn, &json!({"description": format!("award {i}")}), None)
                .unwrap();
        }
        let report = augment_pending(&mut conn, &FixedExtractor, Some(2)).await.unwrap();
        assert_eq!(report.processed, 2);
        assert_eq!(report.augmented, 2);
        assert_eq!(store::list_pending_augmentation(&conn).unwrap().len(), 1);
    }
}
