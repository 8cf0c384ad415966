//! OpenAI chat-completions client with structured outputs.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use super::{build_prompt, response_schema, AugmentError, AugmentedScholarship, Extractor};
use crate::config::AugmentConfig;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that extracts scholarship information.";
const SCHEMA_NAME: &str = "augmented_scholarship";

pub struct OpenAiExtractor {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    schema: Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiExtractor {
    pub fn new(config: &AugmentConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", config.api_base.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
            schema: response_schema(),
        })
    }

    /// Request body for one description.
    pub fn request_body(&self, description: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(description) },
            ],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": self.schema,
                },
            },
        })
    }
}

/// Pull the structured answer out of a chat-completions response body.
pub fn parse_response(body: &str) -> Result<AugmentedScholarship, AugmentError> {
    let response: ChatResponse = serde_json::from_str(body)?;
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or(AugmentError::EmptyResponse)?;

    if let Some(refusal) = message.refusal.filter(|r| !r.is_empty()) {
        return Err(AugmentError::Refused(refusal));
    }
    let content = message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or(AugmentError::EmptyResponse)?;
    Ok(serde_json::from_str(&content)?)
}

impl Extractor for OpenAiExtractor {
    fn model(&self) -> &str {
        &self.model
    }

    async fn extract(&self, description: &str) -> Result<AugmentedScholarship, AugmentError> {
        let api_key = self.api_key.as_deref().ok_or(AugmentError::MissingApiKey)?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&self.request_body(description))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AugmentError::Api {
                status: status.as_u16(),
                body,
            });
        }
        debug!(bytes = body.len(), "chat completion received");
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor(api_key: Option<&str>) -> OpenAiExtractor {
        OpenAiExtractor::new(&AugmentConfig {
            api_base: "http://localhost:1/v1/".into(),
            api_key: api_key.map(String::from),
            ..AugmentConfig::default()
        })
        .unwrap()
    }

    fn completion(message: Value) -> String {
        json!({ "choices": [ { "index": 0, "message": message } ] }).to_string()
    }

    const ANSWER: &str = r#"{"title":"Nursing Award","is_merit_based":false,"preferred_ethnicity":null,
        "preferred_gender":null,"preferred_major":"Nursing","prefers_lgbt":false,"university":null,
        "location":null,"is_essay_required":false,"reward":1000,"extra_requirements":null,
        "women_in_stem":false,"disabilities":false,"rural":true,"immigrant_or_refugee":false,
        "neurodiversity":false,"low_income":true,"first_generation":false}"#;

    #[test]
    fn request_uses_strict_schema() {
        let ex = extractor(Some("sk-test"));
        assert_eq!(ex.endpoint, "http://localhost:1/v1/chat/completions");
        let body = ex.request_body("Nursing students");
        assert_eq!(body["messages"][0]["role"], "system");
        assert!(body["messages"][1]["content"]
            .as_str()
            .unwrap()
            .contains("Nursing students"));
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn parses_structured_content() {
        let body = completion(json!({ "role": "assistant", "content": ANSWER }));
        let parsed = parse_response(&body).unwrap();
        assert_eq!(parsed.title, "Nursing Award");
        assert_eq!(parsed.preferred_major.as_deref(), Some("Nursing"));
        assert_eq!(parsed.reward, 1000.0);
        assert!(parsed.rural && parsed.low_income);
    }

    #[test]
    fn refusal_and_empty_content_are_errors() {
        let refused = completion(json!({ "content": null, "refusal": "cannot help" }));
        assert!(matches!(parse_response(&refused), Err(AugmentError::Refused(r)) if r == "cannot help"));

        let empty = completion(json!({ "content": "" }));
        assert!(matches!(parse_response(&empty), Err(AugmentError::EmptyResponse)));

        let no_choices = json!({ "choices": [] }).to_string();
        assert!(matches!(parse_response(&no_choices), Err(AugmentError::EmptyResponse)));

        let bad = completion(json!({ "content": "{\"title\": 1}" }));
        assert!(matches!(parse_response(&bad), Err(AugmentError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_before_request() {
        let err = extractor(None).extract("anything").await.unwrap_err();
        assert!(matches!(err, AugmentError::MissingApiKey));
    }
}
