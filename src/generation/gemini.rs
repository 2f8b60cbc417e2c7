//! Google Gemini backend speaking the `generateContent` REST API.

use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{classify_failure, TextModel};
use crate::{Error, GeneratorConfig, Result};

/// A configured Gemini client.
///
/// Build one at startup and share it; the underlying HTTP client keeps its
/// connection pool across calls.
pub struct GeminiModel {
    client: Client,
    config: GeneratorConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

impl GeminiModel {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| Error::ConfigError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn request_url(&self, api_key: &str) -> Result<Url> {
        let raw = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| Error::ConfigError(format!("invalid endpoint '{}': {}", self.config.endpoint, e)))?;
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

impl TextModel for GeminiModel {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, instruction: &str) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::MissingCredential)?;

        let url = self.request_url(api_key)?;
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": instruction }] }]
        });

        debug!("POST generateContent model={}", self.config.model);
        let response = self.client.post(url).json(&body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|env| env.error.message)
                .unwrap_or_else(|_| text.clone());
            error!("Gemini request failed with {}: {}", status, message);
            return Err(classify_failure(Some(status.as_u16()), &message, &self.config.model));
        }

        extract_text(&text)
    }
}

/// Concatenate the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String> {
    let parsed: GenerateResponse = serde_json::from_str(body)?;
    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(Error::Remote("The model returned an empty response.".to_string()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_url_carries_model_and_key() {
        let model = GeminiModel::new(GeneratorConfig {
            api_key: Some("k".into()),
            model: "gemini-test".into(),
            endpoint: "http://localhost:8080/".into(),
            timeout_ms: Some(1000),
        })
        .unwrap();
        let url = model.request_url("k 1").unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent?key=k+1"
        );
    }

    #[test]
    fn extract_joins_parts_of_first_candidate() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"<p>"},{"text":"x</p>"}]}},{"content":{"parts":[{"text":"ignored"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "<p>x</p>");
    }

    #[test]
    fn empty_candidates_are_remote_errors() {
        assert!(matches!(extract_text(r#"{"candidates":[]}"#), Err(Error::Remote(_))));
        assert!(matches!(extract_text("{}"), Err(Error::Remote(_))));
        assert!(matches!(extract_text("not json"), Err(Error::Serialization(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let model = GeminiModel::new(GeneratorConfig {
            endpoint: "http://127.0.0.1:1".into(),
            ..Default::default()
        })
        .unwrap();
        assert!(matches!(model.complete("x").await, Err(Error::MissingCredential)));
    }
}
