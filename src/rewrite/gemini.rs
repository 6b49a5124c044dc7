//! Gemini text generation via the Generative Language REST API
//!
//! Sends one prompt per request to `models/{model}:generateContent` and
//! joins the text parts of the first candidate. Uses blocking ureq on the
//! tokio blocking pool.

use super::{TextGenerator, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::config::GeminiConfig;
use crate::error::RewriteError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gemini-backed text generator
#[derive(Clone)]
pub struct GeminiGenerator {
    agent: ureq::Agent,
    /// Full generateContent URL for the configured model
    url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate; empty if there is none
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

fn request_body(prompt: &str) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            parts: vec![Part { text: prompt }],
        }],
        generation_config: GenerationConfig {
            temperature: TEMPERATURE,
            max_output_tokens: MAX_OUTPUT_TOKENS,
        },
    }
}

impl GeminiGenerator {
    /// Create a new generator from config
    pub fn new(config: &GeminiConfig) -> Result<Self, RewriteError> {
        let endpoint = config.endpoint.trim_end_matches('/');

        // Validate endpoint URL format
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(RewriteError::Config(format!(
                "gemini.endpoint must start with http:// or https://, got: {}",
                endpoint
            )));
        }

        // Warn about non-HTTPS for non-localhost endpoints
        if endpoint.starts_with("http://")
            && !endpoint.contains("localhost")
            && !endpoint.contains("127.0.0.1")
            && !endpoint.contains("[::1]")
        {
            tracing::warn!(
                "Gemini endpoint uses HTTP without TLS. Selected text and the API key will be sent unencrypted!"
            );
        }

        let timeout = config.request_timeout();
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            endpoint, config.model
        );

        tracing::info!(
            "Gemini client initialized with model: {} (timeout={}s)",
            config.model,
            timeout.as_secs()
        );

        Ok(Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            url,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout,
        })
    }

    /// Blocking request; run on the blocking pool
    fn call(&self, prompt: &str) -> Result<String, RewriteError> {
        let start = std::time::Instant::now();

        let response = self
            .agent
            .post(&self.url)
            .set("x-goog-api-key", &self.api_key)
            .set("Content-Type", "application/json")
            .send_json(request_body(prompt))
            .map_err(|e| match e {
                ureq::Error::Status(code, resp) => {
                    let body = resp.into_string().unwrap_or_default();
                    RewriteError::Provider(format!("Server returned {}: {}", code, body))
                }
                ureq::Error::Transport(t) => {
                    RewriteError::Network(format!("Request failed: {}", t))
                }
            })?;

        let parsed: GenerateResponse = response.into_json().map_err(|e| {
            RewriteError::Provider(format!("Failed to parse response: {}", e))
        })?;

        let text = parsed.text();
        tracing::debug!(
            "{} responded in {:.2}s ({} chars)",
            self.model,
            start.elapsed().as_secs_f32(),
            text.chars().count()
        );

        Ok(text)
    }
}

#[async_trait::async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, RewriteError> {
        let this = self.clone();
        let prompt = prompt.to_string();

        tokio::task::spawn_blocking(move || this.call(&prompt))
            .await
            .map_err(|e| RewriteError::Provider(format!("Request task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn gemini_config() -> GeminiConfig {
        let mut config = Config::default().gemini;
        config.api_key = "test-key".to_string();
        config
    }

    #[test]
    fn test_url_from_config() {
        let mut config = gemini_config();
        config.endpoint = "http://localhost:8080/".to_string();
        config.model = "gemini-1.5-flash".to_string();

        let generator = GeminiGenerator::new(&config).unwrap();
        assert_eq!(
            generator.url,
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent"
        );
        assert_eq!(generator.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_invalid_endpoint() {
        let mut config = gemini_config();
        config.endpoint = "generativelanguage.googleapis.com".to_string();

        let result = GeminiGenerator::new(&config);
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("http://"));
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request_body("Fix this")).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Fix this");
        assert_eq!(body["generationConfig"]["maxOutputTokens"], 2048);
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let json = r#"{
            "candidates": [
                {"content": {"role": "model", "parts": [{"text": "Hello, "}, {"text": "world."}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "Hello, world.");
    }

    #[test]
    fn test_response_without_candidates_is_empty() {
        // Blocked prompts come back with no candidates at all
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "");

        let json = r#"{"candidates": [{"finishReason": "SAFETY"}]}"#;
        let response: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.text(), "");
    }
}
