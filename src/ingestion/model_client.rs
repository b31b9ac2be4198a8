use crate::domain::ModelId;
use crate::error::ModelError;
use parking_lot::Mutex;
use reqwest::blocking::Client as HttpClient;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub trait ModelClient: Send + Sync {
    fn generate(&self, model: ModelId, prompt: &str) -> Result<String, ModelError>;
}

pub struct GeminiModelClient {
    endpoint: String,
    api_key: String,
    http: HttpClient,
}

impl GeminiModelClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ModelError> {
        Self::with_options(api_key, DEFAULT_GEMINI_ENDPOINT, None)
    }

    /// `timeout` of `None` keeps the HTTP client's own default.
    pub fn with_options(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ModelError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            http: builder.build()?,
        })
    }

    pub fn generate_url(&self, model: ModelId) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            model
        )
    }
}

impl ModelClient for GeminiModelClient {
    fn generate(&self, model: ModelId, prompt: &str) -> Result<String, ModelError> {
        let payload = GenerateContentRequest {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .http
            .post(self.generate_url(model))
            .header("x-goog-api-key", &self.api_key)
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ModelError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let raw: GenerateContentResponse = response.json()?;
        Ok(raw.text())
    }
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate, thought parts excluded.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| !part.thought)
                    .filter_map(|part| part.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Default)]
pub struct MockModelClient {
    responses: Arc<Mutex<VecDeque<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<(ModelId, String)>>>,
}

impl MockModelClient {
    pub fn push_response(&self, text: impl Into<String>) {
        self.responses.lock().push_back(Ok(text.into()));
    }

    pub fn push_failure(&self, message: impl Into<String>) {
        self.responses.lock().push_back(Err(message.into()));
    }

    pub fn calls(&self) -> Vec<(ModelId, String)> {
        self.calls.lock().clone()
    }
}

impl ModelClient for MockModelClient {
    fn generate(&self, model: ModelId, prompt: &str) -> Result<String, ModelError> {
        self.calls.lock().push((model, prompt.to_string()));
        match self.responses.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ModelError::Provider(message)),
            None => Err(ModelError::Provider("no mock response queued".to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_generate_content_response() {
        let json = r#"{
            "candidates": [
                {
                    "content": {
                        "role": "model",
                        "parts": [
                            {"text": "```json\n{\"final_report\": "},
                            {"text": "\"ok\"}\n```"}
                        ]
                    },
                    "finishReason": "STOP"
                },
                {"content": {"parts": [{"text": "ignored"}]}}
            ],
            "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40}
        }"#;

        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), "```json\n{\"final_report\": \"ok\"}\n```");
    }

    #[test]
    fn thought_parts_are_skipped() {
        let json = r#"{"candidates": [{"content": {"parts": [
            {"text": "Let me think about {braces}.", "thought": true},
            {"text": "{\"final_report\": \"ok\"}"},
            {"text": " ", "thought": false}
        ]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.text(), "{\"final_report\": \"ok\"} ");
    }

    #[test]
    fn blocked_response_has_empty_text() {
        let blocked: GenerateContentResponse = serde_json::from_str(
            r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#,
        )
        .unwrap();
        assert_eq!(blocked.text(), "");

        let no_parts: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": [{"finishReason": "SAFETY"}]}"#).unwrap();
        assert_eq!(no_parts.text(), "");
    }

    #[test]
    fn url_names_the_model() {
        let client =
            GeminiModelClient::with_options("key", "http://localhost:9000/v1beta/", None).unwrap();
        assert_eq!(
            client.generate_url(ModelId::Gemini15Pro),
            "http://localhost:9000/v1beta/models/gemini-1.5-pro:generateContent"
        );
    }

    #[test]
    fn mock_replays_in_order() {
        let mock = MockModelClient::default();
        mock.push_response("first");
        mock.push_failure("quota exceeded");

        assert_eq!(mock.generate(ModelId::Gemini20Flash, "p1").unwrap(), "first");
        let err = mock.generate(ModelId::Gemini20Pro, "p2").unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(mock.generate(ModelId::Gemini20Pro, "p3").is_err());
        assert_eq!(mock.calls().len(), 3);
        assert_eq!(mock.calls()[1], (ModelId::Gemini20Pro, "p2".to_string()));
    }
}
