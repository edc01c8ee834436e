use serde::Deserialize;
use tracing::debug;

use crate::llm::attempt::{decode_json, send_attempt};
use crate::llm::service::{
    AttemptError, Candidate, GenerateRequest, GenerativeService, ModelDescriptor,
};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelDescriptor>,
}

impl GenerateContentResponse {
    fn into_text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().next())
            .and_then(|part| part.text)
            .filter(|text| !text.is_empty())
    }
}

/// HTTP client for the generative-language REST API. Not `Debug`: it holds
/// the API key.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout_secs: Option<u64>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            timeout_secs: None,
        }
    }

    /// Per-attempt timeout. Without one a hung request stalls the turn.
    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    fn generate_url(&self, candidate: &Candidate) -> String {
        format!(
            "{}/{}/models/{}:generateContent",
            self.endpoint, candidate.api_version, candidate.model
        )
    }

    fn models_url(&self, api_version: &str) -> String {
        format!("{}/{api_version}/models", self.endpoint)
    }
}

impl GenerativeService for GeminiClient {
    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn generate(
        &self,
        candidate: &Candidate,
        request: &GenerateRequest,
    ) -> Result<String, AttemptError> {
        let url = self.generate_url(candidate);
        debug!(%url, "generateContent");

        let builder = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request);
        let response = send_attempt(builder, self.timeout_secs).await?;
        let body: GenerateContentResponse = decode_json(response).await?;
        body.into_text().ok_or(AttemptError::Empty)
    }

    async fn list_models(&self, api_version: &str) -> Result<Vec<ModelDescriptor>, AttemptError> {
        let url = self.models_url(api_version);
        debug!(%url, "listing models");

        let builder = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str())]);
        let response = send_attempt(builder, self.timeout_secs).await?;
        let body: ListModelsResponse = decode_json(response).await?;
        Ok(body.models)
    }
}
