use std::fmt;

use serde::{Deserialize, Serialize};

/// API versions tried in order, most stable first.
pub const DEFAULT_API_VERSIONS: [&str; 2] = ["v1", "v1beta"];

/// Model identifiers tried in order, most capable first.
pub const DEFAULT_MODEL_CANDIDATES: [&str; 4] = [
    "gemini-1.5-flash-latest",
    "gemini-1.5-flash",
    "gemini-1.5-pro-latest",
    "gemini-1.5-pro",
];

/// Generation method a listed model must advertise to be usable.
pub const GENERATE_CONTENT: &str = "generateContent";

/// One (API version, model) pair attempted during retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub api_version: String,
    pub model: String,
}

impl Candidate {
    pub fn new(api_version: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_version: api_version.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.model)
    }
}

/// Builds the version-major preference list: every model under the first
/// version, then every model under the next one.
pub fn candidates(api_versions: &[String], models: &[String]) -> Vec<Candidate> {
    api_versions
        .iter()
        .flat_map(|version| models.iter().map(move |model| Candidate::new(version, model)))
        .collect()
}

/// A model advertised by the service's listing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// Resource name, usually `models/<id>`.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, methods: &[&str]) -> Self {
        Self {
            name: name.into(),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    /// The bare model id, i.e. the last path segment of `name`.
    pub fn model_id(&self) -> Option<&str> {
        self.name.rsplit('/').next().filter(|id| !id.is_empty())
    }

    pub fn supports(&self, method: &str) -> bool {
        self.supported_generation_methods.iter().any(|m| m == method)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInstruction {
    pub parts: Vec<Part>,
}

/// Body of a `generateContent` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
}

impl GenerateRequest {
    /// A single user-role message, no history.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part { text: text.into() }],
            }],
            system_instruction: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(SystemInstruction {
            parts: vec![Part {
                text: instruction.into(),
            }],
        });
        self
    }
}

/// Why a single attempt did not produce a reply.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    /// Network unreachable, timed out, or the body could not be read.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Service { status: u16, body: String },

    /// The body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Decode(String),

    /// A 2xx body that parsed but carried no reply text.
    #[error("empty response: no reply text")]
    Empty,
}

/// An [`AttemptError`] tagged with the candidate that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateError {
    pub candidate: Candidate,
    pub error: AttemptError,
}

impl fmt::Display for CandidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.error {
            AttemptError::Service { status, body } => {
                write!(f, "HTTP {status} ({}): {body}", self.candidate)
            }
            other => write!(f, "{other} ({})", self.candidate),
        }
    }
}

impl std::error::Error for CandidateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// The single result surfaced for one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetrievalOutcome {
    Reply {
        text: String,
        /// The candidate that answered; `None` for the relay.
        candidate: Option<Candidate>,
    },
    Failed {
        message: String,
        last_error: Option<String>,
    },
}

impl RetrievalOutcome {
    pub fn reply(text: impl Into<String>, candidate: Option<Candidate>) -> Self {
        Self::Reply {
            text: text.into(),
            candidate,
        }
    }

    pub fn failed(message: impl Into<String>, last_error: Option<String>) -> Self {
        Self::Failed {
            message: message.into(),
            last_error,
        }
    }

    /// Text to show in the reply bubble.
    pub fn text(&self) -> &str {
        match self {
            Self::Reply { text, .. } => text,
            Self::Failed { message, .. } => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    pub fn candidate(&self) -> Option<&Candidate> {
        match self {
            Self::Reply { candidate, .. } => candidate.as_ref(),
            Self::Failed { .. } => None,
        }
    }
}

/// The upstream text-generation service.
///
/// A 2xx reply without text is an [`AttemptError::Empty`], never a reply.
#[allow(async_fn_in_trait)]
pub trait GenerativeService {
    /// Whether credentials are present. Unconfigured services are never called.
    fn is_configured(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        candidate: &Candidate,
        request: &GenerateRequest,
    ) -> Result<String, AttemptError>;

    async fn list_models(&self, api_version: &str) -> Result<Vec<ModelDescriptor>, AttemptError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn candidates_are_version_major() {
        let list = candidates(&strings(&["v1", "v1beta"]), &strings(&["a", "b"]));
        let rendered: Vec<String> = list.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["v1/a", "v1/b", "v1beta/a", "v1beta/b"]);
    }

    #[test]
    fn model_id_strips_resource_prefix() {
        assert_eq!(
            ModelDescriptor::new("models/gemini-x", &[]).model_id(),
            Some("gemini-x")
        );
        assert_eq!(ModelDescriptor::new("bare", &[]).model_id(), Some("bare"));
        assert_eq!(ModelDescriptor::new("models/", &[]).model_id(), None);
        assert_eq!(ModelDescriptor::new("", &[]).model_id(), None);
    }

    #[test]
    fn descriptor_parses_listing_shape() {
        let descriptor: ModelDescriptor = serde_json::from_value(json!({
            "name": "models/gemini-x",
            "supportedGenerationMethods": ["generateContent", "countTokens"]
        }))
        .expect("descriptor should parse");
        assert!(descriptor.supports(GENERATE_CONTENT));
        assert!(!descriptor.supports("embedContent"));
    }

    #[test]
    fn request_serializes_system_instruction() {
        let body = serde_json::to_value(GenerateRequest::user("hi").with_system_instruction("be brief"))
            .expect("request should serialize");
        assert_eq!(
            body,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hi"}]}],
                "systemInstruction": {"parts": [{"text": "be brief"}]}
            })
        );
    }

    #[test]
    fn service_error_display_names_candidate() {
        let err = CandidateError {
            candidate: Candidate::new("v1", "m1"),
            error: AttemptError::Service {
                status: 404,
                body: "not found".to_string(),
            },
        };
        assert_eq!(err.to_string(), "HTTP 404 (v1/m1): not found");
    }
}
