use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm::attempt::{decode_json, send_attempt};
use crate::llm::service::{AttemptError, RetrievalOutcome};

pub const DEFAULT_RELAY_URL: &str = "http://127.0.0.1:5000";
pub const RELAY_ROUTE: &str = "/ai";

/// Shown when the backend answers without a `reply` field.
pub const NO_REPLY_TEXT: &str = "No reply was received.";

/// Shown for any relay failure.
pub const CONNECTION_ERROR_TEXT: &str = "An error occurred while connecting to the AI.";

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct RelayResponse {
    reply: Option<String>,
}

/// Forwards messages to a backend route that owns model selection.
#[derive(Debug, Clone)]
pub struct Relay {
    client: reqwest::Client,
    url: String,
    timeout_secs: Option<u64>,
}

impl Relay {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base = base_url.into();
        Self {
            client: reqwest::Client::new(),
            url: format!("{}{RELAY_ROUTE}", base.trim_end_matches('/')),
            timeout_secs: None,
        }
    }

    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// One POST, no retry. Always yields an outcome.
    pub async fn send(&self, message: &str) -> RetrievalOutcome {
        match self.post(message).await {
            Ok(reply) => RetrievalOutcome::reply(
                reply.unwrap_or_else(|| NO_REPLY_TEXT.to_string()),
                None,
            ),
            Err(err) => {
                warn!(url = %self.url, error = %err, "relay request failed");
                RetrievalOutcome::failed(CONNECTION_ERROR_TEXT, Some(err.to_string()))
            }
        }
    }

    async fn post(&self, message: &str) -> Result<Option<String>, AttemptError> {
        debug!(url = %self.url, "relaying message");
        let builder = self.client.post(&self.url).json(&RelayRequest { message });
        let response = send_attempt(builder, self.timeout_secs).await?;
        let body: RelayResponse = decode_json(response).await?;
        Ok(body.reply.filter(|reply| !reply.is_empty()))
    }
}
