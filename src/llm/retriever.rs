//! Answer retrieval over the generative-language API.
//!
//! A turn walks the configured (version, model) candidates in order and
//! returns the first reply. When every configured candidate fails, the
//! service is asked which models it currently offers and a ranked subset of
//! those is tried the same way. Only the most recent failure is kept for the
//! final error message.

use tracing::{debug, info, warn};

use crate::llm::listing::{list_usable_models, rank_models};
use crate::llm::service::{
    Candidate, CandidateError, DEFAULT_API_VERSIONS, DEFAULT_MODEL_CANDIDATES, GenerateRequest,
    GenerativeService, RetrievalOutcome, candidates,
};

macro_rules! kepler_docs_url {
    () => {
        "https://exoplanetarchive.ipac.caltech.edu/docs/API_kepcandidate_columns.html"
    };
}

/// Documentation the assistant is restricted to.
pub const KEPLER_DOCS_URL: &str = kepler_docs_url!();

pub const DEFAULT_SYSTEM_INSTRUCTION: &str = concat!(
    "You are an expert assistant on Kepler exoplanet data. \
Your only knowledge base is the Kepler API documentation available at ",
    kepler_docs_url!(),
    ". Prioritize and use ONLY the information from that source to answer the user's questions. \
If the requested information is not in that documentation, you must answer: \
\"I can't find that specific information in the Kepler API documentation I was given.\""
);

pub const MISSING_KEY_MESSAGE: &str =
    "Set your Gemini API key (GEMINI_API_KEY) to get answers.";

pub const REMEDIATION_HINT: &str = "Hint: check the available models in Google AI Studio \
and add an exact name to the model candidates.";

/// Names containing this tag are tried first among discovered models.
pub const DEFAULT_PREFER_TAG: &str = "1.5";

/// Maximum number of discovered models retried.
pub const DEFAULT_FALLBACK_LIMIT: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrieverConfig {
    pub api_versions: Vec<String>,
    pub models: Vec<String>,
    pub system_instruction: String,
    pub prefer_tag: Option<String>,
    pub fallback_limit: usize,
    /// Cap on `generateContent` calls per turn, across both phases.
    pub max_attempts: Option<u32>,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            api_versions: DEFAULT_API_VERSIONS.iter().map(|v| v.to_string()).collect(),
            models: DEFAULT_MODEL_CANDIDATES.iter().map(|m| m.to_string()).collect(),
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            prefer_tag: Some(DEFAULT_PREFER_TAG.to_string()),
            fallback_limit: DEFAULT_FALLBACK_LIMIT,
            max_attempts: None,
        }
    }
}

impl RetrieverConfig {
    pub fn candidates(&self) -> Vec<Candidate> {
        candidates(&self.api_versions, &self.models)
    }

    /// The payload sent for `text`; the system instruction rides on every call.
    pub fn request_for(&self, text: &str) -> GenerateRequest {
        let request = GenerateRequest::user(text);
        if self.system_instruction.trim().is_empty() {
            request
        } else {
            request.with_system_instruction(self.system_instruction.clone())
        }
    }
}

/// Per-turn bookkeeping. Dropped when the turn ends.
#[derive(Debug, Default)]
struct Turn {
    attempts: u32,
    last_error: Option<CandidateError>,
}

impl Turn {
    fn budget_left(&self, max_attempts: Option<u32>) -> bool {
        max_attempts.is_none_or(|max| self.attempts < max)
    }
}

pub struct Retriever<S> {
    service: S,
    config: RetrieverConfig,
}

impl<S: GenerativeService> Retriever<S> {
    pub fn new(service: S, config: RetrieverConfig) -> Self {
        Self { service, config }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Produces exactly one terminal outcome for `text`.
    pub async fn retrieve(&self, text: &str) -> RetrievalOutcome {
        if !self.service.is_configured() {
            warn!("no API key configured; skipping request");
            return RetrievalOutcome::failed(MISSING_KEY_MESSAGE, None);
        }

        let request = self.config.request_for(text);
        let mut turn = Turn::default();

        let configured = self.config.candidates();
        if let Some(outcome) = self.try_candidates(&configured, &request, &mut turn).await {
            return outcome;
        }

        if turn.budget_left(self.config.max_attempts) {
            if let Some(outcome) = self.try_discovered(&request, &mut turn).await {
                return outcome;
            }
        } else {
            debug!("attempt budget spent; skipping model discovery");
        }

        self.exhausted(turn)
    }

    async fn try_discovered(
        &self,
        request: &GenerateRequest,
        turn: &mut Turn,
    ) -> Option<RetrievalOutcome> {
        let listed = list_usable_models(&self.service, &self.config.api_versions).await?;
        let ranked = rank_models(
            listed.models,
            self.config.prefer_tag.as_deref(),
            self.config.fallback_limit,
        );
        let discovered: Vec<Candidate> = ranked
            .iter()
            .filter_map(|model| model.model_id())
            .map(|id| Candidate::new(&listed.api_version, id))
            .collect();
        debug!(
            api_version = %listed.api_version,
            count = discovered.len(),
            "retrying with discovered models"
        );
        self.try_candidates(&discovered, request, turn).await
    }

    async fn try_candidates(
        &self,
        list: &[Candidate],
        request: &GenerateRequest,
        turn: &mut Turn,
    ) -> Option<RetrievalOutcome> {
        for candidate in list {
            if !turn.budget_left(self.config.max_attempts) {
                debug!(attempts = turn.attempts, "attempt budget spent");
                return None;
            }
            turn.attempts += 1;

            match self.service.generate(candidate, request).await {
                Ok(text) => {
                    info!(candidate = %candidate, attempts = turn.attempts, "reply received");
                    return Some(RetrievalOutcome::reply(text, Some(candidate.clone())));
                }
                Err(error) => {
                    let error = CandidateError {
                        candidate: candidate.clone(),
                        error,
                    };
                    debug!(%error, "candidate failed");
                    turn.last_error = Some(error);
                }
            }
        }
        None
    }

    fn exhausted(&self, turn: Turn) -> RetrievalOutcome {
        let last = turn.last_error.map(|err| err.to_string());
        warn!(
            attempts = turn.attempts,
            last_error = last.as_deref().unwrap_or("none"),
            "all candidates failed"
        );
        let message = format!(
            "Error querying Gemini: {}\n{REMEDIATION_HINT}",
            last.as_deref().unwrap_or("unknown failure")
        );
        RetrievalOutcome::failed(message, last)
    }
}
