//! In-memory [`GenerativeService`] that replays canned answers and records
//! every call, for exercising the fallback chain without a network.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::llm::service::{
    AttemptError, Candidate, GenerateRequest, GenerativeService, ModelDescriptor,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Generate(String),
    List(String),
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedService {
    unconfigured: bool,
    replies: HashMap<String, Result<String, AttemptError>>,
    listings: HashMap<String, Result<Vec<ModelDescriptor>, AttemptError>>,
    calls: RefCell<Vec<Call>>,
    requests: RefCell<Vec<GenerateRequest>>,
}

fn not_found() -> AttemptError {
    AttemptError::Service {
        status: 404,
        body: "not scripted".to_string(),
    }
}

impl ScriptedService {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn unconfigured() -> Self {
        Self {
            unconfigured: true,
            ..Self::default()
        }
    }

    pub(crate) fn reply(mut self, version: &str, model: &str, text: &str) -> Self {
        self.replies
            .insert(format!("{version}/{model}"), Ok(text.to_string()));
        self
    }

    pub(crate) fn fail(mut self, version: &str, model: &str, error: AttemptError) -> Self {
        self.replies.insert(format!("{version}/{model}"), Err(error));
        self
    }

    pub(crate) fn listing(mut self, version: &str, models: Vec<ModelDescriptor>) -> Self {
        self.listings.insert(version.to_string(), Ok(models));
        self
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub(crate) fn generate_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Generate(c) => Some(c),
                Call::List(_) => None,
            })
            .collect()
    }

    pub(crate) fn list_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(v) => Some(v),
                Call::Generate(_) => None,
            })
            .collect()
    }

    pub(crate) fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.borrow().clone()
    }
}

impl GenerativeService for ScriptedService {
    fn is_configured(&self) -> bool {
        !self.unconfigured
    }

    async fn generate(
        &self,
        candidate: &Candidate,
        request: &GenerateRequest,
    ) -> Result<String, AttemptError> {
        let key = candidate.to_string();
        self.calls.borrow_mut().push(Call::Generate(key.clone()));
        self.requests.borrow_mut().push(request.clone());
        self.replies.get(&key).cloned().unwrap_or_else(|| Err(not_found()))
    }

    async fn list_models(&self, api_version: &str) -> Result<Vec<ModelDescriptor>, AttemptError> {
        self.calls
            .borrow_mut()
            .push(Call::List(api_version.to_string()));
        self.listings
            .get(api_version)
            .cloned()
            .unwrap_or_else(|| Err(not_found()))
    }
}
