use std::env;
use std::str::FromStr;

use clap::{Args, ValueEnum};

use crate::chat::controller::DEFAULT_QUICK_ACTIONS;
use crate::config::{self, ProfileConfig};
use crate::llm::gemini::{API_KEY_ENV, DEFAULT_ENDPOINT, GeminiClient};
use crate::llm::relay::{DEFAULT_RELAY_URL, Relay};
use crate::llm::retriever::{Retriever, RetrieverConfig};

pub const ENDPOINT_ENV: &str = "EXOCHAT_ENDPOINT";
pub const MODELS_ENV: &str = "EXOCHAT_MODELS";
pub const API_VERSIONS_ENV: &str = "EXOCHAT_API_VERSIONS";
pub const TIMEOUT_ENV: &str = "EXOCHAT_TIMEOUT";
pub const MAX_ATTEMPTS_ENV: &str = "EXOCHAT_MAX_ATTEMPTS";
pub const RELAY_URL_ENV: &str = "EXOCHAT_RELAY_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Flags shared by every command that talks to a service.
#[derive(Debug, Args, Clone, Default)]
pub struct SettingsArgs {
    /// Named profile from the config file.
    #[arg(long)]
    pub profile: Option<String>,
    /// Base URL of the generative-language API.
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Model candidate, in preference order. Repeatable.
    #[arg(long = "model", value_name = "MODEL")]
    pub models: Vec<String>,
    /// API version, in preference order. Repeatable.
    #[arg(long = "api-version", value_name = "VERSION")]
    pub api_versions: Vec<String>,
    /// System instruction attached to every request.
    #[arg(long)]
    pub system: Option<String>,
    /// Per-attempt timeout in seconds.
    #[arg(long)]
    pub timeout: Option<u64>,
    /// Maximum generate calls per question.
    #[arg(long)]
    pub max_attempts: Option<u32>,
    /// Maximum discovered models retried.
    #[arg(long)]
    pub fallback_limit: Option<usize>,
    /// Discovered model names containing this tag are tried first.
    #[arg(long)]
    pub prefer_tag: Option<String>,
    /// Base URL of the backend proxy.
    #[arg(long)]
    pub relay_url: Option<String>,
    #[arg(short, long)]
    pub verbose: bool,
    #[arg(short, long)]
    pub quiet: bool,
}

/// Fully resolved settings: CLI, then environment, then profile, then defaults.
#[derive(Clone)]
pub struct Settings {
    pub endpoint: String,
    pub api_key: String,
    pub retriever: RetrieverConfig,
    pub timeout_secs: Option<u64>,
    pub relay_url: String,
    pub output: OutputMode,
    pub quick_actions: Vec<String>,
}

impl Settings {
    pub fn api_key_present(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    pub fn retriever(&self) -> Retriever<GeminiClient> {
        let client = GeminiClient::new(self.api_key.clone(), self.endpoint.clone())
            .with_timeout_secs(self.timeout_secs);
        Retriever::new(client, self.retriever.clone())
    }

    pub fn relay(&self) -> Relay {
        Relay::new(self.relay_url.clone()).with_timeout_secs(self.timeout_secs)
    }
}

pub fn resolve(args: &SettingsArgs) -> Result<Settings, String> {
    let profile = match &args.profile {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };
    let defaults = RetrieverConfig::default();

    let endpoint = args
        .endpoint
        .clone()
        .or_else(|| env_string(ENDPOINT_ENV))
        .or(profile.endpoint)
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

    let models = non_empty(args.models.clone())
        .or_else(|| env_list(MODELS_ENV))
        .or(profile.models)
        .unwrap_or(defaults.models);
    let api_versions = non_empty(args.api_versions.clone())
        .or_else(|| env_list(API_VERSIONS_ENV))
        .or(profile.api_versions)
        .unwrap_or(defaults.api_versions);

    let timeout_secs = match args.timeout {
        Some(value) => Some(value),
        None => env_parse(TIMEOUT_ENV)?.or(profile.timeout),
    };
    let max_attempts = match args.max_attempts {
        Some(value) => Some(value),
        None => env_parse(MAX_ATTEMPTS_ENV)?.or(profile.max_attempts),
    };
    if max_attempts == Some(0) {
        return Err("--max-attempts must be at least 1.".to_string());
    }

    let fallback_limit = args
        .fallback_limit
        .or(profile.fallback_limit)
        .unwrap_or(defaults.fallback_limit);
    if fallback_limit == 0 {
        return Err("--fallback-limit must be at least 1.".to_string());
    }

    let prefer_tag = args
        .prefer_tag
        .clone()
        .or(profile.prefer_tag)
        .or(defaults.prefer_tag)
        .filter(|tag| !tag.is_empty());

    let system_instruction = args
        .system
        .clone()
        .or(profile.system)
        .unwrap_or(defaults.system_instruction);

    let relay_url = args
        .relay_url
        .clone()
        .or_else(|| env_string(RELAY_URL_ENV))
        .or(profile.relay_url)
        .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());

    let output = match profile.output.as_deref() {
        Some(raw) => OutputMode::parse(raw)
            .ok_or_else(|| format!("Invalid profile output '{raw}'. Supported values: text, json."))?,
        None => OutputMode::Text,
    };

    let quick_actions = profile
        .quick_actions
        .unwrap_or_else(|| DEFAULT_QUICK_ACTIONS.iter().map(|q| q.to_string()).collect());

    Ok(Settings {
        endpoint,
        api_key: env::var(API_KEY_ENV).unwrap_or_default(),
        retriever: RetrieverConfig {
            api_versions,
            models,
            system_instruction,
            prefer_tag,
            fallback_limit,
            max_attempts,
        },
        timeout_secs,
        relay_url,
        output,
        quick_actions,
    })
}

/// `--json` beats `--output`, which beats the profile.
pub fn output_mode(json: bool, output: Option<OutputMode>, settings: &Settings) -> OutputMode {
    if json {
        OutputMode::Json
    } else {
        output.unwrap_or(settings.output)
    }
}

pub fn version_text() -> String {
    format!(
        "exochat {}\ncommit: {}\nbuilt: {}",
        env!("CARGO_PKG_VERSION"),
        env!("EXOCHAT_GIT_SHA"),
        env!("EXOCHAT_BUILD_TS")
    )
}

fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() { None } else { Some(values) }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_list(name: &str) -> Option<Vec<String>> {
    let raw = env_string(name)?;
    let items: Vec<String> = raw
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect();
    non_empty(items)
}

fn env_parse<T: FromStr>(name: &str) -> Result<Option<T>, String> {
    match env_string(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("Invalid {name} '{raw}': expected a positive integer.")),
        None => Ok(None),
    }
}
