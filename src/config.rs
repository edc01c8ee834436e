use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

/// Environment variable pointing at an explicit config file.
pub const CONFIG_ENV: &str = "EXOCHAT_CONFIG";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub endpoint: Option<String>,
    pub api_versions: Option<Vec<String>>,
    pub models: Option<Vec<String>>,
    pub system: Option<String>,
    pub timeout: Option<u64>,
    pub max_attempts: Option<u32>,
    pub fallback_limit: Option<usize>,
    pub prefer_tag: Option<String>,
    pub relay_url: Option<String>,
    pub output: Option<String>,
    pub quick_actions: Option<Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, String> {
    let (path, config) = read_config()?;

    let profiles = config.profiles.ok_or_else(|| {
        format!(
            "Config file '{}' does not contain a [profiles] section.",
            path.display()
        )
    })?;

    let profile = profiles.get(name).cloned().ok_or_else(|| {
        format!(
            "Profile '{}' not found in config file '{}'.",
            name,
            path.display()
        )
    })?;
    validate_profile(name, &profile)?;
    Ok(profile)
}

/// Parses the config file and checks one profile, or all of them.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, String> {
    let (path, config) = read_config()?;
    let profiles = config.profiles.unwrap_or_default();

    match profile {
        Some(name) => {
            let found = profiles.get(name).ok_or_else(|| {
                format!(
                    "Profile '{}' not found in config file '{}'.",
                    name,
                    path.display()
                )
            })?;
            validate_profile(name, found)?;
        }
        None => {
            let mut names: Vec<&String> = profiles.keys().collect();
            names.sort();
            for name in names {
                validate_profile(name, &profiles[name])?;
            }
        }
    }

    Ok(path)
}

fn validate_profile(name: &str, profile: &ProfileConfig) -> Result<(), String> {
    if let Some(output) = &profile.output {
        if !matches!(output.as_str(), "text" | "json") {
            return Err(format!(
                "Invalid profile output '{output}' in profile '{name}'. Supported values: text, json."
            ));
        }
    }
    if profile.models.as_ref().is_some_and(|models| models.is_empty()) {
        return Err(format!("Profile '{name}' has an empty models list."));
    }
    if profile
        .api_versions
        .as_ref()
        .is_some_and(|versions| versions.is_empty())
    {
        return Err(format!("Profile '{name}' has an empty api_versions list."));
    }
    if profile.fallback_limit == Some(0) {
        return Err(format!("Profile '{name}' sets fallback_limit to 0."));
    }
    if profile.max_attempts == Some(0) {
        return Err(format!("Profile '{name}' sets max_attempts to 0."));
    }
    Ok(())
}

fn read_config() -> Result<(PathBuf, ConfigFile), String> {
    let path = config_path()?;
    let raw = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read config file '{}': {err}", path.display()))?;

    let config: ConfigFile = toml::from_str(&raw)
        .map_err(|err| format!("Failed to parse config file '{}': {err}", path.display()))?;
    Ok((path, config))
}

fn config_path() -> Result<PathBuf, String> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("exochat").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| {
        format!("Cannot resolve config path: set {CONFIG_ENV} or HOME/XDG_CONFIG_HOME.")
    })?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("exochat")
        .join("config.toml"))
}
