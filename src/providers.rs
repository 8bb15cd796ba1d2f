//! Model provider configuration.
//!
//! Single source of truth for supported providers and their defaults.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported model providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    OpenAI,
}

impl Provider {
    pub const ALL: &'static [Provider] = &[Provider::Gemini, Provider::OpenAI];

    /// Provider name as used in config files and CLI
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::OpenAI => "openai",
        }
    }

    /// Model used when neither the config nor the agent profile names one
    /// that this provider understands
    pub const fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::OpenAI => "gpt-4.1",
        }
    }

    /// Whether the per-agent default models belong to this provider
    pub const fn serves_profile_models(&self) -> bool {
        matches!(self, Self::Gemini)
    }

    /// Environment variables holding the API key, in lookup order
    pub const fn api_key_envs(&self) -> &'static [&'static str] {
        match self {
            Self::Gemini => &["GOOGLE_API_KEY", "GEMINI_API_KEY"],
            Self::OpenAI => &["OPENAI_API_KEY"],
        }
    }

    pub fn all_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Self::name).collect()
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        // "google" is accepted for the gemini provider
        let normalized = if lower == "google" { "gemini" } else { &lower };

        Self::ALL
            .iter()
            .find(|p| p.name() == normalized)
            .copied()
            .ok_or_else(|| ProviderError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Provider configuration error
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}. Supported: gemini, openai")]
    Unknown(String),
    #[error("API key required for provider {0}; set {1} or add it to the config file")]
    MissingApiKey(String, String),
}

/// Per-provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (loaded from env or config)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
    /// Model override applied to every agent
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub model: String,
}

impl ProviderConfig {
    /// Model for an agent whose profile prefers `profile_model`
    pub fn effective_model(&self, provider: Provider, profile_model: &str) -> String {
        if !self.model.is_empty() {
            self.model.clone()
        } else if provider.serves_profile_models() {
            profile_model.to_string()
        } else {
            provider.default_model().to_string()
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}
