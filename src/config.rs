use crate::agents::specialized::{FETCH, NOTION, SEMANTIC_SCHOLAR, SEQUENTIAL_THINKING};
use crate::log_debug;
use crate::mcp::supervisor::{LaunchDescriptor, SupervisorSettings, ToolProviderSpec};
use crate::providers::{Provider, ProviderConfig, ProviderError};

use anyhow::{Context, Result, anyhow};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the key for smithery-hosted tool providers
pub const SMITHERY_KEY_ENV: &str = "SMITHERY_API_KEY";
/// Environment variable that turns on JSON telemetry output
pub const TELEMETRY_ENV: &str = "INSIGHT_AGENTS_TELEMETRY";

/// Configuration for the insight-agents application
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct Config {
    /// Model provider used by every agent
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    #[serde(default)]
    pub session: SessionConfig,
    /// Tool providers by name; merged over the built-in launch descriptors
    #[serde(default)]
    pub tool_providers: BTreeMap<String, LaunchDescriptor>,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Model forced for this invocation only
    #[serde(skip)]
    pub temp_model: Option<String>,
}

/// Session timing, in seconds
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub deadline_seconds: u64,
    pub startup_timeout_seconds: u64,
    pub shutdown_grace_seconds: u64,
    pub call_timeout_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            deadline_seconds: 600,
            startup_timeout_seconds: 60,
            shutdown_grace_seconds: 5,
            call_timeout_seconds: 120,
        }
    }
}

impl SessionConfig {
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_seconds)
    }

    pub fn supervisor_settings(&self) -> SupervisorSettings {
        SupervisorSettings {
            startup_timeout: Duration::from_secs(self.startup_timeout_seconds),
            shutdown_grace: Duration::from_secs(self.shutdown_grace_seconds),
            call_timeout: Duration::from_secs(self.call_timeout_seconds),
        }
    }
}

#[derive(Deserialize, Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TelemetryConfig {
    #[serde(default)]
    pub enabled: bool,
}

fn default_provider() -> String {
    Provider::default().name().to_string()
}

fn npx(args: &[&str]) -> LaunchDescriptor {
    LaunchDescriptor::new("npx").with_args(args.iter().copied())
}

/// Launch descriptors for the providers the agents expect.
///
/// Smithery-hosted servers need an API key and are left out without one.
pub fn default_tool_providers(smithery_key: Option<&str>) -> BTreeMap<String, LaunchDescriptor> {
    let mut providers = BTreeMap::new();
    providers.insert(
        SEQUENTIAL_THINKING.to_string(),
        npx(&["-y", "@modelcontextprotocol/server-sequential-thinking"]),
    );

    if let Some(key) = smithery_key.filter(|key| !key.is_empty()) {
        for (name, package) in [
            (SEMANTIC_SCHOLAR, "@hamid-vakilzadeh/mcpsemanticscholar"),
            (FETCH, "@smithery-ai/fetch"),
            (NOTION, "@smithery-ai/notion"),
        ] {
            providers.insert(
                name.to_string(),
                npx(&["-y", "@smithery/cli@latest", "run", package, "--key", key]),
            );
        }
    }
    providers
}

impl Config {
    /// Load the user configuration and apply credentials from the environment
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            Self::default()
        };
        config.apply_env(|name| std::env::var(name).ok());
        log_debug!(
            "Configuration loaded: provider={}, tool providers={:?}",
            config.default_provider,
            config.tool_providers.keys().collect::<Vec<_>>()
        );
        Ok(config)
    }

    /// Read a config file without consulting the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| {
            format!(
                "Invalid configuration file format in {}. Please check it for syntax errors.",
                path.display()
            )
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Fill in values the file leaves open from `lookup` (normally the
    /// process environment). Values already set in the file win.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for provider in Provider::ALL {
            let configured = self
                .providers
                .get(provider.name())
                .is_some_and(ProviderConfig::has_api_key);
            if configured {
                continue;
            }
            let key = provider
                .api_key_envs()
                .iter()
                .find_map(|name| lookup(name).filter(|value| !value.is_empty()));
            if let Some(key) = key {
                self.providers
                    .entry(provider.name().to_string())
                    .or_default()
                    .api_key = key;
            }
        }

        let defaults = default_tool_providers(lookup(SMITHERY_KEY_ENV).as_deref());
        for (name, launch) in defaults {
            self.tool_providers.entry(name).or_insert(launch);
        }

        if lookup(TELEMETRY_ENV).is_some_and(|value| matches!(value.as_str(), "1" | "true")) {
            self.telemetry.enabled = true;
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let mut path =
            config_dir().ok_or_else(|| anyhow!("Unable to determine config directory"))?;
        path.push("insight-agents");
        path.push("config.toml");
        Ok(path)
    }

    pub fn provider(&self) -> Result<Provider, ProviderError> {
        self.default_provider.parse()
    }

    pub fn provider_config(&self, provider: Provider) -> ProviderConfig {
        self.providers
            .get(provider.name())
            .cloned()
            .unwrap_or_default()
    }

    pub fn api_key(&self, provider: Provider) -> Result<String, ProviderError> {
        let config = self.provider_config(provider);
        if config.has_api_key() {
            Ok(config.api_key)
        } else {
            Err(ProviderError::MissingApiKey(
                provider.name().to_string(),
                provider.api_key_envs().join(" or "),
            ))
        }
    }

    /// Model an agent runs with, given its profile's preferred model
    pub fn model_for(&self, provider: Provider, profile_model: &str) -> String {
        self.temp_model.clone().unwrap_or_else(|| {
            self.provider_config(provider)
                .effective_model(provider, profile_model)
        })
    }

    /// Provider spec for `name`, if one is configured
    pub fn tool_provider(&self, name: &str) -> Option<ToolProviderSpec> {
        self.tool_providers
            .get(name)
            .map(|launch| ToolProviderSpec::new(name, launch.clone()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            session: SessionConfig::default(),
            tool_providers: BTreeMap::new(),
            telemetry: TelemetryConfig::default(),
            temp_model: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let pairs: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| pairs.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_smithery_key() {
        let mut config = Config::default();
        config.apply_env(env(&[]));
        assert_eq!(
            config.tool_providers.keys().collect::<Vec<_>>(),
            vec![SEQUENTIAL_THINKING]
        );
        assert!(config.tool_provider(SEMANTIC_SCHOLAR).is_none());
    }

    #[test]
    fn test_smithery_key_is_passed_as_argument() {
        let mut config = Config::default();
        config.apply_env(env(&[(SMITHERY_KEY_ENV, "abc123")]));
        let spec = config.tool_provider(NOTION).expect("notion configured");
        assert_eq!(spec.launch.command, "npx");
        assert_eq!(spec.launch.args.last().map(String::as_str), Some("abc123"));
        assert!(spec.launch.args.contains(&"@smithery-ai/notion".to_string()));
    }

    #[test]
    fn test_config_key_wins_over_environment() {
        let mut config = Config::from_toml_str(
            r#"
            [providers.gemini]
            api_key = "from-file"
            "#,
        )
        .expect("valid toml");
        config.apply_env(env(&[
            ("GOOGLE_API_KEY", "from-env"),
            ("OPENAI_API_KEY", "openai-env"),
        ]));
        assert_eq!(config.api_key(Provider::Gemini).ok().as_deref(), Some("from-file"));
        assert_eq!(config.api_key(Provider::OpenAI).ok().as_deref(), Some("openai-env"));
    }

    #[test]
    fn test_gemini_key_fallback_variable() {
        let mut config = Config::default();
        config.apply_env(env(&[("GEMINI_API_KEY", "g")]));
        assert_eq!(config.api_key(Provider::Gemini).ok().as_deref(), Some("g"));
        assert!(matches!(
            config.api_key(Provider::OpenAI),
            Err(ProviderError::MissingApiKey(..))
        ));
    }

    #[test]
    fn test_telemetry_flag() {
        let mut config = Config::default();
        config.apply_env(env(&[(TELEMETRY_ENV, "1")]));
        assert!(config.telemetry.enabled);
    }

    #[test]
    fn test_model_override_order() {
        let mut config = Config::default();
        assert_eq!(config.model_for(Provider::Gemini, "gemini-2.5-pro"), "gemini-2.5-pro");
        config.temp_model = Some("gemini-2.0-flash".to_string());
        assert_eq!(config.model_for(Provider::Gemini, "gemini-2.5-pro"), "gemini-2.0-flash");
    }
}
