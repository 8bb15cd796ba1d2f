use insight_agents::common::CommonParams;
use insight_agents::config::{Config, SMITHERY_KEY_ENV};
use insight_agents::providers::Provider;

use std::fs;
use std::time::Duration;
use tempfile::TempDir;

const CONFIG: &str = r#"
default_provider = "openai"

[providers.openai]
api_key = "sk-file"
model = "gpt-4.1-mini"

[session]
deadline_seconds = 90
call_timeout_seconds = 15

[tool_providers.semantic_scholar]
command = "uvx"
args = ["semantic-scholar-mcp"]

[tool_providers.semantic_scholar.env]
SEMANTIC_SCHOLAR_TIMEOUT = "30"
"#;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, content).expect("Failed to write config file");
    (temp_dir, path)
}

#[test]
fn test_load_from_file() {
    let (_temp_dir, path) = write_config(CONFIG);
    let config = Config::load_from(&path).expect("config loads");

    assert_eq!(config.provider().ok(), Some(Provider::OpenAI));
    assert_eq!(config.api_key(Provider::OpenAI).ok().as_deref(), Some("sk-file"));
    assert_eq!(config.model_for(Provider::OpenAI, "gemini-2.5-flash"), "gpt-4.1-mini");

    assert_eq!(config.session.deadline(), Duration::from_secs(90));
    let settings = config.session.supervisor_settings();
    assert_eq!(settings.call_timeout, Duration::from_secs(15));
    // Unset values keep their defaults
    assert_eq!(settings.startup_timeout, Duration::from_secs(60));
    assert_eq!(settings.shutdown_grace, Duration::from_secs(5));

    let scholar = config
        .tool_provider("semantic_scholar")
        .expect("semantic_scholar configured");
    assert_eq!(scholar.launch.command, "uvx");
    assert_eq!(
        scholar
            .launch
            .env
            .get("SEMANTIC_SCHOLAR_TIMEOUT")
            .map(String::as_str),
        Some("30")
    );
}

#[test]
fn test_file_providers_win_over_defaults() {
    let (_temp_dir, path) = write_config(CONFIG);
    let mut config = Config::load_from(&path).expect("config loads");
    config.apply_env(|name| (name == SMITHERY_KEY_ENV).then(|| "smithery-key".to_string()));

    let scholar = config
        .tool_provider("semantic_scholar")
        .expect("semantic_scholar configured");
    assert_eq!(scholar.launch.command, "uvx");

    // Defaults fill in what the file leaves out
    let fetch = config.tool_provider("fetch").expect("fetch configured");
    assert_eq!(fetch.launch.command, "npx");
    assert!(config.tool_provider("sequential_thinking").is_some());
}

#[test]
fn test_invalid_file_names_the_path() {
    let (_temp_dir, path) = write_config("default_provider = [");
    let error = Config::load_from(&path).expect_err("invalid toml");
    assert!(format!("{error:#}").contains("config.toml"), "{error:#}");
}

#[test]
fn test_common_params_override_config() {
    let (_temp_dir, path) = write_config(CONFIG);
    let mut config = Config::load_from(&path).expect("config loads");

    let params = CommonParams {
        provider: Some("google".to_string()),
        model: Some("gemini-2.5-pro".to_string()),
        deadline: Some(30),
    };
    let changed = params.apply_to_config(&mut config).expect("overrides apply");

    assert!(changed);
    assert_eq!(config.provider().ok(), Some(Provider::Gemini));
    assert_eq!(config.model_for(Provider::Gemini, "gemini-2.5-flash"), "gemini-2.5-pro");
    assert_eq!(config.session.deadline(), Duration::from_secs(30));
}

#[test]
fn test_unknown_provider_is_rejected() {
    let mut config = Config::default();
    let params = CommonParams {
        provider: Some("llama".to_string()),
        ..CommonParams::default()
    };
    assert!(params.apply_to_config(&mut config).is_err());
}
