use crate::config::Config;
use crate::providers::Provider;
use anyhow::Result;
use clap::Args;

#[derive(Args, Clone, Default, Debug)]
pub struct CommonParams {
    /// Override default model provider
    #[arg(long, help = "Override default model provider", value_parser = available_providers_parser)]
    pub provider: Option<String>,

    /// Model to use for this run, regardless of the agent's default
    #[arg(short, long, help = "Model to use for this run")]
    pub model: Option<String>,

    /// Session deadline in seconds
    #[arg(long, help = "Abort the session after this many seconds")]
    pub deadline: Option<u64>,
}

impl CommonParams {
    pub fn apply_to_config(&self, config: &mut Config) -> Result<bool> {
        let mut changes_made = false;

        if let Some(provider_str) = &self.provider {
            let provider: Provider = provider_str.parse()?;
            let provider_name = provider.name().to_string();
            if config.default_provider != provider_name {
                config.default_provider = provider_name;
                changes_made = true;
            }
        }

        if let Some(model) = &self.model {
            config.temp_model = Some(model.clone());
            changes_made = true;
        }

        if let Some(deadline) = self.deadline
            && config.session.deadline_seconds != deadline
        {
            config.session.deadline_seconds = deadline;
            changes_made = true;
        }

        Ok(changes_made)
    }
}

/// Validates that a provider name is available in the system
pub fn available_providers_parser(s: &str) -> Result<String, String> {
    match s.parse::<Provider>() {
        Ok(provider) => Ok(provider.name().to_string()),
        Err(_) => Err(format!(
            "Invalid provider '{}'. Available providers: {}",
            s,
            Provider::all_names().join(", ")
        )),
    }
}
