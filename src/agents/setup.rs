//! Agent setup service
//!
//! Turns configuration into a ready-to-run [`AgentSession`] for one tool
//! invocation: model backend, tool providers, timing and schema. Nothing is
//! cached between invocations.

use anyhow::Result;
use rig::client::CompletionClient;
use rig::providers::{gemini, openai};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::backend::{BackendError, ModelBackend, RigBackend};
use super::failure::Failure;
use super::schema::StructuredResult;
use super::session::{AgentConfiguration, AgentSession};
use super::specialized::{AgentProfile, ToolInput};
use crate::common::CommonParams;
use crate::config::Config;
use crate::mcp::supervisor::ToolProviderSpec;
use crate::mcp::transport::{Connector, StdioConnector};
use crate::providers::Provider;
use crate::types::{render, render_failure};
use crate::{log_debug, log_warn};

/// Service for setting up agents with proper configuration
pub struct AgentSetupService {
    config: Config,
    backend: Option<Arc<dyn ModelBackend>>,
    connector: Arc<dyn Connector>,
    cancel: CancellationToken,
}

impl AgentSetupService {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            backend: None,
            connector: Arc::new(StdioConnector),
            cancel: CancellationToken::new(),
        }
    }

    /// Load the user configuration and apply per-invocation overrides
    pub fn from_common_params(common_params: &CommonParams) -> Result<Self> {
        let mut config = Config::load()?;
        common_params.apply_to_config(&mut config)?;
        Ok(Self::new(config))
    }

    /// Use a fixed backend instead of building one from the provider config
    #[must_use]
    pub fn with_backend(mut self, backend: Arc<dyn ModelBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    /// Cancel every session started by this service when `token` fires
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the model backend for `model` from the configured provider
    pub fn create_backend(&self, model: &str) -> Result<Arc<dyn ModelBackend>, BackendError> {
        if let Some(backend) = &self.backend {
            return Ok(Arc::clone(backend));
        }

        let provider = self
            .config
            .provider()
            .map_err(|e| BackendError::Authentication(e.to_string()))?;
        let api_key = self
            .config
            .api_key(provider)
            .map_err(|e| BackendError::Authentication(e.to_string()))?;

        log_debug!("Creating {provider} backend for model {model}");
        let backend: Arc<dyn ModelBackend> = match provider {
            Provider::Gemini => {
                let client = gemini::Client::new(&api_key);
                Arc::new(RigBackend::new(client.completion_model(model)))
            }
            Provider::OpenAI => {
                let client = openai::Client::new(&api_key);
                Arc::new(RigBackend::new(client.completion_model(model)))
            }
        };
        Ok(backend)
    }

    /// Specs for the profile's tool providers; unconfigured ones are skipped
    pub fn resolve_providers(&self, profile: &AgentProfile) -> Vec<ToolProviderSpec> {
        profile
            .providers
            .iter()
            .filter_map(|name| {
                let spec = self.config.tool_provider(name);
                if spec.is_none() {
                    log_warn!(
                        "Tool provider '{name}' is not configured; {} runs without it",
                        profile.kind
                    );
                }
                spec
            })
            .collect()
    }

    /// Model the profile runs with under the current configuration
    pub fn model_for(&self, profile: &AgentProfile) -> String {
        let provider = self.config.provider().unwrap_or_default();
        self.config.model_for(provider, profile.default_model)
    }

    /// A fresh session for one run of `profile`
    pub fn create_session(&self, profile: &AgentProfile) -> Result<AgentSession, Failure> {
        let model = self.model_for(profile);
        let backend = self.create_backend(&model)?;

        let config = AgentConfiguration::builder(model, Arc::clone(&profile.contract))
            .system_prompt(profile.system_prompt)
            .providers(self.resolve_providers(profile))
            .build();

        Ok(AgentSession::new(config, backend)
            .with_connector(Arc::clone(&self.connector))
            .with_settings(self.config.session.supervisor_settings())
            .with_deadline(self.config.session.deadline())
            .with_cancellation(self.cancel.child_token()))
    }

    /// Run the agent for `input` and return its validated result
    pub async fn execute(&self, input: &ToolInput) -> Result<StructuredResult, Failure> {
        self.execute_with_cancellation(input, self.cancel.child_token())
            .await
    }

    /// Like [`Self::execute`], but cancelled through `cancel`
    pub async fn execute_with_cancellation(
        &self,
        input: &ToolInput,
        cancel: CancellationToken,
    ) -> Result<StructuredResult, Failure> {
        let profile = input.kind().profile();
        let session = self.create_session(&profile)?.with_cancellation(cancel);
        session.run(&input.task_prompt()).await
    }

    /// Run the agent for `input` and render the outcome as text.
    ///
    /// Failures are rendered inline, so this never errors.
    pub async fn run_tool(&self, input: &ToolInput) -> String {
        match self.execute(input).await {
            Ok(result) => render(&result, &input.layout()),
            Err(failure) => {
                let label = input.kind().profile().failure_label;
                log_warn!("{label} failed ({}): {failure}", failure.kind());
                render_failure(label, &failure)
            }
        }
    }
}
