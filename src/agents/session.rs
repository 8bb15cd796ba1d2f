//! Schema-constrained generation sessions
//!
//! An [`AgentSession`] runs one task prompt to completion:
//!
//! 1. acquire every configured tool provider (concurrently),
//! 2. alternate between the model backend and tool dispatch,
//! 3. validate the final answer, allowing exactly one corrective retry,
//! 4. release every provider, on every exit path.
//!
//! The whole run is bounded by a deadline and can be cancelled through a
//! [`CancellationToken`]. Provider release happens in a spawned task so that
//! neither the deadline nor a dropped caller can interrupt it.

use futures::future::{join_all, try_join_all};
use rmcp::model::{JsonObject, Tool};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use super::backend::{
    BackendError, BackendReply, GenerationRequest, GenerationTurn, ModelBackend, ToolCallOutcome,
    ToolCallRequest,
};
use super::failure::Failure;
use super::output_validator::validate_answer;
use super::schema::{SchemaContract, StructuredResult};
use crate::mcp::supervisor::{
    SupervisorSettings, ToolProviderHandle, ToolProviderSpec, ToolServerSupervisor,
};
use crate::mcp::transport::{Connector, StdioConnector, result_text};
use crate::{log_debug, log_warn};

/// Default bound on a whole session
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(600);

/// Everything that defines an agent for one invocation
#[derive(Debug, Clone)]
pub struct AgentConfiguration {
    model: String,
    system_prompt: String,
    providers: Vec<ToolProviderSpec>,
    contract: Arc<SchemaContract>,
}

impl AgentConfiguration {
    pub fn builder(
        model: impl Into<String>,
        contract: Arc<SchemaContract>,
    ) -> AgentConfigurationBuilder {
        AgentConfigurationBuilder {
            config: Self {
                model: model.into(),
                system_prompt: String::new(),
                providers: Vec::new(),
                contract,
            },
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn providers(&self) -> &[ToolProviderSpec] {
        &self.providers
    }

    pub fn contract(&self) -> &Arc<SchemaContract> {
        &self.contract
    }
}

pub struct AgentConfigurationBuilder {
    config: AgentConfiguration,
}

impl AgentConfigurationBuilder {
    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn provider(mut self, spec: ToolProviderSpec) -> Self {
        self.config.providers.push(spec);
        self
    }

    #[must_use]
    pub fn providers(mut self, specs: impl IntoIterator<Item = ToolProviderSpec>) -> Self {
        self.config.providers.extend(specs);
        self
    }

    pub fn build(self) -> AgentConfiguration {
        self.config
    }
}

pub struct AgentSession {
    config: AgentConfiguration,
    backend: Arc<dyn ModelBackend>,
    connector: Arc<dyn Connector>,
    settings: SupervisorSettings,
    deadline: Duration,
    cancel: CancellationToken,
}

impl AgentSession {
    pub fn new(config: AgentConfiguration, backend: Arc<dyn ModelBackend>) -> Self {
        Self {
            config,
            backend,
            connector: Arc::new(StdioConnector),
            settings: SupervisorSettings::default(),
            deadline: DEFAULT_DEADLINE,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SupervisorSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that cancels this session when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &AgentConfiguration {
        &self.config
    }

    /// Run a task prompt with a fresh supervisor scope
    pub async fn run(&self, task_prompt: &str) -> Result<StructuredResult, Failure> {
        let supervisor = Arc::new(ToolServerSupervisor::new(
            Arc::clone(&self.connector),
            self.settings,
        ));
        self.run_with_supervisor(&supervisor, task_prompt).await
    }

    /// Run a task prompt inside a caller-provided supervisor scope.
    ///
    /// Every handle the supervisor holds is released before this returns.
    pub async fn run_with_supervisor(
        &self,
        supervisor: &Arc<ToolServerSupervisor>,
        task_prompt: &str,
    ) -> Result<StructuredResult, Failure> {
        let span = tracing::info_span!(
            "session",
            contract = self.config.contract.name(),
            model = %self.config.model,
            providers = self.config.providers.len()
        );

        async {
            let mut release = ReleaseOnDrop(Some(Arc::clone(supervisor)));

            let outcome = tokio::select! {
                biased;
                () = self.cancel.cancelled() => Err(Failure::Cancelled),
                driven = tokio::time::timeout(self.deadline, self.drive(supervisor, task_prompt)) => {
                    driven.unwrap_or(Err(Failure::DeadlineExceeded(self.deadline)))
                }
            };

            if let Some(supervisor) = release.0.take() {
                let released = tokio::spawn(async move { supervisor.release_all().await }).await;
                if let Err(e) = released {
                    log_warn!("Releasing tool providers panicked: {e}");
                }
            }

            match &outcome {
                Ok(_) => log_debug!("Session for {} succeeded", self.config.contract.name()),
                Err(failure) => log_debug!(
                    "Session for {} failed ({}): {failure}",
                    self.config.contract.name(),
                    failure.kind()
                ),
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        supervisor: &ToolServerSupervisor,
        task_prompt: &str,
    ) -> Result<StructuredResult, Failure> {
        let handles = try_join_all(
            self.config
                .providers
                .iter()
                .map(|spec| supervisor.acquire(spec)),
        )
        .await?;
        let (tools, routes) = route_tools(&handles);

        let contract = &self.config.contract;
        let mut transcript: Vec<GenerationTurn> = Vec::new();
        let mut corrected = false;
        let mut turn = 0u32;

        loop {
            turn += 1;
            let request = GenerationRequest {
                model: &self.config.model,
                system_prompt: &self.config.system_prompt,
                task_prompt,
                tools: &tools,
                schema: contract,
                transcript: &transcript,
            };
            let reply = self
                .backend
                .generate(request)
                .instrument(tracing::info_span!("turn", turn))
                .await?;

            match reply {
                BackendReply::ToolCalls(calls) => {
                    if calls.is_empty() {
                        return Err(BackendError::Protocol(
                            "backend requested an empty set of tool calls".to_string(),
                        )
                        .into());
                    }
                    log_debug!("Turn {turn}: dispatching {} tool calls", calls.len());
                    let results = dispatch(&routes, &calls).await;
                    transcript.push(GenerationTurn::ToolRound { calls, results });
                }
                BackendReply::Answer(candidate) => match validate_answer(contract, &candidate) {
                    Ok(result) => return Ok(result),
                    Err(violations) if !corrected => {
                        log_debug!("Turn {turn}: answer rejected, asking once more: {violations}");
                        corrected = true;
                        transcript.push(GenerationTurn::AnswerAttempt {
                            candidate,
                            rejection: violations.to_string(),
                        });
                    }
                    Err(violations) => return Err(Failure::SchemaValidation(violations)),
                },
            }
        }
    }
}

/// Releases the supervisor's handles if a session future is dropped midway
struct ReleaseOnDrop(Option<Arc<ToolServerSupervisor>>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        let Some(supervisor) = self.0.take() else {
            return;
        };
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move { supervisor.release_all().await });
        }
    }
}

type Routes = HashMap<String, Arc<ToolProviderHandle>>;

/// Tool declarations offered to the model and the provider serving each.
/// On a name clash the provider listed first keeps the tool.
fn route_tools(handles: &[Arc<ToolProviderHandle>]) -> (Vec<Tool>, Routes) {
    let mut tools = Vec::new();
    let mut routes = Routes::new();

    for handle in handles {
        for tool in handle.tools() {
            if let Some(owner) = routes.get(tool.name.as_ref()) {
                log_warn!(
                    "Tool '{}' from '{}' shadowed by '{}'",
                    tool.name,
                    handle.name(),
                    owner.name()
                );
                continue;
            }
            routes.insert(tool.name.to_string(), Arc::clone(handle));
            tools.push(tool);
        }
    }
    (tools, routes)
}

/// Run one turn's tool calls concurrently; results come back in call order
async fn dispatch(routes: &Routes, calls: &[ToolCallRequest]) -> Vec<ToolCallOutcome> {
    join_all(calls.iter().map(|call| async move {
        let outcome = |content: String, is_error: bool| ToolCallOutcome {
            id: call.id.clone(),
            name: call.name.clone(),
            content,
            is_error,
        };

        let Some(handle) = routes.get(&call.name) else {
            return outcome(format!("unknown tool `{}`", call.name), true);
        };
        let arguments = match &call.arguments {
            Value::Null => JsonObject::new(),
            Value::Object(map) => map.clone(),
            other => {
                return outcome(
                    format!("arguments for `{}` must be a JSON object, got {other}", call.name),
                    true,
                );
            }
        };

        let span = tracing::info_span!("tool_call", tool = %call.name, provider = handle.name());
        match handle.call_tool(&call.name, arguments).instrument(span).await {
            Ok(result) => outcome(result_text(&result), result.is_error.unwrap_or(false)),
            Err(e) => {
                log_warn!("Tool call {} on '{}' failed: {e}", call.name, handle.name());
                outcome(format!("tool call failed: {e}"), true)
            }
        }
    }))
    .await
}
