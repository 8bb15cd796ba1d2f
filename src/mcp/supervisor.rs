//! Tool-provider lifecycle management
//!
//! A [`ToolServerSupervisor`] lives for one session. It launches providers,
//! performs the MCP handshake and lends out [`ToolProviderHandle`]s. It also
//! tears every handle down exactly once, whatever way the session ended.
//!
//! Per-handle states:
//!
//! ```text
//! NotStarted -> Starting -> Ready -> Stopping -> Stopped
//!                   \         \
//!                    +---------+--> Failed
//! ```

use super::transport::{ChannelError, Connector, MessageChannel, ShutdownOutcome};
use crate::{log_debug, log_warn};

use futures::future::join_all;
use parking_lot::Mutex;
use rmcp::model::{CallToolRequestParam, CallToolResult, JsonObject, Tool};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// How to start a provider process. Opaque to the orchestration layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LaunchDescriptor {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl LaunchDescriptor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolProviderSpec {
    pub name: String,
    pub launch: LaunchDescriptor,
}

impl ToolProviderSpec {
    pub fn new(name: impl Into<String>, launch: LaunchDescriptor) -> Self {
        Self {
            name: name.into(),
            launch,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum ProviderState {
    NotStarted,
    Starting,
    Ready,
    Stopping,
    Stopped,
    Failed,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("tool provider '{provider}' failed to launch: {reason}")]
    Launch { provider: String, reason: String },
    #[error("tool provider '{provider}' did not respond during {phase} within {timeout:?}")]
    Timeout {
        provider: String,
        phase: &'static str,
        timeout: Duration,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorSettings {
    /// Bound on spawn plus handshake plus tool listing
    pub startup_timeout: Duration,
    /// How long a provider gets to exit after its input is closed
    pub shutdown_grace: Duration,
    /// Bound on a single `tools/call`
    pub call_timeout: Duration,
}

impl Default for SupervisorSettings {
    fn default() -> Self {
        Self {
            startup_timeout: Duration::from_secs(60),
            shutdown_grace: Duration::from_secs(5),
            call_timeout: Duration::from_secs(120),
        }
    }
}

/// A running provider lent to a session
pub struct ToolProviderHandle {
    spec: ToolProviderSpec,
    state: Mutex<ProviderState>,
    channel: Mutex<Option<Arc<dyn MessageChannel>>>,
    tools: Mutex<Vec<Tool>>,
    call_timeout: Duration,
}

impl ToolProviderHandle {
    fn new(spec: ToolProviderSpec, call_timeout: Duration) -> Self {
        Self {
            spec,
            state: Mutex::new(ProviderState::NotStarted),
            channel: Mutex::new(None),
            tools: Mutex::new(Vec::new()),
            call_timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.spec.name
    }

    /// Current state. A `Ready` provider whose channel has died reads as `Failed`.
    pub fn state(&self) -> ProviderState {
        let mut state = self.state.lock();
        self.detect_exit(&mut state);
        *state
    }

    /// Tools advertised during the handshake
    pub fn tools(&self) -> Vec<Tool> {
        self.tools.lock().clone()
    }

    fn set_state(&self, next: ProviderState) {
        let mut state = self.state.lock();
        log_debug!("Tool provider '{}': {} -> {}", self.spec.name, *state, next);
        *state = next;
    }

    fn detect_exit(&self, state: &mut ProviderState) {
        if *state == ProviderState::Ready
            && !self
                .channel
                .lock()
                .as_ref()
                .is_some_and(|channel| channel.is_alive())
        {
            log_warn!("Tool provider '{}' exited unexpectedly", self.spec.name);
            *state = ProviderState::Failed;
        }
    }

    /// Invoke one tool on this provider
    pub async fn call_tool(
        &self,
        name: &str,
        arguments: JsonObject,
    ) -> Result<CallToolResult, ChannelError> {
        if self.state() != ProviderState::Ready {
            return Err(ChannelError::Closed);
        }
        let channel = self.channel.lock().clone().ok_or(ChannelError::Closed)?;

        let request = CallToolRequestParam {
            name: name.to_string().into(),
            arguments: Some(arguments),
        };
        let outcome = tokio::time::timeout(self.call_timeout, channel.call_tool(request))
            .await
            .unwrap_or_else(|_| {
                Err(ChannelError::Timeout {
                    method: format!("tools/call {name}"),
                    timeout: self.call_timeout,
                })
            });

        if outcome.is_err() {
            // Records the transition if the provider died underneath the call
            self.state();
        }
        outcome
    }

    /// Shut the channel down if this handle still owns it. Runs at most once.
    async fn teardown(&self, grace: Duration) -> Option<ShutdownOutcome> {
        let channel = self.channel.lock().take()?;
        let outcome = channel.shutdown(grace).await;
        log_debug!("Tool provider '{}' shut down: {outcome:?}", self.spec.name);
        Some(outcome)
    }
}

/// Owns the providers of one session scope
pub struct ToolServerSupervisor {
    connector: Arc<dyn Connector>,
    settings: SupervisorSettings,
    handles: Mutex<Vec<Arc<ToolProviderHandle>>>,
}

impl ToolServerSupervisor {
    pub fn new(connector: Arc<dyn Connector>, settings: SupervisorSettings) -> Self {
        Self {
            connector,
            settings,
            handles: Mutex::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> SupervisorSettings {
        self.settings
    }

    /// Launch and handshake a provider, reusing a ready one of the same name.
    ///
    /// On failure the partially started provider is torn down before the
    /// error is returned, and its handle stays `Failed`.
    pub async fn acquire(
        &self,
        spec: &ToolProviderSpec,
    ) -> Result<Arc<ToolProviderHandle>, ProviderError> {
        if let Some(existing) = self
            .handles
            .lock()
            .iter()
            .find(|h| h.name() == spec.name && h.state() == ProviderState::Ready)
        {
            return Ok(Arc::clone(existing));
        }

        let handle = Arc::new(ToolProviderHandle::new(
            spec.clone(),
            self.settings.call_timeout,
        ));
        self.handles.lock().push(Arc::clone(&handle));
        handle.set_state(ProviderState::Starting);

        let started =
            tokio::time::timeout(self.settings.startup_timeout, self.start(&handle)).await;
        let error = match started {
            Ok(Ok(())) => {
                handle.set_state(ProviderState::Ready);
                return Ok(handle);
            }
            Ok(Err(e)) => e,
            Err(_) => ProviderError::Timeout {
                provider: spec.name.clone(),
                phase: "startup",
                timeout: self.settings.startup_timeout,
            },
        };

        handle.set_state(ProviderState::Failed);
        handle.teardown(self.settings.shutdown_grace).await;
        Err(error)
    }

    async fn start(&self, handle: &ToolProviderHandle) -> Result<(), ProviderError> {
        let provider = handle.name().to_string();
        let launch_error = |reason: String| ProviderError::Launch {
            provider: provider.clone(),
            reason,
        };

        let channel = self
            .connector
            .connect(&handle.spec)
            .await
            .map_err(|e| launch_error(e.to_string()))?;
        *handle.channel.lock() = Some(Arc::clone(&channel));

        let tools = channel
            .list_tools()
            .await
            .map_err(|e| launch_error(format!("tools/list failed: {e}")))?;

        log_debug!("Tool provider '{provider}' offers {} tools", tools.len());
        *handle.tools.lock() = tools;
        Ok(())
    }

    /// Return a handle to the supervisor. Releasing twice is a no-op.
    pub async fn release(&self, handle: &ToolProviderHandle) {
        let stopping = {
            let mut state = handle.state.lock();
            handle.detect_exit(&mut state);
            match *state {
                ProviderState::Starting | ProviderState::Ready => {
                    *state = ProviderState::Stopping;
                    true
                }
                _ => false,
            }
        };

        handle.teardown(self.settings.shutdown_grace).await;

        if stopping {
            handle.set_state(ProviderState::Stopped);
        }
    }

    /// Release every handle this supervisor ever handed out, concurrently
    pub async fn release_all(&self) {
        let handles = self.handles.lock().clone();
        join_all(handles.iter().map(|handle| self.release(handle))).await;
    }

    /// Snapshot of every handle's state, in acquisition order
    pub fn states(&self) -> Vec<(String, ProviderState)> {
        self.handles
            .lock()
            .iter()
            .map(|h| (h.name().to_string(), h.state()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_descriptor_builder() {
        let launch = LaunchDescriptor::new("npx")
            .with_args(["-y", "@modelcontextprotocol/server-sequential-thinking"])
            .with_env("NODE_ENV", "production");

        assert_eq!(launch.command, "npx");
        assert_eq!(launch.args.len(), 2);
        assert_eq!(
            launch.env.get("NODE_ENV").map(String::as_str),
            Some("production")
        );
    }

    #[test]
    fn test_launch_descriptor_deserializes_with_defaults() {
        let launch: LaunchDescriptor =
            toml::from_str(r#"command = "uvx""#).expect("descriptor should parse");
        assert_eq!(launch.command, "uvx");
        assert!(launch.args.is_empty());
        assert!(launch.env.is_empty());
    }

    #[test]
    fn test_provider_state_display() {
        assert_eq!(ProviderState::NotStarted.to_string(), "NotStarted");
        assert_eq!(ProviderState::Failed.to_string(), "Failed");
    }
}
