//! Message channels to tool providers
//!
//! A [`MessageChannel`] is a live MCP client session with one provider. The
//! supervisor only sees this trait, so providers may live in a subprocess,
//! in-process or behind a network hop. [`StdioChannel`] is the subprocess
//! flavour: an rmcp client over the child's stdin/stdout.

use super::supervisor::ToolProviderSpec;
use crate::{log_debug, log_warn};

use async_trait::async_trait;
use parking_lot::Mutex;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, ClientCapabilities, ClientInfo, Implementation,
    ProtocolVersion, RawContent, Tool,
};
use rmcp::service::{Peer, RoleClient, ServiceError};
use rmcp::ServiceExt;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("handshake failed: {0}")]
    Handshake(String),
    #[error("channel closed")]
    Closed,
    #[error("`{method}` timed out after {timeout:?}")]
    Timeout { method: String, timeout: Duration },
    #[error("provider returned an error: {0}")]
    Remote(rmcp::Error),
    #[error("unexpected reply: {0}")]
    Unexpected(String),
}

impl From<ServiceError> for ChannelError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::McpError(e) => Self::Remote(e),
            // The service loop is gone, or dropped the request with it
            ServiceError::Transport(_) | ServiceError::Cancelled { .. } => Self::Closed,
            ServiceError::Timeout { timeout } => Self::Timeout {
                method: "request".to_string(),
                timeout,
            },
            other => Self::Unexpected(other.to_string()),
        }
    }
}

/// How a channel ended up closed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The peer exited on its own within the grace period
    Graceful,
    /// The grace period ran out and the peer was force-terminated
    Killed,
    /// Shutdown had already happened
    AlreadyClosed,
}

#[async_trait]
pub trait MessageChannel: Send + Sync {
    /// Every tool the provider offers, following pagination to the end
    async fn list_tools(&self) -> Result<Vec<Tool>, ChannelError>;

    /// Dropping the returned future abandons the call; a late reply is discarded.
    async fn call_tool(&self, request: CallToolRequestParam)
    -> Result<CallToolResult, ChannelError>;

    /// False once the provider has gone away, whether or not anyone noticed
    fn is_alive(&self) -> bool;

    /// Close the channel, waiting up to `grace` before forcing it.
    /// Calling this more than once returns [`ShutdownOutcome::AlreadyClosed`].
    async fn shutdown(&self, grace: Duration) -> ShutdownOutcome;
}

/// Opens channels for provider specs. A returned channel has completed the
/// `initialize` exchange.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, spec: &ToolProviderSpec)
    -> Result<Arc<dyn MessageChannel>, ChannelError>;
}

/// Launches each provider as a child process
#[derive(Debug, Default, Clone, Copy)]
pub struct StdioConnector;

#[async_trait]
impl Connector for StdioConnector {
    async fn connect(
        &self,
        spec: &ToolProviderSpec,
    ) -> Result<Arc<dyn MessageChannel>, ChannelError> {
        let channel = StdioChannel::spawn(spec).await?;
        Ok(Arc::new(channel))
    }
}

/// What we announce to providers during `initialize`
fn client_info() -> ClientInfo {
    ClientInfo {
        protocol_version: ProtocolVersion::LATEST,
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    }
}

/// All text blocks of a tool result joined by newlines; other blocks are skipped
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .filter_map(|content| match &content.raw {
            RawContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct StdioChannel {
    provider: String,
    peer: Peer<RoleClient>,
    /// Stops the client service loop, which closes the child's stdin
    service: CancellationToken,
    /// Cancelled once the service loop has ended for any reason
    closed: CancellationToken,
    child: Mutex<Option<Child>>,
}

impl StdioChannel {
    /// Spawn the provider and run the `initialize` exchange with it
    pub async fn spawn(spec: &ToolProviderSpec) -> Result<Self, ChannelError> {
        let launch = &spec.launch;
        let mut cmd = Command::new(&launch.command);
        cmd.args(&launch.args)
            .envs(&launch.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| ChannelError::Spawn {
            command: launch.command.clone(),
            source,
        })?;
        log_debug!(
            "Spawned tool provider '{}' ({} {}), pid {:?}",
            spec.name,
            launch.command,
            launch.args.join(" "),
            child.id()
        );

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(ChannelError::Handshake("child stdio unavailable".to_string()));
        };
        if let Some(stderr) = child.stderr.take() {
            let provider = spec.name.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    log_debug!("[{provider} stderr] {line}");
                }
            });
        }

        // On failure `child` is dropped here and killed with it
        let service = CancellationToken::new();
        let running = client_info()
            .serve_with_ct((stdout, stdin), service.clone())
            .await
            .map_err(|e: std::io::Error| ChannelError::Handshake(e.to_string()))?;

        let server = running.peer().peer_info();
        log_debug!(
            "Tool provider '{}' is {} {} (protocol {:?})",
            spec.name,
            server.server_info.name,
            server.server_info.version,
            server.protocol_version
        );

        let peer = running.peer().clone();
        let closed = CancellationToken::new();
        let watcher = closed.clone();
        let provider = spec.name.clone();
        tokio::spawn(async move {
            match running.waiting().await {
                Ok(reason) => log_debug!("Tool provider '{provider}' session ended: {reason:?}"),
                Err(e) => log_warn!("Tool provider '{provider}' session task failed: {e}"),
            }
            watcher.cancel();
        });

        Ok(Self {
            provider: spec.name.clone(),
            peer,
            service,
            closed,
            child: Mutex::new(Some(child)),
        })
    }
}

#[async_trait]
impl MessageChannel for StdioChannel {
    async fn list_tools(&self) -> Result<Vec<Tool>, ChannelError> {
        if !self.is_alive() {
            return Err(ChannelError::Closed);
        }
        Ok(self.peer.list_all_tools().await?)
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ChannelError> {
        if !self.is_alive() {
            return Err(ChannelError::Closed);
        }
        Ok(self.peer.call_tool(request).await?)
    }

    fn is_alive(&self) -> bool {
        !self.closed.is_cancelled()
    }

    async fn shutdown(&self, grace: Duration) -> ShutdownOutcome {
        self.service.cancel();
        let Some(mut child) = self.child.lock().take() else {
            return ShutdownOutcome::AlreadyClosed;
        };

        let outcome = match tokio::time::timeout(grace, child.wait()).await {
            Ok(Ok(status)) => {
                log_debug!("Tool provider '{}' exited with {status}", self.provider);
                ShutdownOutcome::Graceful
            }
            Ok(Err(e)) => {
                log_warn!("Waiting on tool provider '{}' failed: {e}", self.provider);
                kill(&self.provider, &mut child).await;
                ShutdownOutcome::Killed
            }
            Err(_) => {
                log_warn!(
                    "Tool provider '{}' did not exit within {grace:?}, killing it",
                    self.provider
                );
                kill(&self.provider, &mut child).await;
                ShutdownOutcome::Killed
            }
        };

        // The service loop was cancelled above and only needs to unwind
        if tokio::time::timeout(grace, self.closed.cancelled()).await.is_err() {
            log_warn!("Client loop for '{}' is still running", self.provider);
        }
        outcome
    }
}

async fn kill(provider: &str, child: &mut Child) {
    if let Err(e) = child.kill().await {
        log_warn!("Failed to kill tool provider '{provider}': {e}");
    }
}
