//! Fakes shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use insight_agents::agents::backend::{
    BackendError, BackendReply, GenerationRequest, GenerationTurn, ModelBackend, ToolCallRequest,
};
use insight_agents::mcp::supervisor::{LaunchDescriptor, ToolProviderSpec};
use insight_agents::mcp::transport::{ChannelError, Connector, MessageChannel, ShutdownOutcome};
use parking_lot::Mutex;
use rmcp::model::{CallToolRequestParam, CallToolResult, Content, Tool, object};
use serde_json::{Value, json};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Backend that plays back a fixed sequence of replies
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Result<BackendReply, BackendError>>>,
    calls: AtomicUsize,
    transcripts: Mutex<Vec<Vec<GenerationTurn>>>,
}

impl ScriptedBackend {
    pub fn new(script: impl IntoIterator<Item = Result<BackendReply, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            calls: AtomicUsize::new(0),
            transcripts: Mutex::new(Vec::new()),
        })
    }

    /// Backend whose replies are all final answers
    pub fn answers(answers: &[&str]) -> Arc<Self> {
        Self::new(
            answers
                .iter()
                .map(|answer| Ok(BackendReply::Answer((*answer).to_string()))),
        )
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Transcript seen by each call, in call order
    pub fn transcripts(&self) -> Vec<Vec<GenerationTurn>> {
        self.transcripts.lock().clone()
    }
}

#[async_trait]
impl ModelBackend for ScriptedBackend {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<BackendReply, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.transcripts.lock().push(request.transcript.to_vec());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Protocol("script exhausted".to_string())))
    }
}

pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCallRequest {
    ToolCallRequest {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeMode {
    Healthy,
    /// `tools/list` returns an error payload
    HandshakeFailure,
    /// `tools/list` never answers
    HangingHandshake,
    /// `tools/call` never answers
    HangingCalls,
}

#[derive(Debug, Default)]
pub struct Counters {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
}

/// In-process tool providers; each offers one tool named after the provider
pub struct FakeConnector {
    mode: FakeMode,
    /// Providers that fail their handshake regardless of `mode`
    broken: HashSet<String>,
    pub counters: Arc<Counters>,
    channels: Mutex<Vec<Arc<FakeChannel>>>,
}

impl FakeConnector {
    pub fn new(mode: FakeMode) -> Arc<Self> {
        Self::with_broken(mode, &[])
    }

    pub fn with_broken(mode: FakeMode, broken: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            mode,
            broken: broken.iter().map(|name| (*name).to_string()).collect(),
            counters: Arc::new(Counters::default()),
            channels: Mutex::new(Vec::new()),
        })
    }

    pub fn starts(&self) -> usize {
        self.counters.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.counters.stops.load(Ordering::SeqCst)
    }

    /// Make every live channel of `provider` die as if its process had exited
    pub fn crash(&self, provider: &str) {
        for channel in self.channels.lock().iter() {
            if channel.provider == provider {
                channel.alive.store(false, Ordering::SeqCst);
            }
        }
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(
        &self,
        spec: &ToolProviderSpec,
    ) -> Result<Arc<dyn MessageChannel>, ChannelError> {
        self.counters.starts.fetch_add(1, Ordering::SeqCst);
        let mode = if self.broken.contains(&spec.name) {
            FakeMode::HandshakeFailure
        } else {
            self.mode
        };
        let channel = Arc::new(FakeChannel {
            provider: spec.name.clone(),
            mode,
            alive: AtomicBool::new(true),
            closed: AtomicBool::new(false),
            counters: Arc::clone(&self.counters),
        });
        self.channels.lock().push(Arc::clone(&channel));
        Ok(channel)
    }
}

pub struct FakeChannel {
    provider: String,
    mode: FakeMode,
    /// Cleared by [`FakeConnector::crash`]
    alive: AtomicBool,
    closed: AtomicBool,
    counters: Arc<Counters>,
}

impl FakeChannel {
    fn check_open(&self) -> Result<(), ChannelError> {
        if self.is_alive() {
            Ok(())
        } else {
            Err(ChannelError::Closed)
        }
    }
}

#[async_trait]
impl MessageChannel for FakeChannel {
    async fn list_tools(&self) -> Result<Vec<Tool>, ChannelError> {
        self.check_open()?;
        match self.mode {
            FakeMode::HandshakeFailure => Err(ChannelError::Remote(rmcp::Error::internal_error(
                "handshake refused",
                None,
            ))),
            FakeMode::HangingHandshake => std::future::pending().await,
            _ => Ok(vec![Tool::new(
                self.provider.clone(),
                format!("{} lookup", self.provider),
                object(json!({"type": "object", "properties": {"query": {"type": "string"}}})),
            )]),
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, ChannelError> {
        self.check_open()?;
        if self.mode == FakeMode::HangingCalls {
            return std::future::pending().await;
        }
        let arguments = Value::Object(request.arguments.unwrap_or_default());
        Ok(CallToolResult::success(vec![Content::text(format!(
            "{} answered {arguments}",
            self.provider
        ))]))
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst) && !self.closed.load(Ordering::SeqCst)
    }

    async fn shutdown(&self, _grace: Duration) -> ShutdownOutcome {
        if self.closed.swap(true, Ordering::SeqCst) {
            return ShutdownOutcome::AlreadyClosed;
        }
        self.counters.stops.fetch_add(1, Ordering::SeqCst);
        ShutdownOutcome::Graceful
    }
}

pub fn fake_spec(name: &str) -> ToolProviderSpec {
    ToolProviderSpec::new(name, LaunchDescriptor::new("fake-provider"))
}
