//! MCP tools module for insight-agents
//!
//! Every [`AgentKind`] is exposed as one MCP tool whose input schema is
//! generated from the agent's input type.

use crate::agents::setup::AgentSetupService;
use crate::agents::specialized::{AgentKind, ToolInput};
use crate::log_debug;
use crate::mcp::resources;
use crate::types::{render, render_failure};

use rmcp::Error;
use rmcp::RoleServer;
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListResourcesResult,
    ListToolsResult, PaginatedRequestParam, ProtocolVersion, ReadResourceRequestParam,
    ReadResourceResult, ServerCapabilities, Tool, object,
};
use rmcp::service::RequestContext;
use rmcp::{ServerHandler, model::ServerInfo};

use serde_json::Value;
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use tokio_util::task::TaskTracker;

/// Definitions for every agent tool, in a stable order
pub fn tool_definitions() -> Vec<Tool> {
    AgentKind::iter()
        .map(|kind| {
            Tool::new(
                kind.name(),
                kind.profile().description,
                object(kind.input_schema()),
            )
        })
        .collect()
}

/// Decode a `tools/call` request into a typed agent input
pub fn parse_call(request: CallToolRequestParam) -> Result<ToolInput, Error> {
    let kind = AgentKind::from_str(&request.name).map_err(|_| {
        Error::invalid_params(format!("Unknown tool: {}", request.name), None)
    })?;
    let arguments = Value::Object(request.arguments.unwrap_or_default());
    ToolInput::from_arguments(kind, arguments)
        .map_err(|e| Error::invalid_params(format!("Invalid arguments for {kind}: {e}"), None))
}

/// The handler behind the MCP server, shared by all in-flight calls
#[derive(Clone)]
pub struct InsightAgentsHandler {
    service: Arc<AgentSetupService>,
    calls: TaskTracker,
}

impl InsightAgentsHandler {
    pub fn new(service: AgentSetupService) -> Self {
        Self {
            service: Arc::new(service),
            calls: TaskTracker::new(),
        }
    }

    pub fn instructions() -> &'static str {
        "insight-agents runs research agents that reason with external MCP tools and return \
         structured markdown reports: innovation breakthroughs, literature-backed research, \
         cross-domain synthesis, insight maps, strategic briefs and trend analyses."
    }

    /// Run one agent tool. Agent failures come back as error results.
    pub async fn run_tool(
        &self,
        input: ToolInput,
        context: RequestContext<RoleServer>,
    ) -> CallToolResult {
        log_debug!("Running tool {} (request {:?})", input.kind(), context.id);
        match self
            .service
            .execute_with_cancellation(&input, context.ct)
            .await
        {
            Ok(result) => CallToolResult::success(vec![Content::text(render(
                &result,
                &input.layout(),
            ))]),
            Err(failure) => {
                let label = input.kind().profile().failure_label;
                CallToolResult::error(vec![Content::text(render_failure(label, &failure))])
            }
        }
    }

    /// Wait for every tool call still running, including provider release
    pub async fn finish(&self) {
        self.calls.close();
        if !self.calls.is_empty() {
            log_debug!("Waiting for {} tool calls to finish", self.calls.len());
        }
        self.calls.wait().await;
    }
}

impl ServerHandler for InsightAgentsHandler {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder()
                .enable_resources()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(Self::instructions().to_string()),
        }
    }

    async fn list_tools(
        &self,
        _: PaginatedRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, Error> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: tool_definitions(),
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, Error> {
        let input = parse_call(request)?;
        Ok(self.calls.track_future(self.run_tool(input, context)).await)
    }

    async fn list_resources(
        &self,
        _: PaginatedRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, Error> {
        Ok(ListResourcesResult {
            next_cursor: None,
            resources: resources::list_resources(),
        })
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, Error> {
        let contents = resources::read_resource(&request.uri).ok_or_else(|| {
            Error::resource_not_found(format!("Unknown resource: {}", request.uri), None)
        })?;
        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    fn call(name: &str, arguments: Value) -> CallToolRequestParam {
        CallToolRequestParam {
            name: name.to_string().into(),
            arguments: Some(object(arguments)),
        }
    }

    #[test]
    fn test_definitions_cover_every_agent() {
        let tools = tool_definitions();
        assert_eq!(tools.len(), 6);
        assert_eq!(tools[0].name, "breakthrough_innovation_roadblock");
        let synthesis = tools
            .iter()
            .find(|tool| tool.name == "synthesize_knowledge_domains")
            .expect("synthesis tool listed");
        let required = synthesis.input_schema["required"]
            .as_array()
            .expect("required list");
        assert!(required.contains(&json!("domains")));
        assert!(!required.contains(&json!("depth")));
    }

    #[test]
    fn test_parse_call_errors_are_invalid_params() {
        let unknown = parse_call(call("nope", json!({}))).expect_err("unknown tool");
        assert_eq!(unknown.code, ErrorCode::INVALID_PARAMS);

        let bad_args = parse_call(call("track_emerging_trends", json!({"domain": "AI"})))
            .expect_err("missing fields");
        assert_eq!(bad_args.code, ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn test_parse_call_builds_input() {
        let input = parse_call(call(
            "research_innovation_idea",
            json!({"innovation_idea": "agents that repair their own tools"}),
        ))
        .expect("valid call");
        assert_eq!(input.kind(), AgentKind::ResearchInnovationIdea);
    }
}
