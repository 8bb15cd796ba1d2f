//! MCP server implementation for insight-agents
//!
//! The agents are served over stdin/stdout. Tool calls run concurrently and
//! are matched to their requests by id on the client side.

use crate::agents::setup::AgentSetupService;
use crate::config::Config;
use crate::log_debug;
use crate::mcp::config::MCPServerConfig;
use crate::mcp::tools::InsightAgentsHandler;

use anyhow::Result;
use rmcp::RoleServer;
use rmcp::ServiceExt;
use rmcp::transport::IntoTransport;
use tokio::io::{stdin, stdout};
use tokio_util::sync::CancellationToken;

/// Serve the MCP server on stdin/stdout
pub async fn serve(config: MCPServerConfig) -> Result<()> {
    if let Some(log_path) = config.log_path() {
        // stdout carries the protocol, so a broken log file is simply skipped
        if crate::logger::set_log_file(&log_path).is_ok() {
            crate::logger::enable_logging();
        }
    }

    log_debug!("Starting MCP server with config: {:?}", config);

    let app_config = Config::load()?;
    log_debug!("Loaded insight-agents configuration");

    let handler = InsightAgentsHandler::new(AgentSetupService::new(app_config));
    serve_transport(handler, (stdin(), stdout())).await
}

/// Run the server over any transport until the client goes away.
///
/// Tool calls still in flight at that point are cancelled. Their providers
/// are released before this returns.
pub async fn serve_transport<T, E, A>(handler: InsightAgentsHandler, transport: T) -> Result<()>
where
    T: IntoTransport<RoleServer, E, A>,
    E: std::error::Error + From<std::io::Error> + Send + Sync + 'static,
{
    let ct = CancellationToken::new();
    let server = handler.clone().serve_with_ct(transport, ct.clone()).await?;

    log_debug!("MCP server initialized, waiting for completion");
    let quit_reason = server.waiting().await?;
    log_debug!("MCP server finished: {:?}", quit_reason);

    ct.cancel();
    handler.finish().await;
    Ok(())
}
