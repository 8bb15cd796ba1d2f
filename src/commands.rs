use crate::agents::setup::AgentSetupService;
use crate::agents::specialized::{AgentKind, ToolInput};
use crate::common::CommonParams;
use crate::config::Config;
use crate::{log_debug, log_info};
use crate::mcp::config::MCPServerConfig;
use crate::ui;

use anyhow::Result;
use colored::Colorize;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

/// Run one agent from the command line and print its report.
///
/// Agent failures are printed in place of the report, like the MCP surface
/// does; only setup problems (unreadable config) are returned as errors.
pub async fn handle_agent_command(common: &CommonParams, input: ToolInput) -> Result<()> {
    let kind = input.kind();
    log_debug!("Handling '{kind}' with {:?}", common);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ui::print_info("Cancelling, shutting down tool providers...");
            on_interrupt.cancel();
        }
    });

    let service = AgentSetupService::from_common_params(common)?.with_cancellation(cancel);
    let profile = kind.profile();
    let skipped: Vec<&str> = profile
        .providers
        .iter()
        .copied()
        .filter(|name| service.config().tool_provider(name).is_none())
        .collect();
    if !skipped.is_empty() {
        ui::print_warning(&format!(
            "Running without unconfigured tool providers: {}",
            skipped.join(", ")
        ));
    }

    let model = service.model_for(&profile);
    log_info!("Running {kind} with {model}");
    let spinner = ui::create_spinner(&format!("{kind} is thinking with {model}..."));
    let report = service.run_tool(&input).await;
    spinner.finish_and_clear();

    ui::print_report(&report);
    Ok(())
}

/// List every agent tool with its providers and default model
pub fn handle_tools_command() -> Result<()> {
    let config = Config::load()?;
    for kind in AgentKind::iter() {
        let profile = kind.profile();
        println!("{}", ui::create_gradient_text(kind.name()).bold());
        println!("  {}", ui::dim(profile.description));
        println!("  {} {}", "model:".cyan(), profile.default_model);

        let providers = profile
            .providers
            .iter()
            .map(|name| {
                if config.tool_provider(name).is_some() {
                    name.green().to_string()
                } else {
                    format!("{} (not configured)", name.yellow())
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {} {}", "tools:".cyan(), providers);
        println!();
    }
    Ok(())
}

/// Serve the agents as MCP tools over stdio
pub async fn handle_serve_command(dev: bool, log_file: Option<String>) -> Result<()> {
    let mut config = MCPServerConfig::default();
    if dev {
        config = config.with_dev_mode();
    }
    if let Some(path) = log_file {
        config = config.with_log_file(path);
    }
    crate::mcp::serve(config).await
}
