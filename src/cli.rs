use crate::agents::specialized::{
    BreakthroughInput, InsightMapInput, ResearchInput, StrategicBriefInput, SynthesisInput,
    ToolInput, TrendInput,
};
use crate::commands;
use crate::common::CommonParams;
use crate::log_debug;
use crate::providers::Provider;
use crate::ui;
use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand, crate_version};
use colored::Colorize;

const LOG_FILE: &str = "insight-agents-debug.log";

/// CLI structure defining the available commands and global arguments
#[derive(Parser)]
#[command(
    author,
    version = crate_version!(),
    about = "Insight Agents: schema-constrained research agents",
    long_about = "Insight Agents runs research agents that reason with external MCP tools and return structured markdown reports.",
    disable_version_flag = true,
    after_help = get_dynamic_help(),
    styles = get_styles(),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log debug messages to a file
    #[arg(
        short = 'l',
        long = "log",
        global = true,
        help = "Log debug messages to a file"
    )]
    pub log: bool,

    /// Specify a custom log file path
    #[arg(
        long = "log-file",
        global = true,
        help = "Specify a custom log file path"
    )]
    pub log_file: Option<String>,

    /// Suppress non-essential output (spinners, warnings)
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress non-essential output"
    )]
    pub quiet: bool,

    /// Display the version
    #[arg(
        short = 'v',
        long = "version",
        global = true,
        help = "Display the version"
    )]
    pub version: bool,
}

/// Enumeration of available subcommands
#[derive(Subcommand)]
#[command(subcommand_negates_reqs = true)]
#[command(subcommand_precedence_over_arg = true)]
pub enum Commands {
    /// Get past a creative roadblock
    #[command(
        about = "Break through an innovation roadblock",
        long_about = "Analyze a creative roadblock with first-principles and cross-domain reasoning and propose concrete ways forward."
    )]
    Breakthrough {
        #[command(flatten)]
        common: CommonParams,

        /// Description of the roadblock
        roadblock: String,
    },

    /// Research an idea against recent literature
    #[command(
        about = "Research an innovation idea",
        long_about = "Ground a new idea in recent academic literature using Semantic Scholar."
    )]
    Research {
        #[command(flatten)]
        common: CommonParams,

        /// The idea to research
        idea: String,
    },

    /// Synthesize knowledge across domains
    #[command(about = "Synthesize knowledge across domains")]
    Synthesize {
        #[command(flatten)]
        common: CommonParams,

        /// Question to explore across the domains
        #[arg(long, help = "Research question to explore")]
        question: String,

        /// Knowledge domain; repeat for several
        #[arg(short = 'd', long = "domain", required = true, help = "Knowledge domain (repeatable)")]
        domains: Vec<String>,

        #[arg(long, default_value = "comprehensive", help = "surface, moderate or comprehensive")]
        depth: String,
    },

    /// Map relationships between topics
    #[command(about = "Create an insight map of related topics")]
    Map {
        #[command(flatten)]
        common: CommonParams,

        /// Topics to map
        #[arg(required = true)]
        topics: Vec<String>,

        /// Known connection to explore; repeat for several
        #[arg(long = "connection", help = "Known connection (repeatable)")]
        connections: Vec<String>,

        #[arg(long, default_value = "network", help = "network, hierarchy, cluster or flow")]
        visualization: String,
    },

    /// Write a strategic brief
    #[command(about = "Generate a strategic intelligence brief")]
    Brief {
        #[command(flatten)]
        common: CommonParams,

        /// Strategic topic
        topic: String,

        #[arg(long = "stakeholder", help = "Key stakeholder (repeatable)")]
        stakeholders: Vec<String>,

        #[arg(long = "objective", help = "Strategic objective (repeatable)")]
        objectives: Vec<String>,
    },

    /// Track emerging trends in a domain
    #[command(about = "Track emerging trends")]
    Trends {
        #[command(flatten)]
        common: CommonParams,

        /// Domain to scan
        domain: String,

        #[arg(long, default_value = "medium-term", help = "short-term, medium-term or long-term")]
        timeframe: String,

        #[arg(
            long = "source",
            required = true,
            help = "Source type such as academic, industry or patents (repeatable)"
        )]
        sources: Vec<String>,
    },

    /// List the agent tools
    #[command(about = "List agent tools and their tool providers")]
    Tools,

    /// Start an MCP server exposing the agents
    #[command(
        about = "Start an MCP server",
        long_about = "Start a Model Context Protocol (MCP) server on stdin/stdout that exposes every agent as a tool."
    )]
    Serve {
        /// Enable development mode with a debug log file
        #[arg(long, help = "Enable development mode with a debug log file")]
        dev: bool,
    },
}

fn get_styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::Magenta.on_default().bold())
        .usage(AnsiColor::Cyan.on_default().bold())
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::Yellow.on_default())
        .valid(AnsiColor::Blue.on_default().bold())
        .invalid(AnsiColor::Red.on_default().bold())
        .error(AnsiColor::Red.on_default().bold())
}

/// Parse the command-line arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

fn get_dynamic_help() -> String {
    let providers_list = Provider::all_names()
        .iter()
        .map(|p| format!("{}", p.bold()))
        .collect::<Vec<_>>()
        .join(" • ");

    format!("\nAvailable model providers: {providers_list}")
}

/// Main function to parse arguments and handle the command
pub async fn main() -> anyhow::Result<()> {
    let cli = parse_args();

    if cli.version {
        ui::print_version(crate_version!());
        return Ok(());
    }

    if cli.log || cli.log_file.is_some() {
        crate::logger::enable_logging();
        let log_file = cli.log_file.as_deref().unwrap_or(LOG_FILE);
        crate::logger::set_log_file(log_file)?;
    }

    if cli.quiet {
        ui::set_quiet_mode(true);
    }

    if let Some(command) = cli.command {
        handle_command(command, cli.log_file).await
    } else {
        let _ = Cli::parse_from(["insight-agents", "--help"]);
        Ok(())
    }
}

/// Handle the command based on parsed arguments
pub async fn handle_command(command: Commands, log_file: Option<String>) -> anyhow::Result<()> {
    let (common, input) = match command {
        Commands::Tools => return commands::handle_tools_command(),
        Commands::Serve { dev } => {
            log_debug!("Handling 'serve' command with dev: {dev}");
            return commands::handle_serve_command(dev, log_file).await;
        }
        Commands::Breakthrough { common, roadblock } => (
            common,
            ToolInput::Breakthrough(BreakthroughInput {
                roadblock_description: roadblock,
            }),
        ),
        Commands::Research { common, idea } => (
            common,
            ToolInput::Research(ResearchInput {
                innovation_idea: idea,
            }),
        ),
        Commands::Synthesize {
            common,
            question,
            domains,
            depth,
        } => (
            common,
            ToolInput::Synthesis(SynthesisInput {
                domains,
                research_question: question,
                depth,
            }),
        ),
        Commands::Map {
            common,
            topics,
            connections,
            visualization,
        } => (
            common,
            ToolInput::InsightMap(InsightMapInput {
                topics,
                connections,
                visualization_type: visualization,
            }),
        ),
        Commands::Brief {
            common,
            topic,
            stakeholders,
            objectives,
        } => (
            common,
            ToolInput::StrategicBrief(StrategicBriefInput {
                topic,
                stakeholders,
                objectives,
            }),
        ),
        Commands::Trends {
            common,
            domain,
            timeframe,
            sources,
        } => (
            common,
            ToolInput::Trends(TrendInput {
                domain,
                timeframe,
                sources,
            }),
        ),
    };

    commands::handle_agent_command(&common, input).await
}
