//! Insight Agents - schema-constrained research agents
//!
//! Each agent reasons with a model backend and a set of external MCP tool
//! providers, then returns a structured report. The agents are available
//! from the command line and as tools of an MCP server.

// Allow certain clippy warnings that are either stylistic or from external dependencies
#![allow(clippy::uninlined_format_args)] // Style preference
#![allow(clippy::format_push_string)] // Performance improvement but stylistic
#![allow(clippy::future_not_send)] // From Rig framework internals, can't fix
#![allow(clippy::return_self_not_must_use)] // Builder pattern is clear enough
#![allow(clippy::items_after_statements)] // Locally-scoped use statements are fine

pub mod agents;
pub mod cli;
pub mod commands;
pub mod common;
pub mod config;
pub mod logger;
pub mod mcp;
pub mod providers;
pub mod types;
pub mod ui;

// Re-export important structs and functions for easier testing
pub use config::Config;
pub use providers::{Provider, ProviderConfig};
