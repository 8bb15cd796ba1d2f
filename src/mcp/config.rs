//! Configuration for the MCP server

use serde::{Deserialize, Serialize};

/// Configuration options for the MCP server
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MCPServerConfig {
    /// Write a debug log to `insight-agents-mcp-<pid>.log`
    pub dev_mode: bool,
    /// Explicit log file; takes precedence over the dev-mode default
    pub log_file: Option<String>,
}

impl MCPServerConfig {
    /// Create a new configuration with development mode enabled
    #[must_use]
    pub fn with_dev_mode(mut self) -> Self {
        self.dev_mode = true;
        self
    }

    #[must_use]
    pub fn with_log_file(mut self, path: impl Into<String>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Log destination implied by this configuration, if any
    pub fn log_path(&self) -> Option<String> {
        self.log_file.clone().or_else(|| {
            self.dev_mode
                .then(|| format!("insight-agents-mcp-{}.log", std::process::id()))
        })
    }
}
