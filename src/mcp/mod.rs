//! Model Context Protocol (MCP) integration for insight-agents
//!
//! Both directions live here: the client side that launches and talks to
//! external tool providers during a session, and the server that exposes
//! the agents themselves as MCP tools.

pub mod config;
pub mod resources;
pub mod server;
pub mod supervisor;
pub mod tools;
pub mod transport;


// Re-export main components
pub use server::serve;
pub use supervisor::{ToolProviderSpec, ToolServerSupervisor};
