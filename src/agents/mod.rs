//! Agent system for insight-agents
//!
//! Schema-constrained research agents: output contracts, the generation
//! session that drives a model backend through MCP tool providers, and the
//! concrete agent profiles built on top.

// Core session machinery
pub mod backend;
pub mod failure;
pub mod output_validator;
pub mod schema;
pub mod session;

// Agent content
pub mod prompts;
pub mod specialized;

// Setup and configuration
pub mod setup;

pub use backend::{BackendError, BackendReply, GenerationRequest, GenerationTurn, ModelBackend};
pub use failure::{Failure, FailureKind};
pub use schema::{FieldKind, FieldSpec, FieldValue, SchemaContract, StructuredResult};
pub use session::{AgentConfiguration, AgentSession};
pub use setup::AgentSetupService;
pub use specialized::{AgentKind, AgentProfile, ToolInput};
