//! The model-backend boundary
//!
//! A [`ModelBackend`] receives the full state of a generation on every call:
//! model id, prompts, tool declarations, target schema and the transcript of
//! turns so far. It answers with either tool calls or a candidate answer.
//! Backends hold no conversation state of their own.

pub mod rig_model;

pub use self::rig_model::RigBackend;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use super::schema::SchemaContract;
use rmcp::model::Tool;

/// A tool invocation requested by the model
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallRequest {
    /// Opaque id used to pair the result with the request
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// What came back from a tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallOutcome {
    pub id: String,
    pub name: String,
    pub content: String,
    pub is_error: bool,
}

/// One completed exchange of the reasoning loop
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationTurn {
    /// The model asked for tools; `results` pairs with `calls` by id
    ToolRound {
        calls: Vec<ToolCallRequest>,
        results: Vec<ToolCallOutcome>,
    },
    /// The model proposed an answer that was rejected
    AnswerAttempt { candidate: String, rejection: String },
}

pub struct GenerationRequest<'a> {
    pub model: &'a str,
    pub system_prompt: &'a str,
    pub task_prompt: &'a str,
    pub tools: &'a [Tool],
    pub schema: &'a SchemaContract,
    pub transcript: &'a [GenerationTurn],
}

#[derive(Debug, Clone, PartialEq)]
pub enum BackendReply {
    ToolCalls(Vec<ToolCallRequest>),
    Answer(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Protocol(String),
}

#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<BackendReply, BackendError>;
}

/// Instruction appended to the system prompt so the final answer is bare JSON
pub fn schema_instructions(schema: &SchemaContract) -> String {
    let schema_json = serde_json::to_string_pretty(&schema.to_json_schema())
        .unwrap_or_else(|_| schema.to_json_schema().to_string());
    format!(
        "When you have finished using tools, reply with ONLY a JSON object that matches \
         this JSON Schema. Every property is required and no other properties are allowed. \
         Do not wrap it in markdown and do not add any other text.\n\n{schema_json}"
    )
}

/// User message sent after a rejected answer
pub fn corrective_prompt(rejection: &str) -> String {
    format!(
        "Your previous answer was rejected: {rejection}\n\n\
         Reply again with ONLY the corrected JSON object. Keep every field required by \
         the schema and use exactly the declared types."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_instructions_embed_schema() {
        let schema = SchemaContract::builder("sample").list("items", "").build();
        let text = schema_instructions(&schema);
        assert!(text.contains("\"items\""));
        assert!(text.contains("\"additionalProperties\": false"));
    }

    #[test]
    fn test_corrective_prompt_names_the_problem() {
        let text = corrective_prompt("missing required field `items`");
        assert!(text.contains("missing required field `items`"));
    }
}
