//! [`ModelBackend`] on top of rig-core completion models

use async_trait::async_trait;
use rig::OneOrMany;
use rig::completion::{CompletionError, CompletionModel, ToolDefinition};
use rig::message::{AssistantContent, Message, ToolResultContent, UserContent};

use super::{
    BackendError, BackendReply, GenerationRequest, GenerationTurn, ModelBackend, ToolCallOutcome,
    ToolCallRequest, corrective_prompt, schema_instructions,
};
use crate::log_debug;

const DEFAULT_MAX_TOKENS: u64 = 8192;

/// Drives any rig completion model, e.g. Gemini or OpenAI
pub struct RigBackend<M> {
    model: M,
    max_tokens: u64,
}

impl<M: CompletionModel> RigBackend<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u64) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl<M> ModelBackend for RigBackend<M>
where
    M: CompletionModel + 'static,
{
    async fn generate(&self, request: GenerationRequest<'_>) -> Result<BackendReply, BackendError> {
        let preamble = format!(
            "{}\n\n{}",
            request.system_prompt,
            schema_instructions(request.schema)
        );
        let tools: Vec<ToolDefinition> = request
            .tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name.to_string(),
                description: tool.description.to_string(),
                parameters: tool.schema_as_json_value(),
            })
            .collect();

        let mut history = conversation(request.task_prompt, request.transcript)?;
        let prompt = history
            .pop()
            .ok_or_else(|| BackendError::Protocol("empty conversation".to_string()))?;

        log_debug!(
            "Requesting completion from {} ({} prior messages, {} tools)",
            request.model,
            history.len(),
            tools.len()
        );

        let response = self
            .model
            .completion_request(prompt)
            .preamble(preamble)
            .messages(history)
            .tools(tools)
            .max_tokens(self.max_tokens)
            .send()
            .await
            .map_err(classify)?;

        let mut calls = Vec::new();
        let mut text = String::new();
        for content in response.choice.iter() {
            match content {
                AssistantContent::ToolCall(call) => calls.push(ToolCallRequest {
                    id: if call.id.is_empty() {
                        uuid::Uuid::new_v4().to_string()
                    } else {
                        call.id.clone()
                    },
                    name: call.function.name.clone(),
                    arguments: call.function.arguments.clone(),
                }),
                AssistantContent::Text(chunk) => text.push_str(&chunk.text),
                _ => {}
            }
        }

        if calls.is_empty() {
            Ok(BackendReply::Answer(text))
        } else {
            Ok(BackendReply::ToolCalls(calls))
        }
    }
}

/// Rebuild the chat from the task prompt and the transcript
fn conversation(task_prompt: &str, transcript: &[GenerationTurn]) -> Result<Vec<Message>, BackendError> {
    let mut messages = vec![Message::user(task_prompt)];

    for turn in transcript {
        match turn {
            GenerationTurn::ToolRound { calls, results } => {
                let requested = OneOrMany::many(calls.iter().map(|call| {
                    AssistantContent::tool_call(&call.id, &call.name, call.arguments.clone())
                }))
                .map_err(|_| BackendError::Protocol("tool round without calls".to_string()))?;
                messages.push(Message::Assistant {
                    id: None,
                    content: requested,
                });

                let answered = OneOrMany::many(results.iter().map(|result| {
                    UserContent::tool_result(
                        &result.id,
                        OneOrMany::one(ToolResultContent::text(tool_result_text(result))),
                    )
                }))
                .map_err(|_| BackendError::Protocol("tool round without results".to_string()))?;
                messages.push(Message::User { content: answered });
            }
            GenerationTurn::AnswerAttempt {
                candidate,
                rejection,
            } => {
                messages.push(Message::assistant(candidate));
                messages.push(Message::user(corrective_prompt(rejection)));
            }
        }
    }

    Ok(messages)
}

/// Rig tool results carry no error flag, so failures are marked in the text
fn tool_result_text(result: &ToolCallOutcome) -> String {
    if result.is_error {
        format!("Error: {}", result.content)
    } else {
        result.content.clone()
    }
}

fn classify(error: CompletionError) -> BackendError {
    let message = error.to_string();
    let lowered = message.to_lowercase();

    if ["401", "403", "unauthorized", "unauthenticated", "api key", "permission denied"]
        .iter()
        .any(|needle| lowered.contains(needle))
    {
        return BackendError::Authentication(message);
    }
    if lowered.contains("timed out") || lowered.contains("timeout") {
        return BackendError::Timeout(message);
    }

    match error {
        CompletionError::JsonError(_) | CompletionError::ResponseError(_) => {
            BackendError::Protocol(message)
        }
        _ => BackendError::Transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_conversation_replays_transcript() {
        let transcript = vec![
            GenerationTurn::ToolRound {
                calls: vec![ToolCallRequest {
                    id: "call-1".into(),
                    name: "search".into(),
                    arguments: json!({"q": "x"}),
                }],
                results: vec![ToolCallOutcome {
                    id: "call-1".into(),
                    name: "search".into(),
                    content: "found".into(),
                    is_error: false,
                }],
            },
            GenerationTurn::AnswerAttempt {
                candidate: "{}".into(),
                rejection: "missing required field `items`".into(),
            },
        ];

        let messages = conversation("task", &transcript).expect("conversation should build");
        // task, tool calls, tool results, rejected answer, correction
        assert_eq!(messages.len(), 5);
        assert!(matches!(messages[1], Message::Assistant { .. }));
        assert!(matches!(messages[4], Message::User { .. }));
    }

    #[test]
    fn test_error_results_are_marked() {
        let failed = ToolCallOutcome {
            id: "call-2".into(),
            name: "search".into(),
            content: "unknown tool `search`".into(),
            is_error: true,
        };
        assert_eq!(tool_result_text(&failed), "Error: unknown tool `search`");

        let answered = ToolCallOutcome {
            is_error: false,
            content: "found".into(),
            ..failed
        };
        assert_eq!(tool_result_text(&answered), "found");
    }

    #[test]
    fn test_classify_errors() {
        let auth = classify(CompletionError::ProviderError("401 Unauthorized".into()));
        assert!(matches!(auth, BackendError::Authentication(_)));

        let protocol = classify(CompletionError::ResponseError("no candidates".into()));
        assert!(matches!(protocol, BackendError::Protocol(_)));

        let transport = classify(CompletionError::ProviderError("503 unavailable".into()));
        assert!(matches!(transport, BackendError::Transport(_)));
    }
}
