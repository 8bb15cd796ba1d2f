//! Final-answer extraction and validation
//!
//! Models do not always return bare JSON. They wrap it in a markdown fence or
//! put a sentence in front of it. This module digs the JSON object out of the
//! reply and checks it against the agent's [`SchemaContract`]. It never repairs
//! field values; a malformed answer is rejected and the session decides
//! whether to ask again.

use serde_json::Value;
use std::sync::Arc;

use super::schema::{SchemaContract, SchemaViolations, StructuredResult};
use crate::log_debug;

/// Pull the JSON value out of a model reply.
///
/// Tries, in order: the whole reply, a fenced ```json block, and the first
/// balanced `{...}` object in the text.
pub fn extract_json_candidate(response: &str) -> Option<Value> {
    let trimmed = response.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    if let Some(fenced) = fenced_block(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(fenced)
    {
        log_debug!("Extracted JSON answer from a markdown fence");
        return Some(value);
    }

    let object = first_balanced_object(trimmed)?;
    let value = serde_json::from_str::<Value>(object).ok()?;
    log_debug!("Extracted JSON answer embedded in surrounding text");
    Some(value)
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```json").map(|i| i + 7).or_else(|| {
        let i = text.find("```")?;
        Some(i + 3)
    })?;
    let rest = &text[start..];
    let end = rest.find("```")?;
    Some(rest[..end].trim())
}

/// First top-level `{...}` span, ignoring braces inside string literals
fn first_balanced_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extract and validate a candidate answer in one step
pub fn validate_answer(
    contract: &Arc<SchemaContract>,
    response: &str,
) -> Result<StructuredResult, SchemaViolations> {
    let Some(candidate) = extract_json_candidate(response) else {
        return Err(SchemaViolations {
            contract: contract.name().to_string(),
            violations: vec!["the answer did not contain a JSON object".to_string()],
        });
    };
    contract.validate(&candidate)
}
