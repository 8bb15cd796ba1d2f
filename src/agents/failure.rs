//! Terminal outcomes of an agent session

use std::time::Duration;
use thiserror::Error;

use super::backend::BackendError;
use super::schema::SchemaViolations;
use crate::mcp::supervisor::ProviderError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FailureKind {
    ProviderLaunch,
    ProviderTimeout,
    SchemaValidation,
    GenerationBackend,
    DeadlineExceeded,
    Cancelled,
}

/// Why a session produced no result
///
/// Returned as a value from [`AgentSession::run`](super::session::AgentSession::run).
/// Provider resources have already been released by the time a caller sees it.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("tool provider '{provider}' failed to start: {reason}")]
    ProviderLaunch { provider: String, reason: String },

    #[error("tool provider '{provider}' timed out during {phase} after {timeout:?}")]
    ProviderTimeout {
        provider: String,
        phase: &'static str,
        timeout: Duration,
    },

    #[error("answer rejected after a corrective retry: {0}")]
    SchemaValidation(SchemaViolations),

    #[error("model backend error: {0}")]
    GenerationBackend(#[from] BackendError),

    #[error("session deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),

    #[error("session was cancelled")]
    Cancelled,
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::ProviderLaunch { .. } => FailureKind::ProviderLaunch,
            Self::ProviderTimeout { .. } => FailureKind::ProviderTimeout,
            Self::SchemaValidation(_) => FailureKind::SchemaValidation,
            Self::GenerationBackend(_) => FailureKind::GenerationBackend,
            Self::DeadlineExceeded(_) => FailureKind::DeadlineExceeded,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }
}

impl From<ProviderError> for Failure {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Launch { provider, reason } => Self::ProviderLaunch { provider, reason },
            ProviderError::Timeout {
                provider,
                phase,
                timeout,
            } => Self::ProviderTimeout {
                provider,
                phase,
                timeout,
            },
        }
    }
}
