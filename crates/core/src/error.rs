//! Stable error kinds for the replay engine.
//!
//! Every error carries a small string-keyed context map so callers and logs
//! can report game id, nonce range or failing parameter names without ever
//! needing to reflect over internal state. Raw seeds must never end up here.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Context attached to an [`EngineError`]: small, string-keyed, never seeds.
pub type ErrorContext = BTreeMap<String, String>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("invalid seed: {message}")]
    InvalidSeed {
        message: String,
        context: ErrorContext,
    },

    #[error("invalid nonce range: {message}")]
    InvalidNonce {
        message: String,
        context: ErrorContext,
    },

    #[error("invalid params: {message}")]
    InvalidParams {
        message: String,
        context: ErrorContext,
    },

    #[error("game not found: {game_id}")]
    GameNotFound {
        game_id: String,
        context: ErrorContext,
    },

    #[error("scan cancelled")]
    Cancelled { context: ErrorContext },

    #[error("internal error: {message}")]
    Internal {
        message: String,
        context: ErrorContext,
    },
}

impl EngineError {
    /// The stable identifier used in logs and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidSeed { .. } => "invalid_seed",
            EngineError::InvalidNonce { .. } => "invalid_nonce",
            EngineError::InvalidParams { .. } => "invalid_params",
            EngineError::GameNotFound { .. } => "game_not_found",
            EngineError::Cancelled { .. } => "cancelled",
            EngineError::Internal { .. } => "internal",
        }
    }

    pub fn context(&self) -> &ErrorContext {
        match self {
            EngineError::InvalidSeed { context, .. }
            | EngineError::InvalidNonce { context, .. }
            | EngineError::InvalidParams { context, .. }
            | EngineError::GameNotFound { context, .. }
            | EngineError::Cancelled { context }
            | EngineError::Internal { context, .. } => context,
        }
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        EngineError::InvalidParams {
            message: message.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn invalid_nonce(message: impl Into<String>) -> Self {
        EngineError::InvalidNonce {
            message: message.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn game_not_found(game_id: impl Into<String>) -> Self {
        EngineError::GameNotFound {
            game_id: game_id.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        EngineError::Internal {
            message: message.into(),
            context: ErrorContext::new(),
        }
    }

    pub fn cancelled() -> Self {
        EngineError::Cancelled {
            context: ErrorContext::new(),
        }
    }

    /// Attach a context entry, building up diagnosable-without-seeds errors.
    pub fn with_context(mut self, key: impl Into<String>, value: impl fmt::Display) -> Self {
        let entry = (key.into(), value.to_string());
        match &mut self {
            EngineError::InvalidSeed { context, .. }
            | EngineError::InvalidNonce { context, .. }
            | EngineError::InvalidParams { context, .. }
            | EngineError::GameNotFound { context, .. }
            | EngineError::Cancelled { context }
            | EngineError::Internal { context, .. } => {
                context.insert(entry.0, entry.1);
            }
        }
        self
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
