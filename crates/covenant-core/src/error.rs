//! Error types shared across the engine.

use crate::di::DiError;
use http::Method;
use thiserror::Error;

/// Failure raised while executing a handler chain.
///
/// Middleware that wraps downstream execution observes these through the
/// `next()` result and may translate them into a response; uncaught, the
/// transport boundary turns them into a 500.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Dependency resolution failed
    #[error(transparent)]
    Di(#[from] DiError),

    /// An endpoint was triggered before a handler was registered for it
    #[error("handler not registered for {method} {generic_path}")]
    HandlerNotRegistered {
        method: Method,
        generic_path: String,
    },

    /// An application-level failure with a plain message
    #[error("{0}")]
    Message(String),

    /// Any other error raised by handler code
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Create a message-only handler error.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
