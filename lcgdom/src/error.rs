//! Error types for the document model.

use std::any::Any;

use thiserror::Error;

use crate::element::NodeId;

/// Failures of document operations that a caller may want to react to.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
    #[error("node {0} is not attached to the document")]
    Detached(NodeId),
    #[error("node {0} is hidden and cannot receive focus")]
    Hidden(NodeId),
}

/// Invalid arguments passed to the cookie store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CookieError {
    #[error("invalid cookie name {0:?}")]
    InvalidName(String),
    #[error("invalid cookie path {0:?}")]
    InvalidPath(String),
}

/// A deferred task that panicked.
///
/// Deferred tasks run detached from whoever scheduled them, so nobody can
/// recover from their failure. The queue turns the panic into this value
/// and logs it.
#[derive(Debug, Clone)]
pub struct TaskError {
    /// Label the task was scheduled with.
    pub task: &'static str,
    /// Panic message extracted from the panic payload.
    pub message: String,
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deferred task '{}' panicked: {}", self.task, self.message)
    }
}

impl std::error::Error for TaskError {}

/// Extract a human-readable message from a panic payload.
///
/// Panics can contain either `&str` or `String` payloads. This function
/// attempts to extract either, falling back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
