//! Common error types for event-tap-core.

use crate::NodeId;
use thiserror::Error;

/// Errors raised by the element tree, selectors and configuration loading.
///
/// Gesture recognition itself never fails; malformed input is ignored.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown node: {0:?}")]
    UnknownNode(NodeId),
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
