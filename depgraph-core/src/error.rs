//! Error Types
//!
//! Only conditions a caller can act on are errors. Builder bugs (duplicate
//! strict creation) panic after logging, and missing scene data is skipped
//! silently, so neither shows up here.

use thiserror::Error;

use crate::graph::OperationCode;
use crate::scene::SessionUuid;

/// Errors raised by graph mutation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// An operation with the same key already exists in the component.
    #[error("operation {opcode:?} '{name}' (tag {name_tag}) already exists in {component}")]
    DuplicateOperation {
        component: String,
        opcode: OperationCode,
        name: String,
        name_tag: i32,
    },

    /// No ID node exists for the data-block.
    #[error("no ID node for data-block {0}")]
    UnknownId(SessionUuid),
}

/// Phase of a graph build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    NotBuilding,
    Began,
    Building,
    Ended,
}

/// Errors raised by the graph builder.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A builder entry point was called out of order.
    #[error("builder is {actual:?}, {operation} requires {expected}")]
    InvalidState {
        operation: &'static str,
        expected: &'static str,
        actual: BuildState,
    },

    /// The requested root data-block does not exist.
    #[error("data-block {0} not found in database")]
    MissingRoot(SessionUuid),

    /// The scene has no view layer at the requested index.
    #[error("scene {scene} has no view layer {index}")]
    MissingViewLayer { scene: SessionUuid, index: usize },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Errors raised while reading builder configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid builder configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result alias used by the builder.
pub type Result<T, E = BuildError> = std::result::Result<T, E>;
