//! Dependency Graph
//!
//! This module holds the node storage the builder fills in.
//!
//! # Overview
//!
//! The graph is a three level hierarchy:
//!
//! - ID nodes, one per data-block
//! - Component nodes, one per (ID node, node type, sub-name)
//! - Operation nodes, one per (component, opcode, name, name tag)
//!
//! Edges between operations are added by a separate relations pass and are
//! not stored here. Components expose their entry and exit operations as
//! attachment points for that pass.
//!
//! # Design Decisions
//!
//! 1. All nodes live in arenas owned by [`Graph`] and reference each other
//!    by typed index. Tearing down for a rebuild is clearing vectors.
//!
//! 2. Every lookup table is an `IndexMap`, so iteration order (and with it
//!    the flat operation list) is deterministic across runs.
//!
//! 3. Evaluation callbacks are stored but never invoked during
//!    construction.
//!
//! 4. Indices are only valid for the graph build that produced them.
//!    [`Graph::clear`] (and with it every rebuild) empties the arenas and
//!    restarts numbering, so a stale index may silently name a different
//!    node. Anything kept across a rebuild is keyed by session uuid and
//!    node key instead, and resolved again afterwards.

mod component;
mod depsgraph;
mod id_node;
mod key;
mod operation;
mod time_source;

pub use component::ComponentNode;
pub use depsgraph::{Graph, GraphStats};
pub use id_node::{IdNode, LinkedState};
pub use key::{
    ComponentIndex, ComponentKey, IdNodeIndex, NodeType, OperationCode, OperationIdKey,
    OperationIndex,
};
pub use operation::{EvalCallback, EvalContext, OperationNode, UpdateSource};
pub use time_source::TimeSource;
