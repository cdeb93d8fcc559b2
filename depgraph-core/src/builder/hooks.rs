//! Evaluation Hooks
//!
//! The builder creates operations but knows nothing about the work they do.
//! Domain evaluation code plugs in through [`EvalHooks`], which is asked for
//! a callback every time the builder creates an operation.

use crate::graph::{ComponentKey, EvalCallback, OperationIdKey};
use crate::scene::Datablock;

/// Supplies evaluation callbacks for new operations.
pub trait EvalHooks: Send + Sync {
    /// Callback for the operation `operation` in component `component` of
    /// `id`, or `None` to leave the operation as a pure anchor.
    fn operation_callback(
        &self,
        id: &Datablock,
        component: &ComponentKey,
        operation: &OperationIdKey,
    ) -> Option<EvalCallback>;
}

/// Hooks that bind no work; every operation becomes an anchor.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl EvalHooks for NoopHooks {
    fn operation_callback(
        &self,
        _: &Datablock,
        _: &ComponentKey,
        _: &OperationIdKey,
    ) -> Option<EvalCallback> {
        None
    }
}
