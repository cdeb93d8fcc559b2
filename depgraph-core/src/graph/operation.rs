//! Operation Nodes
//!
//! An operation is one schedulable unit of evaluation work. The graph only
//! stores and indexes its callback; running it is the evaluator's business.

use std::fmt;
use std::sync::Arc;

use super::depsgraph::Graph;
use super::key::{ComponentIndex, OperationCode, OperationIdKey};
use crate::scene::Database;

/// State handed to evaluation callbacks.
pub struct EvalContext<'a> {
    pub graph: &'a Graph,
    pub database: &'a Database,
    /// Scene time being evaluated.
    pub frame: f64,
}

/// Evaluation callback bound to an operation.
pub type EvalCallback = Arc<dyn Fn(&EvalContext<'_>) + Send + Sync>;

/// Why an operation was tagged for update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    /// Scene time changed.
    Time,
    /// Explicit edit through the user interface or scripting.
    UserEdit,
    /// The graph was rebuilt and the node must refresh.
    Relations,
    /// The node became visible.
    Visibility,
}

/// One unit of evaluation work inside a component.
pub struct OperationNode {
    owner: ComponentIndex,
    key: OperationIdKey,
    evaluate: Option<EvalCallback>,

    is_entry: bool,
    is_exit: bool,
    is_pinned: bool,

    needs_update: bool,
    directly_modified: bool,
    user_modified: bool,
}

impl OperationNode {
    /// New operations start dirty so their first evaluation always runs.
    pub(crate) fn new(
        owner: ComponentIndex,
        key: OperationIdKey,
        evaluate: Option<EvalCallback>,
    ) -> Self {
        Self {
            owner,
            key,
            evaluate,
            is_entry: false,
            is_exit: false,
            is_pinned: false,
            needs_update: true,
            directly_modified: false,
            user_modified: false,
        }
    }

    /// The component owning this operation.
    pub fn owner(&self) -> ComponentIndex {
        self.owner
    }

    pub fn key(&self) -> &OperationIdKey {
        &self.key
    }

    pub fn opcode(&self) -> OperationCode {
        self.key.opcode
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn name_tag(&self) -> i32 {
        self.key.name_tag
    }

    /// Whether real work is bound to the operation. Operations without a
    /// callback only serve as attachment points.
    pub fn has_callback(&self) -> bool {
        self.evaluate.is_some()
    }

    /// Run the bound callback, if any.
    pub fn evaluate(&self, ctx: &EvalContext<'_>) {
        if let Some(evaluate) = &self.evaluate {
            evaluate(ctx);
        }
    }

    pub fn is_entry(&self) -> bool {
        self.is_entry
    }

    pub fn is_exit(&self) -> bool {
        self.is_exit
    }

    /// Pinned operations survive pruning of nodes without relations.
    pub fn is_pinned(&self) -> bool {
        self.is_pinned
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    pub fn directly_modified(&self) -> bool {
        self.directly_modified
    }

    pub fn user_modified(&self) -> bool {
        self.user_modified
    }

    pub(crate) fn mark_entry(&mut self) {
        self.is_entry = true;
    }

    pub(crate) fn mark_exit(&mut self) {
        self.is_exit = true;
    }

    pub(crate) fn pin(&mut self) {
        self.is_pinned = true;
    }

    pub(crate) fn mark_tagged(&mut self, source: UpdateSource) {
        self.needs_update = true;
        self.directly_modified = true;
        if source == UpdateSource::UserEdit {
            self.user_modified = true;
        }
    }

    /// Clear dirty state after evaluation.
    pub(crate) fn mark_clean(&mut self) {
        self.needs_update = false;
        self.directly_modified = false;
        self.user_modified = false;
    }
}

impl fmt::Debug for OperationNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationNode")
            .field("owner", &self.owner)
            .field("key", &self.key)
            .field("has_callback", &self.has_callback())
            .field("is_entry", &self.is_entry)
            .field("is_exit", &self.is_exit)
            .field("is_pinned", &self.is_pinned)
            .field("needs_update", &self.needs_update)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_operations_start_dirty() {
        let op =
            OperationNode::new(ComponentIndex::from(0), OperationCode::TransformLocal.into(), None);
        assert!(op.needs_update());
        assert!(!op.directly_modified());
        assert!(!op.has_callback());
    }

    #[test]
    fn only_user_edits_mark_user_modified() {
        let mut op =
            OperationNode::new(ComponentIndex::from(0), OperationCode::GeometryEval.into(), None);
        op.mark_clean();
        op.mark_tagged(UpdateSource::Relations);
        assert!(op.directly_modified());
        assert!(!op.user_modified());

        op.mark_tagged(UpdateSource::UserEdit);
        assert!(op.user_modified());
    }
}
