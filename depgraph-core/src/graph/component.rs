//! Component Nodes

use indexmap::IndexMap;

use super::key::{
    ComponentKey, IdNodeIndex, NodeType, OperationCode, OperationIdKey, OperationIndex,
};

/// A named bucket of operations of one category, owned by one ID node.
#[derive(Debug)]
pub struct ComponentNode {
    owner: IdNodeIndex,
    key: ComponentKey,
    operations: IndexMap<OperationIdKey, OperationIndex>,
    entry: Option<OperationIndex>,
    exit: Option<OperationIndex>,
}

impl ComponentNode {
    pub(crate) fn new(owner: IdNodeIndex, key: ComponentKey) -> Self {
        Self {
            owner,
            key,
            operations: IndexMap::new(),
            entry: None,
            exit: None,
        }
    }

    /// The ID node owning this component.
    pub fn owner(&self) -> IdNodeIndex {
        self.owner
    }

    pub fn key(&self) -> &ComponentKey {
        &self.key
    }

    pub fn node_type(&self) -> NodeType {
        self.key.node_type
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    /// Look up an operation by its key parts.
    pub fn find_operation(
        &self,
        opcode: OperationCode,
        name: &str,
        name_tag: i32,
    ) -> Option<OperationIndex> {
        self.find_operation_by_key(&OperationIdKey::new(opcode, name, name_tag))
    }

    pub fn find_operation_by_key(&self, key: &OperationIdKey) -> Option<OperationIndex> {
        self.operations.get(key).copied()
    }

    pub fn has_operation(&self, key: &OperationIdKey) -> bool {
        self.operations.contains_key(key)
    }

    /// Operations in creation order.
    pub fn operations(&self) -> impl Iterator<Item = OperationIndex> + '_ {
        self.operations.values().copied()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// First operation of the component's internal chain.
    pub fn entry_operation(&self) -> Option<OperationIndex> {
        self.entry
    }

    /// Last operation of the component's internal chain.
    pub fn exit_operation(&self) -> Option<OperationIndex> {
        self.exit
    }

    pub(crate) fn insert_operation(&mut self, key: OperationIdKey, index: OperationIndex) {
        self.operations.insert(key, index);
    }

    pub(crate) fn set_entry(&mut self, index: OperationIndex) {
        self.entry = Some(index);
    }

    pub(crate) fn set_exit(&mut self, index: OperationIndex) {
        self.exit = Some(index);
    }
}
