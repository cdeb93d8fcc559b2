//! Graph Storage
//!
//! The [`Graph`] owns every node of a dependency graph in flat arenas:
//!
//! - `id_nodes`, with a hash from session uuid to arena index
//! - `components`, each pointing back at its ID node by index
//! - `operations`, the flat operation list later passes iterate over
//!
//! Nodes refer to each other by typed index only, so a rebuild tears the
//! graph down by clearing the arenas. Shadow copies are the one piece of
//! state that outlives a clear; the builder moves them out beforehand.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use smallvec::SmallVec;
use tracing::{error, trace};

use super::component::ComponentNode;
use super::id_node::{IdNode, LinkedState};
use super::key::{
    ComponentIndex, ComponentKey, IdNodeIndex, NodeType, OperationCode, OperationIdKey,
    OperationIndex,
};
use super::operation::{EvalCallback, EvalContext, OperationNode, UpdateSource};
use super::time_source::TimeSource;
use crate::error::GraphError;
use crate::scene::{Database, Datablock, IdType, SessionUuid};
use crate::shadow::{
    AllocatorStats, CountingAllocator, IdRecalc, ShadowCopy, ShadowCopyAllocator, ShadowCopyId,
};

/// Components tagged for each recalculation flag.
const RECALC_COMPONENTS: [(IdRecalc, NodeType); 6] = [
    (IdRecalc::TRANSFORM, NodeType::Transform),
    (IdRecalc::GEOMETRY, NodeType::Geometry),
    (IdRecalc::ANIMATION, NodeType::Animation),
    (IdRecalc::SHADING, NodeType::Shading),
    (IdRecalc::PARAMETERS, NodeType::Parameters),
    (IdRecalc::COPY_ON_WRITE, NodeType::CopyOnWrite),
];

/// Node counts of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct GraphStats {
    pub id_nodes: usize,
    pub components: usize,
    pub operations: usize,
    pub shadow_copies: usize,
    pub entry_tags: usize,
}

/// Dependency graph storage.
pub struct Graph {
    id_nodes: Vec<IdNode>,
    id_hash: IndexMap<SessionUuid, IdNodeIndex>,
    components: Vec<ComponentNode>,
    operations: Vec<OperationNode>,
    time_source: Option<TimeSource>,
    /// Operations explicitly tagged for update since the last evaluation.
    entry_tags: IndexSet<OperationIndex>,
    allocator: Box<dyn ShadowCopyAllocator>,
}

impl Graph {
    /// Create an empty graph using the counting allocator.
    pub fn new() -> Self {
        Self::with_allocator(Box::new(CountingAllocator::new()))
    }

    /// Create an empty graph with a custom shadow copy allocator.
    pub fn with_allocator(allocator: Box<dyn ShadowCopyAllocator>) -> Self {
        Self {
            id_nodes: Vec::new(),
            id_hash: IndexMap::new(),
            components: Vec::new(),
            operations: Vec::new(),
            time_source: None,
            entry_tags: IndexSet::new(),
            allocator,
        }
    }

    // -----------------------------------------------------------------------
    // ID nodes
    // -----------------------------------------------------------------------

    /// Find or create the ID node of `block`.
    ///
    /// A newly created node takes `carried` as its shadow copy, or allocates
    /// a fresh one when the type needs it, and gets its bootstrap operations:
    /// copy-on-write for shadow-copied types and a pinned visibility anchor.
    pub fn add_id_node(&mut self, block: &Datablock, carried: Option<ShadowCopy>) -> IdNodeIndex {
        if let Some(&index) = self.id_hash.get(&block.uuid) {
            if let Some(copy) = carried {
                self.allocator.release(copy);
            }
            return index;
        }

        let needs_shadow = block.id_type().needs_shadow_copy();
        let is_shadow_reused = needs_shadow && carried.is_some();
        let shadow = match carried {
            Some(copy) if needs_shadow => Some(copy),
            Some(copy) => {
                self.allocator.release(copy);
                None
            }
            None if needs_shadow => Some(self.allocator.allocate(block)),
            None => None,
        };

        let index = IdNodeIndex::from(self.id_nodes.len());
        trace!(id = %block, reused = is_shadow_reused, "add ID node");
        self.id_nodes.push(IdNode::new(
            block.uuid,
            block.id_type(),
            block.name.clone(),
            shadow.clone(),
            is_shadow_reused,
        ));
        self.id_hash.insert(block.uuid, index);

        if let Some(copy) = shadow {
            let component = self.add_component(index, NodeType::CopyOnWrite.into());
            let uuid = block.uuid;
            let evaluate: EvalCallback = Arc::new(move |ctx: &EvalContext<'_>| {
                if let Some(original) = ctx.database.get(uuid) {
                    copy.expand(original, |target| ctx.graph.shadow_copy_id(target));
                }
            });
            self.add_operation(component, OperationCode::CopyOnWrite.into(), Some(evaluate));
        }
        let component = self.add_component(index, NodeType::Visibility.into());
        let visibility = self.add_operation(component, OperationCode::Operation.into(), None);
        self.operations[visibility.index()].pin();

        index
    }

    pub fn find_id_node_index(&self, uuid: SessionUuid) -> Option<IdNodeIndex> {
        self.id_hash.get(&uuid).copied()
    }

    pub fn find_id_node(&self, uuid: SessionUuid) -> Option<&IdNode> {
        self.find_id_node_index(uuid).map(|index| &self.id_nodes[index.index()])
    }

    pub fn find_id_node_mut(&mut self, uuid: SessionUuid) -> Option<&mut IdNode> {
        let index = self.find_id_node_index(uuid)?;
        Some(&mut self.id_nodes[index.index()])
    }

    pub fn id_node(&self, index: IdNodeIndex) -> &IdNode {
        &self.id_nodes[index.index()]
    }

    pub fn id_node_mut(&mut self, index: IdNodeIndex) -> &mut IdNode {
        &mut self.id_nodes[index.index()]
    }

    /// ID nodes in creation order.
    pub fn id_nodes(&self) -> impl Iterator<Item = &IdNode> {
        self.id_nodes.iter()
    }

    pub fn id_node_count(&self) -> usize {
        self.id_nodes.len()
    }

    /// Identity of the shadow copy owned by the node of `uuid`.
    pub fn shadow_copy_id(&self, uuid: SessionUuid) -> Option<ShadowCopyId> {
        self.find_id_node(uuid)?.shadow().map(ShadowCopy::id)
    }

    pub(crate) fn id_nodes_mut(&mut self) -> impl Iterator<Item = &mut IdNode> {
        self.id_nodes.iter_mut()
    }

    pub(crate) fn release_shadow_copy(&mut self, copy: ShadowCopy) {
        self.allocator.release(copy);
    }

    pub fn allocator_stats(&self) -> AllocatorStats {
        self.allocator.stats()
    }

    // -----------------------------------------------------------------------
    // Components
    // -----------------------------------------------------------------------

    /// Find or create a component of an ID node.
    pub fn add_component(&mut self, id_node: IdNodeIndex, key: ComponentKey) -> ComponentIndex {
        let node = &mut self.id_nodes[id_node.index()];
        if let Some(index) = node.find_component(key.node_type, &key.name) {
            return index;
        }
        let index = ComponentIndex::from(self.components.len());
        node.insert_component(key.clone(), index);
        self.components.push(ComponentNode::new(id_node, key));
        index
    }

    pub fn find_component(
        &self,
        uuid: SessionUuid,
        node_type: NodeType,
        name: &str,
    ) -> Option<ComponentIndex> {
        self.find_id_node(uuid)?.find_component(node_type, name)
    }

    pub fn component(&self, index: ComponentIndex) -> &ComponentNode {
        &self.components[index.index()]
    }

    pub fn components(&self) -> impl Iterator<Item = &ComponentNode> {
        self.components.iter()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Create an operation, failing when the key is already taken.
    pub fn try_add_operation(
        &mut self,
        component: ComponentIndex,
        key: OperationIdKey,
        evaluate: Option<EvalCallback>,
    ) -> Result<OperationIndex, GraphError> {
        let comp = &self.components[component.index()];
        if comp.has_operation(&key) {
            let owner = &self.id_nodes[comp.owner().index()];
            return Err(GraphError::DuplicateOperation {
                component: format!("{}{}/{}", owner.id_type().code(), owner.name(), comp.key()),
                opcode: key.opcode,
                name: key.name,
                name_tag: key.name_tag,
            });
        }

        let index = OperationIndex::from(self.operations.len());
        self.components[component.index()].insert_operation(key.clone(), index);
        self.operations.push(OperationNode::new(component, key, evaluate));
        Ok(index)
    }

    /// Create an operation whose key must be unused.
    ///
    /// # Panics
    ///
    /// Panics when the component already has an operation with this key.
    /// That is a builder bug: two logically distinct operations would merge.
    pub fn add_operation(
        &mut self,
        component: ComponentIndex,
        key: OperationIdKey,
        evaluate: Option<EvalCallback>,
    ) -> OperationIndex {
        match self.try_add_operation(component, key, evaluate) {
            Ok(index) => index,
            Err(err) => {
                error!(%err, "strict operation creation collided");
                panic!("{err}");
            }
        }
    }

    pub fn find_operation(
        &self,
        component: ComponentIndex,
        key: &OperationIdKey,
    ) -> Option<OperationIndex> {
        self.components[component.index()].find_operation_by_key(key)
    }

    pub fn operation(&self, index: OperationIndex) -> &OperationNode {
        &self.operations[index.index()]
    }

    /// The flat operation list, in creation order.
    pub fn operations(&self) -> &[OperationNode] {
        &self.operations
    }

    /// Mark an operation as the first of its component's chain.
    pub fn set_as_entry(&mut self, index: OperationIndex) {
        let op = &mut self.operations[index.index()];
        op.mark_entry();
        self.components[op.owner().index()].set_entry(index);
    }

    /// Mark an operation as the last of its component's chain.
    pub fn set_as_exit(&mut self, index: OperationIndex) {
        let op = &mut self.operations[index.index()];
        op.mark_exit();
        self.components[op.owner().index()].set_exit(index);
    }

    // -----------------------------------------------------------------------
    // Time source
    // -----------------------------------------------------------------------

    /// Create the time source unless it already exists.
    pub fn add_time_source(&mut self) -> &mut TimeSource {
        self.time_source.get_or_insert_with(TimeSource::default)
    }

    pub fn time_source(&self) -> Option<&TimeSource> {
        self.time_source.as_ref()
    }

    /// Tag the time source and every animation operation after a frame
    /// change. Does nothing for a graph without a time source.
    pub fn tag_time_update(&mut self) {
        let Some(time_source) = &mut self.time_source else {
            return;
        };
        time_source.tag_update();
        let operations: Vec<OperationIndex> = self
            .components
            .iter()
            .filter(|component| component.node_type() == NodeType::Animation)
            .flat_map(|component| component.operations())
            .collect();
        for index in operations {
            self.tag_operation_update(index, UpdateSource::Time);
        }
    }

    // -----------------------------------------------------------------------
    // Tagging
    // -----------------------------------------------------------------------

    /// Tag one operation for update.
    ///
    /// `index` must come from the current build; indices from before the
    /// last [`clear`](Self::clear) are not detected and may tag an unrelated
    /// operation.
    pub fn tag_operation_update(&mut self, index: OperationIndex, source: UpdateSource) {
        self.operations[index.index()].mark_tagged(source);
        self.entry_tags.insert(index);
    }

    /// Tag every operation of a component for update.
    pub fn tag_component_update(&mut self, component: ComponentIndex, source: UpdateSource) {
        let operations: SmallVec<[OperationIndex; 8]> =
            self.components[component.index()].operations().collect();
        for index in operations {
            self.tag_operation_update(index, source);
        }
    }

    /// Tag the components of a data-block affected by `recalc`.
    ///
    /// The flags are also recorded on the shadow copy, so that later passes
    /// see a pending copy-on-write flush.
    pub fn tag_id_update(
        &mut self,
        uuid: SessionUuid,
        recalc: IdRecalc,
        source: UpdateSource,
    ) -> Result<(), GraphError> {
        let node = self.find_id_node(uuid).ok_or(GraphError::UnknownId(uuid))?;
        if let Some(shadow) = node.shadow() {
            shadow.tag_recalc(recalc);
        }

        let mut components: SmallVec<[ComponentIndex; 8]> = SmallVec::new();
        for (flag, node_type) in RECALC_COMPONENTS {
            if recalc.contains(flag) {
                components.extend(node.components_of_type(node_type));
            }
        }
        for component in components {
            self.tag_component_update(component, source);
        }
        Ok(())
    }

    /// Operations tagged since the last evaluation, in tagging order.
    pub fn entry_tags(&self) -> impl Iterator<Item = OperationIndex> + '_ {
        self.entry_tags.iter().copied()
    }

    pub fn is_entry_tagged(&self, index: OperationIndex) -> bool {
        self.entry_tags.contains(&index)
    }

    /// Forget all update tags, as after a completed evaluation.
    pub fn clear_updates(&mut self) {
        for op in &mut self.operations {
            op.mark_clean();
        }
        self.entry_tags.clear();
        if let Some(time_source) = &mut self.time_source {
            time_source.clear_update();
        }
        for node in &self.id_nodes {
            if let Some(shadow) = node.shadow() {
                shadow.clear_recalc();
            }
        }
    }

    // -----------------------------------------------------------------------
    // Evaluation helpers
    // -----------------------------------------------------------------------

    /// Run every copy-on-write operation, expanding all shadow copies.
    pub fn run_copy_on_write(&self, database: &Database, frame: f64) {
        let ctx = EvalContext {
            graph: self,
            database,
            frame,
        };
        self.operations
            .iter()
            .filter(|op| op.opcode() == OperationCode::CopyOnWrite)
            .for_each(|op| op.evaluate(&ctx));
    }

    // -----------------------------------------------------------------------
    // Lifecycle and introspection
    // -----------------------------------------------------------------------

    /// Remove every node, invalidating every index handed out so far.
    /// Shadow copies still owned by ID nodes are released.
    pub fn clear(&mut self) {
        for node in &mut self.id_nodes {
            if let Some(copy) = node.take_shadow() {
                self.allocator.release(copy);
            }
        }
        self.id_nodes.clear();
        self.id_hash.clear();
        self.components.clear();
        self.operations.clear();
        self.entry_tags.clear();
        self.time_source = None;
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            id_nodes: self.id_nodes.len(),
            components: self.components.len(),
            operations: self.operations.len(),
            shadow_copies: self.id_nodes.iter().filter(|node| node.shadow().is_some()).count(),
            entry_tags: self.entry_tags.len(),
        }
    }

    /// Dump the graph as pretty-printed JSON for debugging.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let dump = GraphDump {
            stats: self.stats(),
            has_time_source: self.time_source.is_some(),
            id_nodes: self
                .id_nodes
                .iter()
                .map(|node| IdNodeDump {
                    uuid: node.uuid(),
                    id_type: node.id_type(),
                    name: node.name(),
                    linked_state: node.linked_state,
                    is_directly_visible: node.is_directly_visible,
                    has_base: node.has_base,
                    shadow: node.shadow().map(ShadowCopy::id),
                    components: node
                        .components()
                        .map(|(key, index)| ComponentDump {
                            key,
                            operations: self.components[index.index()]
                                .operations()
                                .map(|op| {
                                    let op = &self.operations[op.index()];
                                    OperationDump {
                                        key: op.key(),
                                        is_entry: op.is_entry(),
                                        is_exit: op.is_exit(),
                                        is_pinned: op.is_pinned(),
                                        needs_update: op.needs_update(),
                                    }
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        };
        serde_json::to_string_pretty(&dump)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Graph {
    fn drop(&mut self) {
        self.clear();
    }
}

#[derive(Serialize)]
struct GraphDump<'a> {
    stats: GraphStats,
    has_time_source: bool,
    id_nodes: Vec<IdNodeDump<'a>>,
}

#[derive(Serialize)]
struct IdNodeDump<'a> {
    uuid: SessionUuid,
    id_type: IdType,
    name: &'a str,
    linked_state: LinkedState,
    is_directly_visible: bool,
    has_base: bool,
    shadow: Option<ShadowCopyId>,
    components: Vec<ComponentDump<'a>>,
}

#[derive(Serialize)]
struct ComponentDump<'a> {
    key: &'a ComponentKey,
    operations: Vec<OperationDump<'a>>,
}

#[derive(Serialize)]
struct OperationDump<'a> {
    key: &'a OperationIdKey,
    is_entry: bool,
    is_exit: bool,
    is_pinned: bool,
    needs_update: bool,
}
