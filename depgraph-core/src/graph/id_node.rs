//! ID Nodes
//!
//! One ID node exists per data-block reachable from the build roots. It owns
//! the data-block's components and the state that survives rebuilds: the
//! shadow copy and the masks and flags recorded by the previous build.

use indexmap::IndexMap;
use serde::Serialize;

use super::key::{ComponentIndex, ComponentKey, NodeType};
use crate::scene::{IdType, SessionUuid};
use crate::shadow::ShadowCopy;

/// How a data-block is reachable from the view layer being built.
///
/// Variants are ordered by strength; merging keeps the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LinkedState {
    /// Reached through another data-block (instancing, parenting, drivers).
    Indirectly,
    /// Belongs to a background set scene.
    ViaSet,
    /// Has a base in the view layer being built.
    Directly,
}

/// Evaluation node of one data-block.
#[derive(Debug)]
pub struct IdNode {
    uuid: SessionUuid,
    id_type: IdType,
    name: String,
    components: IndexMap<ComponentKey, ComponentIndex>,

    pub linked_state: LinkedState,
    /// The object has a base in the view layer.
    pub has_base: bool,
    pub is_directly_visible: bool,
    /// The collection recursed into its objects and children, as opposed to
    /// being added from a layer collection only.
    pub is_collection_fully_expanded: bool,

    /// Component types evaluated because the data-block is visible.
    pub visible_components_mask: u64,
    pub previously_visible_components_mask: u64,

    /// Extra evaluation requests set by the relations pass.
    pub eval_flags: u32,
    pub previous_eval_flags: u32,

    /// Custom data layers requested from evaluated geometry.
    pub customdata_mask: u64,
    pub previous_customdata_mask: u64,

    shadow: Option<ShadowCopy>,
    is_shadow_reused: bool,
}

impl IdNode {
    pub(crate) fn new(
        uuid: SessionUuid,
        id_type: IdType,
        name: String,
        shadow: Option<ShadowCopy>,
        is_shadow_reused: bool,
    ) -> Self {
        Self {
            uuid,
            id_type,
            name,
            components: IndexMap::new(),
            linked_state: LinkedState::Indirectly,
            has_base: false,
            is_directly_visible: true,
            is_collection_fully_expanded: false,
            visible_components_mask: 0,
            previously_visible_components_mask: 0,
            eval_flags: 0,
            previous_eval_flags: 0,
            customdata_mask: 0,
            previous_customdata_mask: 0,
            shadow,
            is_shadow_reused,
        }
    }

    /// Uuid of the original data-block.
    pub fn uuid(&self) -> SessionUuid {
        self.uuid
    }

    pub fn id_type(&self) -> IdType {
        self.id_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Shadow copy, absent for types evaluated in place.
    pub fn shadow(&self) -> Option<&ShadowCopy> {
        self.shadow.as_ref()
    }

    /// Whether the shadow copy was carried over from the previous build.
    pub fn is_shadow_reused(&self) -> bool {
        self.is_shadow_reused
    }

    pub fn find_component(&self, node_type: NodeType, name: &str) -> Option<ComponentIndex> {
        self.components.get(&ComponentKey::new(node_type, name)).copied()
    }

    /// All components of one type, whatever their name.
    pub fn components_of_type(
        &self,
        node_type: NodeType,
    ) -> impl Iterator<Item = ComponentIndex> + '_ {
        self.components
            .iter()
            .filter(move |(key, _)| key.node_type == node_type)
            .map(|(_, index)| *index)
    }

    pub fn components(&self) -> impl Iterator<Item = (&ComponentKey, ComponentIndex)> + '_ {
        self.components.iter().map(|(key, index)| (key, *index))
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub(crate) fn insert_component(&mut self, key: ComponentKey, index: ComponentIndex) {
        self.components.insert(key, index);
    }

    pub(crate) fn take_shadow(&mut self) -> Option<ShadowCopy> {
        self.shadow.take()
    }
}
