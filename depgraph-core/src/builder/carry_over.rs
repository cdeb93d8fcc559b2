//! Carry-over Between Builds
//!
//! A rebuild replaces every node, but three pieces of state must survive it:
//! expanded shadow copies, per-ID masks recorded by the previous build, and
//! update tags that were pending when the rebuild started. `begin_build`
//! moves them out of the old graph; `end_build` consumes what the new graph
//! did not claim.

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::GraphBuilder;
use crate::error::Result;
use crate::graph::{ComponentIndex, ComponentKey, OperationIdKey, UpdateSource};
use crate::scene::{IdWalk, SessionUuid};
use crate::shadow::{IdRecalc, LinkTarget, ShadowCopy};

/// State of one ID node of the previous graph.
#[derive(Debug, Default)]
pub(super) struct IdInfo {
    /// Expanded shadow copy, taken by the new ID node that claims it.
    pub shadow: Option<ShadowCopy>,
    pub previously_visible_components_mask: u64,
    pub previous_eval_flags: u32,
    pub previous_customdata_mask: u64,
}

impl IdInfo {
    /// Masks and flags handed to the new ID node.
    pub fn previous(&self) -> (u64, u32, u64) {
        (
            self.previously_visible_components_mask,
            self.previous_eval_flags,
            self.previous_customdata_mask,
        )
    }
}

/// An update tag of the previous graph, addressed by key so it can be
/// replayed onto the rebuilt graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SavedEntryTag {
    uuid: SessionUuid,
    component: ComponentKey,
    operation: OperationIdKey,
}

impl GraphBuilder<'_> {
    /// Move carried state out of the graph, then clear it.
    pub(super) fn snapshot_previous_graph(&mut self) {
        let mut unusable: Vec<ShadowCopy> = Vec::new();
        for node in self.graph.id_nodes_mut() {
            // Unexpanded copies hold nothing worth keeping.
            let shadow = match node.take_shadow() {
                Some(copy) if copy.is_expanded() => Some(copy),
                Some(copy) => {
                    unusable.push(copy);
                    None
                }
                None => None,
            };
            self.id_info.insert(
                node.uuid(),
                IdInfo {
                    shadow,
                    previously_visible_components_mask: node.visible_components_mask,
                    previous_eval_flags: node.eval_flags,
                    previous_customdata_mask: node.customdata_mask,
                },
            );
        }
        for copy in unusable {
            self.graph.release_shadow_copy(copy);
        }

        let graph = &*self.graph;
        self.saved_entry_tags = graph
            .entry_tags()
            .map(|index| {
                let operation = graph.operation(index);
                let component = graph.component(operation.owner());
                SavedEntryTag {
                    uuid: graph.id_node(component.owner()).uuid(),
                    component: component.key().clone(),
                    operation: operation.key().clone(),
                }
            })
            .collect();

        self.graph.clear();
    }

    /// Re-apply saved update tags to operations that still exist.
    ///
    /// Returns the number of tags replayed.
    pub(super) fn tag_previously_tagged_nodes(&mut self) -> usize {
        let saved = std::mem::take(&mut self.saved_entry_tags);
        let mut replayed = 0;
        for tag in &saved {
            let operation = self
                .graph
                .find_component(tag.uuid, tag.component.node_type, &tag.component.name)
                .and_then(|component| self.graph.find_operation(component, &tag.operation));
            match operation {
                Some(index) => {
                    self.graph.tag_operation_update(index, UpdateSource::UserEdit);
                    replayed += 1;
                }
                None => trace!(
                    uuid = %tag.uuid,
                    component = %tag.component,
                    operation = %tag.operation,
                    "dropping orphaned update tag"
                ),
            }
        }
        replayed
    }

    /// Tag reused shadow copies whose links no longer match the graph.
    ///
    /// A link is stale when it points at an original that now has a shadow
    /// copy, or at a shadow copy that is gone or was replaced. Returns the
    /// number of data-blocks tagged.
    pub(super) fn update_invalid_shadow_copies(&mut self) -> Result<usize> {
        let graph = &*self.graph;
        let mut stale: SmallVec<[SessionUuid; 8]> = SmallVec::new();
        for node in graph.id_nodes() {
            if !node.is_shadow_reused() {
                continue;
            }
            let Some(copy) = node.shadow() else {
                continue;
            };
            if !copy.is_expanded()
                || copy.is_embedded()
                || copy.recalc().contains(IdRecalc::COPY_ON_WRITE)
            {
                continue;
            }

            let mut is_stale = false;
            copy.foreach_link(IdWalk::IGNORE_EMBEDDED, |target, link| {
                if is_stale {
                    return;
                }
                let current = graph.shadow_copy_id(target);
                is_stale = match link {
                    LinkTarget::Original => current.is_some(),
                    LinkTarget::Shadow(id) => current != Some(id),
                };
            });
            if is_stale {
                debug!(uuid = %node.uuid(), name = node.name(), "shadow copy links are stale");
                stale.push(node.uuid());
            }
        }

        for uuid in &stale {
            self.graph
                .tag_id_update(*uuid, IdRecalc::COPY_ON_WRITE, UpdateSource::Relations)?;
        }
        Ok(stale.len())
    }

    /// Record which component types are visible and tag the ones that just
    /// became visible on reused data-blocks.
    pub(super) fn update_visible_components(&mut self) {
        let mut newly_visible: Vec<ComponentIndex> = Vec::new();
        for node in self.graph.id_nodes_mut() {
            let mask = if node.is_directly_visible {
                node.components()
                    .fold(0, |mask, (key, _)| mask | key.node_type.mask_bit())
            } else {
                0
            };
            node.visible_components_mask = mask;

            let added = mask & !node.previously_visible_components_mask;
            if node.is_shadow_reused() && added != 0 {
                newly_visible.extend(
                    node.components()
                        .filter(|(key, _)| added & key.node_type.mask_bit() != 0)
                        .map(|(_, index)| index),
                );
            }
        }
        for component in newly_visible {
            self.graph.tag_component_update(component, UpdateSource::Visibility);
        }
    }

    /// Release carried shadow copies no new ID node claimed.
    pub(super) fn release_unused_shadow_copies(&mut self) {
        for (_, mut info) in self.id_info.drain(..) {
            if let Some(copy) = info.shadow.take() {
                trace!(uuid = %copy.original(), "releasing unclaimed shadow copy");
                self.graph.release_shadow_copy(copy);
            }
        }
    }
}
