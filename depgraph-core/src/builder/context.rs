//! Build Context

use crate::scene::SessionUuid;

/// Traversal state threaded through the recursive builders.
///
/// Builders that change the state for their callees pass a modified copy
/// down; nothing is restored on return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    /// Scene whose view layer is being built.
    pub scene: Option<SessionUuid>,
    /// Visibility of the collection the current recursion descends from.
    pub is_parent_collection_visible: bool,
}

impl BuildContext {
    /// Context for roots built outside of any view layer.
    pub fn root() -> Self {
        Self {
            scene: None,
            is_parent_collection_visible: true,
        }
    }

    pub fn for_view_layer(scene: SessionUuid) -> Self {
        Self {
            scene: Some(scene),
            is_parent_collection_visible: true,
        }
    }

    pub fn with_parent_visibility(self, is_visible: bool) -> Self {
        Self {
            is_parent_collection_visible: is_visible,
            ..self
        }
    }
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::root()
    }
}
