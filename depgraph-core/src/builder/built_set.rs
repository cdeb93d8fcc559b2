//! Built Set
//!
//! Per-build memo of which data-blocks were already processed. Shared
//! data-blocks (materials, node trees, actions) are reachable along many
//! paths; the memo cuts recursion so each is traversed once per build.

use std::ops::{BitOr, BitOrAssign};

use indexmap::IndexMap;

use crate::scene::SessionUuid;

/// Purpose a data-block was processed for.
///
/// A scene is entered separately for its parameters, its audio and its
/// sequencer, so each purpose gets its own bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildTag(u8);

impl BuildTag {
    pub const ANIMATION: BuildTag = BuildTag(1 << 0);
    pub const PARAMETERS: BuildTag = BuildTag(1 << 1);
    pub const SCENE_SEQUENCER: BuildTag = BuildTag(1 << 2);
    pub const SCENE_AUDIO: BuildTag = BuildTag(1 << 3);
    pub const SCENE_SPEAKERS: BuildTag = BuildTag(1 << 4);
    pub const SCENE_COMPOSITOR: BuildTag = BuildTag(1 << 5);
    /// Every purpose at once; used by builders that process the whole
    /// data-block.
    pub const COMPLETE: BuildTag = BuildTag(0b11_1111);

    pub fn contains(self, other: BuildTag) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for BuildTag {
    type Output = BuildTag;

    fn bitor(self, rhs: BuildTag) -> BuildTag {
        BuildTag(self.0 | rhs.0)
    }
}

impl BitOrAssign for BuildTag {
    fn bitor_assign(&mut self, rhs: BuildTag) {
        self.0 |= rhs.0;
    }
}

/// Visited memo of one build pass.
#[derive(Debug, Default)]
pub struct BuiltSet {
    tags: IndexMap<SessionUuid, BuildTag>,
}

impl BuiltSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `uuid` was already processed for `tag`.
    pub fn check_is_built(&self, uuid: SessionUuid, tag: BuildTag) -> bool {
        self.tags.get(&uuid).is_some_and(|built| built.contains(tag))
    }

    /// Check whether `uuid` was already processed for `tag` and mark it as
    /// processed in the same step.
    pub fn check_is_built_and_tag(&mut self, uuid: SessionUuid, tag: BuildTag) -> bool {
        let built = self.tags.entry(uuid).or_default();
        let was_built = built.contains(tag);
        *built |= tag;
        was_built
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }
}
