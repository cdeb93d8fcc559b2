//! Shadow Copies
//!
//! A shadow copy is the private evaluation-time version of a data-block.
//! Evaluation writes derived state into the copy and never touches the
//! original.
//!
//! # Lifecycle
//!
//! 1. When an ID node is created for a data-block whose type needs one, the
//!    graph allocates an *unexpanded* shadow copy: a handle with no content.
//!
//! 2. The copy-on-write operation of that ID node expands the copy: it clones
//!    the original and records, for every outgoing link, whether the link was
//!    redirected to another shadow copy or still points at an original.
//!
//! 3. On rebuild, expanded copies are carried over to the new graph, so that
//!    evaluated state survives structural edits. Their recorded links may now
//!    be stale, which `end_build` detects.
//!
//! # Thread Safety
//!
//! Evaluation callbacks capture shadow copy handles and may run on worker
//! threads, so state lives behind an `Arc<RwLock<_>>`.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;

use crate::scene::{Datablock, IdType, IdWalk, SessionUuid};

/// Identity of one shadow copy allocation.
///
/// Two handles with the same id refer to the same allocation; a reallocated
/// copy for the same data-block gets a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ShadowCopyId(u64);

impl ShadowCopyId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Recalculation flags of a data-block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct IdRecalc(u32);

impl IdRecalc {
    pub const NONE: IdRecalc = IdRecalc(0);
    pub const TRANSFORM: IdRecalc = IdRecalc(1 << 0);
    pub const GEOMETRY: IdRecalc = IdRecalc(1 << 1);
    pub const ANIMATION: IdRecalc = IdRecalc(1 << 2);
    pub const SHADING: IdRecalc = IdRecalc(1 << 3);
    pub const PARAMETERS: IdRecalc = IdRecalc(1 << 4);
    /// The shadow copy must be refreshed from the original.
    pub const COPY_ON_WRITE: IdRecalc = IdRecalc(1 << 5);

    pub fn contains(self, other: IdRecalc) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl BitOr for IdRecalc {
    type Output = IdRecalc;

    fn bitor(self, rhs: IdRecalc) -> IdRecalc {
        IdRecalc(self.0 | rhs.0)
    }
}

impl BitOrAssign for IdRecalc {
    fn bitor_assign(&mut self, rhs: IdRecalc) {
        self.0 |= rhs.0;
    }
}

/// Where a link of an expanded shadow copy points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    /// The link still points at the original data-block.
    Original,
    /// The link was redirected to this shadow copy.
    Shadow(ShadowCopyId),
}

#[derive(Debug)]
struct ShadowState {
    id_type: IdType,
    /// Content, present once expanded.
    data: Option<Datablock>,
    links: IndexMap<SessionUuid, LinkTarget>,
    recalc: IdRecalc,
}

/// Shared handle to a shadow copy.
#[derive(Clone)]
pub struct ShadowCopy {
    id: ShadowCopyId,
    original: SessionUuid,
    state: Arc<RwLock<ShadowState>>,
}

impl ShadowCopy {
    /// Create an unexpanded copy for `original`.
    pub fn new(original: &Datablock) -> Self {
        Self {
            id: ShadowCopyId::next(),
            original: original.uuid,
            state: Arc::new(RwLock::new(ShadowState {
                id_type: original.id_type(),
                data: None,
                links: IndexMap::new(),
                recalc: IdRecalc::NONE,
            })),
        }
    }

    pub fn id(&self) -> ShadowCopyId {
        self.id
    }

    /// Uuid of the original data-block.
    pub fn original(&self) -> SessionUuid {
        self.original
    }

    pub fn id_type(&self) -> IdType {
        self.state.read().id_type
    }

    pub fn is_expanded(&self) -> bool {
        self.state.read().data.is_some()
    }

    /// Whether the copy holds embedded data, managed by its owner.
    pub fn is_embedded(&self) -> bool {
        self.state
            .read()
            .data
            .as_ref()
            .is_some_and(|data| data.embedded)
    }

    /// Refresh the copy from `original`.
    ///
    /// `resolve` maps a referenced uuid to the shadow copy it should be
    /// redirected to, or `None` to keep pointing at the original.
    pub fn expand<F>(&self, original: &Datablock, resolve: F)
    where
        F: Fn(SessionUuid) -> Option<ShadowCopyId>,
    {
        let links = original
            .id_links()
            .iter()
            .map(|link| {
                let target = match resolve(link.target) {
                    Some(copy) => LinkTarget::Shadow(copy),
                    None => LinkTarget::Original,
                };
                (link.target, target)
            })
            .collect();

        let mut state = self.state.write();
        state.data = Some(original.clone());
        state.links = links;
    }

    /// Where the expanded copy's link to `target` points.
    pub fn link_target(&self, target: SessionUuid) -> Option<LinkTarget> {
        self.state.read().links.get(&target).copied()
    }

    /// Visit every link of the expanded copy together with its recorded
    /// target. Does nothing for an unexpanded copy.
    pub fn foreach_link<F>(&self, walk: IdWalk, mut visitor: F)
    where
        F: FnMut(SessionUuid, LinkTarget),
    {
        let state = self.state.read();
        let Some(data) = &state.data else {
            return;
        };
        data.foreach_id_link(walk, |link| {
            let target = state
                .links
                .get(&link.target)
                .copied()
                .unwrap_or(LinkTarget::Original);
            visitor(link.target, target);
        });
    }

    /// Run `f` against the expanded content.
    pub fn with_data<R>(&self, f: impl FnOnce(&Datablock) -> R) -> Option<R> {
        self.state.read().data.as_ref().map(f)
    }

    pub fn recalc(&self) -> IdRecalc {
        self.state.read().recalc
    }

    pub fn tag_recalc(&self, recalc: IdRecalc) {
        self.state.write().recalc |= recalc;
    }

    /// Clear recalculation flags once evaluation consumed them.
    pub fn clear_recalc(&self) {
        self.state.write().recalc = IdRecalc::NONE;
    }

    /// Whether both handles refer to the same allocation.
    pub fn ptr_eq(&self, other: &ShadowCopy) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

impl fmt::Debug for ShadowCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShadowCopy")
            .field("id", &self.id)
            .field("original", &self.original)
            .field("expanded", &self.is_expanded())
            .finish()
    }
}

/// Allocation counters of an allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocatorStats {
    pub allocated: usize,
    pub released: usize,
}

impl AllocatorStats {
    /// Copies allocated and not yet released.
    pub fn live(&self) -> usize {
        self.allocated - self.released
    }
}

/// Produces and frees shadow copies.
pub trait ShadowCopyAllocator: Send {
    /// Allocate an unexpanded copy for `original`.
    fn allocate(&mut self, original: &Datablock) -> ShadowCopy;

    /// Free a copy that no ID node owns any more.
    fn release(&mut self, copy: ShadowCopy);

    fn stats(&self) -> AllocatorStats {
        AllocatorStats::default()
    }
}

/// Heap allocator that keeps allocation counters.
#[derive(Debug, Default)]
pub struct CountingAllocator {
    stats: AllocatorStats,
}

impl CountingAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ShadowCopyAllocator for CountingAllocator {
    fn allocate(&mut self, original: &Datablock) -> ShadowCopy {
        self.stats.allocated += 1;
        ShadowCopy::new(original)
    }

    fn release(&mut self, copy: ShadowCopy) {
        self.stats.released += 1;
        drop(copy);
    }

    fn stats(&self) -> AllocatorStats {
        self.stats
    }
}
