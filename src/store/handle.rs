//! Opaque, copyable references to graph slots.
//!
//! A [`Handle`] is an (owner id, slot index, generation) triple. Validity is
//! a pure function of the current store state: the handle is usable while its
//! owner matches the queried graph and its generation matches the slot's
//! current generation. No pointers are held, so a handle can be stored,
//! copied and persisted freely; misuse is detected, not undefined.

use core::marker::PhantomData;
use core::num::NonZeroU64;
use core::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of a graph instance.
///
/// A graph draws a fresh id on construction, after `clear`, and (for the
/// drained source) after `move_from`, so ids are never reused across
/// container lifetimes and stale handles can never be mistaken for fresh
/// ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphId(NonZeroU64);

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

impl GraphId {
    pub(crate) fn fresh() -> Self {
        let raw = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self(NonZeroU64::new(raw).expect("graph id counter wrapped"))
    }

    /// The raw numeric value, mainly useful for logging.
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// Kind marker for handles referencing nodes.
#[derive(Debug)]
pub enum NodeKind {}

/// Kind marker for handles referencing arcs.
#[derive(Debug)]
pub enum ArcKind {}

/// An opaque reference to a node or arc slot.
///
/// The type parameter `K` is a zero-sized kind marker ([`NodeKind`] or
/// [`ArcKind`]); node and arc handles are distinct types and cannot be
/// confused. The distinguished [`Handle::null`] value represents absence
/// ("end") and carries no owner.
pub struct Handle<K> {
    owner: Option<GraphId>,
    index: u32,
    generation: u32,
    _kind: PhantomData<fn() -> K>,
}

/// A handle to a node of a [`Digraph`](crate::Digraph).
pub type NodeHandle = Handle<NodeKind>;

/// A handle to an arc of a [`Digraph`](crate::Digraph).
pub type ArcHandle = Handle<ArcKind>;

impl<K> Handle<K> {
    pub(crate) fn new(owner: GraphId, index: u32, generation: u32) -> Self {
        Self {
            owner: Some(owner),
            index,
            generation,
            _kind: PhantomData,
        }
    }

    /// The null sentinel: a handle that references nothing.
    pub fn null() -> Self {
        Self {
            owner: None,
            index: 0,
            generation: 0,
            _kind: PhantomData,
        }
    }

    /// Returns true for the null sentinel.
    pub fn is_null(&self) -> bool {
        self.owner.is_none()
    }

    /// The graph identity this handle was issued against, independent of
    /// whether the handle is still valid. `None` for the null sentinel.
    pub fn owner(&self) -> Option<GraphId> {
        self.owner
    }

    pub(crate) fn index(&self) -> u32 {
        self.index
    }

    pub(crate) fn generation(&self) -> u32 {
        self.generation
    }
}

// Manual impls: `K` is phantom, so no bounds on it are wanted.
impl<K> Clone for Handle<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for Handle<K> {}

impl<K> PartialEq for Handle<K> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.index == other.index
            && self.generation == other.generation
    }
}

impl<K> Eq for Handle<K> {}

impl<K> core::hash::Hash for Handle<K> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<K> core::fmt::Debug for Handle<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.owner {
            None => f.write_str("Handle(null)"),
            Some(owner) => write!(
                f,
                "Handle({}:{}@{})",
                owner.get(),
                self.index,
                self.generation
            ),
        }
    }
}

impl<K> Default for Handle<K> {
    fn default() -> Self {
        Self::null()
    }
}
