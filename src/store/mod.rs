//! Slot storage and the handle layer.
//!
//! The store is the foundation of the container: a generational arena whose
//! handles stay safe across mutation, transplantation and clearing of the
//! owning graph. See [`handle`] for the handle contract.

pub mod handle;
pub(crate) mod slot;

pub use handle::{ArcHandle, ArcKind, GraphId, Handle, NodeHandle, NodeKind};
