//! # `quiver` - Generation-Checked Directed Graph Container
//!
//! A directed graph whose nodes and arcs carry arbitrary payloads and are
//! referenced through small, copyable, *generation-checked* handles instead
//! of pointers or bare indices. Misuse of a handle is always detected and
//! reported, never undefined.
//!
//! ## Safety Guarantees
//!
//! ### Handle Safety
//! - **No dangling references**: A handle is an (owner id, slot index,
//!   generation) triple. Erasing a node or arc bumps the slot's generation,
//!   so every copy of the old handle becomes detectably stale.
//! - **ABA prevention**: Recycled slots never validate handles from a
//!   previous occupant; generations make index reuse harmless.
//! - **Owner checking**: Handles from a different live graph are rejected
//!   as [`GraphError::WrongOwner`], distinct from staleness.
//!
//! ### Transplant Safety
//! - **Handles survive moves**: [`Digraph::move_from`] and [`Digraph::cut`]
//!   relocate contents between containers while keeping previously issued
//!   handles usable against the destination, via per-store alias tables.
//! - **Clear is terminal**: [`Digraph::clear`] retires the graph's identity;
//!   every handle from the cleared lifetime reports as an *end* handle
//!   ([`Digraph::is_end`]) rather than colliding with recycled slots.
//!
//! ## Key Features
//!
//! - **Ordered adjacency**: Per-node outgoing/incoming arc lists keep
//!   insertion order, double as child ordering for tree-shaped data
//!   ([`Digraph::child_offset`], [`Digraph::reorder`], [`Digraph::swap`]),
//!   and make every algorithm deterministic.
//! - **Algorithms**: reachability, exhaustive and shortest path search,
//!   predicate-filtered topological sorts with structural cycle reporting.
//! - **Traversal iterators**: lazy storage-order, depth-first (pre/post)
//!   and breadth-first walks.
//! - **Persistence**: a byte-stream codec for graphs *and* the handles that
//!   reference them, with pluggable payload encoding (see [`codec`]).
//!
//! ## Example
//!
//! ```rust
//! use quiver::{Digraph, GraphError};
//!
//! let mut g: Digraph<&str, u32> = Digraph::new();
//! let a = g.insert("a");
//! let b = g.insert("b");
//! let ab = g.arc_insert(a, b, 7)?;
//!
//! assert!(g.adjacent(a, b)?);
//! assert_eq!(g.shortest_path(a, b)?, vec![a, b]);
//!
//! // Erasure is detected, not undefined.
//! g.erase(b)?;
//! assert!(!g.is_valid(b));
//! assert!(!g.arc_is_valid(ab));
//! assert_eq!(g.node(b), Err(GraphError::InvalidHandle));
//! # Ok::<(), GraphError>(())
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]

pub mod codec;
pub mod error;
pub mod graph;
pub mod store;

pub use error::{GraphError, Result};
pub use graph::{Arcs, Bfs, Dfs, Digraph, Nodes};
pub use store::{ArcHandle, GraphId, Handle, NodeHandle};
