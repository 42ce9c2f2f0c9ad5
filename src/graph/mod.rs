//! The `Digraph` container.
//!
//! A directed graph whose nodes and arcs carry arbitrary payloads and are
//! referenced through generation-checked [`NodeHandle`]/[`ArcHandle`] values.
//! Handles survive mutation of the rest of the graph: erasing a node makes
//! only the handles to that node (and its incident arcs) stale, and the
//! staleness is detected rather than undefined.
//!
//! The graph maintains, per node, ordered lists of outgoing and incoming arc
//! references (the adjacency index). Arc insertion order is the tie-break
//! policy for every algorithm in this module, and the outgoing list doubles
//! as the child ordering for tree-shaped data (see [`Digraph::child_offset`],
//! [`Digraph::reorder`], [`Digraph::swap`]).
//!
//! # Performance
//! - `insert` / `arc_insert`: O(1) amortized
//! - `erase`: O(degree), preserving adjacency order of the neighbours
//! - `arc_erase`: O(degree of the two endpoints)
//! - handle checks: O(1)

mod algorithm;
mod transplant;
mod traverse;

pub use traverse::{Arcs, Bfs, Dfs, Nodes};

use crate::error::{GraphError, Result};
use crate::store::handle::{ArcHandle, ArcKind, GraphId, NodeHandle, NodeKind};
use crate::store::slot::SlotStore;

#[derive(Clone)]
pub(crate) struct NodeRecord<N> {
    pub payload: N,
    /// Outgoing arc slot indices, in insertion order (mutable via
    /// `reorder`/`swap`).
    pub outputs: Vec<u32>,
    /// Incoming arc slot indices, in insertion order.
    pub inputs: Vec<u32>,
}

#[derive(Clone)]
pub(crate) struct ArcRecord<A> {
    pub payload: A,
    pub from: u32,
    pub to: u32,
}

/// A directed graph with generation-checked handles.
///
/// `N` is the node payload type, `A` the arc payload type. Self-loops are
/// permitted; parallel arcs are permitted.
pub struct Digraph<N, A> {
    pub(crate) nodes: SlotStore<NodeKind, NodeRecord<N>>,
    pub(crate) arcs: SlotStore<ArcKind, ArcRecord<A>>,
}

impl<N, A> Digraph<N, A> {
    /// Creates an empty graph under a fresh identity.
    pub fn new() -> Self {
        let id = GraphId::fresh();
        Self {
            nodes: SlotStore::new(id),
            arcs: SlotStore::new(id),
        }
    }

    /// The current identity of this graph instance.
    pub fn id(&self) -> GraphId {
        self.nodes.owner()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of live arcs.
    pub fn arc_count(&self) -> usize {
        self.arcs.len()
    }

    /// True when the graph holds no nodes (and therefore no arcs).
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ---- mutation ------------------------------------------------------

    /// Inserts a node, returning its handle.
    pub fn insert(&mut self, payload: N) -> NodeHandle {
        self.nodes.allocate(NodeRecord {
            payload,
            outputs: Vec::new(),
            inputs: Vec::new(),
        })
    }

    /// Inserts an arc from `from` to `to`. Both endpoints are validated
    /// before any structure is touched, so a failed insert changes nothing.
    ///
    /// # Errors
    /// Handle errors for either endpoint.
    pub fn arc_insert(
        &mut self,
        from: NodeHandle,
        to: NodeHandle,
        payload: A,
    ) -> Result<ArcHandle> {
        let from_idx = self.nodes.resolve(from)?;
        let to_idx = self.nodes.resolve(to)?;
        let handle = self.arcs.allocate(ArcRecord {
            payload,
            from: from_idx,
            to: to_idx,
        });
        let arc_idx = handle.index();
        self.nodes.get_at_mut(from_idx).outputs.push(arc_idx);
        self.nodes.get_at_mut(to_idx).inputs.push(arc_idx);
        Ok(handle)
    }

    /// Erases a node and every arc incident on it, returning the payload.
    pub fn erase(&mut self, node: NodeHandle) -> Result<N> {
        let idx = self.nodes.resolve(node)?;
        Ok(self.erase_node_index(idx))
    }

    /// Erases an arc, returning its payload. The endpoints' adjacency order
    /// is preserved for the remaining arcs.
    pub fn arc_erase(&mut self, arc: ArcHandle) -> Result<A> {
        let idx = self.arcs.resolve(arc)?;
        let record = self.arcs.free_index(idx);
        remove_arc_ref(&mut self.nodes.get_at_mut(record.from).outputs, idx);
        remove_arc_ref(&mut self.nodes.get_at_mut(record.to).inputs, idx);
        Ok(record.payload)
    }

    pub(crate) fn erase_node_index(&mut self, idx: u32) -> N {
        let record = self.nodes.free_index(idx);
        let mut incident = record.inputs;
        for arc in record.outputs {
            if !incident.contains(&arc) {
                incident.push(arc);
            }
        }
        for arc_idx in incident {
            let arc = self.arcs.free_index(arc_idx);
            if arc.from != idx {
                remove_arc_ref(&mut self.nodes.get_at_mut(arc.from).outputs, arc_idx);
            }
            if arc.to != idx {
                remove_arc_ref(&mut self.nodes.get_at_mut(arc.to).inputs, arc_idx);
            }
        }
        record.payload
    }

    // ---- payload access --------------------------------------------------

    /// Shared access to a node payload.
    pub fn node(&self, node: NodeHandle) -> Result<&N> {
        Ok(&self.nodes.get(node)?.payload)
    }

    /// Mutable access to a node payload.
    pub fn node_mut(&mut self, node: NodeHandle) -> Result<&mut N> {
        Ok(&mut self.nodes.get_mut(node)?.payload)
    }

    /// Shared access to an arc payload.
    pub fn arc(&self, arc: ArcHandle) -> Result<&A> {
        Ok(&self.arcs.get(arc)?.payload)
    }

    /// Mutable access to an arc payload.
    pub fn arc_mut(&mut self, arc: ArcHandle) -> Result<&mut A> {
        Ok(&mut self.arcs.get_mut(arc)?.payload)
    }

    /// The source node of an arc.
    pub fn arc_from(&self, arc: ArcHandle) -> Result<NodeHandle> {
        let idx = self.arcs.resolve(arc)?;
        Ok(self.nodes.handle_at(self.arcs.get_at(idx).from))
    }

    /// The target node of an arc.
    pub fn arc_to(&self, arc: ArcHandle) -> Result<NodeHandle> {
        let idx = self.arcs.resolve(arc)?;
        Ok(self.nodes.handle_at(self.arcs.get_at(idx).to))
    }

    // ---- adjacency -------------------------------------------------------

    /// The node's outgoing arcs, in order.
    pub fn outputs(&self, node: NodeHandle) -> Result<impl Iterator<Item = ArcHandle> + '_> {
        let idx = self.nodes.resolve(node)?;
        Ok(self
            .nodes
            .get_at(idx)
            .outputs
            .iter()
            .map(move |&arc| self.arcs.handle_at(arc)))
    }

    /// The node's incoming arcs, in order.
    pub fn inputs(&self, node: NodeHandle) -> Result<impl Iterator<Item = ArcHandle> + '_> {
        let idx = self.nodes.resolve(node)?;
        Ok(self
            .nodes
            .get_at(idx)
            .inputs
            .iter()
            .map(move |&arc| self.arcs.handle_at(arc)))
    }

    /// Out-degree.
    pub fn fanout(&self, node: NodeHandle) -> Result<usize> {
        let idx = self.nodes.resolve(node)?;
        Ok(self.nodes.get_at(idx).outputs.len())
    }

    /// In-degree.
    pub fn fanin(&self, node: NodeHandle) -> Result<usize> {
        let idx = self.nodes.resolve(node)?;
        Ok(self.nodes.get_at(idx).inputs.len())
    }

    /// The `offset`-th outgoing arc.
    ///
    /// # Errors
    /// `OutOfRange` when `offset >= fanout(node)`.
    pub fn output(&self, node: NodeHandle, offset: usize) -> Result<ArcHandle> {
        let idx = self.nodes.resolve(node)?;
        let outputs = &self.nodes.get_at(idx).outputs;
        let arc = outputs.get(offset).ok_or(GraphError::OutOfRange {
            index: offset,
            bound: outputs.len(),
        })?;
        Ok(self.arcs.handle_at(*arc))
    }

    /// The `offset`-th incoming arc.
    ///
    /// # Errors
    /// `OutOfRange` when `offset >= fanin(node)`.
    pub fn input(&self, node: NodeHandle, offset: usize) -> Result<ArcHandle> {
        let idx = self.nodes.resolve(node)?;
        let inputs = &self.nodes.get_at(idx).inputs;
        let arc = inputs.get(offset).ok_or(GraphError::OutOfRange {
            index: offset,
            bound: inputs.len(),
        })?;
        Ok(self.arcs.handle_at(*arc))
    }

    // ---- handle queries ----------------------------------------------------

    /// True while the node handle resolves against this graph.
    pub fn is_valid(&self, node: NodeHandle) -> bool {
        self.nodes.is_valid(node)
    }

    /// True for the null sentinel and for handles from a cleared lifetime
    /// of this graph. A stale but previously-real handle is not end.
    pub fn is_end(&self, node: NodeHandle) -> bool {
        self.nodes.is_end(node)
    }

    /// True when the handle was issued against this graph, directly or via
    /// a transplant; independent of validity.
    pub fn owns(&self, node: NodeHandle) -> bool {
        self.nodes.owns(node)
    }

    /// Arc counterpart of [`Digraph::is_valid`].
    pub fn arc_is_valid(&self, arc: ArcHandle) -> bool {
        self.arcs.is_valid(arc)
    }

    /// Arc counterpart of [`Digraph::is_end`].
    pub fn arc_is_end(&self, arc: ArcHandle) -> bool {
        self.arcs.is_end(arc)
    }

    /// Arc counterpart of [`Digraph::owns`].
    pub fn arc_owns(&self, arc: ArcHandle) -> bool {
        self.arcs.owns(arc)
    }

    // ---- child ordering ------------------------------------------------

    /// The 0-based position of the first outgoing arc of `parent` that
    /// targets `child`, or `None` when `child` is not a direct child.
    pub fn child_offset(&self, parent: NodeHandle, child: NodeHandle) -> Result<Option<usize>> {
        let p = self.nodes.resolve(parent)?;
        let c = self.nodes.resolve(child)?;
        Ok(self
            .nodes
            .get_at(p)
            .outputs
            .iter()
            .position(|&arc| self.arcs.get_at(arc).to == c))
    }

    /// Removes the outgoing arc at position `from` and reinserts it before
    /// position `to` of the shortened list; `to == fanout - 1` moves it to
    /// the end.
    ///
    /// # Errors
    /// `OutOfRange` when either index is `>= fanout(parent)`.
    pub fn reorder(&mut self, parent: NodeHandle, from: usize, to: usize) -> Result<()> {
        let p = self.nodes.resolve(parent)?;
        let outputs = &mut self.nodes.get_at_mut(p).outputs;
        let bound = outputs.len();
        for index in [from, to] {
            if index >= bound {
                return Err(GraphError::OutOfRange { index, bound });
            }
        }
        let arc = outputs.remove(from);
        outputs.insert(to, arc);
        Ok(())
    }

    /// Swaps the outgoing arcs at positions `i` and `j`.
    ///
    /// # Errors
    /// `OutOfRange` when either index is `>= fanout(parent)`.
    pub fn swap(&mut self, parent: NodeHandle, i: usize, j: usize) -> Result<()> {
        let p = self.nodes.resolve(parent)?;
        let outputs = &mut self.nodes.get_at_mut(p).outputs;
        let bound = outputs.len();
        for index in [i, j] {
            if index >= bound {
                return Err(GraphError::OutOfRange { index, bound });
            }
        }
        outputs.swap(i, j);
        Ok(())
    }

    // ---- comparison ------------------------------------------------------

    /// Structural node-for-node, arc-for-arc comparison in storage order.
    /// Used to verify codec round-trips; identities and slot indices are
    /// not compared, only payloads and topology.
    pub fn equivalent(&self, other: &Self) -> bool
    where
        N: PartialEq,
        A: PartialEq,
    {
        if self.node_count() != other.node_count() || self.arc_count() != other.arc_count() {
            return false;
        }
        let mine: Vec<u32> = self.nodes.indices().collect();
        let theirs: Vec<u32> = other.nodes.indices().collect();
        let my_ord: std::collections::HashMap<u32, usize> =
            mine.iter().enumerate().map(|(o, &i)| (i, o)).collect();
        let their_ord: std::collections::HashMap<u32, usize> =
            theirs.iter().enumerate().map(|(o, &i)| (i, o)).collect();
        for (&a, &b) in mine.iter().zip(theirs.iter()) {
            if self.nodes.get_at(a).payload != other.nodes.get_at(b).payload {
                return false;
            }
        }
        for (a, b) in self.arcs.indices().zip(other.arcs.indices()) {
            let mine = self.arcs.get_at(a);
            let theirs = other.arcs.get_at(b);
            if mine.payload != theirs.payload
                || my_ord[&mine.from] != their_ord[&theirs.from]
                || my_ord[&mine.to] != their_ord[&theirs.to]
            {
                return false;
            }
        }
        true
    }
}

impl<N, A> Default for Digraph<N, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone, A: Clone> Clone for Digraph<N, A> {
    /// Structural copy under a fresh identity: the clone is `equivalent`
    /// to the original, but handles issued against the original do not
    /// resolve against it.
    fn clone(&self) -> Self {
        let id = GraphId::fresh();
        Self {
            nodes: self.nodes.clone_with(id),
            arcs: self.arcs.clone_with(id),
        }
    }
}

fn remove_arc_ref(list: &mut Vec<u32>, arc: u32) {
    if let Some(pos) = list.iter().position(|&x| x == arc) {
        list.remove(pos);
    }
}
