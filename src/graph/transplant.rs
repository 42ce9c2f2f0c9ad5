//! Whole-graph and subgraph transplants.
//!
//! [`Digraph::move_from`] and [`Digraph::cut`] relocate contents between
//! containers while keeping previously issued handles usable *against the
//! destination*: every moved slot is recorded in the destination's alias
//! table under the handle's original (owner, index) coordinates, and its
//! generation travels with it. Slots are adopted by appending, never by
//! recycling a freed slot, so an imported generation can never resurrect a
//! stale local handle.
//!
//! [`Digraph::clear`] is different in kind: it retires the graph's current
//! identity (and every identity aliased into it), so all handles from the
//! cleared lifetime become end handles rather than stale ones.

use std::collections::{HashMap, VecDeque};

use super::{remove_arc_ref, Digraph};
use crate::error::Result;
use crate::store::handle::{GraphId, NodeHandle};

impl<N, A> Digraph<N, A> {
    /// Moves the entire contents of `source` into this graph, leaving
    /// `source` empty under a fresh identity.
    ///
    /// Handles issued by `source` before the move (including handles it had
    /// itself absorbed through earlier transplants) resolve against this
    /// graph afterwards; against the emptied `source` they report
    /// `WrongOwner`. Node and arc storage order of the moved contents is
    /// preserved, appended after this graph's existing slots.
    pub fn move_from(&mut self, source: &mut Self) {
        let fresh = GraphId::fresh();
        let nodes = source.nodes.drain(fresh);
        let arcs = source.arcs.drain(fresh);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            source = nodes.owner.get(),
            dest = self.id().get(),
            nodes = nodes.slots.len(),
            arcs = arcs.slots.len(),
            "moving graph contents"
        );

        let mut node_map = HashMap::with_capacity(nodes.slots.len());
        let mut adopted = Vec::with_capacity(nodes.slots.len());
        for (old, generation, record) in nodes.slots {
            let new = self.nodes.adopt(record, generation);
            self.nodes.alias(nodes.owner, old, new);
            node_map.insert(old, new);
            adopted.push(new);
        }

        let mut arc_map = HashMap::with_capacity(arcs.slots.len());
        for (old, generation, mut record) in arcs.slots {
            record.from = node_map[&record.from];
            record.to = node_map[&record.to];
            let new = self.arcs.adopt(record, generation);
            self.arcs.alias(arcs.owner, old, new);
            arc_map.insert(old, new);
        }

        // The adopted adjacency lists still reference source arc indices.
        for &idx in &adopted {
            let record = self.nodes.get_at_mut(idx);
            for arc in &mut record.outputs {
                *arc = arc_map[arc];
            }
            for arc in &mut record.inputs {
                *arc = arc_map[arc];
            }
        }

        // Fold in the source's own alias table (handles it had absorbed from
        // even earlier owners) and its retired lifetimes.
        for ((owner, foreign), local) in nodes.aliases {
            self.nodes.alias(owner, foreign, node_map[&local]);
        }
        for ((owner, foreign), local) in arcs.aliases {
            self.arcs.alias(owner, foreign, arc_map[&local]);
        }
        self.nodes.merge_retired(nodes.retired);
        self.arcs.merge_retired(arcs.retired);
    }

    /// Cuts out the subgraph reachable from `root` (following outgoing
    /// arcs, `root` included) into a new graph.
    ///
    /// Arcs internal to the cut set move with it; arcs crossing the boundary
    /// in either direction are erased, and the handles to them become stale.
    /// Handles to moved nodes and arcs resolve against the returned graph.
    ///
    /// # Errors
    /// Handle errors for `root`.
    pub fn cut(&mut self, root: NodeHandle) -> Result<Self> {
        let root_idx = self.nodes.resolve(root)?;
        let node_bound = self.nodes.slot_bound() as usize;
        let arc_bound = self.arcs.slot_bound() as usize;

        let mut member = vec![false; node_bound];
        member[root_idx as usize] = true;
        let mut queue = VecDeque::from([root_idx]);
        while let Some(u) = queue.pop_front() {
            for &arc in &self.nodes.get_at(u).outputs {
                let v = self.arcs.get_at(arc).to;
                if !member[v as usize] {
                    member[v as usize] = true;
                    queue.push_back(v);
                }
            }
        }

        let mut internal = vec![false; arc_bound];
        let mut boundary = Vec::new();
        for arc in self.arcs.indices() {
            let record = self.arcs.get_at(arc);
            match (member[record.from as usize], member[record.to as usize]) {
                (true, true) => internal[arc as usize] = true,
                (false, false) => {}
                _ => boundary.push(arc),
            }
        }

        // Boundary arcs are erased while both endpoints are still present.
        for arc in boundary {
            let record = self.arcs.free_index(arc);
            remove_arc_ref(&mut self.nodes.get_at_mut(record.from).outputs, arc);
            remove_arc_ref(&mut self.nodes.get_at_mut(record.to).inputs, arc);
        }

        let owner = self.id();
        let mut cutting = Self::new();

        #[cfg(feature = "tracing")]
        tracing::debug!(
            source = owner.get(),
            dest = cutting.id().get(),
            nodes = member.iter().filter(|&&m| m).count(),
            "cutting subgraph"
        );

        let members: Vec<u32> = self.nodes.indices().filter(|&i| member[i as usize]).collect();
        let mut node_map = HashMap::with_capacity(members.len());
        for old in members {
            let generation = self.nodes.generation_at(old);
            let record = self.nodes.free_index(old);
            let new = cutting.nodes.adopt(record, generation);
            cutting.nodes.alias(owner, old, new);
            node_map.insert(old, new);
        }

        let internals: Vec<u32> = (0..arc_bound as u32)
            .filter(|&i| internal[i as usize])
            .collect();
        let mut arc_map = HashMap::with_capacity(internals.len());
        for old in internals {
            let generation = self.arcs.generation_at(old);
            let mut record = self.arcs.free_index(old);
            record.from = node_map[&record.from];
            record.to = node_map[&record.to];
            let new = cutting.arcs.adopt(record, generation);
            cutting.arcs.alias(owner, old, new);
            arc_map.insert(old, new);
        }

        for &new in node_map.values() {
            let record = cutting.nodes.get_at_mut(new);
            for arc in &mut record.outputs {
                *arc = arc_map[arc];
            }
            for arc in &mut record.inputs {
                *arc = arc_map[arc];
            }
        }

        // Aliases absorbed from earlier transplants follow the slots they
        // point at.
        for ((o, foreign), local) in self
            .nodes
            .extract_aliases(|local| node_map.contains_key(&local))
        {
            cutting.nodes.alias(o, foreign, node_map[&local]);
        }
        for ((o, foreign), local) in self
            .arcs
            .extract_aliases(|local| arc_map.contains_key(&local))
        {
            cutting.arcs.alias(o, foreign, arc_map[&local]);
        }

        Ok(cutting)
    }

    /// Erases everything and retires the current identity; the graph
    /// continues empty under a fresh one.
    ///
    /// Unlike [`Digraph::erase`], which makes handles stale, `clear` makes
    /// every handle from the cleared lifetime an *end* handle
    /// ([`Digraph::is_end`] is true and stays true).
    pub fn clear(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            graph = self.id().get(),
            nodes = self.node_count(),
            arcs = self.arc_count(),
            "clearing graph"
        );
        let fresh = GraphId::fresh();
        self.nodes.clear_retiring(fresh);
        self.arcs.clear_retiring(fresh);
    }

    /// Erases every node reachable from `parent` through outgoing arcs,
    /// excluding `parent` itself, along with all their incident arcs.
    /// Returns the number of nodes erased. Descendants that are also
    /// reachable from outside the `parent` subtree are erased regardless.
    ///
    /// # Errors
    /// Handle errors for `parent`.
    pub fn erase_children(&mut self, parent: NodeHandle) -> Result<usize> {
        let p = self.nodes.resolve(parent)?;
        let mut marked = vec![false; self.nodes.slot_bound() as usize];
        marked[p as usize] = true;
        let mut queue = VecDeque::from([p]);
        let mut doomed = Vec::new();
        while let Some(u) = queue.pop_front() {
            for &arc in &self.nodes.get_at(u).outputs {
                let v = self.arcs.get_at(arc).to;
                if !marked[v as usize] {
                    marked[v as usize] = true;
                    doomed.push(v);
                    queue.push_back(v);
                }
            }
        }
        let count = doomed.len();
        for idx in doomed {
            self.erase_node_index(idx);
        }
        Ok(count)
    }
}
