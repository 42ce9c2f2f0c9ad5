//! Lazy traversal iterators.
//!
//! [`Nodes`] and [`Arcs`] walk the whole container in storage order (stable
//! across reads, independent of erasures elsewhere). [`Dfs`] and [`Bfs`]
//! walk the subgraph reachable from a start node, expanding outgoing arcs in
//! adjacency order, so traversal order is deterministic for a given graph
//! history. All four borrow the graph immutably and allocate only their own
//! bookkeeping.

use std::collections::VecDeque;

use super::Digraph;
use crate::error::Result;
use crate::store::handle::{ArcHandle, NodeHandle};

/// Iterator over every live node, in storage order.
pub struct Nodes<'a, N, A> {
    graph: &'a Digraph<N, A>,
    cursor: u32,
}

impl<N, A> Iterator for Nodes<'_, N, A> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        while self.cursor < self.graph.nodes.slot_bound() {
            let idx = self.cursor;
            self.cursor += 1;
            if self.graph.nodes.occupied(idx) {
                return Some(self.graph.nodes.handle_at(idx));
            }
        }
        None
    }
}

/// Iterator over every live arc, in storage order.
pub struct Arcs<'a, N, A> {
    graph: &'a Digraph<N, A>,
    cursor: u32,
}

impl<N, A> Iterator for Arcs<'_, N, A> {
    type Item = ArcHandle;

    fn next(&mut self) -> Option<ArcHandle> {
        while self.cursor < self.graph.arcs.slot_bound() {
            let idx = self.cursor;
            self.cursor += 1;
            if self.graph.arcs.occupied(idx) {
                return Some(self.graph.arcs.handle_at(idx));
            }
        }
        None
    }
}

#[derive(Clone, Copy)]
enum DfsOrder {
    Pre,
    Post,
}

/// Depth-first traversal from a start node, in either preorder or
/// postorder (see [`Digraph::dfs_pre`] / [`Digraph::dfs_post`]).
pub struct Dfs<'a, N, A> {
    graph: &'a Digraph<N, A>,
    stack: Vec<(u32, usize)>,
    visited: Vec<bool>,
    order: DfsOrder,
    pending_root: Option<u32>,
}

impl<N, A> Iterator for Dfs<'_, N, A> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        if let Some(root) = self.pending_root.take() {
            return Some(self.graph.nodes.handle_at(root));
        }
        while let Some(top) = self.stack.last_mut() {
            let u = top.0;
            let outputs = &self.graph.nodes.get_at(u).outputs;
            if top.1 < outputs.len() {
                let arc = outputs[top.1];
                top.1 += 1;
                let v = self.graph.arcs.get_at(arc).to;
                if !self.visited[v as usize] {
                    self.visited[v as usize] = true;
                    self.stack.push((v, 0));
                    if let DfsOrder::Pre = self.order {
                        return Some(self.graph.nodes.handle_at(v));
                    }
                }
            } else {
                self.stack.pop();
                if let DfsOrder::Post = self.order {
                    return Some(self.graph.nodes.handle_at(u));
                }
            }
        }
        None
    }
}

/// Breadth-first traversal from a start node, in discovery order
/// (see [`Digraph::bfs`]).
pub struct Bfs<'a, N, A> {
    graph: &'a Digraph<N, A>,
    queue: VecDeque<u32>,
    visited: Vec<bool>,
}

impl<N, A> Iterator for Bfs<'_, N, A> {
    type Item = NodeHandle;

    fn next(&mut self) -> Option<NodeHandle> {
        let u = self.queue.pop_front()?;
        for &arc in &self.graph.nodes.get_at(u).outputs {
            let v = self.graph.arcs.get_at(arc).to;
            if !self.visited[v as usize] {
                self.visited[v as usize] = true;
                self.queue.push_back(v);
            }
        }
        Some(self.graph.nodes.handle_at(u))
    }
}

// Manual Clone impls: the payload types need not be Clone to clone a
// borrowing iterator.
impl<N, A> Clone for Nodes<'_, N, A> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            cursor: self.cursor,
        }
    }
}

impl<N, A> Clone for Arcs<'_, N, A> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            cursor: self.cursor,
        }
    }
}

impl<N, A> Clone for Dfs<'_, N, A> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            stack: self.stack.clone(),
            visited: self.visited.clone(),
            order: self.order,
            pending_root: self.pending_root,
        }
    }
}

impl<N, A> Clone for Bfs<'_, N, A> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph,
            queue: self.queue.clone(),
            visited: self.visited.clone(),
        }
    }
}

impl<N, A> Digraph<N, A> {
    /// Iterates over every live node, in storage order.
    pub fn nodes(&self) -> Nodes<'_, N, A> {
        Nodes {
            graph: self,
            cursor: 0,
        }
    }

    /// Iterates over every live arc, in storage order.
    pub fn arcs(&self) -> Arcs<'_, N, A> {
        Arcs {
            graph: self,
            cursor: 0,
        }
    }

    /// Depth-first preorder traversal of the nodes reachable from `start`
    /// (inclusive): each node is yielded when first discovered.
    ///
    /// # Errors
    /// Handle errors for `start`.
    pub fn dfs_pre(&self, start: NodeHandle) -> Result<Dfs<'_, N, A>> {
        self.dfs(start, DfsOrder::Pre)
    }

    /// Depth-first postorder traversal of the nodes reachable from `start`
    /// (inclusive): each node is yielded after all of its descendants.
    ///
    /// # Errors
    /// Handle errors for `start`.
    pub fn dfs_post(&self, start: NodeHandle) -> Result<Dfs<'_, N, A>> {
        self.dfs(start, DfsOrder::Post)
    }

    fn dfs(&self, start: NodeHandle, order: DfsOrder) -> Result<Dfs<'_, N, A>> {
        let idx = self.nodes.resolve(start)?;
        let mut visited = vec![false; self.nodes.slot_bound() as usize];
        visited[idx as usize] = true;
        let pending_root = match order {
            DfsOrder::Pre => Some(idx),
            DfsOrder::Post => None,
        };
        Ok(Dfs {
            graph: self,
            stack: vec![(idx, 0)],
            visited,
            order,
            pending_root,
        })
    }

    /// Breadth-first traversal of the nodes reachable from `start`
    /// (inclusive), in discovery order.
    ///
    /// # Errors
    /// Handle errors for `start`.
    pub fn bfs(&self, start: NodeHandle) -> Result<Bfs<'_, N, A>> {
        let idx = self.nodes.resolve(start)?;
        let mut visited = vec![false; self.nodes.slot_bound() as usize];
        visited[idx as usize] = true;
        Ok(Bfs {
            graph: self,
            queue: VecDeque::from([idx]),
            visited,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Digraph;

    #[test]
    fn storage_order_survives_erasure() {
        let mut g: Digraph<u32, ()> = Digraph::new();
        let n: Vec<_> = (0..4).map(|i| g.insert(i)).collect();
        g.erase(n[1]).unwrap();
        let seen: Vec<_> = g.nodes().collect();
        assert_eq!(seen, vec![n[0], n[2], n[3]]);
        assert_eq!(g.arcs().count(), 0);
    }

    #[test]
    fn dfs_orders_on_a_small_tree() {
        // root -> (left -> leaf), root -> right
        let mut g: Digraph<&str, ()> = Digraph::new();
        let root = g.insert("root");
        let left = g.insert("left");
        let right = g.insert("right");
        let leaf = g.insert("leaf");
        g.arc_insert(root, left, ()).unwrap();
        g.arc_insert(root, right, ()).unwrap();
        g.arc_insert(left, leaf, ()).unwrap();

        let pre: Vec<_> = g.dfs_pre(root).unwrap().collect();
        assert_eq!(pre, vec![root, left, leaf, right]);

        let post: Vec<_> = g.dfs_post(root).unwrap().collect();
        assert_eq!(post, vec![leaf, left, right, root]);
    }

    #[test]
    fn bfs_discovers_level_by_level() {
        let mut g: Digraph<u32, ()> = Digraph::new();
        let n: Vec<_> = (0..5).map(|i| g.insert(i)).collect();
        g.arc_insert(n[0], n[1], ()).unwrap();
        g.arc_insert(n[0], n[2], ()).unwrap();
        g.arc_insert(n[1], n[3], ()).unwrap();
        g.arc_insert(n[2], n[4], ()).unwrap();
        g.arc_insert(n[4], n[0], ()).unwrap(); // cycle back, visited once

        let order: Vec<_> = g.bfs(n[0]).unwrap().collect();
        assert_eq!(order, vec![n[0], n[1], n[2], n[3], n[4]]);
    }

    #[test]
    fn traversal_handles_self_loops() {
        let mut g: Digraph<(), ()> = Digraph::new();
        let n = g.insert(());
        g.arc_insert(n, n, ()).unwrap();
        assert_eq!(g.dfs_pre(n).unwrap().collect::<Vec<_>>(), vec![n]);
        assert_eq!(g.bfs(n).unwrap().collect::<Vec<_>>(), vec![n]);
    }
}
