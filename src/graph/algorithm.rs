//! Read-only graph algorithms: adjacency, reachability, path enumeration,
//! shortest paths and topological sorts.
//!
//! None of these mutate the graph. Tie-breaks are deterministic everywhere:
//! nodes are considered in storage order and arcs in adjacency (insertion)
//! order. An empty graph yields empty results, never errors; handle-taking
//! algorithms still validate their handle arguments.
//!
//! The sorts take an arc predicate so callers can project a DAG out of a
//! cyclic graph (e.g. by sign of the arc payload) without mutating it:
//!
//! - [`Digraph::sort`] orders *every* node (depth-first reverse postorder)
//!   and reports the predicate-passing arcs that point backwards in that
//!   order, i.e. the arcs that break acyclicity;
//! - [`Digraph::dag_sort`] is Kahn's algorithm on the filtered subgraph and
//!   silently omits nodes trapped in a cycle. `sort` is the diagnostic API.

use std::collections::VecDeque;

use super::Digraph;
use crate::error::Result;
use crate::store::handle::{ArcHandle, NodeHandle};

impl<N, A> Digraph<N, A> {
    /// True iff an arc runs from `from` to `to`. O(fanout of `from`).
    /// A trivial path does not count: without an explicit self-loop arc,
    /// `adjacent(a, a)` is false.
    pub fn adjacent(&self, from: NodeHandle, to: NodeHandle) -> Result<bool> {
        let from_idx = self.nodes.resolve(from)?;
        let to_idx = self.nodes.resolve(to)?;
        Ok(self
            .nodes
            .get_at(from_idx)
            .outputs
            .iter()
            .any(|&arc| self.arcs.get_at(arc).to == to_idx))
    }

    /// True iff a directed path (following outgoing arcs) leads from `from`
    /// to `to`. Every node reaches itself via the zero-length path.
    pub fn path_exists(&self, from: NodeHandle, to: NodeHandle) -> Result<bool> {
        let from_idx = self.nodes.resolve(from)?;
        let to_idx = self.nodes.resolve(to)?;
        if from_idx == to_idx {
            return Ok(true);
        }
        let mut seen = vec![false; self.nodes.slot_bound() as usize];
        let mut queue = VecDeque::from([from_idx]);
        seen[from_idx as usize] = true;
        while let Some(u) = queue.pop_front() {
            for &arc in &self.nodes.get_at(u).outputs {
                let v = self.arcs.get_at(arc).to;
                if v == to_idx {
                    return Ok(true);
                }
                if !seen[v as usize] {
                    seen[v as usize] = true;
                    queue.push_back(v);
                }
            }
        }
        Ok(false)
    }

    /// Every simple (non-repeating-node) directed path from `from` to `to`,
    /// each as a node sequence starting with `from` and ending with `to`.
    ///
    /// `all_paths(a, a)` is exactly the zero-length path `[a]`, matching
    /// [`Digraph::path_exists`]: the result is empty iff no path exists.
    ///
    /// The enumeration is an exhaustive depth-first search with a visited
    /// set per branch (paths may share prefixes). The number of simple
    /// paths can grow exponentially with graph density; callers must bound
    /// graph size if that matters.
    pub fn all_paths(&self, from: NodeHandle, to: NodeHandle) -> Result<Vec<Vec<NodeHandle>>> {
        let from_idx = self.nodes.resolve(from)?;
        let to_idx = self.nodes.resolve(to)?;
        if from_idx == to_idx {
            return Ok(vec![vec![self.nodes.handle_at(from_idx)]]);
        }
        let mut visited = vec![false; self.nodes.slot_bound() as usize];
        let mut path = vec![from_idx];
        let mut found = Vec::new();
        self.extend_paths(from_idx, to_idx, &mut visited, &mut path, &mut found);
        Ok(found
            .into_iter()
            .map(|indices| {
                indices
                    .into_iter()
                    .map(|i| self.nodes.handle_at(i))
                    .collect()
            })
            .collect())
    }

    fn extend_paths(
        &self,
        u: u32,
        target: u32,
        visited: &mut [bool],
        path: &mut Vec<u32>,
        found: &mut Vec<Vec<u32>>,
    ) {
        visited[u as usize] = true;
        for &arc in &self.nodes.get_at(u).outputs {
            let v = self.arcs.get_at(arc).to;
            if v == target {
                let mut complete = path.clone();
                complete.push(v);
                found.push(complete);
            } else if !visited[v as usize] {
                path.push(v);
                self.extend_paths(v, target, visited, path, found);
                path.pop();
            }
        }
        visited[u as usize] = false;
    }

    /// A minimum-arc-count path from `from` to `to` as a node sequence,
    /// found by breadth-first search; ties are broken by arc insertion
    /// order during expansion. Empty when unreachable; `[a]` for
    /// `shortest_path(a, a)`.
    pub fn shortest_path(&self, from: NodeHandle, to: NodeHandle) -> Result<Vec<NodeHandle>> {
        let from_idx = self.nodes.resolve(from)?;
        let to_idx = self.nodes.resolve(to)?;
        if from_idx == to_idx {
            return Ok(vec![self.nodes.handle_at(from_idx)]);
        }
        let bound = self.nodes.slot_bound() as usize;
        let mut pred: Vec<Option<u32>> = vec![None; bound];
        let mut seen = vec![false; bound];
        seen[from_idx as usize] = true;
        let mut queue = VecDeque::from([from_idx]);
        'search: while let Some(u) = queue.pop_front() {
            for &arc in &self.nodes.get_at(u).outputs {
                let v = self.arcs.get_at(arc).to;
                if !seen[v as usize] {
                    seen[v as usize] = true;
                    pred[v as usize] = Some(u);
                    if v == to_idx {
                        break 'search;
                    }
                    queue.push_back(v);
                }
            }
        }
        if !seen[to_idx as usize] {
            return Ok(Vec::new());
        }
        let mut indices = vec![to_idx];
        let mut cursor = to_idx;
        while let Some(p) = pred[cursor as usize] {
            indices.push(p);
            cursor = p;
        }
        indices.reverse();
        Ok(indices
            .into_iter()
            .map(|i| self.nodes.handle_at(i))
            .collect())
    }

    /// The arcs of a single-source shortest-path tree rooted at `from`,
    /// in discovery order, considering only arcs for which
    /// `select(graph, arc)` is true. The predicate lets callers exclude
    /// arcs (e.g. by sign of the payload) without mutating the graph.
    pub fn shortest_paths<P>(&self, from: NodeHandle, mut select: P) -> Result<Vec<ArcHandle>>
    where
        P: FnMut(&Self, ArcHandle) -> bool,
    {
        let from_idx = self.nodes.resolve(from)?;
        let mut seen = vec![false; self.nodes.slot_bound() as usize];
        seen[from_idx as usize] = true;
        let mut queue = VecDeque::from([from_idx]);
        let mut tree = Vec::new();
        while let Some(u) = queue.pop_front() {
            for &arc in &self.nodes.get_at(u).outputs {
                if !select(self, self.arcs.handle_at(arc)) {
                    continue;
                }
                let v = self.arcs.get_at(arc).to;
                if !seen[v as usize] {
                    seen[v as usize] = true;
                    tree.push(arc);
                    queue.push_back(v);
                }
            }
        }
        Ok(tree.into_iter().map(|a| self.arcs.handle_at(a)).collect())
    }

    /// The nodes reachable from `from` through one or more arcs, in
    /// breadth-first discovery order. `from` itself appears only when a
    /// cycle (or self-loop) returns to it.
    pub fn reachable_nodes(&self, from: NodeHandle) -> Result<Vec<NodeHandle>> {
        let from_idx = self.nodes.resolve(from)?;
        Ok(self
            .closure(from_idx, |record| &record.outputs, |arc| arc.to)
            .into_iter()
            .map(|i| self.nodes.handle_at(i))
            .collect())
    }

    /// The nodes from which `to` is reachable through one or more arcs, in
    /// breadth-first discovery order over incoming arcs. `to` itself
    /// appears only when a cycle (or self-loop) returns to it.
    pub fn reaching_nodes(&self, to: NodeHandle) -> Result<Vec<NodeHandle>> {
        let to_idx = self.nodes.resolve(to)?;
        Ok(self
            .closure(to_idx, |record| &record.inputs, |arc| arc.from)
            .into_iter()
            .map(|i| self.nodes.handle_at(i))
            .collect())
    }

    fn closure(
        &self,
        start: u32,
        arcs_of: impl Fn(&super::NodeRecord<N>) -> &Vec<u32>,
        step: impl Fn(&super::ArcRecord<A>) -> u32,
    ) -> Vec<u32> {
        let mut discovered = vec![false; self.nodes.slot_bound() as usize];
        let mut queue = VecDeque::from([start]);
        let mut result = Vec::new();
        while let Some(u) = queue.pop_front() {
            for &arc in arcs_of(self.nodes.get_at(u)) {
                let v = step(self.arcs.get_at(arc));
                if !discovered[v as usize] {
                    discovered[v as usize] = true;
                    result.push(v);
                    queue.push_back(v);
                }
            }
        }
        result
    }

    /// Topological sort of *all* nodes over the arcs passing `select`,
    /// with structural cycle reporting.
    ///
    /// The first output is a depth-first reverse postorder (roots taken in
    /// storage order, arcs in adjacency order), which is a valid topological
    /// order of the filtered graph minus its cycle-forming arcs. The second
    /// output lists exactly those arcs: the selected arcs that point
    /// backwards (or to the same position, for self-loops) in the returned
    /// order. A cyclic input is not an error; the blocking arcs are the
    /// diagnosis.
    pub fn sort<P>(&self, mut select: P) -> (Vec<NodeHandle>, Vec<ArcHandle>)
    where
        P: FnMut(&Self, ArcHandle) -> bool,
    {
        let bound = self.nodes.slot_bound() as usize;
        let mut visited = vec![false; bound];
        let mut postorder: Vec<u32> = Vec::with_capacity(self.node_count());
        for root in self.nodes.indices() {
            if visited[root as usize] {
                continue;
            }
            visited[root as usize] = true;
            let mut stack: Vec<(u32, usize)> = vec![(root, 0)];
            while let Some(top) = stack.last_mut() {
                let u = top.0;
                let outputs = &self.nodes.get_at(u).outputs;
                if top.1 < outputs.len() {
                    let arc = outputs[top.1];
                    top.1 += 1;
                    if !select(self, self.arcs.handle_at(arc)) {
                        continue;
                    }
                    let v = self.arcs.get_at(arc).to;
                    if !visited[v as usize] {
                        visited[v as usize] = true;
                        stack.push((v, 0));
                    }
                } else {
                    stack.pop();
                    postorder.push(u);
                }
            }
        }
        let order: Vec<u32> = postorder.into_iter().rev().collect();
        let mut pos = vec![0usize; bound];
        for (p, &u) in order.iter().enumerate() {
            pos[u as usize] = p;
        }
        let mut errors = Vec::new();
        for arc in self.arcs.indices() {
            let record = self.arcs.get_at(arc);
            if select(self, self.arcs.handle_at(arc))
                && pos[record.from as usize] >= pos[record.to as usize]
            {
                errors.push(arc);
            }
        }
        (
            order.into_iter().map(|i| self.nodes.handle_at(i)).collect(),
            errors
                .into_iter()
                .map(|a| self.arcs.handle_at(a))
                .collect(),
        )
    }

    /// Topological order over the arcs passing `select`, assuming the
    /// filtered subgraph is acyclic (Kahn's algorithm, queue seeded and
    /// expanded in storage/adjacency order). Nodes trapped in a cycle are
    /// silently omitted from the result; use [`Digraph::sort`] for cycle
    /// diagnostics.
    pub fn dag_sort<P>(&self, mut select: P) -> Vec<NodeHandle>
    where
        P: FnMut(&Self, ArcHandle) -> bool,
    {
        let bound = self.nodes.slot_bound() as usize;
        let mut indegree = vec![0usize; bound];
        for arc in self.arcs.indices() {
            if select(self, self.arcs.handle_at(arc)) {
                indegree[self.arcs.get_at(arc).to as usize] += 1;
            }
        }
        let mut queue: VecDeque<u32> = self
            .nodes
            .indices()
            .filter(|&u| indegree[u as usize] == 0)
            .collect();
        let mut order = Vec::with_capacity(self.node_count());
        while let Some(u) = queue.pop_front() {
            order.push(u);
            for &arc in &self.nodes.get_at(u).outputs {
                if !select(self, self.arcs.handle_at(arc)) {
                    continue;
                }
                let v = self.arcs.get_at(arc).to;
                indegree[v as usize] -= 1;
                if indegree[v as usize] == 0 {
                    queue.push_back(v);
                }
            }
        }
        order.into_iter().map(|i| self.nodes.handle_at(i)).collect()
    }
}
