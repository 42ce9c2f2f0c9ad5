//! Dump/restore of graphs and handles to byte streams.
//!
//! A graph is written as node and arc sections with little-endian `u32`
//! framing: the node count, then each node payload as a length-prefixed
//! frame in storage order; the arc count, then each arc as source ordinal,
//! target ordinal and a payload frame. Ordinals are positions in storage
//! order, so slot indices and generations never leave the process and a
//! restored graph is compact regardless of the original's free-list state.
//!
//! Payload encoding is delegated to caller hooks (`&N -> Vec<u8>` and back),
//! with [`DumpContext::dump_digraph_json`] / [`RestoreContext::restore_digraph_json`]
//! as `serde_json`-backed conveniences for `Serialize`/`Deserialize` payloads.
//!
//! Handles can be persisted alongside the graph they reference: the context
//! remembers the ordinal mapping of the last graph it processed, so
//! [`DumpContext::dump_node_handle`] writes an ordinal (`u32::MAX` for the
//! null sentinel) and [`RestoreContext::restore_node_handle`] returns a
//! handle that is live against the restored graph.

use std::collections::HashMap;
use std::io::{self, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::graph::Digraph;
use crate::store::handle::{ArcHandle, NodeHandle};

const NULL_ORDINAL: u32 = u32::MAX;

/// Serializer state: a sink plus the ordinal maps of the last dumped graph.
pub struct DumpContext<W> {
    writer: W,
    node_ordinals: HashMap<u32, u32>,
    arc_ordinals: HashMap<u32, u32>,
}

impl<W: Write> DumpContext<W> {
    /// Wraps a sink.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            node_ordinals: HashMap::new(),
            arc_ordinals: HashMap::new(),
        }
    }

    /// Unwraps the sink.
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Writes a graph, using `dump_node` / `dump_arc` to encode payloads.
    /// Handles dumped afterwards resolve against this graph.
    ///
    /// # Errors
    /// I/O errors from the sink, and any error the hooks report.
    pub fn dump_digraph<N, A>(
        &mut self,
        graph: &Digraph<N, A>,
        dump_node: impl Fn(&N) -> io::Result<Vec<u8>>,
        dump_arc: impl Fn(&A) -> io::Result<Vec<u8>>,
    ) -> io::Result<()> {
        self.node_ordinals = graph
            .nodes
            .indices()
            .enumerate()
            .map(|(ord, idx)| (idx, ord as u32))
            .collect();
        self.arc_ordinals = graph
            .arcs
            .indices()
            .enumerate()
            .map(|(ord, idx)| (idx, ord as u32))
            .collect();

        self.write_u32(graph.node_count() as u32)?;
        for idx in graph.nodes.indices() {
            let bytes = dump_node(&graph.nodes.get_at(idx).payload)?;
            self.write_frame(&bytes)?;
        }

        self.write_u32(graph.arc_count() as u32)?;
        for idx in graph.arcs.indices() {
            let record = graph.arcs.get_at(idx);
            self.write_u32(self.node_ordinals[&record.from])?;
            self.write_u32(self.node_ordinals[&record.to])?;
            let bytes = dump_arc(&record.payload)?;
            self.write_frame(&bytes)?;
        }
        Ok(())
    }

    /// [`DumpContext::dump_digraph`] with `serde_json` payload encoding.
    ///
    /// # Errors
    /// I/O and JSON encoding errors.
    pub fn dump_digraph_json<N: Serialize, A: Serialize>(
        &mut self,
        graph: &Digraph<N, A>,
    ) -> io::Result<()> {
        self.dump_digraph(
            graph,
            |n| serde_json::to_vec(n).map_err(io::Error::from),
            |a| serde_json::to_vec(a).map_err(io::Error::from),
        )
    }

    /// Writes a node handle as an ordinal into the last dumped graph
    /// (`u32::MAX` for the null sentinel).
    ///
    /// # Errors
    /// `InvalidInput` when the handle does not reference a live node of the
    /// last graph passed to [`DumpContext::dump_digraph`].
    pub fn dump_node_handle<N, A>(
        &mut self,
        graph: &Digraph<N, A>,
        handle: NodeHandle,
    ) -> io::Result<()> {
        if handle.is_null() {
            return self.write_u32(NULL_ORDINAL);
        }
        let idx = graph
            .nodes
            .resolve(handle)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let ordinal = *self.node_ordinals.get(&idx).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "handle does not reference the dumped graph",
            )
        })?;
        self.write_u32(ordinal)
    }

    /// Arc counterpart of [`DumpContext::dump_node_handle`].
    ///
    /// # Errors
    /// As for the node variant.
    pub fn dump_arc_handle<N, A>(
        &mut self,
        graph: &Digraph<N, A>,
        handle: ArcHandle,
    ) -> io::Result<()> {
        if handle.is_null() {
            return self.write_u32(NULL_ORDINAL);
        }
        let idx = graph
            .arcs
            .resolve(handle)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let ordinal = *self.arc_ordinals.get(&idx).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "handle does not reference the dumped graph",
            )
        })?;
        self.write_u32(ordinal)
    }

    fn write_u32(&mut self, value: u32) -> io::Result<()> {
        self.writer.write_all(&value.to_le_bytes())
    }

    fn write_frame(&mut self, bytes: &[u8]) -> io::Result<()> {
        let len = u32::try_from(bytes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "payload frame too large"))?;
        self.write_u32(len)?;
        self.writer.write_all(bytes)
    }
}

/// Deserializer state: a source plus the handles of the last restored graph.
pub struct RestoreContext<R> {
    reader: R,
    node_handles: Vec<NodeHandle>,
    arc_handles: Vec<ArcHandle>,
}

impl<R: Read> RestoreContext<R> {
    /// Wraps a source.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            node_handles: Vec::new(),
            arc_handles: Vec::new(),
        }
    }

    /// Unwraps the source.
    pub fn into_inner(self) -> R {
        self.reader
    }

    /// Reads a graph written by [`DumpContext::dump_digraph`], using the
    /// hooks to decode payloads. The result is `equivalent` to the dumped
    /// graph; handles restored afterwards are live against it.
    ///
    /// # Errors
    /// I/O errors, hook errors, and `InvalidData` for malformed input
    /// (e.g. an arc referencing a node ordinal out of range).
    pub fn restore_digraph<N, A>(
        &mut self,
        restore_node: impl Fn(&[u8]) -> io::Result<N>,
        restore_arc: impl Fn(&[u8]) -> io::Result<A>,
    ) -> io::Result<Digraph<N, A>> {
        let mut graph = Digraph::new();

        let node_count = self.read_u32()?;
        let mut nodes = Vec::with_capacity(node_count as usize);
        for _ in 0..node_count {
            let bytes = self.read_frame()?;
            nodes.push(graph.insert(restore_node(&bytes)?));
        }

        let arc_count = self.read_u32()?;
        let mut arcs = Vec::with_capacity(arc_count as usize);
        for _ in 0..arc_count {
            let from_ord = self.read_u32()?;
            let to_ord = self.read_u32()?;
            let from = node_at(from_ord, &nodes)?;
            let to = node_at(to_ord, &nodes)?;
            let bytes = self.read_frame()?;
            let payload = restore_arc(&bytes)?;
            let handle = graph
                .arc_insert(from, to, payload)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            arcs.push(handle);
        }

        self.node_handles = nodes;
        self.arc_handles = arcs;
        Ok(graph)
    }

    /// [`RestoreContext::restore_digraph`] with `serde_json` payload
    /// decoding.
    ///
    /// # Errors
    /// I/O and JSON decoding errors.
    pub fn restore_digraph_json<N: DeserializeOwned, A: DeserializeOwned>(
        &mut self,
    ) -> io::Result<Digraph<N, A>> {
        self.restore_digraph(
            |bytes| serde_json::from_slice(bytes).map_err(io::Error::from),
            |bytes| serde_json::from_slice(bytes).map_err(io::Error::from),
        )
    }

    /// Reads a node handle written by [`DumpContext::dump_node_handle`],
    /// returning a handle live against the last restored graph (or the null
    /// sentinel).
    ///
    /// # Errors
    /// `InvalidData` when the ordinal is out of range for that graph.
    pub fn restore_node_handle(&mut self) -> io::Result<NodeHandle> {
        let ordinal = self.read_u32()?;
        if ordinal == NULL_ORDINAL {
            return Ok(NodeHandle::null());
        }
        self.node_handles
            .get(ordinal as usize)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "node ordinal out of range"))
    }

    /// Arc counterpart of [`RestoreContext::restore_node_handle`].
    ///
    /// # Errors
    /// As for the node variant.
    pub fn restore_arc_handle(&mut self) -> io::Result<ArcHandle> {
        let ordinal = self.read_u32()?;
        if ordinal == NULL_ORDINAL {
            return Ok(ArcHandle::null());
        }
        self.arc_handles
            .get(ordinal as usize)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "arc ordinal out of range"))
    }

    fn read_u32(&mut self) -> io::Result<u32> {
        let mut buf = [0u8; 4];
        self.reader.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    fn read_frame(&mut self) -> io::Result<Vec<u8>> {
        let len = self.read_u32()? as usize;
        let mut bytes = vec![0u8; len];
        self.reader.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}

fn node_at(ordinal: u32, nodes: &[NodeHandle]) -> io::Result<NodeHandle> {
    nodes.get(ordinal as usize).copied().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "arc endpoint ordinal out of range",
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Digraph<String, i32>, Vec<NodeHandle>, ArcHandle) {
        let mut g = Digraph::new();
        let a = g.insert("a".to_string());
        let b = g.insert("b".to_string());
        let c = g.insert("c".to_string());
        let ab = g.arc_insert(a, b, 1).unwrap();
        g.arc_insert(b, c, -2).unwrap();
        g.arc_insert(c, a, 3).unwrap();
        (g, vec![a, b, c], ab)
    }

    #[test]
    fn json_round_trip_is_equivalent() {
        let (g, _, _) = sample();
        let mut dump = DumpContext::new(Vec::new());
        dump.dump_digraph_json(&g).unwrap();
        let bytes = dump.into_inner();

        let mut restore = RestoreContext::new(bytes.as_slice());
        let back: Digraph<String, i32> = restore.restore_digraph_json().unwrap();
        assert!(g.equivalent(&back));
    }

    #[test]
    fn handles_round_trip_alongside_the_graph() {
        let (g, nodes, ab) = sample();
        let mut dump = DumpContext::new(Vec::new());
        dump.dump_digraph_json(&g).unwrap();
        dump.dump_node_handle(&g, nodes[2]).unwrap();
        dump.dump_node_handle(&g, NodeHandle::null()).unwrap();
        dump.dump_arc_handle(&g, ab).unwrap();
        let bytes = dump.into_inner();

        let mut restore = RestoreContext::new(bytes.as_slice());
        let back: Digraph<String, i32> = restore.restore_digraph_json().unwrap();
        let c = restore.restore_node_handle().unwrap();
        let null = restore.restore_node_handle().unwrap();
        let arc = restore.restore_arc_handle().unwrap();

        assert_eq!(*back.node(c).unwrap(), "c");
        assert!(null.is_null());
        assert_eq!(*back.arc(arc).unwrap(), 1);
    }

    #[test]
    fn compaction_survives_erased_slots() {
        let (mut g, nodes, _) = sample();
        g.erase(nodes[1]).unwrap();

        let mut dump = DumpContext::new(Vec::new());
        dump.dump_digraph_json(&g).unwrap();
        let bytes = dump.into_inner();

        let mut restore = RestoreContext::new(bytes.as_slice());
        let back: Digraph<String, i32> = restore.restore_digraph_json().unwrap();
        assert!(g.equivalent(&back));
        assert_eq!(back.node_count(), 2);
        assert_eq!(back.arc_count(), 1);
    }

    #[test]
    fn stale_handle_dump_is_rejected() {
        let (mut g, nodes, _) = sample();
        let mut dump = DumpContext::new(Vec::new());
        dump.dump_digraph_json(&g).unwrap();
        g.erase(nodes[0]).unwrap();
        let err = dump.dump_node_handle(&g, nodes[0]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn truncated_input_is_an_error() {
        let (g, _, _) = sample();
        let mut dump = DumpContext::new(Vec::new());
        dump.dump_digraph_json(&g).unwrap();
        let mut bytes = dump.into_inner();
        bytes.truncate(bytes.len() - 3);

        let mut restore = RestoreContext::new(bytes.as_slice());
        let result: io::Result<Digraph<String, i32>> = restore.restore_digraph_json();
        assert!(result.is_err());
    }
}
