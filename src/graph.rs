//! Generic directed graph used to hold tracking lineages.
//!
//! Nodes are keyed by [`NodeId`] and carry an arbitrary payload. Edges are
//! directed from `head` (earlier frame) to `tail` (later frame) and are
//! kept in insertion order on both endpoints. The graph itself enforces no
//! acyclicity or temporal ordering; the tracker only ever links forward in
//! time.

use std::collections::HashMap;

use crate::{Error, NodeId, Result};

/// Identifier of a graph edge, unique for the lifetime of a graph.
pub type EdgeId = usize;

/// A graph node with its payload and incident edges.
#[derive(Debug, Clone)]
pub struct Node<N> {
    pub id: NodeId,
    pub data: N,
    in_edges: Vec<EdgeId>,
    out_edges: Vec<EdgeId>,
}

/// A directed edge `head -> tail`.
#[derive(Debug, Clone)]
pub struct Edge<E> {
    pub id: EdgeId,
    pub head: NodeId,
    pub tail: NodeId,
    pub data: Option<E>,
}

/// Directed multigraph with per-node payloads.
#[derive(Debug, Clone)]
pub struct Graph<N, E = ()> {
    nodes: HashMap<NodeId, Node<N>>,
    edges: HashMap<EdgeId, Edge<E>>,
    next_edge_id: EdgeId,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            next_edge_id: 0,
        }
    }
}

impl<N, E> Graph<N, E> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Fails if the id is already present.
    pub fn add_node(&mut self, id: NodeId, data: N) -> Result<()> {
        if self.nodes.contains_key(&id) {
            return Err(Error::DuplicateNode(id));
        }

        self.nodes.insert(
            id,
            Node {
                id,
                data,
                in_edges: Vec::new(),
                out_edges: Vec::new(),
            },
        );
        Ok(())
    }

    /// Add a directed edge `head -> tail` and return its id.
    pub fn add_edge(&mut self, head: NodeId, tail: NodeId, data: Option<E>) -> Result<EdgeId> {
        if !self.nodes.contains_key(&head) {
            return Err(Error::UnknownNode(head));
        }
        if !self.nodes.contains_key(&tail) {
            return Err(Error::UnknownNode(tail));
        }

        let id = self.next_edge_id;
        self.next_edge_id += 1;

        self.edges.insert(id, Edge { id, head, tail, data });
        self.node_mut(&head)?.out_edges.push(id);
        self.node_mut(&tail)?.in_edges.push(id);

        Ok(id)
    }

    /// Remove a node with all its incident edges and return its payload.
    pub fn delete_node(&mut self, id: &NodeId) -> Result<N> {
        let node = self.nodes.remove(id).ok_or(Error::UnknownNode(*id))?;

        for edge_id in node.in_edges.iter().chain(node.out_edges.iter()) {
            let Some(edge) = self.edges.remove(edge_id) else {
                // Self-loop: already removed via the other list.
                continue;
            };
            let other = if edge.head == *id { edge.tail } else { edge.head };
            if let Some(neighbor) = self.nodes.get_mut(&other) {
                neighbor.in_edges.retain(|e| e != edge_id);
                neighbor.out_edges.retain(|e| e != edge_id);
            }
        }

        Ok(node.data)
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// All node ids, in no particular order.
    pub fn node_list(&self) -> Vec<NodeId> {
        self.nodes.keys().copied().collect()
    }

    /// Nodes without incoming edges, sorted by id (chronologically).
    pub fn roots(&self) -> Vec<NodeId> {
        let mut roots: Vec<NodeId> = self
            .nodes
            .values()
            .filter(|node| node.in_edges.is_empty())
            .map(|node| node.id)
            .collect();
        roots.sort();
        roots
    }

    pub fn node(&self, id: &NodeId) -> Result<&Node<N>> {
        self.nodes.get(id).ok_or(Error::UnknownNode(*id))
    }

    fn node_mut(&mut self, id: &NodeId) -> Result<&mut Node<N>> {
        self.nodes.get_mut(id).ok_or(Error::UnknownNode(*id))
    }

    pub fn node_data(&self, id: &NodeId) -> Result<&N> {
        Ok(&self.node(id)?.data)
    }

    /// Mutable payload access, used by annotation stages (e.g. classification)
    /// once tracking is complete.
    pub fn node_data_mut(&mut self, id: &NodeId) -> Result<&mut N> {
        Ok(&mut self.node_mut(id)?.data)
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge<E>> {
        self.edges.get(&id).ok_or(Error::UnknownEdge(id))
    }

    pub fn edge_data(&self, id: EdgeId) -> Result<Option<&E>> {
        Ok(self.edge(id)?.data.as_ref())
    }

    /// Source node of an edge.
    pub fn head(&self, id: EdgeId) -> Result<NodeId> {
        Ok(self.edge(id)?.head)
    }

    /// Target node of an edge.
    pub fn tail(&self, id: EdgeId) -> Result<NodeId> {
        Ok(self.edge(id)?.tail)
    }

    pub fn in_degree(&self, id: &NodeId) -> Result<usize> {
        Ok(self.node(id)?.in_edges.len())
    }

    pub fn out_degree(&self, id: &NodeId) -> Result<usize> {
        Ok(self.node(id)?.out_edges.len())
    }

    /// Incoming edge ids in insertion order (a snapshot copy).
    pub fn in_arcs(&self, id: &NodeId) -> Result<Vec<EdgeId>> {
        Ok(self.node(id)?.in_edges.clone())
    }

    /// Outgoing edge ids in insertion order (a snapshot copy).
    pub fn out_arcs(&self, id: &NodeId) -> Result<Vec<EdgeId>> {
        Ok(self.node(id)?.out_edges.clone())
    }

    /// Tails of the outgoing edges, in edge insertion order.
    pub fn successors(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        self.node(id)?
            .out_edges
            .iter()
            .map(|&edge_id| self.tail(edge_id))
            .collect()
    }

    /// Heads of the incoming edges, in edge insertion order.
    pub fn predecessors(&self, id: &NodeId) -> Result<Vec<NodeId>> {
        self.node(id)?
            .in_edges
            .iter()
            .map(|&edge_id| self.head(edge_id))
            .collect()
    }
}
