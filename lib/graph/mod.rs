//! A simple directed graph over index-carrying vertices.
//!
//! Vertices own their indices and edges refer to vertices by index, so
//! cyclic structures (control-flow graphs with back edges) need no
//! special ownership handling.

use crate::error::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::fmt::Debug;

/// A vertex in a `Graph`.
pub trait Vertex: Clone + Debug {
    /// The index of this vertex, unique within its graph.
    fn index(&self) -> usize;
    fn dot_label(&self) -> String;
}

/// A directed edge in a `Graph`. `head` is the source vertex and `tail`
/// the destination vertex.
pub trait Edge: Clone + Debug {
    fn head(&self) -> usize;
    fn tail(&self) -> usize;
    fn dot_label(&self) -> String;
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Graph<V, E> {
    vertices: BTreeMap<usize, V>,
    edges: BTreeMap<(usize, usize), E>,
    edges_out: BTreeMap<usize, Vec<E>>,
    edges_in: BTreeMap<usize, Vec<E>>,
}

impl<V: Vertex, E: Edge + Eq> Graph<V, E> {
    pub fn new() -> Graph<V, E> {
        Graph {
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
            edges_out: BTreeMap::new(),
            edges_in: BTreeMap::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn has_vertex(&self, index: usize) -> bool {
        self.vertices.contains_key(&index)
    }

    pub fn insert_vertex(&mut self, vertex: V) -> Result<()> {
        let index = vertex.index();
        if self.vertices.contains_key(&index) {
            bail!(ErrorKind::Graph(format!(
                "vertex {} already in graph",
                index
            )));
        }
        self.vertices.insert(index, vertex);
        self.edges_out.insert(index, Vec::new());
        self.edges_in.insert(index, Vec::new());
        Ok(())
    }

    pub fn insert_edge(&mut self, edge: E) -> Result<()> {
        let head = edge.head();
        let tail = edge.tail();
        if !self.vertices.contains_key(&head) {
            bail!(ErrorKind::Graph(format!("head vertex {} not in graph", head)));
        }
        if !self.vertices.contains_key(&tail) {
            bail!(ErrorKind::Graph(format!("tail vertex {} not in graph", tail)));
        }
        if self.edges.contains_key(&(head, tail)) {
            bail!(ErrorKind::Graph(format!(
                "edge ({}, {}) already in graph",
                head, tail
            )));
        }
        self.edges.insert((head, tail), edge.clone());
        self.edges_out.get_mut(&head).unwrap().push(edge.clone());
        self.edges_in.get_mut(&tail).unwrap().push(edge);
        Ok(())
    }

    pub fn vertex(&self, index: usize) -> Result<&V> {
        self.vertices
            .get(&index)
            .ok_or_else(|| ErrorKind::Graph(format!("vertex {} not in graph", index)).into())
    }

    pub fn vertex_mut(&mut self, index: usize) -> Result<&mut V> {
        self.vertices
            .get_mut(&index)
            .ok_or_else(|| ErrorKind::Graph(format!("vertex {} not in graph", index)).into())
    }

    pub fn vertices(&self) -> Vec<&V> {
        self.vertices.values().collect()
    }

    pub fn vertices_mut(&mut self) -> Vec<&mut V> {
        self.vertices.values_mut().collect()
    }

    pub fn edge(&self, head: usize, tail: usize) -> Result<&E> {
        self.edges
            .get(&(head, tail))
            .ok_or_else(|| ErrorKind::Graph(format!("edge ({}, {}) not in graph", head, tail)).into())
    }

    pub fn edges(&self) -> Vec<&E> {
        self.edges.values().collect()
    }

    /// All edges leaving the given vertex.
    pub fn edges_out(&self, index: usize) -> Result<&Vec<E>> {
        self.edges_out
            .get(&index)
            .ok_or_else(|| ErrorKind::Graph(format!("vertex {} not in graph", index)).into())
    }

    /// All edges entering the given vertex.
    pub fn edges_in(&self, index: usize) -> Result<&Vec<E>> {
        self.edges_in
            .get(&index)
            .ok_or_else(|| ErrorKind::Graph(format!("vertex {} not in graph", index)).into())
    }

    pub fn successor_indices(&self, index: usize) -> Result<Vec<usize>> {
        Ok(self.edges_out(index)?.iter().map(|edge| edge.tail()).collect())
    }

    pub fn predecessor_indices(&self, index: usize) -> Result<Vec<usize>> {
        Ok(self.edges_in(index)?.iter().map(|edge| edge.head()).collect())
    }

    /// Vertices with no outgoing edges.
    pub fn sink_indices(&self) -> Vec<usize> {
        self.edges_out
            .iter()
            .filter(|(_, edges)| edges.is_empty())
            .map(|(index, _)| *index)
            .collect()
    }

    /// Computes the post order of all vertices reachable from `root`.
    ///
    /// `root` is the last entry of the returned order.
    pub fn compute_post_order(&self, root: usize) -> Result<Vec<usize>> {
        if !self.has_vertex(root) {
            bail!(ErrorKind::Graph(format!("vertex {} not in graph", root)));
        }

        let mut order: Vec<usize> = Vec::new();
        let mut visited: BTreeMap<usize, bool> = BTreeMap::new();
        // (vertex, next successor offset) pairs form an explicit DFS stack
        let mut stack: VecDeque<(usize, usize)> = VecDeque::new();

        stack.push_back((root, 0));
        visited.insert(root, true);

        while let Some((vertex, offset)) = stack.pop_back() {
            let successors = self.successor_indices(vertex)?;
            if offset < successors.len() {
                stack.push_back((vertex, offset + 1));
                let successor = successors[offset];
                if !visited.contains_key(&successor) {
                    visited.insert(successor, true);
                    stack.push_back((successor, 0));
                }
            } else {
                order.push(vertex);
            }
        }

        Ok(order)
    }
}

#[cfg(test)]
mod graph_tests {
    use super::*;

    #[derive(Clone, Debug, Eq, PartialEq)]
    struct TestVertex(usize);

    impl Vertex for TestVertex {
        fn index(&self) -> usize {
            self.0
        }
        fn dot_label(&self) -> String {
            format!("{}", self.0)
        }
    }

    #[derive(Clone, Debug, Eq, PartialEq)]
    struct TestEdge(usize, usize);

    impl Edge for TestEdge {
        fn head(&self) -> usize {
            self.0
        }
        fn tail(&self) -> usize {
            self.1
        }
        fn dot_label(&self) -> String {
            format!("{} -> {}", self.0, self.1)
        }
    }

    fn diamond() -> Graph<TestVertex, TestEdge> {
        let mut graph = Graph::new();
        for i in 0..4 {
            graph.insert_vertex(TestVertex(i)).unwrap();
        }
        graph.insert_edge(TestEdge(0, 1)).unwrap();
        graph.insert_edge(TestEdge(0, 2)).unwrap();
        graph.insert_edge(TestEdge(1, 3)).unwrap();
        graph.insert_edge(TestEdge(2, 3)).unwrap();
        graph
    }

    #[test]
    fn post_order_ends_with_root() {
        let graph = diamond();
        let order = graph.compute_post_order(0).unwrap();
        assert_eq!(order.len(), 4);
        assert_eq!(*order.last().unwrap(), 0);
        assert_eq!(order[0], 3);
    }

    #[test]
    fn post_order_handles_cycles() {
        let mut graph = diamond();
        graph.insert_edge(TestEdge(3, 0)).unwrap();
        let order = graph.compute_post_order(0).unwrap();
        assert_eq!(order.len(), 4);
    }

    #[test]
    fn duplicate_vertex_is_an_error() {
        let mut graph = diamond();
        assert!(graph.insert_vertex(TestVertex(1)).is_err());
    }

    #[test]
    fn sinks() {
        let graph = diamond();
        assert_eq!(graph.sink_indices(), vec![3]);
    }
}
