use crate::ddg::{
    DependenceEdge, DependenceKind, DependenceType, MoveNode, MoveRef, NodeId, ProgramOperation,
};
use crate::error::*;
use crate::machine::OperationSignature;
use crate::program::Move;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The data dependence graph of one procedure or basic block.
///
/// Nodes, edges and program operations live in arenas and refer to each
/// other by index, so the loop-carried cycles of the graph need no
/// special ownership handling. The graph is immutable once its builder
/// returns.
#[derive(Clone, Debug, Default)]
pub struct DataDependenceGraph {
    name: String,
    nodes: Vec<MoveNode>,
    edges: Vec<DependenceEdge>,
    edges_out: Vec<Vec<usize>>,
    edges_in: Vec<Vec<usize>>,
    operations: Vec<ProgramOperation>,
    move_nodes: BTreeMap<MoveRef, NodeId>,
    registers_used_after: BTreeMap<usize, BTreeSet<String>>,
}

impl DataDependenceGraph {
    pub fn new<S: Into<String>>(name: S) -> DataDependenceGraph {
        DataDependenceGraph {
            name: name.into(),
            ..DataDependenceGraph::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn add_entry_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(MoveNode::entry(id));
        self.edges_out.push(Vec::new());
        self.edges_in.push(Vec::new());
        id
    }

    pub(crate) fn add_move_node(&mut self, mv: Move, at: MoveRef) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(MoveNode::transport(id, mv, at));
        self.edges_out.push(Vec::new());
        self.edges_in.push(Vec::new());
        self.move_nodes.insert(at, id);
        id
    }

    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MoveNode {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MoveNode> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The node created for the move at the given program position.
    pub fn node_of_move(&self, at: MoveRef) -> Result<NodeId> {
        self.move_nodes
            .get(&at)
            .copied()
            .ok_or_else(|| ErrorKind::Graph(format!("no node for move at {}", at)).into())
    }

    pub(crate) fn create_operation(&mut self, signature: OperationSignature) -> usize {
        let id = self.operations.len();
        self.operations.push(ProgramOperation::new(id, signature));
        id
    }

    pub fn operation(&self, id: usize) -> &ProgramOperation {
        &self.operations[id]
    }

    pub(crate) fn operation_mut(&mut self, id: usize) -> &mut ProgramOperation {
        &mut self.operations[id]
    }

    pub fn operations(&self) -> impl Iterator<Item = &ProgramOperation> {
        self.operations.iter()
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    /// The operation consuming this node as an operand, if any.
    pub fn destination_operation(&self, node: NodeId) -> Option<&ProgramOperation> {
        self.nodes[node]
            .destination_operation()
            .map(|id| &self.operations[id])
    }

    /// The operation producing this node's source value, if any.
    pub fn source_operation(&self, node: NodeId) -> Option<&ProgramOperation> {
        self.nodes[node]
            .source_operation()
            .map(|id| &self.operations[id])
    }

    fn has_equal_edge(&self, edge: &DependenceEdge) -> bool {
        self.edges_out[edge.head()]
            .iter()
            .any(|index| self.edges[*index] == *edge)
    }

    /// Inserts the edge unless an identical edge between the same nodes
    /// already exists. Returns true if the edge was inserted.
    pub(crate) fn connect_or_merge(&mut self, edge: DependenceEdge) -> bool {
        if self.has_equal_edge(&edge) {
            return false;
        }
        let index = self.edges.len();
        self.edges_out[edge.head()].push(index);
        self.edges_in[edge.tail()].push(index);
        self.edges.push(edge);
        true
    }

    pub fn edges(&self) -> impl Iterator<Item = &DependenceEdge> {
        self.edges.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = &DependenceEdge> {
        self.edges_out[node].iter().map(move |index| &self.edges[*index])
    }

    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = &DependenceEdge> {
        self.edges_in[node].iter().map(move |index| &self.edges[*index])
    }

    pub fn edges_between(&self, head: NodeId, tail: NodeId) -> Vec<&DependenceEdge> {
        self.edges_out[head]
            .iter()
            .map(|index| &self.edges[*index])
            .filter(|edge| edge.tail() == tail)
            .collect()
    }

    /// The nodes whose values this node's guard reads.
    pub fn guard_raw_sources(&self, node: NodeId) -> BTreeSet<NodeId> {
        self.in_edges(node)
            .filter(|edge| edge.guard_use() && edge.dependence() == DependenceType::Raw)
            .map(|edge| edge.head())
            .collect()
    }

    /// Whether two moves are gated by the same guard value with the
    /// same inversion. False when not provable.
    pub fn same_guards(&self, a: NodeId, b: NodeId) -> bool {
        let node_a = &self.nodes[a];
        let node_b = &self.nodes[b];
        if !node_a.is_move() || !node_b.is_move() {
            return false;
        }
        match (node_a.guard(), node_b.guard()) {
            (None, None) => true,
            (Some(guard_a), Some(guard_b)) => {
                if guard_a.inverted() != guard_b.inverted() {
                    return false;
                }
                let sources_a = self.guard_raw_sources(a);
                let sources_b = self.guard_raw_sources(b);
                !sources_a.is_empty() && sources_a == sources_b
            }
            _ => false,
        }
    }

    /// Whether two moves are gated by the same guard value with
    /// opposite inversions, so at most one of them executes. False when
    /// not provable.
    pub fn exclusive_guards(&self, a: NodeId, b: NodeId) -> bool {
        let node_a = &self.nodes[a];
        let node_b = &self.nodes[b];
        if !node_a.is_move() || !node_b.is_move() {
            return false;
        }
        match (node_a.guard(), node_b.guard()) {
            (Some(guard_a), Some(guard_b)) => {
                if guard_a.inverted() == guard_b.inverted() {
                    return false;
                }
                let sources_a = self.guard_raw_sources(a);
                let sources_b = self.guard_raw_sources(b);
                !sources_a.is_empty() && sources_a == sources_b
            }
            _ => false,
        }
    }

    /// The single register-RAW definer of this node's source value, if
    /// there is exactly one in-block, non-loop definer.
    pub fn only_register_raw_source(&self, node: NodeId) -> Option<NodeId> {
        let mut source = None;
        for edge in self.in_edges(node) {
            if edge.kind() != DependenceKind::Register
                || edge.dependence() != DependenceType::Raw
                || edge.guard_use()
                || edge.is_back_edge()
            {
                continue;
            }
            if source.is_some() && source != Some(edge.head()) {
                return None;
            }
            source = Some(edge.head());
        }
        source
    }

    pub(crate) fn set_registers_used_after(&mut self, map: BTreeMap<usize, BTreeSet<String>>) {
        self.registers_used_after = map;
    }

    /// Registers live at or beyond the given block, when register death
    /// analysis was requested. The complement over a block's uses marks
    /// true last uses.
    pub fn registers_used_after(&self, block: usize) -> Option<&BTreeSet<String>> {
        self.registers_used_after.get(&block)
    }
}

impl fmt::Display for DataDependenceGraph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ ddg {} ]", self.name)?;
        for node in self.nodes() {
            writeln!(f, "{}", node)?;
        }
        for edge in self.edges() {
            writeln!(f, "{}", edge)?;
        }
        Ok(())
    }
}
