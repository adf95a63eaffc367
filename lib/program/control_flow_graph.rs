use crate::error::*;
use crate::graph::Graph;
use crate::program::{BasicBlock, ControlFlowEdge};
use serde::{Deserialize, Serialize};

/// Basic blocks connected by typed control-flow edges.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ControlFlowGraph {
    graph: Graph<BasicBlock, ControlFlowEdge>,
    entry: Option<usize>,
    exit: Option<usize>,
}

impl ControlFlowGraph {
    pub fn new() -> ControlFlowGraph {
        ControlFlowGraph {
            graph: Graph::new(),
            entry: None,
            exit: None,
        }
    }

    pub fn graph(&self) -> &Graph<BasicBlock, ControlFlowEdge> {
        &self.graph
    }
    pub fn graph_mut(&mut self) -> &mut Graph<BasicBlock, ControlFlowEdge> {
        &mut self.graph
    }

    pub fn entry(&self) -> Option<usize> {
        self.entry
    }
    pub fn exit(&self) -> Option<usize> {
        self.exit
    }

    pub fn set_entry(&mut self, entry: usize) {
        self.entry = Some(entry);
    }
    pub fn set_exit(&mut self, exit: usize) {
        self.exit = Some(exit);
    }

    pub fn block(&self, index: usize) -> Result<&BasicBlock> {
        self.graph.vertex(index)
    }

    pub fn blocks(&self) -> Vec<&BasicBlock> {
        self.graph.vertices()
    }

    pub fn edges_out(&self, block_index: usize) -> Result<&Vec<ControlFlowEdge>> {
        self.graph.edges_out(block_index)
    }

    pub fn edges_in(&self, block_index: usize) -> Result<&Vec<ControlFlowEdge>> {
        self.graph.edges_in(block_index)
    }
}

impl Default for ControlFlowGraph {
    fn default() -> ControlFlowGraph {
        ControlFlowGraph::new()
    }
}
