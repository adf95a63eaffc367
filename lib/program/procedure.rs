use crate::error::*;
use crate::program::{BasicBlock, ControlFlowEdge, ControlFlowGraph};
use serde::{Deserialize, Serialize};

/// A procedure: a named control-flow graph of basic blocks.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Procedure {
    name: String,
    control_flow_graph: ControlFlowGraph,
}

impl Procedure {
    pub fn new<S: Into<String>>(name: S, control_flow_graph: ControlFlowGraph) -> Procedure {
        Procedure {
            name: name.into(),
            control_flow_graph,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn control_flow_graph(&self) -> &ControlFlowGraph {
        &self.control_flow_graph
    }

    pub fn control_flow_graph_mut(&mut self) -> &mut ControlFlowGraph {
        &mut self.control_flow_graph
    }

    pub fn block(&self, index: usize) -> Result<&BasicBlock> {
        self.control_flow_graph.block(index)
    }

    pub fn blocks(&self) -> Vec<&BasicBlock> {
        self.control_flow_graph.blocks()
    }

    pub fn edges(&self) -> Vec<&ControlFlowEdge> {
        self.control_flow_graph.graph().edges()
    }
}
