use crate::ddg::NodeId;
use crate::machine::OperationSignature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One execution of a hardware operation: the operand-writing moves
/// (the trigger among them) and the result-reading moves that jointly
/// realize it.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ProgramOperation {
    id: usize,
    signature: OperationSignature,
    input_nodes: Vec<NodeId>,
    output_nodes: Vec<NodeId>,
    trigger: Option<NodeId>,
}

impl ProgramOperation {
    pub(crate) fn new(id: usize, signature: OperationSignature) -> ProgramOperation {
        ProgramOperation {
            id,
            signature,
            input_nodes: Vec::new(),
            output_nodes: Vec::new(),
            trigger: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        self.signature.name()
    }

    pub fn signature(&self) -> &OperationSignature {
        &self.signature
    }

    pub fn input_nodes(&self) -> &[NodeId] {
        &self.input_nodes
    }

    pub fn output_nodes(&self) -> &[NodeId] {
        &self.output_nodes
    }

    pub fn trigger(&self) -> Option<NodeId> {
        self.trigger
    }

    pub(crate) fn add_input_node(&mut self, node: NodeId) {
        self.input_nodes.push(node);
    }

    pub(crate) fn add_output_node(&mut self, node: NodeId) {
        self.output_nodes.push(node);
    }

    pub(crate) fn set_trigger(&mut self, node: NodeId) {
        self.trigger = Some(node);
    }

    /// The trigger is attached and every declared operand with it.
    pub fn is_ready(&self) -> bool {
        self.trigger.is_some() && self.input_nodes.len() == self.signature.inputs()
    }

    /// Ready, and every declared result has been read.
    pub fn is_complete(&self) -> bool {
        self.is_ready() && self.output_nodes.len() == self.signature.outputs()
    }
}

impl fmt::Display for ProgramOperation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} #{} ({}/{} in, {}/{} out)",
            self.name(),
            self.id,
            self.input_nodes.len(),
            self.signature.inputs(),
            self.output_nodes.len(),
            self.signature.outputs()
        )
    }
}
