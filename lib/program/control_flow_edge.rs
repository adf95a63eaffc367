use crate::graph;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How control reaches the successor block.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum ControlFlowEdgeKind {
    Fallthrough,
    Jump,
    /// Control passes around a call: the edge from a call block to the
    /// block executed after the callee returns.
    CallPass,
}

/// A typed edge of the control-flow graph. `head` is the predecessor
/// block and `tail` the successor block.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ControlFlowEdge {
    head: usize,
    tail: usize,
    kind: ControlFlowEdgeKind,
    back_edge: bool,
}

impl ControlFlowEdge {
    pub fn new(head: usize, tail: usize, kind: ControlFlowEdgeKind) -> ControlFlowEdge {
        ControlFlowEdge {
            head,
            tail,
            kind,
            back_edge: false,
        }
    }

    pub fn back(head: usize, tail: usize, kind: ControlFlowEdgeKind) -> ControlFlowEdge {
        ControlFlowEdge {
            head,
            tail,
            kind,
            back_edge: true,
        }
    }

    pub fn head(&self) -> usize {
        self.head
    }
    pub fn tail(&self) -> usize {
        self.tail
    }
    pub fn kind(&self) -> ControlFlowEdgeKind {
        self.kind
    }

    /// True if this edge closes a loop. Dependencies propagated over it
    /// are loop carried.
    pub fn is_back_edge(&self) -> bool {
        self.back_edge
    }
}

impl graph::Edge for ControlFlowEdge {
    fn head(&self) -> usize {
        self.head
    }
    fn tail(&self) -> usize {
        self.tail
    }
    fn dot_label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for ControlFlowEdge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ControlFlowEdgeKind::Fallthrough => "fallthrough",
            ControlFlowEdgeKind::Jump => "jump",
            ControlFlowEdgeKind::CallPass => "call-pass",
        };
        let back = if self.back_edge { ", back" } else { "" };
        write!(f, "({} -> {}) {}{}", self.head, self.tail, kind, back)
    }
}
