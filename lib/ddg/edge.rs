use crate::ddg::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of resource the dependence goes through.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum DependenceKind {
    Register,
    ReturnAddress,
    Memory,
    /// Operand/result cohesion inside one hardware operation.
    Operation,
    /// Shared function-unit state between operations.
    FuState,
}

/// The hazard class of a dependence.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum DependenceType {
    Raw,
    War,
    Waw,
    /// Operation and function-unit-state edges have no hazard class.
    Unknown,
}

/// A directed dependence between two move nodes. `head` is the earlier
/// node and `tail` the node that must not overtake it.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct DependenceEdge {
    head: NodeId,
    tail: NodeId,
    kind: DependenceKind,
    dependence: DependenceType,
    /// The register name, memory category, or operation name concerned.
    data: Option<String>,
    /// The dependent access is a guard read.
    guard_use: bool,
    /// A memory dependence confirmed as a definite alias.
    certain_alias: bool,
    /// The head access is implied by a call or return, not a concrete
    /// move operand.
    head_pseudo: bool,
    /// The tail access is implied by a call or return.
    tail_pseudo: bool,
    /// The dependence is carried over a control-flow back edge.
    back_edge: bool,
}

impl DependenceEdge {
    pub fn new(
        head: NodeId,
        tail: NodeId,
        kind: DependenceKind,
        dependence: DependenceType,
    ) -> DependenceEdge {
        DependenceEdge {
            head,
            tail,
            kind,
            dependence,
            data: None,
            guard_use: false,
            certain_alias: false,
            head_pseudo: false,
            tail_pseudo: false,
            back_edge: false,
        }
    }

    pub fn head(&self) -> NodeId {
        self.head
    }
    pub fn tail(&self) -> NodeId {
        self.tail
    }
    pub fn kind(&self) -> DependenceKind {
        self.kind
    }
    pub fn dependence(&self) -> DependenceType {
        self.dependence
    }
    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
    pub fn guard_use(&self) -> bool {
        self.guard_use
    }
    pub fn certain_alias(&self) -> bool {
        self.certain_alias
    }
    pub fn head_pseudo(&self) -> bool {
        self.head_pseudo
    }
    pub fn tail_pseudo(&self) -> bool {
        self.tail_pseudo
    }
    pub fn is_back_edge(&self) -> bool {
        self.back_edge
    }

    pub fn set_data<S: Into<String>>(&mut self, data: S) {
        self.data = Some(data.into());
    }
    pub fn set_guard_use(&mut self, guard_use: bool) {
        self.guard_use = guard_use;
    }
    pub fn set_certain_alias(&mut self, certain_alias: bool) {
        self.certain_alias = certain_alias;
    }
    pub fn set_head_pseudo(&mut self, head_pseudo: bool) {
        self.head_pseudo = head_pseudo;
    }
    pub fn set_tail_pseudo(&mut self, tail_pseudo: bool) {
        self.tail_pseudo = tail_pseudo;
    }
    pub fn set_back_edge(&mut self, back_edge: bool) {
        self.back_edge = back_edge;
    }
}

impl fmt::Display for DependenceEdge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            DependenceKind::Register => "reg",
            DependenceKind::ReturnAddress => "ra",
            DependenceKind::Memory => "mem",
            DependenceKind::Operation => "op",
            DependenceKind::FuState => "fu",
        };
        let dependence = match self.dependence {
            DependenceType::Raw => "raw",
            DependenceType::War => "war",
            DependenceType::Waw => "waw",
            DependenceType::Unknown => "-",
        };
        write!(f, "({} -> {}) {}:{}", self.head, self.tail, kind, dependence)?;
        if let Some(data) = self.data() {
            write!(f, " {}", data)?;
        }
        if self.guard_use {
            write!(f, " guard")?;
        }
        if self.back_edge {
            write!(f, " loop")?;
        }
        Ok(())
    }
}
