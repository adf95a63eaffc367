use crate::program::{Guard, Move};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a `MoveNode` in its `DataDependenceGraph`.
pub type NodeId = usize;

/// The position of a move in its procedure: block index, instruction
/// index within the block, move slot within the instruction.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct MoveRef {
    pub block: usize,
    pub instruction: usize,
    pub slot: usize,
}

impl MoveRef {
    pub fn new(block: usize, instruction: usize, slot: usize) -> MoveRef {
        MoveRef {
            block,
            instruction,
            slot,
        }
    }
}

impl fmt::Display for MoveRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.block, self.instruction, self.slot)
    }
}

#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum MoveNodeKind {
    /// A synthetic node carrying procedure live-in state; not a move.
    Entry,
    Move { mv: Move, at: MoveRef },
}

/// A node of the dependence graph, wrapping one move.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct MoveNode {
    id: NodeId,
    kind: MoveNodeKind,
    /// The operation this node writes an operand of, if any.
    destination_operation: Option<usize>,
    /// The operation this node reads a result of, if any.
    source_operation: Option<usize>,
}

impl MoveNode {
    pub(crate) fn entry(id: NodeId) -> MoveNode {
        MoveNode {
            id,
            kind: MoveNodeKind::Entry,
            destination_operation: None,
            source_operation: None,
        }
    }

    pub(crate) fn transport(id: NodeId, mv: Move, at: MoveRef) -> MoveNode {
        MoveNode {
            id,
            kind: MoveNodeKind::Move { mv, at },
            destination_operation: None,
            source_operation: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &MoveNodeKind {
        &self.kind
    }

    pub fn is_move(&self) -> bool {
        match self.kind {
            MoveNodeKind::Move { .. } => true,
            MoveNodeKind::Entry => false,
        }
    }

    pub fn as_move(&self) -> Option<&Move> {
        match &self.kind {
            MoveNodeKind::Move { mv, .. } => Some(mv),
            MoveNodeKind::Entry => None,
        }
    }

    pub fn move_ref(&self) -> Option<MoveRef> {
        match &self.kind {
            MoveNodeKind::Move { at, .. } => Some(*at),
            MoveNodeKind::Entry => None,
        }
    }

    pub fn block(&self) -> Option<usize> {
        self.move_ref().map(|at| at.block)
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.as_move().and_then(|mv| mv.guard())
    }

    /// Entry nodes count as unconditional.
    pub fn is_unconditional(&self) -> bool {
        self.as_move().map(|mv| mv.is_unconditional()).unwrap_or(true)
    }

    pub fn destination_operation(&self) -> Option<usize> {
        self.destination_operation
    }

    pub fn source_operation(&self) -> Option<usize> {
        self.source_operation
    }

    pub(crate) fn set_destination_operation(&mut self, operation: usize) {
        self.destination_operation = Some(operation);
    }

    pub(crate) fn set_source_operation(&mut self, operation: usize) {
        self.source_operation = Some(operation);
    }
}

impl fmt::Display for MoveNode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            MoveNodeKind::Entry => write!(f, "{}: entry", self.id),
            MoveNodeKind::Move { mv, at } => write!(f, "{}: {} @{}", self.id, mv, at),
        }
    }
}
