//! The program representation the dependence analysis consumes.
//!
//! Procedures are control-flow graphs of basic blocks; blocks hold
//! instructions; each instruction holds the data-transport moves that
//! issue in one cycle. The analysis reads this representation and never
//! mutates it.

mod annotation;
mod basic_block;
mod control_flow_edge;
mod control_flow_graph;
mod guard;
mod instruction;
mod moves;
mod procedure;
mod register;
mod terminal;

pub use self::annotation::MoveAnnotation;
pub use self::basic_block::BasicBlock;
pub use self::control_flow_edge::{ControlFlowEdge, ControlFlowEdgeKind};
pub use self::control_flow_graph::ControlFlowGraph;
pub use self::guard::{Guard, GuardSource};
pub use self::instruction::Instruction;
pub use self::moves::Move;
pub use self::procedure::Procedure;
pub use self::register::Register;
pub use self::terminal::{Destination, PortRead, PortWrite, Source};

/// The bookkeeping name of the return-address port.
pub const RA_NAME: &str = "RA";
