//! The data dependence graph and its builder.
//!
//! Nodes are individual data-transport moves; edges are the ordering
//! constraints a scheduler must respect: register and return-address
//! hazards, memory hazards, operand/result cohesion of hardware
//! operations, and function-unit state.

pub mod alias;
mod builder;
mod edge;
mod graph;
mod live_range_data;
mod memory_category;
mod node;
mod program_operation;

pub use self::builder::{BuilderOptions, DataDependenceGraphBuilder};
pub use self::edge::{DependenceEdge, DependenceKind, DependenceType};
pub use self::graph::DataDependenceGraph;
pub use self::live_range_data::{
    LiveRangeData, MoveNodeUse, PotentialKill, RegisterKill, UseMapSet, UseSet,
};
pub use self::memory_category::MemoryCategory;
pub use self::node::{MoveNode, MoveNodeKind, MoveRef, NodeId};
pub use self::program_operation::ProgramOperation;
