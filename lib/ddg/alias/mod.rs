//! Pluggable memory alias analysis.
//!
//! Analyzers are consulted in registration order; the first verdict
//! other than `Unknown` wins. With no verdict the builder assumes a
//! conservative may-alias.

mod constant;
mod false_alias;
mod offset;

pub use self::constant::ConstantAliasAnalyzer;
pub use self::false_alias::FalseAliasAnalyzer;
pub use self::offset::OffsetAliasAnalyzer;

use crate::ddg::{DataDependenceGraph, NodeId, ProgramOperation};

/// The verdict of one analyzer about one pair of accesses.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum AliasingResult {
    /// The accesses certainly reference the same storage.
    True,
    /// The accesses certainly reference disjoint storage.
    False,
    /// The accesses overlap without being the same storage.
    Partial,
    Unknown,
}

/// One memory-aliasing oracle.
pub trait MemoryAliasAnalyzer {
    /// Whether the two memory operations may reference overlapping
    /// storage.
    fn analyze(
        &self,
        ddg: &DataDependenceGraph,
        first: &ProgramOperation,
        second: &ProgramOperation,
    ) -> AliasingResult;

    /// Whether this analyzer understands the address of the operation
    /// well enough to ever return a verdict about it.
    fn is_address_traceable(&self, ddg: &DataDependenceGraph, operation: &ProgramOperation)
        -> bool;
}

/// The move writing the address operand of a memory operation, by
/// convention operand slot 1. None when the operation does not access
/// memory or the slot was written by more than one move.
pub fn address_operand_node(
    ddg: &DataDependenceGraph,
    operation: &ProgramOperation,
) -> Option<NodeId> {
    if !operation.signature().accesses_memory() {
        return None;
    }
    let mut found = None;
    for &node in operation.input_nodes() {
        let is_address = ddg
            .node(node)
            .as_move()
            .and_then(|mv| mv.destination().fu_port())
            .map(|port| port.operand() == 1)
            .unwrap_or(false);
        if is_address {
            if found.is_some() {
                return None;
            }
            found = Some(node);
        }
    }
    found
}

/// Compares two resolved addresses given the access widths of their
/// operations. A zero width counts as one byte.
pub(crate) fn compare_addresses(
    first: i64,
    first_width: usize,
    second: i64,
    second_width: usize,
) -> AliasingResult {
    if first == second {
        return AliasingResult::True;
    }
    let first_width = first_width.max(1) as i64;
    let second_width = second_width.max(1) as i64;
    if first < second + second_width && second < first + first_width {
        AliasingResult::Partial
    } else {
        AliasingResult::False
    }
}

#[test]
fn address_comparison() {
    assert_eq!(compare_addresses(0x100, 4, 0x100, 4), AliasingResult::True);
    assert_eq!(compare_addresses(0x100, 4, 0x104, 4), AliasingResult::False);
    assert_eq!(compare_addresses(0x100, 4, 0x102, 4), AliasingResult::Partial);
    assert_eq!(compare_addresses(0x102, 1, 0x100, 4), AliasingResult::Partial);
    assert_eq!(compare_addresses(0x100, 0, 0x101, 0), AliasingResult::False);
}
