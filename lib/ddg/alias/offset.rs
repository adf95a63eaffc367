use crate::ddg::alias::{
    address_operand_node, compare_addresses, AliasingResult, MemoryAliasAnalyzer,
};
use crate::ddg::{DataDependenceGraph, NodeId, ProgramOperation};

/// Disambiguates accesses whose addresses are constant offsets from
/// the same base value (fields of one struct, spilled stack slots).
///
/// The address operand is traced backward through register-to-register
/// copies to its defining node; a single ADD/SUB of a register with an
/// immediate splits into base and offset. Two addresses sharing the
/// same base definition compare by offset; everything else is left to
/// the rest of the chain.
#[derive(Clone, Debug, Default)]
pub struct OffsetAliasAnalyzer;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct OffsetAddress {
    base: NodeId,
    offset: i64,
}

impl OffsetAliasAnalyzer {
    pub fn new() -> OffsetAliasAnalyzer {
        OffsetAliasAnalyzer
    }

    /// Follows register copies to the node that actually produced the
    /// value read by `node`.
    fn raw_ancestor(ddg: &DataDependenceGraph, node: NodeId) -> NodeId {
        let mut current = node;
        loop {
            let definer = match ddg.only_register_raw_source(current) {
                Some(definer) => definer,
                None => return current,
            };
            let is_copy = ddg
                .node(definer)
                .as_move()
                .map(|mv| mv.source().register().is_some())
                .unwrap_or(false);
            if is_copy {
                current = definer;
            } else {
                return definer;
            }
        }
    }

    fn resolve(ddg: &DataDependenceGraph, operation: &ProgramOperation) -> Option<OffsetAddress> {
        let address = address_operand_node(ddg, operation)?;
        if ddg.node(address).as_move()?.source().register().is_none() {
            return None;
        }

        let producer = OffsetAliasAnalyzer::raw_ancestor(ddg, address);
        let offset_operation = match ddg.source_operation(producer) {
            Some(operation) => operation,
            // The address is used as produced; offset zero from itself.
            None => {
                return Some(OffsetAddress {
                    base: producer,
                    offset: 0,
                })
            }
        };

        let sign = match offset_operation.name() {
            "ADD" => 1,
            "SUB" => -1,
            _ => {
                return Some(OffsetAddress {
                    base: producer,
                    offset: 0,
                })
            }
        };

        let mut base = None;
        let mut offset = None;
        for &input in offset_operation.input_nodes() {
            let mv = ddg.node(input).as_move()?;
            let slot = mv.destination().fu_port()?.operand();
            if slot == 1 {
                if mv.source().register().is_none() {
                    return None;
                }
                base = Some(OffsetAliasAnalyzer::raw_ancestor(ddg, input));
            } else if slot == 2 {
                offset = Some(mv.source().immediate()? * sign);
            }
        }

        match (base, offset) {
            (Some(base), Some(offset)) => Some(OffsetAddress { base, offset }),
            _ => None,
        }
    }
}

impl MemoryAliasAnalyzer for OffsetAliasAnalyzer {
    fn analyze(
        &self,
        ddg: &DataDependenceGraph,
        first: &ProgramOperation,
        second: &ProgramOperation,
    ) -> AliasingResult {
        let first_address = match OffsetAliasAnalyzer::resolve(ddg, first) {
            Some(address) => address,
            None => return AliasingResult::Unknown,
        };
        let second_address = match OffsetAliasAnalyzer::resolve(ddg, second) {
            Some(address) => address,
            None => return AliasingResult::Unknown,
        };
        if first_address.base != second_address.base {
            return AliasingResult::Unknown;
        }
        compare_addresses(
            first_address.offset,
            first.signature().memory_width(),
            second_address.offset,
            second.signature().memory_width(),
        )
    }

    fn is_address_traceable(
        &self,
        ddg: &DataDependenceGraph,
        operation: &ProgramOperation,
    ) -> bool {
        OffsetAliasAnalyzer::resolve(ddg, operation).is_some()
    }
}
