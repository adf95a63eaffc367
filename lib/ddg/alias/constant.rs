use crate::ddg::alias::{
    address_operand_node, compare_addresses, AliasingResult, MemoryAliasAnalyzer,
};
use crate::ddg::{DataDependenceGraph, ProgramOperation};

/// Disambiguates accesses whose addresses are immediate values, as
/// produced for global variables and absolute device addresses.
#[derive(Clone, Debug, Default)]
pub struct ConstantAliasAnalyzer;

impl ConstantAliasAnalyzer {
    pub fn new() -> ConstantAliasAnalyzer {
        ConstantAliasAnalyzer
    }

    fn constant_address(ddg: &DataDependenceGraph, operation: &ProgramOperation) -> Option<i64> {
        let address = address_operand_node(ddg, operation)?;
        ddg.node(address).as_move()?.source().immediate()
    }
}

impl MemoryAliasAnalyzer for ConstantAliasAnalyzer {
    fn analyze(
        &self,
        ddg: &DataDependenceGraph,
        first: &ProgramOperation,
        second: &ProgramOperation,
    ) -> AliasingResult {
        let first_address = match ConstantAliasAnalyzer::constant_address(ddg, first) {
            Some(address) => address,
            None => return AliasingResult::Unknown,
        };
        let second_address = match ConstantAliasAnalyzer::constant_address(ddg, second) {
            Some(address) => address,
            None => return AliasingResult::Unknown,
        };
        compare_addresses(
            first_address,
            first.signature().memory_width(),
            second_address,
            second.signature().memory_width(),
        )
    }

    fn is_address_traceable(
        &self,
        ddg: &DataDependenceGraph,
        operation: &ProgramOperation,
    ) -> bool {
        ConstantAliasAnalyzer::constant_address(ddg, operation).is_some()
    }
}
