use crate::ddg::alias::{AliasingResult, MemoryAliasAnalyzer};
use crate::ddg::{DataDependenceGraph, ProgramOperation};

/// Claims every pair of accesses is disjoint.
///
/// Produces fast but broken code; only useful for measuring the
/// theoretical benefit of perfect alias analysis.
#[derive(Clone, Debug, Default)]
pub struct FalseAliasAnalyzer;

impl FalseAliasAnalyzer {
    pub fn new() -> FalseAliasAnalyzer {
        FalseAliasAnalyzer
    }
}

impl MemoryAliasAnalyzer for FalseAliasAnalyzer {
    fn analyze(
        &self,
        _: &DataDependenceGraph,
        _: &ProgramOperation,
        _: &ProgramOperation,
    ) -> AliasingResult {
        AliasingResult::False
    }

    fn is_address_traceable(&self, _: &DataDependenceGraph, _: &ProgramOperation) -> bool {
        true
    }
}
