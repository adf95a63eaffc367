//! Construction of data dependence graphs.
//!
//! A whole-procedure build runs two forward fixpoint passes over the
//! control-flow graph: registers and program operations first, memory
//! and function-unit state second (memory analysis needs the completed
//! operation topology). Each pass walks every block once in weighted
//! worklist order and revisits a block whenever new state reaches it
//! from a predecessor.

mod death;
mod memory;
mod operations;
mod registers;

use crate::ddg::alias::{
    ConstantAliasAnalyzer, MemoryAliasAnalyzer, OffsetAliasAnalyzer,
};
use crate::ddg::live_range_data::{append_use_map_sets, append_use_sets};
use crate::ddg::{DataDependenceGraph, LiveRangeData, MoveNodeUse, MoveRef, NodeId};
use crate::error::*;
use crate::machine::Machine;
use crate::program::{BasicBlock, Destination, Procedure, Source, RA_NAME};
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};
use std::mem;

/// Which dependence classes a pass creates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    RegistersAndOperations,
    MemoryAndFuState,
}

/// Fixpoint progress of one basic block.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BlockState {
    Unreached,
    Queued,
    Ready,
}

/// Per-block construction state.
#[derive(Clone, Debug)]
struct BBData {
    state: BlockState,
    constructed: bool,
    data: LiveRangeData,
    /// Operations accumulating operand moves, most recent last.
    dest_pending: Vec<usize>,
    /// Operations triggered and awaiting their result reads.
    read_pending: Vec<usize>,
}

impl BBData {
    fn new() -> BBData {
        BBData {
            state: BlockState::Unreached,
            constructed: false,
            data: LiveRangeData::new(),
            dest_pending: Vec::new(),
            read_pending: Vec::new(),
        }
    }
}

/// A queued block, ordered so that blocks early in reverse post order
/// pop first.
#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd)]
struct WeightedBlock {
    weight: usize,
    block: usize,
}

/// Which analyses the builder runs.
#[derive(Clone, Debug)]
pub struct BuilderOptions {
    /// Disambiguate immediate addresses.
    pub enable_constant_alias: bool,
    /// Disambiguate base-plus-constant-offset addresses.
    pub enable_offset_alias: bool,
    /// Run no alias analysis at all; every pair of same-category
    /// accesses may alias.
    pub disable_alias_analysis: bool,
    /// Run the register death analysis after construction and attach
    /// its result to the graph.
    pub compute_register_deaths: bool,
}

impl Default for BuilderOptions {
    fn default() -> BuilderOptions {
        BuilderOptions {
            enable_constant_alias: true,
            enable_offset_alias: false,
            disable_alias_analysis: false,
            compute_register_deaths: false,
        }
    }
}

/// Builds the data dependence graph of a procedure or basic block.
pub struct DataDependenceGraphBuilder<'m> {
    machine: &'m Machine,
    options: BuilderOptions,
    analyzers: Vec<Box<dyn MemoryAliasAnalyzer>>,
    ddg: DataDependenceGraph,
    bb_data: BTreeMap<usize, BBData>,
    block_weights: BTreeMap<usize, usize>,
    queue: BinaryHeap<WeightedBlock>,
    in_queue: BTreeSet<usize>,
    current_block: usize,
}

impl<'m> DataDependenceGraphBuilder<'m> {
    pub fn new(machine: &'m Machine, options: BuilderOptions) -> DataDependenceGraphBuilder<'m> {
        let mut analyzers: Vec<Box<dyn MemoryAliasAnalyzer>> = Vec::new();
        if !options.disable_alias_analysis {
            if options.enable_constant_alias {
                analyzers.push(Box::new(ConstantAliasAnalyzer::new()));
            }
            if options.enable_offset_alias {
                analyzers.push(Box::new(OffsetAliasAnalyzer::new()));
            }
        }
        DataDependenceGraphBuilder {
            machine,
            options,
            analyzers,
            ddg: DataDependenceGraph::default(),
            bb_data: BTreeMap::new(),
            block_weights: BTreeMap::new(),
            queue: BinaryHeap::new(),
            in_queue: BTreeSet::new(),
            current_block: 0,
        }
    }

    /// Appends an analyzer to the consultation chain.
    pub fn add_alias_analyzer(&mut self, analyzer: Box<dyn MemoryAliasAnalyzer>) {
        self.analyzers.push(analyzer);
    }

    /// Builds the dependence graph of a whole procedure, propagating
    /// liveness across basic-block boundaries and over loop edges.
    pub fn build(&mut self, procedure: &Procedure) -> Result<DataDependenceGraph> {
        self.reset(procedure.name());

        let cfg = procedure.control_flow_graph();
        let entry = cfg.entry().ok_or_else(|| {
            ErrorKind::IllegalProgram(format!(
                "procedure {} has no entry block",
                procedure.name()
            ))
        })?;

        for block in procedure.blocks() {
            self.bb_data.insert(block.index(), BBData::new());
        }
        self.block_weights = cfg
            .graph()
            .compute_post_order(entry)?
            .into_iter()
            .enumerate()
            .map(|(weight, block)| (block, weight))
            .collect();

        // Register and operation dependencies.
        let entry_node = self.ddg.add_entry_node();
        self.process_entry_node(entry, entry_node);
        self.queue_block(entry);
        self.iterate_blocks(procedure, Phase::RegistersAndOperations)?;
        self.sweep_unreached(procedure, Phase::RegistersAndOperations)?;

        // Memory and function-unit state, over the now complete
        // operation topology.
        for bbd in self.bb_data.values_mut() {
            bbd.state = BlockState::Unreached;
            bbd.constructed = false;
        }
        self.queue_block(entry);
        self.iterate_blocks(procedure, Phase::MemoryAndFuState)?;
        self.sweep_unreached(procedure, Phase::MemoryAndFuState)?;

        if self.options.compute_register_deaths {
            self.search_register_deaths(procedure)?;
        }

        for bbd in self.bb_data.values_mut() {
            bbd.data.clear();
        }
        self.bb_data.clear();
        Ok(mem::replace(&mut self.ddg, DataDependenceGraph::default()))
    }

    /// Builds the dependence graph of a single basic block, with no
    /// inter-block propagation and no entry node.
    pub fn build_block(&mut self, block: &BasicBlock) -> Result<DataDependenceGraph> {
        self.reset(format!("block{}", block.index()));
        self.bb_data.insert(block.index(), BBData::new());
        self.current_block = block.index();

        self.construct_block(block, Phase::RegistersAndOperations)?;
        self.construct_block(block, Phase::MemoryAndFuState)?;

        if let Some(bbd) = self.bb_data.get_mut(&block.index()) {
            bbd.data.clear();
        }
        self.bb_data.clear();
        Ok(mem::replace(&mut self.ddg, DataDependenceGraph::default()))
    }

    fn reset<S: Into<String>>(&mut self, name: S) {
        self.ddg = DataDependenceGraph::new(name);
        self.bb_data.clear();
        self.block_weights.clear();
        self.queue.clear();
        self.in_queue.clear();
        self.current_block = 0;
    }

    fn data(&self) -> &LiveRangeData {
        &self.bb_data[&self.current_block].data
    }

    fn data_mut(&mut self) -> &mut LiveRangeData {
        &mut self
            .bb_data
            .get_mut(&self.current_block)
            .expect("current block has no data")
            .data
    }

    fn queue_block(&mut self, block: usize) {
        if !self.in_queue.insert(block) {
            return;
        }
        let weight = self.block_weights.get(&block).copied().unwrap_or(0);
        self.queue.push(WeightedBlock { weight, block });
        if let Some(bbd) = self.bb_data.get_mut(&block) {
            bbd.state = BlockState::Queued;
        }
    }

    fn pop_queued(&mut self) -> Option<usize> {
        let weighted = self.queue.pop()?;
        self.in_queue.remove(&weighted.block);
        Some(weighted.block)
    }

    /// The fixpoint loop: construct or update queued blocks and feed
    /// their outgoing state to successors until nothing is queued.
    fn iterate_blocks(&mut self, procedure: &Procedure, phase: Phase) -> Result<()> {
        while let Some(block) = self.pop_queued() {
            trace!("visiting block {} of {}", block, self.ddg.name());
            self.current_block = block;
            let constructed = self.bb_data[&block].constructed;

            if constructed {
                self.update_block(phase)?;
            } else {
                self.construct_block(procedure.block(block)?, phase)?;
            }
            if let Some(bbd) = self.bb_data.get_mut(&block) {
                bbd.state = BlockState::Ready;
            }

            let changed = match phase {
                Phase::RegistersAndOperations => self.update_registers_alive_after(block),
                Phase::MemoryAndFuState => self.update_mem_and_fu_alive_after(block),
            };
            if changed || !constructed {
                self.queue_successors(procedure, block, !constructed, phase)?;
            }
            if let Some(bbd) = self.bb_data.get_mut(&block) {
                bbd.constructed = true;
            }
        }
        Ok(())
    }

    /// Force-processes blocks the fixpoint never reached: dead blocks
    /// and blocks behind non-terminating loops.
    fn sweep_unreached(&mut self, procedure: &Procedure, phase: Phase) -> Result<()> {
        loop {
            let unreached = self
                .bb_data
                .iter()
                .find(|(_, bbd)| bbd.state == BlockState::Unreached)
                .map(|(block, _)| *block);
            match unreached {
                Some(block) => {
                    warn!(
                        "unreachable basic block {} in procedure {}",
                        block,
                        self.ddg.name()
                    );
                    self.queue_block(block);
                    self.iterate_blocks(procedure, phase)?;
                }
                None => return Ok(()),
            }
        }
    }

    /// Appends this block's outgoing liveness to every successor and
    /// queues successors whose input changed. Data crossing a back
    /// edge is marked loop carried.
    fn queue_successors(
        &mut self,
        procedure: &Procedure,
        block: usize,
        queue_all: bool,
        phase: Phase,
    ) -> Result<()> {
        let data = &self.bb_data[&block].data;
        let reg_def_after = data.reg_def_after.clone();
        let reg_use_after = data.reg_use_after.clone();
        let mem_def_after = data.mem_def_after.clone();
        let mem_use_after = data.mem_use_after.clone();
        let fu_dep_after = data.fu_dep_after.clone();

        let edges = procedure.control_flow_graph().edges_out(block)?.clone();
        for edge in &edges {
            let successor = edge.tail();
            let looped = edge.is_back_edge();
            let successor_data = match self.bb_data.get_mut(&successor) {
                Some(bbd) => &mut bbd.data,
                None => continue,
            };

            let changed = match phase {
                Phase::RegistersAndOperations => {
                    let mut changed = append_use_map_sets(
                        &reg_def_after,
                        &mut successor_data.reg_def_reaches,
                        looped,
                    );
                    changed |= append_use_map_sets(
                        &reg_use_after,
                        &mut successor_data.reg_use_reaches,
                        looped,
                    );
                    changed
                }
                Phase::MemoryAndFuState => {
                    let mut changed = append_use_map_sets(
                        &mem_def_after,
                        &mut successor_data.mem_def_reaches,
                        looped,
                    );
                    changed |= append_use_map_sets(
                        &mem_use_after,
                        &mut successor_data.mem_use_reaches,
                        looped,
                    );
                    changed |= append_use_sets(
                        &fu_dep_after,
                        &mut successor_data.fu_dep_reaches,
                        looped,
                    );
                    changed
                }
            };

            if changed || queue_all {
                self.queue_block(successor);
            }
        }
        Ok(())
    }

    /// One ordered pass over every move of the block.
    fn construct_block(&mut self, block: &BasicBlock, phase: Phase) -> Result<()> {
        for instruction in block.instructions() {
            for (slot, mv) in instruction.moves().iter().enumerate() {
                let at = MoveRef::new(block.index(), instruction.index(), slot);
                let node = match phase {
                    Phase::RegistersAndOperations => {
                        let node = self.ddg.add_move_node(mv.clone(), at);
                        if !mv.is_unconditional() {
                            self.process_guard(node)?;
                        }
                        self.process_source(node)?;
                        node
                    }
                    Phase::MemoryAndFuState => self.ddg.node_of_move(at)?,
                };
                self.process_destination(node, phase)?;
            }
        }

        let bbd = &self.bb_data[&self.current_block];
        if !bbd.dest_pending.is_empty() || !bbd.read_pending.is_empty() {
            let mut pending: Vec<String> = Vec::new();
            for &operation in bbd.dest_pending.iter().chain(bbd.read_pending.iter()) {
                pending.push(self.ddg.operation(operation).name().to_string());
            }
            bail!(ErrorKind::IllegalProgram(format!(
                "block {} ends with incomplete operations: {}; \
                 operation without result move?",
                block.index(),
                pending.join(", ")
            )));
        }
        Ok(())
    }

    /// Re-checks only the accesses whose dependence may come from
    /// outside the block against freshly arrived predecessor state.
    fn update_block(&mut self, phase: Phase) -> Result<()> {
        match phase {
            Phase::RegistersAndOperations => {
                let first_uses = self.data().reg_first_uses.clone();
                for (register, uses) in &first_uses {
                    for mnd in uses {
                        self.update_reg_use(*mnd, register);
                    }
                }
                let first_defines = self.data().reg_first_defines.clone();
                for (register, defines) in &first_defines {
                    for mnd in defines {
                        self.update_reg_write(*mnd, register);
                    }
                }
            }
            Phase::MemoryAndFuState => {
                let first_uses = self.data().mem_first_uses.clone();
                for (category, uses) in &first_uses {
                    for mnd in uses {
                        self.update_mem_use(*mnd, category);
                    }
                }
                let first_defines = self.data().mem_first_defines.clone();
                for (category, defines) in &first_defines {
                    for mnd in defines {
                        self.update_mem_write(*mnd, category);
                    }
                }
                let fu_deps: Vec<MoveNodeUse> = self.data().fu_deps.iter().copied().collect();
                let reaches: Vec<MoveNodeUse> =
                    self.data().fu_dep_reaches.iter().copied().collect();
                for mnd in fu_deps {
                    let signature = match self.ddg.destination_operation(mnd.node()) {
                        Some(operation) => operation.signature().clone(),
                        None => continue,
                    };
                    self.create_side_effect_edges(&reaches, mnd.node(), &signature);
                }
            }
        }
        Ok(())
    }

    /// Resolves a conditional move's guard register and records the
    /// guard read.
    fn process_guard(&mut self, node: NodeId) -> Result<()> {
        let guard = match self.ddg.node(node).guard() {
            Some(guard) => guard.clone(),
            None => return Ok(()),
        };
        match guard.guard_register() {
            Some(register) => {
                let name = register.name();
                self.process_reg_use(MoveNodeUse::guard_read(node), &name);
                Ok(())
            }
            None => bail!(ErrorKind::IllegalProgram(format!(
                "analysis for port guards not supported, used in {}",
                self.ddg.node(node)
            ))),
        }
    }

    fn process_source(&mut self, node: NodeId) -> Result<()> {
        let source = match self.ddg.node(node).as_move() {
            Some(mv) => mv.source().clone(),
            None => return Ok(()),
        };
        match source {
            Source::FuPort(port) => self.process_result_read(node, &port),
            Source::ReturnAddress => {
                self.process_reg_use(MoveNodeUse::return_address(node), RA_NAME);
                let is_return = self
                    .ddg
                    .node(node)
                    .as_move()
                    .map(|mv| mv.is_return())
                    .unwrap_or(false);
                if is_return {
                    self.process_return(node);
                }
                Ok(())
            }
            Source::Register(register) => {
                let name = register.name();
                self.process_reg_use(MoveNodeUse::new(node), &name);
                Ok(())
            }
            Source::Immediate(_) => Ok(()),
        }
    }

    fn process_destination(&mut self, node: NodeId, phase: Phase) -> Result<()> {
        let destination = match self.ddg.node(node).as_move() {
            Some(mv) => mv.destination().clone(),
            None => return Ok(()),
        };
        match destination {
            Destination::FuPort(port) => {
                let signature = self.machine.operation(port.operation())?.clone();
                if port.operand() == 0 || port.operand() > signature.inputs() {
                    bail!(ErrorKind::IllegalProgram(format!(
                        "operand slot {} out of range for {} in {}",
                        port.operand(),
                        signature.name(),
                        self.ddg.node(node)
                    )));
                }
                if port.is_trigger() {
                    match phase {
                        Phase::RegistersAndOperations => self.process_trigger(node, &signature),
                        Phase::MemoryAndFuState => {
                            self.process_trigger_memory_and_fu(node, &signature);
                            Ok(())
                        }
                    }
                } else if phase == Phase::RegistersAndOperations {
                    self.process_operand(node, &signature)
                } else {
                    Ok(())
                }
            }
            Destination::Register(register) => {
                if phase == Phase::RegistersAndOperations {
                    let name = register.name();
                    self.process_reg_write(MoveNodeUse::new(node), &name);
                }
                Ok(())
            }
            Destination::ReturnAddress => {
                if phase == Phase::RegistersAndOperations {
                    self.process_reg_write(MoveNodeUse::return_address(node), RA_NAME);
                }
                Ok(())
            }
            Destination::Call => {
                match phase {
                    Phase::RegistersAndOperations => self.process_call(node),
                    Phase::MemoryAndFuState => self.process_call_memory(node),
                }
                Ok(())
            }
            Destination::Jump => Ok(()),
        }
    }

    /// Calls clobber the return address and touch the convention
    /// registers without explicit moves.
    fn process_call(&mut self, node: NodeId) {
        let machine = self.machine;
        self.process_reg_write(MoveNodeUse::return_address(node), RA_NAME);

        let mnd = MoveNodeUse::pseudo(node);
        if let Some(sp) = machine.stack_pointer() {
            self.process_reg_use(mnd, sp);
        }
        if let Some(rv) = machine.return_value() {
            self.process_reg_use(mnd, rv);
            self.process_reg_write(mnd, rv);
        }
        if let Some(rv_high) = machine.return_value_high() {
            self.process_reg_write(mnd, rv_high);
        }
        for parameter in machine.parameter_registers() {
            self.process_reg_use(mnd, parameter);
        }
    }

    /// Returns read the convention registers the caller observes.
    fn process_return(&mut self, node: NodeId) {
        let machine = self.machine;
        let mnd = MoveNodeUse::pseudo(node);
        if let Some(sp) = machine.stack_pointer() {
            self.process_reg_use(mnd, sp);
        }
        if let Some(rv) = machine.return_value() {
            self.process_reg_use(mnd, rv);
        }
        if let Some(rv_high) = machine.return_value_high() {
            self.process_reg_use(mnd, rv_high);
        }
    }

    /// Seeds the entry block's reaching definitions with the synthetic
    /// entry node: return address, stack pointer, return value and
    /// parameter registers.
    fn process_entry_node(&mut self, entry_block: usize, entry_node: NodeId) {
        let machine = self.machine;
        if machine.stack_pointer().is_none() {
            warn!(
                "no stack pointer declared for {}; may misorder stack code",
                self.ddg.name()
            );
        }
        if machine.return_value().is_none() {
            warn!(
                "no return value register declared for {}; may misorder return values",
                self.ddg.name()
            );
        }

        let mut seeds: Vec<String> = vec![RA_NAME.to_string()];
        seeds.extend(machine.stack_pointer().map(str::to_string));
        seeds.extend(machine.return_value().map(str::to_string));
        seeds.extend(machine.return_value_high().map(str::to_string));
        seeds.extend(machine.parameter_registers().iter().cloned());

        let data = match self.bb_data.get_mut(&entry_block) {
            Some(bbd) => &mut bbd.data,
            None => return,
        };
        let mnd = MoveNodeUse::new(entry_node);
        for register in seeds {
            data.reg_def_reaches.entry(register).or_default().insert(mnd);
        }
    }
}

#[cfg(test)]
mod tests;
