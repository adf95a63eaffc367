//! Memory hazard tracking and function-unit state ordering.
//!
//! Accesses are split into categories that never alias; within one
//! category the alias-analyzer chain decides. Pseudo accesses (implied
//! by calls) have no address and are tracked in the default category
//! but checked against every category.

use crate::ddg::alias::AliasingResult;
use crate::ddg::builder::DataDependenceGraphBuilder;
use crate::ddg::live_range_data::append_use_sets;
use crate::ddg::{
    DependenceEdge, DependenceKind, DependenceType, MemoryCategory, MoveNodeUse, NodeId,
    PotentialKill, RegisterKill, UseMapSet,
};
use crate::machine::OperationSignature;
use crate::program::MoveAnnotation;

/// The accesses a check against `category` must consider: the whole
/// category, pseudo entries of every other category, or everything
/// when the checking access is itself pseudo.
fn scan_accesses(
    map: &UseMapSet<MemoryCategory>,
    category: &MemoryCategory,
    all: bool,
) -> Vec<MoveNodeUse> {
    let mut result: Vec<MoveNodeUse> = Vec::new();
    for (key, set) in map {
        if all || key == category {
            result.extend(set.iter().copied());
        } else {
            result.extend(set.iter().copied().filter(|mnd| mnd.is_pseudo()));
        }
    }
    result
}

impl<'m> DataDependenceGraphBuilder<'m> {
    fn memory_ordered(&self, node: NodeId) -> bool {
        self.ddg
            .node(node)
            .as_move()
            .map(|mv| mv.has_annotation(&MoveAnnotation::MemoryOrdered))
            .unwrap_or(false)
    }

    /// Consults the analyzer chain about two trigger moves; the first
    /// verdict other than Unknown wins.
    fn analyze_alias(&self, first: NodeId, second: NodeId) -> AliasingResult {
        let first = match self.ddg.destination_operation(first) {
            Some(operation) => operation,
            None => return AliasingResult::Unknown,
        };
        let second = match self.ddg.destination_operation(second) {
            Some(operation) => operation,
            None => return AliasingResult::Unknown,
        };
        for analyzer in &self.analyzers {
            let result = analyzer.analyze(&self.ddg, first, second);
            if result != AliasingResult::Unknown {
                return result;
            }
        }
        AliasingResult::Unknown
    }

    /// Whether some analyzer can say anything about this access's
    /// address.
    fn address_traceable(&self, node: NodeId) -> bool {
        let operation = match self.ddg.destination_operation(node) {
            Some(operation) => operation,
            None => return false,
        };
        self.analyzers
            .iter()
            .any(|analyzer| analyzer.is_address_traceable(&self.ddg, operation))
    }

    /// Compares one earlier access against the current one and creates
    /// a dependence unless the pair provably cannot alias. Returns
    /// whether the accesses certainly alias, which makes an
    /// unconditional write supersede the earlier access.
    fn check_and_create_mem_dep(
        &mut self,
        prev: MoveNodeUse,
        mnd: MoveNodeUse,
        dependence: DependenceType,
        category: &MemoryCategory,
    ) -> bool {
        if self.ddg.exclusive_guards(prev.node(), mnd.node()) {
            return false;
        }

        let mut result = AliasingResult::Unknown;
        if !prev.is_pseudo() && !mnd.is_pseudo() {
            if self.memory_ordered(prev.node()) && self.memory_ordered(mnd.node()) {
                // ordering-sensitive accesses keep their program order
                result = AliasingResult::Partial;
            } else {
                result = self.analyze_alias(prev.node(), mnd.node());
            }
        }
        if result == AliasingResult::False {
            return false;
        }
        let certain = result == AliasingResult::True;

        // the later access must wait for every input of the earlier
        // operation, address and data writes included
        let heads: Vec<NodeId> = match self.ddg.node(prev.node()).destination_operation() {
            Some(operation) if !prev.is_pseudo() => {
                self.ddg.operation(operation).input_nodes().to_vec()
            }
            _ => vec![prev.node()],
        };
        for head in heads {
            let mut edge =
                DependenceEdge::new(head, mnd.node(), DependenceKind::Memory, dependence);
            edge.set_data(category.to_string());
            edge.set_certain_alias(certain);
            edge.set_head_pseudo(prev.is_pseudo());
            edge.set_tail_pseudo(mnd.is_pseudo());
            edge.set_back_edge(prev.is_loop_edge());
            self.ddg.connect_or_merge(edge);
        }
        certain
    }

    /// Dependencies from accesses arriving from predecessor blocks to
    /// a memory read.
    pub(super) fn update_mem_use(&mut self, mnd: MoveNodeUse, category: &MemoryCategory) {
        let reaches = scan_accesses(&self.data().mem_def_reaches, category, mnd.is_pseudo());
        for prev in reaches {
            self.check_and_create_mem_dep(prev, mnd, DependenceType::Raw, category);
        }
    }

    /// Analyzes a memory read: dependence edges and bookkeeping.
    pub(super) fn process_mem_use(&mut self, mnd: MoveNodeUse, category: &MemoryCategory) {
        if !self.data().mem_kills.contains_key(category) {
            self.data_mut()
                .mem_first_uses
                .entry(category.clone())
                .or_default()
                .insert(mnd);
            self.update_mem_use(mnd, category);
        }

        let defines = scan_accesses(&self.data().mem_defines, category, mnd.is_pseudo());
        for prev in defines {
            self.check_and_create_mem_dep(prev, mnd, DependenceType::Raw, category);
        }

        let data = self.data_mut();
        if let Some(potential) = data.potential_mem_kills.get_mut(category) {
            potential.used_between = true;
        }
        data.mem_last_uses
            .entry(category.clone())
            .or_default()
            .insert(mnd);
    }

    /// Antidependencies from accesses arriving from predecessor blocks
    /// to a memory write.
    pub(super) fn update_mem_write(&mut self, mnd: MoveNodeUse, category: &MemoryCategory) {
        let def_reaches = scan_accesses(&self.data().mem_def_reaches, category, mnd.is_pseudo());
        for prev in def_reaches {
            self.check_and_create_mem_dep(prev, mnd, DependenceType::Waw, category);
        }
        let use_reaches = scan_accesses(&self.data().mem_use_reaches, category, mnd.is_pseudo());
        for prev in use_reaches {
            self.check_and_create_mem_dep(prev, mnd, DependenceType::War, category);
        }
    }

    /// Analyzes a memory write: dependence edges, kill formation and
    /// bookkeeping. A write through an address no analyzer can trace
    /// supersedes its whole category when unconditional.
    pub(super) fn process_mem_write(&mut self, mnd: MoveNodeUse, category: &MemoryCategory) {
        let unconditional = self.ddg.node(mnd.node()).is_unconditional();
        let traceable = self.address_traceable(mnd.node());
        let barrier = unconditional && !traceable;

        let mut completed_pair: Option<PotentialKill> = None;
        if !self.data().mem_kills.contains_key(category) {
            if barrier {
                self.data_mut()
                    .mem_kills
                    .insert(category.clone(), RegisterKill::Single(mnd));
            } else if !traceable {
                if let Some(potential) = self.data().potential_mem_kills.get(category).copied() {
                    if self
                        .ddg
                        .exclusive_guards(potential.write.node(), mnd.node())
                    {
                        self.data_mut().mem_kills.insert(
                            category.clone(),
                            RegisterKill::Pair(potential.write, mnd),
                        );
                        completed_pair = Some(potential);
                    }
                }
            }
            self.data_mut()
                .mem_first_defines
                .entry(category.clone())
                .or_default()
                .insert(mnd);
            self.update_mem_write(mnd, category);
        }

        let defines = scan_accesses(&self.data().mem_defines, category, mnd.is_pseudo());
        for prev in defines {
            if self.check_and_create_mem_dep(prev, mnd, DependenceType::Waw, category)
                && unconditional
            {
                for set in self.data_mut().mem_defines.values_mut() {
                    set.remove(&prev);
                }
            }
        }

        let last_uses = scan_accesses(&self.data().mem_last_uses, category, mnd.is_pseudo());
        for prev in last_uses {
            if self.check_and_create_mem_dep(prev, mnd, DependenceType::War, category)
                && unconditional
            {
                for set in self.data_mut().mem_last_uses.values_mut() {
                    set.remove(&prev);
                }
            }
        }

        let data = self.data_mut();
        if barrier {
            if mnd.is_pseudo() {
                // a call clobbers every category
                let mut categories: Vec<MemoryCategory> = Vec::new();
                categories.extend(data.mem_defines.keys().cloned());
                categories.extend(data.mem_last_uses.keys().cloned());
                categories.extend(data.mem_def_reaches.keys().cloned());
                categories.extend(data.mem_use_reaches.keys().cloned());
                for key in categories {
                    data.mem_kills
                        .entry(key)
                        .or_insert(RegisterKill::Single(mnd));
                }
                data.mem_defines.clear();
                data.mem_last_uses.clear();
                data.potential_mem_kills.clear();
            } else {
                data.mem_defines.remove(category);
                data.mem_last_uses.remove(category);
                data.potential_mem_kills.remove(category);
            }
        } else if let Some(potential) = completed_pair {
            if let Some(set) = data.mem_defines.get_mut(category) {
                set.retain(|definition| *definition == potential.write);
            }
            if !potential.used_between {
                data.mem_last_uses.remove(category);
            }
            data.potential_mem_kills.remove(category);
        } else if !traceable {
            data.potential_mem_kills.insert(
                category.clone(),
                PotentialKill {
                    write: mnd,
                    used_between: false,
                },
            );
        }

        data.mem_defines
            .entry(category.clone())
            .or_default()
            .insert(mnd);
    }

    /// Ordering among operations sharing function-unit state.
    pub(super) fn create_side_effect_edges(
        &mut self,
        previous: &[MoveNodeUse],
        node: NodeId,
        signature: &OperationSignature,
    ) {
        if !signature.has_side_effects()
            && signature.affects_count() == 0
            && signature.affected_by_count() == 0
        {
            return;
        }
        for prev in previous {
            let prev_signature = match self.ddg.destination_operation(prev.node()) {
                Some(operation) => operation.signature().clone(),
                None => continue,
            };
            let related = (prev_signature.name() == signature.name()
                && prev_signature.has_side_effects())
                || signature.depends_on(&prev_signature)
                || prev_signature.depends_on(signature);
            if related {
                let mut edge = DependenceEdge::new(
                    prev.node(),
                    node,
                    DependenceKind::FuState,
                    DependenceType::Unknown,
                );
                edge.set_back_edge(prev.is_loop_edge());
                self.ddg.connect_or_merge(edge);
            }
        }
    }

    /// The memory-phase analysis of a triggering move: memory hazards
    /// of loads and stores, then function-unit state.
    pub(super) fn process_trigger_memory_and_fu(
        &mut self,
        node: NodeId,
        signature: &OperationSignature,
    ) {
        let category = self
            .ddg
            .node(node)
            .as_move()
            .map(MemoryCategory::of_move)
            .unwrap_or(MemoryCategory::Default);
        if signature.writes_memory() {
            self.process_mem_write(MoveNodeUse::new(node), &category);
        } else if signature.reads_memory() {
            self.process_mem_use(MoveNodeUse::new(node), &category);
        }

        let fu_deps: Vec<MoveNodeUse> = self.data().fu_deps.iter().copied().collect();
        self.create_side_effect_edges(&fu_deps, node, signature);
        let fu_dep_reaches: Vec<MoveNodeUse> =
            self.data().fu_dep_reaches.iter().copied().collect();
        self.create_side_effect_edges(&fu_dep_reaches, node, signature);

        if signature.has_side_effects()
            || signature.affects_count() != 0
            || signature.affected_by_count() != 0
        {
            let unconditional = self.ddg.node(node).is_unconditional();
            if signature.has_side_effects() && unconditional {
                // keep only the newest access of each side-effecting
                // operation; bounds the edge count
                let stale: Option<MoveNodeUse> =
                    self.data().fu_deps.iter().copied().find(|prev| {
                        self.ddg
                            .destination_operation(prev.node())
                            .map(|operation| operation.name() == signature.name())
                            .unwrap_or(false)
                    });
                if let Some(stale) = stale {
                    self.data_mut().fu_deps.remove(&stale);
                }
            }
            self.data_mut().fu_deps.insert(MoveNodeUse::new(node));
        }
    }

    /// In the memory phase a call is a pseudo write ordered against
    /// every category.
    pub(super) fn process_call_memory(&mut self, node: NodeId) {
        self.process_mem_write(MoveNodeUse::pseudo(node), &MemoryCategory::Default);
    }

    /// Recomputes the memory and function-unit state this block
    /// presents to its successors. Returns true if anything changed.
    pub(super) fn update_mem_and_fu_alive_after(&mut self, block: usize) -> bool {
        let data = match self.bb_data.get_mut(&block) {
            Some(bbd) => &mut bbd.data,
            None => return false,
        };
        let mut changed = false;

        let categories: Vec<MemoryCategory> = data.mem_def_reaches.keys().cloned().collect();
        for category in categories {
            if data.mem_kills.contains_key(&category) {
                continue;
            }
            let reaching = data.mem_def_reaches[&category].clone();
            let after = data.mem_def_after.entry(category).or_default();
            changed |= append_use_sets(&reaching, after, false);
        }
        let categories: Vec<MemoryCategory> = data.mem_use_reaches.keys().cloned().collect();
        for category in categories {
            if data.mem_kills.contains_key(&category) {
                continue;
            }
            let reaching = data.mem_use_reaches[&category].clone();
            let after = data.mem_use_after.entry(category).or_default();
            changed |= append_use_sets(&reaching, after, false);
        }

        let defines = data.mem_defines.clone();
        for (category, set) in defines {
            let after = data.mem_def_after.entry(category).or_default();
            changed |= append_use_sets(&set, after, false);
        }
        let last_uses = data.mem_last_uses.clone();
        for (category, set) in last_uses {
            let after = data.mem_use_after.entry(category).or_default();
            changed |= append_use_sets(&set, after, false);
        }

        let fu_deps = data.fu_deps.clone();
        changed |= append_use_sets(&fu_deps, &mut data.fu_dep_after, false);
        let fu_dep_reaches = data.fu_dep_reaches.clone();
        changed |= append_use_sets(&fu_dep_reaches, &mut data.fu_dep_after, false);

        changed
    }
}
