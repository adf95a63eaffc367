//! Register hazard tracking: RAW, WAR and WAW edges over register
//! names, including guarded writes and kill pairs.

use crate::ddg::builder::DataDependenceGraphBuilder;
use crate::ddg::live_range_data::append_use_sets;
use crate::ddg::{
    DependenceEdge, DependenceKind, DependenceType, MoveNodeUse, PotentialKill, RegisterKill,
};

impl<'m> DataDependenceGraphBuilder<'m> {
    fn register_kind(mnd: &MoveNodeUse) -> DependenceKind {
        if mnd.is_return_address() {
            DependenceKind::ReturnAddress
        } else {
            DependenceKind::Register
        }
    }

    fn create_reg_raw(&mut self, source: &MoveNodeUse, current: &MoveNodeUse, register: &str) {
        let mut edge = DependenceEdge::new(
            source.node(),
            current.node(),
            Self::register_kind(current),
            DependenceType::Raw,
        );
        edge.set_data(register);
        edge.set_guard_use(current.is_guard());
        edge.set_head_pseudo(source.is_pseudo());
        edge.set_tail_pseudo(current.is_pseudo());
        edge.set_back_edge(source.is_loop_edge());
        self.ddg.connect_or_merge(edge);
    }

    fn create_reg_war(&mut self, source: &MoveNodeUse, current: &MoveNodeUse, register: &str) {
        let mut edge = DependenceEdge::new(
            source.node(),
            current.node(),
            Self::register_kind(current),
            DependenceType::War,
        );
        edge.set_data(register);
        edge.set_guard_use(source.is_guard());
        edge.set_head_pseudo(source.is_pseudo());
        edge.set_tail_pseudo(current.is_pseudo());
        edge.set_back_edge(source.is_loop_edge());
        self.ddg.connect_or_merge(edge);
    }

    /// No output dependencies from the entry node; its definitions are
    /// not moves.
    fn create_reg_waw(&mut self, source: &MoveNodeUse, current: &MoveNodeUse, register: &str) {
        if !self.ddg.node(source.node()).is_move() {
            return;
        }
        let mut edge = DependenceEdge::new(
            source.node(),
            current.node(),
            Self::register_kind(current),
            DependenceType::Waw,
        );
        edge.set_data(register);
        edge.set_head_pseudo(source.is_pseudo());
        edge.set_tail_pseudo(current.is_pseudo());
        edge.set_back_edge(source.is_loop_edge());
        self.ddg.connect_or_merge(edge);
    }

    /// Dependencies from definitions arriving from predecessor blocks
    /// to a register read.
    pub(super) fn update_reg_use(&mut self, mnd: MoveNodeUse, register: &str) {
        let reaches: Vec<MoveNodeUse> = self
            .data()
            .reg_def_reaches
            .get(register)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for definition in reaches {
            if !self.ddg.exclusive_guards(definition.node(), mnd.node()) {
                self.create_reg_raw(&definition, &mnd, register);
            }
        }
    }

    /// Analyzes a read of a register: dependencies and bookkeeping.
    pub(super) fn process_reg_use(&mut self, mnd: MoveNodeUse, register: &str) {
        if !self.data().reg_kills.contains_key(register) {
            self.data_mut()
                .reg_first_uses
                .entry(register.to_string())
                .or_default()
                .insert(mnd);
            self.update_reg_use(mnd, register);
        }

        // can be several simultaneous definitions under guards
        let defines: Vec<MoveNodeUse> = self
            .data()
            .reg_defines
            .get(register)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for definition in defines {
            if !self.ddg.exclusive_guards(definition.node(), mnd.node()) {
                self.create_reg_raw(&definition, &mnd, register);
            }
        }

        let data = self.data_mut();
        if let Some(potential) = data.potential_reg_kills.get_mut(register) {
            potential.used_between = true;
        }
        data.reg_last_uses
            .entry(register.to_string())
            .or_default()
            .insert(mnd);
    }

    /// Antidependencies from state arriving from predecessor blocks to
    /// a register write.
    pub(super) fn update_reg_write(&mut self, mnd: MoveNodeUse, register: &str) {
        let def_reaches: Vec<MoveNodeUse> = self
            .data()
            .reg_def_reaches
            .get(register)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for definition in def_reaches {
            if !self.ddg.exclusive_guards(definition.node(), mnd.node()) {
                self.create_reg_waw(&definition, &mnd, register);
            }
        }

        let use_reaches: Vec<MoveNodeUse> = self
            .data()
            .reg_use_reaches
            .get(register)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for previous_use in use_reaches {
            if !self.ddg.exclusive_guards(previous_use.node(), mnd.node()) {
                self.create_reg_war(&previous_use, &mnd, register);
            }
        }
    }

    /// Analyzes a write to a register: dependence edges, kill
    /// formation and bookkeeping.
    pub(super) fn process_reg_write(&mut self, mnd: MoveNodeUse, register: &str) {
        let unconditional = self.ddg.node(mnd.node()).is_unconditional();

        let mut completed_pair: Option<PotentialKill> = None;
        if !self.data().reg_kills.contains_key(register) {
            if unconditional {
                self.data_mut()
                    .reg_kills
                    .insert(register.to_string(), RegisterKill::Single(mnd));
            } else if let Some(potential) =
                self.data().potential_reg_kills.get(register).copied()
            {
                // two writes under complementary guards jointly
                // supersede everything before them
                if self
                    .ddg
                    .exclusive_guards(potential.write.node(), mnd.node())
                {
                    self.data_mut()
                        .reg_kills
                        .insert(register.to_string(), RegisterKill::Pair(potential.write, mnd));
                    completed_pair = Some(potential);
                }
            }
            self.data_mut()
                .reg_first_defines
                .entry(register.to_string())
                .or_default()
                .insert(mnd);
            self.update_reg_write(mnd, register);
        }

        let defines: Vec<MoveNodeUse> = self
            .data()
            .reg_defines
            .get(register)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        let mut superseded: Vec<MoveNodeUse> = Vec::new();
        for definition in defines {
            if self.ddg.exclusive_guards(definition.node(), mnd.node()) {
                continue;
            }
            self.create_reg_waw(&definition, &mnd, register);
            if self.ddg.same_guards(definition.node(), mnd.node()) {
                superseded.push(definition);
            }
        }

        let last_uses: Vec<MoveNodeUse> = self
            .data()
            .reg_last_uses
            .get(register)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        for previous_use in last_uses {
            if !self.ddg.exclusive_guards(previous_use.node(), mnd.node()) {
                self.create_reg_war(&previous_use, &mnd, register);
            }
        }

        let data = self.data_mut();
        if let Some(set) = data.reg_defines.get_mut(register) {
            for definition in &superseded {
                set.remove(definition);
            }
        }

        if unconditional {
            // hard kill
            data.reg_defines.remove(register);
            data.reg_last_uses.remove(register);
            data.potential_reg_kills.remove(register);
        } else if let Some(potential) = completed_pair {
            if let Some(set) = data.reg_defines.get_mut(register) {
                set.retain(|definition| *definition == potential.write);
            }
            if !potential.used_between {
                data.reg_last_uses.remove(register);
            }
            data.potential_reg_kills.remove(register);
        } else {
            data.potential_reg_kills.insert(
                register.to_string(),
                PotentialKill {
                    write: mnd,
                    used_between: false,
                },
            );
        }

        data.reg_defines
            .entry(register.to_string())
            .or_default()
            .insert(mnd);
    }

    /// Recomputes the register liveness this block presents to its
    /// successors. Returns true if anything changed.
    pub(super) fn update_registers_alive_after(&mut self, block: usize) -> bool {
        let data = match self.bb_data.get_mut(&block) {
            Some(bbd) => &mut bbd.data,
            None => return false,
        };
        let mut changed = false;

        // definitions pass through unless killed here
        let registers: Vec<String> = data.reg_def_reaches.keys().cloned().collect();
        for register in registers {
            if data.reg_kills.contains_key(&register) {
                continue;
            }
            let reaching = data.reg_def_reaches[&register].clone();
            let after = data
                .reg_def_after
                .entry(register)
                .or_default();
            changed |= append_use_sets(&reaching, after, false);
        }
        let defines = data.reg_defines.clone();
        for (register, set) in defines {
            let after = data.reg_def_after.entry(register).or_default();
            changed |= append_use_sets(&set, after, false);
        }

        let registers: Vec<String> = data.reg_use_reaches.keys().cloned().collect();
        for register in registers {
            if data.reg_kills.contains_key(&register) {
                continue;
            }
            let reaching = data.reg_use_reaches[&register].clone();
            let after = data
                .reg_use_after
                .entry(register)
                .or_default();
            changed |= append_use_sets(&reaching, after, false);
        }
        let last_uses = data.reg_last_uses.clone();
        for (register, set) in last_uses {
            let after = data.reg_use_after.entry(register).or_default();
            changed |= append_use_sets(&set, after, false);
        }

        changed
    }
}
