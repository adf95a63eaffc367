use crate::ddg::{MemoryCategory, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A reference to a move node acting as a register or memory access,
/// with the flags dependence bookkeeping needs about the role of the
/// access.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct MoveNodeUse {
    node: NodeId,
    /// The access reads the value as a guard.
    guard: bool,
    /// The access goes through the return-address port.
    ra: bool,
    /// The access is implied by a call or return.
    pseudo: bool,
    /// The access reaches the current block over a back edge.
    loop_edge: bool,
}

impl MoveNodeUse {
    pub fn new(node: NodeId) -> MoveNodeUse {
        MoveNodeUse {
            node,
            guard: false,
            ra: false,
            pseudo: false,
            loop_edge: false,
        }
    }

    pub fn guard_read(node: NodeId) -> MoveNodeUse {
        MoveNodeUse {
            guard: true,
            ..MoveNodeUse::new(node)
        }
    }

    pub fn return_address(node: NodeId) -> MoveNodeUse {
        MoveNodeUse {
            ra: true,
            ..MoveNodeUse::new(node)
        }
    }

    pub fn pseudo(node: NodeId) -> MoveNodeUse {
        MoveNodeUse {
            pseudo: true,
            ..MoveNodeUse::new(node)
        }
    }

    /// A copy of this use as seen from across a back edge.
    pub fn looped(&self) -> MoveNodeUse {
        MoveNodeUse {
            loop_edge: true,
            ..*self
        }
    }

    pub fn node(&self) -> NodeId {
        self.node
    }
    pub fn is_guard(&self) -> bool {
        self.guard
    }
    pub fn is_return_address(&self) -> bool {
        self.ra
    }
    pub fn is_pseudo(&self) -> bool {
        self.pseudo
    }
    pub fn is_loop_edge(&self) -> bool {
        self.loop_edge
    }
}

impl fmt::Display for MoveNodeUse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.node)?;
        if self.guard {
            write!(f, " guard")?;
        }
        if self.ra {
            write!(f, " ra")?;
        }
        if self.pseudo {
            write!(f, " pseudo")?;
        }
        if self.loop_edge {
            write!(f, " loop")?;
        }
        Ok(())
    }
}

/// What fully supersedes earlier values of a register or memory
/// category within a block.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum RegisterKill {
    /// An unconditional write.
    Single(MoveNodeUse),
    /// Two writes under complementary guards.
    Pair(MoveNodeUse, MoveNodeUse),
}

/// A guarded write that kills its register if a later write under the
/// complementary guard appears in the same block.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PotentialKill {
    pub write: MoveNodeUse,
    /// A read of the register occurred between the two halves; earlier
    /// last-uses must then be retained when the pair completes.
    pub used_between: bool,
}

pub type UseSet = BTreeSet<MoveNodeUse>;
pub type UseMapSet<K> = BTreeMap<K, UseSet>;

/// Appends `src` into `dst`, optionally marking the copied entries as
/// loop carried. Returns true if `dst` changed.
pub(crate) fn append_use_sets(src: &UseSet, dst: &mut UseSet, looped: bool) -> bool {
    let size = dst.len();
    for mnu in src {
        if looped {
            dst.insert(mnu.looped());
        } else {
            dst.insert(*mnu);
        }
    }
    dst.len() > size
}

/// Appends every set of `src` to the corresponding set of `dst`.
/// Returns true if any destination set changed.
pub(crate) fn append_use_map_sets<K: Clone + Ord>(
    src: &UseMapSet<K>,
    dst: &mut UseMapSet<K>,
    looped: bool,
) -> bool {
    let mut changed = false;
    for (key, src_set) in src {
        let dst_set = dst.entry(key.clone()).or_insert_with(UseSet::new);
        changed |= append_use_sets(src_set, dst_set, looped);
    }
    changed
}

/// Per-block dependence bookkeeping, mutable while the block is under
/// construction.
///
/// Register sections are keyed by register name, memory sections by
/// `MemoryCategory`. The `*_reaches` maps hold state arriving from
/// predecessors, the `*_after` maps the state this block presents to
/// successors. `clear` releases everything once no later phase needs
/// the record.
#[derive(Clone, Debug, Default)]
pub struct LiveRangeData {
    pub(crate) reg_defines: UseMapSet<String>,
    pub(crate) reg_last_uses: UseMapSet<String>,
    pub(crate) reg_first_defines: UseMapSet<String>,
    pub(crate) reg_first_uses: UseMapSet<String>,
    pub(crate) reg_kills: BTreeMap<String, RegisterKill>,
    pub(crate) potential_reg_kills: BTreeMap<String, PotentialKill>,
    pub(crate) reg_def_reaches: UseMapSet<String>,
    pub(crate) reg_use_reaches: UseMapSet<String>,
    pub(crate) reg_def_after: UseMapSet<String>,
    pub(crate) reg_use_after: UseMapSet<String>,

    pub(crate) mem_defines: UseMapSet<MemoryCategory>,
    pub(crate) mem_last_uses: UseMapSet<MemoryCategory>,
    pub(crate) mem_first_defines: UseMapSet<MemoryCategory>,
    pub(crate) mem_first_uses: UseMapSet<MemoryCategory>,
    pub(crate) mem_kills: BTreeMap<MemoryCategory, RegisterKill>,
    pub(crate) potential_mem_kills: BTreeMap<MemoryCategory, PotentialKill>,
    pub(crate) mem_def_reaches: UseMapSet<MemoryCategory>,
    pub(crate) mem_use_reaches: UseMapSet<MemoryCategory>,
    pub(crate) mem_def_after: UseMapSet<MemoryCategory>,
    pub(crate) mem_use_after: UseMapSet<MemoryCategory>,

    pub(crate) fu_deps: UseSet,
    pub(crate) fu_dep_reaches: UseSet,
    pub(crate) fu_dep_after: UseSet,
}

impl LiveRangeData {
    pub fn new() -> LiveRangeData {
        LiveRangeData::default()
    }

    /// Live definitions of `register` at the current end of the block.
    pub fn defines(&self, register: &str) -> Option<&UseSet> {
        self.reg_defines.get(register)
    }

    /// The block's kill of `register`, if one has formed.
    pub fn kill(&self, register: &str) -> Option<&RegisterKill> {
        self.reg_kills.get(register)
    }

    /// Registers read in this block before any block-local kill; their
    /// reaching definition may originate outside the block.
    pub fn inbound_registers(&self) -> impl Iterator<Item = &String> {
        self.reg_first_uses.keys()
    }

    /// Releases all bookkeeping. Called once no later construction
    /// phase reads this record.
    pub fn clear(&mut self) {
        *self = LiveRangeData::default();
    }
}
