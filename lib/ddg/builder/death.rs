//! Backward liveness over the control-flow graph: which registers are
//! still read at or beyond each block. The complement over a block's
//! last uses marks true register deaths, which a renamer may recycle.

use crate::ddg::builder::DataDependenceGraphBuilder;
use crate::error::*;
use crate::program::Procedure;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

impl<'m> DataDependenceGraphBuilder<'m> {
    /// Registers this block or anything after it still reads: the
    /// union of the successors' sets plus the block's own reads whose
    /// definition may originate before the block.
    fn registers_used_in_or_after(
        &self,
        block: usize,
        used_after: &BTreeMap<usize, BTreeSet<String>>,
    ) -> BTreeSet<String> {
        let mut used = used_after.get(&block).cloned().unwrap_or_default();
        if let Some(bbd) = self.bb_data.get(&block) {
            used.extend(bbd.data.reg_first_uses.keys().cloned());
        }
        used
    }

    /// Backward fixpoint seeded from every control-flow sink,
    /// propagating used-at-or-after register sets to predecessors
    /// until nothing grows. Blocks unreachable backward from any sink
    /// (non-terminating loops) are force-processed afterwards.
    pub(super) fn search_register_deaths(&mut self, procedure: &Procedure) -> Result<()> {
        let cfg = procedure.control_flow_graph();
        let mut used_after: BTreeMap<usize, BTreeSet<String>> = BTreeMap::new();
        for block in procedure.blocks() {
            used_after.insert(block.index(), BTreeSet::new());
        }

        let mut queue: VecDeque<usize> = VecDeque::new();
        let mut in_queue: BTreeSet<usize> = BTreeSet::new();
        let mut processed: BTreeSet<usize> = BTreeSet::new();
        for block in cfg.graph().sink_indices() {
            queue.push_back(block);
            in_queue.insert(block);
        }

        loop {
            while let Some(block) = queue.pop_front() {
                in_queue.remove(&block);
                processed.insert(block);

                let used = self.registers_used_in_or_after(block, &used_after);
                for edge in cfg.edges_in(block)? {
                    let predecessor = edge.head();
                    let set = used_after.entry(predecessor).or_default();
                    let size = set.len();
                    set.extend(used.iter().cloned());
                    let grew = set.len() > size;
                    if (grew || !processed.contains(&predecessor))
                        && in_queue.insert(predecessor)
                    {
                        queue.push_back(predecessor);
                    }
                }
            }

            let unprocessed = used_after
                .keys()
                .find(|block| !processed.contains(block))
                .copied();
            match unprocessed {
                Some(block) => {
                    warn!(
                        "block {} in procedure {} never reaches an exit",
                        block,
                        procedure.name()
                    );
                    queue.push_back(block);
                    in_queue.insert(block);
                }
                None => break,
            }
        }

        self.ddg.set_registers_used_after(used_after);
        Ok(())
    }
}
