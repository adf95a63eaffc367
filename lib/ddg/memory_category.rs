use crate::program::{Move, MoveAnnotation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The disambiguation category of a memory access.
///
/// Accesses in distinct categories are assumed never to alias and get
/// fully separate dependence bookkeeping.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum MemoryCategory {
    SpillSlot,
    ReturnAddressSlot,
    RestrictPointer(String),
    WorkItem(u32),
    AddressSpace(u32),
    Default,
}

impl MemoryCategory {
    /// Derives the category of the access triggered by `mv`. The first
    /// matching annotation wins, in the declaration order of the
    /// variants.
    pub fn of_move(mv: &Move) -> MemoryCategory {
        for annotation in mv.annotations() {
            match annotation {
                MoveAnnotation::SpillSlotAccess => return MemoryCategory::SpillSlot,
                MoveAnnotation::ReturnAddressSlotAccess => {
                    return MemoryCategory::ReturnAddressSlot;
                }
                _ => {}
            }
        }
        for annotation in mv.annotations() {
            match annotation {
                MoveAnnotation::RestrictPointer(name) => {
                    return MemoryCategory::RestrictPointer(name.clone());
                }
                MoveAnnotation::WorkItemId(id) => return MemoryCategory::WorkItem(*id),
                MoveAnnotation::AddressSpace(id) => return MemoryCategory::AddressSpace(*id),
                _ => {}
            }
        }
        MemoryCategory::Default
    }
}

impl fmt::Display for MemoryCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MemoryCategory::SpillSlot => write!(f, "spill"),
            MemoryCategory::ReturnAddressSlot => write!(f, "ra-slot"),
            MemoryCategory::RestrictPointer(name) => write!(f, "restrict:{}", name),
            MemoryCategory::WorkItem(id) => write!(f, "work-item:{}", id),
            MemoryCategory::AddressSpace(id) => write!(f, "as:{}", id),
            MemoryCategory::Default => write!(f, "mem"),
        }
    }
}

#[cfg(test)]
mod category_tests {
    use super::*;
    use crate::program::{Destination, Register, Source};

    fn annotated(annotations: Vec<MoveAnnotation>) -> Move {
        let mut mv = Move::new(
            Source::Immediate(0),
            Destination::Register(Register::new("RF", 0)),
        );
        for annotation in annotations {
            mv.annotate(annotation);
        }
        mv
    }

    #[test]
    fn spill_beats_address_space() {
        let mv = annotated(vec![
            MoveAnnotation::AddressSpace(2),
            MoveAnnotation::SpillSlotAccess,
        ]);
        assert_eq!(MemoryCategory::of_move(&mv), MemoryCategory::SpillSlot);
    }

    #[test]
    fn unannotated_is_default() {
        let mv = annotated(vec![MoveAnnotation::MemoryOrdered]);
        assert_eq!(MemoryCategory::of_move(&mv), MemoryCategory::Default);
    }
}
