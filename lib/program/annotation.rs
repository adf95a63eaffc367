use serde::{Deserialize, Serialize};
use std::fmt;

/// Side-band information a front end attaches to a move.
///
/// Memory-access annotations drive the category split and the ordering
/// hints of memory dependence analysis.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum MoveAnnotation {
    /// The access touches a register-spill stack slot.
    SpillSlotAccess,
    /// The access touches the saved-return-address stack slot.
    ReturnAddressSlotAccess,
    /// The access goes through the given address space.
    AddressSpace(u32),
    /// The access goes through a restrict-qualified pointer of the
    /// given name.
    RestrictPointer(String),
    /// The access belongs to the given parallel work item.
    WorkItemId(u32),
    /// The access is ordering-sensitive; two such accesses must keep
    /// their program order regardless of alias analysis.
    MemoryOrdered,
}

impl fmt::Display for MoveAnnotation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MoveAnnotation::SpillSlotAccess => write!(f, "spill"),
            MoveAnnotation::ReturnAddressSlotAccess => write!(f, "ra-slot"),
            MoveAnnotation::AddressSpace(id) => write!(f, "as:{}", id),
            MoveAnnotation::RestrictPointer(name) => write!(f, "restrict:{}", name),
            MoveAnnotation::WorkItemId(id) => write!(f, "work-item:{}", id),
            MoveAnnotation::MemoryOrdered => write!(f, "ordered"),
        }
    }
}
