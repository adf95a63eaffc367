//! Target machine description consumed by dependence analysis.
//!
//! Only the properties the analysis needs are modelled: hardware
//! operation signatures (arity, memory behavior, side effects) and the
//! calling-convention registers used to seed procedure entry state.

use crate::error::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// The signature of one hardware operation.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct OperationSignature {
    name: String,
    inputs: usize,
    outputs: usize,
    reads_memory: bool,
    writes_memory: bool,
    side_effects: bool,
    /// Names of operations whose function-unit state this one alters.
    affects: BTreeSet<String>,
    /// Names of operations whose function-unit state alters this one.
    affected_by: BTreeSet<String>,
    /// Width of a memory access in bytes, 0 when not a memory operation
    /// or unknown.
    memory_width: usize,
}

impl OperationSignature {
    pub fn new<S: Into<String>>(name: S, inputs: usize, outputs: usize) -> OperationSignature {
        OperationSignature {
            name: name.into(),
            inputs,
            outputs,
            reads_memory: false,
            writes_memory: false,
            side_effects: false,
            affects: BTreeSet::new(),
            affected_by: BTreeSet::new(),
            memory_width: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn inputs(&self) -> usize {
        self.inputs
    }
    pub fn outputs(&self) -> usize {
        self.outputs
    }
    pub fn reads_memory(&self) -> bool {
        self.reads_memory
    }
    pub fn writes_memory(&self) -> bool {
        self.writes_memory
    }
    pub fn accesses_memory(&self) -> bool {
        self.reads_memory || self.writes_memory
    }
    pub fn has_side_effects(&self) -> bool {
        self.side_effects
    }
    pub fn memory_width(&self) -> usize {
        self.memory_width
    }

    pub fn set_reads_memory(&mut self, reads_memory: bool) {
        self.reads_memory = reads_memory;
    }
    pub fn set_writes_memory(&mut self, writes_memory: bool) {
        self.writes_memory = writes_memory;
    }
    pub fn set_side_effects(&mut self, side_effects: bool) {
        self.side_effects = side_effects;
    }
    pub fn set_memory_width(&mut self, memory_width: usize) {
        self.memory_width = memory_width;
    }
    pub fn add_affects<S: Into<String>>(&mut self, operation: S) {
        self.affects.insert(operation.into());
    }
    pub fn add_affected_by<S: Into<String>>(&mut self, operation: S) {
        self.affected_by.insert(operation.into());
    }

    pub fn affects_count(&self) -> usize {
        self.affects.len()
    }
    pub fn affected_by_count(&self) -> usize {
        self.affected_by.len()
    }

    /// True if the function-unit state written or read by `other` is
    /// visible to this operation.
    pub fn depends_on(&self, other: &OperationSignature) -> bool {
        self.affected_by.contains(other.name()) || self.affects.contains(other.name())
    }
}

impl fmt::Display for OperationSignature {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}:{}", self.name, self.inputs, self.outputs)
    }
}

/// A machine description: operation signatures plus the registers the
/// calling convention assigns a fixed role.
///
/// Registers are identified by their rendered name, e.g. `"RF.2"`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Machine {
    operations: BTreeMap<String, OperationSignature>,
    stack_pointer: Option<String>,
    return_value: Option<String>,
    return_value_high: Option<String>,
    parameter_registers: Vec<String>,
}

impl Machine {
    pub fn new() -> Machine {
        Machine::default()
    }

    pub fn add_operation(&mut self, signature: OperationSignature) {
        self.operations.insert(signature.name().to_string(), signature);
    }

    pub fn has_operation(&self, name: &str) -> bool {
        self.operations.contains_key(name)
    }

    /// The signature for the named operation, or `IllegalMachine` when
    /// the machine does not implement it.
    pub fn operation(&self, name: &str) -> Result<&OperationSignature> {
        self.operations.get(name).ok_or_else(|| {
            ErrorKind::IllegalMachine(format!("operation {} not in machine", name)).into()
        })
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationSignature> {
        self.operations.values()
    }

    pub fn stack_pointer(&self) -> Option<&str> {
        self.stack_pointer.as_deref()
    }
    pub fn return_value(&self) -> Option<&str> {
        self.return_value.as_deref()
    }
    pub fn return_value_high(&self) -> Option<&str> {
        self.return_value_high.as_deref()
    }
    pub fn parameter_registers(&self) -> &[String] {
        &self.parameter_registers
    }

    pub fn set_stack_pointer<S: Into<String>>(&mut self, register: S) {
        self.stack_pointer = Some(register.into());
    }
    pub fn set_return_value<S: Into<String>>(&mut self, register: S) {
        self.return_value = Some(register.into());
    }
    pub fn set_return_value_high<S: Into<String>>(&mut self, register: S) {
        self.return_value_high = Some(register.into());
    }
    pub fn add_parameter_register<S: Into<String>>(&mut self, register: S) {
        self.parameter_registers.push(register.into());
    }
}

lazy_static! {
    /// A minimal machine with the operations the tests and examples
    /// exercise. Word accesses are 4 bytes wide, byte accesses 1.
    pub static ref MINIMAL: Machine = {
        let mut machine = Machine::new();

        machine.add_operation(OperationSignature::new("ADD", 2, 1));
        machine.add_operation(OperationSignature::new("SUB", 2, 1));
        machine.add_operation(OperationSignature::new("MUL", 2, 1));
        machine.add_operation(OperationSignature::new("EQ", 2, 1));
        machine.add_operation(OperationSignature::new("GT", 2, 1));

        let mut ldw = OperationSignature::new("LDW", 1, 1);
        ldw.set_reads_memory(true);
        ldw.set_memory_width(4);
        machine.add_operation(ldw);

        let mut ldq = OperationSignature::new("LDQ", 1, 1);
        ldq.set_reads_memory(true);
        ldq.set_memory_width(1);
        machine.add_operation(ldq);

        let mut stw = OperationSignature::new("STW", 2, 0);
        stw.set_writes_memory(true);
        stw.set_memory_width(4);
        machine.add_operation(stw);

        let mut stq = OperationSignature::new("STQ", 2, 0);
        stq.set_writes_memory(true);
        stq.set_memory_width(1);
        machine.add_operation(stq);

        machine.set_stack_pointer("RF.1");
        machine.set_return_value("RF.0");
        for i in 2..6 {
            machine.add_parameter_register(format!("RF.{}", i));
        }

        machine
    };
}

#[test]
fn unknown_operation_is_illegal_machine() {
    let error = MINIMAL.operation("FROB").unwrap_err();
    match error.kind() {
        crate::error::ErrorKind::IllegalMachine(_) => {}
        other => panic!("expected IllegalMachine, got {:?}", other),
    }
}

#[test]
fn fu_state_relations() {
    let mut init = OperationSignature::new("INIT_RNG", 1, 0);
    init.set_side_effects(true);
    let mut sample = OperationSignature::new("RNG", 0, 1);
    sample.add_affected_by("INIT_RNG");

    assert!(sample.depends_on(&init));
    assert!(!init.depends_on(&sample));
}
