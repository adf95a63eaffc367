use crate::program::Register;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A read of one result slot of a hardware operation.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PortRead {
    operation: String,
    /// 1-based result slot.
    result: usize,
}

impl PortRead {
    pub fn new<S: Into<String>>(operation: S, result: usize) -> PortRead {
        PortRead {
            operation: operation.into(),
            result,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
    pub fn result(&self) -> usize {
        self.result
    }
}

/// A write to one operand slot of a hardware operation.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PortWrite {
    operation: String,
    /// 1-based operand slot.
    operand: usize,
    /// True for the opcode-setting move that starts execution.
    trigger: bool,
}

impl PortWrite {
    pub fn new<S: Into<String>>(operation: S, operand: usize) -> PortWrite {
        PortWrite {
            operation: operation.into(),
            operand,
            trigger: false,
        }
    }

    pub fn trigger<S: Into<String>>(operation: S, operand: usize) -> PortWrite {
        PortWrite {
            operation: operation.into(),
            operand,
            trigger: true,
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
    pub fn operand(&self) -> usize {
        self.operand
    }
    pub fn is_trigger(&self) -> bool {
        self.trigger
    }
}

/// The producing end of a move.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Source {
    Register(Register),
    Immediate(i64),
    /// A result slot of a hardware operation.
    FuPort(PortRead),
    /// The return-address port of the control unit.
    ReturnAddress,
}

impl Source {
    pub fn register(&self) -> Option<&Register> {
        match self {
            Source::Register(register) => Some(register),
            _ => None,
        }
    }

    pub fn immediate(&self) -> Option<i64> {
        match self {
            Source::Immediate(value) => Some(*value),
            _ => None,
        }
    }

    pub fn fu_port(&self) -> Option<&PortRead> {
        match self {
            Source::FuPort(port) => Some(port),
            _ => None,
        }
    }

    pub fn is_return_address(&self) -> bool {
        match self {
            Source::ReturnAddress => true,
            _ => false,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Source::Register(register) => register.fmt(f),
            Source::Immediate(value) => write!(f, "{}", value),
            Source::FuPort(port) => write!(f, "{}.out{}", port.operation(), port.result()),
            Source::ReturnAddress => write!(f, "RA"),
        }
    }
}

/// The consuming end of a move.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Destination {
    Register(Register),
    /// An operand slot of a hardware operation.
    FuPort(PortWrite),
    /// The return-address port of the control unit.
    ReturnAddress,
    /// A jump; the move source carries the target.
    Jump,
    /// A call; the move source carries the target.
    Call,
}

impl Destination {
    pub fn register(&self) -> Option<&Register> {
        match self {
            Destination::Register(register) => Some(register),
            _ => None,
        }
    }

    pub fn fu_port(&self) -> Option<&PortWrite> {
        match self {
            Destination::FuPort(port) => Some(port),
            _ => None,
        }
    }

    pub fn is_return_address(&self) -> bool {
        match self {
            Destination::ReturnAddress => true,
            _ => false,
        }
    }

    pub fn is_control_flow(&self) -> bool {
        match self {
            Destination::Jump | Destination::Call => true,
            _ => false,
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Destination::Register(register) => register.fmt(f),
            Destination::FuPort(port) => {
                let trigger = if port.is_trigger() { "t" } else { "" };
                write!(f, "{}.in{}{}", port.operation(), port.operand(), trigger)
            }
            Destination::ReturnAddress => write!(f, "RA"),
            Destination::Jump => write!(f, "jump"),
            Destination::Call => write!(f, "call"),
        }
    }
}
