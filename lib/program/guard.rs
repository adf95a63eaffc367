use crate::program::Register;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a guard value is read from.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum GuardSource {
    Register(Register),
    /// A status port of a function unit, by name. Port guards are
    /// accepted in the representation but rejected by the analysis.
    Port(String),
}

/// A boolean condition gating a move.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Guard {
    source: GuardSource,
    inverted: bool,
}

impl Guard {
    pub fn register(register: Register, inverted: bool) -> Guard {
        Guard {
            source: GuardSource::Register(register),
            inverted,
        }
    }

    pub fn port<S: Into<String>>(port: S, inverted: bool) -> Guard {
        Guard {
            source: GuardSource::Port(port.into()),
            inverted,
        }
    }

    pub fn source(&self) -> &GuardSource {
        &self.source
    }

    pub fn guard_register(&self) -> Option<&Register> {
        match &self.source {
            GuardSource::Register(register) => Some(register),
            GuardSource::Port(_) => None,
        }
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let invert = if self.inverted { "!" } else { "" };
        match &self.source {
            GuardSource::Register(register) => write!(f, "{}{} ?", invert, register),
            GuardSource::Port(port) => write!(f, "{}{} ?", invert, port),
        }
    }
}
