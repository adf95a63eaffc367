use crate::program::{Destination, Guard, MoveAnnotation, Source};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One data transport from a source to a destination, optionally gated
/// by a guard. The unit of scheduling.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Move {
    source: Source,
    destination: Destination,
    guard: Option<Guard>,
    annotations: Vec<MoveAnnotation>,
}

impl Move {
    pub fn new(source: Source, destination: Destination) -> Move {
        Move {
            source,
            destination,
            guard: None,
            annotations: Vec::new(),
        }
    }

    pub fn guarded(source: Source, destination: Destination, guard: Guard) -> Move {
        Move {
            source,
            destination,
            guard: Some(guard),
            annotations: Vec::new(),
        }
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn guard(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    pub fn is_unconditional(&self) -> bool {
        self.guard.is_none()
    }

    pub fn annotations(&self) -> &[MoveAnnotation] {
        &self.annotations
    }

    pub fn annotate(&mut self, annotation: MoveAnnotation) {
        self.annotations.push(annotation);
    }

    pub fn has_annotation(&self, annotation: &MoveAnnotation) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }

    pub fn is_call(&self) -> bool {
        match self.destination {
            Destination::Call => true,
            _ => false,
        }
    }

    pub fn is_jump(&self) -> bool {
        match self.destination {
            Destination::Jump => true,
            _ => false,
        }
    }

    /// A return is a jump through the return-address port.
    pub fn is_return(&self) -> bool {
        self.is_jump() && self.source.is_return_address()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.guard() {
            Some(guard) => write!(f, "{} {} -> {}", guard, self.source, self.destination),
            None => write!(f, "{} -> {}", self.source, self.destination),
        }
    }
}
