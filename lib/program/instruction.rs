use crate::program::Move;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The moves that issue in one cycle.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Instruction {
    index: usize,
    moves: Vec<Move>,
}

impl Instruction {
    pub fn new(index: usize, moves: Vec<Move>) -> Instruction {
        Instruction { index, moves }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let moves = self
            .moves
            .iter()
            .map(|m| format!("{}", m))
            .collect::<Vec<String>>()
            .join(", ");
        write!(f, "{:02} [{}]", self.index, moves)
    }
}
