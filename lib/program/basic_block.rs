use crate::graph;
use crate::program::Instruction;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A maximal straight-line instruction sequence: one entry, one exit.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BasicBlock {
    index: usize,
    instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(index: usize, instructions: Vec<Instruction>) -> BasicBlock {
        BasicBlock {
            index,
            instructions,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn instruction(&self, index: usize) -> Option<&Instruction> {
        self.instructions
            .iter()
            .find(|instruction| instruction.index() == index)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn instruction_count(&self) -> usize {
        self.instructions.len()
    }
}

impl graph::Vertex for BasicBlock {
    fn index(&self) -> usize {
        self.index
    }
    fn dot_label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ block {} ]", self.index)?;
        for instruction in self.instructions() {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
