use serde::{Deserialize, Serialize};
use std::fmt;

/// One register of a register file.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Register {
    file: String,
    index: usize,
}

impl Register {
    pub fn new<S>(file: S, index: usize) -> Register
    where
        S: Into<String>,
    {
        Register {
            file: file.into(),
            index,
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The name used to key dependence bookkeeping, e.g. `"RF.2"`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.file, self.index)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.file, self.index)
    }
}
