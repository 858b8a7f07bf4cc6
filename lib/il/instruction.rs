use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An `Operation` with a position in a `Block`.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Instruction {
    operation: Operation,
    index: usize,
    line: Option<u32>,
}

impl Instruction {
    pub fn new(index: usize, operation: Operation) -> Instruction {
        Instruction {
            operation,
            index,
            line: None,
        }
    }

    pub fn is_store(&self) -> bool {
        matches!(self.operation, Operation::Store { .. })
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// The source line this instruction was generated from, when known.
    pub fn line(&self) -> Option<u32> {
        self.line
    }

    pub fn set_line(&mut self, line: Option<u32>) -> &mut Instruction {
        self.line = line;
        self
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{:02X} {} ; line {}", self.index, self.operation, line),
            None => write!(f, "{:02X} {}", self.index, self.operation),
        }
    }
}
