//! Locations of instructions.
//!
//! `InstructionLocation` is a location, "Applied," to a `Function`: it holds
//! references to the `Function` and `Block`, and is what analyses receive for
//! every instruction they transfer over. `ProgramLocation` is the owned
//! companion, independent of any borrow, used as a key in analysis results.

use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An owned location of an instruction in a `Program`.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProgramLocation {
    function: ValueId,
    block: usize,
    instruction: usize,
}

impl ProgramLocation {
    pub fn new(function: ValueId, block: usize, instruction: usize) -> ProgramLocation {
        ProgramLocation {
            function,
            block,
            instruction,
        }
    }

    pub fn function(&self) -> ValueId {
        self.function
    }

    pub fn block(&self) -> usize {
        self.block
    }

    pub fn instruction(&self) -> usize {
        self.instruction
    }
}

impl fmt::Display for ProgramLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:0x{:X}:{:02X}",
            self.function, self.block, self.instruction
        )
    }
}

/// The location of an instruction, applied to a `Function`.
#[derive(Clone, Copy, Debug)]
pub struct InstructionLocation<'f> {
    function: &'f Function,
    block: &'f Block,
    position: usize,
}

impl<'f> InstructionLocation<'f> {
    /// Create a location for the instruction at `position` in `block`.
    ///
    /// Returns `None` if `block` has no instruction at `position`.
    pub fn new(
        function: &'f Function,
        block: &'f Block,
        position: usize,
    ) -> Option<InstructionLocation<'f>> {
        if position < block.instructions().len() {
            Some(InstructionLocation {
                function,
                block,
                position,
            })
        } else {
            None
        }
    }

    pub fn function(&self) -> &'f Function {
        self.function
    }

    pub fn block(&self) -> &'f Block {
        self.block
    }

    pub fn instruction(&self) -> &'f Instruction {
        &self.block.instructions()[self.position]
    }

    /// The instruction following this one in the same block.
    pub fn next_instruction(&self) -> Option<&'f Instruction> {
        self.block.instructions().get(self.position + 1)
    }

    pub fn program_location(&self) -> ProgramLocation {
        ProgramLocation::new(
            self.function.id(),
            self.block.index(),
            self.instruction().index(),
        )
    }
}

impl<'f> fmt::Display for InstructionLocation<'f> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}:0x{:X}:{}",
            self.function.name(),
            self.block.index(),
            self.instruction()
        )
    }
}
