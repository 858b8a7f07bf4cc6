//! A `Block` is a basic block, an ordered sequence of `Instruction`.
//!
//! Instructions are appended with the builder methods below, one per
//! `Operation`. Each builder returns the new `Instruction` so a source line can
//! be attached to it.

use crate::graph;
use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A basic block.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Block {
    /// The index of the block.
    index: usize,
    /// An internal counter for the next block-unique instruction.
    next_instruction_index: usize,
    /// The instructions for this block.
    instructions: Vec<Instruction>,
}

impl Block {
    pub(crate) fn new(index: usize) -> Block {
        Block {
            index,
            next_instruction_index: 0,
            instructions: Vec::new(),
        }
    }

    fn push(&mut self, operation: Operation) -> &mut Instruction {
        let index = self.next_instruction_index;
        self.next_instruction_index += 1;
        self.instructions.push(Instruction::new(index, operation));
        let last = self.instructions.len() - 1;
        &mut self.instructions[last]
    }

    /// Returns the index of this block
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns this block's instructions
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Adds an allocation to the end of this block.
    pub fn alloca(&mut self, dst: ValueId) -> &mut Instruction {
        self.push(Operation::Alloca { dst })
    }

    /// Adds a store of `src` to the address `dst` to the end of this block.
    pub fn store(&mut self, src: ValueId, dst: ValueId) -> &mut Instruction {
        self.push(Operation::Store { src, dst })
    }

    /// Adds a load from the address `src` to the end of this block.
    pub fn load(&mut self, dst: ValueId, src: ValueId) -> &mut Instruction {
        self.push(Operation::Load { dst, src })
    }

    /// Adds a field address computation to the end of this block.
    pub fn field_address(&mut self, dst: ValueId, base: ValueId) -> &mut Instruction {
        self.push(Operation::FieldAddress { dst, base })
    }

    /// Adds a cast to the end of this block.
    pub fn cast(&mut self, dst: ValueId, src: ValueId) -> &mut Instruction {
        self.push(Operation::Cast { dst, src })
    }

    /// Adds a memory copy to the end of this block.
    pub fn memcpy(&mut self, dst: ValueId, src: ValueId) -> &mut Instruction {
        self.push(Operation::MemCopy { dst, src })
    }

    /// Adds a phi operation to the end of this block.
    pub fn phi(&mut self, dst: ValueId, incoming: Vec<ValueId>) -> &mut Instruction {
        self.push(Operation::Phi { dst, incoming })
    }

    /// Adds a call to the end of this block.
    pub fn call(
        &mut self,
        dst: Option<ValueId>,
        callee: ValueId,
        args: Vec<ValueId>,
    ) -> &mut Instruction {
        self.push(Operation::Call { dst, callee, args })
    }

    /// Adds a return to the end of this block.
    pub fn ret(&mut self, value: Option<ValueId>) -> &mut Instruction {
        self.push(Operation::Return { value })
    }

    /// Adds a debug marker to the end of this block.
    pub fn debug(&mut self) -> &mut Instruction {
        self.push(Operation::Debug)
    }

    pub fn nop(&mut self) -> &mut Instruction {
        self.push(Operation::Nop)
    }
}

impl graph::Vertex for Block {
    fn index(&self) -> usize {
        self.index
    }

    fn dot_label(&self) -> String {
        format!("{}", self)
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "[ Block: 0x{:X} ]", self.index)?;
        for instruction in self.instructions() {
            writeln!(f, "{}", instruction)?;
        }
        Ok(())
    }
}
