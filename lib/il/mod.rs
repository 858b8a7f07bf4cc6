//! Ptaflow Intermediate Language.
//!
//! The IL models an SSA-form program at the granularity the points-to analysis
//! cares about. Every operand is a `ValueId`, a handle into the value arena
//! owned by the `Program`. The arena records, for each value, its `ValueKind`
//! and its static `TypeClass`.
//!
//! The following components provide semantics:
//!
//! * `Operation`
//! * `Block`
//! * `Edge`
//! * `ControlFlowGraph`
//! * `Value`
//!
//! The following components provide location:
//!
//! * `Instruction`
//! * `Function`
//! * `Program`
//! * `ProgramLocation` / `InstructionLocation`
//!
//! Programs are built through the `Program` and `Block` APIs:
//!
//! ```
//! use ptaflow::il;
//!
//! let mut program = il::Program::new();
//! let main = program.new_function("main", il::TypeClass::NonPointer, &[]);
//! let p = program.new_value("p", il::ValueKind::Local, il::TypeClass::ScalarPointer);
//!
//! let function = program.function_mut(main).unwrap();
//! let cfg = function.control_flow_graph_mut();
//! let head = {
//!     let block = cfg.new_block().unwrap();
//!     block.alloca(p);
//!     block.index()
//! };
//! let tail = {
//!     let block = cfg.new_block().unwrap();
//!     block.ret(None);
//!     block.index()
//! };
//! cfg.unconditional_edge(head, tail).unwrap();
//! cfg.set_entry(head).unwrap();
//!
//! assert_eq!(cfg.exit_blocks().len(), 1);
//! ```

mod block;
mod control_flow_graph;
mod edge;
mod function;
mod instruction;
mod location;
mod operation;
mod program;
mod value;

pub use self::block::*;
pub use self::control_flow_graph::*;
pub use self::edge::*;
pub use self::function::*;
pub use self::instruction::*;
pub use self::location::*;
pub use self::operation::*;
pub use self::program::*;
pub use self::value::*;
