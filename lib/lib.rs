//! Ptaflow: a flow-sensitive points-to analysis for resolving indirect calls.
//!
//! Ptaflow is built from two pieces:
//!
//! * A generic fixed-point engine, `analysis::fixed_point`, which drives any
//! `FixedPointAnalysis` forwards or backwards over the `ControlFlowGraph` of an
//! `il::Function` until the per-block states stop changing.
//! * A points-to analysis, `analysis::points_to`, which tracks the possible
//! pointees of every pointer-valued `il::Value` and uses them to resolve the
//! candidate targets of every call site, re-entering the engine on each
//! candidate callee.
//!
//! The intermediate language in `il` is deliberately small. It captures just
//! enough of an SSA-form program (allocations, loads, stores, field address
//! computations, casts, phis, calls and returns) for the analyses to operate
//! on, and is built programmatically through the `Block` and `Program` APIs.
//!
//! ```
//! use ptaflow::analysis::points_to::{points_to, Options};
//! use ptaflow::il;
//!
//! let mut program = il::Program::new();
//! let f = program.new_function("F", il::TypeClass::NonPointer, &[]);
//! {
//!     let cfg = program.function_mut(f).unwrap().control_flow_graph_mut();
//!     let block = cfg.new_block().unwrap();
//!     block.ret(None);
//!     let index = block.index();
//!     cfg.set_entry(index).unwrap();
//! }
//!
//! let main = program.new_function("main", il::TypeClass::NonPointer, &[]);
//! let p = program.new_value("p", il::ValueKind::Local, il::TypeClass::ScalarPointer);
//! let r = program.new_value("r", il::ValueKind::Local, il::TypeClass::ScalarPointer);
//! {
//!     let cfg = program.function_mut(main).unwrap().control_flow_graph_mut();
//!     let block = cfg.new_block().unwrap();
//!     block.alloca(p);
//!     block.store(f, p);
//!     block.load(r, p);
//!     block.call(None, r, Vec::new());
//!     block.ret(None);
//!     let index = block.index();
//!     cfg.set_entry(index).unwrap();
//! }
//!
//! let result = points_to(&program, main, &Options::default()).unwrap();
//! let names: Vec<&str> = result
//!     .call_sites()
//!     .iter()
//!     .flat_map(|(_, names)| names.iter().map(|name| name.as_str()))
//!     .collect();
//! assert_eq!(names, vec!["F"]);
//! ```

pub mod analysis;
mod error;
pub mod graph;
pub mod il;
#[cfg(test)]
mod tests;

pub use error::Error;
