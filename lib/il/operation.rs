use crate::il::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An IL Operation updates some state.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Operation {
    /// Allocate a fresh memory location, whose address is `dst`.
    Alloca { dst: ValueId },
    /// Store the value `src` to the address `dst`.
    Store { src: ValueId, dst: ValueId },
    /// Load the value at the address `src` into `dst`.
    Load { dst: ValueId, src: ValueId },
    /// Compute the address of a field or element of the aggregate at `base`.
    FieldAddress { dst: ValueId, base: ValueId },
    /// Reinterpret `src` as `dst`.
    Cast { dst: ValueId, src: ValueId },
    /// Copy the memory at `src` to `dst`.
    MemCopy { dst: ValueId, src: ValueId },
    /// SSA phi node.
    Phi { dst: ValueId, incoming: Vec<ValueId> },
    /// Call `callee`, directly or through a pointer.
    Call {
        dst: Option<ValueId>,
        callee: ValueId,
        args: Vec<ValueId>,
    },
    /// Return from the enclosing function.
    Return { value: Option<ValueId> },
    /// Debug information markers carry no semantics.
    Debug,
    Nop,
}

impl Operation {
    /// The value defined by this operation, if any.
    pub fn value_written(&self) -> Option<ValueId> {
        match *self {
            Operation::Alloca { dst }
            | Operation::Load { dst, .. }
            | Operation::FieldAddress { dst, .. }
            | Operation::Cast { dst, .. }
            | Operation::Phi { dst, .. } => Some(dst),
            Operation::Call { dst, .. } => dst,
            Operation::Store { .. }
            | Operation::MemCopy { .. }
            | Operation::Return { .. }
            | Operation::Debug
            | Operation::Nop => None,
        }
    }

    /// Every value read by this operation.
    pub fn values_read(&self) -> Vec<ValueId> {
        match *self {
            Operation::Alloca { .. } | Operation::Debug | Operation::Nop => Vec::new(),
            Operation::Store { src, dst } | Operation::MemCopy { dst, src } => vec![src, dst],
            Operation::Load { src, .. } | Operation::Cast { src, .. } => vec![src],
            Operation::FieldAddress { base, .. } => vec![base],
            Operation::Phi { ref incoming, .. } => incoming.clone(),
            Operation::Call {
                callee, ref args, ..
            } => {
                let mut read = vec![callee];
                read.extend(args.iter().cloned());
                read
            }
            Operation::Return { value } => value.into_iter().collect(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Operation::Alloca { dst } => write!(f, "{} = alloca", dst),
            Operation::Store { src, dst } => write!(f, "store {} -> {}", src, dst),
            Operation::Load { dst, src } => write!(f, "{} = load {}", dst, src),
            Operation::FieldAddress { dst, base } => write!(f, "{} = field {}", dst, base),
            Operation::Cast { dst, src } => write!(f, "{} = cast {}", dst, src),
            Operation::MemCopy { dst, src } => write!(f, "memcpy {} <- {}", dst, src),
            Operation::Phi { dst, ref incoming } => write!(
                f,
                "{} = phi {{{}}}",
                dst,
                incoming
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
            Operation::Call {
                dst,
                callee,
                ref args,
            } => {
                if let Some(dst) = dst {
                    write!(f, "{} = ", dst)?;
                }
                write!(
                    f,
                    "call {}({})",
                    callee,
                    args.iter()
                        .map(|v| v.to_string())
                        .collect::<Vec<String>>()
                        .join(", ")
                )
            }
            Operation::Return { value: Some(value) } => write!(f, "ret {}", value),
            Operation::Return { value: None } => write!(f, "ret"),
            Operation::Debug => write!(f, "debug"),
            Operation::Nop => write!(f, "nop"),
        }
    }
}
